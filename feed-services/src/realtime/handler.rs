//! Realtime connection handler
//!
//! Each accepted connection gets its own push scheduler: a timer task that
//! periodically generates one price tick and one order flow tick and
//! delivers them to that connection only. The scheduler handle is owned by
//! the connection scope and aborted on every exit path, so a timer can
//! never outlive the connection it belongs to.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use feed_core::{ClientMessage, ServerMessage};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite;
use tracing::{debug, error, info, warn};

use super::registry::{ClientId, ConnectionRegistry};
use crate::snapshot::SnapshotGenerator;

/// Default period between pushed updates
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(2000);

/// Abort-on-drop handle for a connection's push scheduler
struct SchedulerGuard(JoinHandle<()>);

impl SchedulerGuard {
    fn spawn<F>(future: F) -> Self
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        Self(tokio::spawn(future))
    }
}

impl Drop for SchedulerGuard {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Shared state for realtime connection handling
#[derive(Clone)]
pub struct FeedState {
    pub registry: Arc<ConnectionRegistry>,
    pub generator: Arc<SnapshotGenerator>,
    tick_interval: Duration,
}

impl FeedState {
    pub fn new(generator: Arc<SnapshotGenerator>) -> Self {
        Self::with_tick_interval(generator, DEFAULT_TICK_INTERVAL)
    }

    pub fn with_tick_interval(generator: Arc<SnapshotGenerator>, tick_interval: Duration) -> Self {
        Self {
            registry: Arc::new(ConnectionRegistry::new()),
            generator,
            tick_interval,
        }
    }

    /// Handle an established realtime connection until it closes.
    ///
    /// Generic over the transport so the scheduler can be driven by an
    /// in-memory socket in tests.
    pub async fn handle_connection<S>(&self, socket: S)
    where
        S: futures_util::Stream<Item = Result<tungstenite::Message, tungstenite::Error>>
            + futures_util::Sink<tungstenite::Message, Error = tungstenite::Error>
            + Unpin
            + Send
            + 'static,
    {
        let client_id = self.registry.register();
        info!("New realtime connection: {}", client_id);

        let (mut ws_sender, mut ws_receiver) = socket.split();
        let (outgoing_tx, mut outgoing_rx) = mpsc::channel::<ServerMessage>(64);

        // Push scheduler: one timer per connection, first firing a full
        // period after connect. Sends fail once the connection is torn
        // down, which ends the loop.
        let scheduler = SchedulerGuard::spawn({
            let generator = Arc::clone(&self.generator);
            let tick_tx = outgoing_tx.clone();
            let period = self.tick_interval;
            async move {
                let start = tokio::time::Instant::now() + period;
                let mut ticker = tokio::time::interval_at(start, period);
                loop {
                    ticker.tick().await;
                    let symbol = generator.random_symbol();
                    let price = generator.price_tick(symbol);
                    let book = generator.order_book_tick(symbol);
                    if tick_tx.send(price.into()).await.is_err() {
                        break;
                    }
                    if tick_tx.send(book.into()).await.is_err() {
                        break;
                    }
                }
            }
        });

        // Serialize and write outgoing messages
        let send_task = tokio::spawn(async move {
            while let Some(message) = outgoing_rx.recv().await {
                let json = match serde_json::to_string(&message) {
                    Ok(json) => json,
                    Err(e) => {
                        error!("Failed to serialize push message: {}", e);
                        continue;
                    }
                };
                if ws_sender
                    .send(tungstenite::Message::Text(json.into()))
                    .await
                    .is_err()
                {
                    break;
                }
            }
        });

        // Drain inbound messages until the peer goes away
        let recv_task = async move {
            while let Some(result) = ws_receiver.next().await {
                match result {
                    Ok(msg) => Self::handle_message(client_id, msg, &outgoing_tx).await,
                    Err(e) => {
                        debug!("Transport error for {}: {}", client_id, e);
                        break;
                    }
                }
            }
        };

        // Either side finishing means the connection is done
        tokio::select! {
            _ = send_task => {}
            _ = recv_task => {}
        }

        // Scheduler teardown, then registry removal; both are safe to hit
        // on an unclean close and the removal is idempotent.
        drop(scheduler);
        self.registry.remove(client_id);
        info!("Realtime connection closed: {}", client_id);
    }

    /// Process one inbound message
    ///
    /// The feed is push-only; a keep-alive ping is the only payload acted
    /// on. Anything unparseable is logged and dropped.
    async fn handle_message(
        client_id: ClientId,
        msg: tungstenite::Message,
        outgoing_tx: &mpsc::Sender<ServerMessage>,
    ) {
        match msg {
            tungstenite::Message::Text(text) => {
                match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(ClientMessage::Ping { timestamp }) => {
                        let _ = outgoing_tx
                            .send(ServerMessage::Pong {
                                client_timestamp: timestamp,
                                server_timestamp: Utc::now().timestamp_millis(),
                            })
                            .await;
                    }
                    Err(e) => {
                        warn!("Ignoring malformed message from {}: {}", client_id, e);
                    }
                }
            }
            tungstenite::Message::Close(_) => {
                debug!("Close frame from {}", client_id);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::pin::Pin;
    use std::task::{Context, Poll};

    /// In-memory transport standing in for a WebSocket
    struct TestSocket {
        incoming: mpsc::Receiver<Result<tungstenite::Message, tungstenite::Error>>,
        outgoing: mpsc::UnboundedSender<tungstenite::Message>,
    }

    impl futures_util::Stream for TestSocket {
        type Item = Result<tungstenite::Message, tungstenite::Error>;

        fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
            self.incoming.poll_recv(cx)
        }
    }

    impl futures_util::Sink<tungstenite::Message> for TestSocket {
        type Error = tungstenite::Error;

        fn poll_ready(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }

        fn start_send(self: Pin<&mut Self>, item: tungstenite::Message) -> Result<(), Self::Error> {
            self.outgoing
                .send(item)
                .map_err(|_| tungstenite::Error::ConnectionClosed)
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }

        fn poll_close(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }
    }

    type ClientEnd = (
        mpsc::Sender<Result<tungstenite::Message, tungstenite::Error>>,
        mpsc::UnboundedReceiver<tungstenite::Message>,
        JoinHandle<()>,
    );

    fn connect(state: &FeedState) -> ClientEnd {
        let (in_tx, in_rx) = mpsc::channel(16);
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let socket = TestSocket {
            incoming: in_rx,
            outgoing: out_tx,
        };
        let state = state.clone();
        let handle = tokio::spawn(async move { state.handle_connection(socket).await });
        (in_tx, out_rx, handle)
    }

    fn parse(msg: &tungstenite::Message) -> serde_json::Value {
        serde_json::from_str(msg.to_text().unwrap()).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn pushes_a_tick_pair_each_period() {
        let state = FeedState::new(Arc::new(SnapshotGenerator::seeded(7)));
        let (_in_tx, mut out_rx, _handle) = connect(&state);

        let mut events = Vec::new();
        for _ in 0..4 {
            let msg = out_rx.recv().await.expect("push stream ended early");
            events.push(parse(&msg)["type"].as_str().unwrap().to_string());
        }

        assert_eq!(
            events,
            ["priceUpdate", "orderBookUpdate", "priceUpdate", "orderBookUpdate"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn tick_pair_shares_a_symbol_and_stays_in_bounds() {
        let state = FeedState::new(Arc::new(SnapshotGenerator::seeded(11)));
        let (_in_tx, mut out_rx, _handle) = connect(&state);

        for _ in 0..10 {
            let price = parse(&out_rx.recv().await.unwrap());
            let book = parse(&out_rx.recv().await.unwrap());

            assert_eq!(price["type"], "priceUpdate");
            assert_eq!(book["type"], "orderBookUpdate");
            assert_eq!(price["symbol"], book["symbol"]);

            let buy = book["buyPercentage"].as_i64().unwrap();
            let sell = book["sellPercentage"].as_i64().unwrap();
            assert!((30..=70).contains(&buy), "buy {buy}");
            assert!((30..=70).contains(&sell), "sell {sell}");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn answers_ping_with_pong() {
        let state = FeedState::new(Arc::new(SnapshotGenerator::seeded(3)));
        let (in_tx, mut out_rx, _handle) = connect(&state);

        in_tx
            .send(Ok(tungstenite::Message::Text(
                r#"{"type":"ping","timestamp":42}"#.into(),
            )))
            .await
            .unwrap();

        let value = parse(&out_rx.recv().await.unwrap());
        assert_eq!(value["type"], "pong");
        assert_eq!(value["clientTimestamp"], 42);
    }

    #[tokio::test(start_paused = true)]
    async fn ignores_malformed_client_payloads() {
        let state = FeedState::new(Arc::new(SnapshotGenerator::seeded(3)));
        let (in_tx, mut out_rx, _handle) = connect(&state);

        in_tx
            .send(Ok(tungstenite::Message::Text("{not json".into())))
            .await
            .unwrap();
        in_tx
            .send(Ok(tungstenite::Message::Text(
                r#"{"type":"ping","timestamp":1}"#.into(),
            )))
            .await
            .unwrap();

        // The garbage produced nothing; the ping is answered.
        let value = parse(&out_rx.recv().await.unwrap());
        assert_eq!(value["type"], "pong");
    }

    #[tokio::test(start_paused = true)]
    async fn disconnect_stops_the_scheduler_and_deregisters() {
        let state = FeedState::new(Arc::new(SnapshotGenerator::seeded(5)));
        let (in_tx, mut out_rx, handle) = connect(&state);

        // One full tick pair arrives while connected.
        let _ = out_rx.recv().await.unwrap();
        let _ = out_rx.recv().await.unwrap();
        assert_eq!(state.registry.total_clients(), 1);

        // Unclean hangup: the inbound stream just ends.
        drop(in_tx);
        handle.await.unwrap();

        assert_eq!(state.registry.total_clients(), 0);
        // No further events are delivered after teardown.
        assert!(out_rx.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn connections_get_independent_schedulers() {
        let state = FeedState::new(Arc::new(SnapshotGenerator::seeded(17)));
        let (_in_a, mut out_a, _ha) = connect(&state);
        let (in_b, mut out_b, hb) = connect(&state);

        // Let the spawned handler tasks be polled so each runs its
        // synchronous register() before we observe the count.
        tokio::task::yield_now().await;

        assert_eq!(state.registry.total_clients(), 2);

        // Dropping one connection must not disturb the other.
        drop(in_b);
        hb.await.unwrap();
        assert_eq!(state.registry.total_clients(), 1);
        assert!(out_b.recv().await.is_none());

        let value = parse(&out_a.recv().await.unwrap());
        assert_eq!(value["type"], "priceUpdate");
    }
}
