//! Simulated market snapshot generation
//!
//! Every payload served over HTTP or pushed to realtime clients is built
//! here. Responses are drawn fresh on each call; there is no continuity
//! between them and none is needed for a demo feed.

use feed_core::fmt::{format_amount, format_change, format_price, format_volume};
use feed_core::{OrderBook, OrderBookLevel, OrderBookTick, PriceTick, TokenQuote};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// The tracked HyperEVM listings
pub const SYMBOLS: [&str; 8] = [
    "BUDDY", "RUB", "PURR", "LHYPE", "PiP", "HSTR", "KITTEN", "HL",
];

/// Levels per book side
pub const BOOK_DEPTH: usize = 15;

/// Seed quotes: symbol, price, 24h change, 24h volume
const SEED_QUOTES: [(&str, f64, f64, u64); 8] = [
    ("BUDDY", 0.000303, 11.26, 157_000),
    ("RUB", 7_193_040.0, 25.18, 36_000),
    ("PURR", 0.1773, 7.30, 82_000),
    ("LHYPE", 44.57, 7.91, 521_000),
    ("PiP", 16.38, 17.87, 25_000),
    ("HSTR", 0.5604, -10.64, 12_000),
    ("KITTEN", 0.02236, 7.99, 273),
    ("HL", 0.0008933, -5.44, 10_000),
];

const PRICE_RANGE: std::ops::Range<f64> = 0.005..0.015;
const CHANGE_RANGE: std::ops::Range<f64> = -5.0..5.0;
const AMOUNT_RANGE: std::ops::Range<f64> = 500.0..3000.0;
/// Spread between adjacent book levels, as a fraction of the base price
const LEVEL_INCREMENT: f64 = 0.0001;

/// Produces all simulated market-data payloads
///
/// Holds the only process-wide random source; seed it for deterministic
/// output in tests.
pub struct SnapshotGenerator {
    rng: Mutex<StdRng>,
}

impl SnapshotGenerator {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Deterministic generator for tests
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// The fixed ordered list of tracked token quotes
    ///
    /// Serves as the fallback whenever no live data source is available;
    /// stable within a process lifetime.
    pub fn seed_tokens() -> Vec<TokenQuote> {
        SEED_QUOTES
            .iter()
            .map(|&(symbol, price, change, volume)| TokenQuote {
                symbol: symbol.to_string(),
                price: format_price(price),
                change_24h: format_change(change),
                volume: format_volume(volume),
            })
            .collect()
    }

    /// Synthetic order book for any symbol string
    ///
    /// The symbol is not validated; the shape is identical either way.
    pub fn order_book(&self, _symbol: &str) -> OrderBook {
        let mut rng = self.rng.lock();
        let base = rng.random_range(PRICE_RANGE);
        let step = base * LEVEL_INCREMENT;

        let mut bids = Vec::with_capacity(BOOK_DEPTH);
        let mut asks = Vec::with_capacity(BOOK_DEPTH);
        for i in 1..=BOOK_DEPTH {
            let offset = step * i as f64;
            bids.push(OrderBookLevel {
                price: format_price(base - offset),
                amount: format_amount(rng.random_range(AMOUNT_RANGE)),
            });
            asks.push(OrderBookLevel {
                price: format_price(base + offset),
                amount: format_amount(rng.random_range(AMOUNT_RANGE)),
            });
        }

        OrderBook { bids, asks }
    }

    /// One simulated price update for the realtime channel
    pub fn price_tick(&self, symbol: &str) -> PriceTick {
        let mut rng = self.rng.lock();
        PriceTick {
            symbol: symbol.to_string(),
            price: format_price(rng.random_range(PRICE_RANGE)),
            change: format_change(rng.random_range(CHANGE_RANGE)),
        }
    }

    /// One simulated order flow update for the realtime channel
    pub fn order_book_tick(&self, symbol: &str) -> OrderBookTick {
        let mut rng = self.rng.lock();
        OrderBookTick {
            symbol: symbol.to_string(),
            buy_percentage: rng.random_range(30..=70),
            sell_percentage: rng.random_range(30..=70),
        }
    }

    /// Pick the subject for the next push tick
    pub fn random_symbol(&self) -> &'static str {
        let mut rng = self.rng.lock();
        SYMBOLS[rng.random_range(0..SYMBOLS.len())]
    }
}

impl Default for SnapshotGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fractional_digits(value: &str) -> usize {
        value.split('.').nth(1).map(str::len).unwrap_or(0)
    }

    #[test]
    fn seed_tokens_are_stable_and_formatted() {
        let tokens = SnapshotGenerator::seed_tokens();
        assert_eq!(tokens.len(), 8);

        let buddy = &tokens[0];
        assert_eq!(buddy.symbol, "BUDDY");
        assert_eq!(buddy.price, "0.00030300");
        assert_eq!(buddy.change_24h, "+11.26%");
        assert_eq!(buddy.volume, "157K");

        let rub = &tokens[1];
        assert_eq!(rub.price, "7193040.00000000");

        let hstr = &tokens[5];
        assert_eq!(hstr.change_24h, "-10.64%");

        let kitten = &tokens[6];
        assert_eq!(kitten.volume, "273");
    }

    #[test]
    fn order_book_has_fixed_depth_and_precision() {
        let generator = SnapshotGenerator::seeded(42);
        let book = generator.order_book("BUDDY");

        assert_eq!(book.bids.len(), BOOK_DEPTH);
        assert_eq!(book.asks.len(), BOOK_DEPTH);

        for level in book.bids.iter().chain(book.asks.iter()) {
            assert_eq!(fractional_digits(&level.price), 8, "price {}", level.price);
            assert_eq!(fractional_digits(&level.amount), 2, "amount {}", level.amount);
        }
    }

    #[test]
    fn order_book_sides_are_ordered_around_the_base() {
        let generator = SnapshotGenerator::seeded(7);
        let book = generator.order_book("anything-goes");

        let bids: Vec<f64> = book.bids.iter().map(|l| l.price.parse().unwrap()).collect();
        let asks: Vec<f64> = book.asks.iter().map(|l| l.price.parse().unwrap()).collect();

        assert!(bids.windows(2).all(|w| w[0] > w[1]), "bids must descend");
        assert!(asks.windows(2).all(|w| w[0] < w[1]), "asks must ascend");
        assert!(bids[0] < asks[0]);
        assert!(bids.iter().all(|p| *p > 0.0));
    }

    #[test]
    fn order_book_shape_ignores_symbol_validity() {
        let generator = SnapshotGenerator::seeded(1);
        let known = generator.order_book("BUDDY");
        let unknown = generator.order_book("NO-SUCH-TOKEN");

        assert_eq!(known.bids.len(), unknown.bids.len());
        assert_eq!(known.asks.len(), unknown.asks.len());
    }

    #[test]
    fn price_tick_stays_in_bounds() {
        let generator = SnapshotGenerator::seeded(9);
        for _ in 0..100 {
            let tick = generator.price_tick("PURR");
            assert_eq!(tick.symbol, "PURR");

            // The formatted string may round up to the top of the range.
            let price: f64 = tick.price.parse().unwrap();
            assert!((0.005..=0.015).contains(&price), "price {}", tick.price);
            assert_eq!(fractional_digits(&tick.price), 8);

            assert!(tick.change.starts_with('+') || tick.change.starts_with('-'));
            assert!(tick.change.ends_with('%'));
            let magnitude: f64 = tick.change[1..tick.change.len() - 1].parse().unwrap();
            assert!(magnitude <= 5.0, "change {}", tick.change);
        }
    }

    #[test]
    fn order_book_tick_percentages_stay_in_bounds() {
        let generator = SnapshotGenerator::seeded(13);
        for _ in 0..200 {
            let tick = generator.order_book_tick("KITTEN");
            assert!((30..=70).contains(&tick.buy_percentage));
            assert!((30..=70).contains(&tick.sell_percentage));
        }
    }

    #[test]
    fn seeded_generators_are_deterministic() {
        let a = SnapshotGenerator::seeded(5);
        let b = SnapshotGenerator::seeded(5);

        let book_a = serde_json::to_string(&a.order_book("LHYPE")).unwrap();
        let book_b = serde_json::to_string(&b.order_book("LHYPE")).unwrap();
        assert_eq!(book_a, book_b);
    }

    #[test]
    fn random_symbol_comes_from_the_tracked_set() {
        let generator = SnapshotGenerator::seeded(21);
        for _ in 0..50 {
            assert!(SYMBOLS.contains(&generator.random_symbol()));
        }
    }
}
