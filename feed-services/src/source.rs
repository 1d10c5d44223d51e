//! Token data sources
//!
//! The live path shells out to an external fetch script; the fallback
//! decorator guarantees callers a token list even when that fails, so
//! upstream outages never surface past this module.

use std::time::Duration;

use async_trait::async_trait;
use feed_core::fmt::{format_change, format_price, format_volume};
use feed_core::{FeedError, FeedResult, TokenQuote};
use serde::Deserialize;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::snapshot::SnapshotGenerator;

/// Default ceiling on an external fetch
const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Source of token listings
#[async_trait]
pub trait TokenDataSource: Send + Sync {
    async fn fetch_tokens(&self) -> FeedResult<Vec<TokenQuote>>;
}

/// One record of the fetch script's JSON output
#[derive(Debug, Deserialize)]
struct ScrapedToken {
    symbol: String,
    price: f64,
    #[serde(default)]
    change_24h: f64,
    #[serde(default)]
    volume_24h: f64,
}

impl From<ScrapedToken> for TokenQuote {
    fn from(token: ScrapedToken) -> Self {
        TokenQuote {
            symbol: token.symbol,
            price: format_price(token.price),
            change_24h: format_change(token.change_24h),
            volume: format_volume(token.volume_24h.max(0.0) as u64),
        }
    }
}

/// Invokes an external fetch command and parses its stdout
///
/// The command is expected to print a JSON array of token records; stderr
/// is left to the child for its own logging.
pub struct ScriptTokenSource {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl ScriptTokenSource {
    pub fn new(command: &str) -> Self {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next().unwrap_or_default();
        Self {
            program,
            args: parts.collect(),
            timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn parse_output(bytes: &[u8]) -> FeedResult<Vec<TokenQuote>> {
        let scraped: Vec<ScrapedToken> = serde_json::from_slice(bytes)
            .map_err(|e| FeedError::parse(format!("bad fetch script output: {e}")))?;
        if scraped.is_empty() {
            return Err(FeedError::source("fetch script returned no tokens"));
        }
        Ok(scraped.into_iter().map(TokenQuote::from).collect())
    }
}

#[async_trait]
impl TokenDataSource for ScriptTokenSource {
    async fn fetch_tokens(&self) -> FeedResult<Vec<TokenQuote>> {
        debug!("Invoking token fetch command: {}", self.program);

        let output = tokio::time::timeout(
            self.timeout,
            Command::new(&self.program).args(&self.args).output(),
        )
        .await
        .map_err(|_| FeedError::source("token fetch timed out"))?
        .map_err(|e| FeedError::source(format!("failed to run token fetch: {e}")))?;

        if !output.status.success() {
            return Err(FeedError::source(format!(
                "token fetch exited with {}",
                output.status
            )));
        }

        Self::parse_output(&output.stdout)
    }
}

/// Always serves the built-in seed list
pub struct StaticTokenSource;

#[async_trait]
impl TokenDataSource for StaticTokenSource {
    async fn fetch_tokens(&self) -> FeedResult<Vec<TokenQuote>> {
        Ok(SnapshotGenerator::seed_tokens())
    }
}

/// Decorator that falls back to the seed list when the primary fails
///
/// One fallback attempt is the whole recovery strategy; there are no
/// retries against the primary.
pub struct FallbackTokenSource<S> {
    primary: S,
}

impl<S: TokenDataSource> FallbackTokenSource<S> {
    pub fn new(primary: S) -> Self {
        Self { primary }
    }
}

#[async_trait]
impl<S: TokenDataSource> TokenDataSource for FallbackTokenSource<S> {
    async fn fetch_tokens(&self) -> FeedResult<Vec<TokenQuote>> {
        match self.primary.fetch_tokens().await {
            Ok(tokens) => Ok(tokens),
            Err(e) => {
                warn!("Primary token source failed, serving seed data: {}", e);
                Ok(SnapshotGenerator::seed_tokens())
            }
        }
    }
}
