use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub struct ExternalPricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

#[derive(Debug, Error)]
pub enum PriceProviderError {
    #[error("network error: {0}")]
    Network(String),

    #[error("bad response: {0}")]
    BadResponse(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("rate limited")]
    RateLimited,

    #[error("symbol not found")]
    NotFound,

    #[error("request timed out after {0:?}")]
    Timeout(Duration),
}

impl PriceProviderError {
    /// Errors worth retrying: the same request may succeed a moment later.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            PriceProviderError::RateLimited
                | PriceProviderError::Network(_)
                | PriceProviderError::Timeout(_)
        )
    }
}

#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// Human-readable provider name for logs.
    fn name(&self) -> &str;

    /// Daily closes for `symbol` with `start <= date <= end`, oldest first.
    ///
    /// Providers may silently truncate very large ranges; callers chunk
    /// long ranges before calling this.
    async fn fetch_daily_closes(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ExternalPricePoint>, PriceProviderError>;
}
