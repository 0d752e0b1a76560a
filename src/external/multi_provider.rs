use crate::external::price_provider::{ExternalPricePoint, PriceProvider, PriceProviderError};
use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::{info, warn};

/// MultiProvider tries the primary provider and falls back to the secondary
/// one on any error.
///
/// When both fail, the primary's error is returned.
pub struct MultiProvider {
    primary: Box<dyn PriceProvider>,
    fallback: Box<dyn PriceProvider>,
}

impl MultiProvider {
    pub fn new(primary: Box<dyn PriceProvider>, fallback: Box<dyn PriceProvider>) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait]
impl PriceProvider for MultiProvider {
    fn name(&self) -> &str {
        "multi"
    }

    async fn fetch_daily_closes(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ExternalPricePoint>, PriceProviderError> {
        let primary_err = match self.primary.fetch_daily_closes(symbol, start, end).await {
            Ok(data) => return Ok(data),
            Err(PriceProviderError::RateLimited) => {
                info!("⚠️ {} rate limited for {}, trying {}", self.primary.name(), symbol, self.fallback.name());
                PriceProviderError::RateLimited
            }
            Err(e) => {
                warn!("{} failed for {}: {}", self.primary.name(), symbol, e);
                e
            }
        };

        match self.fallback.fetch_daily_closes(symbol, start, end).await {
            Ok(data) => {
                info!("✓ Fetched {} from fallback provider {}", symbol, self.fallback.name());
                Ok(data)
            }
            Err(fallback_err) => {
                warn!("{} failed for {}: {}", self.fallback.name(), symbol, fallback_err);
                Err(primary_err)
            }
        }
    }
}
