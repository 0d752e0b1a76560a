use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use tracing::{info, warn};

use crate::external::exchange_rate::ExchangeRateProvider;
use crate::external::price_provider::PriceProviderError;
use crate::models::FxRate;

/// Exchange rates with a per-pair time-to-live.
///
/// Constructed once at startup and shared through `AppState`.
pub struct FxRateCache {
    provider: Arc<dyn ExchangeRateProvider>,
    ttl: Duration,
    rates: Mutex<HashMap<(String, String), FxRate>>,
}

impl FxRateCache {
    pub fn new(provider: Arc<dyn ExchangeRateProvider>, ttl: std::time::Duration) -> Self {
        Self {
            provider,
            ttl: Duration::from_std(ttl).unwrap_or_else(|_| Duration::hours(1)),
            rates: Mutex::new(HashMap::new()),
        }
    }

    pub async fn get_rate(&self, base: &str, quote: &str) -> Result<FxRate, PriceProviderError> {
        self.get_rate_at(base, quote, Utc::now()).await
    }

    pub async fn get_rate_at(
        &self,
        base: &str,
        quote: &str,
        now: DateTime<Utc>,
    ) -> Result<FxRate, PriceProviderError> {
        let base = base.trim().to_uppercase();
        let quote = quote.trim().to_uppercase();

        if base == quote {
            return Ok(FxRate { base, quote, rate: 1.0, fetched_at: now });
        }

        let key = (base.clone(), quote.clone());
        // Clone out so the lock is never held across the fetch.
        let cached = self.rates.lock().get(&key).cloned();

        if let Some(rate) = &cached {
            if now - rate.fetched_at < self.ttl {
                return Ok(rate.clone());
            }
        }

        match self.provider.fetch_rate(&base, &quote).await {
            Ok(rate) => {
                let fresh = FxRate { base, quote, rate, fetched_at: now };
                self.rates.lock().insert(key, fresh.clone());
                info!("✓ Refreshed FX rate {}/{} = {}", fresh.base, fresh.quote, fresh.rate);
                Ok(fresh)
            }
            Err(e) => match cached {
                Some(expired) => {
                    warn!(
                        "FX refresh failed for {}/{}: {}. Serving rate from {}",
                        expired.base, expired.quote, e, expired.fetched_at
                    );
                    Ok(expired)
                }
                None => Err(e),
            },
        }
    }
}
