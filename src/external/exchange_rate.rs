use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;

use crate::external::price_provider::PriceProviderError;

#[async_trait]
pub trait ExchangeRateProvider: Send + Sync {
    /// Units of `quote` per one unit of `base`.
    async fn fetch_rate(&self, base: &str, quote: &str) -> Result<f64, PriceProviderError>;
}

/// Frankfurter (ECB reference rates) - free, no API key.
pub struct FrankfurterProvider {
    client: reqwest::Client,
    base_url: String,
}

impl FrankfurterProvider {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: "https://api.frankfurter.app".to_string(),
        }
    }
}

impl Default for FrankfurterProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct FrankfurterLatest {
    rates: HashMap<String, f64>,
}

#[async_trait]
impl ExchangeRateProvider for FrankfurterProvider {
    async fn fetch_rate(&self, base: &str, quote: &str) -> Result<f64, PriceProviderError> {
        let url = format!("{}/latest", self.base_url);

        let resp = self
            .client
            .get(url)
            .query(&[("from", base), ("to", quote)])
            .send()
            .await
            .map_err(|e| PriceProviderError::Network(e.to_string()))?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND || status == reqwest::StatusCode::UNPROCESSABLE_ENTITY {
            return Err(PriceProviderError::NotFound);
        }
        if !status.is_success() {
            return Err(PriceProviderError::BadResponse(format!("HTTP {}", status)));
        }

        let body: FrankfurterLatest = resp
            .json()
            .await
            .map_err(|e| PriceProviderError::Parse(e.to_string()))?;

        body.rates
            .get(quote)
            .copied()
            .ok_or(PriceProviderError::NotFound)
    }
}
