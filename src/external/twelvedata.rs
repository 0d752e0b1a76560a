use crate::external::price_provider::{ExternalPricePoint, PriceProvider, PriceProviderError};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;

// Twelve Data caps a single time_series response at 5000 rows.
const MAX_OUTPUT_SIZE: u32 = 5000;

pub struct TwelveDataProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl TwelveDataProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: "https://api.twelvedata.com".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TwelveDataTimeSeriesResponse {
    values: Option<Vec<TwelveDataValue>>,
    status: String,

    // Error handling
    message: Option<String>,
    code: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct TwelveDataValue {
    datetime: String,
    close: String,
}

fn parse_time_series(
    body: TwelveDataTimeSeriesResponse,
) -> Result<Vec<ExternalPricePoint>, PriceProviderError> {
    if body.status != "ok" {
        let msg = body.message.unwrap_or_else(|| format!("API returned status: {}", body.status));
        if body.code == Some(429) || msg.contains("API rate limit") || msg.contains("credits") {
            return Err(PriceProviderError::RateLimited);
        }
        if msg.contains("No data is available") {
            return Ok(Vec::new());
        }
        if body.code == Some(404) || msg.contains("not found") || msg.contains("invalid") {
            return Err(PriceProviderError::NotFound);
        }
        return Err(PriceProviderError::BadResponse(msg));
    }

    let values = body
        .values
        .ok_or_else(|| PriceProviderError::BadResponse("missing values in response".into()))?;

    let mut points = values
        .into_iter()
        .map(|v| -> Result<ExternalPricePoint, PriceProviderError> {
            // "YYYY-MM-DD" or "YYYY-MM-DD HH:MM:SS"
            let date_part = v.datetime.split(' ').next().unwrap_or(&v.datetime);
            let date = NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
                .map_err(|e| PriceProviderError::Parse(e.to_string()))?;
            let close = v
                .close
                .parse::<f64>()
                .map_err(|e| PriceProviderError::Parse(e.to_string()))?;
            Ok(ExternalPricePoint { date, close })
        })
        .collect::<Result<Vec<_>, _>>()?;

    // Twelve Data returns newest first, we need oldest first
    points.sort_by_key(|p| p.date);
    points.dedup_by_key(|p| p.date);

    Ok(points)
}

#[async_trait]
impl PriceProvider for TwelveDataProvider {
    fn name(&self) -> &str {
        "twelvedata"
    }

    async fn fetch_daily_closes(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ExternalPricePoint>, PriceProviderError> {
        let url = format!("{}/time_series", self.base_url);

        // end_date is exclusive on Twelve Data's side
        let end_exclusive = end.succ_opt().unwrap_or(end);

        let resp = self
            .client
            .get(url)
            .query(&[
                ("symbol", symbol.to_string()),
                ("interval", "1day".to_string()),
                ("start_date", start.format("%Y-%m-%d").to_string()),
                ("end_date", end_exclusive.format("%Y-%m-%d").to_string()),
                ("outputsize", MAX_OUTPUT_SIZE.to_string()),
                ("apikey", self.api_key.clone()),
            ])
            .send()
            .await
            .map_err(|e| PriceProviderError::Network(e.to_string()))?;

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(PriceProviderError::RateLimited);
        }

        let body: TwelveDataTimeSeriesResponse = resp
            .json()
            .await
            .map_err(|e| PriceProviderError::Parse(e.to_string()))?;

        let points = parse_time_series(body)?;
        Ok(points
            .into_iter()
            .filter(|p| start <= p.date && p.date <= end)
            .collect())
    }
}
