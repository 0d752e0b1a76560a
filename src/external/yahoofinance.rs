use crate::external::price_provider::{ExternalPricePoint, PriceProvider, PriceProviderError};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;

/// Yahoo Finance provider - free v8 chart API, no API key required.
///
/// Date ranges are requested with explicit `period1`/`period2` unix
/// timestamps so a chunk maps to exactly one request.
pub struct YahooFinanceProvider {
    client: reqwest::Client,
    base_url: String,
}

impl YahooFinanceProvider {
    pub fn new() -> Self {
        Self::with_base_url("https://query1.finance.yahoo.com")
    }

    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent("Mozilla/5.0 (compatible; Finboard/0.1)")
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn period_bounds(start: NaiveDate, end: NaiveDate) -> (i64, i64) {
        let period1 = start.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc().timestamp()).unwrap_or(0);
        let period2 = end
            .and_hms_opt(23, 59, 59)
            .map(|dt| dt.and_utc().timestamp())
            .unwrap_or(period1);
        (period1, period2)
    }
}

impl Default for YahooFinanceProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct YahooChartResponse {
    chart: YahooChart,
}

#[derive(Debug, Deserialize)]
struct YahooChart {
    result: Option<Vec<YahooResult>>,
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
struct YahooError {
    #[serde(default)]
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct YahooResult {
    // Absent when the range holds no trading days.
    timestamp: Option<Vec<i64>>,
    indicators: YahooIndicators,
}

#[derive(Debug, Deserialize)]
struct YahooIndicators {
    quote: Vec<YahooQuote>,
}

#[derive(Debug, Deserialize)]
struct YahooQuote {
    close: Option<Vec<Option<f64>>>,
}

fn parse_chart(
    body: YahooChartResponse,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<ExternalPricePoint>, PriceProviderError> {
    if let Some(error) = body.chart.error {
        if error.code == "Not Found" || error.description.contains("No data found") {
            return Err(PriceProviderError::NotFound);
        }
        return Err(PriceProviderError::BadResponse(error.description));
    }

    let result = body
        .chart
        .result
        .and_then(|mut r| if r.is_empty() { None } else { Some(r.swap_remove(0)) })
        .ok_or_else(|| PriceProviderError::BadResponse("No results in response".into()))?;

    let Some(timestamps) = result.timestamp else {
        return Ok(Vec::new());
    };

    let closes = result
        .indicators
        .quote
        .into_iter()
        .next()
        .and_then(|q| q.close)
        .ok_or_else(|| PriceProviderError::BadResponse("No quote data in response".into()))?;

    if timestamps.len() != closes.len() {
        return Err(PriceProviderError::Parse(
            "Timestamp and close price arrays have different lengths".into(),
        ));
    }

    let mut points: Vec<ExternalPricePoint> = timestamps
        .iter()
        .zip(closes.iter())
        .filter_map(|(timestamp, close_opt)| {
            // Skip null values (market holidays, etc.)
            let close = (*close_opt)?;
            let date = chrono::DateTime::from_timestamp(*timestamp, 0).map(|dt| dt.date_naive())?;
            Some(ExternalPricePoint { date, close })
        })
        .filter(|p| start <= p.date && p.date <= end)
        .collect();

    points.sort_by_key(|p| p.date);
    points.dedup_by_key(|p| p.date);

    Ok(points)
}

#[async_trait]
impl PriceProvider for YahooFinanceProvider {
    fn name(&self) -> &str {
        "yahoo"
    }

    async fn fetch_daily_closes(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ExternalPricePoint>, PriceProviderError> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, symbol);
        let (period1, period2) = Self::period_bounds(start, end);

        let resp = self
            .client
            .get(&url)
            .query(&[
                ("interval", "1d".to_string()),
                ("period1", period1.to_string()),
                ("period2", period2.to_string()),
            ])
            .send()
            .await
            .map_err(|e| PriceProviderError::Network(e.to_string()))?;

        let status = resp.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(PriceProviderError::RateLimited);
        }
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(PriceProviderError::NotFound);
        }
        if !status.is_success() {
            return Err(PriceProviderError::BadResponse(format!("HTTP {}", status)));
        }

        let body: YahooChartResponse = resp
            .json()
            .await
            .map_err(|e| PriceProviderError::Parse(e.to_string()))?;

        parse_chart(body, start, end)
    }
}
