/// HTTP-level tests for the benchmark, sector, comparison and FX endpoints.
///
/// The router runs against the in-memory store and scripted providers, so no
/// database or network access is needed.
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{Datelike, NaiveDate, Weekday};
use parking_lot::Mutex;
use serde_json::Value;
use tower::ServiceExt;

use finboard_backend::app::create_app;
use finboard_backend::external::exchange_rate::ExchangeRateProvider;
use finboard_backend::external::price_provider::{ExternalPricePoint, PriceProvider, PriceProviderError};
use finboard_backend::services::benchmark_cache::{BenchmarkCache, CacheSettings};
use finboard_backend::services::fx_cache::FxRateCache;
use finboard_backend::state::AppState;
use finboard_backend::store::MemoryBenchmarkStore;

// ---------------------------------------------------------------------------
// Test doubles
// ---------------------------------------------------------------------------

/// Weekday closes rising by 1.0 per calendar day from 100.0 at the range start.
struct ScriptedProvider {
    unknown: HashSet<String>,
    calls: Mutex<Vec<(String, NaiveDate, NaiveDate)>>,
}

impl ScriptedProvider {
    fn new(unknown: &[&str]) -> Self {
        Self {
            unknown: unknown.iter().map(|s| s.to_string()).collect(),
            calls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl PriceProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn fetch_daily_closes(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ExternalPricePoint>, PriceProviderError> {
        self.calls.lock().push((symbol.to_string(), start, end));
        if self.unknown.contains(symbol) {
            return Err(PriceProviderError::NotFound);
        }

        Ok(start
            .iter_days()
            .take_while(|day| *day <= end)
            .filter(|day| !matches!(day.weekday(), Weekday::Sat | Weekday::Sun))
            .map(|date| ExternalPricePoint {
                date,
                close: 100.0 + (date - start).num_days() as f64,
            })
            .collect())
    }
}

struct FixedRate;

#[async_trait]
impl ExchangeRateProvider for FixedRate {
    async fn fetch_rate(&self, _base: &str, _quote: &str) -> Result<f64, PriceProviderError> {
        Ok(0.92)
    }
}

fn test_app(unknown: &[&str]) -> (Router, MemoryBenchmarkStore, Arc<ScriptedProvider>) {
    let store = MemoryBenchmarkStore::new();
    let provider = Arc::new(ScriptedProvider::new(unknown));
    let settings = CacheSettings {
        retry_base_delay: Duration::ZERO,
        ..CacheSettings::default()
    };

    let state = AppState {
        benchmarks: Arc::new(BenchmarkCache::new(Arc::new(store.clone()), provider.clone(), settings)),
        fx_rates: Arc::new(FxRateCache::new(Arc::new(FixedRate), Duration::from_secs(3600))),
    };

    (create_app(state), store, provider)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let resp = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or_else(|_| {
        Value::String(String::from_utf8_lossy(&bytes).into_owned())
    });
    (status, body)
}

// ---------------------------------------------------------------------------
// Benchmark series
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_health() {
    let (app, _, _) = test_app(&[]);
    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("OK".into()));
}

#[tokio::test]
async fn test_benchmark_series_is_normalized() {
    let (app, store, _) = test_app(&[]);

    let (status, body) = get(&app, "/api/benchmarks/xlk?start=2024-01-01&end=2024-01-10").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["symbol"], "XLK");
    assert_eq!(body["stale"], false);

    let points = body["points"].as_array().unwrap();
    assert_eq!(points.len(), 8);
    assert_eq!(points[0]["date"], "2024-01-01");
    assert_eq!(points[0]["return_pct"].as_f64().unwrap(), 0.0);
    // 2024-01-10 closes at 109.0
    assert!((points[7]["return_pct"].as_f64().unwrap() - 9.0).abs() < 1e-9);
    assert_eq!(body["last_close"].as_f64().unwrap(), 109.0);

    assert_eq!(store.len("XLK"), 8);
}

#[tokio::test]
async fn test_repeated_request_hits_cache() {
    let (app, store, provider) = test_app(&[]);
    let uri = "/api/benchmarks/SPY?start=2023-01-02&end=2023-03-31";

    get(&app, uri).await;
    let rows = store.len("SPY");
    let (status, _) = get(&app, uri).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(provider.calls.lock().len(), 1);
    assert_eq!(store.len("SPY"), rows);
}

#[tokio::test]
async fn test_inverted_range_is_bad_request() {
    let (app, _, provider) = test_app(&[]);
    let (status, body) = get(&app, "/api/benchmarks/SPY?start=2024-02-01&end=2024-01-01").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("after"));
    assert!(provider.calls.lock().is_empty());
}

#[tokio::test]
async fn test_unknown_symbol_is_not_found() {
    let (app, _, _) = test_app(&["NOPE"]);
    let (status, _) = get(&app, "/api/benchmarks/NOPE?start=2024-01-01&end=2024-01-10").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_returns_calendar() {
    let (app, _, _) = test_app(&[]);
    let (status, body) =
        get(&app, "/api/benchmarks/SPY/returns-calendar?start=2024-01-01&end=2024-03-29").await;

    assert_eq!(status, StatusCode::OK);
    let monthly = body["monthly"].as_array().unwrap();
    assert_eq!(monthly.len(), 3);
    assert_eq!(monthly[0]["year"], 2024);
    assert_eq!(monthly[0]["month"], 1);
    // Jan 31 closes at 130.0 against a 100.0 start
    assert!((monthly[0]["return_pct"].as_f64().unwrap() - 30.0).abs() < 1e-9);

    let yearly = body["yearly"].as_array().unwrap();
    assert_eq!(yearly.len(), 1);
    assert!(yearly[0]["month"].is_null());
}

#[tokio::test]
async fn test_coverage_reflects_cached_rows() {
    let (app, _, _) = test_app(&[]);
    get(&app, "/api/benchmarks/SPY?start=2024-01-01&end=2024-01-10").await;

    let (status, body) = get(&app, "/api/benchmarks/spy/coverage").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["row_count"], 8);
    assert_eq!(body["first_date"], "2024-01-01");
    assert_eq!(body["last_date"], "2024-01-10");
}

// ---------------------------------------------------------------------------
// Sectors and comparison
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_sector_failures_are_reported_not_fatal() {
    let (app, _, _) = test_app(&["XLRE"]);
    let (status, body) = get(&app, "/api/sectors?start=2024-01-01&end=2024-01-31").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sectors"].as_array().unwrap().len(), 10);

    let errors = body["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0]["symbol"], "XLRE");
    assert_eq!(errors[0]["sector"], "Real Estate");

    let tech = body["sectors"]
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["symbol"] == "XLK")
        .unwrap();
    assert_eq!(tech["sector"], "Technology");
}

#[tokio::test]
async fn test_compare_performance() {
    let (app, _, provider) = test_app(&[]);
    let (status, body) =
        get(&app, "/api/performance/compare?symbols=spy,QQQ,SPY&start=2024-01-01&end=2024-01-10").await;

    assert_eq!(status, StatusCode::OK);
    let series = body["series"].as_array().unwrap();
    assert_eq!(series.len(), 2);
    assert_eq!(series[0]["symbol"], "SPY");
    assert_eq!(series[1]["symbol"], "QQQ");

    let fetched: Vec<String> = provider.calls.lock().iter().map(|(s, _, _)| s.clone()).collect();
    assert_eq!(fetched, vec!["SPY", "QQQ"]);
}

#[tokio::test]
async fn test_compare_requires_symbols() {
    let (app, _, _) = test_app(&[]);
    let (status, _) = get(&app, "/api/performance/compare?symbols=,&start=2024-01-01&end=2024-01-10").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_compare_fails_when_any_symbol_fails() {
    let (app, _, _) = test_app(&["NOPE"]);
    let (status, _) =
        get(&app, "/api/performance/compare?symbols=SPY,NOPE&start=2024-01-01&end=2024-01-10").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// FX
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_fx_rate() {
    let (app, _, _) = test_app(&[]);
    let (status, body) = get(&app, "/api/fx/usd/eur").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["base"], "USD");
    assert_eq!(body["quote"], "EUR");
    assert_eq!(body["rate"].as_f64().unwrap(), 0.92);
}

#[tokio::test]
async fn test_fx_rejects_bad_currency_code() {
    let (app, _, _) = test_app(&[]);
    let (status, _) = get(&app, "/api/fx/US/EUR").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
