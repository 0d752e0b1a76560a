use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::external::price_provider::PriceProviderError;
use crate::services::benchmark_cache::CacheError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Db(sqlx::Error),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Rate limited by external provider")]
    RateLimited,
    #[error("External error: {0}")]
    External(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let body = |msg: String| Json(json!({ "error": msg }));

        match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, body(msg)).into_response(),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, body(msg)).into_response(),
            AppError::RateLimited => {
                let mut headers = HeaderMap::new();
                headers.insert("Retry-After", HeaderValue::from_static("60"));
                (StatusCode::TOO_MANY_REQUESTS, headers, body("Rate limited".into())).into_response()
            }
            AppError::External(msg) => (StatusCode::BAD_GATEWAY, body(msg)).into_response(),
            AppError::Db(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, body("Internal server error".into())).into_response()
            }
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(value: sqlx::Error) -> Self {
        AppError::Db(value)
    }
}

impl From<PriceProviderError> for AppError {
    fn from(value: PriceProviderError) -> Self {
        match value {
            PriceProviderError::RateLimited => AppError::RateLimited,
            PriceProviderError::NotFound => AppError::NotFound("No data from provider".into()),
            e => AppError::External(e.to_string()),
        }
    }
}

impl From<CacheError> for AppError {
    fn from(value: CacheError) -> Self {
        match value {
            CacheError::InvalidRange(msg) => AppError::Validation(msg),
            CacheError::UpstreamFetch { symbol, source } => match source {
                PriceProviderError::RateLimited => AppError::RateLimited,
                PriceProviderError::NotFound => {
                    AppError::NotFound(format!("No market data found for {}", symbol))
                }
                e => AppError::External(format!("Failed to fetch {}: {}", symbol, e)),
            },
            CacheError::Persistence(e) => AppError::Db(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_errors_map_to_status_codes() {
        let cases = [
            (CacheError::InvalidRange("bad".into()), StatusCode::BAD_REQUEST),
            (
                CacheError::UpstreamFetch { symbol: "SPY".into(), source: PriceProviderError::RateLimited },
                StatusCode::TOO_MANY_REQUESTS,
            ),
            (
                CacheError::UpstreamFetch { symbol: "NOPE".into(), source: PriceProviderError::NotFound },
                StatusCode::NOT_FOUND,
            ),
            (
                CacheError::UpstreamFetch { symbol: "SPY".into(), source: PriceProviderError::Timeout(std::time::Duration::from_secs(20)) },
                StatusCode::BAD_GATEWAY,
            ),
            (CacheError::Persistence(sqlx::Error::PoolTimedOut), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            let resp = AppError::from(err).into_response();
            assert_eq!(resp.status(), expected);
        }
    }

    #[test]
    fn test_rate_limited_sets_retry_after() {
        let resp = AppError::RateLimited.into_response();
        assert_eq!(resp.headers().get("Retry-After").unwrap(), "60");
    }
}
