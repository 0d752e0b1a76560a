use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use tracing::{error, info};

use crate::errors::AppError;
use crate::models::{BenchmarkReturnsCalendar, BenchmarkSeries, CacheCoverage};
use crate::routes::RangeParams;
use crate::services::benchmark_service;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/:symbol", get(get_benchmark_series))
        .route("/:symbol/returns-calendar", get(get_returns_calendar))
        .route("/:symbol/coverage", get(get_coverage))
}

pub async fn get_benchmark_series(
    Path(symbol): Path<String>,
    Query(params): Query<RangeParams>,
    State(state): State<AppState>,
) -> Result<Json<BenchmarkSeries>, AppError> {
    info!("GET /benchmarks/{} - Getting benchmark series", symbol);
    let range = params.resolve_today()?;
    let series = benchmark_service::benchmark_series(&state.benchmarks, &symbol, range)
        .await
        .map_err(|e| {
            error!("Failed to get benchmark series for {}: {}", symbol, e);
            e
        })?;
    Ok(Json(series))
}

pub async fn get_returns_calendar(
    Path(symbol): Path<String>,
    Query(params): Query<RangeParams>,
    State(state): State<AppState>,
) -> Result<Json<BenchmarkReturnsCalendar>, AppError> {
    info!("GET /benchmarks/{}/returns-calendar - Getting returns calendar", symbol);
    let range = params.resolve_today()?;
    let calendar = benchmark_service::benchmark_returns_calendar(&state.benchmarks, &symbol, range)
        .await
        .map_err(|e| {
            error!("Failed to get returns calendar for {}: {}", symbol, e);
            e
        })?;
    Ok(Json(calendar))
}

pub async fn get_coverage(
    Path(symbol): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<CacheCoverage>, AppError> {
    info!("GET /benchmarks/{}/coverage - Getting cache coverage", symbol);
    let coverage = state.benchmarks.coverage(&symbol).await?;
    Ok(Json(coverage))
}
