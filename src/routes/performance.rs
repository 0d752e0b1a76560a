use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{error, info};

use crate::errors::AppError;
use crate::models::PerformanceComparison;
use crate::routes::RangeParams;
use crate::services::benchmark_service;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CompareParams {
    /// Comma-separated, e.g. `SPY,QQQ`.
    pub symbols: String,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/compare", get(compare_performance))
}

pub async fn compare_performance(
    Query(params): Query<CompareParams>,
    State(state): State<AppState>,
) -> Result<Json<PerformanceComparison>, AppError> {
    info!("GET /performance/compare - Comparing {}", params.symbols);
    let symbols = benchmark_service::parse_symbol_list(&params.symbols)?;
    let range = RangeParams { start: params.start, end: params.end }.resolve_today()?;

    let comparison = benchmark_service::compare_performance(&state.benchmarks, &symbols, range)
        .await
        .map_err(|e| {
            error!("Failed to compare performance for {:?}: {}", symbols, e);
            e
        })?;
    Ok(Json(comparison))
}
