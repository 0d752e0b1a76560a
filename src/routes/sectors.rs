use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use tracing::info;

use crate::errors::AppError;
use crate::models::SectorOverview;
use crate::routes::RangeParams;
use crate::services::benchmark_service;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(get_sector_series))
}

pub async fn get_sector_series(
    Query(params): Query<RangeParams>,
    State(state): State<AppState>,
) -> Result<Json<SectorOverview>, AppError> {
    info!("GET /sectors - Getting sector ETF series");
    let range = params.resolve_today()?;
    let overview = benchmark_service::sector_series(&state.benchmarks, range).await;
    Ok(Json(overview))
}
