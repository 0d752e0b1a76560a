use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use tracing::{error, info};

use crate::errors::AppError;
use crate::models::FxRate;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/:base/:quote", get(get_fx_rate))
}

fn validate_currency(code: &str) -> Result<(), AppError> {
    if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(())
    } else {
        Err(AppError::Validation(format!("invalid currency code: {}", code)))
    }
}

pub async fn get_fx_rate(
    Path((base, quote)): Path<(String, String)>,
    State(state): State<AppState>,
) -> Result<Json<FxRate>, AppError> {
    info!("GET /fx/{}/{} - Getting exchange rate", base, quote);
    validate_currency(&base)?;
    validate_currency(&quote)?;

    let rate = state.fx_rates.get_rate(&base, &quote).await.map_err(|e| {
        error!("Failed to get exchange rate {}/{}: {}", base, quote, e);
        AppError::from(e)
    })?;
    Ok(Json(rate))
}
