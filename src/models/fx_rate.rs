use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FxRate {
    pub base: String,
    pub quote: String,
    pub rate: f64,
    pub fetched_at: DateTime<Utc>,
}
