use chrono::NaiveDate;
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::DateRange;
use crate::services::benchmark_cache::BenchmarkCache;

pub(crate) mod benchmarks;
pub(crate) mod fx;
pub(crate) mod health;
pub(crate) mod performance;
pub(crate) mod sectors;

/// `?start=YYYY-MM-DD&end=YYYY-MM-DD`; `end` defaults to today and `start`
/// to one year before `end`.
#[derive(Debug, Default, Deserialize)]
pub struct RangeParams {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl RangeParams {
    pub fn resolve(&self, today: NaiveDate) -> Result<DateRange, AppError> {
        let end = self.end.unwrap_or(today);
        match self.start {
            Some(start) => DateRange::new(start, end).map_err(AppError::Validation),
            None => Ok(DateRange::trailing_year(end)),
        }
    }

    pub fn resolve_today(&self) -> Result<DateRange, AppError> {
        self.resolve(BenchmarkCache::today())
    }
}
