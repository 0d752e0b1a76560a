use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{ReturnPoint, ReturnsCalendar};

#[derive(Debug, Clone, Serialize)]
pub struct BenchmarkSeries {
    pub symbol: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub last_close: Option<f64>,
    pub total_return_pct: Option<f64>,
    pub points: Vec<ReturnPoint>,
    pub stale: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stale_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BenchmarkReturnsCalendar {
    pub symbol: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    #[serde(flatten)]
    pub calendar: ReturnsCalendar,
    pub stale: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SectorSeries {
    pub sector: &'static str,
    #[serde(flatten)]
    pub series: BenchmarkSeries,
}

#[derive(Debug, Clone, Serialize)]
pub struct SectorFailure {
    pub symbol: String,
    pub sector: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SectorOverview {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub sectors: Vec<SectorSeries>,
    pub errors: Vec<SectorFailure>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PerformanceComparison {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub series: Vec<BenchmarkSeries>,
}
