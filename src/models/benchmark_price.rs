use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

// A cached daily close for a benchmark index or ETF.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct BenchmarkPricePoint {
    pub id: Uuid,
    pub symbol: String,
    pub date: NaiveDate,
    pub close: f64,
    pub created_at: DateTime<Utc>,
}

impl BenchmarkPricePoint {
    pub fn new(symbol: &str, date: NaiveDate, close: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            symbol: symbol.to_string(),
            date,
            close,
            created_at: Utc::now(),
        }
    }
}

/// Inclusive calendar date range. `start <= end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, String> {
        if start > end {
            return Err(format!("start date {} is after end date {}", start, end));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of calendar days covered, both ends included.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Range ending at `end` and starting one year (365 days) earlier.
    pub fn trailing_year(end: NaiveDate) -> Self {
        Self {
            start: end - Duration::days(365),
            end,
        }
    }
}

/// Min/max cached dates and row count for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheCoverage {
    pub symbol: String,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub row_count: i64,
}
