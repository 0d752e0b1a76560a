use async_trait::async_trait;
use chrono::NaiveDate;

use crate::external::price_provider::ExternalPricePoint;
use crate::models::{BenchmarkPricePoint, CacheCoverage};

mod memory;
mod postgres;

pub use memory::MemoryBenchmarkStore;
pub use postgres::PgBenchmarkStore;

/// Persistent cache of benchmark closes keyed by `(symbol, date)`.
///
/// Rows are only ever inserted; an insert for an existing key is a no-op.
#[async_trait]
pub trait BenchmarkStore: Send + Sync {
    async fn date_bounds(
        &self,
        symbol: &str,
    ) -> Result<(Option<NaiveDate>, Option<NaiveDate>), sqlx::Error>;

    /// Returns the number of rows newly inserted.
    async fn upsert_ignore_conflicts(
        &self,
        symbol: &str,
        points: &[ExternalPricePoint],
    ) -> Result<u64, sqlx::Error>;

    async fn fetch_range(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<BenchmarkPricePoint>, sqlx::Error>;

    async fn coverage(&self, symbol: &str) -> Result<CacheCoverage, sqlx::Error>;
}
