use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;

use crate::db::benchmark_queries;
use crate::external::price_provider::ExternalPricePoint;
use crate::models::{BenchmarkPricePoint, CacheCoverage};
use crate::store::BenchmarkStore;

#[derive(Clone)]
pub struct PgBenchmarkStore {
    pool: PgPool,
}

impl PgBenchmarkStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BenchmarkStore for PgBenchmarkStore {
    async fn date_bounds(
        &self,
        symbol: &str,
    ) -> Result<(Option<NaiveDate>, Option<NaiveDate>), sqlx::Error> {
        benchmark_queries::fetch_date_bounds(&self.pool, symbol).await
    }

    async fn upsert_ignore_conflicts(
        &self,
        symbol: &str,
        points: &[ExternalPricePoint],
    ) -> Result<u64, sqlx::Error> {
        benchmark_queries::insert_ignore_conflicts(&self.pool, symbol, points).await
    }

    async fn fetch_range(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<BenchmarkPricePoint>, sqlx::Error> {
        benchmark_queries::fetch_range(&self.pool, symbol, start, end).await
    }

    async fn coverage(&self, symbol: &str) -> Result<CacheCoverage, sqlx::Error> {
        benchmark_queries::fetch_coverage(&self.pool, symbol).await
    }
}
