use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use dashmap::DashMap;

use crate::external::price_provider::ExternalPricePoint;
use crate::models::{BenchmarkPricePoint, CacheCoverage};
use crate::store::BenchmarkStore;

/// Process-local store used when no database is configured.
#[derive(Clone, Default)]
pub struct MemoryBenchmarkStore {
    series: Arc<DashMap<String, BTreeMap<NaiveDate, BenchmarkPricePoint>>>,
}

impl MemoryBenchmarkStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total rows held for a symbol.
    pub fn len(&self, symbol: &str) -> usize {
        self.series.get(symbol).map(|s| s.len()).unwrap_or(0)
    }
}

#[async_trait]
impl BenchmarkStore for MemoryBenchmarkStore {
    async fn date_bounds(
        &self,
        symbol: &str,
    ) -> Result<(Option<NaiveDate>, Option<NaiveDate>), sqlx::Error> {
        Ok(match self.series.get(symbol) {
            Some(series) => (
                series.keys().next().copied(),
                series.keys().next_back().copied(),
            ),
            None => (None, None),
        })
    }

    async fn upsert_ignore_conflicts(
        &self,
        symbol: &str,
        points: &[ExternalPricePoint],
    ) -> Result<u64, sqlx::Error> {
        let mut series = self.series.entry(symbol.to_string()).or_default();
        let mut inserted = 0;

        for p in points {
            if !series.contains_key(&p.date) {
                series.insert(p.date, BenchmarkPricePoint::new(symbol, p.date, p.close));
                inserted += 1;
            }
        }

        Ok(inserted)
    }

    async fn fetch_range(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<BenchmarkPricePoint>, sqlx::Error> {
        if start > end {
            return Ok(Vec::new());
        }
        Ok(self
            .series
            .get(symbol)
            .map(|series| series.range(start..=end).map(|(_, p)| p.clone()).collect())
            .unwrap_or_default())
    }

    async fn coverage(&self, symbol: &str) -> Result<CacheCoverage, sqlx::Error> {
        let (first_date, last_date) = self.date_bounds(symbol).await?;
        Ok(CacheCoverage {
            symbol: symbol.to_string(),
            first_date,
            last_date,
            row_count: self.len(symbol) as i64,
        })
    }
}
