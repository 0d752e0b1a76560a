use std::sync::Arc;
use std::time::Duration;

use chrono::{Months, NaiveDate, Utc};
use thiserror::Error;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

use crate::external::price_provider::{ExternalPricePoint, PriceProvider, PriceProviderError};
use crate::models::{BenchmarkPricePoint, CacheCoverage, DateRange};
use crate::store::BenchmarkStore;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("invalid range: {0}")]
    InvalidRange(String),

    #[error("upstream fetch failed for {symbol}: {source}")]
    UpstreamFetch {
        symbol: String,
        #[source]
        source: PriceProviderError,
    },

    #[error("persistence error: {0}")]
    Persistence(#[from] sqlx::Error),
}

#[derive(Debug, Clone)]
pub struct CacheSettings {
    /// Width of one upstream request window, in years.
    pub chunk_years: u32,
    /// Upper bound on a single upstream chunk request.
    pub fetch_timeout: Duration,
    /// Retries for transient upstream errors, per chunk.
    pub max_retries: u32,
    pub retry_base_delay: Duration,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            chunk_years: 5,
            fetch_timeout: Duration::from_secs(20),
            max_retries: 3,
            retry_base_delay: Duration::from_secs(2),
        }
    }
}

/// What a single `ensure` call did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FillReport {
    pub chunks: Vec<DateRange>,
    pub rows_written: u64,
}

impl FillReport {
    pub fn fetched(&self) -> bool {
        !self.chunks.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Freshness {
    Fresh,
    /// Upstream failed; points come from whatever was already cached.
    Stale { reason: String },
}

impl Freshness {
    pub fn is_stale(&self) -> bool {
        matches!(self, Freshness::Stale { .. })
    }
}

#[derive(Debug, Clone)]
pub struct SeriesLoad {
    pub symbol: String,
    pub range: DateRange,
    pub points: Vec<BenchmarkPricePoint>,
    pub freshness: Freshness,
}

/// Trims and upper-cases a ticker; rejects blank input.
pub fn normalize_symbol(symbol: &str) -> Result<String, CacheError> {
    let symbol = symbol.trim();
    if symbol.is_empty() {
        return Err(CacheError::InvalidRange("symbol must not be empty".into()));
    }
    Ok(symbol.to_uppercase())
}

/// Ranges that must be fetched so the cache covers `request`.
///
/// `bounds` are the cached min/max dates. The cache is assumed contiguous
/// between them, so gaps always extend up to (and include) an existing
/// bound rather than leaving a hole. `ensure` keeps that true on partial
/// failure by filling each gap outward from the bound it touches.
pub fn plan_gaps(
    request: DateRange,
    bounds: (Option<NaiveDate>, Option<NaiveDate>),
    today: NaiveDate,
) -> Vec<DateRange> {
    let yesterday = today.pred_opt().unwrap_or(today);

    let (min, max) = match bounds {
        (Some(min), Some(max)) => (min, max),
        _ => return vec![request],
    };

    let mut gaps = Vec::new();

    if min > request.start() {
        if let Ok(gap) = DateRange::new(request.start(), min) {
            gaps.push(gap);
        }
    }

    if max < yesterday && max < request.end() {
        if let Ok(gap) = DateRange::new(max, request.end()) {
            gaps.push(gap);
        }
    }

    gaps
}

/// Splits `range` into consecutive windows of `chunk_years` years.
///
/// Each chunk starts the day after the previous one ends and the last one
/// is clipped to `range.end()`.
pub fn plan_chunks(range: DateRange, chunk_years: u32) -> Vec<DateRange> {
    let months = Months::new(chunk_years.max(1) * 12);
    let mut chunks = Vec::new();
    let mut chunk_start = range.start();

    loop {
        let window_end = chunk_start
            .checked_add_months(months)
            .and_then(|d| d.pred_opt())
            .unwrap_or(range.end());
        let chunk_end = window_end.min(range.end());

        match DateRange::new(chunk_start, chunk_end) {
            Ok(chunk) => chunks.push(chunk),
            Err(_) => break,
        }

        if chunk_end >= range.end() {
            break;
        }
        match chunk_end.succ_opt() {
            Some(next) => chunk_start = next,
            None => break,
        }
    }

    chunks
}

/// Local cache of benchmark daily closes backed by a `BenchmarkStore`,
/// filled on demand from a `PriceProvider`.
pub struct BenchmarkCache {
    store: Arc<dyn BenchmarkStore>,
    provider: Arc<dyn PriceProvider>,
    settings: CacheSettings,
}

impl BenchmarkCache {
    pub fn new(
        store: Arc<dyn BenchmarkStore>,
        provider: Arc<dyn PriceProvider>,
        settings: CacheSettings,
    ) -> Self {
        Self { store, provider, settings }
    }

    pub fn today() -> NaiveDate {
        Utc::now().date_naive()
    }

    /// Make sure every trading day in `[start, end]` is cached for `symbol`.
    pub async fn ensure(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FillReport, CacheError> {
        self.ensure_as_of(symbol, start, end, Self::today()).await
    }

    pub async fn ensure_as_of(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
        today: NaiveDate,
    ) -> Result<FillReport, CacheError> {
        let symbol = normalize_symbol(symbol)?;
        let range = DateRange::new(start, end).map_err(CacheError::InvalidRange)?;

        let bounds = self.store.date_bounds(&symbol).await?;
        let gaps = plan_gaps(range, bounds, today);

        if gaps.is_empty() {
            debug!("✓ {} cached for {}..{}, no fetch needed", symbol, start, end);
            return Ok(FillReport::default());
        }

        let mut report = FillReport::default();

        for gap in gaps {
            let mut chunks = plan_chunks(gap, self.settings.chunk_years);
            // Backward gaps grow down from the cached min, newest chunk first.
            if bounds.0 == Some(gap.end()) {
                chunks.reverse();
            }

            for chunk in chunks {
                let points = self.fetch_chunk(&symbol, chunk).await?;
                let points: Vec<ExternalPricePoint> =
                    points.into_iter().filter(|p| chunk.contains(p.date)).collect();

                let written = self.store.upsert_ignore_conflicts(&symbol, &points).await?;
                debug!(
                    "{} chunk {}..{}: {} fetched, {} new",
                    symbol,
                    chunk.start(),
                    chunk.end(),
                    points.len(),
                    written
                );

                report.rows_written += written;
                report.chunks.push(chunk);
            }
        }

        info!(
            "✓ Filled {} for {}..{}: {} chunk(s), {} new row(s)",
            symbol,
            start,
            end,
            report.chunks.len(),
            report.rows_written
        );
        Ok(report)
    }

    /// Cached points in `[start, end]`, oldest first. Never touches upstream.
    pub async fn read(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<BenchmarkPricePoint>, CacheError> {
        let symbol = normalize_symbol(symbol)?;
        DateRange::new(start, end).map_err(CacheError::InvalidRange)?;
        Ok(self.store.fetch_range(&symbol, start, end).await?)
    }

    /// `ensure` followed by `read`.
    ///
    /// An upstream failure degrades to the cached points flagged as stale,
    /// unless nothing at all is cached for the range.
    pub async fn load(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<SeriesLoad, CacheError> {
        self.load_as_of(symbol, start, end, Self::today()).await
    }

    pub async fn load_as_of(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
        today: NaiveDate,
    ) -> Result<SeriesLoad, CacheError> {
        let symbol = normalize_symbol(symbol)?;
        let range = DateRange::new(start, end).map_err(CacheError::InvalidRange)?;

        let upstream_error = match self.ensure_as_of(&symbol, start, end, today).await {
            Ok(_) => None,
            Err(err @ CacheError::UpstreamFetch { .. }) => Some(err),
            Err(err) => return Err(err),
        };

        let points = self.read(&symbol, start, end).await?;

        let freshness = match upstream_error {
            None => Freshness::Fresh,
            Some(err) if points.is_empty() => return Err(err),
            Some(err) => {
                warn!("Serving stale cache for {} ({} points): {}", symbol, points.len(), err);
                Freshness::Stale { reason: err.to_string() }
            }
        };

        Ok(SeriesLoad { symbol, range, points, freshness })
    }

    pub async fn coverage(&self, symbol: &str) -> Result<CacheCoverage, CacheError> {
        let symbol = normalize_symbol(symbol)?;
        Ok(self.store.coverage(&symbol).await?)
    }

    async fn fetch_chunk(
        &self,
        symbol: &str,
        chunk: DateRange,
    ) -> Result<Vec<ExternalPricePoint>, CacheError> {
        let mut retry_count = 0;

        loop {
            let attempt = timeout(
                self.settings.fetch_timeout,
                self.provider.fetch_daily_closes(symbol, chunk.start(), chunk.end()),
            )
            .await
            .unwrap_or_else(|_| Err(PriceProviderError::Timeout(self.settings.fetch_timeout)));

            match attempt {
                Ok(points) => return Ok(points),
                Err(e) if e.is_transient() && retry_count < self.settings.max_retries => {
                    retry_count += 1;
                    let delay = self.backoff(retry_count);
                    warn!(
                        "{} failed for {} ({}..{}): {}, retrying in {}ms (attempt {}/{})",
                        self.provider.name(),
                        symbol,
                        chunk.start(),
                        chunk.end(),
                        e,
                        delay.as_millis(),
                        retry_count,
                        self.settings.max_retries
                    );
                    sleep(delay).await;
                }
                Err(e) => {
                    warn!("✗ {} failed for {} ({}..{}): {}", self.provider.name(), symbol, chunk.start(), chunk.end(), e);
                    return Err(CacheError::UpstreamFetch { symbol: symbol.to_string(), source: e });
                }
            }
        }
    }

    // Linear backoff with up to 50% jitter.
    fn backoff(&self, retry_count: u32) -> Duration {
        let base = self.settings.retry_base_delay * retry_count;
        base.mul_f64(1.0 + rand::random::<f64>() * 0.5)
    }
}
