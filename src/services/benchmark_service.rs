use tracing::{info, warn};

use crate::errors::AppError;
use crate::models::{
    BenchmarkReturnsCalendar, BenchmarkSeries, DateRange, PerformanceComparison, SectorFailure,
    SectorOverview, SectorSeries,
};
use crate::services::benchmark_cache::{normalize_symbol, BenchmarkCache, Freshness, SeriesLoad};
use crate::services::returns_service;

/// SPDR Select Sector ETFs.
pub const SECTOR_ETFS: [(&str, &str); 11] = [
    ("XLB", "Materials"),
    ("XLC", "Communication Services"),
    ("XLE", "Energy"),
    ("XLF", "Financials"),
    ("XLI", "Industrials"),
    ("XLK", "Technology"),
    ("XLP", "Consumer Staples"),
    ("XLRE", "Real Estate"),
    ("XLU", "Utilities"),
    ("XLV", "Health Care"),
    ("XLY", "Consumer Discretionary"),
];

pub const MAX_COMPARISON_SYMBOLS: usize = 10;

fn to_series(load: SeriesLoad) -> BenchmarkSeries {
    let values = returns_service::to_value_points(&load.points);
    let (stale, stale_reason) = match load.freshness {
        Freshness::Fresh => (false, None),
        Freshness::Stale { reason } => (true, Some(reason)),
    };

    BenchmarkSeries {
        symbol: load.symbol,
        start: load.range.start(),
        end: load.range.end(),
        last_close: values.last().map(|p| p.value),
        total_return_pct: returns_service::total_return_pct(&values),
        points: returns_service::normalize_to_return_pct(&values),
        stale,
        stale_reason,
    }
}

/// One benchmark rebased to percent return over `range`.
pub async fn benchmark_series(
    cache: &BenchmarkCache,
    symbol: &str,
    range: DateRange,
) -> Result<BenchmarkSeries, AppError> {
    let load = cache.load(symbol, range.start(), range.end()).await?;
    Ok(to_series(load))
}

pub async fn benchmark_returns_calendar(
    cache: &BenchmarkCache,
    symbol: &str,
    range: DateRange,
) -> Result<BenchmarkReturnsCalendar, AppError> {
    let load = cache.load(symbol, range.start(), range.end()).await?;
    let values = returns_service::to_value_points(&load.points);

    Ok(BenchmarkReturnsCalendar {
        symbol: load.symbol,
        start: range.start(),
        end: range.end(),
        calendar: returns_service::returns_calendar(&values),
        stale: load.freshness.is_stale(),
    })
}

/// Every sector ETF over `range`, loaded one after another.
///
/// A sector that cannot be loaded is listed in `errors`; the rest are still
/// returned.
pub async fn sector_series(cache: &BenchmarkCache, range: DateRange) -> SectorOverview {
    let mut sectors = Vec::with_capacity(SECTOR_ETFS.len());
    let mut errors = Vec::new();

    for (symbol, sector) in SECTOR_ETFS {
        match cache.load(symbol, range.start(), range.end()).await {
            Ok(load) => sectors.push(SectorSeries { sector, series: to_series(load) }),
            Err(e) => {
                warn!("Failed to load sector ETF {} ({}): {}", symbol, sector, e);
                errors.push(SectorFailure {
                    symbol: symbol.to_string(),
                    sector,
                    message: e.to_string(),
                });
            }
        }
    }

    info!("Loaded {}/{} sector series", sectors.len(), SECTOR_ETFS.len());
    SectorOverview { start: range.start(), end: range.end(), sectors, errors }
}

/// Parse a comma-separated symbol list: trimmed, upper-cased, de-duplicated
/// in order of first appearance.
pub fn parse_symbol_list(raw: &str) -> Result<Vec<String>, AppError> {
    let mut symbols: Vec<String> = Vec::new();

    for part in raw.split(',').filter(|s| !s.trim().is_empty()) {
        let symbol = normalize_symbol(part)?;
        if !symbols.contains(&symbol) {
            symbols.push(symbol);
        }
    }

    if symbols.is_empty() {
        return Err(AppError::Validation("at least one symbol is required".into()));
    }
    if symbols.len() > MAX_COMPARISON_SYMBOLS {
        return Err(AppError::Validation(format!(
            "at most {} symbols can be compared",
            MAX_COMPARISON_SYMBOLS
        )));
    }

    Ok(symbols)
}

/// Several symbols rebased over the same range. Any failure fails the whole
/// comparison.
pub async fn compare_performance(
    cache: &BenchmarkCache,
    symbols: &[String],
    range: DateRange,
) -> Result<PerformanceComparison, AppError> {
    let mut series = Vec::with_capacity(symbols.len());

    for symbol in symbols {
        let load = cache.load(symbol, range.start(), range.end()).await?;
        series.push(to_series(load));
    }

    Ok(PerformanceComparison { start: range.start(), end: range.end(), series })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_symbol_list_dedupes_and_uppercases() {
        let symbols = parse_symbol_list(" spy,QQQ, ,Spy ,iwm").unwrap();
        assert_eq!(symbols, vec!["SPY", "QQQ", "IWM"]);
    }

    #[test]
    fn test_parse_symbol_list_rejects_empty_and_too_many() {
        assert!(matches!(parse_symbol_list(" , "), Err(AppError::Validation(_))));

        let many = (0..11).map(|i| format!("S{}", i)).collect::<Vec<_>>().join(",");
        assert!(matches!(parse_symbol_list(&many), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_sector_list_has_unique_symbols() {
        let mut symbols: Vec<&str> = SECTOR_ETFS.iter().map(|(s, _)| *s).collect();
        symbols.sort();
        symbols.dedup();
        assert_eq!(symbols.len(), SECTOR_ETFS.len());
    }
}
