mod benchmark_price;
mod fx_rate;
mod returns;
mod series;

pub use benchmark_price::{BenchmarkPricePoint, CacheCoverage, DateRange};
pub use fx_rate::FxRate;
pub use returns::{CalendarReturn, ReturnPoint, ReturnsCalendar, ValuePoint};
pub use series::{
    BenchmarkReturnsCalendar, BenchmarkSeries, PerformanceComparison, SectorFailure, SectorOverview,
    SectorSeries,
};
