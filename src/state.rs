use std::sync::Arc;

use crate::services::benchmark_cache::BenchmarkCache;
use crate::services::fx_cache::FxRateCache;

#[derive(Clone)]
pub struct AppState {
    pub benchmarks: Arc<BenchmarkCache>,
    pub fx_rates: Arc<FxRateCache>,
}
