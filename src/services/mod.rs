pub mod benchmark_cache;
pub mod benchmark_service;
pub mod fx_cache;
pub mod returns_service;
