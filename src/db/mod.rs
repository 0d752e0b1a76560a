pub mod benchmark_queries;
