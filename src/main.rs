use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;

use finboard_backend::app;
use finboard_backend::config::{AppConfig, ProviderKind};
use finboard_backend::external::exchange_rate::FrankfurterProvider;
use finboard_backend::external::multi_provider::MultiProvider;
use finboard_backend::external::price_provider::PriceProvider;
use finboard_backend::external::twelvedata::TwelveDataProvider;
use finboard_backend::external::yahoofinance::YahooFinanceProvider;
use finboard_backend::logging::{init_logging, LoggingConfig};
use finboard_backend::services::benchmark_cache::BenchmarkCache;
use finboard_backend::services::fx_cache::FxRateCache;
use finboard_backend::state::AppState;
use finboard_backend::store::{BenchmarkStore, MemoryBenchmarkStore, PgBenchmarkStore};

fn build_provider(config: &AppConfig) -> Arc<dyn PriceProvider> {
    // from_lookup guarantees the key whenever Twelve Data is selected
    let twelvedata = || TwelveDataProvider::new(config.twelvedata_api_key.clone().unwrap_or_default());

    match config.price_provider {
        ProviderKind::Yahoo => {
            tracing::info!("📊 Using price provider: Yahoo Finance");
            Arc::new(YahooFinanceProvider::new())
        }
        ProviderKind::TwelveData => {
            tracing::info!("📊 Using price provider: Twelve Data");
            Arc::new(twelvedata())
        }
        ProviderKind::Multi => {
            tracing::info!("📊 Using price provider: Multi-provider (Twelve Data + Yahoo Finance fallback)");
            Arc::new(MultiProvider::new(
                Box::new(twelvedata()),
                Box::new(YahooFinanceProvider::new()),
            ))
        }
    }
}

async fn build_store(config: &AppConfig) -> anyhow::Result<Arc<dyn BenchmarkStore>> {
    let Some(database_url) = &config.database_url else {
        tracing::warn!("DATABASE_URL not set, benchmark cache is in-memory only");
        return Ok(Arc::new(MemoryBenchmarkStore::new()));
    };

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(database_url)
        .await
        .context("failed to connect to database")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("failed to run migrations")?;

    tracing::info!("✓ Database connected, migrations applied");
    Ok(Arc::new(PgBenchmarkStore::new(pool)))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging FIRST
    init_logging(LoggingConfig::from_env())
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {}", e))?;

    let config = AppConfig::from_env().context("invalid configuration")?;

    let store = build_store(&config).await?;
    let provider = build_provider(&config);

    let state = AppState {
        benchmarks: Arc::new(BenchmarkCache::new(store, provider, config.cache.clone())),
        fx_rates: Arc::new(FxRateCache::new(Arc::new(FrankfurterProvider::new()), config.fx_ttl)),
    };
    let app = app::create_app(state);

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    tracing::info!("🚀 Finboard backend running at http://{}/", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
