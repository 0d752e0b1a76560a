use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::routes::{benchmarks, fx, health, performance, sectors};
use crate::state::AppState;

pub fn create_app(state: AppState) -> Router {
    Router::<AppState>::new()
        .nest("/health", health::router())
        .nest("/api/benchmarks", benchmarks::router())
        .nest("/api/sectors", sectors::router())
        .nest("/api/performance", performance::router())
        .nest("/api/fx", fx::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
