use std::sync::Arc;

use axum::{routing::get, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use registry_api::database::manager::DatabaseManager;
use registry_api::handlers::{self, AppState};
use registry_api::media::{CleanupQueue, HttpMediaStore};
use registry_api::services::CompanyService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = registry_api::config::config();
    tracing::info!("Starting registry API in {:?} mode", config.environment);

    let pool = DatabaseManager::pool().await?;
    let cleanup = CleanupQueue::start(Arc::new(HttpMediaStore::from_config()));
    let state = AppState { service: CompanyService::new(pool, cleanup) };

    let app = app(state);

    // Allow tests or deployments to override port via env
    let port = std::env::var("REGISTRY_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    tracing::info!("registry API listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}

fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(handlers::company_routes(state))
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "Registry API",
            "version": version,
            "description": "Company registration and profile backend",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "companies": "/api/companies[/:id] (identity via gateway)",
                "search": "/api/companies/search (public)",
                "stats": "/api/companies/stats (public)",
                "check_name": "/api/companies/check-name (public)",
            }
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
