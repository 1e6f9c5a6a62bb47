use anyhow::Result;
use axum::{
    Router, middleware,
    http::{HeaderValue, Method},
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::db::{self, DatabaseConfig};
use crate::handlers;
use crate::store::{MemoryStore, NameStore, PgStore};
use crate::utils::{Config, StoreBackend};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn NameStore>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: Arc<dyn NameStore>, config: Config) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }

    /// Connect the configured store; Postgres gets its migrations applied first.
    pub async fn from_config(config: Config) -> Result<Self> {
        let store: Arc<dyn NameStore> = match config.store_backend {
            StoreBackend::Postgres => {
                let database_url = config
                    .database_url
                    .clone()
                    .ok_or_else(|| anyhow::anyhow!("DATABASE_URL must be set"))?;
                let mut db_config = DatabaseConfig::with_url(database_url);
                if let Ok(from_env) = DatabaseConfig::from_env() {
                    db_config.max_connections = from_env.max_connections;
                    db_config.acquire_timeout_secs = from_env.acquire_timeout_secs;
                }
                let pool = db::get_db_pool(&db_config).await?;
                db::migrations::run_migrations(&pool).await?;
                Arc::new(PgStore::new(pool))
            }
            StoreBackend::Memory => {
                tracing::warn!("Using the in-memory store; data is lost on restart");
                Arc::new(MemoryStore::seeded())
            }
        };

        tracing::info!("Store backend: {}", store.backend_tag());
        Ok(Self::new(store, config))
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors_layer = create_cors_layer(&state.config);

    let api = Router::new()
        // Auth endpoints
        .route("/auth/login", post(handlers::login))
        .route("/auth/logout", post(handlers::logout))
        .route("/auth/session", get(handlers::current_session))
        // Remote procedures
        .route("/rpc/get_next_unseen_name", post(handlers::get_next_unseen_name))
        .route("/rpc/get_user_matches", post(handlers::get_user_matches))
        .route("/rpc/get_user_analytics", post(handlers::get_user_analytics))
        .route("/rpc/add_user_name", post(handlers::add_user_name))
        // Row endpoints
        .route("/rest/swipes", post(handlers::create_swipe))
        .route("/rest/names/{id}", get(handlers::get_name))
        .route("/rest/user_profiles/{id}", get(handlers::get_user_profile))
        .route_layer(middleware::from_fn_with_state(state.clone(), handlers::require_api_key));

    Router::new()
        .route("/health", get(health_check))
        .merge(api)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(state)
}

fn create_cors_layer(config: &Config) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
        .allow_credentials(false);

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    if origins.is_empty() {
        cors.allow_origin(Any)
    } else {
        cors.allow_origin(origins)
    }
}

async fn health_check() -> &'static str {
    "OK"
}

/// Serve the router on an already bound listener.
pub async fn serve(listener: tokio::net::TcpListener, state: AppState) -> Result<()> {
    let app = create_router(state);
    axum::serve(listener, app).await?;
    Ok(())
}
