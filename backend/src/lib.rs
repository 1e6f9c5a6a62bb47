pub mod client;
pub mod constants;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod server;
pub mod session;
pub mod store;
pub mod swipe;
pub mod utils;
pub mod views;

pub use utils::config::{ClientConfig, Config};
pub use db::connection::get_db_pool;

// Re-export common types
pub use sqlx::PgPool;
pub use anyhow::Result;
pub use uuid::Uuid;
pub use chrono::{DateTime, Utc};
