pub mod analytics;
pub mod connection;
pub mod maintenance;
pub mod matches;
pub mod migrations;
pub mod names;
pub mod swipes;
pub mod users;

pub use connection::{get_db_pool, DatabaseConfig};
