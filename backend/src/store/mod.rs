//! Storage seam of the backend service.
//!
//! `PgStore` is the production backend; `MemoryStore` keeps the same
//! semantics in process for local runs and tests.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{AnalyticsRow, MatchRow, NameRow, NewName, SessionRow, SwipeAction, SwipeRecord, UserProfile};

pub use memory::MemoryStore;
pub use postgres::PgStore;

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";
const CHECK_VIOLATION: &str = "23514";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid input: {0}")]
    Invalid(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let Some(db_err) = e.as_database_error() {
            let detail = db_err.constraint().unwrap_or("constraint").to_string();
            match db_err.code().as_deref() {
                Some(UNIQUE_VIOLATION) => return StoreError::Conflict(detail),
                Some(FOREIGN_KEY_VIOLATION) => return StoreError::NotFound(detail),
                Some(CHECK_VIOLATION) => return StoreError::Invalid(detail),
                _ => {}
            }
        }
        if matches!(e, sqlx::Error::RowNotFound) {
            return StoreError::NotFound("row".to_string());
        }
        StoreError::Database(e)
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Test-data counts removed by `clear_test_data`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClearedCounts {
    pub matches: u64,
    pub swipes: u64,
    pub names: u64,
}

#[async_trait]
pub trait NameStore: Send + Sync {
    fn backend_tag(&self) -> &'static str;

    /// One name `user_id` has not swiped yet, in candidate order.
    async fn next_unseen_name(&self, user_id: Uuid) -> StoreResult<Option<NameRow>>;

    async fn get_name(&self, name_id: Uuid) -> StoreResult<NameRow>;

    async fn add_user_name(&self, new_name: NewName) -> StoreResult<Uuid>;

    /// Insert a swipe and, on a like, create the match with every other user
    /// who already liked the name. Both happen atomically.
    async fn record_swipe(&self, action: &SwipeAction) -> StoreResult<SwipeRecord>;

    async fn user_matches(&self, user_id: Uuid) -> StoreResult<Vec<MatchRow>>;

    async fn user_analytics(&self, user_id: Uuid) -> StoreResult<AnalyticsRow>;

    async fn get_profile(&self, user_id: Uuid) -> StoreResult<UserProfile>;

    /// Look a profile up by username or email.
    async fn find_profile(&self, login: &str) -> StoreResult<Option<UserProfile>>;

    async fn create_session(&self, user_id: Uuid) -> StoreResult<SessionRow>;

    async fn session_user(&self, token: Uuid) -> StoreResult<Option<UserProfile>>;

    async fn delete_session(&self, token: Uuid) -> StoreResult<()>;

    /// Remove swipes and matches of the fixed users and every uploaded name.
    async fn clear_test_data(&self) -> StoreResult<ClearedCounts>;
}
