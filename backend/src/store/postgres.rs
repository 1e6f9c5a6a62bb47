use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{ClearedCounts, NameStore, StoreResult};
use crate::db;
use crate::models::{
    AnalyticsRow, FixedUser, MatchRow, NameRow, NewName, SessionRow, SwipeAction, SwipeRecord, UserProfile,
};

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NameStore for PgStore {
    fn backend_tag(&self) -> &'static str {
        "postgres"
    }

    async fn next_unseen_name(&self, user_id: Uuid) -> StoreResult<Option<NameRow>> {
        db::names::get_next_unseen_name(&self.pool, user_id).await
    }

    async fn get_name(&self, name_id: Uuid) -> StoreResult<NameRow> {
        db::names::get_name_by_id(&self.pool, name_id).await
    }

    async fn add_user_name(&self, new_name: NewName) -> StoreResult<Uuid> {
        db::names::add_user_name(&self.pool, &new_name).await
    }

    async fn record_swipe(&self, action: &SwipeAction) -> StoreResult<SwipeRecord> {
        db::swipes::record_swipe(&self.pool, action).await
    }

    async fn user_matches(&self, user_id: Uuid) -> StoreResult<Vec<MatchRow>> {
        db::matches::get_user_matches(&self.pool, user_id).await
    }

    async fn user_analytics(&self, user_id: Uuid) -> StoreResult<AnalyticsRow> {
        db::analytics::get_user_analytics(&self.pool, user_id).await
    }

    async fn get_profile(&self, user_id: Uuid) -> StoreResult<UserProfile> {
        db::users::get_profile_by_id(&self.pool, user_id).await
    }

    async fn find_profile(&self, login: &str) -> StoreResult<Option<UserProfile>> {
        db::users::find_profile_by_login(&self.pool, login).await
    }

    async fn create_session(&self, user_id: Uuid) -> StoreResult<SessionRow> {
        db::users::create_session(&self.pool, user_id).await
    }

    async fn session_user(&self, token: Uuid) -> StoreResult<Option<UserProfile>> {
        db::users::get_session_user(&self.pool, token).await
    }

    async fn delete_session(&self, token: Uuid) -> StoreResult<()> {
        db::users::delete_session(&self.pool, token).await
    }

    async fn clear_test_data(&self) -> StoreResult<ClearedCounts> {
        db::maintenance::clear_test_data(&self.pool, &FixedUser::ids()).await
    }
}
