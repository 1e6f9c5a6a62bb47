use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{SessionRow, UserProfile};
use crate::store::{StoreError, StoreResult};

pub async fn get_profile_by_id(pool: &PgPool, user_id: Uuid) -> StoreResult<UserProfile> {
    sqlx::query_as::<_, UserProfile>(
        r#"
        SELECT id, username, display_name, email, created_at
        FROM user_profiles
        WHERE id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| StoreError::NotFound(format!("User profile {}", user_id)))
}

pub async fn find_profile_by_login(pool: &PgPool, login: &str) -> StoreResult<Option<UserProfile>> {
    let profile = sqlx::query_as::<_, UserProfile>(
        r#"
        SELECT id, username, display_name, email, created_at
        FROM user_profiles
        WHERE LOWER(username) = LOWER($1) OR LOWER(email) = LOWER($1)
        "#,
    )
    .bind(login.trim())
    .fetch_optional(pool)
    .await?;

    Ok(profile)
}

// Session operations
pub async fn create_session(pool: &PgPool, user_id: Uuid) -> StoreResult<SessionRow> {
    let now = Utc::now();
    let pruned = sqlx::query("DELETE FROM sessions WHERE created_at <= $1")
        .bind(SessionRow::expiry_cutoff(now))
        .execute(pool)
        .await?
        .rows_affected();
    if pruned > 0 {
        tracing::debug!("Pruned {} expired sessions", pruned);
    }

    let session = sqlx::query_as::<_, SessionRow>(
        r#"
        INSERT INTO sessions (token, user_id, created_at)
        VALUES ($1, $2, $3)
        RETURNING token, user_id, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(session)
}

pub async fn get_session_user(pool: &PgPool, token: Uuid) -> StoreResult<Option<UserProfile>> {
    let profile = sqlx::query_as::<_, UserProfile>(
        r#"
        SELECT p.id, p.username, p.display_name, p.email, p.created_at
        FROM sessions s
        JOIN user_profiles p ON p.id = s.user_id
        WHERE s.token = $1 AND s.created_at > $2
        "#,
    )
    .bind(token)
    .bind(SessionRow::expiry_cutoff(Utc::now()))
    .fetch_optional(pool)
    .await?;

    Ok(profile)
}

pub async fn delete_session(pool: &PgPool, token: Uuid) -> StoreResult<()> {
    sqlx::query("DELETE FROM sessions WHERE token = $1")
        .bind(token)
        .execute(pool)
        .await?;

    Ok(())
}
