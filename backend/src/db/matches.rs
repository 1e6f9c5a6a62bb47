use sqlx::PgPool;
use uuid::Uuid;

use crate::models::MatchRow;
use crate::store::StoreResult;

/// Every match involving a user, newest first.
pub async fn get_user_matches(pool: &PgPool, user_id: Uuid) -> StoreResult<Vec<MatchRow>> {
    let matches = sqlx::query_as::<_, MatchRow>(
        r#"
        SELECT m.id, m.name_id, n.name, m.user1_id, m.user2_id, m.created_at
        FROM matches m
        JOIN names n ON n.id = m.name_id
        WHERE m.user1_id = $1 OR m.user2_id = $1
        ORDER BY m.created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(matches)
}

pub async fn count_user_matches(pool: &PgPool, user_id: Uuid) -> StoreResult<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM matches WHERE user1_id = $1 OR user2_id = $1",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(count)
}
