use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::constants::MOST_POPULAR_NAMES_LIMIT;
use crate::db::matches::count_user_matches;
use crate::models::AnalyticsRow;
use crate::store::StoreResult;

pub async fn get_user_analytics(pool: &PgPool, user_id: Uuid) -> StoreResult<AnalyticsRow> {
    let row = sqlx::query(
        r#"
        SELECT COUNT(*) AS total_swipes,
               COUNT(*) FILTER (WHERE action = 'like') AS likes,
               COUNT(*) FILTER (WHERE action = 'dislike') AS dislikes,
               MIN(created_at) AS first_swipe,
               MAX(created_at) AS last_swipe
        FROM swipes
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    let first: Option<DateTime<Utc>> = row.try_get("first_swipe")?;
    let last: Option<DateTime<Utc>> = row.try_get("last_swipe")?;

    let analytics = AnalyticsRow {
        total_swipes: row.try_get("total_swipes")?,
        likes: row.try_get("likes")?,
        dislikes: row.try_get("dislikes")?,
        matches: count_user_matches(pool, user_id).await?,
        most_popular_names: get_most_liked_names(pool, MOST_POPULAR_NAMES_LIMIT).await?,
        ..Default::default()
    };

    Ok(analytics.with_timing(first, last))
}

/// Names with the most likes across all users.
pub async fn get_most_liked_names(pool: &PgPool, limit: i64) -> StoreResult<Vec<String>> {
    let names = sqlx::query_scalar::<_, String>(
        r#"
        SELECT n.name
        FROM swipes s
        JOIN names n ON n.id = s.name_id
        WHERE s.action = 'like'
        GROUP BY n.id, n.name
        ORDER BY COUNT(*) DESC, n.name COLLATE "C" ASC
        LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(names)
}
