use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{SwipeAction, SwipeDecision, SwipeRecord, SwipeRow};
use crate::store::{StoreError, StoreResult};

const SWIPES_USER_FKEY: &str = "swipes_user_id_fkey";

/// Insert a swipe and detect matches in one transaction.
///
/// Swipes on the same name are serialized with a transaction-scoped advisory
/// lock, so two concurrent likes always see each other and exactly one of
/// them creates the match. The sorted pair plus `ON CONFLICT DO NOTHING`
/// keeps the match unique.
pub async fn record_swipe(pool: &PgPool, action: &SwipeAction) -> StoreResult<SwipeRecord> {
    let mut tx = pool.begin().await?;

    sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1::text))")
        .bind(action.name_id)
        .execute(&mut *tx)
        .await?;

    let swipe = sqlx::query_as::<_, SwipeRow>(
        r#"
        INSERT INTO swipes (id, name_id, user_id, action, created_at)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, name_id, user_id, action, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(action.name_id)
    .bind(action.user_id)
    .bind(action.action.as_str())
    .bind(action.timestamp)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| insert_error(e, action))?;

    let mut match_ids = Vec::new();
    if action.action == SwipeDecision::Like {
        match_ids = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO matches (id, name_id, user1_id, user2_id)
            SELECT gen_random_uuid(), $1, LEAST($2, s.user_id), GREATEST($2, s.user_id)
            FROM swipes s
            WHERE s.name_id = $1 AND s.user_id <> $2 AND s.action = 'like'
            ON CONFLICT (name_id, user1_id, user2_id) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(action.name_id)
        .bind(action.user_id)
        .fetch_all(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    if let Some(match_id) = match_ids.first() {
        tracing::info!("Match {} created on name {}", match_id, action.name_id);
    }

    Ok(SwipeRecord {
        swipe,
        is_match: !match_ids.is_empty(),
        match_id: match_ids.first().copied(),
    })
}

fn insert_error(e: sqlx::Error, action: &SwipeAction) -> StoreError {
    match StoreError::from(e) {
        StoreError::Conflict(_) => StoreError::Conflict(format!(
            "User {} already swiped name {}",
            action.user_id, action.name_id
        )),
        StoreError::NotFound(constraint) => missing_row(&constraint, action),
        other => other,
    }
}

/// Name the row a failed foreign key on `swipes` points at.
fn missing_row(constraint: &str, action: &SwipeAction) -> StoreError {
    if constraint == SWIPES_USER_FKEY {
        StoreError::NotFound(format!("User profile {}", action.user_id))
    } else {
        StoreError::NotFound(format!("Name {}", action.name_id))
    }
}
