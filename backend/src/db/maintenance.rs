use sqlx::PgPool;
use uuid::Uuid;

use crate::store::{ClearedCounts, StoreResult};

/// Wipe what tests and manual sessions leave behind: the fixed users' swipes
/// and matches plus every uploaded name. Seeded names and profiles stay.
pub async fn clear_test_data(pool: &PgPool, user_ids: &[Uuid]) -> StoreResult<ClearedCounts> {
    let mut tx = pool.begin().await?;

    let matches = sqlx::query("DELETE FROM matches WHERE user1_id = ANY($1) OR user2_id = ANY($1)")
        .bind(user_ids)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    let swipes = sqlx::query("DELETE FROM swipes WHERE user_id = ANY($1)")
        .bind(user_ids)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    let names = sqlx::query("DELETE FROM names WHERE is_user_uploaded = TRUE")
        .execute(&mut *tx)
        .await?
        .rows_affected();

    tx.commit().await?;

    Ok(ClearedCounts { matches, swipes, names })
}
