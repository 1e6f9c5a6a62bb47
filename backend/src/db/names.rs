use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{NameRow, NewName};
use crate::store::{StoreError, StoreResult};

const NAME_COLUMNS: &str =
    "n.id, n.name, n.origin, n.meaning, n.popularity, n.gender, n.is_user_uploaded, n.uploaded_by, n.created_at";

/// Next candidate for a user: uploads first (newest first), then the most popular seeded names.
pub async fn get_next_unseen_name(pool: &PgPool, user_id: Uuid) -> StoreResult<Option<NameRow>> {
    let query = format!(
        r#"
        SELECT {NAME_COLUMNS}
        FROM names n
        WHERE NOT EXISTS (
            SELECT 1 FROM swipes s WHERE s.name_id = n.id AND s.user_id = $1
        )
        ORDER BY n.is_user_uploaded DESC,
                 CASE WHEN n.is_user_uploaded THEN n.created_at END DESC NULLS LAST,
                 n.popularity DESC NULLS LAST,
                 n.name COLLATE "C" ASC,
                 n.id ASC
        LIMIT 1
        "#
    );

    let name = sqlx::query_as::<_, NameRow>(&query)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

    Ok(name)
}

pub async fn get_name_by_id(pool: &PgPool, name_id: Uuid) -> StoreResult<NameRow> {
    let query = format!("SELECT {NAME_COLUMNS} FROM names n WHERE n.id = $1");

    sqlx::query_as::<_, NameRow>(&query)
        .bind(name_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("Name {}", name_id)))
}

pub async fn add_user_name(pool: &PgPool, new_name: &NewName) -> StoreResult<Uuid> {
    let id = sqlx::query_scalar::<_, Uuid>(
        r#"
        INSERT INTO names (id, name, origin, meaning, gender, is_user_uploaded, uploaded_by)
        VALUES ($1, $2, $3, $4, $5, TRUE, $6)
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&new_name.name)
    .bind(&new_name.origin)
    .bind(&new_name.meaning)
    .bind(new_name.gender.map(|g| g.as_str()))
    .bind(new_name.uploaded_by)
    .fetch_one(pool)
    .await
    .map_err(|e| match StoreError::from(e) {
        StoreError::Conflict(_) => StoreError::Conflict(format!("Name '{}' already exists", new_name.name)),
        other => other,
    })?;

    Ok(id)
}
