use axum::{extract::State, response::Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::extract::AuthUser;
use crate::error::AppError;
use crate::models::{AnalyticsRow, MatchRow, NameRow, NewName};
use crate::server::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserParams {
    pub user_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsParams {
    pub target_user_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddNameParams {
    pub name_text: String,
    pub user_id: Uuid,
    #[serde(default)]
    pub origin_text: Option<String>,
    #[serde(default)]
    pub meaning_text: Option<String>,
    #[serde(default)]
    pub gender_text: Option<String>,
}

/// `get_next_unseen_name(user_id)`: one candidate or `null`.
pub async fn get_next_unseen_name(
    State(state): State<AppState>,
    user: AuthUser,
    Json(params): Json<UserParams>,
) -> Result<Json<Option<NameRow>>, AppError> {
    user.ensure_self(params.user_id)?;
    let name = state.store.next_unseen_name(params.user_id).await?;

    if name.is_none() {
        tracing::debug!("{} has no unseen names left", user.profile.username);
    }

    Ok(Json(name))
}

pub async fn get_user_matches(
    State(state): State<AppState>,
    user: AuthUser,
    Json(params): Json<UserParams>,
) -> Result<Json<Vec<MatchRow>>, AppError> {
    user.ensure_self(params.user_id)?;
    Ok(Json(state.store.user_matches(params.user_id).await?))
}

pub async fn get_user_analytics(
    State(state): State<AppState>,
    user: AuthUser,
    Json(params): Json<AnalyticsParams>,
) -> Result<Json<AnalyticsRow>, AppError> {
    user.ensure_self(params.target_user_id)?;
    Ok(Json(state.store.user_analytics(params.target_user_id).await?))
}

/// `add_user_name(...)`: trims and validates the upload, returns the new id.
pub async fn add_user_name(
    State(state): State<AppState>,
    user: AuthUser,
    Json(params): Json<AddNameParams>,
) -> Result<Json<Uuid>, AppError> {
    user.ensure_self(params.user_id)?;

    let new_name = NewName::validate(
        params.user_id,
        &params.name_text,
        params.origin_text.as_deref(),
        params.meaning_text.as_deref(),
        params.gender_text.as_deref(),
    )
    .map_err(AppError::BadRequest)?;

    let added = new_name.name.clone();
    let id = state.store.add_user_name(new_name).await?;
    tracing::info!("{} added name '{}' ({})", user.profile.username, added, id);

    Ok(Json(id))
}
