use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use uuid::Uuid;

use super::extract::AuthUser;
use crate::error::AppError;
use crate::models::{NameRow, SwipeAction, SwipeRecord, UserProfile};
use crate::server::AppState;

/// Insert a swipe; the response says whether it completed a match.
pub async fn create_swipe(
    State(state): State<AppState>,
    user: AuthUser,
    Json(action): Json<SwipeAction>,
) -> Result<(StatusCode, Json<SwipeRecord>), AppError> {
    user.ensure_self(action.user_id)?;

    let record = state.store.record_swipe(&action).await?;
    tracing::debug!(
        "{} swiped {} on {} (match: {})",
        user.profile.username,
        action.action,
        action.name_id,
        record.is_match
    );

    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn get_name(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(name_id): Path<Uuid>,
) -> Result<Json<NameRow>, AppError> {
    Ok(Json(state.store.get_name(name_id).await?))
}

pub async fn get_user_profile(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(user_id): Path<Uuid>,
) -> Result<Json<UserProfile>, AppError> {
    Ok(Json(state.store.get_profile(user_id).await?))
}
