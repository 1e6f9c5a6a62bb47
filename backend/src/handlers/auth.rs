use axum::{extract::State, http::StatusCode, response::Json};
use serde::{Deserialize, Serialize};

use super::extract::AuthUser;
use crate::error::AppError;
use crate::models::UserProfile;
use crate::server::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Username or email
    pub login: String,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    pub access_token: String,
    pub user: UserProfile,
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    if let Some(expected) = state.config.login_password.as_deref() {
        if req.password.as_deref() != Some(expected) {
            tracing::info!("Rejected login for '{}': wrong password", req.login);
            return Err(AppError::InvalidCredentials);
        }
    }

    let profile = state
        .store
        .find_profile(&req.login)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    let session = state.store.create_session(profile.id).await?;
    tracing::info!("{} signed in", profile.username);

    Ok(Json(SessionResponse {
        access_token: session.token.to_string(),
        user: profile,
    }))
}

pub async fn logout(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<StatusCode, AppError> {
    state.store.delete_session(user.token).await?;
    tracing::info!("{} signed out", user.profile.username);
    Ok(StatusCode::NO_CONTENT)
}

pub async fn current_session(user: AuthUser) -> Json<SessionResponse> {
    Json(SessionResponse {
        access_token: user.token.to_string(),
        user: user.profile,
    })
}
