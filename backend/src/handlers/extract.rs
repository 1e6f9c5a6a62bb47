use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::constants::API_KEY_HEADER;
use crate::error::AppError;
use crate::models::UserProfile;
use crate::server::AppState;

/// The caller behind a bearer token, resolved once per request.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub profile: UserProfile,
    pub token: Uuid,
}

impl AuthUser {
    pub fn id(&self) -> Uuid {
        self.profile.id
    }

    /// Data calls may only act for the signed-in user.
    pub fn ensure_self(&self, user_id: Uuid) -> Result<(), AppError> {
        if self.profile.id == user_id {
            Ok(())
        } else {
            tracing::warn!("User {} tried to act for {}", self.profile.username, user_id);
            Err(AppError::Forbidden(user_id))
        }
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or(AppError::Unauthorized)?;
        let profile = state
            .store
            .session_user(token)
            .await?
            .ok_or(AppError::Unauthorized)?;

        Ok(AuthUser { profile, token })
    }
}

pub fn bearer_token(headers: &HeaderMap) -> Option<Uuid> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ").or_else(|| value.strip_prefix("bearer "))?;
    token.trim().parse().ok()
}

/// Reject requests without the configured public API key. A server without a
/// key configured accepts everything.
pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if let Some(expected) = state.config.public_api_key.as_deref() {
        let provided = request
            .headers()
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok());
        if provided != Some(expected) {
            return Err(AppError::InvalidApiKey);
        }
    }

    Ok(next.run(request).await)
}
