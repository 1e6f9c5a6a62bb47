//! Client-side adapter over the backend service.
//!
//! Views talk to `ApiClient` only. Every data call receives the caller's
//! `Session` explicitly; the client holds no identity of its own.

pub mod http;
pub mod local;
pub mod upload;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Analytics, Match, Name, NameDetails, SwipeAction, SwipeResult, UserProfile};

pub use http::HttpApiClient;
pub use local::LocalApiClient;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Invalid login credentials")]
    InvalidCredentials,

    #[error("Session expired or missing")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("{0}")]
    Validation(String),

    #[error("Backend error ({status}): {message}")]
    Backend { status: u16, message: String },

    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl ClientError {
    /// Errors worth another attempt: the request may never have reached the backend.
    pub fn is_transient(&self) -> bool {
        match self {
            ClientError::Transport(_) => true,
            ClientError::Backend { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

/// A signed-in identity, passed into every data call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub user: UserProfile,
}

impl Session {
    pub fn user_id(&self) -> Uuid {
        self.user.id
    }
}

#[async_trait]
pub trait ApiClient: Send + Sync {
    async fn sign_in(&self, login: &str, password: Option<&str>) -> ClientResult<Session>;

    async fn sign_out(&self, session: &Session) -> ClientResult<()>;

    /// Re-validate a stored access token.
    async fn restore_session(&self, access_token: &str) -> ClientResult<Session>;

    /// One name `user_id` has not swiped yet, or `None` when they are all done.
    async fn get_next_name(&self, session: &Session, user_id: Uuid) -> ClientResult<Option<Name>>;

    async fn swipe_name(&self, session: &Session, action: &SwipeAction) -> ClientResult<SwipeResult>;

    async fn get_matches(&self, session: &Session, user_id: Uuid) -> ClientResult<Vec<Match>>;

    async fn get_user_profile(&self, session: &Session, user_id: Uuid) -> ClientResult<UserProfile>;

    async fn get_analytics(&self, session: &Session, user_id: Uuid) -> ClientResult<Analytics>;

    async fn add_name(
        &self,
        session: &Session,
        user_id: Uuid,
        name: &str,
        details: &NameDetails,
    ) -> ClientResult<Uuid>;

    /// Add every non-blank entry. Failed entries are logged and skipped; the
    /// result holds the ids of the names that were added.
    async fn add_names_from_file(&self, session: &Session, user_id: Uuid, names: &[String]) -> Vec<Uuid> {
        let mut added = Vec::new();
        for name in names.iter().map(|n| n.trim()).filter(|n| !n.is_empty()) {
            match self.add_name(session, user_id, name, &NameDetails::default()).await {
                Ok(id) => added.push(id),
                Err(e) => tracing::warn!("Skipping '{}': {}", name, e),
            }
        }
        added
    }

    /// Analytics, or zeroed analytics when the backend cannot provide them.
    async fn analytics_or_default(&self, session: &Session, user_id: Uuid) -> Analytics {
        match self.get_analytics(session, user_id).await {
            Ok(analytics) => analytics,
            Err(e) => {
                tracing::warn!("Failed to load analytics, showing zeroes: {}", e);
                Analytics::default()
            }
        }
    }
}

/// Shared client-side check: the backend trims and validates again.
pub(crate) fn require_name(name: &str) -> ClientResult<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ClientError::Validation("Name cannot be empty".to_string()));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::JOE_USER_ID;
    use crate::store::MemoryStore;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_bulk_add_skips_blank_and_failing_entries() {
        let store = Arc::new(MemoryStore::seeded());
        let client = LocalApiClient::new(store);
        let session = client.sign_in("joe", None).await.unwrap();

        let names = vec![
            "Anders".to_string(),
            "   ".to_string(),
            "Smith".to_string(), // already seeded
            " Brightwater ".to_string(),
        ];
        let added = client.add_names_from_file(&session, JOE_USER_ID, &names).await;
        assert_eq!(added.len(), 2);

        let next = client.get_next_name(&session, JOE_USER_ID).await.unwrap().unwrap();
        assert!(["Anders", "Brightwater"].contains(&next.name.as_str()));
    }

    #[tokio::test]
    async fn test_empty_name_rejected_before_store() {
        let client = LocalApiClient::new(Arc::new(MemoryStore::seeded()));
        let session = client.sign_in("joe", None).await.unwrap();
        let err = client
            .add_name(&session, JOE_USER_ID, "  ", &NameDetails::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
    }

    #[test]
    fn test_transient_classification() {
        assert!(ClientError::Backend { status: 503, message: String::new() }.is_transient());
        assert!(!ClientError::Backend { status: 400, message: String::new() }.is_transient());
        assert!(!ClientError::NotFound("Name".into()).is_transient());
    }
}
