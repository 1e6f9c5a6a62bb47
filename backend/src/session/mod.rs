//! Who is signed in on this machine.
//!
//! The provider starts out `Resolving`, restores a saved token from the
//! session file, and publishes every identity change on a watch channel.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;
use uuid::Uuid;

use crate::client::{ApiClient, ClientError, Session};

#[derive(Debug, Clone, PartialEq)]
pub enum IdentityState {
    Resolving,
    SignedOut,
    SignedIn(Session),
}

impl IdentityState {
    pub fn session(&self) -> Option<&Session> {
        match self {
            IdentityState::SignedIn(session) => Some(session),
            _ => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("Session file error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Not signed in")]
    SignedOut,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct StoredSession {
    access_token: String,
    user_id: Uuid,
}

/// The saved access token, one JSON document on disk.
#[derive(Debug, Clone)]
pub struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The saved token, if any. An unreadable file counts as no session.
    async fn load(&self) -> Result<Option<StoredSession>, std::io::Error> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };

        match serde_json::from_str(&raw) {
            Ok(stored) => Ok(Some(stored)),
            Err(e) => {
                tracing::warn!("Ignoring corrupt session file {}: {}", self.path.display(), e);
                Ok(None)
            }
        }
    }

    async fn save(&self, session: &Session) -> Result<(), std::io::Error> {
        let stored = StoredSession {
            access_token: session.access_token.clone(),
            user_id: session.user_id(),
        };
        let json = serde_json::to_string_pretty(&stored).map_err(std::io::Error::other)?;
        tokio::fs::write(&self.path, json).await
    }

    async fn clear(&self) -> Result<(), std::io::Error> {
        match tokio::fs::remove_file(&self.path).await {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

pub struct SessionProvider {
    client: Arc<dyn ApiClient>,
    file: SessionFile,
    state: watch::Sender<IdentityState>,
}

impl SessionProvider {
    pub fn new(client: Arc<dyn ApiClient>, file: SessionFile) -> Self {
        let (state, _) = watch::channel(IdentityState::Resolving);
        Self { client, file, state }
    }

    pub fn subscribe(&self) -> watch::Receiver<IdentityState> {
        self.state.subscribe()
    }

    pub fn current(&self) -> IdentityState {
        self.state.borrow().clone()
    }

    pub fn session(&self) -> Option<Session> {
        self.state.borrow().session().cloned()
    }

    /// The signed-in session, or `SessionError::SignedOut`.
    pub fn require_session(&self) -> Result<Session, SessionError> {
        self.session().ok_or(SessionError::SignedOut)
    }

    /// Resolve the identity from the session file. A token the backend no
    /// longer accepts is removed.
    pub async fn restore(&self) -> Result<IdentityState, SessionError> {
        let stored = match self.file.load().await? {
            Some(stored) => stored,
            None => return Ok(self.publish(IdentityState::SignedOut)),
        };

        match self.client.restore_session(&stored.access_token).await {
            Ok(session) => {
                tracing::debug!("Restored session for {}", session.user.username);
                Ok(self.publish(IdentityState::SignedIn(session)))
            }
            Err(ClientError::Unauthorized) => {
                tracing::info!("Saved session expired, signing out");
                self.file.clear().await?;
                Ok(self.publish(IdentityState::SignedOut))
            }
            Err(e) => {
                self.publish(IdentityState::SignedOut);
                Err(e.into())
            }
        }
    }

    pub async fn login(&self, login: &str, password: Option<&str>) -> Result<Session, SessionError> {
        let session = self.client.sign_in(login, password).await?;
        self.file.save(&session).await?;
        tracing::info!("Signed in as {}", session.user.display_name);

        self.publish(IdentityState::SignedIn(session.clone()));
        Ok(session)
    }

    /// Always ends signed out locally, even when the backend call fails.
    pub async fn logout(&self) -> Result<(), SessionError> {
        if let Some(session) = self.session() {
            if let Err(e) = self.client.sign_out(&session).await {
                tracing::warn!("Backend sign-out failed: {}", e);
            }
        }

        self.file.clear().await?;
        self.publish(IdentityState::SignedOut);
        Ok(())
    }

    fn publish(&self, state: IdentityState) -> IdentityState {
        self.state.send_replace(state.clone());
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::LocalApiClient;
    use crate::constants::JOE_USER_ID;
    use crate::store::MemoryStore;
    use std::path::Path;
    use tempfile::tempdir;

    fn provider(store: Arc<MemoryStore>, path: &Path) -> SessionProvider {
        SessionProvider::new(Arc::new(LocalApiClient::new(store)), SessionFile::new(path))
    }

    #[tokio::test]
    async fn test_starts_resolving_then_signed_out() {
        let dir = tempdir().unwrap();
        let provider = provider(Arc::new(MemoryStore::seeded()), &dir.path().join("session.json"));

        assert_eq!(provider.current(), IdentityState::Resolving);
        assert_eq!(provider.restore().await.unwrap(), IdentityState::SignedOut);
        assert!(matches!(provider.require_session(), Err(SessionError::SignedOut)));
    }

    #[tokio::test]
    async fn test_login_survives_restart() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        let store = Arc::new(MemoryStore::seeded());

        let first = provider(store.clone(), &path);
        let mut changes = first.subscribe();
        let session = first.login("joe", None).await.unwrap();
        assert!(changes.has_changed().unwrap());
        assert_eq!(changes.borrow_and_update().session(), Some(&session));

        let second = provider(store, &path);
        let restored = second.restore().await.unwrap();
        assert_eq!(restored.session().map(Session::user_id), Some(JOE_USER_ID));
    }

    #[tokio::test]
    async fn test_logout_clears_file_and_token() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        let store = Arc::new(MemoryStore::seeded());

        let provider = provider(store.clone(), &path);
        let session = provider.login("sam", None).await.unwrap();
        provider.logout().await.unwrap();

        assert!(!path.exists());
        assert_eq!(provider.current(), IdentityState::SignedOut);
        let client = LocalApiClient::new(store);
        assert!(matches!(
            client.restore_session(&session.access_token).await,
            Err(ClientError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_stale_token_is_dropped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        let stored = StoredSession {
            access_token: Uuid::new_v4().to_string(),
            user_id: JOE_USER_ID,
        };
        std::fs::write(&path, serde_json::to_string(&stored).unwrap()).unwrap();

        let provider = provider(Arc::new(MemoryStore::seeded()), &path);
        assert_eq!(provider.restore().await.unwrap(), IdentityState::SignedOut);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_corrupt_file_means_signed_out() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "not json").unwrap();

        let provider = provider(Arc::new(MemoryStore::seeded()), &path);
        assert_eq!(provider.restore().await.unwrap(), IdentityState::SignedOut);
    }
}
