use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use super::{ApiClient, ClientError, ClientResult, Session, require_name};
use crate::models::{Analytics, Match, Name, NameDetails, NewName, SwipeAction, SwipeResult, UserProfile};
use crate::store::{NameStore, StoreError};

impl From<StoreError> for ClientError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(what) => ClientError::NotFound(what),
            StoreError::Conflict(what) => ClientError::Conflict(what),
            StoreError::Invalid(what) => ClientError::Validation(what),
            StoreError::Database(e) => ClientError::Backend {
                status: 500,
                message: e.to_string(),
            },
        }
    }
}

/// `ApiClient` that calls a `NameStore` directly, with the same session and
/// access rules the HTTP backend enforces.
#[derive(Clone)]
pub struct LocalApiClient {
    store: Arc<dyn NameStore>,
    login_password: Option<String>,
}

impl LocalApiClient {
    pub fn new<S: NameStore + 'static>(store: Arc<S>) -> Self {
        Self {
            store,
            login_password: None,
        }
    }

    pub fn with_login_password(mut self, password: impl Into<String>) -> Self {
        self.login_password = Some(password.into());
        self
    }

    async fn session_profile(&self, access_token: &str) -> ClientResult<UserProfile> {
        let token: Uuid = access_token.parse().map_err(|_| ClientError::Unauthorized)?;
        self.store
            .session_user(token)
            .await?
            .ok_or(ClientError::Unauthorized)
    }

    async fn authorize(&self, session: &Session, user_id: Uuid) -> ClientResult<UserProfile> {
        let profile = self.session_profile(&session.access_token).await?;
        if profile.id != user_id {
            return Err(ClientError::Forbidden(format!("cannot act for user {}", user_id)));
        }
        Ok(profile)
    }
}

#[async_trait]
impl ApiClient for LocalApiClient {
    async fn sign_in(&self, login: &str, password: Option<&str>) -> ClientResult<Session> {
        if let Some(expected) = self.login_password.as_deref() {
            if password != Some(expected) {
                return Err(ClientError::InvalidCredentials);
            }
        }

        let user = self
            .store
            .find_profile(login)
            .await?
            .ok_or(ClientError::InvalidCredentials)?;
        let session = self.store.create_session(user.id).await?;

        Ok(Session {
            access_token: session.token.to_string(),
            user,
        })
    }

    async fn sign_out(&self, session: &Session) -> ClientResult<()> {
        let token: Uuid = session.access_token.parse().map_err(|_| ClientError::Unauthorized)?;
        self.store.delete_session(token).await?;
        Ok(())
    }

    async fn restore_session(&self, access_token: &str) -> ClientResult<Session> {
        let user = self.session_profile(access_token).await?;
        Ok(Session {
            access_token: access_token.to_string(),
            user,
        })
    }

    async fn get_next_name(&self, session: &Session, user_id: Uuid) -> ClientResult<Option<Name>> {
        self.authorize(session, user_id).await?;
        Ok(self.store.next_unseen_name(user_id).await?.map(Name::from))
    }

    async fn swipe_name(&self, session: &Session, action: &SwipeAction) -> ClientResult<SwipeResult> {
        self.authorize(session, action.user_id).await?;
        let record = self.store.record_swipe(action).await?;
        let name = self.store.get_name(action.name_id).await?;

        Ok(SwipeResult {
            is_match: record.is_match,
            name: Name::from(name),
        })
    }

    async fn get_matches(&self, session: &Session, user_id: Uuid) -> ClientResult<Vec<Match>> {
        self.authorize(session, user_id).await?;
        let rows = self.store.user_matches(user_id).await?;
        Ok(rows.into_iter().map(Match::from).collect())
    }

    async fn get_user_profile(&self, session: &Session, user_id: Uuid) -> ClientResult<UserProfile> {
        self.session_profile(&session.access_token).await?;
        Ok(self.store.get_profile(user_id).await?)
    }

    async fn get_analytics(&self, session: &Session, user_id: Uuid) -> ClientResult<Analytics> {
        self.authorize(session, user_id).await?;
        Ok(Analytics::from(self.store.user_analytics(user_id).await?))
    }

    async fn add_name(
        &self,
        session: &Session,
        user_id: Uuid,
        name: &str,
        details: &NameDetails,
    ) -> ClientResult<Uuid> {
        let name = require_name(name)?;
        self.authorize(session, user_id).await?;

        let new_name = NewName::validate(
            user_id,
            name,
            details.origin.as_deref(),
            details.meaning.as_deref(),
            details.gender.map(|g| g.as_str()),
        )
        .map_err(ClientError::Validation)?;

        Ok(self.store.add_user_name(new_name).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{JOE_USER_ID, SAM_USER_ID};
    use crate::models::{SwipeDecision, SwipeDirection};
    use crate::store::MemoryStore;
    use chrono::Utc;

    fn like(name_id: Uuid, user_id: Uuid) -> SwipeAction {
        SwipeAction {
            name_id,
            user_id,
            action: SwipeDirection::Right.decision(),
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_unknown_login_is_rejected() {
        let client = LocalApiClient::new(Arc::new(MemoryStore::seeded()));
        let err = client.sign_in("alex", None).await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_password_checked_when_configured() {
        let client = LocalApiClient::new(Arc::new(MemoryStore::seeded())).with_login_password("hunter2");
        assert!(matches!(
            client.sign_in("joe", Some("wrong")).await,
            Err(ClientError::InvalidCredentials)
        ));
        let session = client.sign_in("sam@namepicker.local", Some("hunter2")).await.unwrap();
        assert_eq!(session.user_id(), SAM_USER_ID);
    }

    #[tokio::test]
    async fn test_cannot_act_for_the_other_user() {
        let store = Arc::new(MemoryStore::with_profiles());
        let name_id = store.seed_name("Smith", Some(100)).await;
        let client = LocalApiClient::new(store);
        let joe = client.sign_in("joe", None).await.unwrap();

        let err = client.swipe_name(&joe, &like(name_id, SAM_USER_ID)).await.unwrap_err();
        assert!(matches!(err, ClientError::Forbidden(_)));

        let err = client.get_analytics(&joe, SAM_USER_ID).await.unwrap_err();
        assert!(matches!(err, ClientError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_swipe_returns_the_full_name() {
        let store = Arc::new(MemoryStore::with_profiles());
        let name_id = store.seed_name("Smith", Some(100)).await;
        let client = LocalApiClient::new(store);
        let joe = client.sign_in("joe", None).await.unwrap();
        let sam = client.sign_in("sam", None).await.unwrap();

        let first = client.swipe_name(&joe, &like(name_id, JOE_USER_ID)).await.unwrap();
        assert!(!first.is_match);
        assert_eq!(first.name.name, "Smith");

        let second = client.swipe_name(&sam, &like(name_id, SAM_USER_ID)).await.unwrap();
        assert!(second.is_match);

        let matches = client.get_matches(&sam, SAM_USER_ID).await.unwrap();
        assert_eq!(matches.len(), 1);
        assert!(matches[0].involves(JOE_USER_ID));
    }

    #[tokio::test]
    async fn test_repeat_swipe_is_a_conflict() {
        let store = Arc::new(MemoryStore::with_profiles());
        let name_id = store.seed_name("Smith", None).await;
        let client = LocalApiClient::new(store);
        let joe = client.sign_in("joe", None).await.unwrap();

        let mut action = like(name_id, JOE_USER_ID);
        client.swipe_name(&joe, &action).await.unwrap();
        action.action = SwipeDecision::Dislike;
        let err = client.swipe_name(&joe, &action).await.unwrap_err();
        assert!(matches!(err, ClientError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_signed_out_session_is_unauthorized() {
        let client = LocalApiClient::new(Arc::new(MemoryStore::seeded()));
        let joe = client.sign_in("joe", None).await.unwrap();
        client.sign_out(&joe).await.unwrap();

        assert!(matches!(
            client.restore_session(&joe.access_token).await,
            Err(ClientError::Unauthorized)
        ));
        assert!(matches!(
            client.get_next_name(&joe, JOE_USER_ID).await,
            Err(ClientError::Unauthorized)
        ));
    }
}
