use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use uuid::Uuid;

use super::{ApiClient, ClientError, ClientResult, Session, require_name};
use crate::constants::API_KEY_HEADER;
use crate::handlers::auth::{LoginRequest, SessionResponse};
use crate::handlers::rpc::{AddNameParams, AnalyticsParams, UserParams};
use crate::models::{
    Analytics, AnalyticsRow, Match, MatchRow, Name, NameDetails, NameRow, SwipeAction, SwipeRecord, SwipeResult,
    UserProfile,
};
use crate::utils::ClientConfig;

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// `ApiClient` over the backend's HTTP contract.
///
/// One attempt per call, no caching. The request timeout is only set when
/// configured.
#[derive(Debug, Clone)]
pub struct HttpApiClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpApiClient {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            base_url: config.backend_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str, access_token: Option<&str>) -> RequestBuilder {
        let mut request = self.http.request(method, format!("{}{}", self.base_url, path));
        if let Some(key) = &self.api_key {
            request = request.header(API_KEY_HEADER, key);
        }
        if let Some(token) = access_token {
            request = request.bearer_auth(token);
        }
        request
    }

    async fn rpc<P, T>(&self, session: &Session, function: &str, params: &P) -> ClientResult<T>
    where
        P: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        tracing::debug!("rpc {} for {}", function, session.user.username);
        let response = self
            .request(Method::POST, &format!("/rpc/{}", function), Some(&session.access_token))
            .json(params)
            .send()
            .await?;
        decode(response).await
    }

    async fn get_row<T: DeserializeOwned>(&self, session: &Session, path: &str) -> ClientResult<T> {
        let response = self
            .request(Method::GET, path, Some(&session.access_token))
            .send()
            .await?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
    let status = response.status();
    if !status.is_success() {
        return Err(error_from_response(response).await);
    }

    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| ClientError::Decode(format!("{} (status {})", e, status)))
}

async fn error_from_response(response: Response) -> ClientError {
    let status = response.status();
    let message = match response.json::<ErrorBody>().await {
        Ok(body) => body.error,
        Err(_) => status.canonical_reason().unwrap_or("request failed").to_string(),
    };
    error_for_status(status, message)
}

fn error_for_status(status: StatusCode, message: String) -> ClientError {
    match status {
        StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
        StatusCode::FORBIDDEN => ClientError::Forbidden(message),
        StatusCode::NOT_FOUND => ClientError::NotFound(message),
        StatusCode::CONFLICT => ClientError::Conflict(message),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => ClientError::Validation(message),
        _ => {
            tracing::error!("Backend returned {}: {}", status, message);
            ClientError::Backend {
                status: status.as_u16(),
                message,
            }
        }
    }
}

fn into_session(response: SessionResponse) -> Session {
    Session {
        access_token: response.access_token,
        user: response.user,
    }
}

#[async_trait]
impl ApiClient for HttpApiClient {
    async fn sign_in(&self, login: &str, password: Option<&str>) -> ClientResult<Session> {
        let body = LoginRequest {
            login: login.trim().to_string(),
            password: password.map(str::to_string),
        };
        let response = self.request(Method::POST, "/auth/login", None).json(&body).send().await?;

        match decode::<SessionResponse>(response).await {
            Ok(session) => Ok(into_session(session)),
            Err(ClientError::Unauthorized) => Err(ClientError::InvalidCredentials),
            Err(e) => Err(e),
        }
    }

    async fn sign_out(&self, session: &Session) -> ClientResult<()> {
        let response = self
            .request(Method::POST, "/auth/logout", Some(&session.access_token))
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(error_from_response(response).await)
        }
    }

    async fn restore_session(&self, access_token: &str) -> ClientResult<Session> {
        let response = self
            .request(Method::GET, "/auth/session", Some(access_token))
            .send()
            .await?;
        decode::<SessionResponse>(response).await.map(into_session)
    }

    async fn get_next_name(&self, session: &Session, user_id: Uuid) -> ClientResult<Option<Name>> {
        let row: Option<NameRow> = self
            .rpc(session, "get_next_unseen_name", &UserParams { user_id })
            .await?;
        Ok(row.map(Name::from))
    }

    async fn swipe_name(&self, session: &Session, action: &SwipeAction) -> ClientResult<SwipeResult> {
        let response = self
            .request(Method::POST, "/rest/swipes", Some(&session.access_token))
            .json(action)
            .send()
            .await?;
        let record: SwipeRecord = decode(response).await?;

        let name: NameRow = self
            .get_row(session, &format!("/rest/names/{}", action.name_id))
            .await?;

        Ok(SwipeResult {
            is_match: record.is_match,
            name: Name::from(name),
        })
    }

    async fn get_matches(&self, session: &Session, user_id: Uuid) -> ClientResult<Vec<Match>> {
        let rows: Vec<MatchRow> = self
            .rpc(session, "get_user_matches", &UserParams { user_id })
            .await?;
        Ok(rows.into_iter().map(Match::from).collect())
    }

    async fn get_user_profile(&self, session: &Session, user_id: Uuid) -> ClientResult<UserProfile> {
        self.get_row(session, &format!("/rest/user_profiles/{}", user_id)).await
    }

    async fn get_analytics(&self, session: &Session, user_id: Uuid) -> ClientResult<Analytics> {
        let row: AnalyticsRow = self
            .rpc(session, "get_user_analytics", &AnalyticsParams { target_user_id: user_id })
            .await?;
        Ok(Analytics::from(row))
    }

    async fn add_name(
        &self,
        session: &Session,
        user_id: Uuid,
        name: &str,
        details: &NameDetails,
    ) -> ClientResult<Uuid> {
        let name = require_name(name)?;
        let params = AddNameParams {
            name_text: name.to_string(),
            user_id,
            origin_text: details.origin.clone(),
            meaning_text: details.meaning.clone(),
            gender_text: details.gender.map(|g| g.as_str().to_string()),
        };
        self.rpc(session, "add_user_name", &params).await
    }
}
