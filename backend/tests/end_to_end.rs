use chrono::Utc;
use std::sync::Arc;
use tokio::net::TcpListener;
use uuid::Uuid;

use name_picker::client::{ApiClient, ClientError, HttpApiClient, Session};
use name_picker::constants::{JOE_USER_ID, SAM_USER_ID};
use name_picker::models::{NameDetails, SwipeAction, SwipeDecision, SwipeDirection};
use name_picker::server::{self, AppState};
use name_picker::store::MemoryStore;
use name_picker::swipe::{Gesture, Pacing, SwipeMachine, SwipeState};
use name_picker::{ClientConfig, Config};

async fn spawn_server(config: Config) -> String {
    let state = AppState::new(Arc::new(MemoryStore::seeded()), config);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(server::serve(listener, state));
    format!("http://{}", addr)
}

async fn local_backend() -> HttpApiClient {
    let url = spawn_server(Config::local()).await;
    HttpApiClient::new(&ClientConfig::for_url(url)).unwrap()
}

async fn sign_in_both(client: &HttpApiClient) -> (Session, Session) {
    let joe = client.sign_in("joe", None).await.unwrap();
    let sam = client.sign_in("sam", None).await.unwrap();
    (joe, sam)
}

fn swipe(name_id: Uuid, user_id: Uuid, action: SwipeDecision) -> SwipeAction {
    SwipeAction {
        name_id,
        user_id,
        action,
        timestamp: Utc::now(),
    }
}

#[tokio::test]
async fn test_mutual_like_on_smith_is_a_match_for_both() {
    let client = local_backend().await;
    let (joe, sam) = sign_in_both(&client).await;

    let smith = client.get_next_name(&joe, JOE_USER_ID).await.unwrap().unwrap();
    assert_eq!(smith.name, "Smith");

    let first = client
        .swipe_name(&joe, &swipe(smith.id, JOE_USER_ID, SwipeDecision::Like))
        .await
        .unwrap();
    assert!(!first.is_match);
    assert!(client.get_matches(&joe, JOE_USER_ID).await.unwrap().is_empty());

    let second = client
        .swipe_name(&sam, &swipe(smith.id, SAM_USER_ID, SwipeDecision::Like))
        .await
        .unwrap();
    assert!(second.is_match);
    assert_eq!(second.name.name, "Smith");

    for (session, user_id) in [(&joe, JOE_USER_ID), (&sam, SAM_USER_ID)] {
        let matches = client.get_matches(session, user_id).await.unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].name, "Smith");
        assert!(matches[0].involves(JOE_USER_ID) && matches[0].involves(SAM_USER_ID));
    }
}

#[tokio::test]
async fn test_like_and_dislike_is_not_a_match() {
    let client = local_backend().await;
    let (joe, sam) = sign_in_both(&client).await;
    let smith = client.get_next_name(&joe, JOE_USER_ID).await.unwrap().unwrap();

    client
        .swipe_name(&joe, &swipe(smith.id, JOE_USER_ID, SwipeDecision::Like))
        .await
        .unwrap();
    let result = client
        .swipe_name(&sam, &swipe(smith.id, SAM_USER_ID, SwipeDecision::Dislike))
        .await
        .unwrap();

    assert!(!result.is_match);
    assert!(client.get_matches(&sam, SAM_USER_ID).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_concurrent_likes_create_one_match() {
    let client = local_backend().await;
    let (joe, sam) = sign_in_both(&client).await;
    let smith = client.get_next_name(&joe, JOE_USER_ID).await.unwrap().unwrap();

    let joe_like = swipe(smith.id, JOE_USER_ID, SwipeDecision::Like);
    let sam_like = swipe(smith.id, SAM_USER_ID, SwipeDecision::Like);
    let (a, b) = tokio::join!(client.swipe_name(&joe, &joe_like), client.swipe_name(&sam, &sam_like));

    let matched = [a.unwrap().is_match, b.unwrap().is_match];
    assert_eq!(matched.iter().filter(|m| **m).count(), 1);
    assert_eq!(client.get_matches(&joe, JOE_USER_ID).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_uploaded_name_is_next_for_both_users() {
    let client = local_backend().await;
    let (joe, sam) = sign_in_both(&client).await;

    let id = client
        .add_name(&joe, JOE_USER_ID, "  TestName123 ", &NameDetails::default())
        .await
        .unwrap();

    for (session, user_id) in [(&joe, JOE_USER_ID), (&sam, SAM_USER_ID)] {
        let next = client.get_next_name(session, user_id).await.unwrap().unwrap();
        assert_eq!(next.id, id);
        assert_eq!(next.name, "TestName123");
    }

    let duplicate = client
        .add_name(&sam, SAM_USER_ID, "testname123", &NameDetails::default())
        .await
        .unwrap_err();
    assert!(matches!(duplicate, ClientError::Conflict(_)));
}

#[tokio::test]
async fn test_analytics_counters_follow_swipes() {
    let client = local_backend().await;
    let (joe, _) = sign_in_both(&client).await;

    let start = client.get_analytics(&joe, JOE_USER_ID).await.unwrap();
    assert_eq!((start.total_swipes, start.likes, start.dislikes), (0, 0, 0));

    let first = client.get_next_name(&joe, JOE_USER_ID).await.unwrap().unwrap();
    client
        .swipe_name(&joe, &swipe(first.id, JOE_USER_ID, SwipeDecision::Like))
        .await
        .unwrap();
    let after_like = client.get_analytics(&joe, JOE_USER_ID).await.unwrap();
    assert_eq!((after_like.total_swipes, after_like.likes, after_like.dislikes), (1, 1, 0));
    assert_eq!(after_like.most_popular_names, vec![first.name.clone()]);

    let second = client.get_next_name(&joe, JOE_USER_ID).await.unwrap().unwrap();
    assert_ne!(second.id, first.id);
    client
        .swipe_name(&joe, &swipe(second.id, JOE_USER_ID, SwipeDecision::Dislike))
        .await
        .unwrap();
    let after_dislike = client.get_analytics(&joe, JOE_USER_ID).await.unwrap();
    assert_eq!(
        (after_dislike.total_swipes, after_dislike.likes, after_dislike.dislikes),
        (2, 1, 1)
    );
    assert_eq!(after_dislike.matches, 0);
}

#[tokio::test]
async fn test_swipe_machine_runs_until_exhausted() {
    let client: Arc<dyn ApiClient> = Arc::new(local_backend().await);
    let session = client.sign_in("sam", None).await.unwrap();
    let mut machine = SwipeMachine::new(client.clone(), session.clone()).with_pacing(Pacing::immediate());

    machine.start().await.unwrap();
    let mut seen = Vec::new();
    while let SwipeState::Showing(name) = machine.state() {
        assert!(!seen.contains(&name.id), "{} offered twice", name.name);
        seen.push(name.id);
        machine.swipe(Gesture::Button(SwipeDirection::Left)).await.unwrap();
    }

    assert_eq!(machine.state(), SwipeState::Exhausted);
    assert_eq!(seen.len(), 8);
    assert_eq!(machine.swipe_count(), 8);
    assert!(client.get_next_name(&session, SAM_USER_ID).await.unwrap().is_none());
}

#[tokio::test]
async fn test_repeat_and_unknown_swipes_fail() {
    let client = local_backend().await;
    let (joe, _) = sign_in_both(&client).await;
    let smith = client.get_next_name(&joe, JOE_USER_ID).await.unwrap().unwrap();

    client
        .swipe_name(&joe, &swipe(smith.id, JOE_USER_ID, SwipeDecision::Dislike))
        .await
        .unwrap();
    let repeat = client
        .swipe_name(&joe, &swipe(smith.id, JOE_USER_ID, SwipeDecision::Like))
        .await
        .unwrap_err();
    assert!(matches!(repeat, ClientError::Conflict(_)));

    let unknown = client
        .swipe_name(&joe, &swipe(Uuid::new_v4(), JOE_USER_ID, SwipeDecision::Like))
        .await
        .unwrap_err();
    assert!(matches!(unknown, ClientError::NotFound(_)));
}

#[tokio::test]
async fn test_auth_rules() {
    let client = local_backend().await;

    let err = client.sign_in("alex", None).await.unwrap_err();
    assert!(matches!(err, ClientError::InvalidCredentials));

    let (joe, _) = sign_in_both(&client).await;
    let err = client.get_matches(&joe, SAM_USER_ID).await.unwrap_err();
    assert!(matches!(err, ClientError::Forbidden(_)));

    // Profiles are readable by any signed-in user
    let sam = client.get_user_profile(&joe, SAM_USER_ID).await.unwrap();
    assert_eq!(sam.username, "sam");

    let restored = client.restore_session(&joe.access_token).await.unwrap();
    assert_eq!(restored.user_id(), JOE_USER_ID);

    client.sign_out(&joe).await.unwrap();
    let err = client.get_next_name(&joe, JOE_USER_ID).await.unwrap_err();
    assert!(matches!(err, ClientError::Unauthorized));
}

#[tokio::test]
async fn test_public_api_key_is_enforced() {
    let config = Config {
        public_api_key: Some("anon-key".to_string()),
        ..Config::local()
    };
    let url = spawn_server(config).await;

    let health = reqwest::get(format!("{}/health", url)).await.unwrap();
    assert!(health.status().is_success());

    let without_key = HttpApiClient::new(&ClientConfig::for_url(url.clone())).unwrap();
    assert!(without_key.sign_in("joe", None).await.is_err());

    let mut config = ClientConfig::for_url(url);
    config.api_key = Some("anon-key".to_string());
    let with_key = HttpApiClient::new(&config).unwrap();
    let joe = with_key.sign_in("joe", None).await.unwrap();
    assert_eq!(joe.user.display_name, "Joe");
}

#[tokio::test]
async fn test_login_password_when_configured() {
    let config = Config {
        login_password: Some("together".to_string()),
        ..Config::local()
    };
    let client = HttpApiClient::new(&ClientConfig::for_url(spawn_server(config).await)).unwrap();

    assert!(matches!(
        client.sign_in("joe", None).await,
        Err(ClientError::InvalidCredentials)
    ));
    assert!(client.sign_in("joe@namepicker.local", Some("together")).await.is_ok());
}
