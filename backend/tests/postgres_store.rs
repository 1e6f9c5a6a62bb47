//! Runs the Postgres store against a real database.
//!
//! Set `TEST_DATABASE_URL` to a disposable database to enable these tests;
//! without it every test returns early. Each test clears the fixed users'
//! swipes, matches and uploads before it starts.

use chrono::{Duration, Utc};
use sqlx::PgPool;
use std::sync::OnceLock;
use tokio::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use name_picker::constants::{JOE_USER_ID, SAM_USER_ID, SESSION_TTL_DAYS};
use name_picker::db::migrations::run_migrations;
use name_picker::db::{DatabaseConfig, get_db_pool};
use name_picker::models::{NewName, SwipeAction, SwipeDecision};
use name_picker::store::{ClearedCounts, NameStore, PgStore, StoreError};

struct TestDb {
    store: PgStore,
    pool: PgPool,
    _guard: MutexGuard<'static, ()>,
}

fn db_lock() -> &'static Mutex<()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
}

async fn test_db() -> Option<TestDb> {
    dotenvy::dotenv().ok();
    let Ok(url) = std::env::var("TEST_DATABASE_URL") else {
        eprintln!("TEST_DATABASE_URL not set, skipping Postgres test");
        return None;
    };

    let guard = db_lock().lock().await;
    let pool = get_db_pool(&DatabaseConfig::with_url(url)).await.unwrap();
    run_migrations(&pool).await.unwrap();
    sqlx::query("DELETE FROM sessions").execute(&pool).await.unwrap();

    let store = PgStore::new(pool.clone());
    store.clear_test_data().await.unwrap();
    Some(TestDb {
        store,
        pool,
        _guard: guard,
    })
}

fn swipe(name_id: Uuid, user_id: Uuid, action: SwipeDecision) -> SwipeAction {
    SwipeAction {
        name_id,
        user_id,
        action,
        timestamp: Utc::now(),
    }
}

fn upload(user: Uuid, name: &str) -> NewName {
    NewName::validate(user, name, None, None, None).unwrap()
}

#[tokio::test]
async fn test_candidate_order_and_uploads() {
    let Some(db) = test_db().await else { return };

    let first = db.store.next_unseen_name(JOE_USER_ID).await.unwrap().unwrap();
    assert_eq!(first.name, "Smith");

    let id = db.store.add_user_name(upload(JOE_USER_ID, "TestName123")).await.unwrap();
    for user in [JOE_USER_ID, SAM_USER_ID] {
        let next = db.store.next_unseen_name(user).await.unwrap().unwrap();
        assert_eq!(next.id, id);
        assert!(next.is_user_uploaded);
    }

    let err = db.store.add_user_name(upload(SAM_USER_ID, "testname123")).await.unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)));
}

#[tokio::test]
async fn test_concurrent_likes_create_one_match() {
    let Some(db) = test_db().await else { return };
    let smith = db.store.next_unseen_name(JOE_USER_ID).await.unwrap().unwrap();

    let joe_like = swipe(smith.id, JOE_USER_ID, SwipeDecision::Like);
    let sam_like = swipe(smith.id, SAM_USER_ID, SwipeDecision::Like);
    let (a, b) = tokio::join!(db.store.record_swipe(&joe_like), db.store.record_swipe(&sam_like));

    let matched = [a.unwrap().is_match, b.unwrap().is_match];
    assert_eq!(matched.iter().filter(|m| **m).count(), 1);
    for user in [JOE_USER_ID, SAM_USER_ID] {
        let matches = db.store.user_matches(user).await.unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].name, "Smith");
    }
}

#[tokio::test]
async fn test_failed_swipes_report_the_right_row() {
    let Some(db) = test_db().await else { return };
    let smith = db.store.next_unseen_name(JOE_USER_ID).await.unwrap().unwrap();

    db.store
        .record_swipe(&swipe(smith.id, JOE_USER_ID, SwipeDecision::Dislike))
        .await
        .unwrap();
    let repeat = db
        .store
        .record_swipe(&swipe(smith.id, JOE_USER_ID, SwipeDecision::Like))
        .await
        .unwrap_err();
    assert!(matches!(repeat, StoreError::Conflict(_)));

    let missing_name = Uuid::new_v4();
    let err = db
        .store
        .record_swipe(&swipe(missing_name, JOE_USER_ID, SwipeDecision::Like))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), format!("Name {} not found", missing_name));

    let stranger = Uuid::new_v4();
    let err = db
        .store
        .record_swipe(&swipe(smith.id, stranger, SwipeDecision::Like))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), format!("User profile {} not found", stranger));
}

#[tokio::test]
async fn test_analytics_and_wipe_counts() {
    let Some(db) = test_db().await else { return };

    let zero = db.store.user_analytics(JOE_USER_ID).await.unwrap();
    assert_eq!((zero.total_swipes, zero.likes, zero.dislikes), (0, 0, 0));

    let first = db.store.next_unseen_name(JOE_USER_ID).await.unwrap().unwrap();
    db.store
        .record_swipe(&swipe(first.id, JOE_USER_ID, SwipeDecision::Like))
        .await
        .unwrap();
    let second = db.store.next_unseen_name(JOE_USER_ID).await.unwrap().unwrap();
    db.store
        .record_swipe(&swipe(second.id, JOE_USER_ID, SwipeDecision::Dislike))
        .await
        .unwrap();

    let two = db.store.user_analytics(JOE_USER_ID).await.unwrap();
    assert_eq!((two.total_swipes, two.likes, two.dislikes, two.matches), (2, 1, 1, 0));
    assert_eq!(two.most_popular_names, vec![first.name.clone()]);

    db.store.add_user_name(upload(SAM_USER_ID, "Zephyr")).await.unwrap();
    db.store
        .record_swipe(&swipe(first.id, SAM_USER_ID, SwipeDecision::Like))
        .await
        .unwrap();

    let cleared = db.store.clear_test_data().await.unwrap();
    assert_eq!(cleared, ClearedCounts { matches: 1, swipes: 3, names: 1 });
    assert_eq!(
        db.store.next_unseen_name(JOE_USER_ID).await.unwrap().unwrap().name,
        "Smith"
    );
}

#[tokio::test]
async fn test_expired_sessions_are_ignored_and_pruned() {
    let Some(db) = test_db().await else { return };

    let old = db.store.create_session(SAM_USER_ID).await.unwrap();
    sqlx::query("UPDATE sessions SET created_at = $1 WHERE token = $2")
        .bind(Utc::now() - Duration::days(SESSION_TTL_DAYS + 1))
        .bind(old.token)
        .execute(&db.pool)
        .await
        .unwrap();
    assert!(db.store.session_user(old.token).await.unwrap().is_none());

    let fresh = db.store.create_session(SAM_USER_ID).await.unwrap();
    assert_eq!(db.store.session_user(fresh.token).await.unwrap().unwrap().username, "sam");

    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sessions")
        .fetch_one(&db.pool)
        .await
        .unwrap();
    assert_eq!(remaining, 1);
}
