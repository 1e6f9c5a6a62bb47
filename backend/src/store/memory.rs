use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{ClearedCounts, NameStore, StoreError, StoreResult};
use crate::constants::{MOST_POPULAR_NAMES_LIMIT, SEED_NAMES};
use crate::models::{
    AnalyticsRow, FixedUser, Gender, MatchRow, NameRow, NewName, SessionRow, SwipeAction, SwipeDecision,
    SwipeRecord, SwipeRow, UserProfile, ordered_pair,
};

#[derive(Debug, Default)]
struct MemoryState {
    profiles: Vec<UserProfile>,
    names: Vec<NameRow>,
    swipes: Vec<SwipeRow>,
    matches: Vec<MatchRow>,
    sessions: HashMap<Uuid, SessionRow>,
}

impl MemoryState {
    fn name(&self, name_id: Uuid) -> Option<&NameRow> {
        self.names.iter().find(|n| n.id == name_id)
    }

    fn has_swiped(&self, user_id: Uuid, name_id: Uuid) -> bool {
        self.swipes.iter().any(|s| s.user_id == user_id && s.name_id == name_id)
    }
}

/// In-process store with the same semantics as the Postgres schema.
///
/// A single mutex guards all tables, which makes every operation atomic
/// the way the Postgres transactions are.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The two fixed profiles plus the default surname list.
    pub fn seeded() -> Self {
        let now = Utc::now();
        let state = MemoryState {
            profiles: FixedUser::ALL.iter().map(|u| u.profile(now)).collect(),
            names: SEED_NAMES
                .iter()
                .map(|(name, origin, meaning, popularity)| NameRow {
                    id: Uuid::new_v4(),
                    name: name.to_string(),
                    origin: Some(origin.to_string()),
                    meaning: Some(meaning.to_string()),
                    popularity: Some(*popularity),
                    gender: Some(Gender::Neutral.as_str().to_string()),
                    is_user_uploaded: false,
                    uploaded_by: None,
                    created_at: now,
                })
                .collect(),
            ..Default::default()
        };

        Self {
            state: Mutex::new(state),
        }
    }

    /// Only the fixed profiles, no names.
    pub fn with_profiles() -> Self {
        let now = Utc::now();
        Self {
            state: Mutex::new(MemoryState {
                profiles: FixedUser::ALL.iter().map(|u| u.profile(now)).collect(),
                ..Default::default()
            }),
        }
    }

    /// Insert a non-uploaded name, like the seed migration does.
    pub async fn seed_name(&self, name: &str, popularity: Option<i32>) -> Uuid {
        let id = Uuid::new_v4();
        self.state.lock().await.names.push(NameRow {
            id,
            name: name.to_string(),
            origin: None,
            meaning: None,
            popularity,
            gender: None,
            is_user_uploaded: false,
            uploaded_by: None,
            created_at: Utc::now(),
        });
        id
    }
}

#[async_trait]
impl NameStore for MemoryStore {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn next_unseen_name(&self, user_id: Uuid) -> StoreResult<Option<NameRow>> {
        let state = self.state.lock().await;
        let next = state
            .names
            .iter()
            .filter(|n| !state.has_swiped(user_id, n.id))
            .min_by(|a, b| a.candidate_order(b))
            .cloned();
        Ok(next)
    }

    async fn get_name(&self, name_id: Uuid) -> StoreResult<NameRow> {
        let state = self.state.lock().await;
        state
            .name(name_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("Name {}", name_id)))
    }

    async fn add_user_name(&self, new_name: NewName) -> StoreResult<Uuid> {
        let mut state = self.state.lock().await;
        if new_name.name.trim().is_empty() {
            return Err(StoreError::Invalid("name must not be blank".to_string()));
        }
        if state
            .names
            .iter()
            .any(|n| n.name.to_lowercase() == new_name.name.to_lowercase())
        {
            return Err(StoreError::Conflict(format!("Name '{}' already exists", new_name.name)));
        }

        let id = Uuid::new_v4();
        state.names.push(NameRow {
            id,
            name: new_name.name,
            origin: new_name.origin,
            meaning: new_name.meaning,
            popularity: None,
            gender: new_name.gender.map(|g| g.as_str().to_string()),
            is_user_uploaded: true,
            uploaded_by: Some(new_name.uploaded_by),
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn record_swipe(&self, action: &SwipeAction) -> StoreResult<SwipeRecord> {
        let mut state = self.state.lock().await;

        if state.name(action.name_id).is_none() {
            return Err(StoreError::NotFound(format!("Name {}", action.name_id)));
        }
        if !state.profiles.iter().any(|p| p.id == action.user_id) {
            return Err(StoreError::NotFound(format!("User profile {}", action.user_id)));
        }
        if state.has_swiped(action.user_id, action.name_id) {
            return Err(StoreError::Conflict(format!(
                "User {} already swiped name {}",
                action.user_id, action.name_id
            )));
        }

        let swipe = SwipeRow {
            id: Uuid::new_v4(),
            name_id: action.name_id,
            user_id: action.user_id,
            action: action.action.as_str().to_string(),
            created_at: action.timestamp,
        };

        let mut created = Vec::new();
        if action.action == SwipeDecision::Like {
            let partners: Vec<Uuid> = state
                .swipes
                .iter()
                .filter(|s| s.name_id == action.name_id && s.user_id != action.user_id && s.is_like())
                .map(|s| s.user_id)
                .collect();

            let name = state.name(action.name_id).map(|n| n.name.clone()).unwrap_or_default();
            for partner in partners {
                let (user1_id, user2_id) = ordered_pair(action.user_id, partner);
                let exists = state
                    .matches
                    .iter()
                    .any(|m| m.name_id == action.name_id && m.user1_id == user1_id && m.user2_id == user2_id);
                if !exists {
                    created.push(MatchRow {
                        id: Uuid::new_v4(),
                        name_id: action.name_id,
                        name: name.clone(),
                        user1_id,
                        user2_id,
                        created_at: Utc::now(),
                    });
                }
            }
        }

        state.swipes.push(swipe.clone());
        let match_id = created.first().map(|m| m.id);
        state.matches.extend(created);

        Ok(SwipeRecord {
            swipe,
            is_match: match_id.is_some(),
            match_id,
        })
    }

    async fn user_matches(&self, user_id: Uuid) -> StoreResult<Vec<MatchRow>> {
        let state = self.state.lock().await;
        let mut matches: Vec<MatchRow> = state
            .matches
            .iter()
            .filter(|m| m.user1_id == user_id || m.user2_id == user_id)
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matches)
    }

    async fn user_analytics(&self, user_id: Uuid) -> StoreResult<AnalyticsRow> {
        let state = self.state.lock().await;
        let own: Vec<&SwipeRow> = state.swipes.iter().filter(|s| s.user_id == user_id).collect();
        let likes = own.iter().filter(|s| s.is_like()).count() as i64;

        let mut like_counts: HashMap<Uuid, i64> = HashMap::new();
        for swipe in state.swipes.iter().filter(|s| s.is_like()) {
            *like_counts.entry(swipe.name_id).or_default() += 1;
        }
        let mut popular: Vec<(String, i64)> = like_counts
            .into_iter()
            .filter_map(|(name_id, count)| state.name(name_id).map(|n| (n.name.clone(), count)))
            .collect();
        popular.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        let analytics = AnalyticsRow {
            total_swipes: own.len() as i64,
            likes,
            dislikes: own.len() as i64 - likes,
            matches: state
                .matches
                .iter()
                .filter(|m| m.user1_id == user_id || m.user2_id == user_id)
                .count() as i64,
            most_popular_names: popular
                .into_iter()
                .take(MOST_POPULAR_NAMES_LIMIT as usize)
                .map(|(name, _)| name)
                .collect(),
            ..Default::default()
        };

        let first = own.iter().map(|s| s.created_at).min();
        let last = own.iter().map(|s| s.created_at).max();
        Ok(analytics.with_timing(first, last))
    }

    async fn get_profile(&self, user_id: Uuid) -> StoreResult<UserProfile> {
        let state = self.state.lock().await;
        state
            .profiles
            .iter()
            .find(|p| p.id == user_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("User profile {}", user_id)))
    }

    async fn find_profile(&self, login: &str) -> StoreResult<Option<UserProfile>> {
        let state = self.state.lock().await;
        Ok(state.profiles.iter().find(|p| p.answers_to(login)).cloned())
    }

    async fn create_session(&self, user_id: Uuid) -> StoreResult<SessionRow> {
        let mut state = self.state.lock().await;
        if !state.profiles.iter().any(|p| p.id == user_id) {
            return Err(StoreError::NotFound(format!("User profile {}", user_id)));
        }
        let now = Utc::now();
        state.sessions.retain(|_, s| !s.is_expired(now));

        let session = SessionRow {
            token: Uuid::new_v4(),
            user_id,
            created_at: now,
        };
        state.sessions.insert(session.token, session.clone());
        Ok(session)
    }

    async fn session_user(&self, token: Uuid) -> StoreResult<Option<UserProfile>> {
        let state = self.state.lock().await;
        Ok(state
            .sessions
            .get(&token)
            .filter(|s| !s.is_expired(Utc::now()))
            .and_then(|s| state.profiles.iter().find(|p| p.id == s.user_id))
            .cloned())
    }

    async fn delete_session(&self, token: Uuid) -> StoreResult<()> {
        self.state.lock().await.sessions.remove(&token);
        Ok(())
    }

    async fn clear_test_data(&self) -> StoreResult<ClearedCounts> {
        let mut state = self.state.lock().await;
        let fixed = FixedUser::ids();

        let uploaded: Vec<Uuid> = state.names.iter().filter(|n| n.is_user_uploaded).map(|n| n.id).collect();

        let before = state.matches.len();
        state.matches.retain(|m| {
            !fixed.contains(&m.user1_id) && !fixed.contains(&m.user2_id) && !uploaded.contains(&m.name_id)
        });
        let matches = (before - state.matches.len()) as u64;

        let before = state.swipes.len();
        state
            .swipes
            .retain(|s| !fixed.contains(&s.user_id) && !uploaded.contains(&s.name_id));
        let swipes = (before - state.swipes.len()) as u64;

        let before = state.names.len();
        state.names.retain(|n| !n.is_user_uploaded);
        let names = (before - state.names.len()) as u64;

        Ok(ClearedCounts { matches, swipes, names })
    }
}
