use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::constants::{JOE_USER_ID, SAM_USER_ID, SESSION_TTL_DAYS};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub display_name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    /// True when `login` names this profile by username or email.
    pub fn answers_to(&self, login: &str) -> bool {
        let login = login.trim();
        self.username.eq_ignore_ascii_case(login) || self.email.eq_ignore_ascii_case(login)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct SessionRow {
    pub token: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl SessionRow {
    /// Sessions created at or before this instant have expired.
    pub fn expiry_cutoff(now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::days(SESSION_TTL_DAYS)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.created_at <= Self::expiry_cutoff(now)
    }
}

/// The two seeded accounts of the deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixedUser {
    Joe,
    Sam,
}

impl FixedUser {
    pub const ALL: [FixedUser; 2] = [FixedUser::Joe, FixedUser::Sam];

    pub fn id(&self) -> Uuid {
        match self {
            FixedUser::Joe => JOE_USER_ID,
            FixedUser::Sam => SAM_USER_ID,
        }
    }

    pub fn username(&self) -> &'static str {
        match self {
            FixedUser::Joe => "joe",
            FixedUser::Sam => "sam",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            FixedUser::Joe => "Joe",
            FixedUser::Sam => "Sam",
        }
    }

    pub fn email(&self) -> String {
        format!("{}@namepicker.local", self.username())
    }

    pub fn profile(&self, created_at: DateTime<Utc>) -> UserProfile {
        UserProfile {
            id: self.id(),
            username: self.username().to_string(),
            display_name: self.display_name().to_string(),
            email: self.email(),
            created_at,
        }
    }

    pub fn ids() -> Vec<Uuid> {
        Self::ALL.iter().map(FixedUser::id).collect()
    }
}
