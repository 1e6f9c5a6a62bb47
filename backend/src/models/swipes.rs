use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::names::Name;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwipeDecision {
    Like,
    Dislike,
}

impl SwipeDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            SwipeDecision::Like => "like",
            SwipeDecision::Dislike => "dislike",
        }
    }
}

impl fmt::Display for SwipeDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SwipeDecision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "like" => Ok(SwipeDecision::Like),
            "dislike" => Ok(SwipeDecision::Dislike),
            other => Err(format!("Unknown swipe action '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwipeDirection {
    Left,
    Right,
}

impl SwipeDirection {
    pub fn decision(&self) -> SwipeDecision {
        match self {
            SwipeDirection::Right => SwipeDecision::Like,
            SwipeDirection::Left => SwipeDecision::Dislike,
        }
    }
}

/// Body of `POST /rest/swipes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwipeAction {
    pub name_id: Uuid,
    pub user_id: Uuid,
    pub action: SwipeDecision,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct SwipeRow {
    pub id: Uuid,
    pub name_id: Uuid,
    pub user_id: Uuid,
    pub action: String,
    pub created_at: DateTime<Utc>,
}

impl SwipeRow {
    pub fn is_like(&self) -> bool {
        self.action == SwipeDecision::Like.as_str()
    }
}

/// What the backend reports after inserting a swipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwipeRecord {
    pub swipe: SwipeRow,
    pub is_match: bool,
    pub match_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwipeResult {
    pub is_match: bool,
    pub name: Name,
}
