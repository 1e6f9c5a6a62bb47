use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Sort a user pair so the smaller id comes first, as the `matches` table stores it.
pub fn ordered_pair(user_id_1: Uuid, user_id_2: Uuid) -> (Uuid, Uuid) {
    if user_id_1 < user_id_2 {
        (user_id_1, user_id_2)
    } else {
        (user_id_2, user_id_1)
    }
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct MatchRow {
    pub id: Uuid,
    pub name_id: Uuid,
    pub name: String,
    pub user1_id: Uuid,
    pub user2_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: Uuid,
    pub name_id: Uuid,
    pub name: String,
    pub users: [Uuid; 2],
    pub matched_at: DateTime<Utc>,
}

impl Match {
    pub fn involves(&self, user_id: Uuid) -> bool {
        self.users.contains(&user_id)
    }
}

impl From<MatchRow> for Match {
    fn from(row: MatchRow) -> Self {
        Self {
            id: row.id,
            name_id: row.name_id,
            name: row.name,
            users: [row.user1_id, row.user2_id],
            matched_at: row.created_at,
        }
    }
}
