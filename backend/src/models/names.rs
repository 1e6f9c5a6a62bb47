use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Masculine,
    Feminine,
    Neutral,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Masculine => "masculine",
            Gender::Feminine => "feminine",
            Gender::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "masculine" => Ok(Gender::Masculine),
            "feminine" => Ok(Gender::Feminine),
            "neutral" => Ok(Gender::Neutral),
            other => Err(format!("Unknown gender association '{}'", other)),
        }
    }
}

/// A row of the `names` table as the backend returns it.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct NameRow {
    pub id: Uuid,
    pub name: String,
    pub origin: Option<String>,
    pub meaning: Option<String>,
    pub popularity: Option<i32>,
    pub gender: Option<String>,
    pub is_user_uploaded: bool,
    pub uploaded_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl NameRow {
    /// Candidate order: uploads first (newest first), then popularity, then name.
    pub fn candidate_order(&self, other: &Self) -> Ordering {
        other
            .is_user_uploaded
            .cmp(&self.is_user_uploaded)
            .then_with(|| {
                if self.is_user_uploaded {
                    other.created_at.cmp(&self.created_at)
                } else {
                    Ordering::Equal
                }
            })
            .then_with(|| match (self.popularity, other.popularity) {
                (Some(a), Some(b)) => b.cmp(&a),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            })
            .then_with(|| self.name.cmp(&other.name))
            .then_with(|| self.id.cmp(&other.id))
    }
}

/// A candidate surname as the views see it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Name {
    pub id: Uuid,
    pub name: String,
    pub origin: Option<String>,
    pub meaning: Option<String>,
    pub popularity: Option<i32>,
    pub gender: Option<Gender>,
}

impl From<NameRow> for Name {
    fn from(row: NameRow) -> Self {
        let gender = row.gender.as_deref().and_then(|g| match g.parse::<Gender>() {
            Ok(gender) => Some(gender),
            Err(e) => {
                tracing::debug!("Ignoring gender on name {}: {}", row.id, e);
                None
            }
        });

        Self {
            id: row.id,
            name: row.name,
            origin: row.origin,
            meaning: row.meaning,
            popularity: row.popularity,
            gender,
        }
    }
}

/// Optional details attached to an uploaded name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NameDetails {
    pub origin: Option<String>,
    pub meaning: Option<String>,
    pub gender: Option<Gender>,
}

/// A validated upload ready to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewName {
    pub name: String,
    pub origin: Option<String>,
    pub meaning: Option<String>,
    pub gender: Option<Gender>,
    pub uploaded_by: Uuid,
}

impl NewName {
    /// Trims every field, drops blank optionals and rejects a blank name.
    pub fn validate(
        uploaded_by: Uuid,
        name: &str,
        origin: Option<&str>,
        meaning: Option<&str>,
        gender: Option<&str>,
    ) -> Result<Self, String> {
        let name = name.trim();
        if name.is_empty() {
            return Err("Name cannot be empty".to_string());
        }

        let gender = match non_blank(gender) {
            Some(g) => Some(g.parse::<Gender>()?),
            None => None,
        };

        Ok(Self {
            name: name.to_string(),
            origin: non_blank(origin).map(str::to_string),
            meaning: non_blank(meaning).map(str::to_string),
            gender,
            uploaded_by,
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
