use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category entity - groups posts by topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub version: i32,
}

impl Category {
    /// Name key used for case-insensitive uniqueness.
    pub fn normalize_name(name: &str) -> String {
        name.to_lowercase()
    }

    pub fn has_name(&self, name: &str) -> bool {
        Self::normalize_name(&self.name) == Self::normalize_name(name)
    }
}

/// A category that has not been stored yet.
#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl NewCategory {
    pub fn new(name: String, description: Option<String>) -> Self {
        Self {
            name,
            description,
            created_at: Utc::now(),
        }
    }
}
