use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub level_string: Option<String>,
    #[serde(default)]
    pub avatar_id: Option<u64>,
    #[serde(default)]
    pub post_upload_count: u64,
    #[serde(default)]
    pub favorite_count: u64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    /// Board usernames use underscores where people expect spaces.
    pub fn display_name(&self) -> String {
        self.name.replace('_', " ")
    }
}
