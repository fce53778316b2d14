use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: u64,
    pub post_id: u64,
    pub creator_id: u64,
    /// Filled in from a user lookup; the board may also send it inline.
    #[serde(default)]
    pub creator_name: Option<String>,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub is_hidden: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Comment {
    pub fn display_author(&self) -> String {
        self.creator_name
            .clone()
            .unwrap_or_else(|| format!("user #{}", self.creator_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_author_falls_back_to_id() {
        let comment: Comment =
            serde_json::from_str(r#"{"id": 1, "post_id": 2, "creator_id": 3}"#).unwrap();
        assert_eq!(comment.display_author(), "user #3");
        assert!(!comment.is_hidden);
    }

    #[test]
    fn test_display_author_uses_name() {
        let comment: Comment = serde_json::from_str(
            r#"{"id": 1, "post_id": 2, "creator_id": 3, "creator_name": "fox", "is_hidden": true}"#,
        )
        .unwrap();
        assert_eq!(comment.display_author(), "fox");
        assert!(comment.is_hidden);
    }
}
