use serde::{Deserialize, Serialize};

/// One autocomplete hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagSuggestion {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub post_count: u64,
    #[serde(default)]
    pub category: u8,
    #[serde(default)]
    pub antecedent_name: Option<String>,
}

impl TagSuggestion {
    pub fn category_name(&self) -> &'static str {
        match self.category {
            0 => "general",
            1 => "artist",
            3 => "copyright",
            4 => "character",
            5 => "species",
            6 => "invalid",
            7 => "meta",
            8 => "lore",
            _ => "other",
        }
    }
}
