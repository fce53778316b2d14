use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rating {
    #[serde(rename = "s")]
    Safe,
    #[serde(rename = "q")]
    Questionable,
    #[serde(rename = "e")]
    Explicit,
}

impl Rating {
    /// Single-letter form used in `rating:` search metatags.
    pub fn code(self) -> &'static str {
        match self {
            Rating::Safe => "s",
            Rating::Questionable => "q",
            Rating::Explicit => "e",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Rating::Safe => "safe",
            Rating::Questionable => "questionable",
            Rating::Explicit => "explicit",
        }
    }

    pub fn is_safe(self) -> bool {
        self == Rating::Safe
    }
}

impl Default for Rating {
    fn default() -> Self {
        Rating::Safe
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostFile {
    pub width: u32,
    pub height: u32,
    pub ext: String,
    pub size: u64,
    pub md5: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostPreview {
    pub width: u32,
    pub height: u32,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostSample {
    pub has: bool,
    pub width: u32,
    pub height: u32,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Score {
    pub up: i64,
    pub down: i64,
    pub total: i64,
}

/// Tags grouped by category, as the board returns them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostTags {
    pub general: Vec<String>,
    pub species: Vec<String>,
    pub character: Vec<String>,
    pub copyright: Vec<String>,
    pub artist: Vec<String>,
    pub invalid: Vec<String>,
    pub meta: Vec<String>,
    pub lore: Vec<String>,
}

impl PostTags {
    /// Categories consulted by the blacklist.
    pub fn filterable(&self) -> impl Iterator<Item = &String> {
        self.general
            .iter()
            .chain(&self.species)
            .chain(&self.character)
            .chain(&self.artist)
    }

    /// Every category paired with its name, in display order.
    pub fn by_category(&self) -> [(&'static str, &[String]); 8] {
        [
            ("artist", self.artist.as_slice()),
            ("copyright", self.copyright.as_slice()),
            ("character", self.character.as_slice()),
            ("species", self.species.as_slice()),
            ("general", self.general.as_slice()),
            ("lore", self.lore.as_slice()),
            ("meta", self.meta.as_slice()),
            ("invalid", self.invalid.as_slice()),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Relationships {
    pub parent_id: Option<u64>,
    pub has_children: bool,
    pub has_active_children: bool,
    pub children: Vec<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: u64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub file: PostFile,
    #[serde(default)]
    pub preview: PostPreview,
    #[serde(default)]
    pub sample: PostSample,
    #[serde(default)]
    pub score: Score,
    #[serde(default)]
    pub tags: PostTags,
    #[serde(default)]
    pub rating: Rating,
    #[serde(default)]
    pub fav_count: u64,
    #[serde(default)]
    pub comment_count: u64,
    #[serde(default)]
    pub relationships: Relationships,
    #[serde(default)]
    pub uploader_id: Option<u64>,
    #[serde(default)]
    pub description: String,
}

impl Post {
    /// Minimal post, mostly useful for building fixtures.
    pub fn new(id: u64) -> Self {
        Self {
            id,
            created_at: None,
            file: PostFile::default(),
            preview: PostPreview::default(),
            sample: PostSample::default(),
            score: Score::default(),
            tags: PostTags::default(),
            rating: Rating::Safe,
            fav_count: 0,
            comment_count: 0,
            relationships: Relationships::default(),
            uploader_id: None,
            description: String::new(),
        }
    }

    /// Link to the post page on the given host.
    pub fn page_url(&self, host: &str) -> String {
        format!("{}/posts/{}", host.trim_end_matches('/'), self.id)
    }

    /// Artists joined for one-line listings.
    pub fn display_artists(&self) -> String {
        if self.tags.artist.is_empty() {
            "unknown artist".to_string()
        } else {
            self.tags.artist.join(", ")
        }
    }
}
