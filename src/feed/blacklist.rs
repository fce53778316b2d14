use std::collections::HashSet;

use crate::domain::Post;

/// Set of tags whose posts are hidden from view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Blacklist {
    tags: HashSet<String>,
}

impl Blacklist {
    pub fn new<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// True when any general, species, character or artist tag is listed.
    /// Matching is exact and case-sensitive.
    pub fn hides(&self, post: &Post) -> bool {
        if self.tags.is_empty() {
            return false;
        }
        post.tags.filterable().any(|tag| self.tags.contains(tag))
    }

    /// Posts that survive the blacklist, in order.
    pub fn filter<'a>(&self, posts: &'a [Post]) -> Vec<&'a Post> {
        posts.iter().filter(|p| !self.hides(p)).collect()
    }
}

impl From<&[String]> for Blacklist {
    fn from(tags: &[String]) -> Self {
        Self::new(tags.iter().cloned())
    }
}
