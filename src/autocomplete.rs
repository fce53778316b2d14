//! Tag autocomplete bookkeeping for the search bar.
//!
//! Requests are debounced and numbered. Only the response to the most
//! recently issued request is kept, so a slow reply for an old prefix never
//! overwrites suggestions for what the user is typing now.

use std::time::{Duration, Instant};

use crate::domain::TagSuggestion;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Shortest token worth asking the server about.
pub const MIN_TOKEN_LEN: usize = 2;

#[derive(Debug)]
pub struct Autocomplete {
    debounce: Duration,
    last_edit: Option<Instant>,
    pending: Option<String>,
    issued: u64,
    suggestions: Vec<TagSuggestion>,
}

impl Autocomplete {
    pub fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            last_edit: None,
            pending: None,
            issued: 0,
            suggestions: Vec::new(),
        }
    }

    pub fn suggestions(&self) -> &[TagSuggestion] {
        &self.suggestions
    }

    pub fn clear(&mut self) {
        self.pending = None;
        self.last_edit = None;
        self.suggestions.clear();
        // Invalidate anything still in flight.
        self.issued += 1;
    }

    /// Record an edit of the search text at `now`.
    pub fn edit(&mut self, now: Instant, query: &str) {
        let token = current_token(query);
        self.last_edit = Some(now);

        if token.chars().count() < MIN_TOKEN_LEN {
            self.pending = None;
            self.suggestions.clear();
            self.issued += 1;
        } else {
            self.pending = Some(token.to_string());
        }
    }

    /// True once the debounce delay has passed since the last edit and a
    /// token is waiting to be looked up.
    pub fn due(&self, now: Instant) -> bool {
        match (self.pending.as_ref(), self.last_edit) {
            (Some(_), Some(at)) => now.saturating_duration_since(at) >= self.debounce,
            _ => false,
        }
    }

    /// Take the pending token and number the request for it.
    pub fn issue(&mut self) -> Option<(u64, String)> {
        let token = self.pending.take()?;
        self.issued += 1;
        Some((self.issued, token))
    }

    /// Store `suggestions` if `ticket` is the latest request. Returns whether
    /// they were kept.
    pub fn accept(&mut self, ticket: u64, suggestions: Vec<TagSuggestion>) -> bool {
        if ticket != self.issued {
            tracing::debug!("Discarding stale suggestions for ticket {}", ticket);
            return false;
        }
        self.suggestions = suggestions;
        true
    }
}

impl Default for Autocomplete {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

/// The tag being typed: the last whitespace-separated token, without a
/// leading `-` (exclude) or `~` (or) operator.
pub fn current_token(query: &str) -> &str {
    if query.ends_with(char::is_whitespace) {
        return "";
    }
    let token = query.split_whitespace().last().unwrap_or("");
    token.trim_start_matches(['-', '~'])
}

/// Replace the token being typed with `tag`, keeping its operator prefix,
/// and append a space ready for the next tag.
pub fn complete(query: &str, tag: &str) -> String {
    let start = query
        .rfind(char::is_whitespace)
        .map(|i| i + query[i..].chars().next().map_or(1, char::len_utf8))
        .unwrap_or(0);
    let (head, token) = query.split_at(start);
    let operator_len = token.len() - token.trim_start_matches(['-', '~']).len();

    format!("{}{}{} ", head, &token[..operator_len], tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(name: &str) -> TagSuggestion {
        TagSuggestion {
            id: 1,
            name: name.to_string(),
            post_count: 10,
            category: 0,
            antecedent_name: None,
        }
    }

    #[test]
    fn test_current_token() {
        assert_eq!(current_token("fox so"), "so");
        assert_eq!(current_token("fox -so"), "so");
        assert_eq!(current_token("~wolf"), "wolf");
        assert_eq!(current_token("fox "), "");
        assert_eq!(current_token(""), "");
    }

    #[test]
    fn test_complete_replaces_last_token() {
        assert_eq!(complete("fox so", "solo"), "fox solo ");
        assert_eq!(complete("fox -so", "solo"), "fox -solo ");
        assert_eq!(complete("wo", "wolf"), "wolf ");
        assert_eq!(complete("a  ~ca", "canine"), "a  ~canine ");
    }

    #[test]
    fn test_debounce() {
        let start = Instant::now();
        let mut ac = Autocomplete::new(Duration::from_millis(300));

        ac.edit(start, "fo");
        assert!(!ac.due(start + Duration::from_millis(100)));

        ac.edit(start + Duration::from_millis(200), "fox");
        assert!(!ac.due(start + Duration::from_millis(400)));
        assert!(ac.due(start + Duration::from_millis(500)));

        let (_, token) = ac.issue().unwrap();
        assert_eq!(token, "fox");
        assert!(!ac.due(start + Duration::from_millis(900)));
        assert!(ac.issue().is_none());
    }

    #[test]
    fn test_short_token_not_looked_up() {
        let now = Instant::now();
        let mut ac = Autocomplete::new(Duration::ZERO);
        ac.edit(now, "fox f");
        assert!(!ac.due(now));
    }

    #[test]
    fn test_stale_ticket_discarded() {
        let now = Instant::now();
        let mut ac = Autocomplete::new(Duration::ZERO);

        ac.edit(now, "fo");
        let (first, _) = ac.issue().unwrap();
        ac.edit(now, "fox");
        let (second, _) = ac.issue().unwrap();
        assert!(second > first);

        assert!(ac.accept(second, vec![tag("fox")]));
        assert!(!ac.accept(first, vec![tag("font")]));
        assert_eq!(ac.suggestions()[0].name, "fox");
    }

    #[test]
    fn test_clear_invalidates_in_flight() {
        let now = Instant::now();
        let mut ac = Autocomplete::default();
        ac.edit(now, "fox");
        let (ticket, _) = ac.issue().unwrap();

        ac.clear();

        assert!(!ac.accept(ticket, vec![tag("fox")]));
        assert!(ac.suggestions().is_empty());
    }
}
