use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ratatui::widgets::ListState;

use crate::autocomplete::{self, Autocomplete};
use crate::domain::{Comment, Post};
use crate::feed::{Blacklist, FeedController};
use crate::settings::Settings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivePane {
    Posts,
    Preview,
}

impl ActivePane {
    pub fn next(self) -> Self {
        match self {
            ActivePane::Posts => ActivePane::Preview,
            ActivePane::Preview => ActivePane::Posts,
        }
    }

    pub fn prev(self) -> Self {
        self.next()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
}

pub const PAGE_SIZE: usize = 10;

/// Comments shown under the preview of one post.
pub struct CommentsView {
    pub post_id: u64,
    /// `None` while loading.
    pub comments: Option<Vec<Comment>>,
    cancelled: Arc<AtomicBool>,
}

impl CommentsView {
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }
}

pub struct TuiApp {
    pub active_pane: ActivePane,
    pub input_mode: InputMode,
    pub search_input: String,
    pub feed: FeedController,
    pub autocomplete: Autocomplete,
    pub suggestion_index: Option<usize>,
    pub settings: Settings,
    blacklist: Blacklist,
    pub post_index: usize,
    pub post_list_state: ListState,
    pub comments: Option<CommentsView>,
    pub preview_scroll: u16,
    pub should_quit: bool,
    pub status_message: Option<String>,
    // Maximize mode
    pub maximized: bool,
}

impl TuiApp {
    pub fn new(settings: Settings, page_limit: u32, debounce: Duration) -> Self {
        let mut post_list_state = ListState::default();
        post_list_state.select(Some(0));

        Self {
            active_pane: ActivePane::Posts,
            input_mode: InputMode::Normal,
            search_input: String::new(),
            feed: FeedController::new(page_limit),
            autocomplete: Autocomplete::new(debounce),
            suggestion_index: None,
            blacklist: Blacklist::from(settings.blacklist.as_slice()),
            settings,
            post_index: 0,
            post_list_state,
            comments: None,
            preview_scroll: 0,
            should_quit: false,
            status_message: None,
            maximized: false,
        }
    }

    /// Take a new settings snapshot after it was persisted.
    pub fn apply_settings(&mut self, settings: Settings) {
        self.blacklist = Blacklist::from(settings.blacklist.as_slice());
        self.settings = settings;
        self.clamp_selection();
    }

    pub fn visible_posts(&self) -> Vec<&Post> {
        self.feed.visible_posts(&self.blacklist)
    }

    pub fn hidden_count(&self) -> usize {
        self.feed.posts().len() - self.visible_posts().len()
    }

    pub fn selected_post(&self) -> Option<&Post> {
        self.visible_posts().get(self.post_index).copied()
    }

    /// True when the selection is close enough to the end to fetch more.
    pub fn wants_more(&self) -> bool {
        self.feed
            .should_load_more(self.post_index, self.visible_posts().len())
    }

    /// Keep the selection inside the visible list after it changed size.
    pub fn clamp_selection(&mut self) {
        let len = self.visible_posts().len();
        if self.post_index >= len {
            self.post_index = len.saturating_sub(1);
        }
        self.post_list_state.select(Some(self.post_index));
    }

    /// Forget the selection, e.g. after a new search.
    pub fn reset_selection(&mut self) {
        self.post_index = 0;
        self.post_list_state.select(Some(0));
        self.preview_scroll = 0;
        self.close_comments();
    }

    fn select(&mut self, index: usize) {
        self.feed.resume();
        if index != self.post_index {
            self.post_index = index;
            self.post_list_state.select(Some(index));
            self.preview_scroll = 0;
            self.close_comments();
        }
    }

    pub fn move_up(&mut self) {
        match self.active_pane {
            ActivePane::Posts => self.select(self.post_index.saturating_sub(1)),
            ActivePane::Preview => {
                self.preview_scroll = self.preview_scroll.saturating_sub(1);
            }
        }
    }

    pub fn move_down(&mut self) {
        match self.active_pane {
            ActivePane::Posts => {
                let max_index = self.visible_posts().len().saturating_sub(1);
                self.select((self.post_index + 1).min(max_index));
            }
            ActivePane::Preview => {
                self.preview_scroll = self.preview_scroll.saturating_add(1);
            }
        }
    }

    pub fn next_page(&mut self) {
        match self.active_pane {
            ActivePane::Posts => {
                let max_index = self.visible_posts().len().saturating_sub(1);
                self.select((self.post_index + PAGE_SIZE).min(max_index));
            }
            ActivePane::Preview => {
                self.preview_scroll = self.preview_scroll.saturating_add(PAGE_SIZE as u16);
            }
        }
    }

    pub fn prev_page(&mut self) {
        match self.active_pane {
            ActivePane::Posts => self.select(self.post_index.saturating_sub(PAGE_SIZE)),
            ActivePane::Preview => {
                self.preview_scroll = self.preview_scroll.saturating_sub(PAGE_SIZE as u16);
            }
        }
    }

    pub fn toggle_maximize(&mut self) {
        self.maximized = !self.maximized;
        if self.maximized {
            self.active_pane = ActivePane::Preview;
        }
    }

    /// Start showing comments for `post_id`. Returns the cancellation flag
    /// for the background lookup, or `None` if they are already shown.
    pub fn open_comments(&mut self, post_id: u64) -> Option<Arc<AtomicBool>> {
        if self.comments.as_ref().map(|c| c.post_id) == Some(post_id) {
            return None;
        }
        self.close_comments();

        let cancelled = Arc::new(AtomicBool::new(false));
        self.comments = Some(CommentsView {
            post_id,
            comments: None,
            cancelled: cancelled.clone(),
        });
        Some(cancelled)
    }

    pub fn close_comments(&mut self) {
        if let Some(view) = self.comments.take() {
            view.cancel();
        }
    }

    /// Store loaded comments if the view for `post_id` is still open.
    pub fn comments_loaded(&mut self, post_id: u64, comments: Vec<Comment>) {
        if let Some(view) = self.comments.as_mut().filter(|v| v.post_id == post_id) {
            view.comments = Some(comments);
        }
    }

    pub fn start_search(&mut self) {
        self.input_mode = InputMode::Search;
        self.search_input = self.feed.state().query.clone();
        if !self.search_input.is_empty() {
            self.search_input.push(' ');
        }
        self.suggestion_index = None;
    }

    pub fn cancel_search(&mut self) {
        self.input_mode = InputMode::Normal;
        self.autocomplete.clear();
        self.suggestion_index = None;
    }

    pub fn search_edited(&mut self, now: std::time::Instant) {
        self.suggestion_index = None;
        self.autocomplete.edit(now, &self.search_input);
    }

    /// Move the suggestion highlight down, wrapping to none after the last.
    pub fn cycle_suggestion(&mut self) {
        let count = self.autocomplete.suggestions().len();
        self.suggestion_index = match self.suggestion_index {
            _ if count == 0 => None,
            None => Some(0),
            Some(i) if i + 1 < count => Some(i + 1),
            Some(_) => None,
        };
    }

    /// Put the highlighted suggestion into the search text. Returns false
    /// when nothing was highlighted.
    pub fn accept_suggestion(&mut self) -> bool {
        let Some(tag) = self
            .suggestion_index
            .and_then(|i| self.autocomplete.suggestions().get(i))
            .map(|t| t.name.clone())
        else {
            return false;
        };

        self.search_input = autocomplete::complete(&self.search_input, &tag);
        self.suggestion_index = None;
        self.autocomplete.clear();
        true
    }

    /// Leave search mode and return the submitted query.
    pub fn submit_search(&mut self) -> String {
        self.input_mode = InputMode::Normal;
        self.autocomplete.clear();
        self.suggestion_index = None;
        self.search_input.trim().to_string()
    }

    pub fn set_status(&mut self, message: String) {
        self.status_message = Some(message);
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }
}

/// File URL for display, masked for non-safe posts in safe mode.
pub fn display_file_url(post: &Post, settings: &Settings) -> String {
    if settings.safe_mode_blur && !post.rating.is_safe() {
        return "[hidden in safe mode]".to_string();
    }
    post.file
        .url
        .clone()
        .unwrap_or_else(|| "[no file URL, log in to view]".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Rating, TagSuggestion};
    use crate::settings::SettingsPatch;

    fn app_with(ids: &[u64]) -> TuiApp {
        let mut app = TuiApp::new(Settings::default(), 50, Duration::ZERO);
        let request = app.feed.begin_reset(&Settings::default()).unwrap();
        app.feed
            .complete(&request, Ok(ids.iter().map(|id| Post::new(*id)).collect()));
        app
    }

    #[test]
    fn test_navigation_stays_in_bounds() {
        let mut app = app_with(&[1, 2, 3]);
        app.move_up();
        assert_eq!(app.post_index, 0);

        app.next_page();
        assert_eq!(app.post_index, 2);
        app.move_down();
        assert_eq!(app.post_index, 2);
        assert_eq!(app.selected_post().unwrap().id, 3);

        app.prev_page();
        assert_eq!(app.post_index, 0);
    }

    #[test]
    fn test_blacklist_update_clamps_selection() {
        let mut app = app_with(&[1, 2]);
        let mut posts: Vec<Post> = app.feed.posts().to_vec();
        posts[1].tags.general = vec!["gore".into()];
        let request = app.feed.begin_reset(&Settings::default()).unwrap();
        app.feed.complete(&request, Ok(posts));
        app.move_down();
        assert_eq!(app.post_index, 1);

        let settings = Settings::default().merged(SettingsPatch {
            blacklist: Some(vec!["gore".into()]),
            ..Default::default()
        });
        app.apply_settings(settings);

        assert_eq!(app.post_index, 0);
        assert_eq!(app.visible_posts().len(), 1);
        assert_eq!(app.hidden_count(), 1);
    }

    #[test]
    fn test_moving_resumes_paging_after_failed_page() {
        let mut app = app_with(&[1, 2]);
        let request = app.feed.begin_append(&Settings::default()).unwrap();
        app.feed
            .complete(&request, Err(crate::api::ApiError::Network("down".into())));
        assert!(!app.wants_more());

        app.move_down();
        assert!(app.wants_more());
        app.move_down();
        assert!(app.wants_more());
    }

    #[test]
    fn test_moving_cancels_comment_lookup() {
        let mut app = app_with(&[1, 2]);
        let flag = app.open_comments(1).unwrap();
        assert!(app.open_comments(1).is_none());

        app.move_down();

        assert!(flag.load(Ordering::SeqCst));
        assert!(app.comments.is_none());
    }

    #[test]
    fn test_late_comments_for_other_post_ignored() {
        let mut app = app_with(&[1, 2]);
        let first = app.open_comments(1).unwrap();
        app.open_comments(2).unwrap();
        assert!(first.load(Ordering::SeqCst));

        app.comments_loaded(1, Vec::new());
        assert!(app.comments.as_ref().unwrap().comments.is_none());

        app.comments_loaded(2, Vec::new());
        assert!(app.comments.as_ref().unwrap().comments.is_some());
    }

    #[test]
    fn test_suggestion_cycle_and_accept() {
        let mut app = app_with(&[]);
        app.start_search();
        app.search_input = "fox so".into();
        app.search_edited(std::time::Instant::now());
        let (ticket, _) = app.autocomplete.issue().unwrap();
        app.autocomplete.accept(
            ticket,
            vec![
                TagSuggestion {
                    id: 1,
                    name: "solo".into(),
                    post_count: 10,
                    category: 0,
                    antecedent_name: None,
                },
                TagSuggestion {
                    id: 2,
                    name: "sofa".into(),
                    post_count: 5,
                    category: 0,
                    antecedent_name: None,
                },
            ],
        );

        app.cycle_suggestion();
        app.cycle_suggestion();
        assert_eq!(app.suggestion_index, Some(1));
        app.cycle_suggestion();
        assert_eq!(app.suggestion_index, None);
        assert!(!app.accept_suggestion());

        app.cycle_suggestion();
        assert!(app.accept_suggestion());
        assert_eq!(app.search_input, "fox solo ");
        assert_eq!(app.submit_search(), "fox solo");
        assert_eq!(app.input_mode, InputMode::Normal);
    }

    #[test]
    fn test_safe_mode_masks_file_url() {
        let mut post = Post::new(1);
        post.file.url = Some("https://static.example/a.png".into());
        let settings = Settings::default();

        assert_eq!(display_file_url(&post, &settings), "https://static.example/a.png");

        post.rating = Rating::Explicit;
        assert_eq!(display_file_url(&post, &settings), "[hidden in safe mode]");

        let unblurred = settings.merged(SettingsPatch {
            safe_mode_blur: Some(false),
            ..Default::default()
        });
        assert_eq!(display_file_url(&post, &unblurred), "https://static.example/a.png");
    }
}
