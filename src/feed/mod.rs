//! Paginated, de-duplicated post feed.
//!
//! The controller is a small state machine:
//!
//! ```text
//! Idle ──reset──▶ LoadingReset ──complete──▶ Idle
//! Idle ──near bottom, has_more──▶ LoadingAppend ──complete──▶ Idle
//! ```
//!
//! A failed fetch holds automatic paging: after a failed reset until the next
//! reset, after a failed append until [`FeedController::resume`].
//!
//! Callers either drive it with [`FeedController::refresh`] and
//! [`FeedController::load_more`], or split the work with
//! [`FeedController::begin_reset`] / [`FeedController::begin_append`] and
//! [`FeedController::complete`] when the fetch runs on another task.

pub mod blacklist;
pub mod query;

use std::collections::HashSet;

use crate::api::{ApiClient, ApiError};
use crate::domain::Post;
use crate::settings::Settings;

pub use blacklist::Blacklist;
pub use query::compose_query;

/// Posts per page when the config does not say otherwise.
pub const DEFAULT_PAGE_LIMIT: u32 = 50;

/// Start loading the next page when the selection is this close to the end.
pub const LOAD_MORE_THRESHOLD: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Posts,
    Favorites,
}

impl Tab {
    pub fn next(self) -> Self {
        match self {
            Tab::Posts => Tab::Favorites,
            Tab::Favorites => Tab::Posts,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Tab::Posts => "Posts",
            Tab::Favorites => "Favorites",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedPhase {
    #[default]
    Idle,
    LoadingReset,
    LoadingAppend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    Reset,
    Append,
}

/// A fetch handed out by the controller, to be passed back to
/// [`FeedController::complete`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub mode: FetchMode,
    pub tags: String,
    pub page: u32,
    pub limit: u32,
    session: u64,
}

#[derive(Debug, Clone, Default)]
pub struct FeedState {
    pub tab: Tab,
    pub query: String,
    /// Next page to request, 1-based.
    pub page: u32,
    pub posts: Vec<Post>,
    pub has_more: bool,
    pub phase: FeedPhase,
    /// Translated message of the last failed reset fetch.
    pub error: Option<String>,
}

impl FeedState {
    pub fn is_loading(&self) -> bool {
        self.phase != FeedPhase::Idle
    }
}

/// What has to happen before paging resumes after a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Hold {
    UntilReset,
    UntilResume,
}

pub struct FeedController {
    state: FeedState,
    seen: HashSet<u64>,
    limit: u32,
    session: u64,
    hold: Option<Hold>,
}

impl FeedController {
    pub fn new(limit: u32) -> Self {
        Self {
            state: FeedState {
                page: 1,
                has_more: true,
                ..Default::default()
            },
            seen: HashSet::new(),
            limit: limit.max(1),
            session: 0,
            hold: None,
        }
    }

    pub fn state(&self) -> &FeedState {
        &self.state
    }

    pub fn posts(&self) -> &[Post] {
        &self.state.posts
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Posts left after the blacklist. Filtering happens here, after
    /// accumulation, so it never affects paging or de-duplication.
    pub fn visible_posts(&self, blacklist: &Blacklist) -> Vec<&Post> {
        blacklist.filter(&self.state.posts)
    }

    /// Drop everything loaded and start a new session at page 1.
    pub fn reset(&mut self) {
        self.session += 1;
        self.state.page = 1;
        self.state.posts.clear();
        self.seen.clear();
        self.state.has_more = true;
        self.state.phase = FeedPhase::Idle;
        self.state.error = None;
        self.hold = None;
    }

    /// Allow paging again after a failed append, e.g. once the user moves.
    /// A failed reset stays held until the next reset.
    pub fn resume(&mut self) {
        if self.hold == Some(Hold::UntilResume) {
            self.hold = None;
        }
    }

    /// True while a failure is holding automatic paging.
    pub fn is_held(&self) -> bool {
        self.hold.is_some()
    }

    pub fn set_tab(&mut self, tab: Tab) {
        self.state.tab = tab;
        self.reset();
    }

    pub fn set_query(&mut self, query: &str) {
        self.state.query = query.trim().to_string();
        self.reset();
    }

    /// Reset and hand out the page-1 fetch.
    ///
    /// Fails without touching the network when the query cannot be composed
    /// (favorites with no username); the message is kept in the state.
    pub fn begin_reset(&mut self, settings: &Settings) -> Result<FetchRequest, ApiError> {
        self.reset();

        match compose_query(self.state.tab, settings, &self.state.query) {
            Ok(tags) => {
                self.state.phase = FeedPhase::LoadingReset;
                Ok(self.request(FetchMode::Reset, tags))
            }
            Err(e) => {
                self.state.error = Some(e.user_message());
                Err(e)
            }
        }
    }

    /// Hand out the next-page fetch. `None` while loading, after the last
    /// page, while held after a failure, or when the query cannot be composed.
    pub fn begin_append(&mut self, settings: &Settings) -> Option<FetchRequest> {
        if self.state.is_loading() || !self.state.has_more || self.is_held() {
            return None;
        }

        match compose_query(self.state.tab, settings, &self.state.query) {
            Ok(tags) => {
                self.state.phase = FeedPhase::LoadingAppend;
                Some(self.request(FetchMode::Append, tags))
            }
            Err(e) => {
                tracing::debug!("Not loading more: {}", e);
                None
            }
        }
    }

    /// True when `selected` (index into the visible list of `visible_len`
    /// posts) is close enough to the end to fetch the next page.
    pub fn should_load_more(&self, selected: usize, visible_len: usize) -> bool {
        self.state.has_more
            && !self.state.is_loading()
            && !self.is_held()
            && selected + LOAD_MORE_THRESHOLD >= visible_len
    }

    /// Apply the outcome of `request`. Results from an older session are
    /// ignored. Returns the number of posts added.
    pub fn complete(&mut self, request: &FetchRequest, result: Result<Vec<Post>, ApiError>) -> usize {
        if request.session != self.session {
            tracing::debug!("Dropping stale page {} result", request.page);
            return 0;
        }
        self.state.phase = FeedPhase::Idle;

        let posts = match result {
            Ok(posts) => posts,
            Err(e) => {
                match request.mode {
                    FetchMode::Reset => {
                        tracing::warn!("Loading posts failed: {}", e);
                        self.state.error = Some(e.user_message());
                        self.hold = Some(Hold::UntilReset);
                    }
                    FetchMode::Append => {
                        tracing::warn!("Loading page {} failed: {}", request.page, e);
                        self.hold = Some(Hold::UntilResume);
                    }
                }
                return 0;
            }
        };

        if posts.is_empty() {
            self.state.has_more = false;
            return 0;
        }

        if request.mode == FetchMode::Reset {
            self.seen.clear();
            self.state.posts.clear();
            self.state.error = None;
        }

        let fresh: Vec<Post> = posts
            .into_iter()
            .filter(|p| self.seen.insert(p.id))
            .collect();
        let added = fresh.len();
        self.state.posts.extend(fresh);
        self.state.page = request.page + 1;
        added
    }

    /// Reset and load page 1.
    pub async fn refresh(&mut self, client: &ApiClient, settings: &Settings) -> Result<usize, ApiError> {
        let request = self.begin_reset(settings)?;
        let result = client
            .get_posts(settings, &request.tags, request.page, request.limit)
            .await;
        let error = result.as_ref().err().cloned();
        let added = self.complete(&request, result);
        match error {
            Some(e) => Err(e),
            None => Ok(added),
        }
    }

    /// Load the next page if allowed. Failures are swallowed and hold paging
    /// until [`FeedController::resume`].
    pub async fn load_more(&mut self, client: &ApiClient, settings: &Settings) -> usize {
        let Some(request) = self.begin_append(settings) else {
            return 0;
        };
        let result = client
            .get_posts(settings, &request.tags, request.page, request.limit)
            .await;
        self.complete(&request, result)
    }

    fn request(&self, mode: FetchMode, tags: String) -> FetchRequest {
        FetchRequest {
            mode,
            tags,
            page: self.state.page,
            limit: self.limit,
            session: self.session,
        }
    }
}

impl Default for FeedController {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_LIMIT)
    }
}
