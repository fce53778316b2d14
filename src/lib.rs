//! # tagboard
//!
//! A terminal client for tag-based image boards (e621 and compatible hosts).
//!
//! ## Architecture
//!
//! ```text
//! UI action → Feed controller → API client → URL builder + retry → Transport
//!                   ↑                                                  │
//!                   └──── merge / dedupe ← envelope decode ←───────────┘
//!                                 │
//!                           blacklist filter → presentation
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! # Store credentials (used for favorites and logged-in browsing)
//! tagboard account add my_name my_api_key
//!
//! # Search posts
//! tagboard posts fox solo
//!
//! # Hide a tag everywhere
//! tagboard blacklist add gore
//!
//! # Launch TUI
//! tagboard tui
//! ```

/// Remote API access.
///
/// - [`ApiClient`](api::ApiClient): typed endpoints over a [`Transport`](api::Transport)
/// - [`HttpTransport`](api::HttpTransport): reqwest-based implementation
/// - [`build_url`](api::build_url): auth, cache busting and proxy rewriting
/// - [`with_retry`](api::with_retry): exponential backoff for transient failures
pub mod api;

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together the store,
/// settings and API client.
pub mod app;

/// Debounced, stale-safe tag suggestions for the search bar.
pub mod autocomplete;

/// Command-line interface using clap.
pub mod cli;

/// Configuration file handling.
///
/// Loads from `~/.config/tagboard/config.toml`, supporting:
/// - API client tuning (user agent, timeout, retries, page size)
/// - Custom colors (named or hex)
/// - Custom keybindings
pub mod config;

/// API models: posts, comments, tags, users.
pub mod domain;

/// Paginated post feed with de-duplication and blacklist filtering.
pub mod feed;

/// User settings, patches and schema upgrades.
pub mod settings;

/// Local persistence.
///
/// - [`Store`](store::Store): key/value storage trait
/// - [`SqliteStore`](store::SqliteStore): SQLite implementation
/// - [`SettingsStore`](store::SettingsStore): persisted settings owner
pub mod store;

/// Terminal user interface.
///
/// Search bar with tag suggestions, post list and a preview pane with tags
/// and comments. Keybindings: j/k navigate, / searches, t switches between
/// posts and favorites, o opens the post in the browser, R refreshes, q quits.
pub mod tui;
