//! Configuration management for tagboard.
//!
//! Configuration is read from `~/.config/tagboard/config.toml` at startup.
//! If the file doesn't exist, a default configuration with comments is created.
//! Account credentials and content preferences are not configured here; they
//! live in the settings store.

pub mod colors;
pub mod keybindings;

pub use colors::ColorConfig;
pub use keybindings::KeybindingConfig;

use serde::Deserialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::api::RetryPolicy;
use crate::autocomplete::DEFAULT_DEBOUNCE;
use crate::feed::DEFAULT_PAGE_LIMIT;

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub colors: ColorConfig,
    pub keybindings: KeybindingConfig,
}

/// HTTP client tuning.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub user_agent: String,
    pub timeout_secs: u64,
    pub page_limit: u32,
    pub retries: u32,
    pub retry_base_delay_ms: u64,
    pub autocomplete_debounce_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        let retry = RetryPolicy::default();
        Self {
            user_agent: format!("tagboard/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: 30,
            page_limit: DEFAULT_PAGE_LIMIT,
            retries: retry.retries,
            retry_base_delay_ms: retry.base_delay.as_millis() as u64,
            autocomplete_debounce_ms: DEFAULT_DEBOUNCE.as_millis() as u64,
        }
    }
}

impl ApiConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retries, Duration::from_millis(self.retry_base_delay_ms))
    }

    pub fn autocomplete_debounce(&self) -> Duration {
        Duration::from_millis(self.autocomplete_debounce_ms)
    }
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, creates a default one with comments.
    /// If the config file exists but is invalid, returns an error.
    /// Missing fields in the config file will use default values.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::default_config_path()?;
        Self::load_from(&config_path)
    }

    pub fn load_from(config_path: &Path) -> Result<Self, ConfigError> {
        if !config_path.exists() {
            Self::create_default_config(config_path)?;
            return Ok(Self::default());
        }

        let content = fs::read_to_string(config_path).map_err(|e| ConfigError::Io {
            path: config_path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: config_path.to_path_buf(),
            source: e,
        })?;

        Ok(config)
    }

    /// Get the default config file path: `~/.config/tagboard/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("tagboard").join("config.toml"))
    }

    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        tracing::info!("Created default config at {}", path.display());
        Ok(())
    }

    /// Generate the default config file content with comments.
    fn default_config_content() -> String {
        r##"# tagboard configuration
#
# Accounts, proxy, blacklist and content filters are managed with
# `tagboard account`, `tagboard proxy`, `tagboard blacklist` and `tagboard set`.
#
# Colors can be specified as:
# - Named colors: Black, Red, Green, Yellow, Blue, Magenta, Cyan, Gray,
#   DarkGray, LightRed, LightGreen, LightYellow, LightBlue, LightMagenta,
#   LightCyan, White, Reset
# - Hex colors: "#RRGGBB" or "#RGB"
#
# Keybindings can be specified as:
# - Single characters: "a", "A", "1", "/"
# - Special keys: Enter, Tab, BackTab, Backspace, Delete, Home, End,
#   PageUp, PageDown, Up, Down, Left, Right, Esc, Space, F1-F12
# - With modifiers: "Ctrl+c", "Shift+Tab", "Alt+Enter"

[api]
# Sent with every request. The board rejects requests without one.
# user_agent = "tagboard/x.y.z"

# Request timeout in seconds
timeout_secs = 30

# Posts per page
page_limit = 50

# Retries for network failures and 5xx responses, with exponential backoff
retries = 3
retry_base_delay_ms = 1000

# Pause after typing before tags are looked up
autocomplete_debounce_ms = 300

[colors]
# Border colors
active_border = "Cyan"
inactive_border = "DarkGray"

# Selection highlight
selection_bg_active = "Cyan"
selection_fg_active = "Black"
selection_bg_inactive = "DarkGray"
selection_fg_inactive = "White"

# Text
text = "White"
muted = "DarkGray"
link = "Blue"
error = "Red"

# Ratings
rating_safe = "Green"
rating_questionable = "Yellow"
rating_explicit = "Red"

# Tag categories
tag_artist = "LightYellow"
tag_character = "LightGreen"
tag_copyright = "LightMagenta"
tag_species = "LightRed"
tag_general = "LightBlue"
tag_meta = "Gray"

# Status bar
status_fg = "White"
status_bg = "DarkGray"

[keybindings]
# Navigation
quit = ["q", "Ctrl+c"]
move_up = ["k", "Up"]
move_down = ["j", "Down"]
next_page = ["n", "PageDown"]
prev_page = ["p", "PageUp"]
next_pane = ["Tab"]
prev_pane = ["BackTab", "Shift+Tab"]

# Actions
select = ["Enter"]
search = ["/"]
switch_tab = ["t"]
refresh = ["R"]
open_in_browser = ["o"]
toggle_maximize = ["m"]
toggle_nsfw = ["N"]
"##
        .to_string()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}
