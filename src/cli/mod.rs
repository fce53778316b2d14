pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tagboard")]
#[command(about = "A terminal client for tag-based image boards", long_about = None)]
pub struct Cli {
    /// Path to the local database (default: <data dir>/tagboard/tagboard.db)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List posts matching a tag query
    Posts {
        /// Tags to search for
        query: Vec<String>,
        /// Search the active account's favorites
        #[arg(short, long)]
        favorites: bool,
        /// Page number, starting at 1
        #[arg(short, long, default_value_t = 1)]
        page: u32,
        /// Posts per page (default from config)
        #[arg(short, long)]
        limit: Option<u32>,
        /// Include posts hidden by the blacklist
        #[arg(long)]
        all: bool,
    },
    /// Suggest tags for a prefix
    Tags {
        query: String,
    },
    /// Show the comments on a post
    Comments {
        post_id: u64,
    },
    /// Look up a user by id or name
    User {
        id_or_name: String,
    },
    /// Manage accounts
    Account {
        #[command(subcommand)]
        action: AccountAction,
    },
    /// Manage the request proxy
    Proxy {
        #[command(subcommand)]
        action: ProxyAction,
    },
    /// Manage blacklisted tags
    Blacklist {
        #[command(subcommand)]
        action: BlacklistAction,
    },
    /// Change content and display preferences
    Set {
        /// Show questionable and explicit posts
        #[arg(long)]
        nsfw: Option<bool>,
        /// Hide file URLs of non-safe posts in the TUI
        #[arg(long)]
        safe_blur: Option<bool>,
        /// Use colors for a dark terminal background
        #[arg(long)]
        dark_theme: Option<bool>,
    },
    /// Print the current settings
    Settings {
        /// Forget accounts, proxy and preferences first
        #[arg(long)]
        reset: bool,
    },
    /// Launch the TUI
    Tui,
}

#[derive(Subcommand)]
pub enum AccountAction {
    /// Add an account (or update one with the same username and host) and make it active
    Add {
        username: String,
        api_key: String,
        /// Board URL (default: https://e621.net)
        #[arg(long)]
        host: Option<String>,
        /// Display label (default: the username)
        #[arg(long)]
        label: Option<String>,
    },
    /// Remove an account by id or username
    Remove { account: String },
    /// Make an account active by id or username
    Use { account: String },
    /// List accounts
    List,
}

#[derive(Subcommand)]
pub enum ProxyAction {
    /// Set the proxy URL and enable it
    Set { url: String },
    /// Route requests through the configured proxy
    Enable,
    /// Send requests directly to the board
    Disable,
    /// Show the proxy configuration
    Show,
}

#[derive(Subcommand)]
pub enum BlacklistAction {
    /// Hide posts carrying any of these tags
    Add {
        #[arg(required = true)]
        tags: Vec<String>,
    },
    /// Stop hiding these tags
    Remove {
        #[arg(required = true)]
        tags: Vec<String>,
    },
    /// List blacklisted tags
    List,
}
