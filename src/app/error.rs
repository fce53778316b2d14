use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::settings::SettingsError;

#[derive(Error, Debug)]
pub enum TagboardError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] rusqlite_migration::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{}", .0.user_message())]
    Api(#[from] ApiError),

    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, TagboardError>;
