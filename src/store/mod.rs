pub mod settings_store;
pub mod sqlite;

use crate::app::Result;

pub use settings_store::{SettingsStore, SETTINGS_KEY};
pub use sqlite::SqliteStore;

/// String key/value storage for client state.
pub trait Store {
    fn get_item(&self, key: &str) -> Result<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> Result<()>;
    fn remove_item(&self, key: &str) -> Result<()>;
}
