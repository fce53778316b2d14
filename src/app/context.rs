use std::path::PathBuf;
use std::sync::Arc;

use crate::api::{ApiClient, HttpTransport};
use crate::app::error::{Result, TagboardError};
use crate::config::Config;
use crate::store::{SettingsStore, SqliteStore};

pub struct AppContext {
    pub config: Config,
    pub store: Arc<SqliteStore>,
    pub settings: SettingsStore,
    pub client: ApiClient,
}

impl AppContext {
    pub fn new(db_path: Option<PathBuf>, config: Config) -> Result<Self> {
        let db_path = match db_path {
            Some(p) => p,
            None => Self::default_db_path()?,
        };

        let store = Arc::new(SqliteStore::new(&db_path)?);
        let client = Self::http_client(&config)?;
        Self::from_parts(config, store, client)
    }

    pub fn in_memory(config: Config) -> Result<Self> {
        let store = Arc::new(SqliteStore::in_memory()?);
        let client = Self::http_client(&config)?;
        Self::from_parts(config, store, client)
    }

    /// Assemble a context around an existing store and client.
    pub fn from_parts(config: Config, store: Arc<SqliteStore>, client: ApiClient) -> Result<Self> {
        let settings = SettingsStore::load(store.clone())?;
        Ok(Self {
            config,
            store,
            settings,
            client,
        })
    }

    fn http_client(config: &Config) -> Result<ApiClient> {
        let transport = HttpTransport::new(&config.api)?;
        Ok(ApiClient::with_retry_policy(
            Arc::new(transport),
            config.api.retry_policy(),
        ))
    }

    /// `<data_dir>/tagboard`, created if missing.
    pub fn data_dir() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| TagboardError::Other("Could not find data directory".into()))?;
        let dir = data_dir.join("tagboard");
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    fn default_db_path() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("tagboard.db"))
    }
}
