use std::sync::Arc;

use crate::app::Result;
use crate::settings::{upgrade, Settings, SettingsError, SettingsPatch};
use crate::store::Store;

/// Storage key of the settings JSON blob.
pub const SETTINGS_KEY: &str = "tagboard.settings";

/// Single writer of [`Settings`]: every change is merged and persisted
/// before it becomes visible.
pub struct SettingsStore {
    store: Arc<dyn Store + Send + Sync>,
    settings: Settings,
}

impl SettingsStore {
    /// Read the stored blob, upgrading older schema versions in place.
    ///
    /// A blob that cannot be parsed at all is replaced by defaults on the
    /// next write. A blob from a newer release is an error, so it is never
    /// overwritten.
    pub fn load(store: Arc<dyn Store + Send + Sync>) -> Result<Self> {
        let settings = match store.get_item(SETTINGS_KEY)? {
            None => Settings::default(),
            Some(raw) => match upgrade(&raw) {
                Ok(upgraded) => {
                    if upgraded.was_upgraded() {
                        tracing::info!(
                            "Upgrading stored settings from version {}",
                            upgraded.from_version
                        );
                        let json = serde_json::to_string(&upgraded.settings)
                            .map_err(SettingsError::from)?;
                        store.set_item(SETTINGS_KEY, &json)?;
                    }
                    upgraded.settings
                }
                Err(e @ SettingsError::UnsupportedVersion { .. }) => return Err(e.into()),
                Err(e) => {
                    tracing::warn!("Ignoring unreadable settings: {}", e);
                    Settings::default()
                }
            },
        };

        Ok(Self { store, settings })
    }

    pub fn current(&self) -> &Settings {
        &self.settings
    }

    /// Merge `patch`, persist, and return the new settings.
    pub fn update(&mut self, patch: SettingsPatch) -> Result<&Settings> {
        let next = self.settings.merged(patch);
        self.persist(&next)?;
        self.settings = next;
        Ok(&self.settings)
    }

    /// Drop the stored blob and fall back to defaults.
    pub fn reset(&mut self) -> Result<&Settings> {
        self.store.remove_item(SETTINGS_KEY)?;
        self.settings = Settings::default();
        tracing::info!("Settings reset to defaults");
        Ok(&self.settings)
    }

    fn persist(&self, settings: &Settings) -> Result<()> {
        let json = serde_json::to_string(settings).map_err(SettingsError::from)?;
        self.store.set_item(SETTINGS_KEY, &json)?;
        tracing::debug!("Settings saved");
        Ok(())
    }
}
