//! Versioned upgrade of the persisted settings blob.
//!
//! Version 1 is the original single-account layout with flat credential and
//! proxy fields. It carries no `version` key. Version 2 is the multi-account
//! [`Settings`] layout. Each step upgrades one version; [`upgrade`] runs them
//! in order until the blob is current.

use serde::Deserialize;
use serde_json::Value;

use super::{normalize_blacklist, Account, ProxyConfig, Settings, SettingsError};

pub const CURRENT_VERSION: u32 = 2;

/// Single-account layout written by early releases.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct LegacySettings {
    username: String,
    api_key: String,
    host: Option<String>,
    proxy_enabled: bool,
    proxy_url: String,
    nsfw_enabled: bool,
    safe_mode: Option<bool>,
    dark_mode: Option<bool>,
    blacklist: LegacyBlacklist,
}

/// Older builds stored the blacklist as one newline-separated string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LegacyBlacklist {
    List(Vec<String>),
    Text(String),
}

impl Default for LegacyBlacklist {
    fn default() -> Self {
        LegacyBlacklist::List(Vec::new())
    }
}

impl LegacyBlacklist {
    fn into_tags(self) -> Vec<String> {
        match self {
            LegacyBlacklist::List(tags) => tags,
            LegacyBlacklist::Text(text) => text.split_whitespace().map(String::from).collect(),
        }
    }
}

/// Outcome of reading a stored blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upgraded {
    pub settings: Settings,
    /// Version found in storage before upgrading.
    pub from_version: u64,
}

impl Upgraded {
    pub fn was_upgraded(&self) -> bool {
        self.from_version < u64::from(CURRENT_VERSION)
    }
}

/// Parse a stored blob of any known version into current [`Settings`].
pub fn upgrade(raw: &str) -> Result<Upgraded, SettingsError> {
    let mut value: Value = serde_json::from_str(raw)?;
    let from_version = stored_version(&value);

    if from_version > u64::from(CURRENT_VERSION) {
        return Err(SettingsError::UnsupportedVersion {
            found: from_version,
            supported: CURRENT_VERSION,
        });
    }

    let mut version = from_version;
    while version < u64::from(CURRENT_VERSION) {
        value = match version {
            1 => v1_to_v2(value)?,
            _ => {
                return Err(SettingsError::UnsupportedVersion {
                    found: version,
                    supported: CURRENT_VERSION,
                })
            }
        };
        version += 1;
    }

    let settings: Settings = serde_json::from_value(value)?;
    Ok(Upgraded {
        settings,
        from_version,
    })
}

fn stored_version(value: &Value) -> u64 {
    value.get("version").and_then(Value::as_u64).unwrap_or(1)
}

fn v1_to_v2(value: Value) -> Result<Value, SettingsError> {
    let legacy: LegacySettings = serde_json::from_value(value)?;
    let defaults = Settings::default();

    let mut accounts = Vec::new();
    let mut active_account_id = None;
    if !legacy.username.trim().is_empty() || !legacy.api_key.trim().is_empty() {
        let account = Account::new(&legacy.username, &legacy.api_key, legacy.host.as_deref());
        active_account_id = Some(account.id.clone());
        accounts.push(account);
    }

    let settings = Settings {
        version: 2,
        accounts,
        active_account_id,
        proxy: ProxyConfig {
            enabled: legacy.proxy_enabled,
            url: legacy.proxy_url.trim().to_string(),
        },
        nsfw_enabled: legacy.nsfw_enabled,
        safe_mode_blur: legacy.safe_mode.unwrap_or(defaults.safe_mode_blur),
        dark_theme: legacy.dark_mode.unwrap_or(defaults.dark_theme),
        blacklist: normalize_blacklist(legacy.blacklist.into_tags()),
    };

    Ok(serde_json::to_value(settings)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::DEFAULT_HOST;

    #[test]
    fn test_legacy_credentials_become_active_account() {
        let raw = r#"{
            "username": " fox ",
            "apiKey": "secret ",
            "proxyEnabled": true,
            "proxyUrl": "https://proxy.example/?url=",
            "nsfwEnabled": true,
            "blacklist": ["gore", "gore", "scat"]
        }"#;

        let upgraded = upgrade(raw).unwrap();
        assert!(upgraded.was_upgraded());
        assert_eq!(upgraded.from_version, 1);

        let settings = upgraded.settings;
        assert_eq!(settings.version, CURRENT_VERSION);
        assert_eq!(settings.accounts.len(), 1);
        let account = settings.active_account().unwrap();
        assert_eq!(account.username, "fox");
        assert_eq!(account.api_key, "secret");
        assert_eq!(account.host, DEFAULT_HOST);
        assert!(settings.proxy.is_active());
        assert!(settings.nsfw_enabled);
        assert_eq!(settings.blacklist, vec!["gore", "scat"]);
    }

    #[test]
    fn test_legacy_without_credentials_has_no_account() {
        let upgraded = upgrade(r#"{"nsfwEnabled": false, "darkMode": false}"#).unwrap();
        assert!(upgraded.settings.accounts.is_empty());
        assert_eq!(upgraded.settings.active_account_id, None);
        assert!(!upgraded.settings.dark_theme);
    }

    #[test]
    fn test_legacy_text_blacklist() {
        let upgraded = upgrade(r#"{"blacklist": "gore\nscat  feral"}"#).unwrap();
        assert_eq!(upgraded.settings.blacklist, vec!["gore", "scat", "feral"]);
    }

    #[test]
    fn test_current_version_passes_through() {
        let settings = Settings::default()
            .merged(Settings::default().add_account_patch(Account::new("fox", "k", None)));
        let raw = serde_json::to_string(&settings).unwrap();

        let upgraded = upgrade(&raw).unwrap();
        assert!(!upgraded.was_upgraded());
        assert_eq!(upgraded.settings, settings);
    }

    #[test]
    fn test_future_version_rejected() {
        let err = upgrade(r#"{"version": 9}"#).unwrap_err();
        assert!(matches!(
            err,
            SettingsError::UnsupportedVersion { found: 9, .. }
        ));
    }

    #[test]
    fn test_garbage_is_json_error() {
        assert!(matches!(upgrade("not json"), Err(SettingsError::Json(_))));
    }
}
