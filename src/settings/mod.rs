//! User settings: accounts, proxy, content flags and the tag blacklist.
//!
//! Settings are an owned value. Changes go through [`SettingsPatch`] and
//! produce a new [`Settings`]; [`SettingsStore`](crate::store::SettingsStore)
//! is the only writer and persists after every change.

pub mod migrate;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub use migrate::{upgrade, Upgraded, CURRENT_VERSION};

/// Host used when no account is active or the account host is blank.
pub const DEFAULT_HOST: &str = "https://e621.net";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Account {
    pub id: String,
    pub label: String,
    pub username: String,
    pub api_key: String,
    pub host: String,
}

impl Account {
    pub fn new(username: &str, api_key: &str, host: Option<&str>) -> Self {
        let host = host
            .map(|h| {
                let h = h.trim();
                h.strip_suffix('/').unwrap_or(h).to_string()
            })
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let username = username.trim().to_string();

        Self {
            id: Self::generate_id(&username, &host),
            label: username.clone(),
            username,
            api_key: api_key.trim().to_string(),
            host,
        }
    }

    /// Deterministic id from username and host.
    pub fn generate_id(username: &str, host: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(username.to_lowercase().as_bytes());
        hasher.update(b"@");
        hasher.update(host.as_bytes());
        hex::encode(hasher.finalize())[..12].to_string()
    }

    /// Both credentials present after trimming.
    pub fn has_credentials(&self) -> bool {
        !self.username.trim().is_empty() && !self.api_key.trim().is_empty()
    }

    pub fn masked_key(&self) -> String {
        let key: Vec<char> = self.api_key.trim().chars().collect();
        let visible = key.len().saturating_sub(4);
        key.iter()
            .enumerate()
            .map(|(i, c)| if i < visible || key.len() <= 4 { '*' } else { *c })
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProxyConfig {
    pub enabled: bool,
    pub url: String,
}

impl ProxyConfig {
    /// Enabled with a non-blank URL.
    pub fn is_active(&self) -> bool {
        self.enabled && !self.url.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub version: u32,
    pub accounts: Vec<Account>,
    pub active_account_id: Option<String>,
    pub proxy: ProxyConfig,
    pub nsfw_enabled: bool,
    pub safe_mode_blur: bool,
    pub dark_theme: bool,
    pub blacklist: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            accounts: Vec::new(),
            active_account_id: None,
            proxy: ProxyConfig::default(),
            nsfw_enabled: false,
            safe_mode_blur: true,
            dark_theme: true,
            blacklist: Vec::new(),
        }
    }
}

/// Partial update; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsPatch {
    pub accounts: Option<Vec<Account>>,
    pub active_account_id: Option<Option<String>>,
    pub proxy: Option<ProxyConfig>,
    pub nsfw_enabled: Option<bool>,
    pub safe_mode_blur: Option<bool>,
    pub dark_theme: Option<bool>,
    pub blacklist: Option<Vec<String>>,
}

impl Settings {
    pub fn active_account(&self) -> Option<&Account> {
        let id = self.active_account_id.as_deref()?;
        self.accounts.iter().find(|a| a.id == id)
    }

    /// Base URL requests go to.
    pub fn host(&self) -> String {
        self.active_account()
            .map(|a| {
                let host = a.host.trim();
                host.strip_suffix('/').unwrap_or(host)
            })
            .filter(|h| !h.is_empty())
            .unwrap_or(DEFAULT_HOST)
            .to_string()
    }

    /// Username of the active account, if non-blank.
    pub fn username(&self) -> Option<&str> {
        self.active_account()
            .map(|a| a.username.trim())
            .filter(|u| !u.is_empty())
    }

    /// Apply a patch, returning the new settings.
    ///
    /// The blacklist is normalized into an ordered set and a dangling active
    /// account id is cleared.
    pub fn merged(&self, patch: SettingsPatch) -> Settings {
        let mut next = self.clone();

        if let Some(accounts) = patch.accounts {
            next.accounts = accounts;
        }
        if let Some(active) = patch.active_account_id {
            next.active_account_id = active;
        }
        if let Some(proxy) = patch.proxy {
            next.proxy = ProxyConfig {
                enabled: proxy.enabled,
                url: proxy.url.trim().to_string(),
            };
        }
        if let Some(nsfw) = patch.nsfw_enabled {
            next.nsfw_enabled = nsfw;
        }
        if let Some(blur) = patch.safe_mode_blur {
            next.safe_mode_blur = blur;
        }
        if let Some(dark) = patch.dark_theme {
            next.dark_theme = dark;
        }
        if let Some(blacklist) = patch.blacklist {
            next.blacklist = normalize_blacklist(blacklist);
        }

        if next.active_account().is_none() {
            next.active_account_id = None;
        }
        next.version = CURRENT_VERSION;
        next
    }

    /// Patch that adds (or replaces, by id) an account and makes it active.
    pub fn add_account_patch(&self, account: Account) -> SettingsPatch {
        let mut accounts: Vec<Account> = self
            .accounts
            .iter()
            .filter(|a| a.id != account.id)
            .cloned()
            .collect();
        let id = account.id.clone();
        accounts.push(account);

        SettingsPatch {
            accounts: Some(accounts),
            active_account_id: Some(Some(id)),
            ..Default::default()
        }
    }

    /// Patch that removes an account; the active pointer moves to the first
    /// remaining account when the removed one was active.
    pub fn remove_account_patch(&self, id: &str) -> SettingsPatch {
        let accounts: Vec<Account> = self
            .accounts
            .iter()
            .filter(|a| a.id != id)
            .cloned()
            .collect();

        let active = if self.active_account_id.as_deref() == Some(id) {
            accounts.first().map(|a| a.id.clone())
        } else {
            self.active_account_id.clone()
        };

        SettingsPatch {
            accounts: Some(accounts),
            active_account_id: Some(active),
            ..Default::default()
        }
    }

    pub fn blacklist_add_patch<I, S>(&self, tags: I) -> SettingsPatch
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut blacklist = self.blacklist.clone();
        blacklist.extend(tags.into_iter().map(Into::into));
        SettingsPatch {
            blacklist: Some(blacklist),
            ..Default::default()
        }
    }

    pub fn blacklist_remove_patch(&self, tags: &[String]) -> SettingsPatch {
        let blacklist = self
            .blacklist
            .iter()
            .filter(|t| !tags.iter().any(|r| r.trim() == t.as_str()))
            .cloned()
            .collect();
        SettingsPatch {
            blacklist: Some(blacklist),
            ..Default::default()
        }
    }
}

/// Trim, drop blanks and duplicates, keep first-seen order.
pub fn normalize_blacklist(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !out.iter().any(|t| t == tag) {
            out.push(tag.to_string());
        }
    }
    out
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Invalid settings JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported settings version {found} (newest known is {supported})")]
    UnsupportedVersion { found: u64, supported: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_id_is_stable() {
        let a = Account::new("Fox", "key", None);
        let b = Account::new(" fox ", "other", Some("https://e621.net/"));
        assert_eq!(a.id, b.id);
        assert_eq!(a.host, DEFAULT_HOST);
        assert_ne!(a.id, Account::new("fox", "key", Some("https://e926.net")).id);
    }

    #[test]
    fn test_has_credentials_requires_both() {
        assert!(Account::new("fox", "key", None).has_credentials());
        assert!(!Account::new("fox", "   ", None).has_credentials());
        assert!(!Account::new("", "key", None).has_credentials());
    }

    #[test]
    fn test_masked_key() {
        let account = Account::new("fox", "abcdefgh", None);
        assert_eq!(account.masked_key(), "****efgh");
    }

    #[test]
    fn test_add_account_becomes_active() {
        let settings = Settings::default();
        let account = Account::new("fox", "key", None);
        let next = settings.merged(settings.add_account_patch(account.clone()));

        assert_eq!(next.accounts.len(), 1);
        assert_eq!(next.active_account(), Some(&account));
        assert_eq!(next.username(), Some("fox"));
        assert_eq!(next.host(), DEFAULT_HOST);
        // original untouched
        assert!(settings.accounts.is_empty());
    }

    #[test]
    fn test_add_same_account_replaces() {
        let settings = Settings::default();
        let settings = settings.merged(settings.add_account_patch(Account::new("fox", "a", None)));
        let settings = settings.merged(settings.add_account_patch(Account::new("fox", "b", None)));
        assert_eq!(settings.accounts.len(), 1);
        assert_eq!(settings.accounts[0].api_key, "b");
    }

    #[test]
    fn test_remove_active_account_moves_pointer() {
        let settings = Settings::default();
        let first = Account::new("one", "k", None);
        let second = Account::new("two", "k", None);
        let settings = settings.merged(settings.add_account_patch(first.clone()));
        let settings = settings.merged(settings.add_account_patch(second.clone()));
        assert_eq!(settings.active_account_id.as_deref(), Some(second.id.as_str()));

        let settings = settings.merged(settings.remove_account_patch(&second.id));
        assert_eq!(settings.active_account_id.as_deref(), Some(first.id.as_str()));

        let settings = settings.merged(settings.remove_account_patch(&first.id));
        assert_eq!(settings.active_account_id, None);
        assert_eq!(settings.host(), DEFAULT_HOST);
    }

    #[test]
    fn test_dangling_active_id_cleared() {
        let settings = Settings::default().merged(SettingsPatch {
            active_account_id: Some(Some("missing".into())),
            ..Default::default()
        });
        assert_eq!(settings.active_account_id, None);
    }

    #[test]
    fn test_blacklist_is_ordered_set() {
        let settings = Settings::default();
        let next = settings.merged(settings.blacklist_add_patch(["b", " a ", "b", "", "c"]));
        assert_eq!(next.blacklist, vec!["b", "a", "c"]);

        let next = next.merged(next.blacklist_remove_patch(&["a".to_string()]));
        assert_eq!(next.blacklist, vec!["b", "c"]);
    }

    #[test]
    fn test_patch_leaves_other_fields() {
        let settings = Settings::default();
        let next = settings.merged(SettingsPatch {
            nsfw_enabled: Some(true),
            ..Default::default()
        });
        assert!(next.nsfw_enabled);
        assert_eq!(next.safe_mode_blur, settings.safe_mode_blur);
        assert_eq!(next.dark_theme, settings.dark_theme);
    }

    #[test]
    fn test_proxy_is_active() {
        let mut proxy = ProxyConfig {
            enabled: true,
            url: "  ".into(),
        };
        assert!(!proxy.is_active());
        proxy.url = "https://proxy.example".into();
        assert!(proxy.is_active());
        proxy.enabled = false;
        assert!(!proxy.is_active());
    }
}
