use crate::api::ApiError;
use crate::settings::Settings;

use super::Tab;

pub const FAVORITES_NEEDS_ACCOUNT: &str =
    "Favorites need an account. Add one with `tagboard account add <username> <api key>`.";

/// Tag query sent to the board for `tab` and the user's free text.
///
/// Order: `fav:<username>` on the favorites tab, then `rating:s` unless NSFW
/// content is enabled, then the user's text.
pub fn compose_query(tab: Tab, settings: &Settings, user_query: &str) -> Result<String, ApiError> {
    let mut parts: Vec<String> = Vec::new();

    if tab == Tab::Favorites {
        let username = settings
            .username()
            .ok_or_else(|| ApiError::Validation(FAVORITES_NEEDS_ACCOUNT.to_string()))?;
        parts.push(format!("fav:{}", username));
    }

    if !settings.nsfw_enabled {
        parts.push("rating:s".to_string());
    }

    let user_query = user_query.trim();
    if !user_query.is_empty() {
        parts.push(user_query.to_string());
    }

    Ok(parts.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{Account, SettingsPatch};

    fn settings(nsfw: bool, username: Option<&str>) -> Settings {
        let mut settings = Settings::default().merged(SettingsPatch {
            nsfw_enabled: Some(nsfw),
            ..Default::default()
        });
        if let Some(username) = username {
            settings = settings.merged(settings.add_account_patch(Account::new(username, "k", None)));
        }
        settings
    }

    #[test]
    fn test_safe_posts_tab() {
        assert_eq!(
            compose_query(Tab::Posts, &settings(false, None), " fox ").unwrap(),
            "rating:s fox"
        );
    }

    #[test]
    fn test_nsfw_posts_tab() {
        assert_eq!(
            compose_query(Tab::Posts, &settings(true, None), "fox").unwrap(),
            "fox"
        );
        assert_eq!(compose_query(Tab::Posts, &settings(true, None), "").unwrap(), "");
    }

    #[test]
    fn test_favorites_prefix_order() {
        assert_eq!(
            compose_query(Tab::Favorites, &settings(false, Some("fox")), "solo").unwrap(),
            "fav:fox rating:s solo"
        );
        assert_eq!(
            compose_query(Tab::Favorites, &settings(true, Some("fox")), "").unwrap(),
            "fav:fox"
        );
    }

    #[test]
    fn test_favorites_without_username() {
        let err = compose_query(Tab::Favorites, &settings(false, None), "").unwrap_err();
        assert_eq!(err, ApiError::Validation(FAVORITES_NEEDS_ACCOUNT.to_string()));
    }
}
