use crate::app::{AppContext, Result, TagboardError};
use crate::autocomplete;
use crate::domain::{Comment, Post, TagSuggestion, User};
use crate::feed::{compose_query, Blacklist, Tab};
use crate::settings::{Account, ProxyConfig, Settings, SettingsPatch};

pub async fn list_posts(
    ctx: &AppContext,
    query: &[String],
    favorites: bool,
    page: u32,
    limit: Option<u32>,
    show_all: bool,
) -> Result<()> {
    let settings = ctx.settings.current();
    let tab = if favorites { Tab::Favorites } else { Tab::Posts };
    let tags = compose_query(tab, settings, &query.join(" "))?;
    let limit = limit.unwrap_or(ctx.config.api.page_limit);

    let posts = ctx
        .client
        .get_posts(settings, &tags, page.max(1), limit)
        .await?;

    let blacklist = Blacklist::from(settings.blacklist.as_slice());
    let visible: Vec<&Post> = if show_all {
        posts.iter().collect()
    } else {
        blacklist.filter(&posts)
    };

    if posts.is_empty() {
        println!("No posts found for \"{}\"", tags);
        return Ok(());
    }

    let host = settings.host();
    for post in &visible {
        println!("{}", format_post_line(post, &host));
    }

    let hidden = posts.len() - visible.len();
    if hidden > 0 {
        println!("({} hidden by blacklist, use --all to show)", hidden);
    }

    Ok(())
}

pub async fn search_tags(ctx: &AppContext, query: &str) -> Result<()> {
    let token = autocomplete::current_token(query);
    let tags = ctx.client.search_tags(ctx.settings.current(), token).await;

    if tags.is_empty() {
        println!("No tags match \"{}\"", token);
        return Ok(());
    }

    for tag in &tags {
        println!("{}", format_tag_line(tag));
    }
    Ok(())
}

pub async fn show_comments(ctx: &AppContext, post_id: u64) -> Result<()> {
    let never = std::sync::atomic::AtomicBool::new(false);
    let comments = ctx
        .client
        .load_comments_with_authors(ctx.settings.current(), post_id, &never)
        .await
        .unwrap_or_default();

    if comments.is_empty() {
        println!("No comments on post #{}", post_id);
        return Ok(());
    }

    for comment in comments.iter().filter(|c| !c.is_hidden) {
        println!("{}", format_comment(comment));
        println!();
    }
    Ok(())
}

pub async fn show_user(ctx: &AppContext, id_or_name: &str) -> Result<()> {
    let settings = ctx.settings.current();
    let user = match id_or_name.trim().parse::<u64>() {
        Ok(id) => ctx.client.get_user(settings, id).await,
        Err(_) => ctx.client.get_user_by_name(settings, id_or_name).await,
    };

    match user {
        Some(user) => println!("{}", format_user(&user)),
        None => println!("User not found: {}", id_or_name),
    }
    Ok(())
}

pub fn add_account(
    ctx: &mut AppContext,
    username: &str,
    api_key: &str,
    host: Option<&str>,
    label: Option<&str>,
) -> Result<()> {
    let mut account = Account::new(username, api_key, host);
    if account.username.is_empty() {
        return Err(TagboardError::Other("Username must not be empty".into()));
    }
    if let Some(label) = label.map(str::trim).filter(|l| !l.is_empty()) {
        account.label = label.to_string();
    }

    let replaced = ctx
        .settings
        .current()
        .accounts
        .iter()
        .any(|a| a.id == account.id);
    let patch = ctx.settings.current().add_account_patch(account.clone());
    ctx.settings.update(patch)?;

    let verb = if replaced { "Updated" } else { "Added" };
    println!("{} account {} ({}) and made it active", verb, account.label, account.id);
    Ok(())
}

pub fn remove_account(ctx: &mut AppContext, key: &str) -> Result<()> {
    let account = find_account(ctx.settings.current(), key)?.clone();
    let patch = ctx.settings.current().remove_account_patch(&account.id);
    let settings = ctx.settings.update(patch)?;

    println!("Removed account {} ({})", account.label, account.id);
    if let Some(active) = settings.active_account() {
        println!("Active account is now {}", active.label);
    }
    Ok(())
}

pub fn use_account(ctx: &mut AppContext, key: &str) -> Result<()> {
    let account = find_account(ctx.settings.current(), key)?.clone();
    ctx.settings.update(SettingsPatch {
        active_account_id: Some(Some(account.id.clone())),
        ..Default::default()
    })?;

    println!("Active account: {} ({})", account.label, account.id);
    Ok(())
}

pub fn list_accounts(ctx: &AppContext) -> Result<()> {
    let settings = ctx.settings.current();
    if settings.accounts.is_empty() {
        println!("No accounts. Add one with `tagboard account add <USERNAME> <API_KEY>`");
        return Ok(());
    }

    for account in &settings.accounts {
        let marker = if settings.active_account_id.as_deref() == Some(account.id.as_str()) {
            "*"
        } else {
            " "
        };
        println!("{} {}", marker, format_account(account));
    }
    Ok(())
}

pub fn set_proxy(ctx: &mut AppContext, url: &str) -> Result<()> {
    let url = url.trim();
    if url.is_empty() {
        return Err(TagboardError::Other("Proxy URL must not be empty".into()));
    }
    ctx.settings.update(SettingsPatch {
        proxy: Some(ProxyConfig {
            enabled: true,
            url: url.to_string(),
        }),
        ..Default::default()
    })?;
    show_proxy(ctx)
}

pub fn toggle_proxy(ctx: &mut AppContext, enabled: bool) -> Result<()> {
    let mut proxy = ctx.settings.current().proxy.clone();
    if enabled && proxy.url.trim().is_empty() {
        return Err(TagboardError::Other(
            "No proxy URL configured. Use `tagboard proxy set <URL>`".into(),
        ));
    }
    proxy.enabled = enabled;
    ctx.settings.update(SettingsPatch {
        proxy: Some(proxy),
        ..Default::default()
    })?;
    show_proxy(ctx)
}

pub fn show_proxy(ctx: &AppContext) -> Result<()> {
    let proxy = &ctx.settings.current().proxy;
    println!("{}", format_proxy(proxy));
    Ok(())
}

pub fn blacklist_add(ctx: &mut AppContext, tags: &[String]) -> Result<()> {
    let patch = ctx.settings.current().blacklist_add_patch(tags.iter().cloned());
    let settings = ctx.settings.update(patch)?;
    println!("Blacklist: {}", settings.blacklist.join(" "));
    Ok(())
}

pub fn blacklist_remove(ctx: &mut AppContext, tags: &[String]) -> Result<()> {
    let patch = ctx.settings.current().blacklist_remove_patch(tags);
    let settings = ctx.settings.update(patch)?;
    if settings.blacklist.is_empty() {
        println!("Blacklist is empty");
    } else {
        println!("Blacklist: {}", settings.blacklist.join(" "));
    }
    Ok(())
}

pub fn blacklist_list(ctx: &AppContext) -> Result<()> {
    let blacklist = &ctx.settings.current().blacklist;
    if blacklist.is_empty() {
        println!("Blacklist is empty");
    }
    for tag in blacklist {
        println!("{}", tag);
    }
    Ok(())
}

pub fn set_flags(
    ctx: &mut AppContext,
    nsfw: Option<bool>,
    safe_blur: Option<bool>,
    dark_theme: Option<bool>,
) -> Result<()> {
    if nsfw.is_none() && safe_blur.is_none() && dark_theme.is_none() {
        println!("Nothing to change. See `tagboard set --help`");
        return Ok(());
    }

    ctx.settings.update(SettingsPatch {
        nsfw_enabled: nsfw,
        safe_mode_blur: safe_blur,
        dark_theme,
        ..Default::default()
    })?;
    show_settings(ctx)
}

pub fn reset_settings(ctx: &mut AppContext) -> Result<()> {
    ctx.settings.reset()?;
    println!("Settings reset to defaults");
    Ok(())
}

pub fn show_settings(ctx: &AppContext) -> Result<()> {
    println!("{}", format_settings(ctx.settings.current()));
    Ok(())
}

/// Find an account by exact id, then by case-insensitive username.
fn find_account<'a>(settings: &'a Settings, key: &str) -> Result<&'a Account> {
    let key = key.trim();
    settings
        .accounts
        .iter()
        .find(|a| a.id == key)
        .or_else(|| {
            settings
                .accounts
                .iter()
                .find(|a| a.username.eq_ignore_ascii_case(key))
        })
        .ok_or_else(|| TagboardError::Other(format!("No account matching \"{}\"", key)))
}

pub fn format_post_line(post: &Post, host: &str) -> String {
    format!(
        "#{:<8} [{}] {:>5} ♥{:<5} {:<24} {}",
        post.id,
        post.rating.code(),
        post.score.total,
        post.fav_count,
        post.display_artists(),
        post.page_url(host)
    )
}

pub fn format_tag_line(tag: &TagSuggestion) -> String {
    let mut line = format!("{:<32} {:>8}  {}", tag.name, tag.post_count, tag.category_name());
    if let Some(alias) = &tag.antecedent_name {
        line.push_str(&format!("  (from {})", alias));
    }
    line
}

pub fn format_comment(comment: &Comment) -> String {
    let date = comment
        .created_at
        .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default();
    format!(
        "{} {} ({:+})\n{}",
        comment.display_author(),
        date,
        comment.score,
        comment.body.trim()
    )
}

pub fn format_user(user: &User) -> String {
    let mut lines = vec![format!("{} (#{})", user.display_name(), user.id)];
    if let Some(level) = user.level_string.as_deref().filter(|l| !l.is_empty()) {
        lines.push(format!("Level:     {}", level));
    }
    lines.push(format!("Uploads:   {}", user.post_upload_count));
    lines.push(format!("Favorites: {}", user.favorite_count));
    if let Some(created) = user.created_at {
        lines.push(format!("Joined:    {}", created.format("%Y-%m-%d")));
    }
    lines.join("\n")
}

fn format_account(account: &Account) -> String {
    format!(
        "{}  {} <{}> {} key {}",
        account.id,
        account.label,
        account.username,
        account.host,
        account.masked_key()
    )
}

fn format_proxy(proxy: &ProxyConfig) -> String {
    let state = if proxy.is_active() {
        "enabled"
    } else {
        "disabled"
    };
    if proxy.url.is_empty() {
        format!("Proxy {} (no URL set)", state)
    } else {
        format!("Proxy {}: {}", state, proxy.url)
    }
}

pub fn format_settings(settings: &Settings) -> String {
    let on_off = |b: bool| if b { "on" } else { "off" };

    let mut lines = vec![format!("Host:           {}", settings.host())];
    match settings.active_account() {
        Some(account) => lines.push(format!("Active account: {}", format_account(account))),
        None => lines.push("Active account: none".to_string()),
    }
    for account in settings
        .accounts
        .iter()
        .filter(|a| Some(a.id.as_str()) != settings.active_account_id.as_deref())
    {
        lines.push(format!("Other account:  {}", format_account(account)));
    }
    lines.push(format_proxy(&settings.proxy));
    lines.push(format!("NSFW:           {}", on_off(settings.nsfw_enabled)));
    lines.push(format!("Safe-mode blur: {}", on_off(settings.safe_mode_blur)));
    lines.push(format!("Dark theme:     {}", on_off(settings.dark_theme)));
    lines.push(format!("Blacklist:      {}", settings.blacklist.join(" ")));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::api::testing::{posts_page, MockTransport};
    use crate::api::{ApiClient, ApiError, RetryPolicy};
    use crate::config::Config;
    use crate::store::{SettingsStore, SqliteStore};

    fn context(mock: &Arc<MockTransport>) -> AppContext {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        let client = ApiClient::with_retry_policy(mock.clone(), RetryPolicy::none());
        AppContext::from_parts(Config::default(), store, client).unwrap()
    }

    #[test]
    fn test_account_commands_persist() {
        let mock = MockTransport::new();
        let mut ctx = context(&mock);

        add_account(&mut ctx, "fox", "secret1234", None, Some("Main")).unwrap();
        add_account(&mut ctx, "wolf", "other", Some("https://e926.net"), None).unwrap();
        assert_eq!(ctx.settings.current().username(), Some("wolf"));

        use_account(&mut ctx, "FOX").unwrap();
        let reloaded = SettingsStore::load(ctx.store.clone()).unwrap();
        assert_eq!(reloaded.current().username(), Some("fox"));
        assert_eq!(reloaded.current().active_account().unwrap().label, "Main");

        let fox_id = reloaded.current().active_account_id.clone().unwrap();
        remove_account(&mut ctx, &fox_id).unwrap();
        assert_eq!(ctx.settings.current().username(), Some("wolf"));
        assert!(use_account(&mut ctx, "ghost").is_err());
    }

    #[test]
    fn test_add_same_account_updates_in_place() {
        let mock = MockTransport::new();
        let mut ctx = context(&mock);

        add_account(&mut ctx, "fox", "old", None, None).unwrap();
        add_account(&mut ctx, "Fox", "new", None, None).unwrap();

        let accounts = &ctx.settings.current().accounts;
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].api_key, "new");
    }

    #[test]
    fn test_proxy_commands() {
        let mock = MockTransport::new();
        let mut ctx = context(&mock);

        assert!(toggle_proxy(&mut ctx, true).is_err());
        set_proxy(&mut ctx, " https://proxy.example/?url= ").unwrap();
        assert!(ctx.settings.current().proxy.is_active());
        assert_eq!(ctx.settings.current().proxy.url, "https://proxy.example/?url=");

        toggle_proxy(&mut ctx, false).unwrap();
        assert!(!ctx.settings.current().proxy.is_active());
        assert_eq!(ctx.settings.current().proxy.url, "https://proxy.example/?url=");
    }

    #[test]
    fn test_blacklist_commands() {
        let mock = MockTransport::new();
        let mut ctx = context(&mock);

        blacklist_add(&mut ctx, &["gore".into(), "scat".into(), "gore".into()]).unwrap();
        blacklist_remove(&mut ctx, &["scat".into()]).unwrap();

        assert_eq!(ctx.settings.current().blacklist, vec!["gore".to_string()]);
    }

    #[test]
    fn test_set_flags() {
        let mock = MockTransport::new();
        let mut ctx = context(&mock);

        set_flags(&mut ctx, Some(true), None, Some(false)).unwrap();

        let settings = ctx.settings.current();
        assert!(settings.nsfw_enabled);
        assert!(settings.safe_mode_blur);
        assert!(!settings.dark_theme);
    }

    #[test]
    fn test_reset_settings_forgets_everything() {
        let mock = MockTransport::new();
        let mut ctx = context(&mock);
        add_account(&mut ctx, "fox", "secret", None, None).unwrap();
        blacklist_add(&mut ctx, &["gore".into()]).unwrap();

        reset_settings(&mut ctx).unwrap();

        assert_eq!(ctx.settings.current(), &Settings::default());
        let reloaded = SettingsStore::load(ctx.store.clone()).unwrap();
        assert!(reloaded.current().accounts.is_empty());
        assert!(reloaded.current().blacklist.is_empty());
    }

    #[tokio::test]
    async fn test_list_posts_composes_query() {
        let mock = MockTransport::new();
        mock.push_ok(posts_page(&[1, 2]));
        let mut ctx = context(&mock);
        add_account(&mut ctx, "fox", "key", None, None).unwrap();

        list_posts(&ctx, &["solo".into(), "canine".into()], true, 2, Some(10), false)
            .await
            .unwrap();

        let url = mock.last_url().unwrap();
        assert!(url.contains("tags=fav%3Afox+rating%3As+solo+canine"));
        assert!(url.contains("page=2"));
        assert!(url.contains("limit=10"));
    }

    #[tokio::test]
    async fn test_list_posts_favorites_needs_account() {
        let mock = MockTransport::new();
        let ctx = context(&mock);

        let err = list_posts(&ctx, &[], true, 1, None, false).await.unwrap_err();

        assert!(matches!(err, TagboardError::Api(ApiError::Validation(_))));
        assert_eq!(mock.calls(), 0);
    }

    #[tokio::test]
    async fn test_list_posts_propagates_server_error() {
        let mock = MockTransport::new();
        mock.push_err(ApiError::from_status(500, "Internal Server Error"));
        let ctx = context(&mock);

        let err = list_posts(&ctx, &[], false, 1, None, false).await.unwrap_err();
        assert_eq!(err.to_string(), "Server error: 500 Internal Server Error");
    }

    #[tokio::test]
    async fn test_user_lookup_by_id_or_name() {
        let mock = MockTransport::new();
        mock.push_ok(r#"{"id": 5, "name": "five"}"#);
        mock.push_ok(r#"[{"id": 6, "name": "six"}]"#);
        let ctx = context(&mock);

        show_user(&ctx, "5").await.unwrap();
        show_user(&ctx, "six").await.unwrap();

        let urls = mock.urls();
        assert!(urls[0].contains("/users/5.json?"));
        assert!(urls[1].contains("/users.json?search%5Bname_matches%5D=six*"));
    }

    #[test]
    fn test_format_post_line() {
        let mut post = Post::new(42);
        post.tags.artist = vec!["someone".into()];
        let line = format_post_line(&post, "https://e621.net");

        assert!(line.starts_with("#42"));
        assert!(line.contains("[s]"));
        assert!(line.contains("someone"));
        assert!(line.ends_with("https://e621.net/posts/42"));
    }

    #[test]
    fn test_format_settings_masks_key() {
        let settings = Settings::default();
        let settings =
            settings.merged(settings.add_account_patch(Account::new("fox", "abcdefgh", None)));

        let text = format_settings(&settings);
        assert!(text.contains("****efgh"));
        assert!(!text.contains("abcdefgh"));
    }
}
