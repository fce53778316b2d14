//! Request URL construction: auth parameters, cache busting and proxy rewriting.

use chrono::Utc;
use url::form_urlencoded;
use url::Url;

use crate::settings::Settings;

/// Name of the cache-busting query parameter.
pub const CACHE_BUST_PARAM: &str = "_";

/// Build the final URL for `endpoint` using the current time for cache busting.
pub fn build_url(settings: &Settings, endpoint: &str, params: &[(&str, String)]) -> String {
    build_url_at(settings, endpoint, params, Utc::now().timestamp_millis())
}

/// Like [`build_url`] with an explicit cache-busting timestamp.
pub fn build_url_at(
    settings: &Settings,
    endpoint: &str,
    params: &[(&str, String)],
    timestamp_ms: i64,
) -> String {
    let target = target_url(settings, endpoint, params, timestamp_ms);

    if !settings.proxy.is_active() {
        return target;
    }

    apply_proxy(settings.proxy.url.trim(), &target)
}

/// Direct URL on the board host, before any proxy rewriting.
pub fn target_url(
    settings: &Settings,
    endpoint: &str,
    params: &[(&str, String)],
    timestamp_ms: i64,
) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    for (key, value) in params {
        query.append_pair(key, value);
    }

    // Query parameters rather than headers so credentials survive proxies
    // that strip custom headers.
    if let Some(account) = settings.active_account().filter(|a| a.has_credentials()) {
        query.append_pair("login", account.username.trim());
        query.append_pair("api_key", account.api_key.trim());
    }
    query.append_pair(CACHE_BUST_PARAM, &timestamp_ms.to_string());

    let endpoint = if endpoint.starts_with('/') {
        endpoint.to_string()
    } else {
        format!("/{}", endpoint)
    };

    format!("{}{}?{}", settings.host(), endpoint, query.finish())
}

/// Rewrite `target` for the proxy at `proxy_url`.
///
/// A proxy URL containing `?` is a prefix proxy and receives the encoded
/// target. Anything else replaces the target's origin, minus one trailing
/// slash.
pub fn apply_proxy(proxy_url: &str, target: &str) -> String {
    if proxy_url.contains('?') {
        return format!("{}{}", proxy_url, urlencoding::encode(target));
    }

    let origin = match Url::parse(target) {
        Ok(parsed) => parsed.origin().ascii_serialization(),
        Err(e) => {
            tracing::warn!("Cannot parse request URL for proxying: {}", e);
            return target.to_string();
        }
    };

    match target.strip_prefix(origin.as_str()) {
        Some(rest) => {
            let base = proxy_url.strip_suffix('/').unwrap_or(proxy_url);
            format!("{}{}", base, rest)
        }
        None => {
            tracing::warn!("Request URL does not start with its origin {}", origin);
            target.to_string()
        }
    }
}
