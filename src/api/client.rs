use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::de::DeserializeOwned;

use super::envelope::decode_list;
use super::retry::{with_retry, RetryPolicy};
use super::transport::Transport;
use super::url::build_url;
use super::ApiError;
use crate::domain::{Comment, Post, TagSuggestion, User};
use crate::settings::Settings;

/// Typed access to the board API.
///
/// Only [`ApiClient::get_posts`] reports errors. Every other lookup degrades
/// to an empty result so secondary panels never interrupt browsing.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport + Send + Sync>,
    retry: RetryPolicy,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport + Send + Sync>) -> Self {
        Self::with_retry_policy(transport, RetryPolicy::default())
    }

    pub fn with_retry_policy(transport: Arc<dyn Transport + Send + Sync>, retry: RetryPolicy) -> Self {
        Self { transport, retry }
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    async fn fetch(
        &self,
        settings: &Settings,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<Vec<u8>, ApiError> {
        let url = build_url(settings, endpoint, params);
        tracing::debug!("GET {}", endpoint);
        self.transport.get(&url).await
    }

    async fn fetch_list<T: DeserializeOwned>(
        &self,
        settings: &Settings,
        endpoint: &str,
        params: &[(&str, String)],
        key: &str,
    ) -> Result<Vec<T>, ApiError> {
        let body = self.fetch(settings, endpoint, params).await?;
        decode_list(&body, key)
    }

    /// One page of posts matching `tags`, retried on transient failures.
    pub async fn get_posts(
        &self,
        settings: &Settings,
        tags: &str,
        page: u32,
        limit: u32,
    ) -> Result<Vec<Post>, ApiError> {
        let params = [
            ("tags", tags.to_string()),
            ("page", page.to_string()),
            ("limit", limit.to_string()),
        ];

        tracing::debug!("Fetching posts page {} for {:?}", page, tags);
        with_retry(&self.retry, || {
            self.fetch_list(settings, "/posts.json", &params, "posts")
        })
        .await
    }

    /// Autocomplete suggestions; never fails.
    pub async fn search_tags(&self, settings: &Settings, query: &str) -> Vec<TagSuggestion> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }

        let params = [
            ("search[name_matches]", query.to_string()),
            ("expiry", "7".to_string()),
        ];

        match self
            .fetch_list(settings, "/tags/autocomplete.json", &params, "tags")
            .await
        {
            Ok(tags) => tags,
            Err(e) => {
                tracing::debug!("Tag autocomplete for {:?} failed: {}", query, e);
                Vec::new()
            }
        }
    }

    /// Comments on a post, oldest first as the board returns them; never fails.
    pub async fn get_comments(&self, settings: &Settings, post_id: u64) -> Vec<Comment> {
        let params = [
            ("group_by", "comment".to_string()),
            ("search[post_id]", post_id.to_string()),
        ];

        match self
            .fetch_list(settings, "/comments.json", &params, "comments")
            .await
        {
            Ok(comments) => comments,
            Err(e) => {
                tracing::debug!("Loading comments for post {} failed: {}", post_id, e);
                Vec::new()
            }
        }
    }

    pub async fn get_user(&self, settings: &Settings, user_id: u64) -> Option<User> {
        let endpoint = format!("/users/{}.json", user_id);
        let result = match self.fetch(settings, &endpoint, &[]).await {
            Ok(body) => serde_json::from_slice::<User>(&body).map_err(ApiError::from),
            Err(e) => Err(e),
        };

        match result {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::debug!("User lookup {} failed: {}", user_id, e);
                None
            }
        }
    }

    /// Look a user up by name, preferring a case-insensitive exact match
    /// over the first fuzzy hit.
    pub async fn get_user_by_name(&self, settings: &Settings, name: &str) -> Option<User> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        let params = [("search[name_matches]", format!("{}*", name))];
        let users: Vec<User> = match self
            .fetch_list(settings, "/users.json", &params, "users")
            .await
        {
            Ok(users) => users,
            Err(e) => {
                tracing::debug!("User search {:?} failed: {}", name, e);
                return None;
            }
        };

        pick_user_by_name(users, name)
    }

    /// Batch lookup; an empty id set makes no request.
    pub async fn get_users_by_ids(&self, settings: &Settings, ids: &[u64]) -> Vec<User> {
        let mut seen = HashSet::new();
        let ids: Vec<u64> = ids.iter().copied().filter(|id| seen.insert(*id)).collect();
        if ids.is_empty() {
            return Vec::new();
        }

        let joined = ids
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(",");
        let params = [
            ("search[id]", joined),
            ("limit", ids.len().to_string()),
        ];

        match self
            .fetch_list(settings, "/users.json", &params, "users")
            .await
        {
            Ok(users) => users,
            Err(e) => {
                tracing::debug!("Batch user lookup failed: {}", e);
                Vec::new()
            }
        }
    }

    /// Comments with author names resolved through one batched user lookup.
    ///
    /// Returns `None` when `cancelled` was raised before the lookups finished,
    /// i.e. the view that asked for them has been closed.
    pub async fn load_comments_with_authors(
        &self,
        settings: &Settings,
        post_id: u64,
        cancelled: &AtomicBool,
    ) -> Option<Vec<Comment>> {
        let mut comments = self.get_comments(settings, post_id).await;
        if cancelled.load(Ordering::SeqCst) {
            return None;
        }

        let creator_ids: Vec<u64> = comments.iter().map(|c| c.creator_id).collect();
        let names: HashMap<u64, String> = self
            .get_users_by_ids(settings, &creator_ids)
            .await
            .into_iter()
            .map(|u| (u.id, u.name))
            .collect();
        if cancelled.load(Ordering::SeqCst) {
            return None;
        }

        for comment in &mut comments {
            if let Some(name) = names.get(&comment.creator_id) {
                comment.creator_name = Some(name.clone());
            }
        }

        Some(comments)
    }
}

fn pick_user_by_name(users: Vec<User>, name: &str) -> Option<User> {
    let wanted = name.to_lowercase();
    let exact = users.iter().position(|u| u.name.to_lowercase() == wanted);

    let mut users = users;
    match exact {
        Some(index) => Some(users.swap_remove(index)),
        None => users.into_iter().next(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::{post_json, MockTransport};
    use crate::settings::Account;
    use std::time::Duration;

    fn client(mock: &Arc<MockTransport>) -> ApiClient {
        ApiClient::new(mock.clone())
    }

    fn authed() -> Settings {
        let settings = Settings::default();
        settings.merged(settings.add_account_patch(Account::new("fox", "key", None)))
    }

    #[tokio::test]
    async fn test_get_posts_sends_query() {
        let mock = MockTransport::new();
        mock.push_ok(format!(r#"{{"posts": [{}, {}]}}"#, post_json(1, &[]), post_json(2, &[])));

        let posts = client(&mock)
            .get_posts(&authed(), "fox rating:s", 3, 50)
            .await
            .unwrap();

        assert_eq!(posts.iter().map(|p| p.id).collect::<Vec<_>>(), vec![1, 2]);
        let url = mock.last_url().unwrap();
        assert!(url.starts_with("https://e621.net/posts.json?"));
        assert!(url.contains("tags=fox+rating%3As"));
        assert!(url.contains("page=3"));
        assert!(url.contains("limit=50"));
        assert!(url.contains("login=fox"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_posts_retries_server_errors() {
        let mock = MockTransport::new();
        mock.push_err(ApiError::from_status(502, "Bad Gateway"));
        mock.push_err(ApiError::Network("reset".into()));
        mock.push_ok(format!("[{}]", post_json(9, &[])));

        let posts = client(&mock)
            .get_posts(&Settings::default(), "", 1, 10)
            .await
            .unwrap();

        assert_eq!(posts[0].id, 9);
        assert_eq!(mock.calls(), 3);
    }

    #[tokio::test]
    async fn test_get_posts_propagates_auth_error() {
        let mock = MockTransport::new();
        mock.push_err(ApiError::from_status(401, "Unauthorized"));

        let err = client(&mock)
            .get_posts(&authed(), "", 1, 10)
            .await
            .unwrap_err();

        assert_eq!(err, ApiError::Auth { status: 401 });
        assert_eq!(mock.calls(), 1);
    }

    #[tokio::test]
    async fn test_search_tags_swallows_errors() {
        let mock = MockTransport::new();
        mock.push_err(ApiError::from_status(422, "Unprocessable"));

        let tags = client(&mock).search_tags(&Settings::default(), "fox").await;
        assert!(tags.is_empty());
        assert_eq!(mock.calls(), 1);
    }

    #[tokio::test]
    async fn test_search_tags_blank_skips_request() {
        let mock = MockTransport::new();
        let tags = client(&mock).search_tags(&Settings::default(), "   ").await;
        assert!(tags.is_empty());
        assert_eq!(mock.calls(), 0);
    }

    #[tokio::test]
    async fn test_search_tags_decodes() {
        let mock = MockTransport::new();
        mock.push_ok(
            r#"[{"id": 1, "name": "fox", "post_count": 500, "category": 5, "antecedent_name": null}]"#,
        );

        let tags = client(&mock).search_tags(&Settings::default(), "fo").await;
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].name, "fox");
        assert_eq!(tags[0].post_count, 500);
        assert_eq!(tags[0].category_name(), "species");
        assert!(mock.last_url().unwrap().contains("search%5Bname_matches%5D=fo"));
    }

    #[tokio::test]
    async fn test_get_comments_accepts_both_shapes() {
        let mock = MockTransport::new();
        mock.push_ok(r#"[{"id": 1, "post_id": 5, "creator_id": 7, "body": "hi"}]"#);
        mock.push_ok(r#"{"comments": []}"#);
        mock.push_ok(r#"{"unexpected": true}"#);

        let client = client(&mock);
        let settings = Settings::default();
        assert_eq!(client.get_comments(&settings, 5).await.len(), 1);
        assert!(client.get_comments(&settings, 5).await.is_empty());
        assert!(client.get_comments(&settings, 5).await.is_empty());
    }

    #[tokio::test]
    async fn test_get_user_by_name_prefers_exact_match() {
        let mock = MockTransport::new();
        mock.push_ok(r#"[{"id": 2, "name": "foobar"}, {"id": 1, "name": "Foo"}]"#);

        let user = client(&mock)
            .get_user_by_name(&Settings::default(), "foo")
            .await
            .unwrap();
        assert_eq!(user.name, "Foo");
        assert!(mock.last_url().unwrap().contains("search%5Bname_matches%5D=foo*"));
    }

    #[tokio::test]
    async fn test_get_user_by_name_exact_first() {
        let mock = MockTransport::new();
        mock.push_ok(r#"[{"id": 1, "name": "Foo"}, {"id": 2, "name": "foobar"}]"#);

        let user = client(&mock)
            .get_user_by_name(&Settings::default(), "foo")
            .await
            .unwrap();
        assert_eq!(user.id, 1);
    }

    #[tokio::test]
    async fn test_get_user_by_name_falls_back_to_first() {
        let mock = MockTransport::new();
        mock.push_ok(r#"{"users": [{"id": 3, "name": "foobar"}, {"id": 4, "name": "foobaz"}]}"#);

        let user = client(&mock)
            .get_user_by_name(&Settings::default(), "foo")
            .await
            .unwrap();
        assert_eq!(user.name, "foobar");
    }

    #[tokio::test]
    async fn test_get_user_by_name_not_found() {
        let mock = MockTransport::new();
        mock.push_ok("[]");
        mock.push_err(ApiError::Network("down".into()));

        let client = client(&mock);
        assert!(client.get_user_by_name(&Settings::default(), "ghost").await.is_none());
        assert!(client.get_user_by_name(&Settings::default(), "ghost").await.is_none());
    }

    #[tokio::test]
    async fn test_get_user() {
        let mock = MockTransport::new();
        mock.push_ok(r#"{"id": 12, "name": "some_user", "level_string": "Member"}"#);
        mock.push_err(ApiError::from_status(404, "Not Found"));

        let client = client(&mock);
        let user = client.get_user(&Settings::default(), 12).await.unwrap();
        assert_eq!(user.display_name(), "some user");
        assert!(mock.last_url().unwrap().starts_with("https://e621.net/users/12.json?"));
        assert!(client.get_user(&Settings::default(), 13).await.is_none());
    }

    #[tokio::test]
    async fn test_get_users_by_ids_empty_makes_no_request() {
        let mock = MockTransport::new();
        let users = client(&mock).get_users_by_ids(&Settings::default(), &[]).await;
        assert!(users.is_empty());
        assert_eq!(mock.calls(), 0);
    }

    #[tokio::test]
    async fn test_get_users_by_ids_dedupes() {
        let mock = MockTransport::new();
        mock.push_ok(r#"[{"id": 1, "name": "a"}, {"id": 2, "name": "b"}]"#);

        let users = client(&mock)
            .get_users_by_ids(&Settings::default(), &[1, 2, 1])
            .await;
        assert_eq!(users.len(), 2);
        let url = mock.last_url().unwrap();
        assert!(url.contains("search%5Bid%5D=1%2C2"));
        assert!(url.contains("limit=2"));
    }

    #[tokio::test]
    async fn test_comments_with_authors() {
        let mock = MockTransport::new();
        mock.push_ok(
            r#"[{"id": 1, "post_id": 5, "creator_id": 7, "body": "a"},
                {"id": 2, "post_id": 5, "creator_id": 8, "body": "b"},
                {"id": 3, "post_id": 5, "creator_id": 7, "body": "c"}]"#,
        );
        mock.push_ok(r#"[{"id": 7, "name": "seven"}]"#);

        let cancelled = AtomicBool::new(false);
        let comments = client(&mock)
            .load_comments_with_authors(&Settings::default(), 5, &cancelled)
            .await
            .unwrap();

        assert_eq!(comments[0].creator_name.as_deref(), Some("seven"));
        assert_eq!(comments[1].creator_name, None);
        assert_eq!(comments[2].creator_name.as_deref(), Some("seven"));
        assert!(mock.last_url().unwrap().contains("search%5Bid%5D=7%2C8"));
    }

    #[tokio::test]
    async fn test_comments_with_authors_cancelled() {
        let mock = MockTransport::new();
        mock.push_ok(r#"[{"id": 1, "post_id": 5, "creator_id": 7}]"#);

        let cancelled = AtomicBool::new(true);
        let comments = client(&mock)
            .load_comments_with_authors(&Settings::default(), 5, &cancelled)
            .await;

        assert!(comments.is_none());
        assert_eq!(mock.calls(), 1);
    }

    #[test]
    fn test_client_keeps_policy() {
        let mock = MockTransport::new();
        let policy = RetryPolicy::new(1, Duration::from_millis(5));
        let client = ApiClient::with_retry_policy(mock, policy);
        assert_eq!(client.retry_policy(), &policy);
    }
}
