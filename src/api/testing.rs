//! Scripted transport and fixtures for unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::transport::Transport;
use super::ApiError;

/// Replays queued responses in order and records every requested URL.
/// An empty queue answers with an empty post list.
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<Result<Vec<u8>, ApiError>>>,
    urls: Mutex<Vec<String>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_ok(&self, body: impl Into<String>) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(body.into().into_bytes()));
    }

    pub fn push_err(&self, error: ApiError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    pub fn calls(&self) -> usize {
        self.urls.lock().unwrap().len()
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }

    pub fn last_url(&self) -> Option<String> {
        self.urls.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, url: &str) -> Result<Vec<u8>, ApiError> {
        self.urls.lock().unwrap().push(url.to_string());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(br#"{"posts": []}"#.to_vec()))
    }
}

/// JSON for a post with the given general tags.
pub fn post_json(id: u64, general: &[&str]) -> String {
    serde_json::json!({
        "id": id,
        "file": {"width": 100, "height": 100, "ext": "png", "size": 1, "md5": null, "url": null},
        "tags": {"general": general, "artist": []},
        "rating": "s",
    })
    .to_string()
}

/// A `{"posts": [...]}` page with one post per id.
pub fn posts_page(ids: &[u64]) -> String {
    let posts: Vec<String> = ids.iter().map(|id| post_json(*id, &[])).collect();
    format!(r#"{{"posts": [{}]}}"#, posts.join(","))
}
