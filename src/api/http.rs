use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Client;

use super::transport::Transport;
use super::ApiError;
use crate::config::ApiConfig;

pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(config: &ApiConfig) -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(true)
            .brotli(true)
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<Vec<u8>, ApiError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::from_status(
                status.as_u16(),
                status.canonical_reason().unwrap_or_default(),
            ));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::Network(e.without_url().to_string()))?;

        Ok(body.to_vec())
    }
}
