use async_trait::async_trait;

use super::ApiError;

/// Performs a GET and hands back the body of a successful response.
///
/// Implementations map failures onto [`ApiError`]: no response is
/// [`ApiError::Network`], a non-2xx status goes through
/// [`ApiError::from_status`].
#[async_trait]
pub trait Transport {
    async fn get(&self, url: &str) -> Result<Vec<u8>, ApiError>;
}
