//! Client for the board's JSON API.
//!
//! ```text
//! ApiClient → build_url (auth, cache busting, proxy) → with_retry → Transport
//!           → Envelope decode → typed models
//! ```

pub mod client;
pub mod envelope;
pub mod error;
pub mod http;
pub mod retry;
pub mod transport;
pub mod url;

#[cfg(test)]
pub(crate) mod testing;

pub use client::ApiClient;
pub use envelope::{decode_list, Envelope};
pub use error::ApiError;
pub use http::HttpTransport;
pub use retry::{with_retry, RetryPolicy};
pub use transport::Transport;
pub use self::url::{build_url, build_url_at};
