use thiserror::Error;

/// Failures of a single API call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// 401/403: bad credentials, or the board rejected the request origin.
    #[error("Authentication failed (HTTP {status})")]
    Auth { status: u16 },

    /// Any other non-2xx response.
    #[error("HTTP {status} {text}")]
    Status { status: u16, text: String },

    /// No response was received.
    #[error("Network error: {0}")]
    Network(String),

    /// A response arrived but could not be understood.
    #[error("Unexpected response: {0}")]
    Decode(String),

    /// Rejected locally before any request was made.
    #[error("{0}")]
    Validation(String),
}

impl ApiError {
    /// Build from a non-success status code.
    pub fn from_status(status: u16, text: impl Into<String>) -> Self {
        match status {
            401 | 403 => ApiError::Auth { status },
            _ => ApiError::Status {
                status,
                text: text.into(),
            },
        }
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Auth { status } | ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Transient failures worth another attempt: no response, or 5xx.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Network(_) => true,
            other => other.status().is_some_and(|s| s >= 500),
        }
    }

    /// Message shown to the user when the post listing fails.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Auth { .. } => "Authentication failed. Check your username and API key, \
                 or enable the proxy in settings."
                .to_string(),
            ApiError::Status { status, text } => {
                format!("Server error: {} {}", status, text).trim_end().to_string()
            }
            ApiError::Network(_) => "Network error: could not reach the server. \
                 Check your connection or proxy settings."
                .to_string(),
            ApiError::Validation(message) => message.clone(),
            ApiError::Decode(_) => "Something went wrong while loading posts.".to_string(),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Decode(e.to_string())
    }
}
