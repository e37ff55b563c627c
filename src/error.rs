use thiserror::Error;

/// Error type shared by every planner component
#[derive(Error, Debug)]
pub enum PlannerError {
    #[error("Missing credential: {0}")]
    MissingCredential(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Upstream call failed{}: {message}", status_suffix(.status))]
    Upstream {
        status: Option<u16>,
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

fn status_suffix(status: &Option<u16>) -> String {
    status
        .map(|code| format!(" (HTTP {code})"))
        .unwrap_or_default()
}

/// Result type alias
pub type Result<T> = std::result::Result<T, PlannerError>;

impl PlannerError {
    /// Transport-level failure with the underlying `reqwest` error attached
    pub fn transport(context: &str, err: reqwest::Error) -> Self {
        PlannerError::Upstream {
            status: err.status().map(|status| status.as_u16()),
            message: format!("{context}: {err}"),
            source: Some(err),
        }
    }

    /// Non-success HTTP status returned by an endpoint
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        PlannerError::Upstream {
            status: Some(status),
            message: message.into(),
            source: None,
        }
    }

    /// Whether a caller-owned retry has a chance of succeeding.
    ///
    /// Nothing in this crate retries on its own.
    pub fn is_retryable(&self) -> bool {
        match self {
            PlannerError::Upstream {
                status: Some(code), ..
            } => *code == 429 || *code >= 500,
            PlannerError::Upstream { source, .. } => source.is_some(),
            _ => false,
        }
    }

    /// Get the error code for structured responses
    pub fn error_code(&self) -> &'static str {
        match self {
            PlannerError::MissingCredential(_) => "MISSING_CREDENTIAL",
            PlannerError::Config(_) => "CONFIG_ERROR",
            PlannerError::Upstream { .. } => "UPSTREAM_ERROR",
            PlannerError::MalformedResponse(_) => "MALFORMED_RESPONSE",
            PlannerError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Convert to a structured error payload
    pub fn to_error_payload(&self) -> serde_json::Value {
        serde_json::json!({
            "error": {
                "code": self.error_code(),
                "message": self.to_string(),
                "retryable": self.is_retryable()
            }
        })
    }
}
