use std::collections::HashMap;

use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unauthorized - token may be expired")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("{message}")]
    Validation {
        status: u16,
        message: String,
        errors: HashMap<String, Vec<String>>,
    },

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Error body shape the auth backend returns on failed requests.
#[derive(Debug, Deserialize, Default)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    errors: HashMap<String, Vec<String>>,
}

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            format!(
                "{}... (truncated, {} total bytes)",
                &body[..MAX_ERROR_BODY_LENGTH],
                body.len()
            )
        }
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        match status.as_u16() {
            401 => ApiError::Unauthorized,
            404 => ApiError::NotFound(truncated),
            // Client errors carry field-level validation messages in a
            // {message, errors} body when the backend produced them.
            code @ 400..=499 => {
                let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
                ApiError::Validation {
                    status: code,
                    message: parsed.message.unwrap_or_else(|| format!("Request failed: {}", code)),
                    errors: parsed.errors,
                }
            }
            500..=599 => ApiError::ServerError(truncated),
            _ => ApiError::InvalidResponse(format!("Status {}: {}", status, truncated)),
        }
    }

    /// Whether this error carries an HTTP status (an API error response) as
    /// opposed to a transport failure.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized => Some(401),
            ApiError::NotFound(_) => Some(404),
            ApiError::Validation { status, .. } => Some(*status),
            ApiError::ServerError(_) => Some(500),
            ApiError::Network(_) | ApiError::InvalidResponse(_) => None,
        }
    }
}
