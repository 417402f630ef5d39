use thiserror::Error;

use crate::cache::FetchError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unauthorized - wallet token may be expired")]
    Unauthorized,

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data. The cut
    /// backs up to a char boundary so multibyte bodies slice cleanly.
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut cut = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(cut) {
                cut -= 1;
            }
            format!(
                "{}... (truncated, {} total bytes)",
                &body[..cut],
                body.len()
            )
        }
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        match status.as_u16() {
            401 => ApiError::Unauthorized,
            403 => ApiError::AccessDenied(truncated),
            404 => ApiError::NotFound(truncated),
            429 => ApiError::RateLimited,
            500..=599 => ApiError::ServerError(truncated),
            _ => ApiError::InvalidResponse(format!("Status {}: {}", status, truncated)),
        }
    }
}

/// How collaborator failures enter the cache layer: a miss on an entity is
/// `NotFound`, everything else is transient and recoverable.
impl From<ApiError> for FetchError {
    fn from(e: ApiError) -> Self {
        match e {
            ApiError::NotFound(what) => FetchError::NotFound(what),
            other => FetchError::Transient(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status() {
        assert!(matches!(
            ApiError::from_status(reqwest::StatusCode::UNAUTHORIZED, ""),
            ApiError::Unauthorized
        ));
        assert!(matches!(
            ApiError::from_status(reqwest::StatusCode::NOT_FOUND, "no such hotspot"),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            ApiError::from_status(reqwest::StatusCode::TOO_MANY_REQUESTS, ""),
            ApiError::RateLimited
        ));
        assert!(matches!(
            ApiError::from_status(reqwest::StatusCode::BAD_GATEWAY, "upstream"),
            ApiError::ServerError(_)
        ));
    }

    #[test]
    fn test_fetch_error_conversion() {
        let not_found: FetchError = ApiError::NotFound("hotspot abc".to_string()).into();
        assert!(matches!(not_found, FetchError::NotFound(_)));

        let transient: FetchError = ApiError::RateLimited.into();
        assert!(matches!(transient, FetchError::Transient(_)));
    }

    #[test]
    fn test_truncate_body() {
        let long = "x".repeat(600);
        let err = ApiError::from_status(reqwest::StatusCode::INTERNAL_SERVER_ERROR, &long);
        let msg = err.to_string();
        assert!(msg.contains("truncated"));
        assert!(msg.len() < 600);
    }

    #[test]
    fn test_truncate_body_backs_up_to_char_boundary() {
        // A two-byte character straddling the truncation offset
        let mut body = "x".repeat(MAX_ERROR_BODY_LENGTH - 1);
        body.push('é');
        body.push_str(&"y".repeat(50));

        let err = ApiError::from_status(reqwest::StatusCode::INTERNAL_SERVER_ERROR, &body);
        let msg = err.to_string();
        assert!(msg.contains("truncated"));
        assert!(!msg.contains('é'));
    }
}
