use reqwest::{header::InvalidHeaderValue, Response, StatusCode};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// The server answered with a non-success status. The message is the
    /// response body, even when empty, or the status reason when the body
    /// could not be read.
    #[error("{message}")]
    Status { status: StatusCode, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A success response whose body is not the expected JSON.
    #[error(transparent)]
    Parse(#[from] serde_json::Error),

    #[error("Failed to encode request body: {0}")]
    Encode(serde_json::Error),

    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] InvalidHeaderValue),
}

impl ApiError {
    /// Build the error for a failed status. `body` is `None` when the body
    /// could not be read.
    pub fn from_status(status: StatusCode, body: Option<&str>) -> Self {
        let message = body
            .map(str::to_string)
            .or_else(|| status.canonical_reason().map(str::to_string))
            .unwrap_or_else(|| status.as_str().to_string());
        ApiError::Status { status, message }
    }

    /// Consume a failed response into an error carrying its body text.
    pub async fn from_response(response: Response) -> Self {
        let status = response.status();
        let body = response.text().await.ok();
        Self::from_status(status, body.as_deref())
    }

    /// HTTP status for failures the server reported
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Network(e) => e.status(),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_is_body_text() {
        let err = ApiError::from_status(StatusCode::BAD_REQUEST, Some("bad name"));
        assert_eq!(err.to_string(), "bad name");
        assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
        assert!(!err.is_unauthorized());
    }

    #[test]
    fn test_message_falls_back_to_reason_only_when_unreadable() {
        let unreadable = ApiError::from_status(StatusCode::NOT_FOUND, None);
        assert_eq!(unreadable.to_string(), "Not Found");

        let empty = ApiError::from_status(StatusCode::UNAUTHORIZED, Some(""));
        assert_eq!(empty.to_string(), "");
        assert!(empty.is_unauthorized());

        let unknown = ApiError::from_status(StatusCode::from_u16(599).unwrap(), None);
        assert_eq!(unknown.to_string(), "599");
    }
}
