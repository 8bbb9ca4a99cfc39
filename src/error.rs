#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Connection refused: {0}")]
    Connect(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Backend returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("WebSocket error: {0}")]
    WebSocket(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ApiError {
    /// True when the backend answered with an HTTP status.
    pub fn has_response(&self) -> bool {
        matches!(self, ApiError::Status { .. })
    }

    pub fn is_connection_refused(&self) -> bool {
        matches!(self, ApiError::Connect(_))
    }

    /// Failures where the request never produced a response: the backend is
    /// down, unreachable or too slow.
    pub fn is_offline(&self) -> bool {
        matches!(
            self,
            ApiError::Connect(_) | ApiError::Timeout(_) | ApiError::Transport(_)
        )
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() {
            ApiError::Connect(e.to_string())
        } else if e.is_timeout() {
            ApiError::Timeout(e.to_string())
        } else if e.is_decode() {
            ApiError::Decode(e.to_string())
        } else if let Some(status) = e.status() {
            ApiError::Status {
                status: status.as_u16(),
                body: e.to_string(),
            }
        } else {
            ApiError::Transport(e.to_string())
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("use_app_store() must be called inside AppStore::provide()")]
    OutsideProvider,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_has_response() {
        let err = ApiError::Status {
            status: 422,
            body: "unprocessable".to_string(),
        };
        assert!(err.has_response());
        assert!(!err.is_offline());
        assert_eq!(err.status(), Some(422));
    }

    #[test]
    fn test_connect_error_is_offline() {
        let err = ApiError::Connect("refused".to_string());
        assert!(err.is_connection_refused());
        assert!(err.is_offline());
        assert!(!err.has_response());
    }

    #[test]
    fn test_timeout_is_offline_but_not_refused() {
        let err = ApiError::Timeout("1s".to_string());
        assert!(err.is_offline());
        assert!(!err.is_connection_refused());
    }

    #[test]
    fn test_decode_error_is_not_offline() {
        let err = ApiError::Decode("bad json".to_string());
        assert!(!err.is_offline());
        assert!(!err.has_response());
    }

    #[test]
    fn test_store_error_names_misuse() {
        let msg = StoreError::OutsideProvider.to_string();
        assert!(msg.contains("AppStore::provide"));
    }
}
