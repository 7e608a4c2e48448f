//! Type Conversions for SunoError
//!
//! This module contains From trait implementations for converting
//! common error types into SunoError.

use super::types::SunoError;

impl From<reqwest::Error> for SunoError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Parse(err.to_string())
        } else if err.is_timeout() {
            Self::Transport(format!("request timed out: {err}"))
        } else if err.is_connect() {
            Self::Transport(format!("connection failed: {err}"))
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for SunoError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

impl From<std::io::Error> for SunoError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: SunoError = json_err.into();
        assert!(matches!(err, SunoError::Parse(_)));
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport() {
        // Port 9 (discard) is closed on test machines
        let err = reqwest::Client::new()
            .get("http://127.0.0.1:9/")
            .send()
            .await
            .unwrap_err();
        let err: SunoError = err.into();
        assert!(matches!(err, SunoError::Transport(_)));
    }

    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert!(matches!(SunoError::from(io), SunoError::Io(_)));
    }
}
