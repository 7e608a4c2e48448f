//! Classification of remote failures into typed errors.
//!
//! Every Suno response carries a `code` inside its JSON envelope which may
//! disagree with the HTTP status (the service answers `200 OK` with
//! `"code": 401` for a bad key). The envelope code wins; the HTTP status is
//! used only when the body has none.

use super::types::SunoError;
use crate::defaults::limits::ERROR_BODY_SAMPLE;
use reqwest::header::HeaderMap;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct EnvelopeHead {
    code: Option<i64>,
    msg: Option<String>,
}

/// Map an envelope code and message to a typed error.
///
/// `200` is not an error; callers must check for success before calling this.
pub fn classify_code(code: i64, message: impl Into<String>) -> SunoError {
    let message = message.into();
    match code {
        400 => SunoError::InvalidParameters(message),
        401 | 403 => SunoError::Authentication(message),
        405 | 430 => SunoError::rate_limited(message),
        429 => SunoError::InsufficientCredits(message),
        _ => SunoError::remote(code, message),
    }
}

/// Classify a failed HTTP exchange from its status, body and headers.
pub fn classify_http_failure(status: u16, body_text: &str, headers: &HeaderMap) -> SunoError {
    if let Ok(head) = serde_json::from_str::<EnvelopeHead>(body_text)
        && let Some(code) = head.code
        && code != 200
    {
        let message = head.msg.unwrap_or_else(|| "Unknown error".to_string());
        return with_retry_after(classify_code(code, message), headers);
    }

    let body_sample = body_sample(body_text);
    let message = if body_sample.trim().is_empty() {
        format!("http={status}")
    } else {
        format!("http={status} body_sample={body_sample}")
    };

    let error = match status {
        // Gateways throttle with a bare 429 and no envelope
        429 => SunoError::rate_limited(message),
        _ => match classify_code(i64::from(status), message) {
            SunoError::RemoteService { code, message, .. } => SunoError::remote_with_details(
                code,
                message,
                serde_json::json!({ "status": status, "raw": body_text }),
            ),
            other => other,
        },
    };
    with_retry_after(error, headers)
}

/// Limit body sample size to avoid noisy messages
pub(crate) fn body_sample(body_text: &str) -> String {
    body_text.chars().take(ERROR_BODY_SAMPLE).collect()
}

fn with_retry_after(error: SunoError, headers: &HeaderMap) -> SunoError {
    match error {
        SunoError::RateLimit { message, .. } => SunoError::RateLimit {
            message,
            retry_after: parse_retry_after(headers),
        },
        other => other,
    }
}

fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use reqwest::header::HeaderValue;

    #[test]
    fn envelope_codes_map_to_typed_errors() {
        assert!(matches!(classify_code(400, "x"), SunoError::InvalidParameters(_)));
        assert!(matches!(classify_code(401, "x"), SunoError::Authentication(_)));
        assert!(matches!(classify_code(405, "x"), SunoError::RateLimit { .. }));
        assert!(matches!(classify_code(430, "x"), SunoError::RateLimit { .. }));
        assert!(matches!(classify_code(429, "x"), SunoError::InsufficientCredits(_)));
        assert!(matches!(
            classify_code(455, "maintenance"),
            SunoError::RemoteService { code: 455, .. }
        ));
    }

    #[test]
    fn envelope_code_wins_over_http_status() {
        let headers = HeaderMap::new();
        let err = classify_http_failure(
            500,
            r#"{"code":401,"msg":"You do not have access permissions"}"#,
            &headers,
        );
        match err {
            SunoError::Authentication(msg) => {
                assert_eq!(msg, "You do not have access permissions")
            }
            other => panic!("unexpected error variant: {other:?}"),
        }
    }

    #[test]
    fn non_json_body_falls_back_to_status() {
        let headers = HeaderMap::new();
        let err = classify_http_failure(502, "<html>bad gateway</html>", &headers);
        match err {
            SunoError::RemoteService { code, message, details } => {
                assert_eq!(code, 502);
                assert!(message.contains("bad gateway"));
                assert!(details.is_some());
            }
            other => panic!("unexpected error variant: {other:?}"),
        }
        assert_eq!(
            classify_http_failure(401, "", &headers).kind(),
            ErrorKind::Auth
        );
    }

    #[test]
    fn bare_429_is_throttling_with_retry_hint() {
        let mut headers = HeaderMap::new();
        headers.insert("retry-after", HeaderValue::from_static("7"));
        match classify_http_failure(429, "Too Many Requests", &headers) {
            SunoError::RateLimit { retry_after, .. } => {
                assert_eq!(retry_after, Some(Duration::from_secs(7)))
            }
            other => panic!("unexpected error variant: {other:?}"),
        }
    }

    #[test]
    fn body_sample_is_capped() {
        let long = "x".repeat(1000);
        assert_eq!(body_sample(&long).len(), ERROR_BODY_SAMPLE);
    }
}
