//! HTTP transport
//!
//! Sends authenticated JSON requests to the API, unwraps the response
//! envelope and classifies failures. Every request runs inside its own
//! tracing span carrying a fresh request id.

use reqwest::Method;
use reqwest::header::HeaderMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Instant;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use crate::error::{Result, SunoError, body_sample, classify_http_failure};
use crate::retry::RetryExecutor;
use crate::types::ApiEnvelope;

/// Mask a credential for logging, keeping a short prefix and suffix
pub fn mask_sensitive_value(value: &str) -> String {
    fn ends(value: &str, head: usize, tail: usize) -> String {
        let chars: Vec<char> = value.chars().collect();
        let start: String = chars[..head].iter().collect();
        let end: String = chars[chars.len() - tail..].iter().collect();
        format!("{start}...{end}")
    }

    if let Some(token) = value.strip_prefix("Bearer ") {
        return if token.chars().count() > 8 {
            format!("Bearer {}", ends(token, 4, 4))
        } else {
            "Bearer ***".to_string()
        };
    }
    match value.chars().count() {
        n if n > 16 => ends(value, 6, 4),
        n if n > 8 => ends(value, 2, 2),
        _ => "***".to_string(),
    }
}

/// Render headers as JSON with credentials masked
pub fn format_headers_for_logging(headers: &HeaderMap) -> String {
    let map: std::collections::BTreeMap<&str, String> = headers
        .iter()
        .map(|(k, v)| {
            let value = v.to_str().unwrap_or("<invalid>");
            let name = k.as_str().to_ascii_lowercase();
            let masked = if name.contains("authorization")
                || name.contains("key")
                || name.contains("token")
            {
                mask_sensitive_value(value)
            } else {
                value.to_string()
            };
            (k.as_str(), masked)
        })
        .collect();
    serde_json::to_string(&map).unwrap_or_else(|_| format!("{map:?}"))
}

/// A request ready to be sent, possibly several times
#[derive(Debug, Clone)]
struct PreparedRequest {
    method: Method,
    path: String,
    query: Vec<(&'static str, String)>,
    body: Option<serde_json::Value>,
}

/// Outcome of one failed send
#[derive(Debug)]
struct Attempt {
    error: SunoError,
    /// The connection was never established, so nothing reached the service
    unsent: bool,
}

impl Attempt {
    /// Whether a submission may go out again without risking a second task
    fn safe_to_resend(&self) -> bool {
        (self.unsent && self.error.is_retryable())
            || matches!(self.error, SunoError::RateLimit { .. })
    }
}

impl From<SunoError> for Attempt {
    fn from(error: SunoError) -> Self {
        Self {
            error,
            unsent: false,
        }
    }
}

impl From<reqwest::Error> for Attempt {
    fn from(err: reqwest::Error) -> Self {
        Self {
            unsent: err.is_connect(),
            error: err.into(),
        }
    }
}

impl From<Attempt> for SunoError {
    fn from(attempt: Attempt) -> Self {
        attempt.error
    }
}

/// Authenticated JSON transport bound to one base URL
#[derive(Debug, Clone)]
pub struct Transport {
    http: reqwest::Client,
    base_url: String,
    headers: HeaderMap,
    retry: Option<RetryExecutor>,
}

impl Transport {
    pub(crate) fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        headers: HeaderMap,
        retry: Option<RetryExecutor>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            headers,
            retry,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Underlying HTTP client, shared with the download helper
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// `GET {base}{path}?{query}` and return the envelope payload
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&'static str, String)],
    ) -> Result<Option<T>> {
        let request = PreparedRequest {
            method: Method::GET,
            path: path.to_string(),
            query: query.to_vec(),
            body: None,
        };
        self.execute(request).await
    }

    /// `POST {base}{path}` with a JSON body and return the envelope payload
    pub async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Option<T>> {
        let request = PreparedRequest {
            method: Method::POST,
            path: path.to_string(),
            query: Vec::new(),
            body: Some(serde_json::to_value(body)?),
        };
        self.execute(request).await
    }

    async fn execute<T: DeserializeOwned>(&self, request: PreparedRequest) -> Result<Option<T>> {
        // GETs are idempotent; a POST creates a task, so it is only resent
        // when the service cannot have seen it
        let data = match &self.retry {
            None => self.send_once(&request).await?,
            Some(executor) if request.method == Method::GET => {
                executor
                    .execute_if(|| self.send_once(&request), |a: &Attempt| a.error.is_retryable())
                    .await?
            }
            Some(executor) => {
                executor
                    .execute_if(|| self.send_once(&request), Attempt::safe_to_resend)
                    .await?
            }
        };
        data.map(serde_json::from_value::<T>)
            .transpose()
            .map_err(|e| SunoError::Parse(format!("unexpected response data: {e}")))
    }

    async fn send_once(
        &self,
        request: &PreparedRequest,
    ) -> std::result::Result<Option<serde_json::Value>, Attempt> {
        let request_id = Uuid::new_v4();
        let span = info_span!(
            "suno_request",
            request_id = %request_id,
            method = %request.method,
            path = %request.path,
        );
        async {
            let url = format!("{}{}", self.base_url, request.path);
            let start = Instant::now();
            info!(url = %url, "Request started");
            debug!(
                request_headers = %format_headers_for_logging(&self.headers),
                request_body = %request.body.as_ref().map(|b| b.to_string()).unwrap_or_default(),
                "Request details"
            );

            let mut builder = self
                .http
                .request(request.method.clone(), &url)
                .headers(self.headers.clone());
            if !request.query.is_empty() {
                builder = builder.query(&request.query);
            }
            if let Some(body) = &request.body {
                builder = builder.json(body);
            }

            let response = builder.send().await.map_err(|e| {
                let attempt = Attempt::from(e);
                warn!(
                    duration_ms = start.elapsed().as_millis() as u64,
                    unsent = attempt.unsent,
                    error = %attempt.error,
                    "Request failed"
                );
                attempt
            })?;
            let status = response.status().as_u16();
            let headers = response.headers().clone();
            let text = response.text().await?;
            let duration_ms = start.elapsed().as_millis() as u64;
            debug!(status_code = status, response_body = %body_sample(&text), "Response body");

            if !response_ok(status) {
                let error = classify_http_failure(status, &text, &headers);
                warn!(status_code = status, duration_ms, error = %error, "Request failed");
                return Err(Attempt::from(error));
            }

            let envelope: ApiEnvelope<serde_json::Value> =
                serde_json::from_str(&text).map_err(|e| {
                    SunoError::Parse(format!(
                        "invalid JSON response ({e}): {}",
                        body_sample(&text)
                    ))
                })?;
            match envelope.into_data(status) {
                Ok(data) => {
                    info!(status_code = status, duration_ms, "Request completed");
                    Ok(data)
                }
                Err(error) => {
                    warn!(status_code = status, duration_ms, error = %error, "Request rejected");
                    Err(Attempt::from(error))
                }
            }
        }
        .instrument(span)
        .await
    }
}

fn response_ok(status: u16) -> bool {
    (200..300).contains(&status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::api_headers;
    use secrecy::SecretString;
    use tracing_test::traced_test;

    fn transport(base_url: &str, key: &str) -> Transport {
        Transport::new(
            reqwest::Client::new(),
            base_url,
            api_headers(&SecretString::from(key)).unwrap(),
            None,
        )
    }

    #[test]
    fn masks_bearer_tokens_and_long_values() {
        assert_eq!(
            mask_sensitive_value("Bearer sk-1234567890abcdef"),
            "Bearer sk-1...cdef"
        );
        assert_eq!(mask_sensitive_value("Bearer short"), "Bearer ***");
        assert_eq!(mask_sensitive_value("abcdefghijklmnopqrstu"), "abcdef...rstu");
        assert_eq!(mask_sensitive_value("tiny"), "***");
    }

    #[test]
    fn header_formatting_masks_authorization() {
        let headers = api_headers(&SecretString::from("sk-1234567890abcdef")).unwrap();
        let rendered = format_headers_for_logging(&headers);
        assert!(rendered.contains("Bearer sk-1...cdef"));
        assert!(!rendered.contains("1234567890ab"));
        assert!(rendered.contains("application/json"));
    }

    #[tokio::test]
    async fn get_unwraps_envelope_data() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/generate/credit")
            .match_header("authorization", "Bearer sk-test-key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"code":200,"msg":"success","data":42}"#)
            .create_async()
            .await;

        let t = transport(&server.url(), "sk-test-key");
        let credits: Option<f64> = t.get("/generate/credit", &[]).await.unwrap();
        assert_eq!(credits, Some(42.0));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn envelope_error_on_http_200_is_classified() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/generate")
            .with_status(200)
            .with_body(r#"{"code":429,"msg":"credits exhausted","data":null}"#)
            .create_async()
            .await;

        let t = transport(&server.url(), "k");
        let result: Result<Option<serde_json::Value>> =
            t.post("/generate", &serde_json::json!({"prompt": "x"})).await;
        assert!(matches!(result, Err(SunoError::InsufficientCredits(m)) if m == "credits exhausted"));
    }

    #[tokio::test]
    async fn non_json_success_is_parse_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/generate/credit")
            .with_status(200)
            .with_body("<html>ok</html>")
            .create_async()
            .await;

        let t = transport(&server.url(), "k");
        let result: Result<Option<f64>> = t.get("/generate/credit", &[]).await;
        assert!(matches!(result, Err(SunoError::Parse(_))));
    }

    #[tokio::test]
    async fn query_parameters_are_sent() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/generate/record-info")
            .match_query(mockito::Matcher::UrlEncoded("taskId".into(), "abc".into()))
            .with_status(200)
            .with_body(r#"{"code":200,"data":{"status":"PENDING"}}"#)
            .create_async()
            .await;

        let t = transport(&server.url(), "k");
        let data: Option<serde_json::Value> = t
            .get("/generate/record-info", &[("taskId", "abc".to_string())])
            .await
            .unwrap();
        assert_eq!(data.unwrap()["status"], "PENDING");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn only_unsent_or_throttled_submissions_may_be_resent() {
        // port 9 (discard) is closed on test machines
        let refused = reqwest::Client::new()
            .post("http://127.0.0.1:9/generate")
            .send()
            .await
            .unwrap_err();
        let attempt = Attempt::from(refused);
        assert!(attempt.unsent);
        assert!(attempt.safe_to_resend());

        let throttled = Attempt::from(SunoError::rate_limited("slow down"));
        assert!(throttled.safe_to_resend());

        let server_error = Attempt::from(SunoError::remote(502, "bad gateway"));
        assert!(server_error.error.is_retryable());
        assert!(!server_error.safe_to_resend());

        let timed_out = Attempt::from(SunoError::Transport("request timed out".into()));
        assert!(!timed_out.safe_to_resend());
    }

    #[traced_test]
    #[tokio::test]
    async fn request_logs_never_contain_the_raw_key() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/generate/credit")
            .with_status(200)
            .with_body(r#"{"code":200,"data":1}"#)
            .create_async()
            .await;

        let t = transport(&server.url(), "sk-abcdefghijklmnop");
        let _: Option<f64> = t.get("/generate/credit", &[]).await.unwrap();

        assert!(logs_contain("Request started"));
        assert!(logs_contain("Request completed"));
        assert!(logs_contain("Bearer sk-a...mnop"));
        assert!(!logs_contain("sk-abcdefghijklmnop"));
    }
}
