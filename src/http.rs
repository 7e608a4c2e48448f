//! HTTP client settings
//!
//! [`HttpConfig`] describes the `reqwest::Client` behind a [`SunoClient`](crate::SunoClient).
//! Authentication headers are added separately so the key never sits in a
//! plain `String` map.

use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::defaults;
use crate::error::{Result, SunoError};

/// Timeouts, proxy and extra headers for API calls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Whole-request timeout for API calls (downloads use their own limit)
    #[serde(with = "seconds")]
    pub timeout: Duration,
    #[serde(with = "seconds")]
    pub connect_timeout: Duration,
    /// `http://`, `https://` or `socks5://` proxy applied to every request
    pub proxy: Option<String>,
    pub user_agent: String,
    /// Extra headers; names are validated when the client is built
    pub headers: BTreeMap<String, String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: defaults::http::REQUEST_TIMEOUT,
            connect_timeout: defaults::http::CONNECT_TIMEOUT,
            proxy: None,
            user_agent: defaults::http::USER_AGENT.to_string(),
            headers: BTreeMap::new(),
        }
    }
}

impl HttpConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Build a `reqwest::Client` from these settings
    pub fn build_client(&self) -> Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .connect_timeout(self.connect_timeout)
            .user_agent(self.user_agent.as_str());

        if let Some(url) = &self.proxy {
            let proxy = reqwest::Proxy::all(url)
                .map_err(|e| SunoError::Configuration(format!("Invalid proxy URL '{url}': {e}")))?;
            builder = builder.proxy(proxy);
        }
        if !self.headers.is_empty() {
            builder = builder.default_headers(self.extra_headers()?);
        }

        builder
            .build()
            .map_err(|e| SunoError::Configuration(format!("Cannot build HTTP client: {e}")))
    }

    fn extra_headers(&self) -> Result<HeaderMap> {
        let mut map = HeaderMap::with_capacity(self.headers.len());
        for (name, value) in &self.headers {
            let header = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| SunoError::Configuration(format!("Invalid header name '{name}'")))?;
            let value = HeaderValue::from_str(value).map_err(|_| {
                SunoError::Configuration(format!("Invalid value for header '{name}'"))
            })?;
            map.insert(header, value);
        }
        Ok(map)
    }
}

/// Durations as whole seconds in serialized configs
mod seconds {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

/// Bearer authorization header, flagged sensitive so `reqwest` never prints it
pub(crate) fn auth_header(api_key: &SecretString) -> Result<HeaderValue> {
    let mut value = HeaderValue::from_str(&format!("Bearer {}", api_key.expose_secret()))
        .map_err(|_| {
            SunoError::Configuration("API key contains characters not allowed in a header".into())
        })?;
    value.set_sensitive(true);
    Ok(value)
}

/// Headers sent with every API call
pub(crate) fn api_headers(api_key: &SecretString) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, auth_header(api_key)?);
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setters_keep_other_defaults() {
        let cfg = HttpConfig::default()
            .with_timeout(Duration::from_secs(5))
            .with_header("X-Trace", "1");
        assert_eq!(cfg.timeout, Duration::from_secs(5));
        assert_eq!(cfg.connect_timeout, defaults::http::CONNECT_TIMEOUT);
        assert!(cfg.user_agent.starts_with("suno-rs/"));
        assert_eq!(cfg.headers.get("X-Trace").map(String::as_str), Some("1"));
        assert!(cfg.build_client().is_ok());
    }

    #[test]
    fn bad_proxy_or_header_is_a_configuration_error() {
        let proxy = HttpConfig::default().with_proxy("::not a url::");
        assert!(matches!(proxy.build_client(), Err(SunoError::Configuration(_))));

        let header = HttpConfig::default().with_header("bad header", "v");
        assert!(matches!(header.build_client(), Err(SunoError::Configuration(_))));
    }

    #[test]
    fn auth_header_is_bearer_and_sensitive() {
        let value = auth_header(&SecretString::from("sk-test")).unwrap();
        assert!(value.is_sensitive());
        assert_eq!(value.to_str().unwrap(), "Bearer sk-test");
        assert!(auth_header(&SecretString::from("bad\nkey")).is_err());
    }

    #[test]
    fn durations_serialize_as_seconds() {
        let json = serde_json::to_value(HttpConfig::default()).unwrap();
        assert_eq!(json["timeout"], 60);
        assert_eq!(json["connect_timeout"], 10);
        let back: HttpConfig = serde_json::from_value(json).unwrap();
        assert_eq!(back, HttpConfig::default());
    }
}
