//! Suno Builder Implementation
//!
//! Builder pattern implementation for creating [`SunoClient`]s.

use secrecy::SecretString;
use std::time::Duration;

use super::SunoClient;
use crate::config::SunoConfig;
use crate::defaults;
use crate::error::{Result, SunoError};
use crate::http::{HttpConfig, api_headers};
use crate::poll::PollOptions;
use crate::retry::{RetryExecutor, RetryPolicy};
use crate::transport::Transport;

/// Suno client builder
///
/// Retry is off unless [`with_retry`](Self::with_retry) is called.
#[derive(Debug, Default)]
pub struct SunoClientBuilder {
    api_key: Option<SecretString>,
    base_url: Option<String>,
    http: HttpConfig,
    http_client: Option<reqwest::Client>,
    retry: Option<RetryPolicy>,
    poll: PollOptions,
}

impl SunoClientBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration
    pub fn from_config(config: SunoConfig) -> Self {
        Self {
            api_key: Some(config.api_key),
            base_url: Some(config.base_url),
            http: config.http,
            ..Self::default()
        }
    }

    /// Set the API key
    pub fn api_key<S: Into<String>>(mut self, api_key: S) -> Self {
        self.api_key = Some(SecretString::from(api_key.into()));
        self
    }

    /// Set the base URL
    pub fn base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.http.timeout = timeout;
        self
    }

    /// Set connection timeout
    pub fn connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.http.connect_timeout = connect_timeout;
        self
    }

    pub fn proxy<S: Into<String>>(mut self, proxy: S) -> Self {
        self.http.proxy = Some(proxy.into());
        self
    }

    pub fn user_agent<S: Into<String>>(mut self, user_agent: S) -> Self {
        self.http.user_agent = user_agent.into();
        self
    }

    /// Add a header sent with every request
    pub fn header<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.http.headers.insert(key.into(), value.into());
        self
    }

    /// Use a preconfigured `reqwest::Client`; HTTP settings above are ignored
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    // === Retry Configuration ===

    /// Retry transient failures (network, throttling, 5xx) with this policy
    pub fn with_retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = Some(policy);
        self
    }

    // === Polling ===

    pub fn poll_options(mut self, options: PollOptions) -> Self {
        self.poll = options;
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll.interval = interval;
        self
    }

    pub fn max_wait(mut self, max_wait: Duration) -> Self {
        self.poll.max_wait = max_wait;
        self
    }

    /// Build the client
    ///
    /// Falls back to `SUNO_API_KEY` when no key was given.
    pub fn build(self) -> Result<SunoClient> {
        let api_key = match self.api_key {
            Some(key) => key,
            None => std::env::var(defaults::env::API_KEY)
                .map(SecretString::from)
                .map_err(|_| {
                    SunoError::Configuration(format!(
                        "Suno API key not provided. Set {} or use .api_key()",
                        defaults::env::API_KEY
                    ))
                })?,
        };

        let config = SunoConfig {
            api_key,
            base_url: String::new(),
            http: self.http,
        }
        .with_base_url(
            self.base_url
                .as_deref()
                .map(str::trim)
                .unwrap_or(defaults::api::BASE_URL),
        );
        config.validate()?;

        let http_client = match self.http_client {
            Some(client) => client,
            None => config.http.build_client()?,
        };
        let headers = api_headers(&config.api_key)?;
        tracing::debug!(
            base_url = %config.base_url,
            retry = self.retry.is_some(),
            "Building Suno client"
        );

        let transport = Transport::new(
            http_client,
            config.base_url,
            headers,
            self.retry.map(RetryExecutor::new),
        );
        Ok(SunoClient::from_parts(transport, self.poll))
    }
}
