//! Default Configuration Values
//!
//! This module centralizes the default values used throughout the crate.
//! Having defaults in one place makes them easier to maintain, document, and adjust.

use std::time::Duration;

/// Remote service defaults
pub mod api {
    /// Full base URL used when no override is configured
    pub const BASE_URL: &str = "https://api.sunoapi.org/api/v1";
}

/// HTTP client default configurations
pub mod http {
    use super::*;

    /// Default request timeout for a single HTTP request
    ///
    /// Submissions return a task id right away; generation itself happens
    /// remotely and is observed through polling, so this stays modest.
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

    /// Default connection timeout for establishing HTTP connections
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Upper bound for a whole file download, body included
    pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(600);

    /// Default User-Agent string for HTTP requests
    pub const USER_AGENT: &str = concat!("suno-rs/", env!("CARGO_PKG_VERSION"));
}

/// Polling defaults for asynchronous tasks
pub mod polling {
    use super::*;

    /// Maximum time to wait for a task to reach a terminal state (10 minutes)
    pub const MAX_WAIT: Duration = Duration::from_secs(600);

    /// Interval between status checks used by library callers
    pub const INTERVAL: Duration = Duration::from_secs(30);

    /// Interval between status checks used by the interactive front ends
    pub const INTERACTIVE_INTERVAL: Duration = Duration::from_secs(10);
}

/// Local file system defaults
pub mod files {
    /// Key file looked up in the working directory
    pub const KEY_FILE: &str = "key.txt";

    /// Directory that receives downloaded artifacts
    pub const DOWNLOADS_DIR: &str = "downloads";

    /// File name used when a URL has no usable last segment
    pub const FALLBACK_DOWNLOAD_NAME: &str = "download.mp3";
}

/// Environment variables consulted by [`crate::config::Settings`]
pub mod env {
    /// API key given directly, takes precedence over any key file
    pub const API_KEY: &str = "SUNO_API_KEY";

    /// Path of the key file
    pub const KEY_FILE: &str = "SUNO_KEY_FILE";

    /// Base URL override (useful for proxies and mock servers)
    pub const BASE_URL: &str = "SUNO_BASE_URL";

    /// Downloads directory override
    pub const DOWNLOADS_DIR: &str = "SUNO_DOWNLOADS_DIR";
}

/// Remote payload limits
pub mod limits {
    /// Maximum characters accepted for the video author and domain fields
    pub const VIDEO_TEXT_MAX_CHARS: usize = 50;

    /// Maximum characters kept from an error body when building messages
    pub const ERROR_BODY_SAMPLE: usize = 200;
}
