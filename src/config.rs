//! Configuration
//!
//! [`SunoConfig`] is the explicit value handed to the client builder.
//! [`Settings`] resolves it for the binaries from flags, environment
//! variables and the key file.

use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::defaults;
use crate::error::{Result, SunoError};
use crate::http::HttpConfig;

/// Client configuration
#[derive(Debug)]
pub struct SunoConfig {
    /// API key for bearer authentication
    pub api_key: SecretString,
    /// Base URL, without a trailing slash
    pub base_url: String,
    /// HTTP client settings
    pub http: HttpConfig,
}

impl SunoConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::from(api_key.into()),
            base_url: defaults::api::BASE_URL.to_string(),
            http: HttpConfig::default(),
        }
    }

    /// Set the base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_http_config(mut self, http: HttpConfig) -> Self {
        self.http = http;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.api_key.expose_secret().trim().is_empty() {
            return Err(SunoError::Configuration(
                "Suno API key cannot be empty".to_string(),
            ));
        }

        if self.base_url.is_empty() {
            return Err(SunoError::Configuration(
                "Suno base URL cannot be empty".to_string(),
            ));
        }

        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(SunoError::Configuration(format!(
                "Suno base URL must start with http:// or https://, got '{}'",
                self.base_url
            )));
        }

        Ok(())
    }
}

/// Read an API key from a file.
///
/// Accepts UTF-8 with or without a byte order mark and falls back to Latin-1
/// for anything else. Surrounding whitespace is ignored.
pub fn load_api_key(path: impl AsRef<Path>) -> Result<SecretString> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => SunoError::Configuration(format!(
            "API key file not found: {}. Create it with your key on a single line or set {}",
            path.display(),
            defaults::env::API_KEY
        )),
        _ => SunoError::Configuration(format!(
            "Cannot read API key file {}: {e}",
            path.display()
        )),
    })?;

    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(&bytes[..]);
    let text = match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => bytes.iter().map(|&b| char::from(b)).collect(),
    };

    let key = text.trim();
    if key.is_empty() {
        return Err(SunoError::Configuration(format!(
            "API key file is empty: {}",
            path.display()
        )));
    }
    Ok(SecretString::from(key.to_string()))
}

/// Where the API key came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySource {
    Environment,
    File(PathBuf),
}

impl fmt::Display for KeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeySource::Environment => write!(f, "${}", defaults::env::API_KEY),
            KeySource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Command-line overrides; `None` means "not given"
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub key_file: Option<PathBuf>,
    pub base_url: Option<String>,
    pub downloads_dir: Option<PathBuf>,
}

/// Resolved settings for the binaries
#[derive(Debug)]
pub struct Settings {
    pub api_key: SecretString,
    pub key_source: KeySource,
    pub base_url: String,
    pub downloads_dir: PathBuf,
}

impl Settings {
    /// Resolve from overrides and the process environment.
    ///
    /// Key precedence: `SUNO_API_KEY`, then the key-file flag, then
    /// `SUNO_KEY_FILE`, then `./key.txt`.
    pub fn resolve(overrides: SettingsOverrides) -> Result<Self> {
        Self::resolve_with(overrides, |name| std::env::var(name).ok())
    }

    /// Resolve with an explicit environment lookup
    pub fn resolve_with<F>(overrides: SettingsOverrides, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |name: &str| env(name).filter(|v| !v.trim().is_empty());

        let (api_key, key_source) = match lookup(defaults::env::API_KEY) {
            Some(key) => (
                SecretString::from(key.trim().to_string()),
                KeySource::Environment,
            ),
            None => {
                let path = overrides
                    .key_file
                    .or_else(|| lookup(defaults::env::KEY_FILE).map(PathBuf::from))
                    .unwrap_or_else(|| PathBuf::from(defaults::files::KEY_FILE));
                (load_api_key(&path)?, KeySource::File(path))
            }
        };

        let base_url = overrides
            .base_url
            .or_else(|| lookup(defaults::env::BASE_URL))
            .unwrap_or_else(|| defaults::api::BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let downloads_dir = overrides
            .downloads_dir
            .or_else(|| lookup(defaults::env::DOWNLOADS_DIR).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(defaults::files::DOWNLOADS_DIR));

        tracing::debug!(key_source = %key_source, base_url = %base_url, "Resolved settings");

        Ok(Self {
            api_key,
            key_source,
            base_url,
            downloads_dir,
        })
    }

    /// Client configuration for these settings
    pub fn to_config(&self) -> SunoConfig {
        SunoConfig {
            api_key: SecretString::from(self.api_key.expose_secret().to_string()),
            base_url: self.base_url.clone(),
            http: HttpConfig::default(),
        }
    }

    /// Create the downloads directory if needed and return it
    pub fn ensure_downloads_dir(&self) -> Result<&Path> {
        ensure_dir(&self.downloads_dir)?;
        Ok(&self.downloads_dir)
    }
}

/// Create a directory and its parents
pub fn ensure_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path).map_err(|e| {
        SunoError::Io(format!("Cannot create directory {}: {e}", path.display()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn write_key(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(bytes).unwrap();
        path
    }

    #[test]
    fn key_file_is_trimmed_and_bom_stripped() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_key(dir.path(), "key.txt", b"\xEF\xBB\xBF  sk-abc123 \r\n");
        assert_eq!(load_api_key(&path).unwrap().expose_secret(), "sk-abc123");
    }

    #[test]
    fn key_file_falls_back_to_latin1() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_key(dir.path(), "key.txt", b"k\xE9y\n");
        assert_eq!(load_api_key(&path).unwrap().expose_secret(), "k\u{e9}y");
    }

    #[test]
    fn missing_and_empty_key_files_are_distinct_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = load_api_key(dir.path().join("nope.txt")).unwrap_err();
        assert!(missing.to_string().contains("not found"));

        let empty = write_key(dir.path(), "empty.txt", b"  \n");
        let err = load_api_key(&empty).unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn env_key_wins_over_key_file() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("SUNO_API_KEY", "from-env"),
            ("SUNO_BASE_URL", "http://localhost:9999/api/v1/"),
        ]);
        let overrides = SettingsOverrides {
            key_file: Some(PathBuf::from("/definitely/missing/key.txt")),
            ..Default::default()
        };
        let settings =
            Settings::resolve_with(overrides, |k| env.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(settings.api_key.expose_secret(), "from-env");
        assert_eq!(settings.key_source, KeySource::Environment);
        assert_eq!(settings.base_url, "http://localhost:9999/api/v1");
        assert_eq!(settings.downloads_dir, PathBuf::from("downloads"));
    }

    #[test]
    fn key_file_flag_wins_over_env_key_file() {
        let dir = tempfile::tempdir().unwrap();
        let flag = write_key(dir.path(), "flag.txt", b"flag-key");
        let env_file = write_key(dir.path(), "env.txt", b"env-key");
        let env_path = env_file.to_string_lossy().to_string();
        let overrides = SettingsOverrides {
            key_file: Some(flag.clone()),
            downloads_dir: Some(dir.path().join("out")),
            ..Default::default()
        };
        let settings = Settings::resolve_with(overrides, |k| {
            (k == "SUNO_KEY_FILE").then(|| env_path.clone())
        })
        .unwrap();
        assert_eq!(settings.api_key.expose_secret(), "flag-key");
        assert_eq!(settings.key_source, KeySource::File(flag));
        assert_eq!(settings.base_url, defaults::api::BASE_URL);

        let out = settings.ensure_downloads_dir().unwrap();
        assert!(out.is_dir());
    }

    #[test]
    fn config_validation() {
        assert!(SunoConfig::new("k").validate().is_ok());
        assert!(SunoConfig::new(" ").validate().is_err());
        assert!(SunoConfig::new("k").with_base_url("ftp://x").validate().is_err());
        assert_eq!(
            SunoConfig::new("k").with_base_url("http://h/api/v1/").base_url,
            "http://h/api/v1"
        );
    }

    #[test]
    fn debug_output_hides_key() {
        let cfg = SunoConfig::new("sk-very-secret");
        assert!(!format!("{cfg:?}").contains("sk-very-secret"));
    }
}
