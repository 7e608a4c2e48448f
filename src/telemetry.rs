//! Telemetry and tracing utilities
//!
//! Installs a `tracing-subscriber` formatter for the binaries. Library code
//! only emits events; embedding applications bring their own subscriber.
//!
//! The CLI logs to stderr; the terminal UI logs to a file so the screen is
//! never written over.

use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::MakeWriter;

use crate::error::{Result, SunoError};

/// Output format for tracing logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON, one object per event with fields at the top level
    Json,
}

/// Configuration for tracing subscriber
#[derive(Debug, Clone)]
pub struct SubscriberConfig {
    /// Log level for this crate (`RUST_LOG` overrides it)
    pub log_level: tracing::Level,
    pub output_format: OutputFormat,
    /// Write to stderr
    pub enable_console: bool,
    /// Write to this file instead of stderr
    pub log_file: Option<PathBuf>,
}

impl Default for SubscriberConfig {
    fn default() -> Self {
        Self {
            log_level: tracing::Level::WARN,
            output_format: OutputFormat::Text,
            enable_console: true,
            log_file: None,
        }
    }
}

impl SubscriberConfig {
    /// Console logging for a CLI run with `verbosity` repetitions of `--verbose`
    pub fn for_verbosity(verbosity: u8) -> Self {
        let log_level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };
        Self {
            log_level,
            ..Self::default()
        }
    }

    /// File-only logging, used when the terminal is owned by a UI
    pub fn file_only(log_file: PathBuf, log_level: tracing::Level) -> Self {
        Self {
            log_level,
            output_format: OutputFormat::Text,
            enable_console: false,
            log_file: Some(log_file),
        }
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }
}

/// Parse a level name such as `info` or `DEBUG`
pub fn parse_level(level: &str) -> Result<tracing::Level> {
    level.trim().parse().map_err(|_| {
        SunoError::Configuration(format!(
            "Invalid log level '{level}'. Valid options: trace, debug, info, warn, error"
        ))
    })
}

/// A configured subscriber that has not been installed yet
pub type BoxedSubscriber = Box<dyn tracing::Subscriber + Send + Sync>;

/// Build the subscriber described by `config` without installing it.
///
/// `None` when neither console nor file output is enabled. The guard is set
/// for file output and must outlive the subscriber.
pub fn build_subscriber(
    config: &SubscriberConfig,
) -> Result<Option<(BoxedSubscriber, Option<WorkerGuard>)>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = config.log_level.as_str().to_ascii_lowercase();
        EnvFilter::new(format!("suno={level}"))
    });

    if let Some(path) = &config.log_file {
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        let file_name = path.file_name().ok_or_else(|| {
            SunoError::Configuration(format!("Invalid log file path: {}", path.display()))
        })?;
        crate::config::ensure_dir(&dir)?;
        let appender = tracing_appender::rolling::never(&dir, file_name);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let subscriber = boxed(config.output_format, filter, writer, false);
        return Ok(Some((subscriber, Some(guard))));
    }

    if config.enable_console {
        let subscriber = boxed(config.output_format, filter, std::io::stderr, true);
        return Ok(Some((subscriber, None)));
    }
    Ok(None)
}

/// Initialize tracing subscriber with the given configuration
///
/// Returns a guard when logging to a file; keep it alive until exit so
/// buffered lines are flushed. Calling this twice is not an error.
pub fn init_subscriber(config: SubscriberConfig) -> Result<Option<WorkerGuard>> {
    let Some((subscriber, guard)) = build_subscriber(&config)? else {
        return Ok(None);
    };
    // the host application may have installed its own subscriber
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        tracing::debug!(error = %e, "Tracing subscriber already installed");
    }
    Ok(guard)
}

fn boxed<W>(format: OutputFormat, filter: EnvFilter, writer: W, ansi: bool) -> BoxedSubscriber
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(true);

    match format {
        OutputFormat::Text => Box::new(builder.finish()),
        OutputFormat::Json => Box::new(builder.json().flatten_event(true).finish()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_maps_to_levels() {
        assert_eq!(SubscriberConfig::for_verbosity(0).log_level, tracing::Level::WARN);
        assert_eq!(SubscriberConfig::for_verbosity(2).log_level, tracing::Level::DEBUG);
        assert_eq!(SubscriberConfig::for_verbosity(9).log_level, tracing::Level::TRACE);
    }

    #[test]
    fn level_names_parse_case_insensitively() {
        assert_eq!(parse_level("DEBUG").unwrap(), tracing::Level::DEBUG);
        assert_eq!(parse_level(" warn ").unwrap(), tracing::Level::WARN);
        assert!(matches!(parse_level("loud"), Err(SunoError::Configuration(_))));
    }

    // These tests never install a global subscriber: other tests in this
    // binary rely on `#[traced_test]` owning that slot.

    #[test]
    fn console_disabled_without_file_builds_nothing() {
        let cfg = SubscriberConfig {
            enable_console: false,
            ..SubscriberConfig::default()
        };
        assert!(build_subscriber(&cfg).unwrap().is_none());
    }

    #[test]
    fn console_logging_needs_no_guard() {
        let (_, guard) = build_subscriber(&SubscriberConfig::default())
            .unwrap()
            .unwrap();
        assert!(guard.is_none());
    }

    #[test]
    fn file_logging_writes_json_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("suno.log");
        let cfg = SubscriberConfig::file_only(path.clone(), tracing::Level::INFO)
            .with_format(OutputFormat::Json);

        let (subscriber, guard) = build_subscriber(&cfg).unwrap().unwrap();
        assert!(guard.is_some());
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(task_id = "t-1", "written to file");
            tracing::debug!("below the level");
        });
        drop(guard);

        let contents = std::fs::read_to_string(&path).unwrap();
        let line: serde_json::Value = serde_json::from_str(contents.trim()).unwrap();
        assert_eq!(line["message"], "written to file");
        assert_eq!(line["task_id"], "t-1");
        assert!(!contents.contains("below the level"));
    }
}
