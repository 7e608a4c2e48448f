//! `suno` command-line tool
//!
//! Thin layer over [`SunoClient`]: parses arguments, calls one client
//! operation and prints the typed result.

pub mod commands;
pub mod interactive;
pub mod progress;
pub mod render;

use anyhow::Result;
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{Settings, SettingsOverrides};
use crate::defaults;
use crate::telemetry::{SubscriberConfig, init_subscriber};
use crate::{SunoClient, SunoClientBuilder, SunoError};

/// Suno - AI music generation from the terminal
#[derive(Parser, Debug)]
#[command(
    name = "suno",
    author,
    version,
    about = "Suno - AI music generation from the terminal",
    long_about = "Generate music, lyrics, covers, stems, videos and WAV files with the Suno API.\n\n\
                  The API key is read from SUNO_API_KEY, --key-file, SUNO_KEY_FILE or ./key.txt."
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// File holding the API key
    #[arg(long, global = true, value_name = "PATH")]
    pub key_file: Option<PathBuf>,

    /// API base URL
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// Directory for downloaded files
    #[arg(long, global = true, value_name = "DIR")]
    pub downloads_dir: Option<PathBuf>,

    /// More log output on stderr (repeat for more)
    #[arg(long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

impl GlobalArgs {
    fn overrides(&self) -> SettingsOverrides {
        SettingsOverrides {
            key_file: self.key_file.clone(),
            base_url: self.base_url.clone(),
            downloads_dir: self.downloads_dir.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the remaining credit balance
    Credits,

    /// Generate music from a text description
    ///
    /// Examples:
    ///   suno generate "upbeat jazz with piano"
    ///   suno generate "love song" --custom --style "Pop Ballad" --title "Forever"
    Generate(commands::GenerateArgs),

    /// Generate lyrics from a text description
    Lyrics(commands::LyricsArgs),

    /// Extend an existing track
    Extend(commands::ExtendArgs),

    /// Restyle uploaded audio while keeping its melody
    Cover(commands::CoverArgs),

    /// Separate vocals or split a track into stems
    Separate(commands::SeparateArgs),

    /// Render an MP4 music video
    Video(commands::VideoArgs),

    /// Convert a track to WAV
    Wav(commands::WavArgs),

    /// Show the status and results of a task
    Status(commands::StatusArgs),

    /// Download a file into the downloads directory
    Download(commands::DownloadArgs),

    /// Guided generation
    Interactive,
}

/// Resolved settings plus a client built from them
pub struct Context {
    pub settings: Settings,
    pub client: SunoClient,
}

impl Context {
    pub fn load(global: &GlobalArgs) -> crate::Result<Self> {
        let settings = Settings::resolve(global.overrides())?;
        let client = SunoClientBuilder::from_config(settings.to_config())
            .poll_interval(defaults::polling::INTERACTIVE_INTERVAL)
            .max_wait(defaults::polling::MAX_WAIT)
            .build()?;
        Ok(Self { settings, client })
    }
}

/// Run a parsed command line on a single-threaded runtime
pub fn run(cli: Cli) -> Result<()> {
    let _guard = init_subscriber(SubscriberConfig::for_verbosity(cli.global.verbose))?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(dispatch(cli))
}

async fn dispatch(cli: Cli) -> Result<()> {
    let ctx = Context::load(&cli.global)?;
    tracing::debug!(command = ?cli.command, "Dispatching command");

    match cli.command {
        Command::Credits => commands::credits(&ctx).await,
        Command::Generate(args) => commands::generate(&ctx, args).await,
        Command::Lyrics(args) => commands::lyrics(&ctx, args).await,
        Command::Extend(args) => commands::extend(&ctx, args).await,
        Command::Cover(args) => commands::cover(&ctx, args).await,
        Command::Separate(args) => commands::separate(&ctx, args).await,
        Command::Video(args) => commands::video(&ctx, args).await,
        Command::Wav(args) => commands::wav(&ctx, args).await,
        Command::Status(args) => commands::status(&ctx, args).await,
        Command::Download(args) => commands::download(&ctx, args).await,
        Command::Interactive => interactive::run(&ctx).await,
    }
}

/// Message printed after `Error: `, with a hint for library errors
pub fn error_message(err: &anyhow::Error) -> String {
    match err.downcast_ref::<SunoError>() {
        Some(e) => e.user_message(),
        None => format!("{err:#}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn parser_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn generate_flags() {
        let cli = Cli::parse_from([
            "suno", "generate", "love song", "-c", "-s", "Pop", "-t", "Forever", "-v", "f", "-m",
            "V5", "--no-wait",
        ]);
        let Command::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        assert!(args.custom);
        assert_eq!(args.style.as_deref(), Some("Pop"));
        assert_eq!(args.vocal, Some(crate::types::VocalGender::Female));
        assert_eq!(args.model, crate::types::Model::V5);
        assert!(args.no_wait);
        assert!(!args.download);
    }

    #[test]
    fn global_flags_work_after_subcommand() {
        let cli = Cli::parse_from([
            "suno",
            "credits",
            "--key-file",
            "k.txt",
            "--verbose",
            "--verbose",
        ]);
        assert_eq!(cli.global.key_file, Some(PathBuf::from("k.txt")));
        assert_eq!(cli.global.verbose, 2);
    }

    #[test]
    fn separation_type_defaults_to_vocal() {
        let cli = Cli::parse_from(["suno", "separate", "t1", "a1"]);
        let Command::Separate(args) = cli.command else {
            panic!("expected separate");
        };
        assert_eq!(args.separation, crate::types::SeparationType::SeparateVocal);

        let cli = Cli::parse_from(["suno", "separate", "t1", "a1", "-t", "stem"]);
        let Command::Separate(args) = cli.command else {
            panic!("expected separate");
        };
        assert_eq!(args.separation, crate::types::SeparationType::SplitStem);
    }

    #[test]
    fn unknown_model_is_rejected() {
        assert!(Cli::try_parse_from(["suno", "generate", "x", "-m", "V9"]).is_err());
    }

    #[test]
    fn extend_requires_continue_at() {
        assert!(Cli::try_parse_from(["suno", "extend", "audio-1"]).is_err());
        let cli = Cli::parse_from(["suno", "extend", "audio-1", "-c", "120", "--use-defaults"]);
        let Command::Extend(args) = cli.command else {
            panic!("expected extend");
        };
        assert_eq!(args.continue_at, 120.0);
        assert!(args.use_defaults);
    }

    #[test]
    fn error_messages_carry_hints() {
        let err = anyhow::Error::new(SunoError::Authentication("bad key".into()));
        let msg = error_message(&err);
        assert!(msg.starts_with("Authentication failed: bad key"));
        assert!(msg.contains("key.txt"));
    }
}
