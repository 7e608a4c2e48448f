//! # suno - a typed client for the Suno music generation API
//!
#![deny(unsafe_code)]

//! Submit generation jobs, poll them to completion and download the
//! results. The same client backs the `suno` command-line tool and the
//! `suno-gui` terminal interface.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use suno::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = SunoClient::builder().api_key("your-api-key").build()?;
//!
//!     println!("credits: {}", client.credits().await?);
//!
//!     let request = GenerateMusicRequest::new("a calm piano piece for a rainy evening")
//!         .with_instrumental(true);
//!     let task = client.generate_music(&request).await?;
//!     let status = client.wait_for_completion(&task).await?;
//!     for track in status.tracks() {
//!         client
//!             .download_file(&track.audio_url, suno::download::track_filename(track))
//!             .await?;
//!     }
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod defaults;
pub mod download;
pub mod error;
pub mod http;
pub mod poll;
pub mod retry;
pub mod telemetry;
pub mod transport;
pub mod types;

#[cfg(feature = "cli")]
pub mod cli;

#[cfg(feature = "gui")]
pub mod gui;

pub use client::{SunoClient, SunoClientBuilder};
pub use config::{Settings, SettingsOverrides, SunoConfig};
pub use error::{ErrorKind, Result, SunoError};

/// Commonly used types
pub mod prelude {
    pub use crate::client::{SunoClient, SunoClientBuilder};
    pub use crate::config::SunoConfig;
    pub use crate::error::{ErrorKind, Result, SunoError};
    pub use crate::poll::{Clock, ManualClock, PollOptions, TokioClock};
    pub use crate::retry::RetryPolicy;
    pub use crate::types::*;
}
