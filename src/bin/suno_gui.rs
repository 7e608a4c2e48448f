//! Suno Music Studio
//!
//! Full-screen terminal front end for the Suno API.

use clap::Parser;
use std::process::ExitCode;

use suno::gui::{self, GuiArgs};

fn main() -> ExitCode {
    match gui::run(GuiArgs::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let message = match err.downcast_ref::<suno::SunoError>() {
                Some(e) => e.user_message(),
                None => format!("{err:#}"),
            };
            eprintln!("Error: {message}");
            ExitCode::FAILURE
        }
    }
}
