//! Suno CLI
//!
//! Generate music, lyrics and more with the Suno API.

use clap::Parser;
use owo_colors::OwoColorize;
use std::process::ExitCode;

use suno::cli::{self, Cli};

fn main() -> ExitCode {
    let args = Cli::parse();

    match cli::run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {}", "Error:".red().bold(), cli::error_message(&err));
            ExitCode::FAILURE
        }
    }
}
