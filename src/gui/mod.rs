//! `suno-gui` terminal front end
//!
//! A tabbed full-screen UI over the same client the command-line tool uses.
//! Network work runs on a [`worker::Worker`] thread so the screen keeps
//! redrawing while a task is polled.

pub mod app;
pub mod view;
pub mod worker;

use anyhow::{Context as _, Result};
use clap::Parser;
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::io::{Stdout, stdout};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

use crate::SunoClientBuilder;
use crate::config::{Settings, SettingsOverrides};
use crate::defaults;
use crate::telemetry::{SubscriberConfig, init_subscriber, parse_level};
use app::{Action, App};
use worker::{Job, Worker, WorkerEvent};

/// How long to wait for input before redrawing
const TICK: Duration = Duration::from_millis(100);

/// Suno Music Studio - terminal UI
#[derive(Parser, Debug)]
#[command(name = "suno-gui", author, version)]
pub struct GuiArgs {
    /// File holding the API key
    #[arg(long, value_name = "PATH")]
    pub key_file: Option<PathBuf>,

    /// API base URL
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Directory for downloaded files
    #[arg(long, value_name = "DIR")]
    pub downloads_dir: Option<PathBuf>,

    /// Log file; the screen itself is never logged to
    #[arg(long, value_name = "PATH", default_value = "suno-gui.log")]
    pub log_file: PathBuf,

    /// trace, debug, info, warn or error (`RUST_LOG` overrides it)
    #[arg(long, value_name = "LEVEL", default_value = "info")]
    pub log_level: String,
}

/// Puts the terminal back on drop, including on early returns and panics
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode().context("Cannot switch the terminal to raw mode")?;
        let mut out = stdout();
        if let Err(e) = execute!(out, EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(e.into());
        }
        let terminal = Terminal::new(CrosstermBackend::new(out))?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

pub fn run(args: GuiArgs) -> Result<()> {
    let settings = Settings::resolve(SettingsOverrides {
        key_file: args.key_file,
        base_url: args.base_url,
        downloads_dir: args.downloads_dir,
    })?;
    let level = parse_level(&args.log_level)?;
    let _log_guard = init_subscriber(SubscriberConfig::file_only(args.log_file, level))?;

    let client = SunoClientBuilder::from_config(settings.to_config())
        .poll_interval(defaults::polling::INTERACTIVE_INTERVAL)
        .max_wait(defaults::polling::MAX_WAIT)
        .build()?;
    let worker = Worker::spawn(client, settings.downloads_dir.clone())
        .context("Cannot start the background worker")?;
    info!(key_source = ?settings.key_source, "Terminal UI starting");

    let mut app = App::new();
    if let Some(action) = app.start(Job::Credits) {
        perform(action, &mut app, &worker);
    }

    let mut guard = TerminalGuard::enter()?;
    event_loop(&mut guard.terminal, &mut app, &worker)?;
    info!("Terminal UI closed");
    Ok(())
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
    worker: &Worker,
) -> Result<()> {
    while !app.should_quit {
        drain_events(app, worker);

        terminal.draw(|frame| view::draw(frame, app))?;

        if event::poll(TICK)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
            && let Some(action) = app.on_key(key)
        {
            perform(action, app, worker);
        }
    }
    worker.cancel();
    Ok(())
}

/// Apply every event the worker has queued since the last frame
fn drain_events(app: &mut App, worker: &Worker) {
    while let Some(event) = worker.try_event() {
        if let Some(action) = app.on_event(event) {
            perform(action, app, worker);
        }
    }
}

fn perform(action: Action, app: &mut App, worker: &Worker) {
    match action {
        Action::Submit(job) => {
            if !worker.submit(job) {
                warn!("Worker stopped; job dropped");
                let _ = app.on_event(WorkerEvent::Failed(
                    "The background worker is not running; restart suno-gui".to_string(),
                ));
            }
        }
        Action::Cancel => worker.cancel(),
        Action::Quit => {}
    }
}
