//! Spinners and progress bars

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use std::path::Path;
use std::time::{Duration, Instant};

use crate::SunoClient;
use crate::download::Downloaded;
use crate::error::{Result, SunoError};
use crate::types::{TaskId, TaskStatus};

const TICK: Duration = Duration::from_millis(100);

/// Steadily ticking spinner showing `message`
pub fn spinner(message: impl Into<String>) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.into());
    pb.enable_steady_tick(TICK);
    pb
}

/// Run `fut` behind a spinner that is cleared once it resolves
pub async fn with_spinner<T, F>(message: impl Into<String>, fut: F) -> T
where
    F: std::future::Future<Output = T>,
{
    let pb = spinner(message);
    let out = fut.await;
    pb.finish_and_clear();
    out
}

/// Wait for a task, showing the remote status and elapsed seconds
pub async fn wait_for_task(client: &SunoClient, task_id: &TaskId, label: &str) -> Result<TaskStatus> {
    let pb = spinner(format!("{label}... starting"));
    let started = Instant::now();

    let observer = |status: &TaskStatus| {
        pb.set_message(format!(
            "{label}... {} ({}s)",
            status.raw_status.cyan(),
            started.elapsed().as_secs()
        ));
    };
    let outcome = client
        .wait_with(task_id, client.poll_options(), observer, None)
        .await;

    match &outcome {
        Ok(_) => pb.finish_with_message(format!("{} {label} complete", "✓".green())),
        Err(SunoError::TaskFailed { .. }) => {
            pb.finish_with_message(format!("{} {label} failed", "✗".red()))
        }
        Err(_) => pb.finish_and_clear(),
    }
    outcome
}

/// Download `url` to `dest` behind a byte progress bar
pub async fn download_with_bar(client: &SunoClient, url: &str, dest: &Path) -> Result<Downloaded> {
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.cyan} {msg} [{bar:30.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▓░"),
    );
    let name = dest
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    pb.set_message(name);

    let mut report = |written: u64, total: Option<u64>| {
        if let Some(total) = total {
            pb.set_length(total);
        }
        pb.set_position(written);
    };
    let outcome = client
        .download_file_with_progress(url, dest, &mut report)
        .await;
    pb.finish_and_clear();
    outcome
}
