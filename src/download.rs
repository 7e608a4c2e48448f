//! File downloads
//!
//! Streams a remote artifact to disk. Bytes go to `<dest>.part` first and
//! the file is renamed into place only once the body is complete.

use futures_util::StreamExt;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::defaults;
use crate::defaults::files::FALLBACK_DOWNLOAD_NAME;
use crate::error::{Result, SunoError};
use crate::types::Track;

/// Progress callback receiving `(bytes_written, total_if_known)`
pub type ProgressFn<'a> = dyn FnMut(u64, Option<u64>) + Send + 'a;

/// Outcome of a finished download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Downloaded {
    pub path: PathBuf,
    pub bytes: u64,
}

/// Download `url` to `dest`, creating parent directories.
///
/// When the server sends `Content-Length`, a body of any other size is a
/// transport error and nothing is left at `dest`.
pub async fn download_to(
    http: &reqwest::Client,
    url: &str,
    dest: &Path,
    mut progress: Option<&mut ProgressFn<'_>>,
) -> Result<Downloaded> {
    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(|e| {
            SunoError::Io(format!("Cannot create directory {}: {e}", parent.display()))
        })?;
    }

    info!(url = %url, dest = %dest.display(), "Download started");
    let response = http
        .get(url)
        .timeout(defaults::http::DOWNLOAD_TIMEOUT)
        .send()
        .await?;
    let status = response.status();
    if !status.is_success() {
        return Err(SunoError::Transport(format!(
            "download of {url} failed with HTTP {}",
            status.as_u16()
        )));
    }
    let total = response.content_length();

    let part = part_path(dest);
    let written = match stream_body(response, &part, total, &mut progress).await {
        Ok(written) => written,
        Err(e) => {
            discard(&part).await;
            return Err(e);
        }
    };

    if let Some(expected) = total
        && expected != written
    {
        discard(&part).await;
        warn!(url = %url, expected, written, "Download size mismatch");
        return Err(SunoError::Transport(format!(
            "download of {url} truncated: expected {expected} bytes, got {written}"
        )));
    }

    tokio::fs::rename(&part, dest).await.map_err(|e| {
        SunoError::Io(format!("Cannot move download into {}: {e}", dest.display()))
    })?;
    info!(dest = %dest.display(), bytes = written, "Download complete");
    Ok(Downloaded {
        path: dest.to_path_buf(),
        bytes: written,
    })
}

async fn stream_body(
    response: reqwest::Response,
    part: &Path,
    total: Option<u64>,
    progress: &mut Option<&mut ProgressFn<'_>>,
) -> Result<u64> {
    let mut file = tokio::fs::File::create(part)
        .await
        .map_err(|e| SunoError::Io(format!("Cannot create {}: {e}", part.display())))?;
    let mut stream = response.bytes_stream();
    let mut written: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| SunoError::Transport(format!("download interrupted: {e}")))?;
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
        if let Some(report) = progress.as_deref_mut() {
            report(written, total);
        }
    }
    file.flush().await?;
    debug!(part = %part.display(), bytes = written, "Body written");
    Ok(written)
}

async fn discard(part: &Path) {
    if let Err(e) = tokio::fs::remove_file(part).await
        && e.kind() != std::io::ErrorKind::NotFound
    {
        warn!(part = %part.display(), error = %e, "Cannot remove partial download");
    }
}

fn part_path(dest: &Path) -> PathBuf {
    let mut name = dest.as_os_str().to_os_string();
    name.push(".part");
    PathBuf::from(name)
}

/// Last path segment of a URL without its query, or `download.mp3`
pub fn filename_from_url(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    let path = path
        .split_once("://")
        .map(|(_, rest)| rest.split_once('/').map(|(_, p)| p).unwrap_or_default())
        .unwrap_or(path);
    path.rsplit('/')
        .next()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| FALLBACK_DOWNLOAD_NAME.to_string())
}

/// `<title|track>_<first 8 chars of id>.mp3`, keeping only safe characters
pub fn track_filename(track: &Track) -> String {
    let title = if track.title.trim().is_empty() {
        "track"
    } else {
        track.title.as_str()
    };
    let short_id: String = track.id.chars().take(8).collect();
    sanitize_filename(&format!("{title}_{short_id}.mp3"))
}

/// Keep alphanumerics and `._- `
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '.' | '_' | '-' | ' '))
        .collect()
}
