//! Suno API client
//!
//! One method per remote operation. Submissions return a [`TaskId`];
//! [`SunoClient::wait_for_completion`] polls until the task is done.
//!
//! ```rust,ignore
//! use suno::prelude::*;
//!
//! let client = SunoClient::builder().api_key("sk-...").build()?;
//! let task = client
//!     .generate_music(&GenerateMusicRequest::new("lofi beat for studying"))
//!     .await?;
//! let done = client.wait_for_completion(&task).await?;
//! for track in done.tracks() {
//!     println!("{} {}", track.title, track.audio_url);
//! }
//! ```

mod builder;

pub use builder::SunoClientBuilder;

use async_trait::async_trait;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::download::{self, Downloaded, ProgressFn};
use crate::error::{Result, SunoError};
use crate::poll::{PollOptions, Poller, StatusSource};
use crate::transport::Transport;
use crate::types::envelope::SubmitData;
use crate::types::task::RecordInfo;
use crate::types::{
    CreditBalance, ExtendMusicRequest, GenerateMusicRequest, LyricsRequest,
    SeparateVocalsRequest, TaskId, TaskStatus, UploadCoverRequest, VideoRequest, WavRequest,
};

mod paths {
    pub const CREDITS: &str = "/generate/credit";
    pub const GENERATE: &str = "/generate";
    pub const LYRICS: &str = "/lyrics";
    pub const EXTEND: &str = "/generate/extend";
    pub const UPLOAD_COVER: &str = "/generate/upload-cover";
    pub const VOCAL_REMOVAL: &str = "/vocal-removal/generate";
    pub const VIDEO: &str = "/mp4/generate";
    pub const WAV: &str = "/wav/generate";
    pub const RECORD_INFO: &str = "/generate/record-info";
}

/// Client for the Suno music generation API
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct SunoClient {
    transport: Arc<Transport>,
    poll: PollOptions,
}

impl std::fmt::Debug for SunoClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SunoClient")
            .field("base_url", &self.transport.base_url())
            .field("poll", &self.poll)
            .finish()
    }
}

impl SunoClient {
    /// Start building a client
    pub fn builder() -> SunoClientBuilder {
        SunoClientBuilder::new()
    }

    pub(crate) fn from_parts(transport: Transport, poll: PollOptions) -> Self {
        Self {
            transport: Arc::new(transport),
            poll,
        }
    }

    pub fn base_url(&self) -> &str {
        self.transport.base_url()
    }

    /// Default polling settings used by [`wait_for_completion`](Self::wait_for_completion)
    pub fn poll_options(&self) -> PollOptions {
        self.poll
    }

    // ==================== Account ====================

    /// Remaining credits
    pub async fn credits(&self) -> Result<CreditBalance> {
        let value: Option<f64> = self.transport.get(paths::CREDITS, &[]).await?;
        let value = value.ok_or_else(|| SunoError::Parse("credit response has no data".into()))?;
        CreditBalance::new(value)
    }

    // ==================== Generation ====================

    /// Generate music from a prompt (two tracks per task)
    pub async fn generate_music(&self, request: &GenerateMusicRequest) -> Result<TaskId> {
        request.validate()?;
        self.submit(paths::GENERATE, request).await
    }

    /// Generate lyrics without audio
    pub async fn generate_lyrics(&self, request: &LyricsRequest) -> Result<TaskId> {
        request.validate()?;
        self.submit(paths::LYRICS, request).await
    }

    /// Extend an existing track from a given point
    pub async fn extend_music(&self, request: &ExtendMusicRequest) -> Result<TaskId> {
        request.validate()?;
        self.submit(paths::EXTEND, request).await
    }

    /// Restyle uploaded audio while keeping its melody
    pub async fn upload_and_cover(&self, request: &UploadCoverRequest) -> Result<TaskId> {
        request.validate()?;
        self.submit(paths::UPLOAD_COVER, request).await
    }

    // ==================== Processing ====================

    /// Split a track into vocals/instrumental or individual stems
    pub async fn separate_vocals(&self, request: &SeparateVocalsRequest) -> Result<TaskId> {
        request.validate()?;
        self.submit(paths::VOCAL_REMOVAL, request).await
    }

    /// Render a music video for a track
    pub async fn create_video(&self, request: &VideoRequest) -> Result<TaskId> {
        request.validate()?;
        self.submit(paths::VIDEO, request).await
    }

    /// Convert a track to WAV
    pub async fn convert_to_wav(&self, request: &WavRequest) -> Result<TaskId> {
        request.validate()?;
        self.submit(paths::WAV, request).await
    }

    // ==================== Task status ====================

    /// Fetch the current status of a task
    pub async fn task_status(&self, task_id: &TaskId) -> Result<TaskStatus> {
        let record: Option<RecordInfo> = self
            .transport
            .get(
                paths::RECORD_INFO,
                &[("taskId", task_id.as_str().to_string())],
            )
            .await?;
        let record = record.ok_or_else(|| {
            SunoError::remote(200, format!("no record returned for task {task_id}"))
        })?;
        TaskStatus::from_record(task_id, record)
    }

    /// Poll with the client's default options until the task is terminal
    pub async fn wait_for_completion(&self, task_id: &TaskId) -> Result<TaskStatus> {
        self.poller(self.poll).wait(task_id).await
    }

    /// Poll with explicit options, an observer and an optional cancellation token
    pub async fn wait_with<'a, F>(
        &'a self,
        task_id: &TaskId,
        options: PollOptions,
        observer: F,
        cancel: Option<CancellationToken>,
    ) -> Result<TaskStatus>
    where
        F: FnMut(&TaskStatus) + Send + 'a,
    {
        let mut poller = self.poller(options).on_status(observer);
        if let Some(token) = cancel {
            poller = poller.with_cancellation(token);
        }
        poller.wait(task_id).await
    }

    /// A poller over this client, for callers that need a custom clock
    pub fn poller(&self, options: PollOptions) -> Poller<'_> {
        Poller::new(self, options)
    }

    // ==================== Downloads ====================

    /// Download a file to `dest`
    pub async fn download_file(&self, url: &str, dest: impl AsRef<Path>) -> Result<Downloaded> {
        download::download_to(self.transport.http(), url, dest.as_ref(), None).await
    }

    /// Download a file to `dest`, reporting `(written, total)` as bytes arrive
    pub async fn download_file_with_progress(
        &self,
        url: &str,
        dest: impl AsRef<Path>,
        progress: &mut ProgressFn<'_>,
    ) -> Result<Downloaded> {
        download::download_to(self.transport.http(), url, dest.as_ref(), Some(progress)).await
    }

    async fn submit<B: Serialize>(&self, path: &str, body: &B) -> Result<TaskId> {
        let data: Option<SubmitData> = self.transport.post(path, body).await?;
        let task_id = data
            .and_then(|d| d.task_id)
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| SunoError::remote(200, "response did not include a task id"))?;
        let task_id = TaskId::new(task_id)?;
        info!(path, task_id = %task_id, "Task submitted");
        Ok(task_id)
    }
}

#[async_trait]
impl StatusSource for SunoClient {
    async fn fetch_status(&self, task_id: &TaskId) -> Result<TaskStatus> {
        self.task_status(task_id).await
    }
}
