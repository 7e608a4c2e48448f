//! Background worker for the terminal UI
//!
//! The UI thread never awaits. Jobs go to a dedicated thread that owns a
//! current-thread runtime and the client; progress comes back as
//! [`WorkerEvent`]s. Jobs run one after another.

use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::SunoClient;
use crate::download::track_filename;
use crate::error::Result;
use crate::types::{
    CreditBalance, GenerateMusicRequest, LyricsRequest, SeparateVocalsRequest, TaskId,
    TaskStatus, VideoRequest, WavRequest,
};

/// Work the UI can ask for
#[derive(Debug, Clone)]
pub enum Job {
    Credits,
    Generate {
        request: GenerateMusicRequest,
        auto_download: bool,
    },
    Lyrics(LyricsRequest),
    Separate(SeparateVocalsRequest),
    Video(VideoRequest),
    Wav(WavRequest),
    Status(TaskId),
}

impl Job {
    /// Short name used in the history and status bar
    pub fn label(&self) -> &'static str {
        match self {
            Job::Credits => "Credits",
            Job::Generate { .. } => "Music",
            Job::Lyrics(_) => "Lyrics",
            Job::Separate(_) => "Separate",
            Job::Video(_) => "Video",
            Job::Wav(_) => "WAV",
            Job::Status(_) => "Status",
        }
    }
}

/// What the worker reports back
#[derive(Debug)]
pub enum WorkerEvent {
    Submitted(TaskId),
    Progress {
        task_id: TaskId,
        raw_status: String,
        elapsed: Duration,
    },
    /// Terminal status; always the last event of a task job
    Finished(TaskStatus),
    /// The job ended with an error
    Failed(String),
    Credits(CreditBalance),
    Downloaded {
        path: PathBuf,
        bytes: u64,
    },
    /// One file could not be saved; the job carries on
    DownloadFailed {
        url: String,
        message: String,
    },
}

type SharedToken = Arc<Mutex<Option<CancellationToken>>>;

fn lock(token: &SharedToken) -> MutexGuard<'_, Option<CancellationToken>> {
    token.lock().unwrap_or_else(|e| e.into_inner())
}

/// Handle to the worker thread; dropping it stops the thread after the
/// current job
pub struct Worker {
    jobs: Sender<Job>,
    events: Receiver<WorkerEvent>,
    current: SharedToken,
    /// Set once the thread is gone and its loss has been reported
    disconnected: Cell<bool>,
    _thread: JoinHandle<()>,
}

impl Worker {
    pub fn spawn(client: SunoClient, downloads_dir: PathBuf) -> std::io::Result<Self> {
        let (job_tx, job_rx) = mpsc::channel::<Job>();
        let (event_tx, event_rx) = mpsc::channel();
        let current: SharedToken = Arc::new(Mutex::new(None));
        let shared = current.clone();

        let thread = std::thread::Builder::new()
            .name("suno-worker".into())
            .spawn(move || {
                let runtime = match tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                {
                    Ok(runtime) => runtime,
                    Err(e) => {
                        let _ = event_tx.send(WorkerEvent::Failed(format!(
                            "Cannot start worker runtime: {e}"
                        )));
                        return;
                    }
                };

                while let Ok(job) = job_rx.recv() {
                    let token = CancellationToken::new();
                    *lock(&shared) = Some(token.clone());
                    let runner = Runner {
                        client: &client,
                        events: &event_tx,
                        cancel: token,
                        downloads_dir: &downloads_dir,
                    };
                    runtime.block_on(runner.run(job));
                    *lock(&shared) = None;
                }
                debug!("Worker stopped");
            })?;

        Ok(Self {
            jobs: job_tx,
            events: event_rx,
            current,
            disconnected: Cell::new(false),
            _thread: thread,
        })
    }

    /// Queue a job; false when the worker thread is gone
    pub fn submit(&self, job: Job) -> bool {
        debug!(job = job.label(), "Job queued");
        self.jobs.send(job).is_ok()
    }

    /// Abandon the running wait, if any
    pub fn cancel(&self) {
        if let Some(token) = lock(&self.current).as_ref() {
            token.cancel();
        }
    }

    /// Next pending event without blocking.
    ///
    /// A dead worker thread is reported once as [`WorkerEvent::Failed`];
    /// later calls return `None`.
    pub fn try_event(&self) -> Option<WorkerEvent> {
        match self.events.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) if self.disconnected.replace(true) => None,
            Err(TryRecvError::Disconnected) => {
                warn!("Worker thread is gone");
                Some(WorkerEvent::Failed(
                    "The background worker stopped unexpectedly".to_string(),
                ))
            }
        }
    }

    /// A handle whose thread has already exited
    #[cfg(test)]
    pub(crate) fn stopped() -> Self {
        let (jobs, _) = mpsc::channel();
        let (_, events) = mpsc::channel();
        Self {
            jobs,
            events,
            current: Arc::new(Mutex::new(None)),
            disconnected: Cell::new(false),
            _thread: std::thread::spawn(|| {}),
        }
    }

    #[cfg(test)]
    fn recv_timeout(&self, timeout: Duration) -> Option<WorkerEvent> {
        self.events.recv_timeout(timeout).ok()
    }
}

struct Runner<'a> {
    client: &'a SunoClient,
    events: &'a Sender<WorkerEvent>,
    cancel: CancellationToken,
    downloads_dir: &'a Path,
}

impl Runner<'_> {
    fn emit(&self, event: WorkerEvent) {
        // the UI has quit when this fails
        let _ = self.events.send(event);
    }

    async fn run(&self, job: Job) {
        let label = job.label();
        info!(job = label, "Job started");
        if let Err(e) = self.dispatch(job).await {
            warn!(job = label, error = %e, "Job failed");
            self.emit(WorkerEvent::Failed(e.user_message()));
        }
    }

    async fn dispatch(&self, job: Job) -> Result<()> {
        let client = self.client;
        match job {
            Job::Credits => {
                let balance = client.credits().await?;
                self.emit(WorkerEvent::Credits(balance));
            }
            Job::Generate {
                request,
                auto_download,
            } => {
                let task_id = client.generate_music(&request).await?;
                let status = self.follow(task_id).await?;
                if auto_download {
                    self.save_tracks(&status).await;
                }
                self.emit(WorkerEvent::Finished(status));
            }
            Job::Lyrics(request) => {
                let task_id = client.generate_lyrics(&request).await?;
                let status = self.follow(task_id).await?;
                self.emit(WorkerEvent::Finished(status));
            }
            Job::Separate(request) => {
                let task_id = client.separate_vocals(&request).await?;
                let status = self.follow(task_id).await?;
                self.emit(WorkerEvent::Finished(status));
            }
            Job::Video(request) => {
                let task_id = client.create_video(&request).await?;
                let status = self.follow(task_id).await?;
                self.emit(WorkerEvent::Finished(status));
            }
            Job::Wav(request) => {
                let task_id = client.convert_to_wav(&request).await?;
                let status = self.follow(task_id).await?;
                self.emit(WorkerEvent::Finished(status));
            }
            Job::Status(task_id) => {
                let status = client.task_status(&task_id).await?;
                self.emit(WorkerEvent::Finished(status));
            }
        }
        Ok(())
    }

    /// Announce a submitted task and poll it to a terminal state
    async fn follow(&self, task_id: TaskId) -> Result<TaskStatus> {
        self.emit(WorkerEvent::Submitted(task_id.clone()));
        let started = Instant::now();
        let events = self.events;
        let observer = |status: &TaskStatus| {
            let _ = events.send(WorkerEvent::Progress {
                task_id: status.task_id.clone(),
                raw_status: status.raw_status.clone(),
                elapsed: started.elapsed(),
            });
        };
        self.client
            .wait_with(
                &task_id,
                self.client.poll_options(),
                observer,
                Some(self.cancel.clone()),
            )
            .await
    }

    async fn save_tracks(&self, status: &TaskStatus) {
        for track in status.tracks().iter().filter(|t| t.is_downloadable()) {
            let dest = self.downloads_dir.join(track_filename(track));
            match self.client.download_file(&track.audio_url, &dest).await {
                Ok(done) => self.emit(WorkerEvent::Downloaded {
                    path: done.path,
                    bytes: done.bytes,
                }),
                Err(e) => self.emit(WorkerEvent::DownloadFailed {
                    url: track.audio_url.clone(),
                    message: e.to_string(),
                }),
            }
        }
    }
}
