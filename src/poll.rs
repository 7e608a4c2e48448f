//! Task polling
//!
//! Waiting for an asynchronous task is a small state machine driven by
//! repeated status fetches:
//!
//! ```text
//! pending -> running -> complete
//!                    \-> failed
//! ```
//!
//! The status source and the clock are both injectable so the loop can be
//! driven deterministically in tests.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::defaults;
use crate::error::{Result, SunoError};
use crate::types::{TaskId, TaskState, TaskStatus};

/// Time source for the poll loop
#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
    async fn sleep(&self, duration: Duration);
}

/// Real time, via the tokio timer (honours paused test time)
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Clock that only moves when slept on; sleeping returns immediately
#[derive(Debug, Clone)]
pub struct ManualClock {
    start: Instant,
    elapsed: Arc<Mutex<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            elapsed: Arc::new(Mutex::new(Duration::ZERO)),
        }
    }

    /// Total simulated time slept so far
    pub fn elapsed(&self) -> Duration {
        *self.elapsed.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn advance(&self, by: Duration) {
        let mut elapsed = self.elapsed.lock().unwrap_or_else(|e| e.into_inner());
        *elapsed += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.start + self.elapsed()
    }

    async fn sleep(&self, duration: Duration) {
        self.advance(duration);
    }
}

/// Anything that can report the status of a task
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn fetch_status(&self, task_id: &TaskId) -> Result<TaskStatus>;
}

/// Floor for the interval so a zero interval cannot spin
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Poll interval and overall deadline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOptions {
    pub interval: Duration,
    pub max_wait: Duration,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            interval: defaults::polling::INTERVAL,
            max_wait: defaults::polling::MAX_WAIT,
        }
    }
}

impl PollOptions {
    pub fn new(interval: Duration, max_wait: Duration) -> Self {
        Self { interval, max_wait }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = max_wait;
        self
    }
}

/// Observer invoked with every fetched status
pub type StatusObserver<'a> = Box<dyn FnMut(&TaskStatus) + Send + 'a>;

/// Where the wait currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Submitted, nothing observed yet
    Submitted,
    Observed(TaskState),
}

/// Drives status fetches until the task is terminal, times out or is cancelled
pub struct Poller<'a> {
    source: &'a dyn StatusSource,
    clock: Arc<dyn Clock>,
    options: PollOptions,
    cancel: Option<CancellationToken>,
    observer: Option<StatusObserver<'a>>,
}

impl<'a> Poller<'a> {
    pub fn new(source: &'a dyn StatusSource, options: PollOptions) -> Self {
        Self {
            source,
            clock: Arc::new(TokioClock),
            options,
            cancel: None,
            observer: None,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Abandon the wait when `token` is cancelled; the remote task keeps running
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn on_status(mut self, observer: impl FnMut(&TaskStatus) + Send + 'a) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Wait for `task_id` to reach a terminal state.
    ///
    /// At least one status check is made. Returns the complete status, or
    /// `TaskFailed`, `Timeout` or `Cancelled`. A failed status fetch ends the
    /// wait with that error.
    pub async fn wait(mut self, task_id: &TaskId) -> Result<TaskStatus> {
        let started = self.clock.now();
        let mut phase = Phase::Submitted;
        let mut checks: u32 = 0;

        loop {
            let fetch = self.source.fetch_status(task_id);
            let status = cancellable(self.cancel.as_ref(), task_id, fetch).await??;
            checks += 1;

            let next = Phase::Observed(status.state);
            if next != phase {
                debug!(task_id = %task_id, from = ?phase, to = %status.state, raw_status = %status.raw_status, "Task state changed");
                phase = next;
            }
            if let Some(observer) = self.observer.as_mut() {
                observer(&status);
            }

            match status.state {
                TaskState::Complete => {
                    info!(task_id = %task_id, checks, "Task complete");
                    return Ok(status);
                }
                TaskState::Failed => {
                    let message = status
                        .error_message
                        .clone()
                        .unwrap_or_else(|| status.raw_status.clone());
                    warn!(task_id = %task_id, checks, error = %message, "Task failed");
                    return Err(SunoError::TaskFailed {
                        task_id: task_id.to_string(),
                        message,
                    });
                }
                TaskState::Pending | TaskState::Running => {}
            }

            let waited = self.clock.now().saturating_duration_since(started);
            if waited >= self.options.max_wait {
                warn!(task_id = %task_id, checks, waited_s = waited.as_secs(), "Task wait timed out");
                return Err(SunoError::Timeout {
                    task_id: task_id.to_string(),
                    waited: self.options.max_wait,
                });
            }

            let pause = self
                .options
                .interval
                .max(MIN_INTERVAL)
                .min(self.options.max_wait - waited);
            cancellable(self.cancel.as_ref(), task_id, self.clock.sleep(pause)).await?;
        }
    }
}

async fn cancellable<F, T>(cancel: Option<&CancellationToken>, task_id: &TaskId, fut: F) -> Result<T>
where
    F: std::future::Future<Output = T>,
{
    match cancel {
        Some(token) => tokio::select! {
            biased;
            _ = token.cancelled() => {
                info!(task_id = %task_id, "Task wait cancelled");
                Err(SunoError::Cancelled { task_id: task_id.to_string() })
            }
            value = fut => Ok(value),
        },
        None => Ok(fut.await),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TaskOutput;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Reports the scripted states in order, repeating the last one
    struct Scripted {
        states: Vec<&'static str>,
        calls: AtomicU32,
    }

    impl Scripted {
        fn new(states: Vec<&'static str>) -> Self {
            Self {
                states,
                calls: AtomicU32::new(0),
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl StatusSource for Scripted {
        async fn fetch_status(&self, task_id: &TaskId) -> Result<TaskStatus> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) as usize;
            let raw = self.states[n.min(self.states.len() - 1)];
            Ok(TaskStatus {
                task_id: task_id.clone(),
                state: TaskState::from_remote(raw),
                raw_status: raw.to_string(),
                created_at: None,
                output: TaskOutput::Empty,
                error_message: (raw == "FAILED").then(|| "content policy".to_string()),
            })
        }
    }

    fn id() -> TaskId {
        TaskId::new("task-1").unwrap()
    }

    fn opts(interval: u64, max_wait: u64) -> PollOptions {
        PollOptions::new(Duration::from_secs(interval), Duration::from_secs(max_wait))
    }

    #[tokio::test]
    async fn immediate_completion_takes_one_check_and_no_sleep() {
        let source = Scripted::new(vec!["SUCCESS"]);
        let clock = Arc::new(ManualClock::new());
        let status = Poller::new(&source, opts(30, 600))
            .with_clock(clock.clone())
            .wait(&id())
            .await
            .unwrap();
        assert!(status.is_complete());
        assert_eq!(source.calls(), 1);
        assert_eq!(clock.elapsed(), Duration::ZERO);
    }

    #[tokio::test]
    async fn walks_pending_running_complete() {
        let source = Scripted::new(vec!["PENDING", "GENERATING", "FIRST_SUCCESS", "SUCCESS"]);
        let clock = Arc::new(ManualClock::new());
        let mut seen = Vec::new();
        let status = Poller::new(&source, opts(10, 600))
            .with_clock(clock.clone())
            .on_status(|s| seen.push(s.state))
            .wait(&id())
            .await
            .unwrap();
        assert!(status.is_complete());
        assert_eq!(
            seen,
            vec![
                TaskState::Pending,
                TaskState::Running,
                TaskState::Running,
                TaskState::Complete
            ]
        );
        assert_eq!(clock.elapsed(), Duration::from_secs(30));
    }

    #[tokio::test]
    async fn never_terminal_times_out() {
        let source = Scripted::new(vec!["GENERATING"]);
        let clock = Arc::new(ManualClock::new());
        let err = Poller::new(&source, opts(30, 100))
            .with_clock(clock.clone())
            .wait(&id())
            .await
            .unwrap_err();
        assert!(matches!(err, SunoError::Timeout { ref task_id, waited } if task_id == "task-1" && waited == Duration::from_secs(100)));
        // checks at 0, 30, 60, 90 and 100
        assert_eq!(source.calls(), 5);
        assert_eq!(clock.elapsed(), Duration::from_secs(100));
    }

    #[tokio::test]
    async fn failed_task_carries_remote_message() {
        let source = Scripted::new(vec!["PENDING", "FAILED"]);
        let err = Poller::new(&source, opts(1, 60))
            .with_clock(Arc::new(ManualClock::new()))
            .wait(&id())
            .await
            .unwrap_err();
        assert!(matches!(err, SunoError::TaskFailed { message, .. } if message == "content policy"));
    }

    #[tokio::test]
    async fn cancelled_token_abandons_wait() {
        let source = Scripted::new(vec!["PENDING"]);
        let token = CancellationToken::new();
        token.cancel();
        let err = Poller::new(&source, opts(30, 600))
            .with_clock(Arc::new(ManualClock::new()))
            .with_cancellation(token)
            .wait(&id())
            .await
            .unwrap_err();
        assert!(matches!(err, SunoError::Cancelled { .. }));
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn tokio_clock_respects_paused_time() {
        let source = Scripted::new(vec!["PENDING", "PENDING", "SUCCESS"]);
        let start = Instant::now();
        let status = Poller::new(&source, opts(30, 600)).wait(&id()).await.unwrap();
        assert!(status.is_complete());
        assert_eq!(start.elapsed(), Duration::from_secs(60));
    }
}
