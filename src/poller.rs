use std::time::Duration;

use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;

use crate::display::ProgressDisplay;
use crate::errors::ClipJobError;
use crate::job_status::JobStatus;
use crate::render::{render_error, RenderFormat};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);
pub const COMPLETE_STATUS: &str = "Complete";

#[async_trait::async_trait]
pub trait StatusSource: Send + Sync {
    async fn fetch_status(&self) -> Result<JobStatus, ClipJobError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollErrorPolicy {
    Stop,
    /// Give up after more than `max_consecutive` failures in a row.
    Retry { max_consecutive: u32 },
}

impl PollErrorPolicy {
    pub fn absorbs(self, consecutive_failures: u32) -> bool {
        match self {
            PollErrorPolicy::Stop => false,
            PollErrorPolicy::Retry { max_consecutive } => consecutive_failures <= max_consecutive,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PollConfig {
    pub interval: Duration,
    pub terminal_statuses: Vec<String>,
    pub format: RenderFormat,
    pub on_error: PollErrorPolicy,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            terminal_statuses: vec![COMPLETE_STATUS.to_string()],
            format: RenderFormat::default(),
            on_error: PollErrorPolicy::Stop,
        }
    }
}

impl PollConfig {
    pub fn is_terminal(&self, status: &str) -> bool {
        self.terminal_statuses.iter().any(|s| s == status)
    }
}

#[derive(Debug)]
pub enum PollOutcome {
    Completed(JobStatus),
    Failed(ClipJobError),
    Cancelled,
}

#[derive(Debug)]
pub struct Poller {
    config: PollConfig,
    cancel: CancellationToken,
}

impl Poller {
    pub fn new(config: PollConfig) -> Self {
        Self {
            config,
            cancel: CancellationToken::new(),
        }
    }

    pub fn cancel_handle(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Polls until a terminal status, a failure the error policy does not
    /// absorb, or cancellation. The next request is issued only after the
    /// previous result has been rendered. A request already in flight is
    /// not aborted by cancellation.
    pub async fn run<S, D>(&self, source: &S, display: &mut D) -> PollOutcome
    where
        S: StatusSource + ?Sized,
        D: ProgressDisplay + ?Sized,
    {
        let mut attempt: u64 = 0;
        let mut failures: u32 = 0;
        loop {
            if self.cancel.is_cancelled() {
                tracing::info!(attempt, "polling cancelled");
                return PollOutcome::Cancelled;
            }
            attempt += 1;
            tracing::debug!(attempt, "polling job status");

            match source.fetch_status().await {
                Ok(job) => {
                    failures = 0;
                    display.show(&self.config.format.render(&job));
                    if self.config.is_terminal(&job.status) {
                        tracing::info!(attempt, status = %job.status, "job reached terminal status");
                        return PollOutcome::Completed(job);
                    }
                }
                Err(err) => {
                    display.show(&render_error(&err));
                    failures = failures.saturating_add(1);
                    if !self.config.on_error.absorbs(failures) {
                        tracing::warn!(error = %err, failures, "status request failed, polling stopped");
                        return PollOutcome::Failed(err);
                    }
                    tracing::warn!(error = %err, failures, "status request failed, retrying");
                }
            }

            tokio::select! {
                _ = self.cancel.cancelled() => {
                    tracing::info!(attempt, "polling cancelled");
                    return PollOutcome::Cancelled;
                }
                _ = tokio::time::sleep(self.config.interval) => {}
            }
        }
    }

    pub fn spawn<S, D>(self, source: S, mut display: D) -> PollTask
    where
        S: StatusSource + 'static,
        D: ProgressDisplay + Send + 'static,
    {
        let cancel = self.cancel.clone();
        let join = tokio::spawn(async move { self.run(&source, &mut display).await });
        PollTask { cancel, join }
    }
}

#[derive(Debug)]
pub struct PollTask {
    cancel: CancellationToken,
    join: JoinHandle<PollOutcome>,
}

impl PollTask {
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub async fn join(self) -> Result<PollOutcome, JoinError> {
        self.join.await
    }
}
