//! Pause and cancellation for per-line runs.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use storyboard_interface::CancelToken;
use tracing::debug;

/// Cloneable handle controlling a prompt run.
///
/// Workers call [`checkpoint`](Self::checkpoint) before each scene line.
/// While paused the checkpoint sleeps in `poll` steps, so cancellation is
/// observed within one step even mid-pause.
///
/// # Examples
///
/// ```
/// use storyboard_pipeline::RunControl;
///
/// let control = RunControl::default();
/// let handle = control.clone();
///
/// handle.pause();
/// assert!(control.is_paused());
/// handle.cancel();
/// assert!(control.is_cancelled());
/// ```
#[derive(Debug, Clone)]
pub struct RunControl {
    cancel: CancelToken,
    paused: Arc<AtomicBool>,
    poll: Duration,
}

impl Default for RunControl {
    fn default() -> Self {
        Self::new(Duration::from_millis(250))
    }
}

impl RunControl {
    /// Control re-checking a pause every `poll`.
    pub fn new(poll: Duration) -> Self {
        Self::with_token(CancelToken::new(), poll)
    }

    /// Control sharing an existing cancellation token.
    pub fn with_token(cancel: CancelToken, poll: Duration) -> Self {
        Self {
            cancel,
            paused: Arc::new(AtomicBool::new(false)),
            poll: poll.max(Duration::from_millis(1)),
        }
    }

    /// Suspend workers at their next checkpoint.
    pub fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    /// Let paused workers continue.
    pub fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
    }

    /// Whether a pause is requested.
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    /// Stop the run. Irreversible.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether the run was cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Token observed by in-flight generation calls.
    pub fn token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Pause re-check interval.
    pub fn poll(&self) -> Duration {
        self.poll
    }

    /// Wait out any pause; `false` means the run was cancelled.
    pub async fn checkpoint(&self) -> bool {
        if self.is_paused() {
            debug!("Run paused");
        }
        while self.is_paused() {
            if self.is_cancelled() {
                return false;
            }
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return false,
                _ = tokio::time::sleep(self.poll) => {}
            }
        }
        !self.is_cancelled()
    }
}
