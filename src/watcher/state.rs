use super::{ShutdownCoordinator, ShutdownStatus};
use tokio_util::sync::CancellationToken;

/// Mutable coordinator state. Only the coordinator touches it.
#[derive(Debug, Default)]
pub(super) struct ShutdownState {
    pub(super) armed: bool,
    pub(super) waited_seconds: u32,
    pub(super) in_progress: bool,
    /// Token of the countdown currently allowed to fire
    pub(super) activation: Option<CancellationToken>,
}

impl ShutdownCoordinator {
    /// Snapshot of the current state
    pub fn status(&self) -> ShutdownStatus {
        let state = self.state.lock();
        ShutdownStatus {
            armed: state.armed,
            waited_seconds: state.waited_seconds,
            in_progress: state.in_progress,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.state.lock().armed
    }

    pub fn is_shutdown_in_progress(&self) -> bool {
        self.state.lock().in_progress
    }
}
