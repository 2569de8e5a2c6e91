use super::{CountdownOutcome, ShutdownCoordinator};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

impl ShutdownCoordinator {
    /// Tick every poll interval until the countdown runs out or `activation`
    /// is cancelled.
    ///
    /// The expiry decision is check-then-act: after each tick the activation is
    /// checked under the state lock and, if still live, the shutdown is marked
    /// in progress before the lock is released. A cancel that takes the lock
    /// first wins; a later one cannot stop the shutdown action.
    pub(super) async fn run_countdown(&self, activation: CancellationToken) -> CountdownOutcome {
        let interval = self.settings.poll_interval();
        let step = self.settings.poll_interval_seconds;
        let mut waited_seconds: u32 = 0;

        loop {
            tokio::select! {
                _ = activation.cancelled() => {
                    debug!(waited_seconds, "Countdown aborted while waiting");
                    return CountdownOutcome::Aborted { waited_seconds };
                }
                _ = tokio::time::sleep(interval) => {}
            }

            waited_seconds = waited_seconds.saturating_add(step);
            self.notifier.debug(&format!("Waited {} seconds.", waited_seconds));

            {
                let mut state = self.state.lock();
                if activation.is_cancelled() {
                    debug!(waited_seconds, "Countdown aborted at check");
                    return CountdownOutcome::Aborted { waited_seconds };
                }

                state.waited_seconds = waited_seconds;
                if waited_seconds < self.settings.countdown_seconds {
                    continue;
                }

                state.in_progress = true;
                state.activation = None;
            }

            info!(waited_seconds, "Shutdown countdown expired");
            self.run_shutdown_action().await;
            return CountdownOutcome::Expired { waited_seconds };
        }
    }
}
