use super::{ShutdownCoordinator, FORCE_EXIT_CODE, FORCE_EXIT_GRACE};
use std::sync::Arc;
use tracing::{error, info, warn};

impl ShutdownCoordinator {
    /// Save, ask the host to stop, then arm the force-exit watchdog.
    ///
    /// A failed save is reported and the shutdown goes ahead anyway.
    pub(super) async fn run_shutdown_action(&self) {
        self.notifier.info("Saving world...");

        match self.persistence.save_state(true).await {
            Ok(()) => {
                self.notifier.info("World saved. Shutting down.");
            }
            Err(e) => {
                error!("Failed to save state before shutdown: {}", e);
                self.notifier
                    .info(&format!("Failed to save world: {}. Shutting down anyway.", e));
            }
        }

        info!("Requesting host shutdown");
        self.process.request_shutdown();

        self.spawn_force_exit_watchdog();
    }

    /// Terminate the process if it is still alive after [`FORCE_EXIT_GRACE`]
    fn spawn_force_exit_watchdog(&self) {
        let notifier = self.notifier.clone();
        let process = Arc::clone(&self.process);

        self.runtime.spawn(async move {
            tokio::time::sleep(FORCE_EXIT_GRACE).await;
            warn!(
                "Host still running {:?} after shutdown request",
                FORCE_EXIT_GRACE
            );
            notifier.debug("Server did not shut down. Forcing exit.");
            process.force_exit(FORCE_EXIT_CODE);
        });
    }
}
