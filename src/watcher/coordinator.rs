use super::state::ShutdownState;
use super::CountdownOutcome;
use crate::config::WatcherConfig;
use crate::error::{Result, ShutdownError};
use crate::notify::Notifier;
use crate::persistence::Persistence;
use crate::population::PopulationSource;
use crate::process::ProcessControl;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Arms and disarms the empty-server countdown.
///
/// One instance per process, shared as `Arc<ShutdownCoordinator>` with the
/// hooks that call into it. `schedule` and `cancel` are synchronous and may be
/// called from any thread; countdowns run on the runtime captured at
/// construction.
pub struct ShutdownCoordinator {
    pub(super) settings: WatcherConfig,
    pub(super) notifier: Notifier,
    pub(super) population: Arc<dyn PopulationSource>,
    pub(super) persistence: Arc<dyn Persistence>,
    pub(super) process: Arc<dyn ProcessControl>,
    pub(super) runtime: Handle,
    pub(super) state: Mutex<ShutdownState>,
}

impl ShutdownCoordinator {
    /// Create a coordinator bound to the current tokio runtime
    pub fn new(
        settings: WatcherConfig,
        notifier: Notifier,
        population: Arc<dyn PopulationSource>,
        persistence: Arc<dyn Persistence>,
        process: Arc<dyn ProcessControl>,
    ) -> Result<Arc<Self>> {
        let runtime = Handle::try_current().map_err(|e| {
            ShutdownError::system(format!("Shutdown coordinator needs a tokio runtime: {}", e))
        })?;

        debug!(
            poll_interval_seconds = settings.poll_interval_seconds,
            countdown_seconds = settings.countdown_seconds,
            "Created shutdown coordinator"
        );

        Ok(Arc::new(Self {
            settings,
            notifier,
            population,
            persistence,
            process,
            runtime,
            state: Mutex::new(ShutdownState::default()),
        }))
    }

    /// Start the countdown unless one is already running
    pub fn schedule(self: &Arc<Self>) {
        let _ = self.launch_countdown();
    }

    /// Disarm the countdown. Does nothing if none is running.
    pub fn cancel(&self) {
        let in_progress = {
            let mut state = self.state.lock();
            state.armed = false;
            if let Some(activation) = state.activation.take() {
                activation.cancel();
            }
            state.in_progress
        };

        if in_progress {
            debug!("Cancel arrived after the shutdown action started; it will complete");
        }
        info!("Shutdown countdown canceled");
        self.notifier.info("Player (re)connected. Canceling shutdown.");
    }

    /// Number of members currently connected
    pub fn active_population_count(&self) -> usize {
        self.population.count()
    }

    pub(super) fn launch_countdown(self: &Arc<Self>) -> Option<JoinHandle<CountdownOutcome>> {
        let activation = {
            let mut state = self.state.lock();
            if state.in_progress {
                debug!("Shutdown already in progress, ignoring schedule");
                return None;
            }
            if state.armed {
                debug!("Shutdown already scheduled, ignoring schedule");
                return None;
            }

            let activation = CancellationToken::new();
            state.armed = true;
            state.waited_seconds = 0;
            state.activation = Some(activation.clone());
            activation
        };

        info!(
            countdown_seconds = self.settings.countdown_seconds,
            "Shutdown countdown scheduled"
        );
        self.notifier.info("Server is empty. Scheduling shut down.");

        let coordinator = Arc::clone(self);
        Some(
            self.runtime
                .spawn(async move { coordinator.run_countdown(activation).await }),
        )
    }
}
