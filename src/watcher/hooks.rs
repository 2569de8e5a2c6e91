use super::ShutdownCoordinator;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Translates connect and disconnect events into schedule and cancel calls
#[derive(Clone)]
pub struct PopulationMonitor {
    coordinator: Arc<ShutdownCoordinator>,
}

impl PopulationMonitor {
    pub fn new(coordinator: Arc<ShutdownCoordinator>) -> Self {
        Self { coordinator }
    }

    /// A member connected
    pub fn member_joined(&self) {
        self.coordinator.cancel();
    }

    /// A member disconnected and has already been removed from the population
    pub fn member_left(&self) {
        let remaining = self.coordinator.active_population_count();
        debug!(remaining, "Member left");
        if remaining == 0 {
            self.coordinator.schedule();
        }
    }
}

/// Schedules a shutdown on the first host tick when configured to
pub struct StartupHook {
    coordinator: Arc<ShutdownCoordinator>,
    enabled: bool,
    fired: AtomicBool,
}

impl StartupHook {
    pub fn new(coordinator: Arc<ShutdownCoordinator>, enabled: bool) -> Self {
        Self {
            coordinator,
            enabled,
            fired: AtomicBool::new(false),
        }
    }

    /// Call on every host tick; only the first call has any effect
    pub fn on_first_tick(&self) {
        if self.fired.swap(true, Ordering::SeqCst) {
            return;
        }
        if self.enabled {
            debug!("Scheduling shutdown after startup");
            self.coordinator.schedule();
        }
    }
}
