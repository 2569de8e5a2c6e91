mod action;
mod coordinator;
mod countdown;
mod hooks;
mod state;
mod types;

#[cfg(test)]
mod mock;

pub use coordinator::ShutdownCoordinator;
pub use hooks::{PopulationMonitor, StartupHook};
pub use types::{CountdownOutcome, ShutdownStatus, FORCE_EXIT_CODE, FORCE_EXIT_GRACE};
