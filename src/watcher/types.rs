use std::time::Duration;

/// Time the host gets to exit on its own after a graceful shutdown request
pub const FORCE_EXIT_GRACE: Duration = Duration::from_secs(3);

/// Exit code used when the watchdog terminates the process
pub const FORCE_EXIT_CODE: i32 = 0;

/// How a countdown loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownOutcome {
    /// The server stayed empty for the whole countdown and was shut down
    Expired { waited_seconds: u32 },
    /// The countdown was canceled before it ran out
    Aborted { waited_seconds: u32 },
}

/// Point-in-time view of the coordinator state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShutdownStatus {
    pub armed: bool,
    pub waited_seconds: u32,
    pub in_progress: bool,
}
