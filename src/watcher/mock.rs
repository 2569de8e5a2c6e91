use crate::error::{Result, ShutdownError};
use crate::notify::{LogChannel, LogLevel, NotificationSink};
use crate::persistence::Persistence;
use crate::population::PopulationSource;
use crate::process::ProcessControl;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::time::Instant;

/// Sink that records everything it is handed
#[derive(Default)]
pub struct RecordingSink {
    messages: Mutex<Vec<(String, LogLevel)>>,
}

impl RecordingSink {
    pub fn messages(&self) -> Vec<(String, LogLevel)> {
        self.messages.lock().clone()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.messages.lock().iter().any(|(m, _)| m.contains(needle))
    }

    pub fn count_containing(&self, needle: &str) -> usize {
        self.messages
            .lock()
            .iter()
            .filter(|(m, _)| m.contains(needle))
            .count()
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&self, message: &str, level: LogLevel, _channel: LogChannel) -> Result<()> {
        self.messages.lock().push((message.to_string(), level));
        Ok(())
    }
}

/// Population with a settable count
#[derive(Default)]
pub struct FixedPopulation {
    count: AtomicUsize,
}

impl FixedPopulation {
    pub fn set(&self, count: usize) {
        self.count.store(count, Ordering::SeqCst);
    }
}

impl PopulationSource for FixedPopulation {
    fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

/// Persistence that counts saves, optionally slow or failing
#[derive(Default)]
pub struct MockPersistence {
    saves: AtomicUsize,
    blocking_flags: Mutex<Vec<bool>>,
    delay: Option<Duration>,
    fail: bool,
}

impl MockPersistence {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn blocking_flags(&self) -> Vec<bool> {
        self.blocking_flags.lock().clone()
    }
}

#[async_trait]
impl Persistence for MockPersistence {
    async fn save_state(&self, blocking: bool) -> Result<()> {
        self.blocking_flags.lock().push(blocking);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(ShutdownError::persistence("disk full"));
        }
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Process control whose graceful shutdown does nothing, like a hung host
#[derive(Default)]
pub struct MockProcess {
    shutdown_requests: Mutex<Vec<Instant>>,
    force_exits: Mutex<Vec<(i32, Instant)>>,
}

impl MockProcess {
    pub fn shutdown_requests(&self) -> Vec<Instant> {
        self.shutdown_requests.lock().clone()
    }

    pub fn force_exits(&self) -> Vec<(i32, Instant)> {
        self.force_exits.lock().clone()
    }
}

impl ProcessControl for MockProcess {
    fn request_shutdown(&self) {
        self.shutdown_requests.lock().push(Instant::now());
    }

    fn force_exit(&self, code: i32) {
        self.force_exits.lock().push((code, Instant::now()));
    }
}
