mod console;
mod runtime;

pub use console::{Command, CommandOutcome};
pub use runtime::ShutdownReason;

use crate::config::ShutdownConfig;
use crate::error::Result;
use crate::notify::{ChatSink, ConsoleSink, Notifier, RoutingSink};
use crate::persistence::SnapshotStore;
use crate::population::Roster;
use crate::process::HostProcess;
use crate::watcher::{PopulationMonitor, ShutdownCoordinator, StartupHook};
use std::sync::Arc;
use tracing::debug;

/// Console-driven stand-in for a dedicated game server.
///
/// Players are added and removed with stdin commands; the watcher sees them
/// through the shared [`Roster`].
pub struct Host {
    roster: Arc<Roster>,
    chat: ChatSink,
    process: HostProcess,
    store: Arc<SnapshotStore>,
    coordinator: Arc<ShutdownCoordinator>,
    monitor: PopulationMonitor,
    startup: StartupHook,
}

impl Host {
    /// Wire the watcher to the console host. Must be called inside a tokio runtime.
    pub fn new(config: &ShutdownConfig) -> Result<Self> {
        Self::with_console(config, Arc::new(ConsoleSink::stdout()))
    }

    /// Like [`Host::new`] with a custom console sink
    pub fn with_console(config: &ShutdownConfig, console: Arc<ConsoleSink>) -> Result<Self> {
        let roster = Arc::new(Roster::new());
        let chat = ChatSink::new(config.host.chat_capacity);
        let process = HostProcess::new();
        let store = Arc::new(SnapshotStore::new(
            config.host.save_path.as_str(),
            Arc::clone(&roster),
        ));

        let sink = Arc::new(RoutingSink::new(console, Arc::new(chat.clone())));
        let notifier = Notifier::new(sink, config.notify.log_level, config.notify.log_channel);

        let coordinator = ShutdownCoordinator::new(
            config.watcher.clone(),
            notifier,
            roster.clone(),
            store.clone(),
            Arc::new(process.clone()),
        )?;
        let monitor = PopulationMonitor::new(Arc::clone(&coordinator));
        let startup = StartupHook::new(
            Arc::clone(&coordinator),
            config.watcher.shutdown_on_empty_at_startup,
        );

        debug!("Host created, snapshots go to {}", store.path().display());

        Ok(Self {
            roster,
            chat,
            process,
            store,
            coordinator,
            monitor,
            startup,
        })
    }

    pub fn coordinator(&self) -> &Arc<ShutdownCoordinator> {
        &self.coordinator
    }
}
