pub mod config;
pub mod error;
pub mod host;
pub mod notify;
pub mod persistence;
pub mod population;
pub mod process;
pub mod watcher;

pub use config::{HostConfig, NotifyConfig, ShutdownConfig, WatcherConfig};
pub use error::{Result, ShutdownError};
pub use host::{Command, CommandOutcome, Host, ShutdownReason};
pub use notify::{
    ChatSink, ConsoleSink, LogChannel, LogLevel, NotificationSink, Notifier, RoutingSink,
};
pub use persistence::{Persistence, SnapshotStore, WorldSnapshot};
pub use population::{PopulationSource, Roster};
pub use process::{HostProcess, ProcessControl};
pub use watcher::{
    CountdownOutcome, PopulationMonitor, ShutdownCoordinator, ShutdownStatus, StartupHook,
    FORCE_EXIT_CODE, FORCE_EXIT_GRACE,
};
