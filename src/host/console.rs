use super::Host;
use crate::error::Result;
use crate::persistence::Persistence;
use crate::population::PopulationSource;
use tracing::{debug, info};

/// A line typed at the host console
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Join(String),
    Leave(String),
    List,
    Save,
    Status,
    Quit,
    Help,
    Empty,
    Unknown(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let mut parts = line.split_whitespace();
        let Some(verb) = parts.next() else {
            return Command::Empty;
        };
        let argument = parts.collect::<Vec<_>>().join(" ");

        match (verb.to_ascii_lowercase().as_str(), argument.is_empty()) {
            ("join", false) => Command::Join(argument),
            ("leave", false) | ("kick", false) => Command::Leave(argument),
            ("list", true) | ("players", true) => Command::List,
            ("save", true) => Command::Save,
            ("status", true) => Command::Status,
            ("quit", true) | ("exit", true) | ("stop", true) => Command::Quit,
            ("help", _) | ("?", _) => Command::Help,
            _ => Command::Unknown(line.trim().to_string()),
        }
    }
}

/// What the runtime should do after a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    Reply(String),
    Quit,
}

const HELP: &str = "commands: join <name>, leave <name>, list, save, status, quit";

impl Host {
    /// Apply one console command
    pub async fn execute(&self, command: Command) -> Result<CommandOutcome> {
        debug!("Console command: {:?}", command);

        let reply = match command {
            Command::Join(name) => {
                if self.roster.join(&name) {
                    info!(player = %name, "Player connected");
                    self.monitor.member_joined();
                    format!("{} joined ({} online)", name, self.roster.count())
                } else {
                    format!("{} is already online", name)
                }
            }
            Command::Leave(name) => {
                if self.roster.leave(&name) {
                    info!(player = %name, "Player disconnected");
                    self.monitor.member_left();
                    format!("{} left ({} online)", name, self.roster.count())
                } else {
                    format!("{} is not online", name)
                }
            }
            Command::List => {
                let online = self.roster.online();
                if online.is_empty() {
                    "no players online".to_string()
                } else {
                    format!("{} online: {}", online.len(), online.join(", "))
                }
            }
            Command::Save => {
                self.store.save_state(false).await?;
                format!("saving to {}", self.store.path().display())
            }
            Command::Status => {
                let status = self.coordinator.status();
                format!(
                    "online={} armed={} waited={}s shutting_down={}",
                    self.coordinator.active_population_count(),
                    status.armed,
                    status.waited_seconds,
                    status.in_progress
                )
            }
            Command::Quit => return Ok(CommandOutcome::Quit),
            Command::Help => HELP.to_string(),
            Command::Empty => String::new(),
            Command::Unknown(line) => format!("unknown command '{}'; {}", line, HELP),
        };

        Ok(CommandOutcome::Reply(reply))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ShutdownConfig;
    use crate::notify::ConsoleSink;
    use crate::persistence::WorldSnapshot;
    use std::sync::Arc;

    fn test_host(dir: &tempfile::TempDir) -> Host {
        let mut config = ShutdownConfig::default();
        config.host.save_path = dir.path().join("world.json").to_string_lossy().to_string();
        Host::with_console(&config, Arc::new(ConsoleSink::with_writer(Box::new(std::io::sink()))))
            .unwrap()
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("join alice"), Command::Join("alice".to_string()));
        assert_eq!(
            Command::parse("  JOIN   Big  Bob "),
            Command::Join("Big Bob".to_string())
        );
        assert_eq!(Command::parse("leave alice"), Command::Leave("alice".to_string()));
        assert_eq!(Command::parse("list"), Command::List);
        assert_eq!(Command::parse("save"), Command::Save);
        assert_eq!(Command::parse("quit"), Command::Quit);
        assert_eq!(Command::parse("   "), Command::Empty);
        assert_eq!(Command::parse("join"), Command::Unknown("join".to_string()));
        assert_eq!(
            Command::parse("dance now"),
            Command::Unknown("dance now".to_string())
        );
    }

    #[tokio::test]
    async fn test_last_player_leaving_arms_watcher() {
        let dir = tempfile::tempdir().unwrap();
        let host = test_host(&dir);

        host.execute(Command::Join("alice".into())).await.unwrap();
        host.execute(Command::Join("bob".into())).await.unwrap();
        host.execute(Command::Leave("alice".into())).await.unwrap();
        assert!(!host.coordinator().is_armed());

        host.execute(Command::Leave("bob".into())).await.unwrap();
        assert!(host.coordinator().is_armed());

        host.execute(Command::Join("carol".into())).await.unwrap();
        assert!(!host.coordinator().is_armed());
    }

    #[tokio::test]
    async fn test_unknown_player_leaving_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let host = test_host(&dir);

        let outcome = host.execute(Command::Leave("ghost".into())).await.unwrap();

        assert_eq!(
            outcome,
            CommandOutcome::Reply("ghost is not online".to_string())
        );
        assert!(!host.coordinator().is_armed());
    }

    #[tokio::test]
    async fn test_status_and_quit() {
        let dir = tempfile::tempdir().unwrap();
        let host = test_host(&dir);
        host.execute(Command::Join("alice".into())).await.unwrap();

        let status = host.execute(Command::Status).await.unwrap();
        assert_eq!(
            status,
            CommandOutcome::Reply("online=1 armed=false waited=0s shutting_down=false".into())
        );
        assert_eq!(
            host.execute(Command::Quit).await.unwrap(),
            CommandOutcome::Quit
        );
    }

    #[tokio::test]
    async fn test_shutdown_writes_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let host = test_host(&dir);
        host.execute(Command::Join("alice".into())).await.unwrap();

        host.save_before_exit().await;

        let snapshot = WorldSnapshot::read_from(dir.path().join("world.json"))
            .await
            .unwrap();
        assert_eq!(snapshot.online, vec!["alice".to_string()]);
    }
}
