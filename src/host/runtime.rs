use super::{Command, CommandOutcome, Host};
use crate::error::{Result, ShutdownError};
use crate::persistence::Persistence;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tokio::sync::{broadcast, oneshot, Mutex};
use tracing::{error, info, warn};

/// Interval at which the host advances its world
const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Why the host stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShutdownReason {
    /// The watcher asked the host to stop
    Idle,
    Signal(String),
    ConsoleQuit,
}

impl Host {
    /// Run the host until the watcher, a signal, or the console stops it
    pub async fn run(&self) -> Result<i32> {
        info!("Host is running");

        let (signal_sender, mut signal_receiver) = oneshot::channel();
        self.setup_signal_handlers(signal_sender).await;
        self.spawn_chat_printer();

        let shutdown_token = self.process.shutdown_token();
        let mut ticker = tokio::time::interval(TICK_INTERVAL);
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut console_open = true;

        let reason = loop {
            tokio::select! {
                _ = shutdown_token.cancelled() => break ShutdownReason::Idle,
                received = &mut signal_receiver => {
                    break received.map_err(|_| {
                        ShutdownError::system("Signal channel closed unexpectedly")
                    })?;
                }
                _ = ticker.tick() => self.startup.on_first_tick(),
                line = lines.next_line(), if console_open => match line {
                    Ok(Some(line)) => match self.execute(Command::parse(&line)).await {
                        Ok(CommandOutcome::Quit) => break ShutdownReason::ConsoleQuit,
                        Ok(CommandOutcome::Reply(reply)) if !reply.is_empty() => {
                            println!("{}", reply)
                        }
                        Ok(CommandOutcome::Reply(_)) => {}
                        Err(e) => error!("Command failed: {}", e),
                    },
                    Ok(None) => {
                        info!("Console input closed, continuing without it");
                        console_open = false;
                    }
                    Err(e) => {
                        warn!("Failed to read console input: {}", e);
                        console_open = false;
                    }
                },
            }
        };

        info!("Shutdown initiated: {:?}", reason);

        // The watcher saved already; every other path still has to.
        if reason != ShutdownReason::Idle {
            self.save_before_exit().await;
        }

        info!("Host shutdown complete");
        Ok(0)
    }

    pub(super) async fn save_before_exit(&self) {
        if let Err(e) = self.store.save_state(true).await {
            error!("Failed to save before exit: {}", e);
        }
    }

    fn spawn_chat_printer(&self) {
        let mut receiver = self.chat.subscribe();
        tokio::spawn(async move {
            loop {
                match receiver.recv().await {
                    Ok(message) => println!("<chat> {}", message),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!("Chat printer lagged, skipped {} messages", skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
    }

    /// Set up signal handlers for graceful shutdown
    async fn setup_signal_handlers(&self, shutdown_sender: oneshot::Sender<ShutdownReason>) {
        let shutdown_sender = Arc::new(Mutex::new(Some(shutdown_sender)));

        // Handle SIGTERM - Unix only
        #[cfg(unix)]
        {
            let shutdown_sender_sigterm = Arc::clone(&shutdown_sender);
            match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    tokio::spawn(async move {
                        if sigterm.recv().await.is_some() {
                            info!("Received SIGTERM signal");
                            if let Some(sender) = shutdown_sender_sigterm.lock().await.take() {
                                let _ = sender.send(ShutdownReason::Signal("SIGTERM".to_string()));
                            }
                        }
                    });
                }
                Err(e) => warn!("Failed to register SIGTERM handler: {}", e),
            }
        }

        // Handle SIGINT (Ctrl+C) - Cross-platform
        let shutdown_sender_sigint = Arc::clone(&shutdown_sender);
        tokio::spawn(async move {
            if let Ok(()) = signal::ctrl_c().await {
                info!("Received SIGINT signal (Ctrl+C)");
                if let Some(sender) = shutdown_sender_sigint.lock().await.take() {
                    let _ = sender.send(ShutdownReason::Signal("SIGINT".to_string()));
                }
            }
        });
    }
}
