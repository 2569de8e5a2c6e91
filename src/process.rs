use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Ends the hosting process
pub trait ProcessControl: Send + Sync {
    /// Ask the host to shut down on its own schedule
    fn request_shutdown(&self);

    /// Terminate the process immediately
    fn force_exit(&self, code: i32);
}

/// Process control for the bundled host: a graceful request cancels the token
/// the host's main loop is waiting on.
#[derive(Debug, Clone, Default)]
pub struct HostProcess {
    shutdown_token: CancellationToken,
}

impl HostProcess {
    pub fn new() -> Self {
        Self::default()
    }

    /// Token cancelled once a graceful shutdown has been requested
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown_token.clone()
    }

    pub fn is_shutdown_requested(&self) -> bool {
        self.shutdown_token.is_cancelled()
    }
}

impl ProcessControl for HostProcess {
    fn request_shutdown(&self) {
        info!("Graceful shutdown requested");
        self.shutdown_token.cancel();
    }

    fn force_exit(&self, code: i32) {
        warn!("Forcing process exit with code {}", code);
        std::process::exit(code);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_request_shutdown_cancels_token() {
        let process = HostProcess::new();
        let token = process.shutdown_token();
        assert!(!process.is_shutdown_requested());

        process.request_shutdown();

        token.cancelled().await;
        assert!(process.is_shutdown_requested());
    }
}
