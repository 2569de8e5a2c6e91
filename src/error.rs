use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShutdownError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Notification error on {channel} channel: {message}")]
    Notification { channel: String, message: String },

    #[error("Persistence error: {message}")]
    Persistence { message: String },

    #[error("System error: {message}")]
    System { message: String },
}

impl ShutdownError {
    pub fn system<S: Into<String>>(message: S) -> Self {
        Self::System {
            message: message.into(),
        }
    }

    pub fn persistence<S: Into<String>>(message: S) -> Self {
        Self::Persistence {
            message: message.into(),
        }
    }

    pub fn notification<S: Into<String>>(channel: S, message: S) -> Self {
        Self::Notification {
            channel: channel.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ShutdownError>;
