use crate::error::{Result, ShutdownError};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::debug;

/// Prefix prepended to every delivered notification
pub const MESSAGE_PREFIX: &str = "[EmptyShutdown]";

/// Verbosity of a notification, ordered from quietest to most verbose
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    None,
    Info,
    Debug,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::None => "none",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        }
    }

    /// Whether a message at `level` passes when `self` is the configured level
    pub fn allows(&self, level: LogLevel) -> bool {
        *self >= level
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output channel a notification is delivered on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogChannel {
    Console,
    Chat,
    All,
}

impl LogChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogChannel::Console => "console",
            LogChannel::Chat => "chat",
            LogChannel::All => "all",
        }
    }

    pub fn includes_console(&self) -> bool {
        matches!(self, LogChannel::Console | LogChannel::All)
    }

    pub fn includes_chat(&self) -> bool {
        matches!(self, LogChannel::Chat | LogChannel::All)
    }
}

impl fmt::Display for LogChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Destination for player- and operator-facing messages.
///
/// Sinks deliver whatever they are handed; level filtering happens once in
/// [`Notifier`].
pub trait NotificationSink: Send + Sync {
    fn notify(&self, message: &str, level: LogLevel, channel: LogChannel) -> Result<()>;
}

/// Writes notifications line by line to the server console
pub struct ConsoleSink {
    writer: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleSink {
    pub fn stdout() -> Self {
        Self::with_writer(Box::new(std::io::stdout()))
    }

    pub fn with_writer(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }
}

impl NotificationSink for ConsoleSink {
    fn notify(&self, message: &str, _level: LogLevel, _channel: LogChannel) -> Result<()> {
        let mut writer = self.writer.lock();
        writeln!(writer, "{}", message)?;
        writer.flush()?;
        Ok(())
    }
}

/// Broadcasts notifications to every connected chat subscriber
#[derive(Clone)]
pub struct ChatSink {
    sender: broadcast::Sender<String>,
}

impl ChatSink {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.sender.subscribe()
    }
}

impl NotificationSink for ChatSink {
    fn notify(&self, message: &str, _level: LogLevel, _channel: LogChannel) -> Result<()> {
        // Nobody listening is the normal case on an empty server.
        if self.sender.receiver_count() == 0 {
            return Ok(());
        }
        self.sender
            .send(message.to_string())
            .map(|_| ())
            .map_err(|e| ShutdownError::notification("chat".to_string(), e.to_string()))
    }
}

/// Routes each notification to the console, the chat, or both
pub struct RoutingSink {
    console: Arc<dyn NotificationSink>,
    chat: Arc<dyn NotificationSink>,
}

impl RoutingSink {
    pub fn new(console: Arc<dyn NotificationSink>, chat: Arc<dyn NotificationSink>) -> Self {
        Self { console, chat }
    }
}

impl NotificationSink for RoutingSink {
    fn notify(&self, message: &str, level: LogLevel, channel: LogChannel) -> Result<()> {
        let chat = if channel.includes_chat() {
            self.chat.notify(message, level, channel)
        } else {
            Ok(())
        };
        let console = if channel.includes_console() {
            self.console.notify(message, level, channel)
        } else {
            Ok(())
        };
        chat.and(console)
    }
}

/// Applies the configured level and channel before handing messages to a sink
#[derive(Clone)]
pub struct Notifier {
    sink: Arc<dyn NotificationSink>,
    level: LogLevel,
    channel: LogChannel,
}

impl Notifier {
    pub fn new(sink: Arc<dyn NotificationSink>, level: LogLevel, channel: LogChannel) -> Self {
        Self {
            sink,
            level,
            channel,
        }
    }

    /// Deliver `message` if `level` is enabled. Sink failures never propagate.
    pub fn notify(&self, message: &str, level: LogLevel) {
        if !self.level.allows(level) {
            return;
        }

        let message = format!("{} {}", MESSAGE_PREFIX, message);
        if let Err(e) = self.sink.notify(&message, level, self.channel) {
            debug!(error = %e, channel = %self.channel, "Dropped notification");
        }
    }

    pub fn info(&self, message: &str) {
        self.notify(message, LogLevel::Info);
    }

    pub fn debug(&self, message: &str) {
        self.notify(message, LogLevel::Debug);
    }
}

impl fmt::Debug for Notifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier")
            .field("level", &self.level)
            .field("channel", &self.channel)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl SharedBuffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().clone()).unwrap()
        }
    }

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    struct BrokenWriter;

    impl Write for BrokenWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_level_ordering() {
        assert!(LogLevel::Debug.allows(LogLevel::Info));
        assert!(LogLevel::Debug.allows(LogLevel::Debug));
        assert!(LogLevel::Info.allows(LogLevel::Info));
        assert!(!LogLevel::Info.allows(LogLevel::Debug));
        assert!(!LogLevel::None.allows(LogLevel::Info));
        assert!(LogLevel::None.allows(LogLevel::None));
    }

    #[test]
    fn test_notifier_filters_by_level() {
        let buffer = SharedBuffer::default();
        let console = Arc::new(ConsoleSink::with_writer(Box::new(buffer.clone())));
        let notifier = Notifier::new(console, LogLevel::Info, LogChannel::Console);

        notifier.info("scheduling");
        notifier.debug("waited 1 seconds");

        let output = buffer.contents();
        assert_eq!(output, "[EmptyShutdown] scheduling\n");
    }

    #[test]
    fn test_routing_sink_respects_channel() {
        let buffer = SharedBuffer::default();
        let console: Arc<dyn NotificationSink> =
            Arc::new(ConsoleSink::with_writer(Box::new(buffer.clone())));
        let chat = ChatSink::new(8);
        let mut chat_rx = chat.subscribe();
        let routing = Arc::new(RoutingSink::new(console, Arc::new(chat.clone())));

        Notifier::new(routing.clone(), LogLevel::Info, LogChannel::Chat).info("chat only");
        assert_eq!(chat_rx.try_recv().unwrap(), "[EmptyShutdown] chat only");
        assert!(buffer.contents().is_empty());

        Notifier::new(routing.clone(), LogLevel::Info, LogChannel::Console).info("console only");
        assert!(chat_rx.try_recv().is_err());
        assert_eq!(buffer.contents(), "[EmptyShutdown] console only\n");

        Notifier::new(routing, LogLevel::Info, LogChannel::All).info("both");
        assert_eq!(chat_rx.try_recv().unwrap(), "[EmptyShutdown] both");
        assert!(buffer.contents().ends_with("[EmptyShutdown] both\n"));
    }

    #[test]
    fn test_chat_without_subscribers_is_not_an_error() {
        let chat = ChatSink::new(4);
        assert!(chat
            .notify("nobody home", LogLevel::Info, LogChannel::Chat)
            .is_ok());
    }

    #[test]
    fn test_sink_failure_is_swallowed() {
        let console = Arc::new(ConsoleSink::with_writer(Box::new(BrokenWriter)));
        assert!(console
            .notify("lost", LogLevel::Info, LogChannel::Console)
            .is_err());

        let notifier = Notifier::new(console, LogLevel::Debug, LogChannel::Console);
        notifier.info("lost");
        notifier.debug("lost too");
    }
}
