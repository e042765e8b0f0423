//! Outbound notifications.
//!
//! The generator sends one text summary per run to a configured
//! destination (a chat group, a channel id, ...). Delivery is best effort.

use std::sync::Mutex;

use tracing::info;

use crate::error::NotifyError;

/// Delivers a text message to a destination.
pub trait NotificationSender {
    fn send_message(&self, destination: &str, text: &str) -> Result<(), NotifyError>;
}

/// Writes messages to the log instead of a transport.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSender;

impl NotificationSender for LogSender {
    fn send_message(&self, destination: &str, text: &str) -> Result<(), NotifyError> {
        if destination.is_empty() {
            return Err(NotifyError::MissingDestination);
        }
        info!(destination, lines = text.lines().count(), "notification");
        for line in text.lines() {
            info!(destination, "{line}");
        }
        Ok(())
    }
}

/// Keeps every message in memory.
#[derive(Debug, Default)]
pub struct RecordingSender {
    messages: Mutex<Vec<(String, String)>>,
    fail: bool,
}

impl RecordingSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sender whose every delivery fails.
    pub fn failing() -> Self {
        Self {
            messages: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    /// Messages delivered so far as `(destination, text)`.
    pub fn messages(&self) -> Vec<(String, String)> {
        match self.messages.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl NotificationSender for RecordingSender {
    fn send_message(&self, destination: &str, text: &str) -> Result<(), NotifyError> {
        if self.fail {
            return Err(NotifyError::Transport("delivery refused".to_string()));
        }
        let mut guard = self
            .messages
            .lock()
            .map_err(|_| NotifyError::Transport("recorder lock poisoned".to_string()))?;
        guard.push((destination.to_string(), text.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_sender_keeps_messages() {
        let sender = RecordingSender::new();
        sender.send_message("hr", "hello").unwrap();
        sender.send_message("ops", "world").unwrap();
        assert_eq!(
            sender.messages(),
            vec![
                ("hr".to_string(), "hello".to_string()),
                ("ops".to_string(), "world".to_string())
            ]
        );
    }

    #[test]
    fn test_failing_sender() {
        let sender = RecordingSender::failing();
        assert!(matches!(
            sender.send_message("hr", "hello"),
            Err(NotifyError::Transport(_))
        ));
        assert!(sender.messages().is_empty());
    }

    #[test]
    fn test_log_sender_requires_destination() {
        assert!(LogSender.send_message("hr", "a\nb").is_ok());
        assert!(matches!(
            LogSender.send_message("", "a"),
            Err(NotifyError::MissingDestination)
        ));
    }
}
