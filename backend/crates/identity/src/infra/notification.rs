//! Notification Transports
//!
//! Outbound mail delivery is not part of this service. [`TracingTransport`]
//! hands each message to the log stream; [`RecordingTransport`] keeps them in
//! memory for inspection.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::domain::repository::NotificationTransport;
use crate::error::{IdentityError, IdentityResult};

/// Writes each notification as an `info` event. The body contains the code,
/// so it is only logged (at `debug`) in debug builds.
#[derive(Debug, Clone)]
pub struct TracingTransport {
    sender: String,
}

impl TracingTransport {
    pub fn new(sender: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
        }
    }
}

impl NotificationTransport for TracingTransport {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> IdentityResult<()> {
        tracing::info!(
            from = %self.sender,
            to = %recipient,
            subject,
            body_len = body.len(),
            "Notification dispatched"
        );
        if cfg!(debug_assertions) {
            tracing::debug!(to = %recipient, body, "Notification body");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentNotification {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

impl SentNotification {
    /// Digits following "code is: " in the body.
    pub fn extract_code(&self) -> Option<String> {
        let (_, rest) = self.body.split_once("code is: ")?;
        let code: String = rest.chars().take_while(char::is_ascii_digit).collect();
        (!code.is_empty()).then_some(code)
    }
}

/// Keeps sent notifications in memory. Can be switched to fail.
#[derive(Debug, Clone, Default)]
pub struct RecordingTransport {
    sent: Arc<Mutex<Vec<SentNotification>>>,
    fail: Arc<AtomicBool>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_sends(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<SentNotification> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }

    pub fn last_code_for(&self, recipient: &str) -> Option<String> {
        self.sent()
            .iter()
            .rev()
            .find(|n| n.recipient == recipient)
            .and_then(SentNotification::extract_code)
    }
}

impl NotificationTransport for RecordingTransport {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> IdentityResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(IdentityError::Notification("transport unavailable".into()));
        }

        let mut sent = self
            .sent
            .lock()
            .map_err(|_| IdentityError::Internal("notification log poisoned".into()))?;
        sent.push(SentNotification {
            recipient: recipient.to_owned(),
            subject: subject.to_owned(),
            body: body.to_owned(),
        });
        Ok(())
    }
}
