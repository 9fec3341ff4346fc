//! Alert channel: an observable, ordered list of transient user-facing messages.
//!
//! The channel is a cheap handle (clone to share). Subscribers receive the whole
//! current list on every change through a [`tokio::sync::watch`] receiver.
//!
//! Expiry clears *all* alerts, not only the one that scheduled it. A push with a
//! non-zero delay replaces any pending clear, so the most recently scheduled
//! clear is the one that fires. Timers run on the tokio clock, which tests pause
//! and advance deterministically.

use serde::Serialize;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub const SUCCESS_CLEAR: Duration = Duration::from_millis(2500);
pub const INFO_CLEAR: Duration = Duration::from_millis(2500);
pub const WARNING_CLEAR: Duration = Duration::from_millis(3500);
pub const ERROR_CLEAR: Duration = Duration::from_millis(4500);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Success,
    Danger,
    Info,
    Warning,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Alert {
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub text: String,
}

#[derive(Clone)]
pub struct AlertChannel {
    inner: Arc<Inner>,
}

struct Inner {
    tx: watch::Sender<Vec<Alert>>,
    pending_clear: Mutex<Option<JoinHandle<()>>>,
}

impl Default for AlertChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl AlertChannel {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Vec::new());
        Self {
            inner: Arc::new(Inner {
                tx,
                pending_clear: Mutex::new(None),
            }),
        }
    }

    /// Append an alert. A zero `auto_clear` keeps it until the next clear.
    pub fn push(&self, kind: AlertKind, text: impl Into<String>, auto_clear: Duration) {
        let alert = Alert {
            kind,
            text: text.into(),
        };
        tracing::debug!(kind = ?alert.kind, text = %alert.text, "alert");
        self.inner.tx.send_modify(|alerts| alerts.push(alert));
        if !auto_clear.is_zero() {
            self.schedule_clear(auto_clear);
        }
    }

    pub fn success(&self, text: impl Into<String>) {
        self.push(AlertKind::Success, text, SUCCESS_CLEAR);
    }

    pub fn info(&self, text: impl Into<String>) {
        self.push(AlertKind::Info, text, INFO_CLEAR);
    }

    pub fn warn(&self, text: impl Into<String>) {
        self.push(AlertKind::Warning, text, WARNING_CLEAR);
    }

    pub fn error(&self, text: impl Into<String>) {
        self.push(AlertKind::Danger, text, ERROR_CLEAR);
    }

    /// Remove every alert and cancel any pending expiry.
    pub fn clear(&self) {
        if let Some(handle) = self.take_pending() {
            handle.abort();
        }
        self.inner.tx.send_replace(Vec::new());
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<Alert>> {
        self.inner.tx.subscribe()
    }

    pub fn snapshot(&self) -> Vec<Alert> {
        self.inner.tx.borrow().clone()
    }

    fn schedule_clear(&self, delay: Duration) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("no tokio runtime; alert will not expire");
            return;
        };
        let weak = Arc::downgrade(&self.inner);
        let handle = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(inner) = weak.upgrade() {
                inner.tx.send_replace(Vec::new());
            }
        });
        let previous = self
            .inner
            .pending_clear
            .lock()
            .ok()
            .and_then(|mut slot| slot.replace(handle));
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    fn take_pending(&self) -> Option<JoinHandle<()>> {
        self.inner.pending_clear.lock().ok().and_then(|mut slot| slot.take())
    }
}
