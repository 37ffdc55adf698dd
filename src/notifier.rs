use std::sync::Arc;

use tokio::sync::mpsc;

use crate::models::{Notice, Severity};

/// Notifier
///
/// Fire-and-forget display of a transient message. Implementations must not
/// block the navigation that triggered the notice; dismissal after
/// `Notice::duration_ms` is the display layer's job.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: &Notice);
}

pub type NotifierState = Arc<dyn Notifier>;

/// TracingNotifier
///
/// Emits every notice as a structured log event, for headless runtimes that
/// have no screen to draw on.
#[derive(Debug, Default, Clone)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: &Notice) {
        match notice.severity {
            Severity::Info => tracing::info!(text = %notice.message, "notice"),
            Severity::Warning => tracing::warn!(text = %notice.message, "notice"),
            Severity::Error => tracing::error!(text = %notice.message, "notice"),
        }
    }
}

/// ChannelNotifier
///
/// Forwards notices to a UI shell over an unbounded channel. A closed
/// receiver means nobody is watching any more; the notice is dropped.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Notice>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notice>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notice: &Notice) {
        if self.tx.send(notice.clone()).is_err() {
            tracing::debug!(text = %notice.message, "notice dropped, no receiver");
        }
    }
}
