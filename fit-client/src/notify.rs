//! User-facing notifications and the external share surface.

use async_trait::async_trait;
use fit_core::ShareMessage;
use std::sync::{Arc, Mutex};

/// How a notice should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Neutral information.
    Info,
    /// The operation succeeded.
    Success,
    /// The operation failed.
    Error,
}

/// A single user-visible notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Short headline.
    pub title: String,
    /// One-sentence explanation.
    pub description: String,
    /// Presentation hint.
    pub severity: Severity,
}

impl Notice {
    /// Success notice.
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            severity: Severity::Success,
        }
    }

    /// Error notice.
    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            severity: Severity::Error,
        }
    }

    /// Informational notice.
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            severity: Severity::Info,
        }
    }
}

/// Sink for user-visible notifications.
pub trait Notifier: Send + Sync {
    /// Show one notice.
    fn notify(&self, notice: Notice);
}

/// Notifier that drops every notice.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _notice: Notice) {}
}

/// Notifier that keeps every notice in memory.
#[derive(Debug, Default, Clone)]
pub struct RecordingNotifier {
    notices: Arc<Mutex<Vec<Notice>>>,
}

impl RecordingNotifier {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Notices received so far.
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().map(|n| n.clone()).unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        if let Ok(mut notices) = self.notices.lock() {
            notices.push(notice);
        }
    }
}

/// Share surface error.
#[derive(Debug, thiserror::Error)]
#[error("share failed: {0}")]
pub struct ShareError(pub String);

/// External surface that publishes a share message (messenger, clipboard...).
#[async_trait]
pub trait ShareSurface: Send + Sync {
    /// Hand `message` to the surface.
    async fn share(&self, message: &ShareMessage) -> Result<(), ShareError>;
}
