use serde::Serialize;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Warning,
    Error,
}

/// Short user-facing message the glue layer renders and auto-dismisses.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub severity: Severity,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Success,
        }
    }

    pub fn new(message: impl Into<String>, severity: Severity) -> Self {
        Self {
            message: message.into(),
            severity,
        }
    }
}

pub trait NotificationSink: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Writes every notice to the log; the HTTP server has no push channel.
#[derive(Debug, Clone, Default)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn notify(&self, notice: Notice) {
        match notice.severity {
            Severity::Success => info!(text = %notice.message, "notice"),
            Severity::Warning | Severity::Error => {
                warn!(text = %notice.message, severity = ?notice.severity, "notice")
            }
        }
    }
}

#[cfg(test)]
pub use recording::RecordingSink;
