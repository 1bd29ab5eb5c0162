//! Outbound port for confirmations and transient messages.

use async_trait::async_trait;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

#[async_trait]
pub trait NotificationPort: Send + Sync {
    /// Ask the practitioner to confirm a destructive action.
    async fn confirm(&self, prompt: &str) -> bool;

    fn notify(&self, notice: Notice);
}

/// Writes notices to the log and answers every confirmation with `assume_yes`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier {
    pub assume_yes: bool,
}

#[async_trait]
impl NotificationPort for LogNotifier {
    async fn confirm(&self, prompt: &str) -> bool {
        tracing::info!(prompt, answer = self.assume_yes, "confirmation requested");
        self.assume_yes
    }

    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Success => tracing::info!("{}", notice.message),
            NoticeLevel::Error => tracing::error!("{}", notice.message),
        }
    }
}
