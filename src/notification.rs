use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum NotificationType {
    Success,
    Error,
    Warning,
    #[default]
    Info,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::Success => "success",
            NotificationType::Error => "error",
            NotificationType::Warning => "warning",
            NotificationType::Info => "info",
        }
    }

    /// Title used when a draft arrives without one.
    pub fn default_title(&self) -> &'static str {
        match self {
            NotificationType::Success => "Success",
            NotificationType::Error => "Error",
            NotificationType::Warning => "Warning",
            NotificationType::Info => "Info",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Notification {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub read: bool,
}

/// What a caller supplies when raising a notification. Every field defaults so
/// malformed payloads still produce something displayable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct NotificationDraft {
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
}

impl NotificationDraft {
    pub fn new(
        kind: NotificationType,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NotificationType::Success, title, message)
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NotificationType::Error, title, message)
    }

    pub fn warning(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NotificationType::Warning, title, message)
    }

    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NotificationType::Info, title, message)
    }
}

impl Notification {
    /// Stamp a draft with a fresh id, the current time and `read = false`.
    pub fn from_draft(draft: NotificationDraft) -> Self {
        let title = if draft.title.is_empty() {
            draft.kind.default_title().to_string()
        } else {
            draft.title
        };
        Self {
            id: new_notification_id(),
            kind: draft.kind,
            title,
            message: draft.message,
            timestamp: Utc::now(),
            read: false,
        }
    }
}

pub fn new_notification_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
