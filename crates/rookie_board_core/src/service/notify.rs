//! User-visible notification surface (toasts).

use crate::model::item::ItemKey;
use log::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// One non-blocking notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    /// Item the notice refers to, if any.
    pub key: Option<ItemKey>,
}

impl Notice {
    pub fn error(message: impl Into<String>, key: Option<ItemKey>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
            key,
        }
    }

    pub fn info(message: impl Into<String>, key: Option<ItemKey>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
            key,
        }
    }
}

/// Sink for notices. Implementations must not block.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Notifier that only writes notices to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        let key = notice
            .key
            .map_or_else(|| "none".to_string(), |key| key.to_string());
        match notice.level {
            NoticeLevel::Info => info!("event=notice module=service level=info item={key}"),
            NoticeLevel::Error => warn!("event=notice module=service level=error item={key}"),
        }
    }
}
