// User-visible notices (toasts). Rendering is left to the host.

use std::time::Duration;

pub const ERROR_DURATION: Duration = Duration::from_millis(2500);
pub const SUCCESS_DURATION: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub description: Option<String>,
    pub duration: Duration,
}

impl Notice {
    pub fn success(title: &str) -> Self {
        Self {
            level: NoticeLevel::Success,
            title: title.to_string(),
            description: None,
            duration: SUCCESS_DURATION,
        }
    }

    pub fn warning(title: &str, description: &str) -> Self {
        Self {
            level: NoticeLevel::Warning,
            title: title.to_string(),
            description: Some(description.to_string()),
            duration: ERROR_DURATION,
        }
    }

    pub fn error(title: &str) -> Self {
        Self {
            level: NoticeLevel::Error,
            title: title.to_string(),
            description: None,
            duration: ERROR_DURATION,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

/// Notices raised since the host last drained them.
#[derive(Debug, Clone, Default)]
pub struct Notices {
    queue: Vec<Notice>,
}

impl Notices {
    pub fn push(&mut self, notice: Notice) {
        match notice.level {
            NoticeLevel::Error => tracing::warn!("Notice: {}", notice.title),
            _ => tracing::debug!("Notice: {}", notice.title),
        }
        self.queue.push(notice);
    }

    pub fn drain(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.queue)
    }

    pub fn last(&self) -> Option<&Notice> {
        self.queue.last()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
