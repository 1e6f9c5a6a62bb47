use std::time::{Duration, Instant};

use crate::constants::NOTICE_DISMISS_SECS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    shown_at: Instant,
}

impl Notice {
    pub fn is_error(&self) -> bool {
        self.kind == NoticeKind::Error
    }
}

/// Holds at most one notice; a new one replaces the old. Notices dismiss
/// themselves after a fixed time.
#[derive(Debug, Clone)]
pub struct NoticeBoard {
    current: Option<Notice>,
    ttl: Duration,
}

impl Default for NoticeBoard {
    fn default() -> Self {
        Self::new(Duration::from_secs(NOTICE_DISMISS_SECS))
    }
}

impl NoticeBoard {
    pub fn new(ttl: Duration) -> Self {
        Self { current: None, ttl }
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.show(NoticeKind::Success, message.into(), Instant::now());
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.show(NoticeKind::Error, message.into(), Instant::now());
    }

    pub fn show(&mut self, kind: NoticeKind, message: String, at: Instant) {
        self.current = Some(Notice {
            kind,
            message,
            shown_at: at,
        });
    }

    pub fn current(&self) -> Option<&Notice> {
        self.current_at(Instant::now())
    }

    pub fn current_at(&self, now: Instant) -> Option<&Notice> {
        self.current
            .as_ref()
            .filter(|notice| now.saturating_duration_since(notice.shown_at) < self.ttl)
    }
}
