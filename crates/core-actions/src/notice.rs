//! Transient status-line messages.
//!
//! Each notice lives for the configured TTL; the status line shows the newest
//! live one. Expiry is driven by tick events.

use std::collections::VecDeque;
use std::time::{Duration, Instant};
use tracing::{info, warn};

const MAX_NOTICES: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub level: NoticeLevel,
    pub expires_at: Instant,
}

#[derive(Debug)]
pub struct NoticeQueue {
    items: VecDeque<Notice>,
    ttl: Duration,
    total: u64,
}

impl NoticeQueue {
    pub fn new(ttl: Duration) -> Self {
        Self {
            items: VecDeque::new(),
            ttl,
            total: 0,
        }
    }

    pub fn push(&mut self, message: impl Into<String>, level: NoticeLevel, now: Instant) {
        let message = message.into();
        match level {
            NoticeLevel::Info => info!(target: "shell.notice", %message, "notice"),
            NoticeLevel::Error => warn!(target: "shell.notice", %message, "notice"),
        }
        if self.items.len() == MAX_NOTICES {
            self.items.pop_front();
        }
        self.items.push_back(Notice {
            message,
            level,
            expires_at: now + self.ttl,
        });
        self.total += 1;
    }

    /// Drop notices whose deadline has passed. Returns whether any were dropped.
    pub fn expire(&mut self, now: Instant) -> bool {
        let before = self.items.len();
        self.items.retain(|n| n.expires_at > now);
        before != self.items.len()
    }

    /// Newest live notice.
    pub fn current(&self) -> Option<&Notice> {
        self.items.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notice> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Notices pushed since construction, expired ones included.
    pub fn total(&self) -> u64 {
        self.total
    }
}
