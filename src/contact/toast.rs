use std::collections::VecDeque;

pub const AUTO_CLOSE_MS: u64 = 5_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
    pub created_ms: u64,
}

/// Transient notifications, oldest first, each visible for `auto_close_ms`.
#[derive(Debug, Clone)]
pub struct ToastQueue {
    auto_close_ms: u64,
    items: VecDeque<Toast>,
}

impl Default for ToastQueue {
    fn default() -> Self {
        Self::new(AUTO_CLOSE_MS)
    }
}

impl ToastQueue {
    pub fn new(auto_close_ms: u64) -> Self {
        Self {
            auto_close_ms,
            items: VecDeque::new(),
        }
    }

    pub fn success(&mut self, message: &str, now_ms: u64) {
        self.push(ToastKind::Success, message, now_ms);
    }

    pub fn error(&mut self, message: &str, now_ms: u64) {
        self.push(ToastKind::Error, message, now_ms);
    }

    fn push(&mut self, kind: ToastKind, message: &str, now_ms: u64) {
        self.prune(now_ms);
        self.items.push_back(Toast {
            kind,
            message: message.to_string(),
            created_ms: now_ms,
        });
    }

    /// Drop toasts whose auto-close time has passed.
    pub fn prune(&mut self, now_ms: u64) {
        let ttl = self.auto_close_ms;
        self.items
            .retain(|t| now_ms.saturating_sub(t.created_ms) < ttl);
    }

    pub fn visible(&self, now_ms: u64) -> Vec<&Toast> {
        self.items
            .iter()
            .filter(|t| now_ms.saturating_sub(t.created_ms) < self.auto_close_ms)
            .collect()
    }

    pub fn latest(&self) -> Option<&Toast> {
        self.items.back()
    }

    pub fn dismiss_all(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
