//! Short-lived user notices ("toasts").

use std::time::{Duration, Instant};

/// Tone of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
    Info,
}

impl NoticeKind {
    /// Short label used when rendering.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Success => "ok",
            Self::Error => "error",
            Self::Info => "info",
        }
    }
}

/// A human-readable message produced by a state-changing command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    /// How long a notice stays visible before it is dismissed.
    pub const DISPLAY_DURATION: Duration = Duration::from_secs(3);

    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self.kind, NoticeKind::Error)
    }

    /// Whether a notice shown at `shown_at` has been dismissed by `now`.
    #[must_use]
    pub fn is_expired(shown_at: Instant, now: Instant) -> bool {
        now.saturating_duration_since(shown_at) >= Self::DISPLAY_DURATION
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.kind.label(), self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_set_kind() {
        assert_eq!(Notice::success("x").kind, NoticeKind::Success);
        assert!(Notice::error("x").is_error());
        assert_eq!(Notice::info("hola").to_string(), "[info] hola");
    }

    #[test]
    fn test_expiry_after_display_duration() {
        let shown = Instant::now();
        assert!(!Notice::is_expired(shown, shown + Duration::from_millis(2999)));
        assert!(Notice::is_expired(shown, shown + Notice::DISPLAY_DURATION));
        // A clock reading before the notice was shown never counts as expired.
        assert!(!Notice::is_expired(shown + Duration::from_secs(1), shown));
    }
}
