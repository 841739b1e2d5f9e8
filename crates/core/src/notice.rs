//! Transient success/error notices with a fixed display duration.

use std::time::{Duration, Instant};

/// How long a notice stays visible unless configured otherwise.
pub const DEFAULT_NOTICE_DURATION: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub text: String,
    pub kind: NoticeKind,
}

impl Notice {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: NoticeKind::Success,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: NoticeKind::Error,
        }
    }
}

/// Holds at most one notice. Showing a new one replaces the old one and
/// restarts the timer.
#[derive(Debug)]
pub struct Notifier {
    duration: Duration,
    current: Option<(Notice, Instant)>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(DEFAULT_NOTICE_DURATION)
    }
}

impl Notifier {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            current: None,
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn show(&mut self, notice: Notice) {
        self.show_at(notice, Instant::now());
    }

    pub fn show_at(&mut self, notice: Notice, now: Instant) {
        self.current = Some((notice, now));
    }

    /// The visible notice, if it has not expired yet.
    pub fn current(&self) -> Option<&Notice> {
        self.current_at(Instant::now())
    }

    pub fn current_at(&self, now: Instant) -> Option<&Notice> {
        self.current
            .as_ref()
            .filter(|(_, shown_at)| now.saturating_duration_since(*shown_at) < self.duration)
            .map(|(notice, _)| notice)
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notice_expires_after_duration() {
        let mut notifier = Notifier::default();
        let t0 = Instant::now();
        notifier.show_at(Notice::success("Template saved"), t0);

        assert_eq!(
            notifier.current_at(t0 + Duration::from_millis(2999)),
            Some(&Notice::success("Template saved"))
        );
        assert_eq!(notifier.current_at(t0 + DEFAULT_NOTICE_DURATION), None);
    }

    #[test]
    fn new_notice_replaces_and_restarts_timer() {
        let mut notifier = Notifier::new(Duration::from_secs(1));
        let t0 = Instant::now();
        notifier.show_at(Notice::success("first"), t0);
        notifier.show_at(Notice::error("second"), t0 + Duration::from_millis(900));

        let shown = notifier
            .current_at(t0 + Duration::from_millis(1500))
            .expect("second notice still visible");
        assert_eq!(shown.text, "second");
        assert_eq!(shown.kind, NoticeKind::Error);
    }

    #[test]
    fn clear_hides_immediately() {
        let mut notifier = Notifier::default();
        notifier.show(Notice::success("gone"));
        notifier.clear();
        assert_eq!(notifier.current(), None);
    }
}
