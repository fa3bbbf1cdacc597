//! Event relevance and trigger throttling.

use std::time::{Duration, Instant};

use notify::{EventKind, event::ModifyKind};

/// Leading-edge debouncer: the first change triggers at once, and further
/// changes within `window` of that trigger are dropped.
#[derive(Debug)]
pub(super) struct Debouncer {
    window: Duration,
    last_trigger: Option<Instant>,
}

impl Debouncer {
    pub(super) const fn new(window: Duration) -> Self {
        Self {
            window,
            last_trigger: None,
        }
    }

    /// Record a change at `now`; true when it should regenerate.
    pub(super) fn should_trigger(&mut self, now: Instant) -> bool {
        if let Some(last) = self.last_trigger
            && now.saturating_duration_since(last) < self.window
        {
            return false;
        }
        self.last_trigger = Some(now);
        true
    }
}

/// Creates and content/name modifications count; metadata-only changes
/// (mtime, atime, chmod) and removals do not.
pub(super) fn is_content_change(kind: &EventKind) -> bool {
    match kind {
        EventKind::Create(_) => true,
        EventKind::Modify(modify) => !matches!(modify, ModifyKind::Metadata(_)),
        _ => false,
    }
}
