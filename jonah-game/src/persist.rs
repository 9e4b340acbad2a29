/// Trailing-edge debounce keyed on a revision counter.
///
/// Each newly observed revision pushes the deadline out by one window, so a
/// burst of changes produces a single write carrying the newest snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveDebouncer {
    window_ms: u64,
    observed_revision: u64,
    deadline_ms: Option<u64>,
}

impl SaveDebouncer {
    #[must_use]
    pub const fn new(window_ms: u32) -> Self {
        Self {
            window_ms: window_ms as u64,
            observed_revision: 0,
            deadline_ms: None,
        }
    }

    /// Record the store revision seen at `now_ms`.
    pub fn observe(&mut self, revision: u64, now_ms: u64) {
        if revision != self.observed_revision {
            self.observed_revision = revision;
            self.deadline_ms = Some(now_ms.saturating_add(self.window_ms));
        }
    }

    /// Start a window at `now_ms` unless one is already running; used when a
    /// write is still owed for a revision already observed.
    pub fn arm_if_idle(&mut self, now_ms: u64) {
        if self.deadline_ms.is_none() {
            self.deadline_ms = Some(now_ms.saturating_add(self.window_ms));
        }
    }

    #[must_use]
    pub fn is_due(&self, now_ms: u64) -> bool {
        self.deadline_ms.is_some_and(|deadline| now_ms >= deadline)
    }

    #[must_use]
    pub const fn is_armed(&self) -> bool {
        self.deadline_ms.is_some()
    }

    /// Disarm after a write (or a deliberate skip) for the observed revision.
    pub fn settle(&mut self) {
        self.deadline_ms = None;
    }

    /// Forget everything; the next observed revision re-arms.
    pub fn resync(&mut self, revision: u64) {
        self.observed_revision = revision;
        self.deadline_ms = None;
    }

    #[must_use]
    pub const fn window_ms(&self) -> u64 {
        self.window_ms
    }
}
