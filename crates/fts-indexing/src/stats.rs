//! Counters describing what the controller has done.

/// Running totals for a controller's lifetime.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ControllerStats {
    /// Tasks applied without error
    pub tasks_applied: usize,
    /// Tasks whose apply failed (logged and dropped)
    pub tasks_failed: usize,
    /// Events handed to the engine for indexing
    pub events_indexed: usize,
    /// Event ids handed to the engine for deletion
    pub events_deleted: usize,
    /// Successful commits
    pub commits: usize,
    /// Commits that returned an error
    pub failed_commits: usize,
    /// Rebuilds that queued their work
    pub rebuilds_started: usize,
    /// Rebuilds abandoned because the index could not be reset or read
    pub rebuilds_aborted: usize,
}

impl ControllerStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_applied(&mut self) {
        self.tasks_applied += 1;
    }

    pub fn record_failed(&mut self) {
        self.tasks_failed += 1;
    }

    pub fn record_commit(&mut self, ok: bool) {
        if ok {
            self.commits += 1;
        } else {
            self.failed_commits += 1;
        }
    }

    /// Total tasks taken off the queue.
    pub fn tasks_processed(&self) -> usize {
        self.tasks_applied + self.tasks_failed
    }

    pub fn has_errors(&self) -> bool {
        self.tasks_failed > 0 || self.failed_commits > 0 || self.rebuilds_aborted > 0
    }
}
