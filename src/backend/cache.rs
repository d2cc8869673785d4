use tracing::warn;

use crate::model::ResponseGrid;

/// Orders responses to requests issued from one place.
///
/// Requests are numbered by the caller with a monotonically increasing
/// sequence. A response is accepted only if it is newer than everything
/// accepted before it, so a slow reply can never overwrite a faster newer one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SequenceGuard {
    issued: u64,
    applied: u64,
}

impl SequenceGuard {
    /// Record that request `seq` is in flight.
    pub fn issue(&mut self, seq: u64) {
        self.issued = self.issued.max(seq);
    }

    /// Mark `seq` as answered; false if a newer answer already landed.
    pub fn accept(&mut self, seq: u64) -> bool {
        if seq <= self.applied {
            return false;
        }
        self.applied = seq;
        true
    }

    /// A request newer than the last answer is outstanding.
    pub fn is_pending(&self) -> bool {
        self.issued > self.applied
    }
}

/// The most recent response grid, guarded against stale replies.
#[derive(Debug, Default)]
pub struct ResponseCache {
    grid: Option<ResponseGrid>,
    guard: SequenceGuard,
}

impl ResponseCache {
    pub fn grid(&self) -> Option<&ResponseGrid> {
        self.grid.as_ref()
    }

    pub fn issue(&mut self, seq: u64) {
        self.guard.issue(seq);
    }

    pub fn store(&mut self, seq: u64, grid: ResponseGrid) -> bool {
        if !self.guard.accept(seq) {
            warn!("Dropping stale grid for request {}", seq);
            return false;
        }
        self.grid = Some(grid);
        true
    }

    /// Settle request `seq` without new data, keeping the cached grid.
    pub fn reject(&mut self, seq: u64) {
        self.guard.accept(seq);
    }

    pub fn is_loading(&self) -> bool {
        self.guard.is_pending()
    }
}
