pub mod schema;
pub mod sqlite_store;

pub use sqlite_store::SqliteStore;

use crate::error::Result;
use crate::models::ObservationRow;

/// Storage boundary: merges a normalized batch with insert-if-absent semantics.
pub trait ObservationSink {
    fn merge(&mut self, rows: &[ObservationRow]) -> Result<MergeOutcome>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    pub staged: usize,
    pub inserted: usize,
    pub skipped_existing: usize,
    pub skipped_untimed: usize,
}

impl MergeOutcome {
    pub fn summary(&self) -> String {
        format!(
            "Merge Summary:\n\
            - Rows staged: {}\n\
            - Rows inserted: {}\n\
            - Already stored: {}\n\
            - Skipped (no time): {}",
            self.staged, self.inserted, self.skipped_existing, self.skipped_untimed
        )
    }
}

/// A persisted row with its surrogate id.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredObservation {
    pub id: i64,
    pub row: ObservationRow,
}
