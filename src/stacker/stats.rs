use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome counters for one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    pub stackable: usize,
    pub not_stackable: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl RunStats {
    pub fn candidates(&self) -> usize {
        self.stackable + self.not_stackable
    }

    /// Stackable candidates that were not applied (read-only runs)
    pub fn unapplied(&self) -> usize {
        self.stackable
            .saturating_sub(self.succeeded)
            .saturating_sub(self.failed)
    }
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "stackable={} succeeded={} failed={} not_stackable={}",
            self.stackable, self.succeeded, self.failed, self.not_stackable
        )
    }
}
