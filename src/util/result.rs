use std::collections::BTreeMap;

use jiff::{SignedDuration, Timestamp};

use crate::dns::resolver::FailureKind;

/// Aggregate counts for one batch.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchSummary {
    pub total: usize,
    pub skipped: usize,
    pub scheduled: usize,
    pub resolved: usize,
    pub failed: usize,
    pub failures: BTreeMap<FailureKind, usize>,
    pub started: Timestamp,
    pub elapsed: SignedDuration,
}

impl BatchSummary {
    pub fn new(total: usize, scheduled: usize) -> BatchSummary {
        BatchSummary {
            total,
            skipped: total - scheduled,
            scheduled,
            resolved: 0,
            failed: 0,
            failures: BTreeMap::new(),
            started: Timestamp::now(),
            elapsed: SignedDuration::ZERO,
        }
    }

    pub fn record_resolved(&mut self) {
        self.resolved += 1;
    }

    pub fn record_failed(&mut self, kind: FailureKind) {
        self.failed += 1;
        *self.failures.entry(kind).or_insert(0) += 1;
    }

    pub fn complete(&mut self) {
        self.elapsed = Timestamp::now().duration_since(self.started);
    }

    /// All scheduled lookups have been accounted for.
    pub fn is_complete(&self) -> bool {
        self.resolved + self.failed == self.scheduled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_counts_skipped() {
        let summary = BatchSummary::new(10, 7);
        assert_eq!(summary.skipped, 3);
        assert!(!summary.is_complete());
    }

    #[test]
    fn summary_tracks_failures_per_kind() {
        let mut summary = BatchSummary::new(3, 3);
        summary.record_resolved();
        summary.record_failed(FailureKind::NoSuchDomain);
        summary.record_failed(FailureKind::NoSuchDomain);

        assert_eq!(summary.failed, 2);
        assert_eq!(summary.failures.get(&FailureKind::NoSuchDomain), Some(&2));
        assert!(summary.is_complete());
    }

    #[test]
    fn empty_summary_is_complete() {
        let mut summary = BatchSummary::new(0, 0);
        summary.complete();
        assert!(summary.is_complete());
        assert!(summary.elapsed >= SignedDuration::ZERO);
    }
}
