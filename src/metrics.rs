use std::sync::atomic::{AtomicU64, Ordering};

use crate::assembly::{Rejection, Summary};

/// Thread-safe counters describing summarization activity.
#[derive(Debug, Default)]
pub struct RunMetrics {
    clusters_summarized: AtomicU64,
    clusters_empty: AtomicU64,
    clusters_failed: AtomicU64,
    sentences_accepted: AtomicU64,
    words_emitted: AtomicU64,
    replacements: AtomicU64,
    rejected_length: AtomicU64,
    rejected_surface: AtomicU64,
    rejected_redundant: AtomicU64,
    rejected_empty: AtomicU64,
    rejected_over_budget: AtomicU64,
}

impl RunMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a finished cluster summary and every rejection made while building it.
    pub fn record_summary(&self, summary: &Summary) {
        self.clusters_summarized.fetch_add(1, Ordering::Relaxed);
        if summary.is_empty() {
            self.clusters_empty.fetch_add(1, Ordering::Relaxed);
        }
        self.sentences_accepted
            .fetch_add(summary.sentences.len() as u64, Ordering::Relaxed);
        self.words_emitted
            .fetch_add(summary.word_count as u64, Ordering::Relaxed);
        self.replacements
            .fetch_add(summary.replacements as u64, Ordering::Relaxed);
        for rejection in &summary.rejections {
            self.counter_for(*rejection).fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record a cluster whose assembly aborted.
    pub fn record_failure(&self) {
        self.clusters_failed.fetch_add(1, Ordering::Relaxed);
    }

    fn counter_for(&self, rejection: Rejection) -> &AtomicU64 {
        match rejection {
            Rejection::Length => &self.rejected_length,
            Rejection::Surface(_) => &self.rejected_surface,
            Rejection::Redundant => &self.rejected_redundant,
            Rejection::EmptyAfterCleanup => &self.rejected_empty,
            Rejection::OverBudget => &self.rejected_over_budget,
        }
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            clusters_summarized: self.clusters_summarized.load(Ordering::Relaxed),
            clusters_empty: self.clusters_empty.load(Ordering::Relaxed),
            clusters_failed: self.clusters_failed.load(Ordering::Relaxed),
            sentences_accepted: self.sentences_accepted.load(Ordering::Relaxed),
            words_emitted: self.words_emitted.load(Ordering::Relaxed),
            replacements: self.replacements.load(Ordering::Relaxed),
            rejected_length: self.rejected_length.load(Ordering::Relaxed),
            rejected_surface: self.rejected_surface.load(Ordering::Relaxed),
            rejected_redundant: self.rejected_redundant.load(Ordering::Relaxed),
            rejected_empty: self.rejected_empty.load(Ordering::Relaxed),
            rejected_over_budget: self.rejected_over_budget.load(Ordering::Relaxed),
        }
    }
}

/// Immutable view of run counters used for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Clusters that produced a summary (possibly empty).
    pub clusters_summarized: u64,
    /// Clusters whose summary had no sentences.
    pub clusters_empty: u64,
    /// Clusters whose assembly aborted.
    pub clusters_failed: u64,
    /// Sentences placed into summaries.
    pub sentences_accepted: u64,
    /// Cleaned tokens placed into summaries.
    pub words_emitted: u64,
    /// Accepted sentences replaced by a longer near-duplicate.
    pub replacements: u64,
    /// Candidates outside the length bounds.
    pub rejected_length: u64,
    /// Candidates with a disallowed surface pattern.
    pub rejected_surface: u64,
    /// Candidates too similar to an accepted sentence.
    pub rejected_redundant: u64,
    /// Candidates with nothing left after cleanup.
    pub rejected_empty: u64,
    /// Candidates that would overflow the word budget.
    pub rejected_over_budget: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembly::filters::SurfacePattern;

    #[test]
    fn records_summaries_and_rejections() {
        let metrics = RunMetrics::new();
        metrics.record_summary(&Summary {
            sentences: vec!["One.".into(), "Two.".into()],
            word_count: 4,
            rejections: vec![
                Rejection::Length,
                Rejection::Surface(SurfacePattern::Slash),
                Rejection::Redundant,
            ],
            ..Summary::default()
        });
        metrics.record_summary(&Summary::default());
        metrics.record_failure();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.clusters_summarized, 2);
        assert_eq!(snapshot.clusters_empty, 1);
        assert_eq!(snapshot.clusters_failed, 1);
        assert_eq!(snapshot.sentences_accepted, 2);
        assert_eq!(snapshot.words_emitted, 4);
        assert_eq!(snapshot.rejected_length, 1);
        assert_eq!(snapshot.rejected_surface, 1);
        assert_eq!(snapshot.rejected_redundant, 1);
        assert_eq!(snapshot.rejected_over_budget, 0);
    }

    #[test]
    fn snapshot_starts_at_zero() {
        let snapshot = RunMetrics::new().snapshot();
        assert_eq!(snapshot.clusters_summarized, 0);
        assert_eq!(snapshot.sentences_accepted, 0);
    }
}
