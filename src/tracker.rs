//! Incremental log-line tracking.
//!
//! Converts successive whole-file reads into an append-only stream of new
//! lines. The diff itself is a pure function over the previous and
//! candidate contents; [`LineTracker`] owns the baseline and applies the
//! state update separately, so the algorithm is testable without storage.

/// Result of comparing a candidate read against the previous baseline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineDelta {
    /// The candidate extends the baseline by these lines, in arrival order.
    Appended(Vec<String>),
    /// The candidate has fewer lines than the baseline (truncation).
    LinesLost,
    /// A line observed earlier no longer matches (retroactive edit).
    HistoryMutated,
    /// Same line count, same lines.
    NoChange,
}

impl LineDelta {
    /// Short tag for diagnostics.
    pub fn tag(&self) -> &'static str {
        match self {
            LineDelta::Appended(_) => "appended",
            LineDelta::LinesLost => "lines-lost",
            LineDelta::HistoryMutated => "history-mutated",
            LineDelta::NoChange => "no-change",
        }
    }
}

/// Split content into its non-empty lines.
///
/// Blank lines are dropped, matching the original filtering policy. This
/// is a deliberate simplification: a legitimately blank log line can never
/// be tracked or matched.
fn split_lines(content: &str) -> Vec<&str> {
    content.split('\n').filter(|line| !line.is_empty()).collect()
}

/// Compare `candidate` against `previous` under the append-only invariant.
///
/// Checks run in order: shrinkage, then history mutation, then no-op. A
/// same-count rewrite therefore reports `HistoryMutated`, not `NoChange`.
pub fn diff_lines(previous: &str, candidate: &str) -> LineDelta {
    let old_lines = split_lines(previous);
    let new_lines = split_lines(candidate);

    if new_lines.len() < old_lines.len() {
        return LineDelta::LinesLost;
    }

    if new_lines[..old_lines.len()] != old_lines[..] {
        return LineDelta::HistoryMutated;
    }

    if new_lines.len() == old_lines.len() {
        return LineDelta::NoChange;
    }

    LineDelta::Appended(
        new_lines[old_lines.len()..]
            .iter()
            .map(|line| line.to_string())
            .collect(),
    )
}

/// Holds the last-known content of one tracked file.
///
/// `observe` must run at most once at a time per tracked file; concurrent
/// unsynchronized calls would corrupt the baseline. The lint pipeline
/// serializes calls behind its own lock.
#[derive(Debug, Default)]
pub struct LineTracker {
    contents: String,
}

impl LineTracker {
    /// Start with an empty baseline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Diff a fresh read against the baseline.
    ///
    /// The baseline advances only on `Appended`; any anomaly leaves it
    /// untouched so the next read is compared against known-good state.
    pub fn observe(&mut self, candidate: &str) -> LineDelta {
        let delta = diff_lines(&self.contents, candidate);
        if matches!(delta, LineDelta::Appended(_)) {
            self.contents = candidate.to_string();
        }
        delta
    }

    /// Current baseline content.
    pub fn contents(&self) -> &str {
        &self.contents
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_observation_is_appended() {
        let mut tracker = LineTracker::new();
        assert_eq!(
            tracker.observe("x\n"),
            LineDelta::Appended(vec!["x".to_string()])
        );
    }

    #[test]
    fn test_extension_yields_new_lines_in_order() {
        let mut tracker = LineTracker::new();
        tracker.observe("a\nb\n");

        let delta = tracker.observe("a\nb\nc\nd\n");
        assert_eq!(
            delta,
            LineDelta::Appended(vec!["c".to_string(), "d".to_string()])
        );
    }

    #[test]
    fn test_identical_content_is_no_change() {
        let mut tracker = LineTracker::new();
        tracker.observe("x\n");

        assert_eq!(tracker.observe("x\n"), LineDelta::NoChange);
        assert_eq!(tracker.observe("x\n"), LineDelta::NoChange);
    }

    #[test]
    fn test_truncation_keeps_baseline() {
        let mut tracker = LineTracker::new();
        tracker.observe("a\nb\n");

        assert_eq!(tracker.observe("a\n"), LineDelta::LinesLost);
        assert_eq!(tracker.contents(), "a\nb\n");
    }

    #[test]
    fn test_retroactive_edit_detected() {
        let mut tracker = LineTracker::new();
        tracker.observe("a\nb\n");

        assert_eq!(tracker.observe("a\nZ\nc\n"), LineDelta::HistoryMutated);
        assert_eq!(tracker.contents(), "a\nb\n");
    }

    #[test]
    fn test_same_count_rewrite_is_mutation_not_no_change() {
        assert_eq!(diff_lines("a\nb\n", "a\nB\n"), LineDelta::HistoryMutated);
    }

    #[test]
    fn test_blank_lines_are_dropped() {
        let mut tracker = LineTracker::new();
        tracker.observe("a\n\n\nb\n");

        // Interleaved blank lines do not count as appended content.
        assert_eq!(tracker.observe("a\nb\n\n"), LineDelta::NoChange);
    }

    #[test]
    fn test_diff_is_pure() {
        let previous = "a\n";
        assert_eq!(
            diff_lines(previous, "a\nb\n"),
            LineDelta::Appended(vec!["b".to_string()])
        );
        // Same inputs, same answer; nothing was mutated.
        assert_eq!(
            diff_lines(previous, "a\nb\n"),
            LineDelta::Appended(vec!["b".to_string()])
        );
    }
}
