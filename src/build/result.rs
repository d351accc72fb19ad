//! Build result types.
//!
//! Contains types for representing the outcome of imports and build runs.

use crate::build::ImportReport;
use std::path::PathBuf;
use std::time::Duration;

/// Status of a single import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildStatus {
    /// Every pattern was built
    Success,
    /// Dry run, nothing imported
    Skipped,
    /// Imported, but this many patterns failed and kept their previous artifacts
    Incomplete(usize),
    /// Import failed with error
    Failed(String),
}

impl BuildStatus {
    /// Status of a finished import. In strict mode anything short of a clean
    /// import is a failure.
    pub fn for_report(report: &ImportReport, strict: bool) -> Self {
        let failed = report.failures.len();
        let warned = report.warnings.len();
        if strict && (failed > 0 || warned > 0) {
            BuildStatus::Failed(format!(
                "strict mode: {} pattern(s) failed, {} warning(s)",
                failed, warned
            ))
        } else if failed > 0 {
            BuildStatus::Incomplete(failed)
        } else {
            BuildStatus::Success
        }
    }

    /// Check if the status indicates success.
    pub fn is_success(&self) -> bool {
        matches!(self, BuildStatus::Success | BuildStatus::Skipped)
    }

    /// Check if the status indicates failure.
    pub fn is_failure(&self) -> bool {
        matches!(self, BuildStatus::Failed(_))
    }
}

impl std::fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildStatus::Success => write!(f, "success"),
            BuildStatus::Skipped => write!(f, "skipped"),
            BuildStatus::Incomplete(n) => write!(f, "incomplete: {} pattern(s) failed", n),
            BuildStatus::Failed(err) => write!(f, "failed: {}", err),
        }
    }
}

/// Result of importing a single source.
#[derive(Debug, Clone)]
pub struct TargetResult {
    /// Project-relative source path
    pub target_id: String,
    /// Build status
    pub status: BuildStatus,
    /// Destination containers written
    pub outputs: Vec<PathBuf>,
    /// Build duration
    pub duration: Duration,
    /// Pattern failures and warnings
    pub warnings: Vec<String>,
    /// Reconciliation summary, when the import ran
    pub changes: Option<String>,
}

impl TargetResult {
    /// Result of a finished import.
    pub fn from_report(target_id: String, report: &ImportReport, strict: bool, duration: Duration) -> Self {
        let warnings = report
            .failures
            .iter()
            .map(|f| f.to_string())
            .chain(report.warnings.iter().map(|w| w.to_string()))
            .collect();
        Self {
            target_id,
            status: BuildStatus::for_report(report, strict),
            outputs: vec![report.destination.clone()],
            duration,
            warnings,
            changes: Some(report.reconcile.summary()),
        }
    }

    /// Create a skipped result.
    pub fn skipped(target_id: String) -> Self {
        Self {
            target_id,
            status: BuildStatus::Skipped,
            outputs: vec![],
            duration: Duration::ZERO,
            warnings: vec![],
            changes: None,
        }
    }

    /// Create a failed result.
    pub fn failed(target_id: String, error: String, duration: Duration) -> Self {
        Self {
            target_id,
            status: BuildStatus::Failed(error),
            outputs: vec![],
            duration,
            warnings: vec![],
            changes: None,
        }
    }

    /// Check if this result is successful.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// Result of a complete build run.
#[derive(Debug, Default)]
pub struct BuildResult {
    /// Results for each source
    pub targets: Vec<TargetResult>,
    /// Total build duration
    pub total_duration: Duration,
}

impl BuildResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_result(&mut self, result: TargetResult) {
        self.targets.push(result);
    }

    /// Set the total duration.
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.total_duration = duration;
        self
    }

    pub fn success_count(&self) -> usize {
        self.targets.iter().filter(|r| matches!(r.status, BuildStatus::Success)).count()
    }

    pub fn skipped_count(&self) -> usize {
        self.targets.iter().filter(|r| matches!(r.status, BuildStatus::Skipped)).count()
    }

    pub fn incomplete_count(&self) -> usize {
        self.targets.iter().filter(|r| matches!(r.status, BuildStatus::Incomplete(_))).count()
    }

    pub fn failed_count(&self) -> usize {
        self.targets.iter().filter(|r| r.status.is_failure()).count()
    }

    /// Check if the overall build succeeded (no failures).
    pub fn is_success(&self) -> bool {
        self.failed_count() == 0
    }

    /// Get all outputs produced.
    pub fn all_outputs(&self) -> Vec<&PathBuf> {
        self.targets.iter().flat_map(|r| r.outputs.iter()).collect()
    }

    /// Get all warnings.
    pub fn all_warnings(&self) -> Vec<&String> {
        self.targets.iter().flat_map(|r| r.warnings.iter()).collect()
    }

    /// Get failed target results.
    pub fn failures(&self) -> Vec<&TargetResult> {
        self.targets.iter().filter(|r| r.status.is_failure()).collect()
    }

    /// Format a summary of the build result.
    pub fn summary(&self) -> String {
        let mut lines = Vec::new();

        let success = self.success_count();
        let skipped = self.skipped_count();
        let incomplete = self.incomplete_count();
        let failed = self.failed_count();
        let total = self.targets.len();

        if failed > 0 {
            lines.push(format!(
                "Build failed: {} succeeded, {} incomplete, {} failed ({} total)",
                success, incomplete, failed, total
            ));
            for target in self.failures() {
                lines.push(format!("  - {}: {}", target.target_id, target.status));
            }
        } else {
            lines.push(format!(
                "Build succeeded: {} imported, {} incomplete, {} skipped ({} total) in {:?}",
                success, incomplete, skipped, total, self.total_duration
            ));
        }

        let warnings = self.all_warnings();
        if !warnings.is_empty() {
            lines.push(format!("Warnings ({}):", warnings.len()));
            for warning in warnings.iter().take(5) {
                lines.push(format!("  - {}", warning));
            }
            if warnings.len() > 5 {
                lines.push(format!("  ... and {} more", warnings.len() - 5));
            }
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::ReconcileReport;
    use crate::synth::{EmptyPattern, FailureCause, PatternFailure, PatternWarning};

    fn report(failures: usize, warnings: usize) -> ImportReport {
        ImportReport {
            source: PathBuf::from("hero.anm"),
            destination: PathBuf::from("hero.asset"),
            reconcile: ReconcileReport::default(),
            failures: (0..failures)
                .map(|i| PatternFailure {
                    pattern: format!("P{}", i),
                    index: i,
                    cause: FailureCause::Empty(EmptyPattern::NoFrames),
                })
                .collect(),
            warnings: (0..warnings)
                .map(|i| PatternWarning { pattern: format!("W{}", i), index: i, empty: EmptyPattern::ZeroDuration })
                .collect(),
        }
    }

    #[test]
    fn test_build_status_display() {
        assert_eq!(BuildStatus::Success.to_string(), "success");
        assert_eq!(BuildStatus::Skipped.to_string(), "skipped");
        assert_eq!(BuildStatus::Incomplete(2).to_string(), "incomplete: 2 pattern(s) failed");
        assert_eq!(BuildStatus::Failed("error".to_string()).to_string(), "failed: error");
    }

    #[test]
    fn test_status_for_report() {
        assert_eq!(BuildStatus::for_report(&report(0, 0), false), BuildStatus::Success);
        assert_eq!(BuildStatus::for_report(&report(0, 1), false), BuildStatus::Success);
        assert_eq!(BuildStatus::for_report(&report(2, 0), false), BuildStatus::Incomplete(2));
        assert!(BuildStatus::for_report(&report(0, 1), true).is_failure());
        assert!(BuildStatus::for_report(&report(1, 0), true).is_failure());
        assert_eq!(BuildStatus::for_report(&report(0, 0), true), BuildStatus::Success);
    }

    #[test]
    fn test_target_result_from_report() {
        let result = TargetResult::from_report("hero.anm".to_string(), &report(1, 1), false, Duration::ZERO);
        assert_eq!(result.status, BuildStatus::Incomplete(1));
        assert_eq!(result.outputs, vec![PathBuf::from("hero.asset")]);
        assert_eq!(result.warnings, vec!["pattern 'P0' has no frames", "pattern 'W0' has a total delay of zero"]);
        assert!(result.changes.is_some());
        assert!(!result.status.is_failure());
    }

    #[test]
    fn test_build_result_counts() {
        let mut result = BuildResult::new();
        result.add_result(TargetResult::from_report("a".to_string(), &report(0, 0), false, Duration::ZERO));
        result.add_result(TargetResult::from_report("b".to_string(), &report(1, 0), false, Duration::ZERO));
        result.add_result(TargetResult::skipped("c".to_string()));
        result.add_result(TargetResult::failed("d".to_string(), "error".to_string(), Duration::ZERO));

        assert_eq!(result.success_count(), 1);
        assert_eq!(result.incomplete_count(), 1);
        assert_eq!(result.skipped_count(), 1);
        assert_eq!(result.failed_count(), 1);
        assert!(!result.is_success());
        assert_eq!(result.all_outputs().len(), 2);
    }

    #[test]
    fn test_build_result_summary() {
        let mut result = BuildResult::new();
        result.add_result(TargetResult::from_report("hero.anm".to_string(), &report(0, 0), false, Duration::ZERO));

        let summary = result.with_duration(Duration::from_millis(100)).summary();
        assert!(summary.contains("Build succeeded"));
        assert!(summary.contains("1 imported"));
    }

    #[test]
    fn test_build_result_failed_summary() {
        let mut result = BuildResult::new();
        result.add_result(TargetResult::failed("hero.anm".to_string(), "line 3: bad".to_string(), Duration::ZERO));

        let summary = result.summary();
        assert!(summary.starts_with("Build failed"));
        assert!(summary.contains("  - hero.anm: failed: line 3: bad"));
    }

    #[test]
    fn test_summary_truncates_warnings() {
        let mut result = BuildResult::new();
        result.add_result(TargetResult::from_report("a".to_string(), &report(0, 7), false, Duration::ZERO));
        let summary = result.summary();
        assert!(summary.contains("Warnings (7):"));
        assert!(summary.contains("... and 2 more"));
    }
}
