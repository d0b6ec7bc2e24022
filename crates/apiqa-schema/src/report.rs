//! # Batch Reports
//!
//! Aggregates the results of validating many documents (one per response
//! file, typically) into a single pass/fail summary.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::result::ValidationResult;

/// One validated document.
#[derive(Debug, Clone, Serialize)]
pub struct ReportEntry {
    /// Where the document came from (file path, `-` for stdin, test name).
    pub source: String,
    /// The validation outcome.
    pub result: ValidationResult,
}

/// Pass/fail counts over a batch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReportSummary {
    /// Documents validated.
    pub total: usize,
    /// Documents with no violations.
    pub passed: usize,
    /// Documents with at least one violation.
    pub failed: usize,
    /// `passed / total` as a percentage; `0.0` for an empty batch.
    pub pass_rate: f64,
}

/// Results of a validation run.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    generated_at: DateTime<Utc>,
    summary: ReportSummary,
    entries: Vec<ReportEntry>,
}

impl BatchReport {
    /// An empty report stamped with the current time.
    pub fn new() -> Self {
        Self {
            generated_at: Utc::now(),
            summary: ReportSummary {
                total: 0,
                passed: 0,
                failed: 0,
                pass_rate: 0.0,
            },
            entries: Vec::new(),
        }
    }

    /// Add a result.
    pub fn push(&mut self, source: impl Into<String>, result: ValidationResult) {
        self.entries.push(ReportEntry {
            source: source.into(),
            result,
        });
        self.summary = summarize(&self.entries);
    }

    /// When the report was started.
    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }

    /// All entries, in insertion order.
    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    /// Entries that failed validation.
    pub fn failures(&self) -> impl Iterator<Item = &ReportEntry> {
        self.entries.iter().filter(|e| !e.result.is_valid())
    }

    /// Current counts.
    pub fn summary(&self) -> ReportSummary {
        self.summary
    }

    /// True if every entry passed. An empty report passes.
    pub fn all_passed(&self) -> bool {
        self.summary.failed == 0
    }
}

impl Default for BatchReport {
    fn default() -> Self {
        Self::new()
    }
}

fn summarize(entries: &[ReportEntry]) -> ReportSummary {
    let total = entries.len();
    let passed = entries.iter().filter(|e| e.result.is_valid()).count();
    let pass_rate = if total == 0 {
        0.0
    } else {
        passed as f64 / total as f64 * 100.0
    };
    ReportSummary {
        total,
        passed,
        failed: total - passed,
        pass_rate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::{Violation, ViolationKind};
    use apiqa_core::FieldPath;

    fn failing() -> ValidationResult {
        ValidationResult::new(
            "post",
            vec![Violation::new(
                FieldPath::root().child("id"),
                ViolationKind::OutOfRange,
                "0 is less than minimum 1",
            )],
        )
    }

    #[test]
    fn empty_report_passes() {
        let report = BatchReport::new();
        assert!(report.all_passed());
        assert_eq!(report.summary().total, 0);
        assert_eq!(report.summary().pass_rate, 0.0);
    }

    #[test]
    fn counts_pass_and_fail() {
        let mut report = BatchReport::new();
        report.push("a.json", ValidationResult::new("post", vec![]));
        report.push("b.json", failing());
        report.push("c.json", ValidationResult::new("post", vec![]));
        report.push("d.json", ValidationResult::new("post", vec![]));

        let summary = report.summary();
        assert_eq!(summary.total, 4);
        assert_eq!(summary.passed, 3);
        assert_eq!(summary.failed, 1);
        assert!((summary.pass_rate - 75.0).abs() < f64::EPSILON);
        assert!(!report.all_passed());

        let failed: Vec<_> = report.failures().map(|e| e.source.as_str()).collect();
        assert_eq!(failed, vec!["b.json"]);
    }

    #[test]
    fn serializes_summary_and_entries() {
        let mut report = BatchReport::new();
        report.push("-", failing());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["summary"]["failed"], 1);
        assert_eq!(json["entries"][0]["source"], "-");
        assert_eq!(json["entries"][0]["result"]["valid"], false);
        assert!(json["generated_at"].is_string());
    }
}
