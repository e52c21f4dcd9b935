//! Validation findings and scoring.

use serde::Serialize;

/// How hard the validator pushes back on ambiguous findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strictness {
    Lenient,
    #[default]
    Moderate,
    Strict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        })
    }
}

/// One finding against a vector or a sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationIssue {
    /// Stable machine-readable code, e.g. `PASS_LENGTH_MISMATCH`.
    pub code: &'static str,
    pub severity: Severity,
    pub message: String,
    /// Schema path of the offending field, when the finding is field-scoped.
    pub field: Option<&'static str>,
    /// Index of the offending event within its sequence, when applicable.
    pub event_index: Option<usize>,
}

impl ValidationIssue {
    pub fn new(code: &'static str, severity: Severity, message: String) -> Self {
        Self { code, severity, message, field: None, event_index: None }
    }

    pub fn for_field(mut self, field: &'static str) -> Self {
        self.field = Some(field);
        self
    }

    pub fn at(mut self, event_index: usize) -> Self {
        self.event_index = Some(event_index);
        self
    }
}

/// Per-issue score penalties. An error-free, warning-free vector scores 1.0.
const ERROR_PENALTY: f64 = 0.2;
const WARNING_PENALTY: f64 = 0.05;
const INFO_PENALTY: f64 = 0.01;

fn penalty(severity: Severity) -> f64 {
    match severity {
        Severity::Error => ERROR_PENALTY,
        Severity::Warning => WARNING_PENALTY,
        Severity::Info => INFO_PENALTY,
    }
}

/// Outcome of validating one event vector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub score: f64,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn from_issues(issues: Vec<ValidationIssue>) -> Self {
        let score = (1.0 - issues.iter().map(|i| penalty(i.severity)).sum::<f64>()).max(0.0);
        let valid = !issues.iter().any(|i| i.severity == Severity::Error);
        Self { valid, score, issues }
    }

    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    pub fn info_count(&self) -> usize {
        self.count(Severity::Info)
    }

    fn count(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }

    /// Flatten into string key/value pairs for tabular sinks (CSV columns,
    /// metrics labels).
    pub fn to_flat(&self) -> Vec<(String, String)> {
        let mut flat = vec![
            ("valid".into(), self.valid.to_string()),
            ("score".into(), format!("{:.4}", self.score)),
            ("error_count".into(), self.error_count().to_string()),
            ("warning_count".into(), self.warning_count().to_string()),
            ("info_count".into(), self.info_count().to_string()),
        ];
        for (i, issue) in self.issues.iter().enumerate() {
            flat.push((format!("issue_{i}"), format!("{}:{}", issue.severity, issue.code)));
        }
        flat
    }
}

/// Outcome of validating a whole event sequence: one report per event plus
/// the cross-event findings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SequenceValidationReport {
    pub valid: bool,
    pub score: f64,
    pub event_reports: Vec<ValidationReport>,
    pub sequence_issues: Vec<ValidationIssue>,
}

impl SequenceValidationReport {
    pub fn new(event_reports: Vec<ValidationReport>, sequence_issues: Vec<ValidationIssue>) -> Self {
        let mean_event_score = if event_reports.is_empty() {
            1.0
        } else {
            event_reports.iter().map(|r| r.score).sum::<f64>() / event_reports.len() as f64
        };
        let sequence_penalty = sequence_issues
            .iter()
            .filter(|i| i.severity != Severity::Info)
            .map(|i| penalty(i.severity))
            .sum::<f64>();
        let score = (mean_event_score - sequence_penalty).max(0.0);
        let valid = event_reports.iter().all(|r| r.valid)
            && !sequence_issues.iter().any(|i| i.severity == Severity::Error);
        Self { valid, score, event_reports, sequence_issues }
    }
}
