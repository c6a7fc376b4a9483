//! Validation findings: severity-tagged consistency issues surfaced for
//! engineer review.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::registry::ParameterKind;

/// Kind of consistency issue detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    /// Two strata in one borehole share depth.
    IntervalOverlap,
    /// Unassigned depth between consecutive strata.
    IntervalGap,
    /// Resolved value outside the registry's published range.
    OutOfRange,
    /// Stratum missing a required parameter kind.
    IncompleteProfile,
    /// Manual override disagrees with every candidate and carries no
    /// justification.
    MissingJustification,
}

impl FindingKind {
    /// Get a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            FindingKind::IntervalOverlap => "Interval Overlap",
            FindingKind::IntervalGap => "Interval Gap",
            FindingKind::OutOfRange => "Out of Range",
            FindingKind::IncompleteProfile => "Incomplete Profile",
            FindingKind::MissingJustification => "Missing Justification",
        }
    }
}

/// Severity level of a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational only, may not require action.
    Info,
    /// Potential issue that should be reviewed.
    Warning,
    /// Definite issue that must be acknowledged before design use.
    Error,
}

impl Severity {
    /// Get a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Info => "Info",
            Severity::Warning => "Warning",
            Severity::Error => "Error",
        }
    }
}

/// A non-fatal consistency issue. Findings are data, not control flow;
/// the validator never throws.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationFinding {
    /// Unique identifier for this finding.
    pub id: String,
    /// Kind of issue.
    pub kind: FindingKind,
    /// Severity level.
    pub severity: Severity,
    /// Affected borehole, when the issue is located in one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub borehole_id: Option<String>,
    /// Affected stratum.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stratum_id: Option<String>,
    /// Affected parameter kind.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameter: Option<ParameterKind>,
    /// Human-readable description.
    pub description: String,
    /// The offending value(s).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed: Option<Value>,
    /// The expected value or range.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<Value>,
    /// When detected.
    pub detected_at: DateTime<Utc>,
}

impl ValidationFinding {
    /// Create a new finding.
    pub fn new(kind: FindingKind, severity: Severity, description: impl Into<String>) -> Self {
        Self {
            id: generate_finding_id(),
            kind,
            severity,
            borehole_id: None,
            stratum_id: None,
            parameter: None,
            description: description.into(),
            observed: None,
            expected: None,
            detected_at: Utc::now(),
        }
    }

    /// Set the affected borehole.
    pub fn with_borehole(mut self, id: impl Into<String>) -> Self {
        self.borehole_id = Some(id.into());
        self
    }

    /// Set the affected stratum.
    pub fn with_stratum(mut self, id: impl Into<String>) -> Self {
        self.stratum_id = Some(id.into());
        self
    }

    /// Set the affected parameter kind.
    pub fn with_parameter(mut self, parameter: ParameterKind) -> Self {
        self.parameter = Some(parameter);
        self
    }

    /// Set the observed value.
    pub fn with_observed(mut self, observed: impl Into<Value>) -> Self {
        self.observed = Some(observed.into());
        self
    }

    /// Set the expected value or range.
    pub fn with_expected(mut self, expected: impl Into<Value>) -> Self {
        self.expected = Some(expected.into());
        self
    }
}

/// Counts of findings by severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindingCounts {
    pub error: usize,
    pub warning: usize,
    pub info: usize,
}

/// Summary of a validation pass, so callers can gate on error counts
/// without re-scanning the findings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationSummary {
    /// Total number of findings.
    pub total: usize,
    /// Findings by severity.
    pub by_severity: FindingCounts,
    /// Findings by kind.
    pub by_kind: indexmap::IndexMap<FindingKind, usize>,
    /// True when no error-severity finding exists. The core only
    /// classifies; acknowledging errors before export is the caller's
    /// responsibility.
    pub design_ready: bool,
}

impl ValidationSummary {
    /// Summarize a validation pass.
    pub fn from_findings(findings: &[ValidationFinding]) -> Self {
        let mut by_severity = FindingCounts::default();
        let mut by_kind = indexmap::IndexMap::new();
        for finding in findings {
            match finding.severity {
                Severity::Error => by_severity.error += 1,
                Severity::Warning => by_severity.warning += 1,
                Severity::Info => by_severity.info += 1,
            }
            *by_kind.entry(finding.kind).or_insert(0) += 1;
        }
        Self {
            total: findings.len(),
            by_severity,
            by_kind,
            design_ready: by_severity.error == 0,
        }
    }
}

/// Generate a unique finding ID.
fn generate_finding_id() -> String {
    use std::sync::atomic::{AtomicU64, Ordering};
    static COUNTER: AtomicU64 = AtomicU64::new(1);
    format!("vf_{:03}", COUNTER.fetch_add(1, Ordering::SeqCst))
}
