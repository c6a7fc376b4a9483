//! Append-only audit history of resolved parameters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::correlation::{MethodId, ParameterCandidate};
use crate::error::MethodError;
use crate::registry::{ParameterKind, Unit};

/// Provenance of a resolved parameter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterSource {
    /// Engineer override.
    Manual,
    /// Weighted aggregate of in-range candidates.
    Calculated,
    /// Aggregate of candidates none of which was in range.
    Estimated,
}

impl ParameterSource {
    /// Get a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            ParameterSource::Manual => "Manual",
            ParameterSource::Calculated => "Calculated",
            ParameterSource::Estimated => "Estimated",
        }
    }
}

/// A method that was applicable but failed, retained so nothing is
/// silently swallowed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedMethod {
    pub method: MethodId,
    pub error: MethodError,
}

/// The authoritative value for one (stratum, parameter) pair at one
/// revision. Superseded, never edited in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedParameter {
    /// Monotonically increasing per (stratum, parameter) pair.
    pub revision: u32,
    pub stratum_id: String,
    pub parameter: ParameterKind,
    pub value: f64,
    pub unit: Unit,
    pub source: ParameterSource,
    /// Candidates considered, including out-of-range ones. Recorded for
    /// comparison even under a manual override.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub candidates: Vec<ParameterCandidate>,
    /// Applicable methods that failed to produce a candidate.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rejected: Vec<RejectedMethod>,
    /// Engineering justification, carried from a manual override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub justification: Option<String>,
    pub resolved_at: DateTime<Utc>,
}

impl ResolvedParameter {
    /// Whether this value came from an engineer override.
    pub fn is_manual(&self) -> bool {
        self.source == ParameterSource::Manual
    }
}

/// A manual engineering override for one (stratum, parameter) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverrideEntry {
    pub stratum_id: String,
    pub parameter: ParameterKind,
    /// Value converted to the parameter's canonical unit at apply time.
    pub value: f64,
    pub unit: Unit,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub justification: Option<String>,
    pub applied_at: DateTime<Utc>,
    /// Set when a re-segmentation retired the stratum the override was
    /// attached to.
    pub invalidated: bool,
}

/// Revision history for one (stratum, parameter) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterHistory {
    pub stratum_id: String,
    pub parameter: ParameterKind,
    /// Revisions in ascending order; the last one is current.
    pub revisions: Vec<ResolvedParameter>,
    /// Set when the stratum's interval changed after resolution; a stale
    /// history is audit data, not an authoritative value.
    pub stale: bool,
}

impl ParameterHistory {
    /// The latest revision.
    pub fn latest(&self) -> Option<&ResolvedParameter> {
        self.revisions.last()
    }
}

/// Append-only log of every resolution, keyed by (stratum, parameter).
///
/// Doubles as the dependency index for cascading invalidation: the
/// histories attached to a stratum are exactly the resolutions a
/// re-segmentation must mark stale.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParameterLog {
    histories: Vec<ParameterHistory>,
}

impl ParameterLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// History for one (stratum, parameter) pair.
    pub fn history(&self, stratum_id: &str, parameter: ParameterKind) -> Option<&ParameterHistory> {
        self.histories
            .iter()
            .find(|h| h.stratum_id == stratum_id && h.parameter == parameter)
    }

    /// All histories, including stale ones.
    pub fn histories(&self) -> &[ParameterHistory] {
        &self.histories
    }

    /// The revision number the next resolution of this pair receives.
    pub fn next_revision(&self, stratum_id: &str, parameter: ParameterKind) -> u32 {
        self.history(stratum_id, parameter)
            .and_then(|h| h.latest())
            .map(|r| r.revision + 1)
            .unwrap_or(1)
    }

    /// The current authoritative value for a pair, if resolved and not
    /// stale.
    pub fn current(&self, stratum_id: &str, parameter: ParameterKind) -> Option<&ResolvedParameter> {
        self.history(stratum_id, parameter)
            .filter(|h| !h.stale)
            .and_then(|h| h.latest())
    }

    /// Whether the pair has been resolved but invalidated by a
    /// re-segmentation.
    pub fn is_stale(&self, stratum_id: &str, parameter: ParameterKind) -> bool {
        self.history(stratum_id, parameter)
            .is_some_and(|h| h.stale)
    }

    /// Parameter kinds resolved for a stratum (the stratum's dependents).
    pub fn resolved_kinds(&self, stratum_id: &str) -> Vec<ParameterKind> {
        self.histories
            .iter()
            .filter(|h| h.stratum_id == stratum_id)
            .map(|h| h.parameter)
            .collect()
    }

    /// Current values across all non-stale histories.
    pub fn current_entries(&self) -> impl Iterator<Item = &ResolvedParameter> {
        self.histories
            .iter()
            .filter(|h| !h.stale)
            .filter_map(|h| h.latest())
    }

    /// Append a new revision. The history un-stales: a fresh resolution
    /// is authoritative again.
    pub fn append(&mut self, resolved: ResolvedParameter) {
        match self
            .histories
            .iter_mut()
            .find(|h| h.stratum_id == resolved.stratum_id && h.parameter == resolved.parameter)
        {
            Some(history) => {
                history.stale = false;
                history.revisions.push(resolved);
            }
            None => self.histories.push(ParameterHistory {
                stratum_id: resolved.stratum_id.clone(),
                parameter: resolved.parameter,
                revisions: vec![resolved],
                stale: false,
            }),
        }
    }

    /// Mark every history of a stratum stale. Returns how many were
    /// newly invalidated.
    pub fn mark_stale(&mut self, stratum_id: &str) -> usize {
        let mut count = 0;
        for history in &mut self.histories {
            if history.stratum_id == stratum_id && !history.stale {
                history.stale = true;
                count += 1;
            }
        }
        count
    }
}
