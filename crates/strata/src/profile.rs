//! The top-level soil profile aggregate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, StrataError};
use crate::registry::{ParameterKind, Registry, Unit};
use crate::resolution::{OverrideEntry, ParameterLog, ResolvedParameter};
use crate::segmentation::{segment, SegmentationConfig, Stratum};
use crate::store::{Borehole, TestRecordStore};

/// Project metadata carried through export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectMetadata {
    pub project_name: String,
    pub project_number: String,
    pub created_by: String,
    pub version: String,
    pub coordinate_system: String,
    pub created_at: DateTime<Utc>,
}

impl ProjectMetadata {
    /// Create metadata for a new project.
    pub fn new(project_name: impl Into<String>, project_number: impl Into<String>) -> Self {
        Self {
            project_name: project_name.into(),
            project_number: project_number.into(),
            created_by: String::new(),
            version: "1.0.0".to_string(),
            coordinate_system: "State Plane".to_string(),
            created_at: Utc::now(),
        }
    }

    /// Set the author.
    pub fn with_created_by(mut self, by: impl Into<String>) -> Self {
        self.created_by = by.into();
        self
    }

    /// Set the coordinate system name.
    pub fn with_coordinate_system(mut self, system: impl Into<String>) -> Self {
        self.coordinate_system = system.into();
        self
    }
}

/// The complete soil profile: metadata, every borehole, every stratum,
/// and the full resolution history. Constructed fresh from an import,
/// edited incrementally, serialized wholesale on export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoilProfile {
    pub metadata: ProjectMetadata,
    store: TestRecordStore,
    strata: Vec<Stratum>,
    log: ParameterLog,
    overrides: Vec<OverrideEntry>,
}

impl SoilProfile {
    /// Create a profile over an imported record store.
    pub fn new(metadata: ProjectMetadata, store: TestRecordStore) -> Self {
        Self {
            metadata,
            store,
            strata: Vec::new(),
            log: ParameterLog::new(),
            overrides: Vec::new(),
        }
    }

    /// The imported record store.
    pub fn store(&self) -> &TestRecordStore {
        &self.store
    }

    /// Look up a borehole.
    pub fn borehole(&self, id: &str) -> Result<&Borehole> {
        self.store
            .borehole(id)
            .ok_or_else(|| StrataError::UnknownBorehole(id.to_string()))
    }

    /// All strata across all boreholes.
    pub fn strata(&self) -> &[Stratum] {
        &self.strata
    }

    /// Strata of one borehole, in depth order.
    pub fn strata_of(&self, borehole_id: &str) -> Vec<&Stratum> {
        let mut strata: Vec<&Stratum> = self
            .strata
            .iter()
            .filter(|s| s.borehole_id == borehole_id)
            .collect();
        strata.sort_by(|a, b| a.interval.top.total_cmp(&b.interval.top));
        strata
    }

    /// Look up a stratum.
    pub fn stratum(&self, id: &str) -> Result<&Stratum> {
        self.strata
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| StrataError::UnknownStratum(id.to_string()))
    }

    /// Segment (or re-segment) a borehole at the given boundary depths.
    ///
    /// Strata whose interval is unchanged keep their id and their
    /// resolved parameters. Every resolved parameter of a changed or
    /// removed stratum is marked stale in the log, and overrides
    /// attached to it are invalidated; re-derivation is an explicit
    /// follow-up step, never a side effect of reading.
    ///
    /// Returns the ids of the borehole's strata, in depth order.
    pub fn segment_borehole(
        &mut self,
        borehole_id: &str,
        boundaries: &[f64],
        config: &SegmentationConfig,
    ) -> Result<Vec<String>> {
        let borehole = self.borehole(borehole_id)?;
        let mut new_strata = segment(borehole, boundaries, config)?;

        let old: Vec<Stratum> = self
            .strata
            .iter()
            .filter(|s| s.borehole_id == borehole_id)
            .cloned()
            .collect();

        // Unchanged intervals keep their identity and resolutions.
        for stratum in &mut new_strata {
            if let Some(prev) = old.iter().find(|o| o.interval == stratum.interval) {
                *stratum = prev.clone();
            }
        }

        // Retired strata cascade into the log and overrides.
        let mut invalidated = 0;
        for prev in &old {
            if !new_strata.iter().any(|s| s.id == prev.id) {
                invalidated += self.log.mark_stale(&prev.id);
                for entry in &mut self.overrides {
                    if entry.stratum_id == prev.id {
                        entry.invalidated = true;
                    }
                }
            }
        }
        if invalidated > 0 {
            debug!(
                borehole = borehole_id,
                invalidated, "re-segmentation invalidated resolved parameters"
            );
        }

        let ids = new_strata.iter().map(|s| s.id.clone()).collect();
        self.strata.retain(|s| s.borehole_id != borehole_id);
        self.strata.extend(new_strata);
        Ok(ids)
    }

    /// Apply a manual override for one (stratum, parameter) pair.
    ///
    /// The value is converted to the parameter's canonical unit at apply
    /// time; incompatible units fail with `UnitMismatch`. Overrides are
    /// appended, never edited, so the audit trail is complete.
    pub fn apply_override(
        &mut self,
        stratum_id: &str,
        parameter: ParameterKind,
        value: f64,
        unit: Unit,
        justification: Option<String>,
        registry: &Registry,
    ) -> Result<()> {
        self.stratum(stratum_id)?;
        let canonical_unit = registry.canonical_unit(parameter);
        let canonical_value = registry.convert(value, unit, canonical_unit)?;
        self.overrides.push(OverrideEntry {
            stratum_id: stratum_id.to_string(),
            parameter,
            value: canonical_value,
            unit: canonical_unit,
            justification,
            applied_at: Utc::now(),
            invalidated: false,
        });
        Ok(())
    }

    /// Clear the override(s) in force for a pair. Entries are kept,
    /// marked invalidated. Returns whether anything was cleared.
    pub fn clear_override(&mut self, stratum_id: &str, parameter: ParameterKind) -> bool {
        let mut cleared = false;
        for entry in &mut self.overrides {
            if entry.stratum_id == stratum_id && entry.parameter == parameter && !entry.invalidated
            {
                entry.invalidated = true;
                cleared = true;
            }
        }
        cleared
    }

    /// The override currently in force for a pair, if any.
    pub fn override_for(&self, stratum_id: &str, parameter: ParameterKind) -> Option<&OverrideEntry> {
        self.overrides
            .iter()
            .rev()
            .find(|o| o.stratum_id == stratum_id && o.parameter == parameter && !o.invalidated)
    }

    /// All override entries, including invalidated ones.
    pub fn overrides(&self) -> &[OverrideEntry] {
        &self.overrides
    }

    /// The full resolution log.
    pub fn log(&self) -> &ParameterLog {
        &self.log
    }

    pub(crate) fn log_mut(&mut self) -> &mut ParameterLog {
        &mut self.log
    }

    /// The current authoritative value for a pair, if resolved and not
    /// invalidated by a re-segmentation.
    pub fn resolved(&self, stratum_id: &str, parameter: ParameterKind) -> Option<&ResolvedParameter> {
        self.log.current(stratum_id, parameter)
    }
}
