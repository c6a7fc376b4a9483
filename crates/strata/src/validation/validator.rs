//! Cross-checks of a resolved profile. Findings are advisory data; the
//! validator never halts processing and never blocks export.

use serde_json::json;
use tracing::debug;

use crate::profile::SoilProfile;
use crate::registry::{ParameterKind, Registry};
use crate::resolution::ResolvedParameter;

use super::finding::{FindingKind, Severity, ValidationFinding};

/// Agreement between consecutive stratum boundaries, in feet.
const DEPTH_TOLERANCE: f64 = 0.01;

/// Configuration for profile validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatorConfig {
    /// Parameter kinds every granular stratum must carry.
    pub granular_required: Vec<ParameterKind>,
    /// Parameter kinds every fine-grained stratum must carry.
    pub fine_grained_required: Vec<ParameterKind>,
    /// Parameter kinds required when the stratum is unclassified or
    /// organic.
    pub default_required: Vec<ParameterKind>,
    /// Maximum relative deviation between a manual override and its
    /// closest candidate before a justification is required.
    pub override_tolerance: f64,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            granular_required: vec![
                ParameterKind::UnitWeight,
                ParameterKind::FrictionAngle,
                ParameterKind::ModulusElasticity,
            ],
            fine_grained_required: vec![
                ParameterKind::UnitWeight,
                ParameterKind::UndrainedShearStrength,
                ParameterKind::CompressionIndex,
            ],
            default_required: vec![ParameterKind::UnitWeight],
            override_tolerance: 0.25,
        }
    }
}

/// Validates a resolved profile for geological and numeric consistency.
#[derive(Debug, Clone)]
pub struct ProfileValidator {
    registry: Registry,
    config: ValidatorConfig,
}

impl ProfileValidator {
    /// Validator with the standard registry and default configuration.
    pub fn new() -> Self {
        Self {
            registry: Registry::standard().clone(),
            config: ValidatorConfig::default(),
        }
    }

    /// Use a custom unit/range registry.
    pub fn with_registry(mut self, registry: Registry) -> Self {
        self.registry = registry;
        self
    }

    /// Use a custom validation configuration.
    pub fn with_config(mut self, config: ValidatorConfig) -> Self {
        self.config = config;
        self
    }

    /// Run every check and return the findings.
    pub fn validate(&self, profile: &SoilProfile) -> Vec<ValidationFinding> {
        let mut findings = Vec::new();
        self.check_stratum_geometry(profile, &mut findings);
        self.check_resolved_ranges(profile, &mut findings);
        self.check_completeness(profile, &mut findings);
        self.check_override_justifications(profile, &mut findings);
        debug!(findings = findings.len(), "profile validated");
        findings
    }

    /// Overlaps (error) and gaps (warning) between consecutive strata of
    /// each borehole. Segmentation cannot produce either, but profiles
    /// round-trip through external editors.
    fn check_stratum_geometry(&self, profile: &SoilProfile, findings: &mut Vec<ValidationFinding>) {
        for borehole in profile.store().boreholes() {
            let strata = profile.strata_of(&borehole.id);
            for pair in strata.windows(2) {
                let upper = pair[0];
                let lower = pair[1];
                let step = lower.interval.top - upper.interval.bottom;
                if step < -DEPTH_TOLERANCE {
                    findings.push(
                        ValidationFinding::new(
                            FindingKind::IntervalOverlap,
                            Severity::Error,
                            format!(
                                "strata {} and {} overlap by {:.2} ft in borehole {}",
                                upper.id, lower.id, -step, borehole.id
                            ),
                        )
                        .with_borehole(&borehole.id)
                        .with_stratum(&lower.id)
                        .with_observed(json!({
                            "upper_bottom": upper.interval.bottom,
                            "lower_top": lower.interval.top,
                        })),
                    );
                } else if step > DEPTH_TOLERANCE {
                    findings.push(
                        ValidationFinding::new(
                            FindingKind::IntervalGap,
                            Severity::Warning,
                            format!(
                                "gap of {:.2} ft between strata {} and {} in borehole {}",
                                step, upper.id, lower.id, borehole.id
                            ),
                        )
                        .with_borehole(&borehole.id)
                        .with_stratum(&lower.id)
                        .with_observed(json!({
                            "upper_bottom": upper.interval.bottom,
                            "lower_top": lower.interval.top,
                        })),
                    );
                }
            }
        }
    }

    /// Current resolved values against the registry's published ranges.
    /// Severity scales with how far outside the value lies.
    fn check_resolved_ranges(&self, profile: &SoilProfile, findings: &mut Vec<ValidationFinding>) {
        for resolved in profile.log().current_entries() {
            let range = self.registry.valid_range(resolved.parameter);
            if range.contains(resolved.value) {
                continue;
            }
            // Beyond half the floor or twice the ceiling is an error.
            let severity = if resolved.value < range.min * 0.5 || resolved.value > range.max * 2.0 {
                Severity::Error
            } else {
                Severity::Warning
            };
            let unit = resolved.unit;
            findings.push(
                ValidationFinding::new(
                    FindingKind::OutOfRange,
                    severity,
                    format!(
                        "{} ({:.4} {unit}) outside published range {:.4}-{:.4} {unit}",
                        resolved.parameter, resolved.value, range.min, range.max
                    ),
                )
                .with_stratum(&resolved.stratum_id)
                .with_parameter(resolved.parameter)
                .with_observed(resolved.value)
                .with_expected(json!({ "min": range.min, "max": range.max })),
            );
        }
    }

    /// Every stratum must carry the parameter kinds its classification
    /// requires.
    fn check_completeness(&self, profile: &SoilProfile, findings: &mut Vec<ValidationFinding>) {
        for stratum in profile.strata() {
            let required = match stratum.classification {
                Some(class) if class.is_granular() => &self.config.granular_required,
                Some(class) if class.is_fine_grained() => &self.config.fine_grained_required,
                _ => &self.config.default_required,
            };
            for &kind in required {
                if profile.resolved(&stratum.id, kind).is_none() {
                    findings.push(
                        ValidationFinding::new(
                            FindingKind::IncompleteProfile,
                            Severity::Warning,
                            format!("stratum {} has no resolved {}", stratum.id, kind),
                        )
                        .with_borehole(&stratum.borehole_id)
                        .with_stratum(&stratum.id)
                        .with_parameter(kind),
                    );
                }
            }
        }
    }

    /// Manual overrides disagreeing with every candidate beyond the
    /// tolerance must carry a justification.
    fn check_override_justifications(
        &self,
        profile: &SoilProfile,
        findings: &mut Vec<ValidationFinding>,
    ) {
        for resolved in profile.log().current_entries() {
            if !resolved.is_manual()
                || resolved.justification.is_some()
                || resolved.candidates.is_empty()
            {
                continue;
            }
            let deviation = closest_relative_deviation(resolved);
            if deviation > self.config.override_tolerance {
                findings.push(
                    ValidationFinding::new(
                        FindingKind::MissingJustification,
                        Severity::Error,
                        format!(
                            "manual {} of {:.4} {} deviates {:.0}% from the closest candidate \
                             with no justification",
                            resolved.parameter,
                            resolved.value,
                            resolved.unit,
                            deviation * 100.0
                        ),
                    )
                    .with_stratum(&resolved.stratum_id)
                    .with_parameter(resolved.parameter)
                    .with_observed(resolved.value),
                );
            }
        }
    }
}

impl Default for ProfileValidator {
    fn default() -> Self {
        Self::new()
    }
}

/// Smallest relative deviation between the resolved value and any
/// candidate.
fn closest_relative_deviation(resolved: &ResolvedParameter) -> f64 {
    resolved
        .candidates
        .iter()
        .map(|c| (resolved.value - c.value).abs() / c.value.abs().max(1e-9))
        .fold(f64::INFINITY, f64::min)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::ProjectMetadata;
    use crate::registry::Unit;
    use crate::resolution::Resolver;
    use crate::segmentation::SegmentationConfig;
    use crate::store::{
        Borehole, DepthInterval, Location, Sample, SoilClass, TestData, TestRecord,
        TestRecordStore,
    };

    fn sand_profile() -> (SoilProfile, String) {
        let sample = Sample::new("s_1", DepthInterval::new(2.0, 8.0), "sand")
            .with_classification(SoilClass::Sw)
            .with_record(TestRecord::new(
                "tr_spt",
                "s_1",
                DepthInterval::new(5.0, 6.5),
                TestData::Spt { n_value: 15.0 },
            ));
        let mut store = TestRecordStore::new();
        store.add_borehole(
            Borehole::new("B-1", Location::new(0.0, 0.0, 100.0), 20.0).with_sample(sample),
        );
        let mut profile = SoilProfile::new(ProjectMetadata::new("Test Site", "24-010"), store);
        let ids = profile
            .segment_borehole("B-1", &[0.0, 20.0], &SegmentationConfig::default())
            .unwrap();
        (profile, ids[0].clone())
    }

    /// Round-trip the profile through JSON with edited stratum
    /// intervals, the way an external editor would hand it back.
    fn with_edited_intervals(
        profile: &SoilProfile,
        edit: impl Fn(&mut serde_json::Value),
    ) -> SoilProfile {
        let mut value = serde_json::to_value(profile).unwrap();
        edit(&mut value["strata"]);
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_clean_profile_geometry_passes() {
        let (mut profile, _) = sand_profile();
        profile
            .segment_borehole("B-1", &[0.0, 8.0, 20.0], &SegmentationConfig::default())
            .unwrap();

        let findings = ProfileValidator::new().validate(&profile);
        assert!(!findings
            .iter()
            .any(|f| matches!(f.kind, FindingKind::IntervalOverlap | FindingKind::IntervalGap)));
    }

    #[test]
    fn test_overlap_is_error() {
        let (mut profile, _) = sand_profile();
        profile
            .segment_borehole("B-1", &[0.0, 8.0, 20.0], &SegmentationConfig::default())
            .unwrap();
        let edited = with_edited_intervals(&profile, |strata| {
            // Pull the lower stratum up into the upper one.
            strata[1]["interval"]["top"] = json!(6.0);
        });

        let findings = ProfileValidator::new().validate(&edited);
        let overlap = findings
            .iter()
            .find(|f| f.kind == FindingKind::IntervalOverlap)
            .expect("overlap finding");
        assert_eq!(overlap.severity, Severity::Error);
        assert_eq!(overlap.borehole_id.as_deref(), Some("B-1"));
    }

    #[test]
    fn test_gap_is_warning() {
        let (mut profile, _) = sand_profile();
        profile
            .segment_borehole("B-1", &[0.0, 8.0, 20.0], &SegmentationConfig::default())
            .unwrap();
        let edited = with_edited_intervals(&profile, |strata| {
            strata[1]["interval"]["top"] = json!(10.5);
        });

        let findings = ProfileValidator::new().validate(&edited);
        let gap = findings
            .iter()
            .find(|f| f.kind == FindingKind::IntervalGap)
            .expect("gap finding");
        assert_eq!(gap.severity, Severity::Warning);
        assert!(gap.description.contains("2.50 ft"));
    }

    #[test]
    fn test_out_of_range_warning_and_error() {
        let (mut profile, stratum_id) = sand_profile();
        let resolver = Resolver::new();
        // N = 15: phi = 45.66, just past the ceiling -> warning.
        resolver
            .resolve(&mut profile, &stratum_id, ParameterKind::FrictionAngle)
            .unwrap();
        // Manual 400 pcf is past twice the ceiling -> error.
        profile
            .apply_override(
                &stratum_id,
                ParameterKind::UnitWeight,
                400.0,
                Unit::PoundsPerCubicFoot,
                Some("sanity check".to_string()),
                resolver.registry(),
            )
            .unwrap();
        resolver
            .resolve(&mut profile, &stratum_id, ParameterKind::UnitWeight)
            .unwrap();

        let findings = ProfileValidator::new().validate(&profile);
        let phi = findings
            .iter()
            .find(|f| f.kind == FindingKind::OutOfRange && f.parameter == Some(ParameterKind::FrictionAngle))
            .expect("friction angle finding");
        assert_eq!(phi.severity, Severity::Warning);

        let gamma = findings
            .iter()
            .find(|f| f.kind == FindingKind::OutOfRange && f.parameter == Some(ParameterKind::UnitWeight))
            .expect("unit weight finding");
        assert_eq!(gamma.severity, Severity::Error);
    }

    #[test]
    fn test_incomplete_profile_lists_missing_kinds() {
        let (mut profile, stratum_id) = sand_profile();
        let resolver = Resolver::new();
        resolver.resolve_all(&mut profile);

        let findings = ProfileValidator::new().validate(&profile);
        let missing: Vec<ParameterKind> = findings
            .iter()
            .filter(|f| f.kind == FindingKind::IncompleteProfile)
            .filter_map(|f| f.parameter)
            .collect();

        // SPT alone resolves friction angle and modulus; the granular
        // set still requires unit weight.
        assert_eq!(missing, vec![ParameterKind::UnitWeight]);
        assert!(findings
            .iter()
            .all(|f| f.kind != FindingKind::IncompleteProfile
                || f.stratum_id.as_deref() == Some(stratum_id.as_str())));
    }

    #[test]
    fn test_missing_justification_beyond_tolerance() {
        let (mut profile, stratum_id) = sand_profile();
        let resolver = Resolver::new();
        profile
            .apply_override(
                &stratum_id,
                ParameterKind::FrictionAngle,
                20.0,
                Unit::Degrees,
                None,
                resolver.registry(),
            )
            .unwrap();
        resolver
            .resolve(&mut profile, &stratum_id, ParameterKind::FrictionAngle)
            .unwrap();

        // Candidate is 45.66; 20 deviates 56% with no justification.
        let findings = ProfileValidator::new().validate(&profile);
        let finding = findings
            .iter()
            .find(|f| f.kind == FindingKind::MissingJustification)
            .expect("missing justification finding");
        assert_eq!(finding.severity, Severity::Error);
    }

    #[test]
    fn test_justified_override_passes() {
        let (mut profile, stratum_id) = sand_profile();
        let resolver = Resolver::new();
        profile
            .apply_override(
                &stratum_id,
                ParameterKind::FrictionAngle,
                20.0,
                Unit::Degrees,
                Some("local experience".to_string()),
                resolver.registry(),
            )
            .unwrap();
        resolver
            .resolve(&mut profile, &stratum_id, ParameterKind::FrictionAngle)
            .unwrap();

        let findings = ProfileValidator::new().validate(&profile);
        assert!(!findings
            .iter()
            .any(|f| f.kind == FindingKind::MissingJustification));
    }

    #[test]
    fn test_override_within_tolerance_needs_no_justification() {
        let (mut profile, stratum_id) = sand_profile();
        let resolver = Resolver::new();
        // Candidate is 45.66; 40 is within the default 25% tolerance.
        profile
            .apply_override(
                &stratum_id,
                ParameterKind::FrictionAngle,
                40.0,
                Unit::Degrees,
                None,
                resolver.registry(),
            )
            .unwrap();
        resolver
            .resolve(&mut profile, &stratum_id, ParameterKind::FrictionAngle)
            .unwrap();

        let findings = ProfileValidator::new().validate(&profile);
        assert!(!findings
            .iter()
            .any(|f| f.kind == FindingKind::MissingJustification));
    }
}
