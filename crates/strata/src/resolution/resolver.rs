//! Multi-method reconciliation of parameter candidates.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::correlation::{EvaluationContext, MethodLibrary, ParameterCandidate};
use crate::error::{Result, StrataError};
use crate::profile::SoilProfile;
use crate::registry::{ParameterKind, Registry};
use crate::store::Sample;

use super::history::{ParameterSource, RejectedMethod, ResolvedParameter};

/// Policy for reconciling candidates when one method's confidence
/// weight dominates the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Always take the confidence-weighted average.
    WeightedAverage,
    /// A single dominant method (weight at least `dominance_ratio`
    /// times the sum of all others) short-circuits to its value alone.
    DominantShortCircuit,
}

/// Configuration for the parameter resolver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolutionConfig {
    pub tie_break: TieBreak,
    /// Dominance threshold for [`TieBreak::DominantShortCircuit`].
    pub dominance_ratio: f64,
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            tie_break: TieBreak::WeightedAverage,
            dominance_ratio: 2.0,
        }
    }
}

/// Produces the authoritative value for each (stratum, parameter) pair
/// by running every applicable correlation method, reconciling the
/// candidates with any manual override, and appending the result to the
/// profile's audit log.
#[derive(Debug, Clone)]
pub struct Resolver {
    library: MethodLibrary,
    registry: Registry,
    config: ResolutionConfig,
}

impl Resolver {
    /// Resolver with the standard library, standard registry, and
    /// default configuration.
    pub fn new() -> Self {
        Self {
            library: MethodLibrary::standard(),
            registry: Registry::standard().clone(),
            config: ResolutionConfig::default(),
        }
    }

    /// Use a custom method library (deployment weight overrides).
    pub fn with_library(mut self, library: MethodLibrary) -> Self {
        self.library = library;
        self
    }

    /// Use a custom unit/range registry.
    pub fn with_registry(mut self, registry: Registry) -> Self {
        self.registry = registry;
        self
    }

    /// Use a custom resolution configuration.
    pub fn with_config(mut self, config: ResolutionConfig) -> Self {
        self.config = config;
        self
    }

    /// The registry this resolver flags candidates against.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Resolve one (stratum, parameter) pair.
    ///
    /// Appends a new revision to the profile's log and returns it. When
    /// no method produces a candidate and no override is in force, fails
    /// with `Unresolvable` and leaves the log untouched.
    pub fn resolve(
        &self,
        profile: &mut SoilProfile,
        stratum_id: &str,
        parameter: ParameterKind,
    ) -> Result<ResolvedParameter> {
        let stratum = profile.stratum(stratum_id)?.clone();
        let borehole = profile.borehole(&stratum.borehole_id)?;
        let samples: Vec<&Sample> = stratum
            .sample_ids
            .iter()
            .filter_map(|id| borehole.sample(id))
            .collect();
        let ctx = EvaluationContext::new(&stratum, samples);

        let mut candidates: Vec<ParameterCandidate> = Vec::new();
        let mut rejected: Vec<RejectedMethod> = Vec::new();
        for method in self.library.for_parameter(parameter) {
            if !method.is_applicable(&ctx) {
                continue;
            }
            match self.library.evaluate(method, &ctx, &self.registry) {
                Ok(candidate) => {
                    trace!(method = %method.id, value = candidate.value, "candidate produced");
                    candidates.push(candidate);
                }
                Err(error) => {
                    trace!(method = %method.id, %error, "method rejected");
                    rejected.push(RejectedMethod {
                        method: method.id,
                        error,
                    });
                }
            }
        }

        let (value, source, justification) =
            if let Some(entry) = profile.override_for(stratum_id, parameter) {
                // A valid manual override wins outright; candidates are
                // still recorded for comparison.
                (entry.value, ParameterSource::Manual, entry.justification.clone())
            } else if candidates.is_empty() {
                return Err(StrataError::Unresolvable {
                    stratum: stratum_id.to_string(),
                    parameter,
                });
            } else {
                let in_range: Vec<&ParameterCandidate> =
                    candidates.iter().filter(|c| c.is_in_range()).collect();
                if in_range.is_empty() {
                    let all: Vec<&ParameterCandidate> = candidates.iter().collect();
                    (self.reconcile(&all), ParameterSource::Estimated, None)
                } else {
                    (self.reconcile(&in_range), ParameterSource::Calculated, None)
                }
            };

        let resolved = ResolvedParameter {
            revision: profile.log().next_revision(stratum_id, parameter),
            stratum_id: stratum_id.to_string(),
            parameter,
            value,
            unit: self.registry.canonical_unit(parameter),
            source,
            candidates,
            rejected,
            justification,
            resolved_at: Utc::now(),
        };
        debug!(
            stratum = stratum_id,
            parameter = %parameter,
            value,
            source = source.label(),
            revision = resolved.revision,
            "parameter resolved"
        );
        profile.log_mut().append(resolved.clone());
        Ok(resolved)
    }

    /// Resolve every (stratum, parameter) pair that has at least one
    /// candidate or an override. Returns the number of resolutions
    /// appended; pairs with no data are skipped silently.
    pub fn resolve_all(&self, profile: &mut SoilProfile) -> usize {
        let stratum_ids: Vec<String> = profile.strata().iter().map(|s| s.id.clone()).collect();
        let mut count = 0;
        for stratum_id in stratum_ids {
            for parameter in ParameterKind::ALL {
                match self.resolve(profile, &stratum_id, parameter) {
                    Ok(_) => count += 1,
                    Err(StrataError::Unresolvable { .. }) => {}
                    Err(error) => {
                        debug!(stratum = %stratum_id, %error, "resolution skipped");
                    }
                }
            }
        }
        count
    }

    /// Reconcile candidates into one value according to the tie-break
    /// policy. Weights are positive by construction.
    fn reconcile(&self, candidates: &[&ParameterCandidate]) -> f64 {
        if self.config.tie_break == TieBreak::DominantShortCircuit {
            let total: f64 = candidates.iter().map(|c| c.weight).sum();
            if let Some(best) = candidates
                .iter()
                .max_by(|a, b| a.weight.total_cmp(&b.weight))
            {
                if best.weight >= self.config.dominance_ratio * (total - best.weight) {
                    return best.value;
                }
            }
        }
        weighted_average(candidates)
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

fn weighted_average(candidates: &[&ParameterCandidate]) -> f64 {
    // A lone candidate passes through bit-exact.
    if let [only] = candidates {
        return only.value;
    }
    let total: f64 = candidates.iter().map(|c| c.weight).sum();
    candidates.iter().map(|c| c.weight * c.value).sum::<f64>() / total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::correlation::MethodId;
    use crate::profile::ProjectMetadata;
    use crate::registry::Unit;
    use crate::segmentation::SegmentationConfig;
    use crate::store::{
        Borehole, DepthInterval, Location, Sample, SoilClass, TestData, TestRecord,
        TestRecordStore,
    };

    /// One sand stratum whose three friction-angle methods produce
    /// 30, 32, and 31 degrees.
    ///
    /// The SPT correlation carries its low-blow-count scale (0.6/0.7),
    /// so the triaxial and direct shear weights are set to 0.6 to make
    /// all three effective weights equal.
    fn friction_angle_profile() -> (SoilProfile, String) {
        let tan32 = 32.0f64.to_radians().tan();
        let sample = Sample::new("s_1", DepthInterval::new(2.0, 8.0), "sand")
            .with_classification(SoilClass::Sw)
            .with_record(TestRecord::new(
                "tr_tx",
                "s_1",
                DepthInterval::new(2.0, 3.0),
                TestData::Triaxial {
                    confining_pressure: 1000.0,
                    peak_strength: 2500.0,
                    friction_angle: Some(30.0),
                },
            ))
            .with_record(TestRecord::new(
                "tr_ds1",
                "s_1",
                DepthInterval::new(3.0, 4.0),
                TestData::DirectShear {
                    normal_stress: 1000.0,
                    shear_strength: 1000.0 * tan32,
                },
            ))
            .with_record(TestRecord::new(
                "tr_ds2",
                "s_1",
                DepthInterval::new(4.0, 5.0),
                TestData::DirectShear {
                    normal_stress: 3000.0,
                    shear_strength: 3000.0 * tan32,
                },
            ))
            .with_record(TestRecord::new(
                "tr_spt",
                "s_1",
                DepthInterval::new(5.0, 6.5),
                // phi = 28 + 15*log10(10^0.2) = 31 exactly.
                TestData::Spt {
                    n_value: 10.0f64.powf(0.2),
                },
            ));

        let mut store = TestRecordStore::new();
        store.add_borehole(
            Borehole::new("B-1", Location::new(0.0, 0.0, 100.0), 10.0).with_sample(sample),
        );
        let mut profile = SoilProfile::new(ProjectMetadata::new("Test Site", "24-001"), store);
        let ids = profile
            .segment_borehole("B-1", &[0.0, 10.0], &SegmentationConfig::default())
            .unwrap();
        (profile, ids[0].clone())
    }

    fn equal_weight_resolver() -> Resolver {
        Resolver::new().with_library(
            MethodLibrary::standard()
                .with_weight(MethodId::TriaxialDrained, 0.6)
                .with_weight(MethodId::DirectShearRegression, 0.6),
        )
    }

    #[test]
    fn test_equal_weights_average_arithmetically() {
        let (mut profile, stratum_id) = friction_angle_profile();
        let resolver = equal_weight_resolver();

        let resolved = resolver
            .resolve(&mut profile, &stratum_id, ParameterKind::FrictionAngle)
            .unwrap();

        assert!((resolved.value - 31.0).abs() < 1e-6);
        assert_eq!(resolved.source, ParameterSource::Calculated);
        assert_eq!(resolved.candidates.len(), 3);
        assert_eq!(resolved.unit, Unit::Degrees);
        assert_eq!(resolved.revision, 1);
    }

    #[test]
    fn test_manual_override_wins_outright() {
        let (mut profile, stratum_id) = friction_angle_profile();
        let resolver = equal_weight_resolver();

        resolver
            .resolve(&mut profile, &stratum_id, ParameterKind::FrictionAngle)
            .unwrap();
        profile
            .apply_override(
                &stratum_id,
                ParameterKind::FrictionAngle,
                28.0,
                Unit::Degrees,
                Some("local experience".to_string()),
                resolver.registry(),
            )
            .unwrap();

        let resolved = resolver
            .resolve(&mut profile, &stratum_id, ParameterKind::FrictionAngle)
            .unwrap();

        assert_eq!(resolved.value, 28.0);
        assert_eq!(resolved.source, ParameterSource::Manual);
        assert_eq!(resolved.justification.as_deref(), Some("local experience"));
        // The original candidates are retained for comparison.
        assert_eq!(resolved.candidates.len(), 3);
        assert_eq!(resolved.revision, 2);

        // The superseded calculated value stays in the log.
        let history = profile
            .log()
            .history(&stratum_id, ParameterKind::FrictionAngle)
            .unwrap();
        assert_eq!(history.revisions.len(), 2);
        assert_eq!(history.revisions[0].source, ParameterSource::Calculated);
    }

    #[test]
    fn test_cleared_override_returns_to_calculated() {
        let (mut profile, stratum_id) = friction_angle_profile();
        let resolver = equal_weight_resolver();

        profile
            .apply_override(
                &stratum_id,
                ParameterKind::FrictionAngle,
                28.0,
                Unit::Degrees,
                None,
                resolver.registry(),
            )
            .unwrap();
        resolver
            .resolve(&mut profile, &stratum_id, ParameterKind::FrictionAngle)
            .unwrap();

        profile.clear_override(&stratum_id, ParameterKind::FrictionAngle);
        let resolved = resolver
            .resolve(&mut profile, &stratum_id, ParameterKind::FrictionAngle)
            .unwrap();

        assert_eq!(resolved.source, ParameterSource::Calculated);
        assert!((resolved.value - 31.0).abs() < 1e-6);
    }

    #[test]
    fn test_unresolvable_leaves_log_untouched() {
        let (mut profile, stratum_id) = friction_angle_profile();
        let resolver = Resolver::new();

        let err = resolver
            .resolve(&mut profile, &stratum_id, ParameterKind::Permeability)
            .unwrap_err();
        assert!(matches!(err, StrataError::Unresolvable { .. }));
        assert!(profile
            .log()
            .history(&stratum_id, ParameterKind::Permeability)
            .is_none());
    }

    #[test]
    fn test_all_out_of_range_resolves_as_estimated() {
        // A dense sand: N = 60 gives phi = 54.7, beyond the published
        // 45-degree ceiling.
        let sample = Sample::new("s_1", DepthInterval::new(2.0, 8.0), "dense sand")
            .with_classification(SoilClass::Sw)
            .with_record(TestRecord::new(
                "tr_spt",
                "s_1",
                DepthInterval::new(5.0, 6.5),
                TestData::Spt { n_value: 60.0 },
            ));
        let mut store = TestRecordStore::new();
        store.add_borehole(
            Borehole::new("B-1", Location::new(0.0, 0.0, 100.0), 10.0).with_sample(sample),
        );
        let mut profile = SoilProfile::new(ProjectMetadata::new("Test Site", "24-002"), store);
        let ids = profile
            .segment_borehole("B-1", &[0.0, 10.0], &SegmentationConfig::default())
            .unwrap();

        let resolver = Resolver::new();
        let resolved = resolver
            .resolve(&mut profile, &ids[0], ParameterKind::FrictionAngle)
            .unwrap();

        assert_eq!(resolved.source, ParameterSource::Estimated);
        assert!(resolved.value > 45.0);
        assert!(resolved.candidates.iter().all(|c| !c.is_in_range()));
    }

    #[test]
    fn test_rejected_methods_recorded() {
        // SPT on a clay stratum: the Peck correlation is applicable
        // (an SPT record exists) but out of domain.
        let sample = Sample::new("s_1", DepthInterval::new(2.0, 8.0), "clay")
            .with_classification(SoilClass::Cl)
            .with_record(TestRecord::new(
                "tr_spt",
                "s_1",
                DepthInterval::new(5.0, 6.5),
                TestData::Spt { n_value: 12.0 },
            ))
            .with_record(TestRecord::new(
                "tr_tx",
                "s_1",
                DepthInterval::new(3.0, 4.0),
                TestData::Triaxial {
                    confining_pressure: 1000.0,
                    peak_strength: 2200.0,
                    friction_angle: Some(24.0),
                },
            ));
        let mut store = TestRecordStore::new();
        store.add_borehole(
            Borehole::new("B-1", Location::new(0.0, 0.0, 100.0), 10.0).with_sample(sample),
        );
        let mut profile = SoilProfile::new(ProjectMetadata::new("Test Site", "24-003"), store);
        let ids = profile
            .segment_borehole("B-1", &[0.0, 10.0], &SegmentationConfig::default())
            .unwrap();

        let resolver = Resolver::new();
        let resolved = resolver
            .resolve(&mut profile, &ids[0], ParameterKind::FrictionAngle)
            .unwrap();

        // Triaxial succeeded; SPT was rejected but retained.
        assert_eq!(resolved.value, 24.0);
        assert_eq!(resolved.rejected.len(), 1);
        assert_eq!(resolved.rejected[0].method, MethodId::SptPeckHansonThornburn);
    }

    #[test]
    fn test_tie_break_policies_differ() {
        // Triaxial (0.95) vs SPT weakened to 0.4: dominant by the
        // default 2x ratio.
        let sample = Sample::new("s_1", DepthInterval::new(2.0, 8.0), "sand")
            .with_classification(SoilClass::Sw)
            .with_record(TestRecord::new(
                "tr_tx",
                "s_1",
                DepthInterval::new(2.0, 3.0),
                TestData::Triaxial {
                    confining_pressure: 1000.0,
                    peak_strength: 2500.0,
                    friction_angle: Some(35.0),
                },
            ))
            .with_record(TestRecord::new(
                "tr_spt",
                "s_1",
                DepthInterval::new(5.0, 6.5),
                // phi = 43.0, in range.
                TestData::Spt { n_value: 10.0 },
            ));
        let mut store = TestRecordStore::new();
        store.add_borehole(
            Borehole::new("B-1", Location::new(0.0, 0.0, 100.0), 10.0).with_sample(sample),
        );
        let mut profile = SoilProfile::new(ProjectMetadata::new("Test Site", "24-004"), store);
        let ids = profile
            .segment_borehole("B-1", &[0.0, 10.0], &SegmentationConfig::default())
            .unwrap();

        let library = MethodLibrary::standard().with_weight(MethodId::SptPeckHansonThornburn, 0.4);

        let averaging = Resolver::new().with_library(library.clone());
        let averaged = averaging
            .resolve(&mut profile, &ids[0], ParameterKind::FrictionAngle)
            .unwrap();
        let expected = (0.95 * 35.0 + 0.4 * 43.0) / 1.35;
        assert!((averaged.value - expected).abs() < 1e-9);

        let short_circuiting = Resolver::new().with_library(library).with_config(ResolutionConfig {
            tie_break: TieBreak::DominantShortCircuit,
            dominance_ratio: 2.0,
        });
        let dominated = short_circuiting
            .resolve(&mut profile, &ids[0], ParameterKind::FrictionAngle)
            .unwrap();
        assert_eq!(dominated.value, 35.0);
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let (mut profile, stratum_id) = friction_angle_profile();
        let resolver = equal_weight_resolver();

        let first = resolver
            .resolve(&mut profile, &stratum_id, ParameterKind::FrictionAngle)
            .unwrap();
        let second = resolver
            .resolve(&mut profile, &stratum_id, ParameterKind::FrictionAngle)
            .unwrap();

        assert_eq!(first.value.to_bits(), second.value.to_bits());
        assert_eq!(first.candidates, second.candidates);
    }

    #[test]
    fn test_resolve_all_sweeps_available_parameters() {
        let (mut profile, stratum_id) = friction_angle_profile();
        let resolver = equal_weight_resolver();

        let count = resolver.resolve_all(&mut profile);

        // Friction angle (three methods), undrained strength (triaxial
        // peak), and modulus (SPT) resolve; nothing else has data.
        assert_eq!(count, 3);
        assert!(profile.resolved(&stratum_id, ParameterKind::FrictionAngle).is_some());
        assert!(profile
            .resolved(&stratum_id, ParameterKind::UndrainedShearStrength)
            .is_some());
        assert!(profile
            .resolved(&stratum_id, ParameterKind::ModulusElasticity)
            .is_some());
        assert!(profile.resolved(&stratum_id, ParameterKind::Permeability).is_none());
    }

    #[test]
    fn test_resegmentation_invalidates_then_rederives() {
        let (mut profile, stratum_id) = friction_angle_profile();
        let resolver = equal_weight_resolver();
        resolver
            .resolve(&mut profile, &stratum_id, ParameterKind::FrictionAngle)
            .unwrap();

        let new_ids = profile
            .segment_borehole("B-1", &[0.0, 5.0, 10.0], &SegmentationConfig::default())
            .unwrap();

        // The old stratum's resolution is stale, detectable, and kept.
        assert!(profile.resolved(&stratum_id, ParameterKind::FrictionAngle).is_none());
        assert!(profile.log().is_stale(&stratum_id, ParameterKind::FrictionAngle));

        // The replacement stratum re-derives from scratch.
        let rederived = resolver
            .resolve(&mut profile, &new_ids[0], ParameterKind::FrictionAngle)
            .unwrap();
        assert_eq!(rederived.revision, 1);
    }
}
