//! Correlation methods mapping test measurements to parameter estimates.
//!
//! Methods are data, not trait objects: each carries its applicability
//! requirements, evaluation function, literature reference, and
//! confidence weight, so the full set can be enumerated and tested
//! against synthetic inputs.

mod library;
mod methods;

pub use library::MethodLibrary;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::MethodError;
use crate::registry::{ParameterKind, RangeFlag, Registry, Unit};
use crate::segmentation::Stratum;
use crate::store::{Sample, TestRecord, TestType};

/// Identifiers for every registered correlation method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodId {
    MeasuredWetDensity,
    MoistureAdjustedDryDensity,
    TriaxialDrained,
    DirectShearRegression,
    SptPeckHansonThornburn,
    TriaxialUndrained,
    UnconfinedCompression,
    FieldVane,
    SptModulus,
    UnconfinedModulus,
    LaboratoryPermeability,
    Hazen,
    KozenyCarman,
    Casagrande,
    OedometerCompression,
    TerzaghiPeck,
    OedometerConsolidation,
}

impl MethodId {
    /// Stable snake_case identifier, matching the serialized form.
    pub fn id(&self) -> &'static str {
        match self {
            MethodId::MeasuredWetDensity => "measured_wet_density",
            MethodId::MoistureAdjustedDryDensity => "moisture_adjusted_dry_density",
            MethodId::TriaxialDrained => "triaxial_drained",
            MethodId::DirectShearRegression => "direct_shear_regression",
            MethodId::SptPeckHansonThornburn => "spt_peck_hanson_thornburn",
            MethodId::TriaxialUndrained => "triaxial_undrained",
            MethodId::UnconfinedCompression => "unconfined_compression",
            MethodId::FieldVane => "field_vane",
            MethodId::SptModulus => "spt_modulus",
            MethodId::UnconfinedModulus => "unconfined_modulus",
            MethodId::LaboratoryPermeability => "laboratory_permeability",
            MethodId::Hazen => "hazen",
            MethodId::KozenyCarman => "kozeny_carman",
            MethodId::Casagrande => "casagrande",
            MethodId::OedometerCompression => "oedometer_compression",
            MethodId::TerzaghiPeck => "terzaghi_peck",
            MethodId::OedometerConsolidation => "oedometer_consolidation",
        }
    }
}

impl fmt::Display for MethodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Everything a method may read while evaluating one stratum: the
/// stratum itself plus the samples referenced by it.
#[derive(Debug)]
pub struct EvaluationContext<'a> {
    pub stratum: &'a Stratum,
    pub samples: Vec<&'a Sample>,
}

impl<'a> EvaluationContext<'a> {
    /// Build a context over a stratum and its referenced samples.
    pub fn new(stratum: &'a Stratum, samples: Vec<&'a Sample>) -> Self {
        Self { stratum, samples }
    }

    /// Valid records of the given type whose own interval falls within
    /// the stratum.
    pub fn records_of_type(&self, test_type: TestType) -> impl Iterator<Item = &'a TestRecord> {
        let interval = self.stratum.interval;
        self.samples
            .iter()
            .flat_map(move |sample| sample.records_of_type(test_type))
            .filter(move |record| {
                if record.interval.thickness() <= 0.0 {
                    interval.contains_depth(record.interval.top)
                } else {
                    interval.intersects(&record.interval)
                }
            })
    }

    /// The stratum's USCS classification, if assigned.
    pub fn classification(&self) -> Option<crate::store::SoilClass> {
        self.stratum.classification
    }
}

/// Successful evaluation of one method: a value in the parameter's
/// canonical unit plus provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodOutcome {
    /// Estimated value, canonical unit.
    pub value: f64,
    /// Ids of the test records consumed.
    pub inputs: Vec<String>,
    /// Data-dependent confidence scale applied to the method's base
    /// weight (e.g., low blow counts weaken the SPT correlation).
    pub weight_scale: f64,
    /// Short derivation note for the engineer.
    pub note: Option<String>,
}

impl MethodOutcome {
    /// Outcome with full confidence and no note.
    pub fn new(value: f64) -> Self {
        Self {
            value,
            inputs: Vec::new(),
            weight_scale: 1.0,
            note: None,
        }
    }

    /// Set the consumed record ids.
    pub fn with_inputs(mut self, inputs: Vec<String>) -> Self {
        self.inputs = inputs;
        self
    }

    /// Scale the method's base weight.
    pub fn with_weight_scale(mut self, scale: f64) -> Self {
        self.weight_scale = scale;
        self
    }

    /// Attach a derivation note.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Evaluation function signature shared by all methods.
pub type EvalFn = fn(&EvaluationContext) -> Result<MethodOutcome, MethodError>;

/// One registered correlation method.
#[derive(Clone)]
pub struct CorrelationMethod {
    pub id: MethodId,
    /// Parameter kind this method estimates.
    pub parameter: ParameterKind,
    /// Test types that must each have at least one valid record in the
    /// stratum for the method to be applicable.
    pub required_tests: &'static [TestType],
    /// Literature reference.
    pub reference: &'static str,
    /// Base confidence weight reflecting measurement directness.
    pub weight: f64,
    /// Evaluation function.
    pub evaluate: EvalFn,
}

impl fmt::Debug for CorrelationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CorrelationMethod")
            .field("id", &self.id)
            .field("parameter", &self.parameter)
            .field("required_tests", &self.required_tests)
            .field("weight", &self.weight)
            .finish()
    }
}

impl CorrelationMethod {
    /// True iff the stratum has at least one valid record of each
    /// required test type.
    pub fn is_applicable(&self, ctx: &EvaluationContext) -> bool {
        self.required_tests
            .iter()
            .all(|t| ctx.records_of_type(*t).next().is_some())
    }
}

/// One correlation method's estimate for one (stratum, parameter) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterCandidate {
    /// Method that produced the estimate.
    pub method: MethodId,
    /// Parameter kind estimated.
    pub parameter: ParameterKind,
    /// Estimated value.
    pub value: f64,
    /// Canonical unit of the value.
    pub unit: Unit,
    /// Effective confidence weight (base weight times data-dependent
    /// scale, after any deployment override).
    pub weight: f64,
    /// Whether the value lies in the registry's published range.
    pub range_flag: RangeFlag,
    /// Ids of the test records consumed.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inputs: Vec<String>,
    /// Literature reference for the method.
    pub reference: String,
    /// Short derivation note.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl ParameterCandidate {
    /// Whether the candidate is inside the published range.
    pub fn is_in_range(&self) -> bool {
        self.range_flag == RangeFlag::InRange
    }
}

pub(crate) fn build_candidate(
    method: &CorrelationMethod,
    base_weight: f64,
    outcome: MethodOutcome,
    registry: &Registry,
) -> ParameterCandidate {
    ParameterCandidate {
        method: method.id,
        parameter: method.parameter,
        value: outcome.value,
        unit: registry.canonical_unit(method.parameter),
        weight: base_weight * outcome.weight_scale,
        range_flag: registry.classify(method.parameter, outcome.value),
        inputs: outcome.inputs,
        reference: method.reference.to_string(),
        note: outcome.note,
    }
}
