//! Individual field and laboratory test results.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::interval::DepthInterval;

/// Test types the correlation library can consume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestType {
    /// Standard penetration test (field).
    Spt,
    /// Atterberg limits.
    Atterberg,
    /// Grain-size distribution.
    Gradation,
    /// Moisture content and density.
    MoistureDensity,
    /// Unconfined compression.
    UnconfinedCompression,
    /// Triaxial compression.
    Triaxial,
    /// Direct shear.
    DirectShear,
    /// One-dimensional consolidation.
    Consolidation,
    /// Hydraulic conductivity.
    Permeability,
    /// Field vane shear (field).
    FieldVane,
}

impl TestType {
    /// Get a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            TestType::Spt => "SPT",
            TestType::Atterberg => "Atterberg Limits",
            TestType::Gradation => "Gradation",
            TestType::MoistureDensity => "Moisture-Density",
            TestType::UnconfinedCompression => "Unconfined Compression",
            TestType::Triaxial => "Triaxial",
            TestType::DirectShear => "Direct Shear",
            TestType::Consolidation => "Consolidation",
            TestType::Permeability => "Permeability",
            TestType::FieldVane => "Field Vane",
        }
    }
}

impl fmt::Display for TestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Measured values of one test, in conventional lab report units:
/// densities in pcf, stresses and strengths in psf, friction angles in
/// degrees, grain sizes in mm, permeabilities in cm/s, cv in in2/min,
/// moisture and fractions in percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "test", rename_all = "snake_case")]
pub enum TestData {
    Spt {
        n_value: f64,
    },
    Atterberg {
        #[serde(skip_serializing_if = "Option::is_none")]
        liquid_limit: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        plastic_limit: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        plasticity_index: Option<f64>,
    },
    Gradation {
        #[serde(skip_serializing_if = "Option::is_none")]
        gravel_percent: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        sand_percent: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        fines_percent: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        d10: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        d30: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        d60: Option<f64>,
        /// Uniformity coefficient d60/d10.
        #[serde(skip_serializing_if = "Option::is_none")]
        cu: Option<f64>,
        /// Coefficient of curvature d30^2/(d60*d10).
        #[serde(skip_serializing_if = "Option::is_none")]
        cc: Option<f64>,
    },
    MoistureDensity {
        #[serde(skip_serializing_if = "Option::is_none")]
        natural_moisture: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        dry_density: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        wet_density: Option<f64>,
    },
    UnconfinedCompression {
        qu: f64,
    },
    Triaxial {
        confining_pressure: f64,
        peak_strength: f64,
        /// Present only for drained tests interpreted for phi.
        #[serde(skip_serializing_if = "Option::is_none")]
        friction_angle: Option<f64>,
    },
    DirectShear {
        normal_stress: f64,
        shear_strength: f64,
    },
    Consolidation {
        #[serde(skip_serializing_if = "Option::is_none")]
        preconsolidation_pressure: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        compression_index: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        recompression_index: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        coefficient_consolidation: Option<f64>,
    },
    Permeability {
        #[serde(skip_serializing_if = "Option::is_none")]
        horizontal: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        vertical: Option<f64>,
    },
    FieldVane {
        undrained_strength: f64,
    },
}

impl TestData {
    /// The test type of this payload.
    pub fn test_type(&self) -> TestType {
        match self {
            TestData::Spt { .. } => TestType::Spt,
            TestData::Atterberg { .. } => TestType::Atterberg,
            TestData::Gradation { .. } => TestType::Gradation,
            TestData::MoistureDensity { .. } => TestType::MoistureDensity,
            TestData::UnconfinedCompression { .. } => TestType::UnconfinedCompression,
            TestData::Triaxial { .. } => TestType::Triaxial,
            TestData::DirectShear { .. } => TestType::DirectShear,
            TestData::Consolidation { .. } => TestType::Consolidation,
            TestData::Permeability { .. } => TestType::Permeability,
            TestData::FieldVane { .. } => TestType::FieldVane,
        }
    }
}

/// One field or laboratory measurement. Immutable once imported;
/// corrections require re-import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestRecord {
    /// Unique identifier assigned at import.
    pub id: String,
    /// Sample this record was taken from.
    pub sample_id: String,
    /// Depth interval the measurement represents.
    pub interval: DepthInterval,
    /// Measured values.
    pub data: TestData,
    /// False when the import adapter flagged the result as unreliable.
    pub valid: bool,
}

impl TestRecord {
    /// Create a valid test record.
    pub fn new(
        id: impl Into<String>,
        sample_id: impl Into<String>,
        interval: DepthInterval,
        data: TestData,
    ) -> Self {
        Self {
            id: id.into(),
            sample_id: sample_id.into(),
            interval,
            data,
            valid: true,
        }
    }

    /// Set the validity flag (import-time only).
    pub fn with_valid(mut self, valid: bool) -> Self {
        self.valid = valid;
        self
    }

    /// The test type of this record.
    pub fn test_type(&self) -> TestType {
        self.data.test_type()
    }
}
