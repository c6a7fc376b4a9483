//! Boreholes and the samples recovered from them.

use serde::{Deserialize, Serialize};

use super::interval::DepthInterval;
use super::record::{TestRecord, TestType};
use super::soil::SoilClass;

/// Location of an exploration: plan coordinates plus ground elevation.
/// Coordinates are plotted raw; projection is out of scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub x: f64,
    pub y: f64,
    pub ground_elevation: f64,
    pub coordinate_system: String,
}

impl Location {
    /// Create a location in the default State Plane system.
    pub fn new(x: f64, y: f64, ground_elevation: f64) -> Self {
        Self {
            x,
            y,
            ground_elevation,
            coordinate_system: "State Plane".to_string(),
        }
    }

    /// Set the coordinate system name.
    pub fn with_coordinate_system(mut self, system: impl Into<String>) -> Self {
        self.coordinate_system = system.into();
        self
    }
}

/// A physical specimen recovered at a depth interval. Owns its test
/// records; never mutated after import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub id: String,
    pub interval: DepthInterval,
    pub field_description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classification: Option<SoilClass>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub records: Vec<TestRecord>,
}

impl Sample {
    /// Create a sample with no test records.
    pub fn new(
        id: impl Into<String>,
        interval: DepthInterval,
        field_description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            interval,
            field_description: field_description.into(),
            classification: None,
            records: Vec::new(),
        }
    }

    /// Set the USCS classification.
    pub fn with_classification(mut self, class: SoilClass) -> Self {
        self.classification = Some(class);
        self
    }

    /// Attach a test record.
    pub fn with_record(mut self, record: TestRecord) -> Self {
        self.records.push(record);
        self
    }

    /// Valid records of a given test type.
    pub fn records_of_type(&self, test_type: TestType) -> impl Iterator<Item = &TestRecord> {
        self.records
            .iter()
            .filter(move |r| r.valid && r.test_type() == test_type)
    }
}

/// One exploration: location, logged depth, and depth-ordered samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Borehole {
    pub id: String,
    pub location: Location,
    /// Total drilled depth below ground surface.
    pub logged_depth: f64,
    samples: Vec<Sample>,
}

impl Borehole {
    /// Create an empty borehole.
    pub fn new(id: impl Into<String>, location: Location, logged_depth: f64) -> Self {
        Self {
            id: id.into(),
            location,
            logged_depth,
            samples: Vec::new(),
        }
    }

    /// Add a sample, keeping samples ordered by top depth.
    pub fn with_sample(mut self, sample: Sample) -> Self {
        self.samples.push(sample);
        self.samples
            .sort_by(|a, b| a.interval.top.total_cmp(&b.interval.top));
        self
    }

    /// Samples in depth order.
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Look up a sample by id.
    pub fn sample(&self, id: &str) -> Option<&Sample> {
        self.samples.iter().find(|s| s.id == id)
    }

    /// The logged depth range, from ground surface to total depth.
    pub fn logged_range(&self) -> DepthInterval {
        DepthInterval::new(0.0, self.logged_depth)
    }
}
