//! Engineer-defined strata.

use serde::{Deserialize, Serialize};

use crate::store::{DepthInterval, SoilClass};

/// An engineer-defined depth interval of uniform soil classification
/// within one borehole. References (does not own) the samples whose
/// intervals intersect it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stratum {
    /// Unique identifier, stable across edits that do not change the
    /// interval.
    pub id: String,
    /// Borehole this stratum belongs to.
    pub borehole_id: String,
    /// Depth interval, contained in the borehole's logged range.
    pub interval: DepthInterval,
    /// USCS classification assigned by the engineer, seeded from the
    /// majority classification of intersecting samples.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classification: Option<SoilClass>,
    /// Ids of samples intersecting this stratum, in depth order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sample_ids: Vec<String>,
}

impl Stratum {
    /// Create a stratum with a freshly generated id.
    pub fn new(borehole_id: impl Into<String>, interval: DepthInterval) -> Self {
        Self {
            id: generate_stratum_id(),
            borehole_id: borehole_id.into(),
            interval,
            classification: None,
            sample_ids: Vec::new(),
        }
    }

    /// Set the classification.
    pub fn with_classification(mut self, class: SoilClass) -> Self {
        self.classification = Some(class);
        self
    }

    /// Set the referenced sample ids.
    pub fn with_sample_ids(mut self, ids: Vec<String>) -> Self {
        self.sample_ids = ids;
        self
    }

    /// Stratum thickness.
    pub fn thickness(&self) -> f64 {
        self.interval.thickness()
    }
}

/// Generate a unique stratum ID.
fn generate_stratum_id() -> String {
    use std::sync::atomic::{AtomicU64, Ordering};
    static COUNTER: AtomicU64 = AtomicU64::new(1);
    format!("st_{:03}", COUNTER.fetch_add(1, Ordering::SeqCst))
}
