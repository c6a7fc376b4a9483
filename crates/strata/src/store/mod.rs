//! Normalized in-memory representation of boreholes, samples, and test
//! results, as populated by the external import adapter.

mod borehole;
mod interval;
mod record;
mod soil;

pub use borehole::{Borehole, Location, Sample};
pub use interval::DepthInterval;
pub use record::{TestData, TestRecord, TestType};
pub use soil::SoilClass;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// All boreholes of a project, keyed by borehole id in import order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TestRecordStore {
    boreholes: IndexMap<String, Borehole>,
}

impl TestRecordStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a borehole. Replaces any existing borehole with the same id
    /// (re-import of a corrected log).
    pub fn add_borehole(&mut self, borehole: Borehole) {
        self.boreholes.insert(borehole.id.clone(), borehole);
    }

    /// Look up a borehole by id.
    pub fn borehole(&self, id: &str) -> Option<&Borehole> {
        self.boreholes.get(id)
    }

    /// Boreholes in import order.
    pub fn boreholes(&self) -> impl Iterator<Item = &Borehole> {
        self.boreholes.values()
    }

    /// Number of boreholes.
    pub fn len(&self) -> usize {
        self.boreholes.len()
    }

    /// Whether the store holds no boreholes.
    pub fn is_empty(&self) -> bool {
        self.boreholes.is_empty()
    }
}
