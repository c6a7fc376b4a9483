//! Depth intervals measured downward from the ground surface.

use serde::{Deserialize, Serialize};

/// A depth interval below ground surface, top < bottom, in feet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepthInterval {
    pub top: f64,
    pub bottom: f64,
}

impl DepthInterval {
    /// Create a new interval. Ordering is validated downstream; import
    /// data is never silently corrected.
    pub fn new(top: f64, bottom: f64) -> Self {
        Self { top, bottom }
    }

    /// Interval thickness. Zero for point measurements (e.g., a single
    /// SPT seating interval recorded at one depth).
    pub fn thickness(&self) -> f64 {
        self.bottom - self.top
    }

    /// Whether top is strictly above bottom.
    pub fn is_ordered(&self) -> bool {
        self.top < self.bottom
    }

    /// Length of the overlap with another interval, zero when disjoint.
    pub fn overlap_with(&self, other: &DepthInterval) -> f64 {
        let top = self.top.max(other.top);
        let bottom = self.bottom.min(other.bottom);
        (bottom - top).max(0.0)
    }

    /// Whether the two intervals share any depth.
    pub fn intersects(&self, other: &DepthInterval) -> bool {
        self.overlap_with(other) > 0.0
    }

    /// Whether `other` lies fully within this interval.
    pub fn contains(&self, other: &DepthInterval) -> bool {
        self.top <= other.top && other.bottom <= self.bottom
    }

    /// Whether a single depth lies within this interval (inclusive).
    pub fn contains_depth(&self, depth: f64) -> bool {
        self.top <= depth && depth <= self.bottom
    }
}
