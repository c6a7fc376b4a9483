//! Depth-ordered layer segmentation referencing the samples and tests
//! that fall within each layer's interval.

mod segment;
mod stratum;

pub use segment::{samples_within, segment, SegmentationConfig};
pub use stratum::Stratum;
