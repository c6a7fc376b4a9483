//! Layer segmentation of a borehole log.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::BoundaryError;
use crate::store::{Borehole, DepthInterval, Sample, SoilClass};

use super::stratum::Stratum;

/// Configuration for sample-to-stratum intersection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmentationConfig {
    /// Minimum fraction of a sample's interval that must fall inside a
    /// stratum for the sample to count as belonging to it. The default
    /// 0.0 means any overlap counts.
    pub min_overlap_fraction: f64,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            min_overlap_fraction: 0.0,
        }
    }
}

/// Split a borehole into strata at the given boundary depths.
///
/// Boundaries must be strictly increasing and within the borehole's
/// logged range; `n` boundaries produce `n - 1` strata. Each stratum
/// references the samples intersecting it and is seeded with their
/// majority classification.
pub fn segment(
    borehole: &Borehole,
    boundaries: &[f64],
    config: &SegmentationConfig,
) -> Result<Vec<Stratum>, BoundaryError> {
    validate_boundaries(boundaries, borehole.logged_depth)?;

    let strata: Vec<Stratum> = boundaries
        .windows(2)
        .map(|pair| {
            let interval = DepthInterval::new(pair[0], pair[1]);
            let samples = samples_within(borehole, &interval, config);
            let classification = majority_classification(&samples);
            let sample_ids = samples.iter().map(|s| s.id.clone()).collect();
            let mut stratum = Stratum::new(&borehole.id, interval).with_sample_ids(sample_ids);
            stratum.classification = classification;
            stratum
        })
        .collect();

    debug!(
        borehole = %borehole.id,
        strata = strata.len(),
        "segmented borehole"
    );
    Ok(strata)
}

/// Samples whose depth interval intersects the given interval by at
/// least the configured overlap fraction, in depth order.
///
/// Point samples (zero thickness) count when the recorded depth lies
/// inside the interval.
pub fn samples_within<'a>(
    borehole: &'a Borehole,
    interval: &DepthInterval,
    config: &SegmentationConfig,
) -> Vec<&'a Sample> {
    borehole
        .samples()
        .iter()
        .filter(|sample| {
            let thickness = sample.interval.thickness();
            if thickness <= 0.0 {
                return interval.contains_depth(sample.interval.top);
            }
            let overlap = interval.overlap_with(&sample.interval);
            if overlap <= 0.0 {
                return false;
            }
            overlap / thickness >= config.min_overlap_fraction
        })
        .collect()
}

fn validate_boundaries(boundaries: &[f64], logged_depth: f64) -> Result<(), BoundaryError> {
    if boundaries.len() < 2 {
        return Err(BoundaryError::TooFew {
            count: boundaries.len(),
        });
    }
    for (index, pair) in boundaries.windows(2).enumerate() {
        if pair[1] <= pair[0] {
            return Err(BoundaryError::NotIncreasing {
                index: index + 1,
                value: pair[1],
            });
        }
    }
    for &value in boundaries {
        if value < 0.0 || value > logged_depth {
            return Err(BoundaryError::OutsideLoggedRange {
                value,
                logged_depth,
            });
        }
    }
    Ok(())
}

/// The most frequent classification among samples, first-seen (shallowest)
/// winning ties. None when no sample carries a classification.
fn majority_classification(samples: &[&Sample]) -> Option<SoilClass> {
    let mut counts: HashMap<SoilClass, usize> = HashMap::new();
    let mut order: Vec<SoilClass> = Vec::new();
    for sample in samples {
        if let Some(class) = sample.classification {
            if *counts.entry(class).and_modify(|c| *c += 1).or_insert(1) == 1 {
                order.push(class);
            }
        }
    }
    let mut best: Option<SoilClass> = None;
    let mut best_count = 0;
    for class in order {
        let count = counts[&class];
        if count > best_count {
            best = Some(class);
            best_count = count;
        }
    }
    best
}
