//! Dataset statistics.
//!
//! A single pass over an annotation map producing per-class counts and a
//! box-area histogram.

mod report;

pub use report::{DatasetStatistics, SizeDistribution};

use crate::error::PotholeError;
use crate::ir::AnnotationMap;

/// Boxes with an area below this are `small`.
pub const SMALL_AREA_LIMIT: i64 = 1_000;
/// Boxes with an area below this (and not small) are `medium`.
pub const MEDIUM_AREA_LIMIT: i64 = 5_000;

/// Compute statistics for an annotation map.
///
/// # Errors
/// Returns [`PotholeError::EmptyAnnotationMap`] when the map has no images,
/// since the per-image average is undefined.
pub fn analyze(map: &AnnotationMap) -> Result<DatasetStatistics, PotholeError> {
    if map.is_empty() {
        return Err(PotholeError::EmptyAnnotationMap);
    }

    let mut stats = DatasetStatistics {
        total_images: map.image_count(),
        ..Default::default()
    };

    for (_, annotations) in map {
        for ann in annotations {
            *stats
                .class_counts
                .entry(ann.class_label.to_lowercase())
                .or_insert(0) += 1;

            stats.size_distribution.record(ann.bbox.area());
            stats.total_annotations += 1;
        }
    }

    stats.average_annotations_per_image =
        stats.total_annotations as f64 / stats.total_images as f64;
    Ok(stats)
}

impl SizeDistribution {
    /// Count one box area into its bucket.
    ///
    /// Malformed boxes with a negative area land in `small`.
    pub fn record(&mut self, area: i64) {
        if area < SMALL_AREA_LIMIT {
            self.small += 1;
        } else if area < MEDIUM_AREA_LIMIT {
            self.medium += 1;
        } else {
            self.large += 1;
        }
    }
}
