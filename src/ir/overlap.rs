//! Foreground-contamination test for candidate background regions.

use super::bbox::BoundingBox;

/// Default fraction of the candidate's area a foreground box may cover
/// before the candidate counts as contaminated.
pub const DEFAULT_OVERLAP_THRESHOLD: f64 = 0.1;

/// Returns true if any box in `boxes` covers more than `threshold` of the
/// candidate's own area.
///
/// Pairs that only touch, or do not meet at all, contribute zero
/// intersection. The ratio is intersection over *candidate* area, not IoU:
/// a small pothole inside a large candidate may stay under the threshold.
pub fn overlaps(candidate: &BoundingBox, boxes: &[BoundingBox], threshold: f64) -> bool {
    let candidate_area = candidate.area() as f64;

    boxes.iter().any(|other| {
        let intersection = candidate.intersection_area(other);
        intersection > 0 && intersection as f64 / candidate_area > threshold
    })
}
