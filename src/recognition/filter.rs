//! Confidence thresholding and greedy non-maximum suppression.

use crate::models::{Detection, SymbolClass};

/// Filter raw classifier output down to the detections worth keeping.
///
/// Three passes:
/// 1. drop the reserved background class and anything below the confidence
///    threshold;
/// 2. greedy NMS: keep the most confident detection, remove every remaining
///    one whose box overlaps it with IoU above the threshold, repeat. The
///    sort is stable, so confidence ties resolve in input order and repeated
///    runs give identical results;
/// 3. re-sort survivors by position (center x, then y), the stream order
///    the notation reconstructor consumes.
///
/// The input slice is never mutated.
pub fn filter_detections(
    detections: &[Detection],
    confidence_threshold: f32,
    iou_threshold: f32,
) -> Vec<Detection> {
    let mut remaining: Vec<Detection> = detections
        .iter()
        .filter(|d| d.class != SymbolClass::Background && d.confidence >= confidence_threshold)
        .cloned()
        .collect();

    remaining.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut kept: Vec<Detection> = Vec::with_capacity(remaining.len());
    while let Some(best) = remaining.first().cloned() {
        remaining.remove(0);
        remaining.retain(|d| d.bbox.iou(&best.bbox) < iou_threshold);
        kept.push(best);
    }

    log::debug!(
        "kept {} of {} detection(s) after filtering",
        kept.len(),
        detections.len()
    );

    kept.sort_by_key(|d| (d.center.0, d.center.1));
    kept
}
