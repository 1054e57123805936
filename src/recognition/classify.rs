//! Wrapper around the external symbol classifier.
//!
//! The classifier itself (architecture, training, weights, versioning) lives
//! outside this crate. We hand it a canonical fixed-size grayscale patch per
//! candidate region and get back a class label and a confidence.

use image::{GrayImage, ImageBuffer, Luma, imageops};

use crate::error::Result;
use crate::models::{Detection, Region, SymbolClass};

/// Canonical patch edge length handed to the classifier
pub const DEFAULT_PATCH_SIZE: u32 = 64;

/// Classifier output for one patch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub class: SymbolClass,
    /// In [0, 1]
    pub confidence: f32,
}

/// External symbol classifier collaborator.
///
/// Implementations must be pure per call: the pipeline invokes it once per
/// candidate with no cross-candidate ordering dependency, which keeps batch
/// processing embarrassingly parallel.
pub trait SymbolClassifier {
    fn classify(&self, patch: &GrayImage) -> Result<Classification>;
}

/// Crop a candidate region and resize it to the canonical patch size
pub fn prepare_patch(image: &GrayImage, region: &Region, patch_size: u32) -> GrayImage {
    let bbox = region.bbox();
    let cropped = imageops::crop_imm(image, bbox.x, bbox.y, bbox.width, bbox.height).to_image();
    imageops::resize(&cropped, patch_size, patch_size, imageops::FilterType::CatmullRom)
}

/// Patch as f32 intensities in [0, 1], the range classifier models expect
pub fn to_normalized(patch: &GrayImage) -> ImageBuffer<Luma<f32>, Vec<f32>> {
    let mut out = ImageBuffer::new(patch.width(), patch.height());
    for (x, y, p) in patch.enumerate_pixels() {
        out.put_pixel(x, y, Luma([p[0] as f32 / 255.0]));
    }
    out
}

/// Classify every candidate region into a raw detection.
///
/// Output order follows the candidates' reading order. No filtering happens
/// here; confidence thresholding and duplicate suppression belong to the
/// detection filter.
pub fn classify_regions(
    image: &GrayImage,
    regions: &[Region],
    classifier: &dyn SymbolClassifier,
    patch_size: u32,
) -> Result<Vec<Detection>> {
    let mut detections = Vec::with_capacity(regions.len());

    for region in regions {
        if region.width() == 0 || region.height() == 0 {
            continue;
        }
        let patch = prepare_patch(image, region, patch_size);
        let result = classifier.classify(&patch)?;
        detections.push(Detection::new(result.class, result.confidence, region.bbox()));
    }

    log::debug!("classified {} candidate(s)", detections.len());
    Ok(detections)
}
