pub mod classify;
pub mod filter;
pub mod preprocessing;
pub mod staff;

use image::{DynamicImage, GrayImage, ImageReader};
use std::path::Path;

use crate::error::{RecognitionError, Result};
use crate::models::{Region, Staff};
use crate::score::Score;
pub use classify::{Classification, SymbolClassifier};
pub use preprocessing::BinarizationMethod;
pub use staff::StaffDetector;

/// End-to-end recognition pipeline for one staff image.
///
/// Preprocess, detect and strip staff lines, classify candidate regions,
/// filter, reconstruct. Each invocation owns its intermediate buffers and
/// shares no state, so batching across images parallelizes freely; per-image
/// timeouts and cancellation are the caller's concern.
pub struct RecognitionPipeline {
    pub binarization: BinarizationMethod,
    pub apply_deskew: bool,
    pub staff_detector: StaffDetector,
    pub confidence_threshold: f32,
    pub iou_threshold: f32,
    pub patch_size: u32,
}

impl RecognitionPipeline {
    pub fn new() -> Self {
        Self {
            binarization: BinarizationMethod::Adaptive,
            apply_deskew: true,
            staff_detector: StaffDetector::default(),
            confidence_threshold: 0.6,
            iou_threshold: 0.3,
            patch_size: classify::DEFAULT_PATCH_SIZE,
        }
    }

    pub fn with_binarization(mut self, method: BinarizationMethod) -> Self {
        self.binarization = method;
        self
    }

    pub fn with_deskew(mut self, apply: bool) -> Self {
        self.apply_deskew = apply;
        self
    }

    pub fn with_confidence_threshold(mut self, threshold: f32) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    pub fn with_iou_threshold(mut self, threshold: f32) -> Self {
        self.iou_threshold = threshold;
        self
    }

    pub fn with_staff_detector(mut self, detector: StaffDetector) -> Self {
        self.staff_detector = detector;
        self
    }

    /// Load an image from disk and recognize it. An unreadable or corrupt
    /// file is the one fatal failure of the pipeline.
    pub fn recognize_file(
        &self,
        path: impl AsRef<Path>,
        classifier: &dyn SymbolClassifier,
    ) -> Result<Score> {
        let path = path.as_ref();
        let img = load_image(path)?;
        self.recognize(&img, classifier)
    }

    /// Recognize an in-memory image into a score.
    ///
    /// Low recognition quality never errors: the score may come back empty
    /// or partial. Only classifier failures propagate.
    pub fn recognize(
        &self,
        img: &DynamicImage,
        classifier: &dyn SymbolClassifier,
    ) -> Result<Score> {
        let binary = self.preprocess(img);
        let (stripped, staves, regions) = self.staff_detector.process(&binary);

        let raw = classify::classify_regions(&stripped, &regions, classifier, self.patch_size)?;
        let kept = filter::filter_detections(&raw, self.confidence_threshold, self.iou_threshold);

        Ok(crate::notation::reconstruct(&kept, &staves))
    }

    /// Preprocessing stage only, for inspection
    pub fn preprocess(&self, img: &DynamicImage) -> GrayImage {
        preprocessing::preprocess(img, self.binarization, self.apply_deskew)
    }

    /// Preprocessing plus staff analysis, for inspection: the stripped
    /// image, validated staves, and candidate regions
    pub fn analyze_staves(&self, img: &DynamicImage) -> (GrayImage, Vec<Staff>, Vec<Region>) {
        let binary = self.preprocess(img);
        self.staff_detector.process(&binary)
    }
}

impl Default for RecognitionPipeline {
    fn default() -> Self {
        Self::new()
    }
}

fn load_image(path: &Path) -> Result<DynamicImage> {
    let reader = ImageReader::open(path).map_err(|e| RecognitionError::ImageLoad {
        path: path.to_path_buf(),
        source: image::ImageError::IoError(e),
    })?;
    reader.decode().map_err(|e| RecognitionError::ImageLoad {
        path: path.to_path_buf(),
        source: e,
    })
}
