use image::{GrayImage, Luma};
use std::cell::Cell;
use tempfile::NamedTempFile;

use staffscan::{BoundingBox, Classification, Detection, SymbolClass, SymbolClassifier};

/// Standard staff line positions used across tests
pub const STAFF_LINES: [u32; 5] = [100, 120, 140, 160, 180];

/// Creates a black page; pipeline-internal images are ink=255 on 0
pub fn blank_page(width: u32, height: u32) -> GrayImage {
    GrayImage::new(width, height)
}

/// Draws a full-width 1px horizontal line
pub fn draw_hline(img: &mut GrayImage, y: u32) {
    for x in 0..img.width() {
        img.put_pixel(x, y, Luma([255]));
    }
}

/// Draws a filled rectangle of ink
pub fn draw_blob(img: &mut GrayImage, x: u32, y: u32, width: u32, height: u32) {
    for dy in 0..height {
        for dx in 0..width {
            img.put_pixel(x + dx, y + dy, Luma([255]));
        }
    }
}

/// A 400x300 page with one perfectly even five-line staff
pub fn staff_page() -> GrayImage {
    let mut img = blank_page(400, 300);
    for y in STAFF_LINES {
        draw_hline(&mut img, y);
    }
    img
}

/// Shorthand detection constructor
pub fn det(class: SymbolClass, confidence: f32, x: u32, y: u32, w: u32, h: u32) -> Detection {
    Detection::new(class, confidence, BoundingBox::new(x, y, w, h))
}

/// Classifier returning a scripted sequence of results, one per call.
/// Call order is the candidates' reading order, which is deterministic.
pub struct ScriptedClassifier {
    script: Vec<Classification>,
    next: Cell<usize>,
}

impl ScriptedClassifier {
    pub fn new(script: Vec<(SymbolClass, f32)>) -> Self {
        Self {
            script: script
                .into_iter()
                .map(|(class, confidence)| Classification { class, confidence })
                .collect(),
            next: Cell::new(0),
        }
    }
}

impl SymbolClassifier for ScriptedClassifier {
    fn classify(&self, _patch: &GrayImage) -> staffscan::Result<Classification> {
        let i = self.next.get();
        self.next.set(i + 1);
        Ok(self.script.get(i).copied().unwrap_or(Classification {
            class: SymbolClass::Background,
            confidence: 1.0,
        }))
    }
}

/// Classifier that must never be invoked; proves a stage produced zero
/// candidates.
pub struct NeverClassifier;

impl SymbolClassifier for NeverClassifier {
    fn classify(&self, _patch: &GrayImage) -> staffscan::Result<Classification> {
        panic!("classifier invoked but no candidates were expected");
    }
}

/// Classifier whose failure should propagate out of the pipeline
pub struct FailingClassifier;

impl SymbolClassifier for FailingClassifier {
    fn classify(&self, _patch: &GrayImage) -> staffscan::Result<Classification> {
        Err(staffscan::RecognitionError::Classifier(anyhow::anyhow!(
            "model unavailable"
        )))
    }
}

/// Saves a grayscale image to a temp PNG file for load tests.
/// The file is cleaned up when the handle drops.
pub fn save_temp_png(img: &GrayImage) -> NamedTempFile {
    let file = tempfile::Builder::new()
        .suffix(".png")
        .tempfile()
        .expect("Failed to create temp image file");
    img.save_with_format(file.path(), image::ImageFormat::Png)
        .expect("Failed to save test image");
    file
}
