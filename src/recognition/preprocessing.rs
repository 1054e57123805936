//! Image normalization ahead of staff detection.
//!
//! Every function takes its input by reference and returns a new buffer.
//! Pipeline-internal binary images use ink = 255 on background 0, so the
//! binarization methods all invert.

use image::{DynamicImage, GrayImage, Luma};
use imageproc::contrast::{ThresholdType, otsu_level, threshold};
use imageproc::distance_transform::Norm;
use imageproc::geometric_transformations::{Interpolation, rotate_about_center};
use imageproc::geometry::min_area_rect;
use imageproc::morphology::{close, open};
use imageproc::point::Point;

/// Half-width of the local-mean window used by adaptive thresholding (11x11)
const ADAPTIVE_BLOCK_RADIUS: u32 = 5;
/// Offset below the local mean a pixel must fall to count as ink
const ADAPTIVE_DELTA: f64 = 2.0;
/// Rotations smaller than this are measurement noise, not skew
const MIN_SKEW_DEGREES: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BinarizationMethod {
    /// Local-mean threshold; the default, since handwritten scans rarely
    /// have uniform exposure
    Adaptive,
    /// Global Otsu threshold
    Otsu,
    /// Fixed global threshold
    Fixed(u8),
}

impl Default for BinarizationMethod {
    fn default() -> Self {
        BinarizationMethod::Adaptive
    }
}

/// Convert image to grayscale
pub fn to_grayscale(img: &DynamicImage) -> GrayImage {
    img.to_luma8()
}

/// Binarize with the selected method, ink mapped to 255
pub fn binarize(gray: &GrayImage, method: BinarizationMethod) -> GrayImage {
    match method {
        BinarizationMethod::Adaptive => adaptive_binarize(gray),
        BinarizationMethod::Otsu => {
            let level = otsu_level(gray);
            threshold(gray, level, ThresholdType::BinaryInverted)
        }
        BinarizationMethod::Fixed(level) => threshold(gray, level, ThresholdType::BinaryInverted),
    }
}

/// Inverted adaptive threshold over an 11x11 neighborhood.
///
/// A pixel becomes ink when it is darker than the local mean by more than
/// `ADAPTIVE_DELTA`; the offset keeps flat background regions, where every
/// pixel sits at the mean, from turning into ink.
fn adaptive_binarize(gray: &GrayImage) -> GrayImage {
    let (width, height) = gray.dimensions();
    if width == 0 || height == 0 {
        return gray.clone();
    }

    // Summed-area table, padded by one row/column of zeros
    let w = width as usize;
    let h = height as usize;
    let mut integral = vec![0u64; (w + 1) * (h + 1)];
    for y in 0..h {
        let mut row_sum = 0u64;
        for x in 0..w {
            row_sum += gray.get_pixel(x as u32, y as u32)[0] as u64;
            integral[(y + 1) * (w + 1) + (x + 1)] = integral[y * (w + 1) + (x + 1)] + row_sum;
        }
    }
    let window_sum = |x0: usize, y0: usize, x1: usize, y1: usize| -> u64 {
        // Inclusive pixel bounds
        integral[(y1 + 1) * (w + 1) + (x1 + 1)] + integral[y0 * (w + 1) + x0]
            - integral[y0 * (w + 1) + (x1 + 1)]
            - integral[(y1 + 1) * (w + 1) + x0]
    };

    let r = ADAPTIVE_BLOCK_RADIUS as usize;
    let mut out = GrayImage::new(width, height);
    for y in 0..h {
        let y0 = y.saturating_sub(r);
        let y1 = (y + r).min(h - 1);
        for x in 0..w {
            let x0 = x.saturating_sub(r);
            let x1 = (x + r).min(w - 1);
            let count = ((x1 - x0 + 1) * (y1 - y0 + 1)) as f64;
            let mean = window_sum(x0, y0, x1, y1) as f64 / count;
            let value = gray.get_pixel(x as u32, y as u32)[0] as f64;
            let ink = value < mean - ADAPTIVE_DELTA;
            out.put_pixel(x as u32, y as u32, Luma([if ink { 255 } else { 0 }]));
        }
    }
    out
}

/// Morphological open-then-close with a 3x3 element. Removes isolated
/// speckles without breaking stroke continuity.
pub fn denoise(binary: &GrayImage) -> GrayImage {
    let opened = open(binary, Norm::LInf, 1);
    close(&opened, Norm::LInf, 1)
}

/// Estimate and correct rotational skew.
///
/// The dominant orientation is taken from the minimum-area rectangle around
/// all foreground pixels, normalized into (-45, 45] degrees. Angles below
/// `MIN_SKEW_DEGREES` are skipped.
pub fn deskew(binary: &GrayImage) -> GrayImage {
    let points: Vec<Point<i32>> = binary
        .enumerate_pixels()
        .filter(|(_, _, p)| p[0] > 0)
        .map(|(x, y, _)| Point::new(x as i32, y as i32))
        .collect();

    if points.len() < 3 {
        return binary.clone();
    }
    // Collinear foreground has no measurable 2D orientation
    let degenerate = points.iter().all(|p| p.x == points[0].x)
        || points.iter().all(|p| p.y == points[0].y);
    if degenerate {
        return binary.clone();
    }

    let rect = min_area_rect(&points);
    let angle = dominant_angle(&rect);
    if angle.abs() < MIN_SKEW_DEGREES {
        return binary.clone();
    }

    log::debug!("deskewing by {angle:.2} degrees");
    rotate_about_center(
        binary,
        (-angle).to_radians(),
        Interpolation::Bilinear,
        Luma([0]),
    )
}

/// Angle of the rectangle's longer edge against the horizontal, in degrees,
/// folded into (-45, 45]
fn dominant_angle(rect: &[Point<i32>; 4]) -> f32 {
    let edge = |a: Point<i32>, b: Point<i32>| {
        let dx = (b.x - a.x) as f32;
        let dy = (b.y - a.y) as f32;
        (dx * dx + dy * dy, dy.atan2(dx).to_degrees())
    };
    let (len_a, angle_a) = edge(rect[0], rect[1]);
    let (len_b, angle_b) = edge(rect[1], rect[2]);
    let mut angle = if len_a >= len_b { angle_a } else { angle_b };

    while angle > 45.0 {
        angle -= 90.0;
    }
    while angle <= -45.0 {
        angle += 90.0;
    }
    angle
}

/// Full preprocessing chain: grayscale, binarize, denoise, optional deskew
pub fn preprocess(img: &DynamicImage, method: BinarizationMethod, apply_deskew: bool) -> GrayImage {
    let gray = to_grayscale(img);
    let binary = binarize(&gray, method);
    let denoised = denoise(&binary);
    if apply_deskew { deskew(&denoised) } else { denoised }
}
