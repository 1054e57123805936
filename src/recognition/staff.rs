//! Staff-line detection, grouping, removal, and symbol-candidate extraction.

use image::{GrayImage, Luma};
use imageproc::region_labelling::{Connectivity, connected_components};
use std::collections::HashMap;

use crate::models::{Region, Staff};

/// Fraction of the peak row projection a row must reach to count as a line
const PROJECTION_THRESHOLD: f64 = 0.3;
/// Inter-line spacing deviation allowed within a staff, relative to average
const MAX_SPACING_DEVIATION: f32 = 0.5;
/// Candidate boxes must exceed this many pixels in both dimensions
const MIN_SYMBOL_SIZE: u32 = 5;

/// Detects five-line staff systems and strips them from the image.
#[derive(Debug, Clone)]
pub struct StaffDetector {
    /// Expected staff line thickness in pixels
    pub line_thickness: u32,
    /// Expected gap between adjacent staff lines in pixels
    pub space_height: u32,
    /// Minimum run length for a stroke to count as a staff line
    pub min_line_length: u32,
}

impl Default for StaffDetector {
    fn default() -> Self {
        Self {
            line_thickness: 2,
            space_height: 10,
            min_line_length: 100,
        }
    }
}

impl StaffDetector {
    pub fn new(line_thickness: u32, space_height: u32, min_line_length: u32) -> Self {
        Self { line_thickness, space_height, min_line_length }
    }

    /// Complete staff processing: detect lines, group into staves, strip the
    /// lines, extract candidate regions.
    ///
    /// Zero validated staves is not an error; downstream pitch estimation
    /// falls back to a default pitch instead.
    pub fn process(&self, image: &GrayImage) -> (GrayImage, Vec<Staff>, Vec<Region>) {
        let lines = self.detect_horizontal_lines(image);
        let staves = self.find_staves(&lines);
        log::debug!("found {} validated staff group(s)", staves.len());

        let stripped = self.remove_staff_lines(image, &staves);
        let regions = self.extract_regions(&stripped);
        log::debug!("extracted {} symbol candidate(s)", regions.len());

        (stripped, staves, regions)
    }

    /// Morphological opening with a wide 1px-tall horizontal element.
    ///
    /// Opening with a 1xN element keeps exactly the per-row foreground runs
    /// of length >= N, so we operate on runs directly: long horizontal
    /// strokes (staff lines) survive, noteheads and stems vanish.
    pub fn detect_horizontal_lines(&self, image: &GrayImage) -> GrayImage {
        let (width, height) = image.dimensions();
        let mut out = GrayImage::new(width, height);

        for y in 0..height {
            let mut run_start: Option<u32> = None;
            for x in 0..=width {
                let foreground = x < width && image.get_pixel(x, y)[0] > 0;
                match (run_start, foreground) {
                    (None, true) => run_start = Some(x),
                    (Some(start), false) => {
                        if x - start >= self.min_line_length {
                            for rx in start..x {
                                out.put_pixel(rx, y, Luma([255]));
                            }
                        }
                        run_start = None;
                    }
                    _ => {}
                }
            }
        }
        out
    }

    /// Group detected line positions into validated five-line staves.
    pub fn find_staves(&self, line_image: &GrayImage) -> Vec<Staff> {
        let positions = self.line_positions(line_image);

        // Greedy grouping: a line joins the open group while the gap stays
        // below 2.5x the expected spacing and the group holds fewer than 5.
        let max_gap = self.space_height as f32 * 2.5;
        let mut groups: Vec<Vec<u32>> = Vec::new();
        let mut current: Vec<u32> = Vec::new();

        for pos in positions {
            if current.is_empty() {
                current.push(pos);
                continue;
            }
            let gap = (pos - current[current.len() - 1]) as f32;
            if gap < max_gap && current.len() < 5 {
                current.push(pos);
            } else {
                if let Some(group) = Self::finalize_group(current) {
                    groups.push(group);
                }
                current = vec![pos];
            }
        }
        if let Some(group) = Self::finalize_group(current) {
            groups.push(group);
        }

        groups
            .into_iter()
            .filter_map(|g| {
                let staff = Staff::new([g[0], g[1], g[2], g[3], g[4]]);
                if Self::spacing_consistent(&staff) {
                    Some(staff)
                } else {
                    log::debug!("dropping staff group {:?}: inconsistent spacing", staff.lines);
                    None
                }
            })
            .collect()
    }

    /// Row-projection line finding: rows whose foreground mass exceeds 30%
    /// of the peak form runs; each run's midpoint is one line.
    fn line_positions(&self, line_image: &GrayImage) -> Vec<u32> {
        let (width, height) = line_image.dimensions();
        let mut projection = vec![0u64; height as usize];
        for y in 0..height {
            let mut sum = 0u64;
            for x in 0..width {
                sum += line_image.get_pixel(x, y)[0] as u64;
            }
            projection[y as usize] = sum;
        }

        let peak = projection.iter().copied().max().unwrap_or(0);
        let threshold = peak as f64 * PROJECTION_THRESHOLD;

        let mut positions = Vec::new();
        let mut run_start: Option<u32> = None;
        for y in 0..=height {
            let above = y < height && projection[y as usize] as f64 > threshold && peak > 0;
            match (run_start, above) {
                (None, true) => run_start = Some(y),
                (Some(start), false) => {
                    positions.push((start + y) / 2);
                    run_start = None;
                }
                _ => {}
            }
        }
        positions
    }

    /// Accept 5-line groups as-is. Repair 4-line groups by interpolating a
    /// 5th line one average spacing past the last (a single missed line is
    /// the common failure on faint handwritten staves). Discard the rest.
    fn finalize_group(mut group: Vec<u32>) -> Option<Vec<u32>> {
        match group.len() {
            5 => Some(group),
            4 => {
                let avg_spacing = (group[3] - group[0]) as f32 / 4.0;
                group.push(group[3] + avg_spacing as u32);
                Some(group)
            }
            _ => None,
        }
    }

    /// All four inter-line spacings must sit within 50% of their average.
    fn spacing_consistent(staff: &Staff) -> bool {
        let spacings: Vec<f32> = staff
            .lines
            .windows(2)
            .map(|w| (w[1] - w[0]) as f32)
            .collect();
        let avg = spacings.iter().sum::<f32>() / spacings.len() as f32;
        spacings
            .iter()
            .all(|s| (s - avg).abs() < avg * MAX_SPACING_DEVIATION)
    }

    /// Blank a thin band around every validated staff line, leaving the
    /// glyphs isolated.
    pub fn remove_staff_lines(&self, image: &GrayImage, staves: &[Staff]) -> GrayImage {
        let mut result = image.clone();
        let (width, height) = result.dimensions();
        let band = self.line_thickness + 1;

        for staff in staves {
            for &line_y in &staff.lines {
                let y_start = line_y.saturating_sub(band);
                let y_end = (line_y + band).min(height);
                for y in y_start..y_end {
                    for x in 0..width {
                        result.put_pixel(x, y, Luma([0]));
                    }
                }
            }
        }
        result
    }

    /// Connected-component candidate extraction over the stripped image.
    /// Boxes at or below the minimum size are noise. Survivors come back in
    /// reading order (top-to-bottom, then left-to-right), which the notation
    /// reconstructor depends on.
    pub fn extract_regions(&self, image: &GrayImage) -> Vec<Region> {
        let labeled = connected_components(image, Connectivity::Eight, Luma([0u8]));

        let mut extents: HashMap<u32, Region> = HashMap::new();
        for (x, y, label) in labeled.enumerate_pixels() {
            let label = label[0];
            if label == 0 {
                continue;
            }
            extents
                .entry(label)
                .and_modify(|r| {
                    r.min_x = r.min_x.min(x);
                    r.min_y = r.min_y.min(y);
                    r.max_x = r.max_x.max(x);
                    r.max_y = r.max_y.max(y);
                    r.pixel_count += 1;
                })
                .or_insert(Region {
                    label,
                    min_x: x,
                    min_y: y,
                    max_x: x,
                    max_y: y,
                    pixel_count: 1,
                });
        }

        let mut regions: Vec<Region> = extents
            .into_values()
            .filter(|r| r.width() > MIN_SYMBOL_SIZE && r.height() > MIN_SYMBOL_SIZE)
            .collect();
        regions.sort_by_key(|r| (r.min_y, r.min_x));
        regions
    }
}
