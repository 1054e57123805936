mod common;

use common::*;
use image::{GrayImage, Luma};

fn page_with_lines(lines: &[u32]) -> GrayImage {
    let mut img = blank_page(400, 500);
    for &y in lines {
        draw_hline(&mut img, y);
    }
    img
}

#[test]
fn five_even_lines_yield_one_staff_and_no_candidates() {
    // Scenario: a perfect staff and nothing else
    let img = staff_page();
    let (_, staves, regions) = StaffDetector::default().process(&img);

    assert_eq!(staves, vec![Staff::new(STAFF_LINES)]);
    assert!(regions.is_empty());
}

#[test]
fn accepted_staves_have_consistent_spacing() {
    let img = staff_page();
    let (_, staves, _) = StaffDetector::default().process(&img);

    for staff in &staves {
        let spacings: Vec<f32> = staff.lines.windows(2).map(|w| (w[1] - w[0]) as f32).collect();
        let avg = spacings.iter().sum::<f32>() / 4.0;
        for s in spacings {
            assert!((s - avg).abs() <= avg * 0.5);
        }
    }
}

#[test]
fn missing_fifth_line_is_interpolated() {
    let img = page_with_lines(&[100, 120, 140, 160]);
    let (_, staves, _) = StaffDetector::default().process(&img);

    assert_eq!(staves, vec![Staff::new([100, 120, 140, 160, 175])]);
}

#[test]
fn inconsistent_spacing_rejects_the_group() {
    // Gaps 8, 20, 20, 20: all close enough to group, but the first gap
    // deviates from the average by more than 50%
    let img = page_with_lines(&[100, 108, 128, 148, 168]);
    let (_, staves, _) = StaffDetector::default().process(&img);

    assert!(staves.is_empty());
}

#[test]
fn two_separated_systems_form_two_staves() {
    let img = page_with_lines(&[100, 120, 140, 160, 180, 300, 320, 340, 360, 380]);
    let (_, staves, _) = StaffDetector::default().process(&img);

    assert_eq!(
        staves,
        vec![
            Staff::new([100, 120, 140, 160, 180]),
            Staff::new([300, 320, 340, 360, 380]),
        ]
    );
}

#[test]
fn fewer_than_four_lines_is_spurious() {
    let img = page_with_lines(&[100, 120, 140]);
    let (_, staves, _) = StaffDetector::default().process(&img);

    assert!(staves.is_empty());
}

#[test]
fn glyph_between_lines_survives_staff_removal() {
    let mut img = staff_page();
    // A notehead-sized blob sitting in the space between lines 140 and 160,
    // clear of the removal bands
    draw_blob(&mut img, 150, 146, 12, 11);

    let (stripped, staves, regions) = StaffDetector::default().process(&img);

    assert_eq!(staves.len(), 1);
    assert_eq!(regions.len(), 1);
    let bbox = regions[0].bbox();
    assert_eq!((bbox.x, bbox.y, bbox.width, bbox.height), (150, 146, 12, 11));
    // The staff lines themselves are gone
    assert_eq!(stripped.get_pixel(10, 140)[0], 0);
}

#[test]
fn staff_removal_blanks_a_band_around_each_line() {
    let img = staff_page();
    let detector = StaffDetector::default();
    let stripped = detector.remove_staff_lines(&img, &[Staff::new(STAFF_LINES)]);

    for y in STAFF_LINES {
        for dy in [-3i64, 0, 2] {
            let row = (y as i64 + dy) as u32;
            assert_eq!(stripped.get_pixel(200, row)[0], 0, "row {row} not blanked");
        }
    }
}

#[test]
fn candidates_come_back_in_reading_order() {
    let mut img = blank_page(400, 300);
    draw_blob(&mut img, 200, 20, 10, 10);
    draw_blob(&mut img, 50, 20, 10, 10);
    draw_blob(&mut img, 100, 60, 10, 10);

    let regions = StaffDetector::default().extract_regions(&img);
    let tops: Vec<(u32, u32)> = regions.iter().map(|r| (r.min_x, r.min_y)).collect();

    assert_eq!(tops, vec![(50, 20), (200, 20), (100, 60)]);
}

#[test]
fn tiny_regions_are_discarded_as_noise() {
    let mut img = blank_page(400, 300);
    draw_blob(&mut img, 50, 50, 4, 4);
    draw_blob(&mut img, 100, 100, 10, 10);

    let regions = StaffDetector::default().extract_regions(&img);

    assert_eq!(regions.len(), 1);
    assert_eq!(regions[0].min_x, 100);
}

#[test]
fn staff_grid_interleaves_lines_and_spaces() {
    let staff = Staff::new(STAFF_LINES);
    let grid = staff.grid();
    assert_eq!(
        grid,
        [100.0, 110.0, 120.0, 130.0, 140.0, 150.0, 160.0, 170.0, 180.0]
    );
    assert_eq!(staff.spacing(), 20.0);
    assert_eq!(staff.nearest_grid_index(151.0), 5);
}

#[test]
fn empty_page_has_no_staves_and_no_candidates() {
    let img = blank_page(400, 300);
    let (_, staves, regions) = StaffDetector::default().process(&img);

    assert!(staves.is_empty());
    assert!(regions.is_empty());
}

#[test]
fn line_image_only_keeps_long_runs() {
    let mut img = blank_page(400, 100);
    draw_hline(&mut img, 50);
    draw_blob(&mut img, 20, 70, 30, 1);

    let lines = StaffDetector::default().detect_horizontal_lines(&img);
    assert_eq!(lines.get_pixel(200, 50)[0], 255);
    assert_eq!(lines.get_pixel(30, 70)[0], 0);
    assert_eq!(lines, {
        let mut expected = blank_page(400, 100);
        for x in 0..400 {
            expected.put_pixel(x, 50, Luma([255]));
        }
        expected
    });
}
