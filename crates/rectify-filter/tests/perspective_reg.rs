//! Perspective rectification regression test
//!
//! Covers the identity mapping given by default corners, the zoom of the
//! default input quad onto the full frame, keyframe resolution across
//! frames, and reuse of the cached coordinate map.

use rectify_core::{Point, Quad, Raster, color};
use rectify_filter::{CornerKeyframes, PerspectiveRectifier, QuadSide, rectify_perspective};
use rectify_test::{RegParams, make_gradient};

fn pixel(raster: &Raster, x: u32, y: u32) -> f64 {
    raster.get_pixel(x, y).unwrap_or(u32::MAX) as f64
}

#[test]
fn perspective_reg_identity() {
    let mut rp = RegParams::new("perspective_identity");

    let source = make_gradient(200, 100).unwrap();
    let empty = CornerKeyframes::new();
    let out = rectify_perspective(&source, 0, &empty, &CornerKeyframes::new_fixed()).unwrap();
    rp.compare_rasters(&source, &out, 0);
    rp.write_raster(&out).unwrap();

    // Same quad on both sides at any position is still the identity, up
    // to rounding in the projective product
    let quad = Quad::from_coords([[13.0, 7.0], [180.0, 20.0], [170.0, 90.0], [5.0, 80.0]]);
    let mut rect = PerspectiveRectifier::with_keyframes(
        CornerKeyframes::with_fixed_quad(quad),
        CornerKeyframes::with_fixed_quad(quad),
    );
    let m = rect.transform(3).unwrap();
    for (x, y) in [(0.0, 0.0), (100.5, 50.25), (199.0, 99.0)] {
        let p = m.transform_point(Point::new(x, y));
        rp.compare_values(x, p.x, 1e-9);
        rp.compare_values(y, p.y, 1e-9);
    }
    let out = rect.rectify(&source, 3).unwrap();
    let expected = color::channels(source.get_pixel(100, 50).unwrap_or(0));
    let actual = color::channels(out.get_pixel(100, 50).unwrap_or(0));
    for (e, a) in expected.iter().zip(&actual) {
        // truncation may drop a channel by one when the map lands just short
        rp.compare_values(*e as f64, *a as f64, 1.0);
    }

    assert!(rp.cleanup(), "perspective identity test failed");
}

#[test]
fn perspective_reg_zoom_default_quad() {
    let mut rp = RegParams::new("perspective_zoom");

    let source = make_gradient(200, 100).unwrap();
    let mut rect = PerspectiveRectifier::new();
    rect.set_image_size(200, 100);
    rect.set_quad(
        QuadSide::Output,
        0,
        Quad::rectangle(0.0, 0.0, 199.0, 99.0),
    );

    let m = rect.transform(0).unwrap();
    let p = m.transform_point(Point::new(0.0, 0.0));
    rp.compare_values(50.0, p.x, 1e-9);
    rp.compare_values(25.0, p.y, 1e-9);
    let p = m.transform_point(Point::new(199.0, 99.0));
    rp.compare_values(150.0, p.x, 1e-9);
    rp.compare_values(75.0, p.y, 1e-9);

    let out = rect.rectify(&source, 0).unwrap();
    rp.compare_values(pixel(&source, 50, 25), pixel(&out, 0, 0), 0.0);
    rp.compare_values(pixel(&source, 150, 75), pixel(&out, 199, 99), 0.0);
    rp.compare_values(pixel(&source, 150, 25), pixel(&out, 199, 0), 0.0);
    rp.write_raster(&out).unwrap();

    assert!(rp.cleanup(), "perspective zoom test failed");
}

#[test]
fn perspective_reg_keyframes() {
    let mut rp = RegParams::new("perspective_keyframes");

    let source = make_gradient(200, 100).unwrap();
    let base = Quad::centered_for_size(200, 100);
    let shifted = Quad::rectangle(60.0, 25.0, 160.0, 75.0);

    let mut in_keys = CornerKeyframes::new();
    in_keys.set(0, base);
    in_keys.set(10, shifted);
    let out_keys = CornerKeyframes::with_fixed_quad(base);

    // Frames before 10 resolve to key 0
    let out = rectify_perspective(&source, 9, &in_keys, &out_keys).unwrap();
    rp.compare_rasters(&source, &out, 0);

    // From frame 10 on, the output reads 10 pixels further right
    let out = rectify_perspective(&source, 12, &in_keys, &out_keys).unwrap();
    rp.compare_values(pixel(&source, 30, 30), pixel(&out, 20, 30), 0.0);
    rp.compare_values(pixel(&source, 199, 50), pixel(&out, 189, 50), 0.0);
    rp.compare_values(0.0, pixel(&out, 195, 50), 0.0);

    assert!(rp.cleanup(), "perspective keyframes test failed");
}

#[test]
fn perspective_reg_cache() {
    let mut rp = RegParams::new("perspective_cache");

    let source = make_gradient(64, 48).unwrap();
    let mut rect = PerspectiveRectifier::new();

    rect.rectify(&source, 0).unwrap();
    rp.compare_values(1.0, rect.generation() as f64, 0.0);
    rect.rectify(&source, 0).unwrap();
    rect.rectify(&source, 7).unwrap();
    rp.compare_values(1.0, rect.generation() as f64, 0.0);

    // A new keyframe only matters from its own frame on
    rect.set_corner(QuadSide::Input, 5, 0, Point::new(10.0, 10.0));
    rect.rectify(&source, 4).unwrap();
    rp.compare_values(1.0, rect.generation() as f64, 0.0);
    rect.rectify(&source, 5).unwrap();
    rp.compare_values(2.0, rect.generation() as f64, 0.0);

    let larger = make_gradient(80, 48).unwrap();
    rect.rectify(&larger, 5).unwrap();
    rp.compare_values(3.0, rect.generation() as f64, 0.0);

    assert!(rp.cleanup(), "perspective cache test failed");
}
