//! Projection model regression test
//!
//! Checks every lens family for internal consistency: the derivative
//! matches a central difference of the angle, and the radius and FOV
//! inverses undo the forward relation across the valid FOV range.

use rectify_test::RegParams;
use rectify_transform::ProjectionType;
use std::f64::consts::PI;
use strum::IntoEnumIterator;

const FOVS: [f64; 5] = [PI / 18.0, PI / 4.0, PI / 2.0, 2.0, PI - 0.01];
const RADII: [f64; 5] = [0.05, 0.25, 0.5, 0.75, 0.95];

#[test]
fn projection_reg_derivative() {
    let mut rp = RegParams::new("projection_deriv");

    let h = 1e-6;
    for p in ProjectionType::iter() {
        for &fov in &FOVS {
            for &r in &RADII {
                let numeric =
                    (p.angle_at_radius(r + h, fov) - p.angle_at_radius(r - h, fov)) / (2.0 * h);
                let analytic = p.derivative_at_radius(r, fov);
                rp.compare_values(analytic, numeric, 1e-5 * analytic.abs().max(1.0));
            }
        }
    }

    assert!(rp.cleanup(), "projection derivative test failed");
}

#[test]
fn projection_reg_inverses() {
    let mut rp = RegParams::new("projection_inverse");

    for p in ProjectionType::iter() {
        for &fov in &FOVS {
            for &r in &RADII {
                let theta = p.angle_at_radius(r, fov);
                rp.compare_values(r, p.radius_at_angle(theta, fov), 1e-9);
                rp.compare_values(fov, p.fov_at_angle(theta, r), 1e-9);
            }
        }
    }

    assert!(rp.cleanup(), "projection inverse test failed");
}

#[test]
fn projection_reg_monotonic() {
    let mut rp = RegParams::new("projection_monotonic");

    for p in ProjectionType::iter() {
        for &fov in &FOVS {
            let angles: Vec<f64> = (0..=20).map(|i| p.angle_at_radius(i as f64 / 20.0, fov)).collect();
            let increasing = angles.windows(2).all(|w| w[1] > w[0]);
            rp.compare_bool(true, increasing);
            rp.compare_values(fov / 2.0, angles[20], 1e-9);
        }
    }

    assert!(rp.cleanup(), "projection monotonic test failed");
}
