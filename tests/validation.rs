// tests/validation.rs
//
// End-to-end physics and symmetry checks on synthesized fields.
// Run with: cargo test
// Or only these tests: cargo test --test validation

use antenna_field::kernel::{self, Component};
use antenna_field::params::SynthOptions;
use antenna_field::{
    AntennaSpec, FieldError, FieldSynthesizer, FieldVolume, SampleGrid, ValidationError,
    synthesize, synthesize_step,
};

fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() <= tol
}

fn rel_eq(a: f64, b: f64, rel: f64) -> bool {
    (a - b).abs() <= rel * a.abs().max(b.abs()).max(1e-30)
}

fn scenario_a_grid() -> SampleGrid {
    SampleGrid::new(10, 10, 1, 5e-5, 5e-6, 5e-8).unwrap()
}

fn scenario_a_antenna() -> AntennaSpec {
    AntennaSpec {
        width: 5e-6,
        thickness: 100e-9,
        position_x: 2.5e-5,
        position_y: 2.5e-6,
        current_direction: 0.0,
        distance_to_sample: 1e-12,
        current: 0.1,
    }
}

/// 9 × 9 × 2 isotropic grid with a strip through the central cell.
fn centred_grid() -> SampleGrid {
    SampleGrid::new(9, 9, 2, 9e-6, 9e-6, 20e-9).unwrap()
}

fn centred_antenna(direction: f64) -> AntennaSpec {
    AntennaSpec {
        width: 2e-6,
        thickness: 100e-9,
        position_x: 4.5e-6,
        position_y: 4.5e-6,
        current_direction: direction,
        distance_to_sample: 10e-9,
        current: 0.02,
    }
}

fn assert_volumes_close(a: &FieldVolume, b: &FieldVolume, rel: f64) {
    assert_eq!(a.dim(), b.dim());
    let scale = a.max_norm().max(b.max_norm());
    for (pa, pb) in [(&a.bx, &b.bx), (&a.by, &b.by), (&a.bz, &b.bz)] {
        for (x, y) in pa.iter().zip(pb.iter()) {
            assert!(approx_eq(*x, *y, rel * scale), "{x} vs {y}");
        }
    }
}

#[test]
fn strip_along_x_has_no_bx_and_matches_the_kernel_row_by_row() {
    let grid = scenario_a_grid();
    let a = scenario_a_antenna();
    let vol = synthesize(&grid, &[a]).unwrap();
    assert_eq!(vol.dim(), (1, 10, 10));

    assert!(vol.bx.iter().all(|v| *v == 0.0));

    let depth = a.depth_at(grid.z_at(0));
    for (j, y) in grid.y_coords().into_iter().enumerate() {
        let by_ref = kernel::evaluate(
            y - a.position_y,
            depth,
            a.width,
            a.thickness,
            a.current,
            Component::InPlane,
        );
        let bz_ref = kernel::evaluate(
            y - a.position_y,
            depth,
            a.width,
            a.thickness,
            a.current,
            Component::OutOfPlane,
        );
        for i in 0..10 {
            let [_, by, bz] = vol.at(i, j, 0);
            assert!(rel_eq(by, by_ref, 1e-9), "By at (i={i}, j={j}): {by} vs {by_ref}");
            assert!(rel_eq(bz, bz_ref, 1e-9), "Bz at (i={i}, j={j}): {bz} vs {bz_ref}");
        }
    }
}

#[test]
fn strip_field_is_symmetric_about_its_centreline() {
    let vol = synthesize(&scenario_a_grid(), &[scenario_a_antenna()]).unwrap();

    for j in 0..5 {
        let jm = 9 - j;
        for i in 0..10 {
            let [_, by, bz] = vol.at(i, j, 0);
            let [_, by_m, bz_m] = vol.at(i, jm, 0);
            assert!(rel_eq(by, by_m, 1e-9), "By not even: {by} vs {by_m}");
            assert!(rel_eq(bz, -bz_m, 1e-9), "Bz not odd: {bz} vs {bz_m}");
        }
    }

    // Under the strip, near its centreline, the in-plane field dominates.
    for j in [4, 5] {
        let [_, by, bz] = vol.at(5, j, 0);
        assert!(by.abs() > 5.0 * bz.abs(), "By={by} Bz={bz}");
    }
    // Positive current along +x: uniform sign of By across the strip.
    assert!(vol.by.iter().all(|v| *v < 0.0) || vol.by.iter().all(|v| *v > 0.0));
}

#[test]
fn crossed_antennas_superpose() {
    let grid = scenario_a_grid();
    let a0 = scenario_a_antenna();
    let a90 = AntennaSpec {
        current_direction: 90.0,
        ..a0
    };

    let both = synthesize(&grid, &[a0, a90]).unwrap();
    let only0 = synthesize(&grid, &[a0]).unwrap();
    let only90 = synthesize(&grid, &[a90]).unwrap();

    let sum = FieldVolume {
        bx: &only0.bx + &only90.bx,
        by: &only0.by + &only90.by,
        bz: &only0.bz + &only90.bz,
    };
    assert_volumes_close(&both, &sum, 1e-12);
}

#[test]
fn doubling_current_doubles_the_field() {
    let grid = centred_grid();
    let a = centred_antenna(30.0);
    let twice = AntennaSpec {
        current: 2.0 * a.current,
        ..a
    };

    let base = synthesize(&grid, &[a]).unwrap();
    let doubled = synthesize(&grid, &[twice]).unwrap();
    let pair = synthesize(&grid, &[a, a]).unwrap();

    let expected = FieldVolume {
        bx: &base.bx * 2.0,
        by: &base.by * 2.0,
        bz: &base.bz * 2.0,
    };
    assert_volumes_close(&doubled, &expected, 1e-12);
    assert_volumes_close(&pair, &expected, 1e-12);
}

#[test]
fn half_turn_about_the_centre_negates_both_components() {
    let grid = centred_grid();
    let v0 = synthesize(&grid, &[centred_antenna(0.0)]).unwrap();
    let v180 = synthesize(&grid, &[centred_antenna(180.0)]).unwrap();
    // The centre row sits on the centreline where Bz is rounding noise.
    let tol = 1e-9 * v0.max_norm();

    assert!(v180.bx.iter().all(|v| *v == 0.0));
    for k in 0..2 {
        for j in 0..9 {
            for i in 0..9 {
                let [_, by0, bz0] = v0.at(i, j, k);
                let [_, by, bz] = v180.at(i, j, k);
                assert!(approx_eq(by, -by0, tol), "By ({i},{j},{k}): {by} vs {by0}");
                assert!(approx_eq(bz, -bz0, tol), "Bz ({i},{j},{k}): {bz} vs {bz0}");
            }
        }
    }
}

#[test]
fn quarter_turn_moves_the_in_plane_field_onto_x() {
    let grid = centred_grid();
    let v0 = synthesize(&grid, &[centred_antenna(0.0)]).unwrap();
    let v90 = synthesize(&grid, &[centred_antenna(90.0)]).unwrap();
    let tol = 1e-9 * v0.max_norm();

    assert!(v90.by.iter().all(|v| *v == 0.0));
    for k in 0..2 {
        for j in 0..9 {
            for i in 0..9 {
                // Rotating the configuration by +90°: B'(x, y) = R·B(R⁻¹(x, y)).
                let [_, by0, bz0] = v0.at(0, i, k);
                let [bx, _, bz] = v90.at(i, j, k);
                assert!(approx_eq(bx, -by0, tol), "Bx ({i},{j},{k}): {bx} vs {by0}");
                assert!(approx_eq(bz, -bz0, tol), "Bz ({i},{j},{k}): {bz} vs {bz0}");
            }
        }
    }
}

#[test]
fn sub_floor_fields_are_exact_zeros() {
    let grid = centred_grid();
    let faint = AntennaSpec {
        current: 1e-20,
        ..centred_antenna(45.0)
    };
    let vol = synthesize(&grid, &[faint]).unwrap();
    assert_eq!(vol.max_abs(), [0.0, 0.0, 0.0]);

    // Same geometry at a real current is well above the floor.
    let vol = synthesize(&grid, &[centred_antenna(45.0)]).unwrap();
    assert!(vol.max_abs().iter().all(|m| *m > 1e-6));
}

#[test]
fn single_step_matches_full_volume() {
    let grid = centred_grid();
    let ants = [centred_antenna(20.0), centred_antenna(-70.0)];
    let vol = synthesize(&grid, &ants).unwrap();
    for k in 0..grid.nz {
        assert_eq!(synthesize_step(&grid, &ants, k).unwrap(), vol.slice(k));
    }
    assert!(matches!(
        synthesize_step(&grid, &ants, grid.nz),
        Err(FieldError::StepOutOfRange { .. })
    ));
}

#[test]
fn invalid_inputs_are_rejected_before_synthesis() {
    let grid = scenario_a_grid();

    let mut a = scenario_a_antenna();
    a.thickness = 0.0;
    match synthesize(&grid, &[a]) {
        Err(FieldError::Validation(e)) => assert_eq!(e.field(), Some("antennas[0].thickness")),
        other => panic!("expected validation error, got {other:?}"),
    }

    let mut a = scenario_a_antenna();
    a.distance_to_sample = -1e-9;
    assert!(matches!(
        synthesize(&grid, &[scenario_a_antenna(), a]),
        Err(FieldError::Validation(ValidationError::Negative { .. }))
    ));

    assert!(matches!(
        synthesize(&grid, &[]),
        Err(FieldError::Validation(ValidationError::NoAntennas))
    ));

    let mut bad_grid = grid;
    bad_grid.nx = 0;
    assert!(synthesize(&bad_grid, &[scenario_a_antenna()]).is_err());

    let tight = SynthOptions {
        max_working_side: 64,
        ..SynthOptions::default()
    };
    assert_eq!(
        FieldSynthesizer::with_options(grid, &[scenario_a_antenna()], tight).unwrap_err(),
        ValidationError::WorkingGridTooLarge {
            side: 200,
            limit: 64
        }
    );
}

#[test]
fn nearly_cancelling_antennas_sum_to_exact_zeros() {
    let grid = centred_grid();
    let a = centred_antenna(30.0);
    // Opposite current, off by one part in 1e14: the sum is ~1e-17 T, not 0.
    let b = AntennaSpec {
        current: -a.current * (1.0 - 1e-14),
        ..a
    };

    let only_a = synthesize(&grid, &[a]).unwrap();
    let only_b = synthesize(&grid, &[b]).unwrap();
    assert!(only_a.max_abs().iter().all(|m| *m > 1e-6));
    assert!(only_b.max_abs().iter().all(|m| *m > 1e-6));

    let residue = FieldVolume {
        bx: &only_a.bx + &only_b.bx,
        by: &only_a.by + &only_b.by,
        bz: &only_a.bz + &only_b.bz,
    };
    let [rx, ry, rz] = residue.max_abs();
    for r in [rx, ry, rz] {
        assert!(r > 0.0 && r < 1e-15, "residue {r}");
    }

    let both = synthesize(&grid, &[a, b]).unwrap();
    assert_eq!(both.max_abs(), [0.0, 0.0, 0.0]);
}

#[test]
fn oblique_strip_follows_the_rotated_kernel() {
    // 33 × 33 cells of 0.25 µm, strip through the central cell, 2 µm gap:
    // the field varies slowly on the pitch, so bilinear rotation stays close.
    let grid = SampleGrid::new(33, 33, 1, 8.25e-6, 8.25e-6, 50e-9).unwrap();
    let theta = 30.0_f64;
    let a = AntennaSpec {
        width: 2e-6,
        thickness: 100e-9,
        position_x: 4.125e-6,
        position_y: 4.125e-6,
        current_direction: theta,
        distance_to_sample: 2e-6,
        current: 0.02,
    };
    let vol = synthesize(&grid, &[a]).unwrap();

    let (sin, cos) = theta.to_radians().sin_cos();
    let depth = a.depth_at(grid.z_at(0));
    let xs = grid.x_coords();
    let ys = grid.y_coords();

    let mut expected = Vec::with_capacity(xs.len() * ys.len());
    let mut peak = 0.0_f64;
    for (j, y) in ys.iter().enumerate() {
        for (i, x) in xs.iter().enumerate() {
            // Offset perpendicular to the current direction (cos θ, sin θ).
            let v = -(x - a.position_x) * sin + (y - a.position_y) * cos;
            let s = kernel::evaluate(v, depth, a.width, a.thickness, a.current, Component::InPlane);
            let bz =
                kernel::evaluate(v, depth, a.width, a.thickness, a.current, Component::OutOfPlane);
            let b = [-s * sin, s * cos, bz];
            peak = b.iter().fold(peak, |m, c| m.max(c.abs()));
            expected.push((i, j, b));
        }
    }

    let tol = 0.02 * peak;
    for (i, j, b) in expected {
        let got = vol.at(i, j, 0);
        for c in 0..3 {
            assert!(
                approx_eq(got[c], b[c], tol),
                "component {c} at ({i},{j}): {} vs {} (tol {tol})",
                got[c],
                b[c]
            );
        }
    }
}
