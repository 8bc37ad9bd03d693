// src/kernel.rs
//
// Near field of an infinitely long conductor with a rectangular
// cross-section (2a × 2b) carrying a uniform current density.
//
// Integrating the 2D line-current Biot–Savart kernel over the section gives,
// with x the in-plane offset from the centreline and z the depth from the
// mid-thickness plane:
//
//   B_par(x, z) = K [ (x+a)/2 ln(((x+a)²+(z+b)²)/((x+a)²+(z-b)²))
//                   - (x-a)/2 ln(((x-a)²+(z+b)²)/((x-a)²+(z-b)²))
//                   + (z+b) (atan((x+a)/(z+b)) - atan((x-a)/(z+b)))
//                   - (z-b) (atan((x+a)/(z-b)) - atan((x-a)/(z-b))) ]
//
//   B_perp(x, z) = same with (x, a) and (z, b) exchanged
//
//   K = μ0 I / (8π a b)
//
// No guards: a = 0 or b = 0 divides by zero, and points on the conductor's
// faces produce IEEE inf/NaN. Callers validate first.

use crate::params::MU0;
use std::f64::consts::PI;

/// Which field component the kernel returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    /// Parallel to the sample plane, perpendicular to the current.
    InPlane,
    /// Along the thickness axis.
    OutOfPlane,
}

/// Shared bracket of both components; `u` runs along the half-extent `a`,
/// `v` along `b`.
#[inline]
fn bracket(u: f64, v: f64, a: f64, b: f64) -> f64 {
    let up = u + a;
    let um = u - a;
    let vp = v + b;
    let vm = v - b;

    let log_p = ((up * up + vp * vp) / (up * up + vm * vm)).ln();
    let log_m = ((um * um + vp * vp) / (um * um + vm * vm)).ln();

    0.5 * up * log_p - 0.5 * um * log_m + vp * ((up / vp).atan() - (um / vp).atan())
        - vm * ((up / vm).atan() - (um / vm).atan())
}

/// Field (Tesla) at `perp_offset` from the centreline and `depth` from the
/// mid-thickness plane.
#[inline]
pub fn evaluate(
    perp_offset: f64,
    depth: f64,
    width: f64,
    thickness: f64,
    current: f64,
    component: Component,
) -> f64 {
    let a = 0.5 * width;
    let b = 0.5 * thickness;
    let k = MU0 * current / (8.0 * PI * a * b);

    match component {
        Component::InPlane => k * bracket(perp_offset, depth, a, b),
        Component::OutOfPlane => k * bracket(depth, perp_offset, b, a),
    }
}

/// Evaluate along a line of offsets at a single depth.
pub fn evaluate_profile(
    offsets: &[f64],
    depth: f64,
    width: f64,
    thickness: f64,
    current: f64,
    component: Component,
) -> Vec<f64> {
    offsets
        .iter()
        .map(|&x| evaluate(x, depth, width, thickness, current, component))
        .collect()
}
