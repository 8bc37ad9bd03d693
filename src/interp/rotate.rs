// src/interp/rotate.rs

use ndarray::{Array2, ArrayView2};

use super::{Window, sample_bilinear_or_zero, sample_rows_or_zero};

/// (sin, cos) of an angle in degrees, exact at multiples of 90°.
pub fn sin_cos_deg(angle_deg: f64) -> (f64, f64) {
    let quarter = angle_deg / 90.0;
    if quarter == quarter.round() && quarter.abs() < 1e15 {
        match (quarter as i64).rem_euclid(4) {
            0 => (0.0, 1.0),
            1 => (1.0, 0.0),
            2 => (0.0, -1.0),
            _ => (-1.0, 0.0),
        }
    } else {
        angle_deg.to_radians().sin_cos()
    }
}

/// Rotate `field` counter-clockwise by `angle_deg` about `center` = (row, col).
///
/// Index space is read as (x, y) = (col, row), so content moves by
/// [[cos, -sin], [sin, cos]]. Samples that come from outside the plane are 0.
/// With `crop_shape` the result is the centred `(rows, cols)` window of the
/// rotated plane, otherwise it has the input's shape.
pub fn rotate(
    field: ArrayView2<'_, f64>,
    angle_deg: f64,
    center: (f64, f64),
    crop_shape: Option<(usize, usize)>,
) -> Array2<f64> {
    let (nr, nc) = field.dim();
    let window = match crop_shape {
        Some((rows, cols)) => Window::centred(nr, nc, rows, cols),
        None => Window::full(nr, nc),
    };
    rotate_window(field, angle_deg, center, window)
}

/// Same as [`rotate`], but only the pixels of `window` are computed.
pub fn rotate_window(
    field: ArrayView2<'_, f64>,
    angle_deg: f64,
    center: (f64, f64),
    window: Window,
) -> Array2<f64> {
    rotate_with(angle_deg, center, window, |r, c| {
        sample_bilinear_or_zero(&field, r, c)
    })
}

/// [`rotate_window`] of the `profile.len() × n_cols` plane that is constant
/// along each row, reading `profile` directly.
pub fn rotate_rows_window(
    profile: &[f64],
    n_cols: usize,
    angle_deg: f64,
    center: (f64, f64),
    window: Window,
) -> Array2<f64> {
    rotate_with(angle_deg, center, window, |r, c| {
        sample_rows_or_zero(profile, n_cols, r, c)
    })
}

fn rotate_with<F>(angle_deg: f64, center: (f64, f64), window: Window, sample: F) -> Array2<f64>
where
    F: Fn(f64, f64) -> f64,
{
    let (s, c) = sin_cos_deg(angle_deg);
    let (cr, cc) = center;

    Array2::from_shape_fn((window.rows, window.cols), |(i, j)| {
        let dy = (window.row + i) as f64 - cr;
        let dx = (window.col + j) as f64 - cc;
        // Inverse map: output pixel p reads input at c + R(-θ)(p - c).
        let src_c = cc + c * dx + s * dy;
        let src_r = cr - s * dx + c * dy;
        sample(src_r, src_c)
    })
}
