// src/interp/mod.rs
//
// Order-1 resampling of 2D scalar planes indexed (row, col).

pub mod resample;
pub mod rotate;

pub use resample::resize;
pub use rotate::{rotate, rotate_rows_window, rotate_window};

use ndarray::{Array2, ArrayView2};

/// Rotate `field` about `center`, keep only `window`, and regrid that window
/// to `out_rows × out_cols`.
///
/// This is the only step of the synthesis that interpolates.
pub fn windowed_rotate_resample(
    field: ArrayView2<'_, f64>,
    angle_deg: f64,
    center: (f64, f64),
    window: Window,
    out_rows: usize,
    out_cols: usize,
) -> Array2<f64> {
    let cropped = rotate_window(field, angle_deg, center, window);
    resize(cropped.view(), out_rows, out_cols)
}

/// [`windowed_rotate_resample`] of the `profile.len() × n_cols` plane whose
/// every column equals `profile`, without building that plane.
///
/// Bit-identical to the plane version; scratch is the profile and the window.
pub fn windowed_rotate_resample_rows(
    profile: &[f64],
    n_cols: usize,
    angle_deg: f64,
    center: (f64, f64),
    window: Window,
    out_rows: usize,
    out_cols: usize,
) -> Array2<f64> {
    let cropped = rotate_rows_window(profile, n_cols, angle_deg, center, window);
    resize(cropped.view(), out_rows, out_cols)
}

/// Rectangular index window: `rows × cols` starting at (`row`, `col`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub row: usize,
    pub col: usize,
    pub rows: usize,
    pub cols: usize,
}

impl Window {
    /// `rows × cols` window centred in a `(n_rows, n_cols)` plane.
    pub fn centred(n_rows: usize, n_cols: usize, rows: usize, cols: usize) -> Self {
        let rows = rows.min(n_rows);
        let cols = cols.min(n_cols);
        Self {
            row: (n_rows - rows) / 2,
            col: (n_cols - cols) / 2,
            rows,
            cols,
        }
    }

    pub fn full(n_rows: usize, n_cols: usize) -> Self {
        Self {
            row: 0,
            col: 0,
            rows: n_rows,
            cols: n_cols,
        }
    }
}

// Positions this close outside [0, n-1] are rounding residue of an exact
// node mapping and still count as inside.
const EDGE_TOL: f64 = 1e-9;

#[inline]
fn clamp_index(i: isize, n: usize) -> usize {
    if i <= 0 {
        0
    } else {
        let max = (n - 1) as isize;
        if i >= max { n - 1 } else { i as usize }
    }
}

/// Bilinear sample at fractional index (r, c); 0 outside the plane.
#[inline]
pub(crate) fn sample_bilinear_or_zero(field: &ArrayView2<'_, f64>, r: f64, c: f64) -> f64 {
    let (nr, nc) = field.dim();
    bilinear_or_zero(nr, nc, r, c, |row, col| field[[row, col]])
}

/// Bilinear sample at fractional index (r, c) already inside the plane.
#[inline]
pub(crate) fn sample_bilinear_clamped(field: &ArrayView2<'_, f64>, r: f64, c: f64) -> f64 {
    let (nr, nc) = field.dim();
    bilinear_clamped(nr, nc, r, c, |row, col| field[[row, col]])
}

/// Bilinear sample of the `profile.len() × n_cols` plane whose every column
/// equals `profile`; 0 outside it.
///
/// Same arithmetic as [`sample_bilinear_or_zero`] on the expanded plane, so
/// both agree bit for bit.
#[inline]
pub(crate) fn sample_rows_or_zero(profile: &[f64], n_cols: usize, r: f64, c: f64) -> f64 {
    bilinear_or_zero(profile.len(), n_cols, r, c, |row, _| profile[row])
}

#[inline]
fn bilinear_or_zero<F>(nr: usize, nc: usize, r: f64, c: f64, at: F) -> f64
where
    F: Fn(usize, usize) -> f64,
{
    if nr == 0 || nc == 0 {
        return 0.0;
    }
    let max_r = (nr - 1) as f64;
    let max_c = (nc - 1) as f64;
    if !(r >= -EDGE_TOL && r <= max_r + EDGE_TOL && c >= -EDGE_TOL && c <= max_c + EDGE_TOL) {
        return 0.0;
    }
    bilinear_clamped(nr, nc, r.clamp(0.0, max_r), c.clamp(0.0, max_c), at)
}

#[inline]
fn bilinear_clamped<F>(nr: usize, nc: usize, r: f64, c: f64, at: F) -> f64
where
    F: Fn(usize, usize) -> f64,
{
    let r0f = r.floor();
    let c0f = c.floor();
    let tr = r - r0f;
    let tc = c - c0f;

    let r0 = clamp_index(r0f as isize, nr);
    let c0 = clamp_index(c0f as isize, nc);
    let r1 = clamp_index(r0f as isize + 1, nr);
    let c1 = clamp_index(c0f as isize + 1, nc);

    // Skip the far neighbours on exact nodes so 0·inf never leaks in.
    let row_lerp = |row: usize| -> f64 {
        let a = at(row, c0);
        if tc == 0.0 { a } else { a * (1.0 - tc) + at(row, c1) * tc }
    };

    let v0 = row_lerp(r0);
    if tr == 0.0 {
        v0
    } else {
        v0 * (1.0 - tr) + row_lerp(r1) * tr
    }
}
