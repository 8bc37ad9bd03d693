// src/interp/resample.rs

use ndarray::{Array2, ArrayView2};

use super::sample_bilinear_clamped;

/// `n` evenly spaced points over [0, len - 1]; a single point sits at 0.
fn index_linspace(len: usize, n: usize) -> Vec<f64> {
    if n == 1 || len <= 1 {
        return vec![0.0; n];
    }
    let last = (len - 1) as f64;
    let denom = (n - 1) as f64;
    (0..n).map(|i| i as f64 * last / denom).collect()
}

/// Regrid `field` to `new_rows × new_cols` by bilinear interpolation over index space.
///
/// The corner samples stay on the corners, so the represented span is
/// unchanged and only the resolution moves.
pub fn resize(field: ArrayView2<'_, f64>, new_rows: usize, new_cols: usize) -> Array2<f64> {
    let (nr, nc) = field.dim();
    if nr == 0 || nc == 0 {
        return Array2::zeros((new_rows, new_cols));
    }
    if (nr, nc) == (new_rows, new_cols) {
        return field.to_owned();
    }

    let rs = index_linspace(nr, new_rows);
    let cs = index_linspace(nc, new_cols);
    Array2::from_shape_fn((new_rows, new_cols), |(i, j)| {
        sample_bilinear_clamped(&field, rs[i], cs[j])
    })
}
