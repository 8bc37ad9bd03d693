// src/grid.rs

use crate::error::{ValidationError, check_positive};
use crate::interp::Window;

/// Rectilinear sample volume: nx × ny × nz cells spanning size_x × size_y × size_z metres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleGrid {
    pub nx: usize,
    pub ny: usize,
    pub nz: usize,
    pub size_x: f64,
    pub size_y: f64,
    pub size_z: f64,
}

impl SampleGrid {
    /// Create a validated grid.
    pub fn new(
        nx: usize,
        ny: usize,
        nz: usize,
        size_x: f64,
        size_y: f64,
        size_z: f64,
    ) -> Result<Self, ValidationError> {
        let g = Self {
            nx,
            ny,
            nz,
            size_x,
            size_y,
            size_z,
        };
        g.validate()?;
        Ok(g)
    }

    /// All counts must be > 0 and all extents finite and > 0.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, n) in [("grid.n_x", self.nx), ("grid.n_y", self.ny), ("grid.n_z", self.nz)] {
            if n == 0 {
                return Err(ValidationError::NonPositiveCount {
                    field: field.to_string(),
                    value: n,
                });
            }
        }
        check_positive("grid.size_x", self.size_x)?;
        check_positive("grid.size_y", self.size_y)?;
        check_positive("grid.size_z", self.size_z)?;
        Ok(())
    }

    #[inline]
    pub fn dx(&self) -> f64 {
        self.size_x / self.nx as f64
    }

    #[inline]
    pub fn dy(&self) -> f64 {
        self.size_y / self.ny as f64
    }

    #[inline]
    pub fn dz(&self) -> f64 {
        self.size_z / self.nz as f64
    }

    /// Total number of voxels.
    pub fn n_cells(&self) -> usize {
        self.nx * self.ny * self.nz
    }

    /// Cell-centre x coordinates, (i + 0.5) * dx.
    pub fn x_coords(&self) -> Vec<f64> {
        cell_centres(self.nx, self.dx())
    }

    pub fn y_coords(&self) -> Vec<f64> {
        cell_centres(self.ny, self.dy())
    }

    pub fn z_coords(&self) -> Vec<f64> {
        cell_centres(self.nz, self.dz())
    }

    /// Centre of z-slice `k`.
    #[inline]
    pub fn z_at(&self, k: usize) -> f64 {
        (k as f64 + 0.5) * self.dz()
    }
}

fn cell_centres(n: usize, d: f64) -> Vec<f64> {
    (0..n).map(|i| (i as f64 + 0.5) * d).collect()
}

/// Square, isotropic auxiliary plane used while a field is rotated.
///
/// Pitch is min(dx, dy); the side is twice the larger sample extent, centred
/// on the sample, so rotation never pulls zeros into the sample window.
/// Nodes sit on the lattice (m + 0.5) * pitch, which puts the cell centres of
/// the finer sample axis exactly on working nodes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkingGrid {
    pub n: usize,
    pub pitch: f64,
    /// Coordinate of column 0.
    pub x0: f64,
    /// Coordinate of row 0.
    pub y0: f64,
}

impl WorkingGrid {
    pub fn for_sample(grid: &SampleGrid, max_side: usize) -> Result<Self, ValidationError> {
        let pitch = grid.dx().min(grid.dy());
        let span = 2.0 * grid.size_x.max(grid.size_y);

        // Tolerate the last ulp of span/pitch so exact multiples don't gain a node.
        let n_f = (span / pitch - 1e-9).ceil().max(1.0);
        if !n_f.is_finite() || n_f > max_side as f64 {
            return Err(ValidationError::WorkingGridTooLarge {
                side: if n_f.is_finite() { n_f as usize } else { usize::MAX },
                limit: max_side,
            });
        }
        let n = n_f as usize;

        let first_node = |centre: f64| -> f64 {
            let m0 = (centre / pitch - 0.5 - 0.5 * (n as f64 - 1.0)).round();
            (m0 + 0.5) * pitch
        };

        Ok(Self {
            n,
            pitch,
            x0: first_node(0.5 * grid.size_x),
            y0: first_node(0.5 * grid.size_y),
        })
    }

    #[inline]
    pub fn x(&self, col: usize) -> f64 {
        self.x0 + col as f64 * self.pitch
    }

    #[inline]
    pub fn y(&self, row: usize) -> f64 {
        self.y0 + row as f64 * self.pitch
    }

    /// Row coordinates, used as the antenna-local offset axis.
    pub fn y_coords(&self) -> Vec<f64> {
        (0..self.n).map(|j| self.y(j)).collect()
    }

    /// Index-space (row, col) of the node nearest to physical (x, y).
    ///
    /// Not clamped: an antenna outside the working plane still rotates about
    /// its own (virtual) node.
    pub fn nearest_node(&self, x: f64, y: f64) -> (f64, f64) {
        (
            ((y - self.y0) / self.pitch).round(),
            ((x - self.x0) / self.pitch).round(),
        )
    }

    /// Working-grid window whose corner nodes coincide (to within half a
    /// pitch) with the first and last sample cell centres along each axis.
    pub fn sample_window(&self, grid: &SampleGrid) -> Window {
        let span = |first: f64, last: f64, origin: f64| -> (usize, usize) {
            let start = ((first - origin) / self.pitch).round().max(0.0) as usize;
            let end = (((last - origin) / self.pitch).round().max(0.0) as usize)
                .min(self.n - 1)
                .max(start);
            (start, end - start + 1)
        };

        let (row, rows) = span(0.5 * grid.dy(), grid.size_y - 0.5 * grid.dy(), self.y0);
        let (col, cols) = span(0.5 * grid.dx(), grid.size_x - 0.5 * grid.dx(), self.x0);
        Window {
            row,
            col,
            rows,
            cols,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64, rel: f64) -> bool {
        (a - b).abs() <= rel * a.abs().max(b.abs()).max(1e-30)
    }

    #[test]
    fn rejects_bad_dimensions() {
        let e = SampleGrid::new(0, 4, 1, 1e-6, 1e-6, 1e-6).unwrap_err();
        assert_eq!(e.field(), Some("grid.n_x"));

        let e = SampleGrid::new(4, 4, 1, 1e-6, -1e-6, 1e-6).unwrap_err();
        assert_eq!(e.field(), Some("grid.size_y"));

        let e = SampleGrid::new(4, 4, 1, 1e-6, 1e-6, f64::NAN).unwrap_err();
        assert_eq!(e.field(), Some("grid.size_z"));
    }

    #[test]
    fn cell_centres_are_offset_by_half_a_cell() {
        let g = SampleGrid::new(4, 2, 5, 4e-6, 1e-6, 5e-8).unwrap();
        let x = g.x_coords();
        assert_eq!(x.len(), 4);
        assert!(approx(x[0], 0.5e-6, 1e-12));
        assert!(approx(x[3], 3.5e-6, 1e-12));
        assert!(approx(g.y_coords()[1], 0.75e-6, 1e-12));
        assert!(approx(g.z_at(4), 4.5e-8, 1e-12));
        assert_eq!(g.z_coords().len(), 5);
        assert_eq!(g.n_cells(), 40);
    }

    #[test]
    fn working_grid_covers_twice_the_larger_extent() {
        let g = SampleGrid::new(10, 10, 1, 5e-5, 5e-6, 5e-8).unwrap();
        let w = WorkingGrid::for_sample(&g, 8192).unwrap();

        assert!(approx(w.pitch, 5e-7, 1e-12));
        assert_eq!(w.n, 200);
        // Centred on the sample.
        let cx = 0.5 * (w.x(0) + w.x(w.n - 1));
        let cy = 0.5 * (w.y(0) + w.y(w.n - 1));
        assert!((cx - 2.5e-5).abs() <= w.pitch);
        assert!((cy - 2.5e-6).abs() <= w.pitch);
    }

    #[test]
    fn fine_axis_cell_centres_fall_on_working_nodes() {
        let g = SampleGrid::new(10, 10, 1, 5e-5, 5e-6, 5e-8).unwrap();
        let w = WorkingGrid::for_sample(&g, 8192).unwrap();
        let win = w.sample_window(&g);

        assert_eq!(win.rows, 10);
        for (k, y) in g.y_coords().iter().enumerate() {
            assert!(approx(w.y(win.row + k), *y, 1e-9));
        }
        // x is the coarse axis: first and last centres are 90 pitches apart,
        // each end rounded to the nearest node.
        assert!((90..=92).contains(&win.cols), "cols = {}", win.cols);
        assert!(win.col + win.cols <= w.n);
    }

    #[test]
    fn oversized_working_grid_is_rejected() {
        let g = SampleGrid::new(512, 512, 1, 2.5e-3, 25.6e-6, 1e-5).unwrap();
        let e = WorkingGrid::for_sample(&g, 8192).unwrap_err();
        assert!(matches!(e, ValidationError::WorkingGridTooLarge { limit: 8192, .. }));
    }

    #[test]
    fn nearest_node_rounds_to_lattice() {
        let g = SampleGrid::new(9, 9, 1, 9e-6, 9e-6, 1e-7).unwrap();
        let w = WorkingGrid::for_sample(&g, 8192).unwrap();
        let win = w.sample_window(&g);
        let (r, c) = w.nearest_node(4.5e-6, 4.5e-6);
        // The sample centre is the middle node of the sample window.
        assert_eq!(r as usize, win.row + 4);
        assert_eq!(c as usize, win.col + 4);
    }
}
