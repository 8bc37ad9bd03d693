// src/vector_field.rs

use ndarray::{Array2, Array3, ArrayView2, ArrayViewMut2, Axis, s};

use crate::grid::SampleGrid;

/// One z-slice of the flux density (Tesla), arrays indexed (y, x).
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSlice {
    pub bx: Array2<f64>,
    pub by: Array2<f64>,
    pub bz: Array2<f64>,
}

impl FieldSlice {
    pub fn zeros(ny: usize, nx: usize) -> Self {
        Self {
            bx: Array2::zeros((ny, nx)),
            by: Array2::zeros((ny, nx)),
            bz: Array2::zeros((ny, nx)),
        }
    }

    /// (ny, nx)
    pub fn dim(&self) -> (usize, usize) {
        self.bx.dim()
    }

    /// Elementwise accumulate another contribution.
    pub fn add_assign(&mut self, other: &FieldSlice) {
        self.bx += &other.bx;
        self.by += &other.by;
        self.bz += &other.bz;
    }

    pub fn components(&self) -> [&Array2<f64>; 3] {
        [&self.bx, &self.by, &self.bz]
    }

    pub fn components_mut(&mut self) -> [&mut Array2<f64>; 3] {
        [&mut self.bx, &mut self.by, &mut self.bz]
    }

    /// Peak |B| per component.
    pub fn max_abs(&self) -> [f64; 3] {
        self.components().map(|a| max_abs(a.view()))
    }
}

/// Flux density over the whole sample, three dense (z, y, x) buffers.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldVolume {
    pub bx: Array3<f64>,
    pub by: Array3<f64>,
    pub bz: Array3<f64>,
}

impl FieldVolume {
    pub fn zeros(grid: &SampleGrid) -> Self {
        let shape = (grid.nz, grid.ny, grid.nx);
        Self {
            bx: Array3::zeros(shape),
            by: Array3::zeros(shape),
            bz: Array3::zeros(shape),
        }
    }

    /// (nz, ny, nx)
    pub fn dim(&self) -> (usize, usize, usize) {
        self.bx.dim()
    }

    pub fn n_slices(&self) -> usize {
        self.bx.len_of(Axis(0))
    }

    /// Owned copy of slice `k`.
    pub fn slice(&self, k: usize) -> FieldSlice {
        FieldSlice {
            bx: self.bx.slice(s![k, .., ..]).to_owned(),
            by: self.by.slice(s![k, .., ..]).to_owned(),
            bz: self.bz.slice(s![k, .., ..]).to_owned(),
        }
    }

    /// Overwrite slice `k`.
    pub fn set_slice(&mut self, k: usize, slice: &FieldSlice) {
        self.bx.slice_mut(s![k, .., ..]).assign(&slice.bx);
        self.by.slice_mut(s![k, .., ..]).assign(&slice.by);
        self.bz.slice_mut(s![k, .., ..]).assign(&slice.bz);
    }

    /// Disjoint mutable (bx, by, bz) views, one triple per z-slice.
    pub fn slices_mut(
        &mut self,
    ) -> impl Iterator<Item = (ArrayViewMut2<'_, f64>, ArrayViewMut2<'_, f64>, ArrayViewMut2<'_, f64>)>
    {
        self.bx
            .outer_iter_mut()
            .zip(self.by.outer_iter_mut())
            .zip(self.bz.outer_iter_mut())
            .map(|((x, y), z)| (x, y, z))
    }

    /// Vector at voxel (i, j, k) = (x, y, z) index.
    #[inline]
    pub fn at(&self, i: usize, j: usize, k: usize) -> [f64; 3] {
        [self.bx[[k, j, i]], self.by[[k, j, i]], self.bz[[k, j, i]]]
    }

    /// Peak |B| per component over the volume.
    pub fn max_abs(&self) -> [f64; 3] {
        [&self.bx, &self.by, &self.bz].map(|a| a.iter().fold(0.0_f64, |m, v| m.max(v.abs())))
    }

    /// Peak |B| over all voxels.
    pub fn max_norm(&self) -> f64 {
        let mut peak = 0.0_f64;
        for ((x, y), z) in self.bx.iter().zip(self.by.iter()).zip(self.bz.iter()) {
            peak = peak.max((x * x + y * y + z * z).sqrt());
        }
        peak
    }
}

/// Largest |value| in a plane; NaN entries are skipped.
pub fn max_abs(a: ArrayView2<'_, f64>) -> f64 {
    a.iter().fold(0.0_f64, |m, v| m.max(v.abs()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slices_round_trip_into_the_volume() {
        let grid = SampleGrid::new(3, 2, 4, 3e-6, 2e-6, 4e-8).unwrap();
        let mut vol = FieldVolume::zeros(&grid);
        assert_eq!(vol.dim(), (4, 2, 3));

        let mut s = FieldSlice::zeros(2, 3);
        s.bx[[1, 2]] = 1.0;
        s.bz[[0, 0]] = -2.0;
        vol.set_slice(2, &s);

        assert_eq!(vol.at(2, 1, 2), [1.0, 0.0, 0.0]);
        assert_eq!(vol.at(0, 0, 2), [0.0, 0.0, -2.0]);
        assert_eq!(vol.slice(2), s);
        assert_eq!(vol.slice(1), FieldSlice::zeros(2, 3));
        assert_eq!(vol.max_abs(), [1.0, 0.0, 2.0]);
        assert_eq!(vol.max_norm(), 2.0);
    }

    #[test]
    fn accumulation_adds_componentwise() {
        let mut a = FieldSlice::zeros(2, 2);
        a.by.fill(1.5);
        let mut b = FieldSlice::zeros(2, 2);
        b.by.fill(0.5);
        b.bz[[1, 1]] = -3.0;
        a.add_assign(&b);
        assert_eq!(a.by[[0, 1]], 2.0);
        assert_eq!(a.max_abs(), [0.0, 2.0, 3.0]);
    }

    #[test]
    fn slices_mut_visits_every_slice_once() {
        let grid = SampleGrid::new(2, 2, 3, 1.0, 1.0, 1.0).unwrap();
        let mut vol = FieldVolume::zeros(&grid);
        for (k, (mut bx, _, _)) in vol.slices_mut().enumerate() {
            bx.fill(k as f64);
        }
        assert_eq!(vol.n_slices(), 3);
        assert_eq!(vol.at(1, 1, 2)[0], 2.0);
    }
}
