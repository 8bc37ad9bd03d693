// src/synth.rs
//
// Multi-antenna field synthesis on the sample grid.
//
// Per z-slice and antenna:
//   1. evaluate the kernel on the working plane with the antenna lying along x
//      (offset = y_working - position_y, depth = t/2 + gap + z)
//   2. rotate the in-plane scalar and Bz about the node nearest the antenna
//      centre, crop to the sample window and regrid to ny × nx; the unrotated
//      planes are constant along x, so only their row profiles are kept
//   3. split the in-plane scalar into Bx = -s sinθ, By = s cosθ
//   4. clear components below the noise floor and accumulate
//
// Splitting after the regrid is equivalent to splitting before it (both steps
// are linear) and interpolates one plane instead of two.

use std::error::Error;
use std::path::PathBuf;

use ndarray::ArrayViewMut2;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::antenna::{AntennaSpec, validate_all};
use crate::error::{FieldError, FieldResult, ValidationError};
use crate::grid::{SampleGrid, WorkingGrid};
use crate::interp::{Window, windowed_rotate_resample_rows};
use crate::kernel::{self, Component};
use crate::params::SynthOptions;
use crate::vector_field::{FieldSlice, FieldVolume};

/// Consumer of finished slices in preview mode (e.g. a plotting backend).
///
/// Returns the path of whatever it produced for the slice.
pub trait SliceRenderer {
    fn render(
        &mut self,
        step: usize,
        grid: &SampleGrid,
        slice: &FieldSlice,
    ) -> Result<PathBuf, Box<dyn Error + Send + Sync>>;
}

type ProgressFn = dyn Fn(usize, usize) + Send + Sync;

/// Validated grid + antenna list, ready to produce slices.
///
/// Holds no mutable state: every call allocates its own output.
pub struct FieldSynthesizer {
    grid: SampleGrid,
    antennas: Vec<AntennaSpec>,
    working: WorkingGrid,
    window: Window,
    options: SynthOptions,
    on_slice_done: Option<Box<ProgressFn>>,
}

impl std::fmt::Debug for FieldSynthesizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldSynthesizer")
            .field("grid", &self.grid)
            .field("antennas", &self.antennas)
            .field("working", &self.working)
            .field("window", &self.window)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl FieldSynthesizer {
    pub fn new(grid: SampleGrid, antennas: &[AntennaSpec]) -> Result<Self, ValidationError> {
        Self::with_options(grid, antennas, SynthOptions::default())
    }

    pub fn with_options(
        grid: SampleGrid,
        antennas: &[AntennaSpec],
        options: SynthOptions,
    ) -> Result<Self, ValidationError> {
        grid.validate()?;
        validate_all(antennas)?;
        let working = WorkingGrid::for_sample(&grid, options.max_working_side)?;
        let window = working.sample_window(&grid);

        debug!(
            working_n = working.n,
            pitch = working.pitch,
            window_rows = window.rows,
            window_cols = window.cols,
            "working grid"
        );

        Ok(Self {
            grid,
            antennas: antennas.to_vec(),
            working,
            window,
            options,
            on_slice_done: None,
        })
    }

    /// Register `f(step_index, total_steps)`, called once per finished slice.
    ///
    /// In parallel runs slices finish out of order and `f` runs on worker threads.
    pub fn on_slice_done<F>(mut self, f: F) -> Self
    where
        F: Fn(usize, usize) + Send + Sync + 'static,
    {
        self.on_slice_done = Some(Box::new(f));
        self
    }

    pub fn grid(&self) -> &SampleGrid {
        &self.grid
    }

    pub fn antennas(&self) -> &[AntennaSpec] {
        &self.antennas
    }

    pub fn working_grid(&self) -> &WorkingGrid {
        &self.working
    }

    /// All nz slices as one (z, y, x) volume.
    pub fn synthesize(&self) -> FieldVolume {
        let nz = self.grid.nz;
        info!(
            nx = self.grid.nx,
            ny = self.grid.ny,
            nz,
            antennas = self.antennas.len(),
            working_n = self.working.n,
            parallel = self.options.parallel,
            "synthesizing antenna field"
        );

        let mut volume = FieldVolume::zeros(&self.grid);
        if self.options.parallel {
            volume
                .slices_mut()
                .enumerate()
                .par_bridge()
                .for_each(|(k, (bx, by, bz))| self.fill_slice(k, bx, by, bz));
        } else {
            volume
                .slices_mut()
                .enumerate()
                .for_each(|(k, (bx, by, bz))| self.fill_slice(k, bx, by, bz));
        }

        let [mx, my, mz] = volume.max_abs();
        info!(
            max_bx = mx,
            max_by = my,
            max_bz = mz,
            max_norm = volume.max_norm(),
            "peak field [T]"
        );
        volume
    }

    /// Slice `step` only, for incremental or preview callers.
    pub fn synthesize_slice(&self, step: usize) -> FieldResult<FieldSlice> {
        self.check_step(step)?;
        let slice = self.compute_slice(step);
        self.report(step, self.grid.nz);
        Ok(slice)
    }

    /// Hand each finished slice (or only `step`) to `renderer` and collect its paths.
    ///
    /// Renderer failures abort the run and are returned as [`FieldError::Render`].
    pub fn preview<R>(&self, renderer: &mut R, step: Option<usize>) -> FieldResult<Vec<PathBuf>>
    where
        R: SliceRenderer + ?Sized,
    {
        let steps = match step {
            Some(k) => {
                self.check_step(k)?;
                k..k + 1
            }
            None => 0..self.grid.nz,
        };

        let mut paths = Vec::with_capacity(steps.len());
        for k in steps {
            let slice = self.compute_slice(k);
            self.report(k, self.grid.nz);
            let path = renderer
                .render(k, &self.grid, &slice)
                .map_err(|source| FieldError::Render { step: k, source })?;
            paths.push(path);
        }
        Ok(paths)
    }

    fn fill_slice(
        &self,
        k: usize,
        mut bx: ArrayViewMut2<'_, f64>,
        mut by: ArrayViewMut2<'_, f64>,
        mut bz: ArrayViewMut2<'_, f64>,
    ) {
        let slice = self.compute_slice(k);
        bx.assign(&slice.bx);
        by.assign(&slice.by);
        bz.assign(&slice.bz);
        self.report(k, self.grid.nz);
    }

    fn check_step(&self, step: usize) -> FieldResult<()> {
        if step >= self.grid.nz {
            return Err(FieldError::StepOutOfRange {
                step,
                n_z: self.grid.nz,
            });
        }
        Ok(())
    }

    fn report(&self, step: usize, total: usize) {
        debug!(slice = step, total, "slice done");
        if let Some(f) = &self.on_slice_done {
            f(step, total);
        }
    }

    fn compute_slice(&self, k: usize) -> FieldSlice {
        let z = self.grid.z_at(k);
        let mut acc: Option<FieldSlice> = None;

        for (i, antenna) in self.antennas.iter().enumerate() {
            let contribution = self.antenna_slice(antenna, z);
            debug!(slice = k, antenna = i, max_abs = ?contribution.max_abs(), "antenna contribution");
            match acc.as_mut() {
                None => acc = Some(contribution),
                Some(sum) => sum.add_assign(&contribution),
            }
        }

        let mut slice = acc.unwrap_or_else(|| FieldSlice::zeros(self.grid.ny, self.grid.nx));
        apply_noise_floor(&mut slice, self.options.noise_floor);
        slice
    }

    /// One antenna's field on the sample plane at height `z`.
    fn antenna_slice(&self, antenna: &AntennaSpec, z: f64) -> FieldSlice {
        let n = self.working.n;
        let depth = antenna.depth_at(z);

        // Unrotated antenna runs along x: the field only varies down the rows.
        let offsets: Vec<f64> = self
            .working
            .y_coords()
            .into_iter()
            .map(|y| y - antenna.position_y)
            .collect();
        let profile = |component| {
            kernel::evaluate_profile(
                &offsets,
                depth,
                antenna.width,
                antenna.thickness,
                antenna.current,
                component,
            )
        };
        let in_plane = profile(Component::InPlane);
        let out_of_plane = profile(Component::OutOfPlane);

        let bad = in_plane
            .iter()
            .chain(&out_of_plane)
            .filter(|v| !v.is_finite())
            .count();
        if bad > 0 {
            warn!(non_finite = bad, depth, "kernel produced non-finite values");
        }

        let angle = antenna.current_direction;
        let center = self
            .working
            .nearest_node(antenna.position_x, antenna.position_y);
        let (ny, nx) = (self.grid.ny, self.grid.nx);

        // Both profiles describe n × n planes constant along each row.
        let s = windowed_rotate_resample_rows(&in_plane, n, angle, center, self.window, ny, nx);
        let bz = windowed_rotate_resample_rows(&out_of_plane, n, angle, center, self.window, ny, nx);

        let (sin, cos) = antenna.direction_sin_cos();
        let mut slice = FieldSlice {
            bx: s.mapv(|v| -v * sin),
            by: s.mapv(|v| v * cos),
            bz,
        };
        apply_noise_floor(&mut slice, self.options.noise_floor);
        slice
    }
}

/// Set a component to exactly 0 when every |value| is below `floor`.
///
/// A component holding NaN is left alone.
pub fn apply_noise_floor(slice: &mut FieldSlice, floor: f64) {
    for c in slice.components_mut() {
        if c.iter().all(|v| v.abs() < floor) {
            c.fill(0.0);
        }
    }
}

/// Synthesize the full volume with default options.
pub fn synthesize(grid: &SampleGrid, antennas: &[AntennaSpec]) -> FieldResult<FieldVolume> {
    Ok(FieldSynthesizer::new(*grid, antennas)?.synthesize())
}

/// Synthesize only z-slice `step` with default options.
pub fn synthesize_step(
    grid: &SampleGrid,
    antennas: &[AntennaSpec],
    step: usize,
) -> FieldResult<FieldSlice> {
    FieldSynthesizer::new(*grid, antennas)?.synthesize_slice(step)
}
