// src/params.rs

use std::f64::consts::PI;
use std::sync::OnceLock;

/// Vacuum permeability (T·m/A).
pub const MU0: f64 = 4.0 * PI * 1e-7;

/// Components whose peak magnitude stays below this (Tesla) are interpolation
/// residue of a field that is mathematically zero, and are cleared to 0.
pub const NOISE_FLOOR_T: f64 = 1e-15;

const DEFAULT_MAX_WORKING_SIDE: usize = 1 << 20;
static MAX_WORKING_SIDE: OnceLock<usize> = OnceLock::new();

/// Upper bound on working-grid nodes per axis (one kernel profile of this
/// length is held per antenna and component).
///
/// Override with `ANTENNA_FIELD_MAX_WORKING_SIDE`; read once per process.
pub fn default_max_working_side() -> usize {
    *MAX_WORKING_SIDE.get_or_init(|| {
        std::env::var("ANTENNA_FIELD_MAX_WORKING_SIDE")
            .ok()
            .and_then(|s| s.trim().parse::<usize>().ok())
            .filter(|&n| n > 0)
            .unwrap_or(DEFAULT_MAX_WORKING_SIDE)
    })
}

/// Knobs for one synthesis run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynthOptions {
    /// Compute z-slices on the rayon pool.
    pub parallel: bool,
    /// Reject working grids with more nodes than this per axis.
    pub max_working_side: usize,
    /// Clear components below [`NOISE_FLOOR_T`].
    pub noise_floor: f64,
}

impl Default for SynthOptions {
    fn default() -> Self {
        Self {
            parallel: false,
            max_working_side: default_max_working_side(),
            noise_floor: NOISE_FLOOR_T,
        }
    }
}
