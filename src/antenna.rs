// src/antenna.rs

use serde::{Deserialize, Serialize};

use crate::error::{ValidationError, check_finite, check_non_negative, check_positive};
use crate::interp::rotate::sin_cos_deg;

/// One straight microstrip conductor of rectangular cross-section.
///
/// Lengths in metres, `current_direction` in degrees from +x, `current` in amperes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AntennaSpec {
    pub width: f64,
    pub thickness: f64,
    pub position_x: f64,
    pub position_y: f64,
    #[serde(default)]
    pub current_direction: f64,
    /// Gap between the conductor face and the nearest sample cell.
    pub distance_to_sample: f64,
    pub current: f64,
}

impl AntennaSpec {
    /// Check every parameter; `index` is the antenna's position in its list
    /// and appears in the reported field name.
    pub fn validate(&self, index: usize) -> Result<(), ValidationError> {
        let name = |f: &str| format!("antennas[{index}].{f}");
        check_positive(&name("width"), self.width)?;
        check_positive(&name("thickness"), self.thickness)?;
        check_finite(&name("position_x"), self.position_x)?;
        check_finite(&name("position_y"), self.position_y)?;
        check_finite(&name("current_direction"), self.current_direction)?;
        check_non_negative(&name("distance_to_sample"), self.distance_to_sample)?;
        check_finite(&name("current"), self.current)?;
        Ok(())
    }

    #[inline]
    pub fn half_width(&self) -> f64 {
        0.5 * self.width
    }

    #[inline]
    pub fn half_thickness(&self) -> f64 {
        0.5 * self.thickness
    }

    /// Distance from the conductor's mid-thickness plane to a sample plane at height `z`.
    #[inline]
    pub fn depth_at(&self, z: f64) -> f64 {
        self.half_thickness() + self.distance_to_sample + z
    }

    /// (sin θ, cos θ) of the current direction.
    pub fn direction_sin_cos(&self) -> (f64, f64) {
        sin_cos_deg(self.current_direction)
    }
}

/// Validate a whole antenna list; an empty list is rejected.
pub fn validate_all(antennas: &[AntennaSpec]) -> Result<(), ValidationError> {
    if antennas.is_empty() {
        return Err(ValidationError::NoAntennas);
    }
    for (i, a) in antennas.iter().enumerate() {
        a.validate(i)?;
    }
    Ok(())
}
