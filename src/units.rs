// src/units.rs

use crate::antenna::AntennaSpec;
use crate::grid::SampleGrid;

const SI_PREFIXES: [(i32, &str); 17] = [
    (-24, "y"),
    (-21, "z"),
    (-18, "a"),
    (-15, "f"),
    (-12, "p"),
    (-9, "n"),
    (-6, "µ"),
    (-3, "m"),
    (0, ""),
    (3, "k"),
    (6, "M"),
    (9, "G"),
    (12, "T"),
    (15, "P"),
    (18, "E"),
    (21, "Z"),
    (24, "Y"),
];

/// Decimal exponent of `value` after rounding to one significant digit.
fn leading_exponent(value: f64) -> Option<i32> {
    let s = format!("{:.0e}", value);
    s.split_once('e')?.1.parse().ok()
}

/// `value` with an engineering SI prefix, e.g. `5e-6, "m"` -> `"5µm"`.
///
/// The mantissa is rounded to 3 decimals and printed without a fraction
/// when integral. Values outside the prefix table keep plain notation.
pub fn format_si(value: f64, unit: &str) -> String {
    if value == 0.0 || !value.is_finite() {
        return format!("{} {}", value, unit);
    }
    let Some(exp) = leading_exponent(value) else {
        return format!("{} {}", value, unit);
    };
    let si = 3 * exp.div_euclid(3);
    let Some(&(_, prefix)) = SI_PREFIXES.iter().find(|(e, _)| *e == si) else {
        return format!("{} {}", value, unit);
    };

    let mantissa = ((value / 10f64.powi(si)) * 1000.0).round() / 1000.0;
    if mantissa.fract() == 0.0 {
        format!("{}{}{}", mantissa as i64, prefix, unit)
    } else {
        format!("{}{}{}", mantissa, prefix, unit)
    }
}

/// Default output stem describing the run.
pub fn run_name(grid: &SampleGrid, antennas: &[AntennaSpec]) -> String {
    let mut name = format!(
        "antenna_{}x{}x{}cells_{}x{}x{}",
        grid.nx,
        grid.ny,
        grid.nz,
        format_si(grid.size_x, "m"),
        format_si(grid.size_y, "m"),
        format_si(grid.size_z, "m"),
    );

    match antennas {
        [a] => {
            name.push_str(&format!(
                "_antw{}_t{}_p{}x{}_s2a{}_I{}_{}deg",
                format_si(a.width, "m"),
                format_si(a.thickness, "m"),
                format_si(a.position_x, "m"),
                format_si(a.position_y, "m"),
                format_si(a.distance_to_sample, "m"),
                format_si(a.current, "A"),
                a.current_direction,
            ));
        }
        many => name.push_str(&format!("_{}antennas", many.len())),
    }
    name
}
