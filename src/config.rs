// src/config.rs
//
// JSON run description: sample grid, antenna list, output and numerics.
// The resolved config is written back next to the outputs as config.json.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::antenna::AntennaSpec;
use crate::error::{FieldResult, ValidationError};
use crate::grid::SampleGrid;
use crate::ovf::OvfFormat;
use crate::params::{SynthOptions, default_max_working_side};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub grid: GridConfig,
    pub antennas: Vec<AntennaSpec>,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub numerics: NumericsConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    pub n_x: usize,
    pub n_y: usize,
    pub n_z: usize,
    pub size_x: f64,
    pub size_y: f64,
    pub size_z: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_out_dir")]
    pub dir: PathBuf,
    /// File stem; derived from the parameters when absent.
    #[serde(default)]
    pub name: Option<String>,
    /// "text" or "binary".
    #[serde(default = "default_format")]
    pub format: String,
    /// Write slice by slice instead of holding the whole volume.
    #[serde(default)]
    pub stream: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumericsConfig {
    #[serde(default)]
    pub parallel: bool,
    #[serde(default = "default_max_working_side")]
    pub max_working_side: usize,
}

fn default_out_dir() -> PathBuf {
    PathBuf::from("runs")
}

fn default_format() -> String {
    "binary".to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_out_dir(),
            name: None,
            format: default_format(),
            stream: false,
        }
    }
}

impl Default for NumericsConfig {
    fn default() -> Self {
        Self {
            parallel: false,
            max_working_side: default_max_working_side(),
        }
    }
}

impl GridConfig {
    pub fn to_grid(&self) -> Result<SampleGrid, ValidationError> {
        SampleGrid::new(
            self.n_x,
            self.n_y,
            self.n_z,
            self.size_x,
            self.size_y,
            self.size_z,
        )
    }
}

impl RunConfig {
    pub fn from_json_str(s: &str) -> FieldResult<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn load(path: &Path) -> FieldResult<Self> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    pub fn write_to_dir(&self, out_dir: &Path) -> FieldResult<()> {
        let path = out_dir.join("config.json");
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    pub fn sample_grid(&self) -> Result<SampleGrid, ValidationError> {
        self.grid.to_grid()
    }

    pub fn synth_options(&self) -> SynthOptions {
        SynthOptions {
            parallel: self.numerics.parallel,
            max_working_side: self.numerics.max_working_side,
            ..SynthOptions::default()
        }
    }

    pub fn ovf_format(&self) -> Result<OvfFormat, ValidationError> {
        self.output
            .format
            .parse()
            .map_err(|_| ValidationError::Unrecognised {
                field: "output.format".to_string(),
                raw: self.output.format.clone(),
            })
    }
}
