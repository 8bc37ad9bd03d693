// src/lib.rs

pub mod antenna;
pub mod config;
pub mod error;
pub mod grid;
pub mod interp;
pub mod kernel;
pub mod ovf;
pub mod params;
pub mod synth;
pub mod units;
pub mod vector_field;

pub use antenna::AntennaSpec;
pub use error::{FieldError, FieldResult, ValidationError};
pub use grid::{SampleGrid, WorkingGrid};
pub use synth::{FieldSynthesizer, SliceRenderer, synthesize, synthesize_step};
pub use vector_field::{FieldSlice, FieldVolume};
