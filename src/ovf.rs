// src/ovf.rs
//
// OOMMF OVF 2.0 writers for synthesized antenna fields.
// Supports rectangular meshes with
//  - text data (one line per (y, z) row of Bx By Bz triples)
//  - binary4 data (little-endian f32, preceded by the check value 1234567.0)
//
// Voxel order is x fastest, then y, then z. `OvfStreamWriter` emits the same
// bytes one z-slice at a time.

use std::fs::{File, create_dir_all};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use ndarray::ArrayView2;

use crate::error::ValidationError;
use crate::grid::SampleGrid;
use crate::vector_field::{FieldSlice, FieldVolume};

const BINARY4_CHECK: f32 = 1234567.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OvfFormat {
    Text,
    Binary4,
}

impl FromStr for OvfFormat {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "txt" | "ascii" => Ok(Self::Text),
            "binary" | "binary4" | "bin" => Ok(Self::Binary4),
            _ => Err(ValidationError::Unrecognised {
                field: "format".to_string(),
                raw: s.to_string(),
            }),
        }
    }
}

impl OvfFormat {
    fn data_tag(&self) -> &'static str {
        match self {
            Self::Text => "Data Text",
            Self::Binary4 => "Data Binary 4",
        }
    }
}

#[derive(Clone, Debug)]
pub struct OvfMeta {
    pub title: String,
    pub desc_lines: Vec<String>,
    pub valuelabels: [String; 3],
    pub valueunits: [String; 3],
}

impl Default for OvfMeta {
    fn default() -> Self {
        Self::antenna_field()
    }
}

impl OvfMeta {
    /// Flux density of the antenna drive field, in Tesla.
    pub fn antenna_field() -> Self {
        Self {
            title: "B_antenna".to_string(),
            desc_lines: vec![],
            valuelabels: ["B_x".into(), "B_y".into(), "B_z".into()],
            valueunits: ["T".into(), "T".into(), "T".into()],
        }
    }

    pub fn push_desc_line<S: Into<String>>(&mut self, s: S) {
        self.desc_lines.push(s.into());
    }
}

fn ensure_parent_dir(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }
    Ok(())
}

fn invalid_input(msg: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, msg)
}

/// Header block up to and including the `# Begin: Data ...` line.
pub fn write_header<W: Write>(
    w: &mut W,
    grid: &SampleGrid,
    meta: &OvfMeta,
    format: OvfFormat,
) -> io::Result<()> {
    let (dx, dy, dz) = (grid.dx(), grid.dy(), grid.dz());

    writeln!(w, "# OOMMF OVF 2.0")?;
    writeln!(w, "# Segment count: 1")?;
    writeln!(w, "# Begin: Segment")?;
    writeln!(w, "# Begin: Header")?;
    writeln!(w, "# Title: {}", meta.title)?;
    for d in &meta.desc_lines {
        writeln!(w, "# Desc: {}", d)?;
    }
    writeln!(w, "# meshtype: rectangular")?;
    writeln!(w, "# meshunit: m")?;

    writeln!(w, "# xmin: 0")?;
    writeln!(w, "# ymin: 0")?;
    writeln!(w, "# zmin: 0")?;
    writeln!(w, "# xmax: {:.16e}", grid.size_x)?;
    writeln!(w, "# ymax: {:.16e}", grid.size_y)?;
    writeln!(w, "# zmax: {:.16e}", grid.size_z)?;

    writeln!(w, "# valuedim: 3")?;
    writeln!(
        w,
        "# valuelabels: {} {} {}",
        meta.valuelabels[0], meta.valuelabels[1], meta.valuelabels[2]
    )?;
    writeln!(
        w,
        "# valueunits: {} {} {}",
        meta.valueunits[0], meta.valueunits[1], meta.valueunits[2]
    )?;

    writeln!(w, "# xbase: {:.16e}", 0.5 * dx)?;
    writeln!(w, "# ybase: {:.16e}", 0.5 * dy)?;
    writeln!(w, "# zbase: {:.16e}", 0.5 * dz)?;
    writeln!(w, "# xnodes: {}", grid.nx)?;
    writeln!(w, "# ynodes: {}", grid.ny)?;
    writeln!(w, "# znodes: {}", grid.nz)?;
    writeln!(w, "# xstepsize: {:.16e}", dx)?;
    writeln!(w, "# ystepsize: {:.16e}", dy)?;
    writeln!(w, "# zstepsize: {:.16e}", dz)?;

    writeln!(w, "# End: Header")?;
    writeln!(w, "# Begin: {}", format.data_tag())?;

    if format == OvfFormat::Binary4 {
        w.write_all(&BINARY4_CHECK.to_le_bytes())?;
    }
    Ok(())
}

pub fn write_footer<W: Write>(w: &mut W, format: OvfFormat) -> io::Result<()> {
    if format == OvfFormat::Binary4 {
        writeln!(w)?;
    }
    writeln!(w, "# End: {}", format.data_tag())?;
    writeln!(w, "# End: Segment")?;
    Ok(())
}

/// Data of one z-slice, rows of increasing y.
fn write_slice_data<W: Write>(
    w: &mut W,
    bx: ArrayView2<'_, f64>,
    by: ArrayView2<'_, f64>,
    bz: ArrayView2<'_, f64>,
    format: OvfFormat,
) -> io::Result<()> {
    let (ny, nx) = bx.dim();
    for j in 0..ny {
        for i in 0..nx {
            let v = [bx[[j, i]], by[[j, i]], bz[[j, i]]];
            match format {
                OvfFormat::Text => {
                    if i > 0 {
                        write!(w, " ")?;
                    }
                    write!(w, "{:.10e} {:.10e} {:.10e}", v[0], v[1], v[2])?;
                }
                OvfFormat::Binary4 => {
                    for c in v {
                        w.write_all(&(c as f32).to_le_bytes())?;
                    }
                }
            }
        }
        if format == OvfFormat::Text {
            writeln!(w)?;
        }
    }
    Ok(())
}

/// Whole volume to any writer.
pub fn write_volume<W: Write>(
    w: &mut W,
    grid: &SampleGrid,
    field: &FieldVolume,
    meta: &OvfMeta,
    format: OvfFormat,
) -> io::Result<()> {
    let expected = (grid.nz, grid.ny, grid.nx);
    if field.dim() != expected {
        return Err(invalid_input(format!(
            "FieldVolume shape mismatch: got {:?}, expected {:?} (nz, ny, nx)",
            field.dim(),
            expected
        )));
    }

    write_header(w, grid, meta, format)?;
    for ((bx, by), bz) in field
        .bx
        .outer_iter()
        .zip(field.by.outer_iter())
        .zip(field.bz.outer_iter())
    {
        write_slice_data(w, bx, by, bz, format)?;
    }
    write_footer(w, format)
}

pub fn write_ovf2(
    path: &Path,
    grid: &SampleGrid,
    field: &FieldVolume,
    meta: &OvfMeta,
    format: OvfFormat,
) -> io::Result<()> {
    ensure_parent_dir(path)?;
    let mut w = BufWriter::new(File::create(path)?);
    write_volume(&mut w, grid, field, meta, format)?;
    w.flush()
}

/// Writes an OVF file one z-slice at a time.
///
/// The header goes out with the first slice, the footer with `finish`, which
/// requires exactly `nz` slices to have been written.
pub struct OvfStreamWriter<W: Write> {
    w: W,
    grid: SampleGrid,
    meta: OvfMeta,
    format: OvfFormat,
    written: usize,
}

impl OvfStreamWriter<BufWriter<File>> {
    pub fn create(
        path: &Path,
        grid: &SampleGrid,
        meta: &OvfMeta,
        format: OvfFormat,
    ) -> io::Result<Self> {
        ensure_parent_dir(path)?;
        Ok(Self::new(BufWriter::new(File::create(path)?), grid, meta, format))
    }
}

impl<W: Write> OvfStreamWriter<W> {
    pub fn new(w: W, grid: &SampleGrid, meta: &OvfMeta, format: OvfFormat) -> Self {
        Self {
            w,
            grid: *grid,
            meta: meta.clone(),
            format,
            written: 0,
        }
    }

    pub fn slices_written(&self) -> usize {
        self.written
    }

    pub fn write_slice(&mut self, slice: &FieldSlice) -> io::Result<()> {
        if self.written >= self.grid.nz {
            return Err(invalid_input(format!(
                "all {} slices already written",
                self.grid.nz
            )));
        }
        if slice.dim() != (self.grid.ny, self.grid.nx) {
            return Err(invalid_input(format!(
                "FieldSlice shape mismatch: got {:?}, expected {:?} (ny, nx)",
                slice.dim(),
                (self.grid.ny, self.grid.nx)
            )));
        }

        if self.written == 0 {
            write_header(&mut self.w, &self.grid, &self.meta, self.format)?;
        }
        write_slice_data(
            &mut self.w,
            slice.bx.view(),
            slice.by.view(),
            slice.bz.view(),
            self.format,
        )?;
        self.written += 1;
        Ok(())
    }

    /// Write the footer and hand back the underlying writer.
    pub fn finish(mut self) -> io::Result<W> {
        if self.written != self.grid.nz {
            return Err(invalid_input(format!(
                "stream finished after {} of {} slices",
                self.written, self.grid.nz
            )));
        }
        write_footer(&mut self.w, self.format)?;
        self.w.flush()?;
        Ok(self.w)
    }
}
