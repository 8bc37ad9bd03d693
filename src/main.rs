// src/main.rs
//
// Command-line driver: read a JSON run config, synthesize the antenna field
// and write it as an OVF 2.0 file for OOMMF / MuMax.
//
// Outputs go to `runs/` (or the directory given via `out=`):
//   runs/<name>/
//     ├── <name>.ovf
//     └── config.json        (the resolved run config)
//
// Examples:
//
//   cargo run --release -- config=antenna.json
//       -> binary4 OVF, file name derived from the parameters.
//
//   cargo run --release -- config=antenna.json format=text stream parallel
//       -> text OVF written slice by slice, slices computed on all cores.
//
//   cargo run --release -- demo
//       -> the single 5 µm strip over a 50 µm × 5 µm film, no config file needed.
//
//   cargo run --release -- print-config > antenna.json
//       -> template config to edit.
//
// Log verbosity follows RUST_LOG (default: info).

use std::env;
use std::error::Error;
use std::fs::create_dir_all;
use std::path::{Path, PathBuf};

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use antenna_field::AntennaSpec;
use antenna_field::config::{GridConfig, NumericsConfig, OutputConfig, RunConfig};
use antenna_field::error::ValidationError;
use antenna_field::ovf::{OvfFormat, OvfMeta, OvfStreamWriter, write_ovf2};
use antenna_field::synth::FieldSynthesizer;
use antenna_field::units::run_name;

fn print_usage() {
    eprintln!(
        r#"Usage:
  cargo run -- config=FILE [out=DIR] [name=STEM] [format=text|binary]
               [stream] [parallel] [max_side=N]
  cargo run -- demo [same overrides]
  cargo run -- print-config

Notes:
  - Grid sizes and antenna geometry are SI metres, current in amperes,
    current_direction in degrees from +x.
  - 'stream' writes each z-slice as soon as it is computed.
  - 'parallel' computes z-slices on all cores (ignored with 'stream').
"#
    );
}

fn sanitize_run_id(s: &str) -> String {
    s.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' || c == '-' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn unique_run_dir(out_root: &Path, run_id: &str) -> PathBuf {
    let mut dir = out_root.join(run_id);
    if !dir.exists() {
        return dir;
    }
    for k in 1..1000 {
        let cand = out_root.join(format!("{}_{}", run_id, k));
        if !cand.exists() {
            dir = cand;
            break;
        }
    }
    dir
}

/// 10 × 10 × 1 cells over 50 µm × 5 µm × 50 nm, one 5 µm strip along x.
fn demo_config() -> RunConfig {
    RunConfig {
        grid: GridConfig {
            n_x: 10,
            n_y: 10,
            n_z: 1,
            size_x: 5e-5,
            size_y: 5e-6,
            size_z: 5e-8,
        },
        antennas: vec![AntennaSpec {
            width: 5e-6,
            thickness: 100e-9,
            position_x: 2.5e-5,
            position_y: 2.5e-6,
            current_direction: 0.0,
            distance_to_sample: 1e-12,
            current: 0.1,
        }],
        output: OutputConfig::default(),
        numerics: NumericsConfig::default(),
    }
}

fn parse_usize(field: &str, raw: &str) -> Result<usize, ValidationError> {
    raw.trim()
        .parse::<usize>()
        .map_err(|_| ValidationError::NotANumber {
            field: field.to_string(),
            raw: raw.to_string(),
        })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<(), Box<dyn Error>> {
    let argv: Vec<String> = env::args().collect();

    let mut config_path: Option<PathBuf> = None;
    let mut demo = false;

    // Optional overrides
    let mut out_override: Option<PathBuf> = None;
    let mut name_override: Option<String> = None;
    let mut format_override: Option<String> = None;
    let mut stream_flag = false;
    let mut parallel_flag = false;
    let mut max_side_override: Option<usize> = None;

    for arg in argv.iter().skip(1) {
        if arg == "-h" || arg == "--help" || arg == "help" {
            print_usage();
            return Ok(());
        }
        if arg == "print-config" {
            println!("{}", serde_json::to_string_pretty(&demo_config())?);
            return Ok(());
        }
        if arg == "demo" {
            demo = true;
            continue;
        }
        if arg == "stream" {
            stream_flag = true;
            continue;
        }
        if arg == "parallel" {
            parallel_flag = true;
            continue;
        }

        if let Some(v) = arg.strip_prefix("config=") {
            config_path = Some(PathBuf::from(v));
            continue;
        }
        if let Some(v) = arg.strip_prefix("out=") {
            out_override = Some(PathBuf::from(v));
            continue;
        }
        if let Some(v) = arg.strip_prefix("name=") {
            name_override = Some(sanitize_run_id(v));
            continue;
        }
        if let Some(v) = arg.strip_prefix("format=") {
            format_override = Some(v.to_string());
            continue;
        }
        if let Some(v) = arg.strip_prefix("max_side=") {
            max_side_override = Some(parse_usize("max_side", v)?);
            continue;
        }

        eprintln!("Warning: ignoring unknown argument '{arg}'");
    }

    init_tracing();

    let mut cfg = match (config_path, demo) {
        (Some(path), _) => RunConfig::load(&path)?,
        (None, true) => demo_config(),
        (None, false) => {
            print_usage();
            return Err("missing config=FILE (or 'demo')".into());
        }
    };

    // Apply overrides
    if let Some(dir) = out_override {
        cfg.output.dir = dir;
    }
    if let Some(name) = name_override {
        cfg.output.name = Some(name);
    }
    if let Some(f) = format_override {
        cfg.output.format = f;
    }
    if stream_flag {
        cfg.output.stream = true;
    }
    if parallel_flag {
        cfg.numerics.parallel = true;
    }
    if let Some(n) = max_side_override {
        cfg.numerics.max_working_side = n;
    }

    let grid = cfg.sample_grid()?;
    let format: OvfFormat = cfg.ovf_format()?;
    if cfg.output.stream && cfg.numerics.parallel {
        warn!("'parallel' has no effect when streaming; slices are written in order");
    }

    let synth = FieldSynthesizer::with_options(grid, &cfg.antennas, cfg.synth_options())?
        .on_slice_done(|k, total| info!("slice {}/{} done", k + 1, total));

    let name = cfg
        .output
        .name
        .clone()
        .unwrap_or_else(|| run_name(&grid, &cfg.antennas));
    let run_dir = unique_run_dir(&cfg.output.dir, &name);
    create_dir_all(&run_dir)?;
    let ovf_path = run_dir.join(format!("{name}.ovf"));

    let mut meta = OvfMeta::antenna_field();
    meta.push_desc_line(format!("antennas: {}", cfg.antennas.len()));
    for (i, a) in cfg.antennas.iter().enumerate() {
        meta.push_desc_line(format!(
            "antenna {i}: width={:e} m thickness={:e} m position=({:e}, {:e}) m direction={} deg gap={:e} m current={:e} A",
            a.width,
            a.thickness,
            a.position_x,
            a.position_y,
            a.current_direction,
            a.distance_to_sample,
            a.current
        ));
    }

    if cfg.output.stream {
        let mut writer = OvfStreamWriter::create(&ovf_path, &grid, &meta, format)?;
        for k in 0..grid.nz {
            let slice = synth.synthesize_slice(k)?;
            writer.write_slice(&slice)?;
        }
        writer.finish()?;
    } else {
        let field = synth.synthesize();
        write_ovf2(&ovf_path, &grid, &field, &meta, format)?;
    }

    cfg.write_to_dir(&run_dir)?;
    info!(path = %ovf_path.display(), "wrote OVF");
    println!("Wrote {}", ovf_path.display());
    Ok(())
}
