// src/bin/field_profile.rs
//
// Cross-section of a single strip antenna along y, compared with the
// closed-form strip field at the same points:
//   Grid: 1 x 200 x 4 cells over 4 µm x 20 µm x 40 nm
//   Antenna: 2 µm wide, 200 nm thick, 50 mA along +x, 20 nm above the film
//
// Run:
//   cargo run --release --bin field_profile
//
// Output:
//   out/field_profile/profile.csv
//
// Columns: k, z, y, By, Bz, By_kernel, Bz_kernel (SI units). The synthesized
// columns differ from the kernel columns only by the working-grid regrid.

use std::fs::{File, create_dir_all};
use std::io::{BufWriter, Write};
use std::path::Path;

use antenna_field::kernel::{self, Component};
use antenna_field::{AntennaSpec, SampleGrid, synthesize};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let grid = SampleGrid::new(1, 200, 4, 4e-6, 20e-6, 40e-9)?;

    let antenna = AntennaSpec {
        width: 2e-6,
        thickness: 200e-9,
        position_x: 2e-6,
        position_y: 10e-6,
        current_direction: 0.0,
        distance_to_sample: 20e-9,
        current: 0.05,
    };

    let field = synthesize(&grid, &[antenna])?;

    let out_dir = Path::new("out").join("field_profile");
    create_dir_all(&out_dir)?;
    let mut w = BufWriter::new(File::create(out_dir.join("profile.csv"))?);

    writeln!(w, "k,z,y,By,Bz,By_kernel,Bz_kernel")?;

    let ys = grid.y_coords();
    let mut worst = 0.0f64;
    for (k, z) in grid.z_coords().into_iter().enumerate() {
        let depth = antenna.depth_at(z);
        for (j, &y) in ys.iter().enumerate() {
            let [_, by, bz] = field.at(0, j, k);
            let eval = |c| {
                kernel::evaluate(
                    y - antenna.position_y,
                    depth,
                    antenna.width,
                    antenna.thickness,
                    antenna.current,
                    c,
                )
            };
            let by_ref = eval(Component::InPlane);
            let bz_ref = eval(Component::OutOfPlane);
            worst = worst.max((by - by_ref).abs()).max((bz - bz_ref).abs());

            writeln!(
                w,
                "{},{:.16e},{:.16e},{:.16e},{:.16e},{:.16e},{:.16e}",
                k, z, y, by, bz, by_ref, bz_ref
            )?;
        }
    }
    w.flush()?;

    println!("max |B - B_kernel| = {:.3e} T", worst);
    println!("Wrote out/field_profile/profile.csv");
    Ok(())
}
