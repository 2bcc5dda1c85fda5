//! Read a multi-frame extended XYZ stream and write it back.
//!
//! Run with: cargo run --example read_write

use extxyz::{read_frames, write_frame, FormatDict, WriteOptions};
use std::error::Error;

const TRAJECTORY: &str = "\
2
Lattice=\"4.0 0.0 0.0 0.0 4.0 0.0 0.0 0.0 4.0\" Properties=species:S:1:pos:R:3:forces:R:3 energy=-10.25 step=0
Na 0.0 0.0 0.0 0.01 0.00 -0.02
Cl 2.0 2.0 2.0 -0.01 0.00 0.02
2
Lattice=\"4.0 0.0 0.0 0.0 4.0 0.0 0.0 0.0 4.0\" Properties=species:S:1:pos:R:3:forces:R:3 energy=-10.31 step=1
Na 0.01 0.0 -0.01 0.005 0.00 -0.01
Cl 1.99 2.0 2.01 -0.005 0.00 0.01
";

fn main() -> Result<(), Box<dyn Error>> {
    let frames = read_frames(TRAJECTORY.as_bytes()).collect::<extxyz::Result<Vec<_>>>()?;
    println!("Read {} frames", frames.len());

    for (i, frame) in frames.iter().enumerate() {
        println!("\nFrame {}: {} atoms", i, frame.n_atoms());
        for (key, value) in &frame.info {
            println!("  info {} = {}", key, value);
        }
        if let Some(lattice) = &frame.lattice {
            println!("  lattice {:?}", lattice);
        }
        for (name, column) in frame.table.iter() {
            println!("  column {} ({}) shape {:?}", name, column.type_name(), column.shape());
        }
    }

    let options = WriteOptions::new().with_formats(FormatDict::new().with_real("%.4f"));
    println!("\nWritten back:");
    for frame in &frames {
        print!("{}", write_frame(frame, &options)?);
    }

    Ok(())
}
