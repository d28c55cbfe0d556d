//! Depixelate a single image against a search image.
//!
//! Usage:
//! ```sh
//! cargo run --example depixelate -- pixelated.png search.png output.png
//! ```

use std::env;
use std::process;

use depix::{process_file, DepixOptions};

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 4 {
        eprintln!("Usage: {} <pixelated> <search> <output>", args[0]);
        process::exit(1);
    }

    let (pixelated, search, output) = (&args[1], &args[2], &args[3]);

    let opts = DepixOptions::default();
    let result = process_file(pixelated.as_ref(), search.as_ref(), output.as_ref(), &opts);

    if result.success {
        println!("Done: {}", result.message);
    } else {
        eprintln!("Error: {}", result.message);
        process::exit(1);
    }
}
