//! Heal a masked region of one image with content from another.
//!
//! Usage:
//! ```sh
//! cargo run --example heal -- mask.png source.png photo.png photo_healed.png
//! ```

use std::env;
use std::process;

use poisson_heal::{heal_files, save_image, HealOptions};

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 5 {
        eprintln!("Usage: {} <mask> <source> <destination> <output>", args[0]);
        process::exit(1);
    }

    let opts = HealOptions::default();
    let result = heal_files(
        args[1].as_ref(),
        args[2].as_ref(),
        args[3].as_ref(),
        &opts,
    );

    match result.and_then(|out| save_image(&out.healed, args[4].as_ref())) {
        Ok(()) => println!("Done: {}", args[4]),
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}
