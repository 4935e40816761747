use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;

use poisson_heal::{default_output_path, heal_files, save_image, HealOptions};

#[derive(Parser)]
#[command(
    name = "poisson-heal",
    about = "Seamlessly blend image regions with a Poisson healing brush",
    version,
    after_help = "The mask, source, and destination images must share the same dimensions.\n\
                  Nonzero mask pixels are healed; zero mask pixels are left untouched."
)]
struct Cli {
    /// Mask image: nonzero pixels mark the region to heal
    mask: PathBuf,

    /// Source image supplying the transplanted gradients
    source: PathBuf,

    /// Destination image to heal
    destination: PathBuf,

    /// Output file (default: {destination}_healed.{ext})
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Relaxation sweep count (default: ceil(hypot(width, height)))
    #[arg(long)]
    sweeps: Option<u32>,

    /// Save the transparent patch instead of compositing it over the destination
    #[arg(long)]
    patch: bool,

    /// Suppress all non-error output
    #[arg(short, long)]
    quiet: bool,
}

fn main() {
    let cli = Cli::parse();

    for path in [&cli.mask, &cli.source, &cli.destination] {
        if !path.exists() {
            eprintln!("Error: input does not exist: {}", path.display());
            process::exit(1);
        }
    }

    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&cli.destination));
    let opts = HealOptions { sweeps: cli.sweeps };

    match run(&cli, &output, &opts) {
        Ok(()) => {
            if !cli.quiet {
                eprintln!("[OK] wrote {}", output.display());
            }
        }
        Err(e) => {
            eprintln!("[FAIL] {e}");
            process::exit(1);
        }
    }
}

fn run(cli: &Cli, output: &Path, opts: &HealOptions) -> poisson_heal::Result<()> {
    let result = heal_files(&cli.mask, &cli.source, &cli.destination, opts)?;
    let image = if cli.patch {
        &result.patch
    } else {
        &result.healed
    };
    save_image(image, output)
}
