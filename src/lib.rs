//! Seamlessly blend image regions with a Poisson healing brush.
//!
//! Given a source image, a destination image, and a binary mask, [`heal`]
//! replaces the masked destination pixels with content derived from the
//! source such that the result blends smoothly into the surrounding
//! pixels. The mechanism is Poisson image editing: the Laplacian of the
//! source is transplanted into the destination and the resulting
//! boundary-value problem is solved by Jacobi relaxation, with unmasked
//! pixels held fixed as boundary values.
//!
//! # Quick Start
//!
//! ```no_run
//! use poisson_heal::{heal, composite_over, HealOptions};
//!
//! let mask = image::open("mask.png").unwrap().to_luma8();
//! let source = image::open("source.png").unwrap().to_rgba8();
//! let destination = image::open("photo.png").unwrap().to_rgba8();
//!
//! let patch = heal(&mask, &source, &destination, &HealOptions::default()).unwrap();
//! let healed = composite_over(&patch, &destination).unwrap();
//! healed.save("photo_healed.png").unwrap();
//! ```
//!
//! # Picking a source region
//!
//! The patch blends best when the source border already resembles the
//! surroundings of the repair. [`correlate`](correlate::correlate) scores
//! a candidate offset against a captured border so a caller-driven search
//! (grid scan, local descent) can pick the best-matching region before
//! healing.
//!
//! # Parallelism
//!
//! Every pipeline stage is a per-pixel map over frozen inputs; with the
//! `parallel` feature (on by default) the rows of each stage run on the
//! rayon thread pool.

#![deny(missing_docs)]

pub mod correlate;
mod engine;
pub mod error;
pub mod field;
pub mod solver;

pub use engine::{
    composite_over, default_output_path, heal, heal_files, save_image, HealOptions, HealOutput,
};
pub use error::{Error, Result};
