//! Laplacian guidance extraction, masked seeding, and Jacobi relaxation.
//!
//! The solver treats mask-selected pixels as free variables of a discrete
//! Poisson equation whose right-hand side is the Laplacian of the source
//! image, anchored by the unmasked destination pixels around them. Each
//! relaxation half-step reads one iterate and writes the other, so every
//! pixel update sees a fully settled previous iterate regardless of the
//! order rows are processed in.

use std::mem;

use image::GrayImage;

use crate::field::{Field3, CHANNELS};

/// Discrete 4-neighbor Laplacian of `src`, evaluated per channel on the
/// interior (`1 <= x <= w-2`, `1 <= y <= h-2`).
///
/// `L(x,y) = 4*S(x,y) - S(x-1,y) - S(x+1,y) - S(x,y-1) - S(x,y+1)`
///
/// The 1-pixel border of the output stays zero; the relaxation loop never
/// reads it.
#[must_use]
pub fn laplacian(src: &Field3) -> Field3 {
    let w = src.width();
    let h = src.height();
    let mut out = src.zeroed_like();

    out.for_each_row_mut(|y, row| {
        if y == 0 || y == h - 1 {
            return;
        }
        for x in 1..w - 1 {
            let c = src.get(x, y);
            let l = src.get(x - 1, y);
            let r = src.get(x + 1, y);
            let u = src.get(x, y - 1);
            let d = src.get(x, y + 1);
            let i = (x as usize) * CHANNELS;
            for ch in 0..CHANNELS {
                row[i + ch] = 4.0 * c[ch] - l[ch] - r[ch] - u[ch] - d[ch];
            }
        }
    });

    out
}

/// Build the initial iterate: source pixels where the mask is set,
/// destination pixels elsewhere.
///
/// The unmasked pixels this copies are the Dirichlet boundary values of
/// the solve; the relaxation never modifies them.
#[must_use]
pub fn seed(mask: &GrayImage, source: &Field3, destination: &Field3) -> Field3 {
    let w = destination.width();
    let mut out = destination.zeroed_like();

    out.for_each_row_mut(|y, row| {
        for x in 0..w {
            let px = if mask.get_pixel(x, y).0[0] != 0 {
                source.get(x, y)
            } else {
                destination.get(x, y)
            };
            let i = (x as usize) * CHANNELS;
            row[i..i + CHANNELS].copy_from_slice(&px);
        }
    });

    out
}

/// Default sweep count for a region of the given extents:
/// `ceil(hypot(width, height))`.
///
/// Scaled to the diagonal so information can propagate from the nearest
/// fixed boundary to the farthest masked pixel. A heuristic budget, not a
/// proven bound; [`crate::HealOptions::sweeps`] overrides it.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn default_sweeps(width: u32, height: u32) -> u32 {
    f64::from(width).hypot(f64::from(height)).ceil() as u32
}

/// One directed half-step: read `cur`, write `next`.
///
/// Interior masked pixels get the Jacobi update
/// `(cur(x-1,y) + cur(x+1,y) + cur(x,y-1) + cur(x,y+1) + guide(x,y)) / 4`;
/// everything else (unmasked pixels and the 1-pixel border) is copied
/// through unchanged.
fn relax_into(mask: &GrayImage, guide: &Field3, cur: &Field3, next: &mut Field3) {
    let w = cur.width();
    let h = cur.height();

    next.for_each_row_mut(|y, row| {
        let interior_row = y > 0 && y < h - 1;
        for x in 0..w {
            let interior = interior_row && x > 0 && x < w - 1;
            let px = if interior && mask.get_pixel(x, y).0[0] != 0 {
                let l = cur.get(x - 1, y);
                let r = cur.get(x + 1, y);
                let u = cur.get(x, y - 1);
                let d = cur.get(x, y + 1);
                let g = guide.get(x, y);
                [
                    (l[0] + r[0] + u[0] + d[0] + g[0]) / 4.0,
                    (l[1] + r[1] + u[1] + d[1] + g[1]) / 4.0,
                    (l[2] + r[2] + u[2] + d[2] + g[2]) / 4.0,
                ]
            } else {
                cur.get(x, y)
            };
            let i = (x as usize) * CHANNELS;
            row[i..i + CHANNELS].copy_from_slice(&px);
        }
    });
}

/// Per-invocation relaxation context: the guidance field plus two
/// same-shaped iterates behind explicit current/next roles.
///
/// Constructed fresh for every heal operation; holds no state beyond it.
pub struct Solver<'a> {
    mask: &'a GrayImage,
    guide: Field3,
    current: Field3,
    next: Field3,
}

impl<'a> Solver<'a> {
    /// Extract the guidance field from `source` and seed both iterates
    /// from `source`/`destination` according to `mask`.
    ///
    /// All three inputs must share the same extents; [`crate::heal`]
    /// validates this before constructing a solver.
    #[must_use]
    pub fn new(mask: &'a GrayImage, source: &Field3, destination: &Field3) -> Self {
        let guide = laplacian(source);
        let current = seed(mask, source, destination);
        let next = current.clone();
        Self {
            mask,
            guide,
            current,
            next,
        }
    }

    /// Run one directed half-step and swap the buffer roles.
    ///
    /// The write buffer is completely rewritten before the swap, so the
    /// new current iterate is always fully settled.
    pub fn half_step(&mut self) {
        relax_into(self.mask, &self.guide, &self.current, &mut self.next);
        mem::swap(&mut self.current, &mut self.next);
    }

    /// One full sweep, i.e. two directed half-steps.
    pub fn sweep(&mut self) {
        self.half_step();
        self.half_step();
    }

    /// Run `sweeps` full sweeps.
    pub fn run(&mut self, sweeps: u32) {
        for _ in 0..sweeps {
            self.sweep();
        }
    }

    /// The latest iterate.
    #[must_use]
    pub fn current(&self) -> &Field3 {
        &self.current
    }

    /// Consume the solver, returning the converged field.
    #[must_use]
    pub fn into_field(self) -> Field3 {
        self.current
    }
}
