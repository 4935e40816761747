//! Border correlation scoring for source-region selection.
//!
//! Before healing, a caller typically searches the image for a candidate
//! region whose border is visually continuous with the area being
//! repaired. This module provides the scoring primitive for that search:
//! capture the target border once from a reference image, then score any
//! candidate offset by summing per-sample color distances. The search
//! strategy itself (grid scan, local descent) is up to the caller.

use image::RgbaImage;

/// One border point: its coordinate in the reference image and the
/// float color observed there.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BorderSample {
    /// Coordinate of the sample in the reference image.
    pub offset: (u32, u32),
    /// Target color at that coordinate, widened to `f32` per channel.
    pub color: [f32; 3],
}

/// Capture the target border colors at the given coordinates.
///
/// Reads `image` at each coordinate, drops alpha, and records the
/// widened RGB color. Coordinates outside the image are skipped, so the
/// returned set may be shorter than `coords`; order is preserved.
#[must_use]
pub fn capture_border(image: &RgbaImage, coords: &[(u32, u32)]) -> Vec<BorderSample> {
    coords
        .iter()
        .filter_map(|&(x, y)| {
            image.get_pixel_checked(x, y).map(|px| BorderSample {
                offset: (x, y),
                color: [f32::from(px[0]), f32::from(px[1]), f32::from(px[2])],
            })
        })
        .collect()
}

/// Score a candidate offset against a captured border.
///
/// For each sample, the pixel at `sample.offset + candidate` is compared
/// to the sample's target color and the Euclidean RGB distance is added
/// to the sum. Lower is better; zero samples score 0.0.
///
/// A sample whose shifted coordinate falls outside `image` is excluded
/// from the sum rather than failing the call, so window scans that run
/// off the image edge degrade gracefully.
#[must_use]
pub fn correlate(image: &RgbaImage, samples: &[BorderSample], candidate: (i32, i32)) -> f32 {
    let w = i64::from(image.width());
    let h = i64::from(image.height());

    let mut sum = 0.0_f32;
    for sample in samples {
        let x = i64::from(sample.offset.0) + i64::from(candidate.0);
        let y = i64::from(sample.offset.1) + i64::from(candidate.1);
        if x < 0 || y < 0 || x >= w || y >= h {
            continue;
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let px = image.get_pixel(x as u32, y as u32);

        let dr = f32::from(px[0]) - sample.color[0];
        let dg = f32::from(px[1]) - sample.color[1];
        let db = f32::from(px[2]) - sample.color[2];
        sum += (dr * dr + dg * dg + db * db).sqrt();
    }
    sum
}
