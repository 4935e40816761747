//! The heal pipeline: validation, solving, and reconstruction.

use std::path::{Path, PathBuf};

use image::{GrayImage, Rgba, RgbaImage};

use crate::error::{Error, Result};
use crate::field::Field3;
use crate::solver::{default_sweeps, Solver};

/// Smallest region with a solvable interior.
const MIN_EXTENT: u32 = 3;

/// Options controlling a heal operation.
#[derive(Debug, Clone, Default)]
pub struct HealOptions {
    /// Relaxation sweep count. `None` uses the diagonal-scaled default,
    /// `ceil(hypot(width, height))`.
    pub sweeps: Option<u32>,
}

/// Output of [`heal_files`]: the transparent patch and the composite.
#[derive(Debug)]
pub struct HealOutput {
    /// The healed region alone; alpha is 0 everywhere outside the mask.
    pub patch: RgbaImage,
    /// The patch composited over the destination image.
    pub healed: RgbaImage,
}

fn check_shape(
    buffer: &'static str,
    width: u32,
    height: u32,
    expected_width: u32,
    expected_height: u32,
) -> Result<()> {
    if width == expected_width && height == expected_height {
        Ok(())
    } else {
        Err(Error::ShapeMismatch {
            buffer,
            width,
            height,
            expected_width,
            expected_height,
        })
    }
}

/// Replace the masked pixels of `destination` with content derived from
/// `source`, blended smoothly into the surrounding unmasked pixels.
///
/// The Laplacian of the source is transplanted into the destination and
/// solved by Jacobi relaxation with the unmasked pixels held fixed. The
/// returned patch has alpha 255 inside the mask and is fully transparent
/// (all four channels zero) outside it, so compositing it over the
/// destination leaves every unmasked pixel untouched — see
/// [`composite_over`].
///
/// # Errors
///
/// Returns [`Error::ShapeMismatch`] if the three buffers do not share
/// identical extents, or [`Error::RegionTooSmall`] if either extent is
/// below 3 pixels. Nothing is computed on failure.
pub fn heal(
    mask: &GrayImage,
    source: &RgbaImage,
    destination: &RgbaImage,
    opts: &HealOptions,
) -> Result<RgbaImage> {
    let width = destination.width();
    let height = destination.height();
    check_shape("mask", mask.width(), mask.height(), width, height)?;
    check_shape("source", source.width(), source.height(), width, height)?;
    if width < MIN_EXTENT || height < MIN_EXTENT {
        return Err(Error::RegionTooSmall { width, height });
    }

    let source_f = Field3::from_rgba(source)?;
    let destination_f = Field3::from_rgba(destination)?;

    let mut solver = Solver::new(mask, &source_f, &destination_f);
    solver.run(opts.sweeps.unwrap_or_else(|| default_sweeps(width, height)));

    let mut out = solver.into_field().to_rgba();
    alpha_mask(mask, &mut out);
    Ok(out)
}

/// Blank every pixel the mask does not select.
///
/// Reconstruction converts the whole converged field to opaque display
/// pixels; this pass zeroes all four channels wherever `mask` is 0 so the
/// patch carries no content outside the healed region.
fn alpha_mask(mask: &GrayImage, image: &mut RgbaImage) {
    for (x, y, px) in image.enumerate_pixels_mut() {
        if mask.get_pixel(x, y).0[0] == 0 {
            *px = Rgba([0, 0, 0, 0]);
        }
    }
}

/// Composite a healed patch over the destination it was solved against.
///
/// Patch pixels with nonzero alpha replace the destination pixel;
/// transparent patch pixels leave it unchanged.
///
/// # Errors
///
/// Returns [`Error::ShapeMismatch`] if the two images differ in extent.
pub fn composite_over(patch: &RgbaImage, destination: &RgbaImage) -> Result<RgbaImage> {
    check_shape(
        "patch",
        patch.width(),
        patch.height(),
        destination.width(),
        destination.height(),
    )?;

    let mut out = destination.clone();
    for (x, y, px) in out.enumerate_pixels_mut() {
        let p = patch.get_pixel(x, y);
        if p[3] != 0 {
            *px = *p;
        }
    }
    Ok(out)
}

/// Load mask, source, and destination images from disk and heal.
///
/// The mask is converted to single-channel luma (any nonzero value marks
/// a pixel to heal); source and destination are converted to RGBA.
///
/// # Errors
///
/// Returns [`Error::Image`] if any input fails to load, plus everything
/// [`heal`] can return.
pub fn heal_files(
    mask: &Path,
    source: &Path,
    destination: &Path,
    opts: &HealOptions,
) -> Result<HealOutput> {
    let mask = image::open(mask)?.to_luma8();
    let source = image::open(source)?.to_rgba8();
    let destination = image::open(destination)?.to_rgba8();

    let patch = heal(&mask, &source, &destination, opts)?;
    let healed = composite_over(&patch, &destination)?;
    Ok(HealOutput { patch, healed })
}

/// Save an image, creating parent directories as needed.
///
/// JPEG cannot carry an alpha channel, so the image is flattened to RGB
/// for `.jpg`/`.jpeg` targets; every other format is saved as RGBA.
///
/// # Errors
///
/// Returns [`Error::Io`] if the parent directory cannot be created, or
/// [`Error::Image`] if encoding fails.
pub fn save_image(image: &RgbaImage, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let is_jpeg = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some(ext) if ext.eq_ignore_ascii_case("jpg") || ext.eq_ignore_ascii_case("jpeg")
    );
    if is_jpeg {
        image::DynamicImage::ImageRgba8(image.clone())
            .to_rgb8()
            .save(path)?;
    } else {
        image.save(path)?;
    }
    Ok(())
}

/// Generate a default output path from the destination path.
///
/// Example: `"photo.png"` becomes `"photo_healed.png"`.
#[must_use]
pub fn default_output_path(destination: &Path) -> PathBuf {
    let stem = destination.file_stem().unwrap_or_default().to_string_lossy();
    let ext = destination.extension().unwrap_or_default().to_string_lossy();
    let parent = destination.parent().unwrap_or(Path::new("."));
    parent.join(format!("{stem}_healed.{ext}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn heal_rejects_mismatched_mask() {
        let mask = GrayImage::new(4, 5);
        let source = RgbaImage::new(5, 5);
        let destination = RgbaImage::new(5, 5);
        let err = heal(&mask, &source, &destination, &HealOptions::default()).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { buffer: "mask", .. }));
    }

    #[test]
    fn heal_rejects_mismatched_source() {
        let mask = GrayImage::new(5, 5);
        let source = RgbaImage::new(5, 6);
        let destination = RgbaImage::new(5, 5);
        let err = heal(&mask, &source, &destination, &HealOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            Error::ShapeMismatch {
                buffer: "source",
                ..
            }
        ));
    }

    #[test]
    fn heal_rejects_regions_without_an_interior() {
        let mask = GrayImage::new(2, 2);
        let source = RgbaImage::new(2, 2);
        let destination = RgbaImage::new(2, 2);
        let err = heal(&mask, &source, &destination, &HealOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            Error::RegionTooSmall {
                width: 2,
                height: 2
            }
        ));
    }

    #[test]
    fn patch_alpha_follows_the_mask() {
        let mut mask = GrayImage::new(6, 6);
        mask.put_pixel(2, 2, Luma([255]));
        mask.put_pixel(3, 2, Luma([7]));
        let source = RgbaImage::from_pixel(6, 6, Rgba([180, 90, 40, 255]));
        let destination = RgbaImage::from_pixel(6, 6, Rgba([20, 20, 20, 255]));

        let patch = heal(&mask, &source, &destination, &HealOptions::default()).unwrap();
        for (x, y, px) in patch.enumerate_pixels() {
            if mask.get_pixel(x, y).0[0] == 0 {
                assert_eq!(px.0, [0, 0, 0, 0], "unmasked pixel ({x},{y}) not blank");
            } else {
                assert_eq!(px[3], 255, "masked pixel ({x},{y}) not opaque");
            }
        }
    }

    #[test]
    fn zero_sweeps_keeps_the_seeded_values() {
        let mut mask = GrayImage::new(5, 5);
        mask.put_pixel(2, 2, Luma([255]));
        let source = RgbaImage::from_pixel(5, 5, Rgba([200, 200, 200, 255]));
        let destination = RgbaImage::from_pixel(5, 5, Rgba([100, 100, 100, 255]));

        let opts = HealOptions { sweeps: Some(0) };
        let patch = heal(&mask, &source, &destination, &opts).unwrap();
        assert_eq!(patch.get_pixel(2, 2).0, [200, 200, 200, 255]);
    }

    #[test]
    fn composite_over_rejects_mismatched_patch() {
        let patch = RgbaImage::new(4, 4);
        let destination = RgbaImage::new(5, 4);
        assert!(matches!(
            composite_over(&patch, &destination),
            Err(Error::ShapeMismatch { buffer: "patch", .. })
        ));
    }

    #[test]
    fn composite_over_replaces_only_opaque_pixels() {
        let mut patch = RgbaImage::new(3, 3);
        patch.put_pixel(1, 1, Rgba([9, 9, 9, 255]));
        let destination = RgbaImage::from_pixel(3, 3, Rgba([50, 60, 70, 255]));

        let out = composite_over(&patch, &destination).unwrap();
        assert_eq!(out.get_pixel(1, 1).0, [9, 9, 9, 255]);
        assert_eq!(out.get_pixel(0, 0).0, [50, 60, 70, 255]);
        assert_eq!(out.get_pixel(2, 2).0, [50, 60, 70, 255]);
    }

    #[test]
    fn default_output_path_appends_healed_suffix() {
        let p = default_output_path(Path::new("/tmp/photo.png"));
        assert_eq!(p, PathBuf::from("/tmp/photo_healed.png"));

        let p = default_output_path(Path::new("image.jpg"));
        assert_eq!(p.file_name().unwrap().to_str().unwrap(), "image_healed.jpg");
    }
}
