//! Working-format pixel buffers and display-format conversion.
//!
//! The solver operates on [`Field3`], a dense row-major grid of 3-channel
//! `f32` pixels. Display pixels stay in the `image` crate's `RgbaImage`
//! (4x u8) and `GrayImage` (mask) types; conversion in either direction is
//! a pure elementwise map.

use image::{Rgba, RgbaImage};

use crate::error::{Error, Result};

/// Channels per working-format pixel.
pub const CHANNELS: usize = 3;

/// Dense row-major grid of 3-channel `f32` pixels.
///
/// This is the working format of the heal pipeline: color channels are
/// widened to `f32` with no scaling, alpha is dropped on the way in and
/// reapplied by the mask pass on the way out.
#[derive(Debug, Clone)]
pub struct Field3 {
    width: u32,
    height: u32,
    data: Vec<f32>,
}

impl Field3 {
    /// Allocate a zero-initialized field of the given extents.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Allocation`] if either extent is zero or the total
    /// element count overflows addressable memory.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        #[allow(clippy::cast_possible_truncation)]
        let channels = CHANNELS as u32;
        let len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(CHANNELS))
            .filter(|&n| n > 0)
            .ok_or(Error::Allocation {
                width,
                height,
                channels,
            })?;

        Ok(Self {
            width,
            height,
            data: vec![0.0; len],
        })
    }

    /// A zero-initialized field with the same extents as `self`.
    ///
    /// Infallible: the extents were validated when `self` was allocated.
    #[must_use]
    pub fn zeroed_like(&self) -> Self {
        Self {
            width: self.width,
            height: self.height,
            data: vec![0.0; self.data.len()],
        }
    }

    /// Field width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Field height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    fn index(&self, x: u32, y: u32) -> usize {
        debug_assert!(x < self.width && y < self.height);
        ((y as usize) * (self.width as usize) + (x as usize)) * CHANNELS
    }

    /// Read the pixel at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is outside the field.
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> [f32; CHANNELS] {
        let i = self.index(x, y);
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    /// Write the pixel at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is outside the field.
    pub fn set(&mut self, x: u32, y: u32, px: [f32; CHANNELS]) {
        let i = self.index(x, y);
        self.data[i..i + CHANNELS].copy_from_slice(&px);
    }

    /// Convert display pixels to the working format.
    ///
    /// Drops the alpha channel and widens the color channels to `f32`
    /// with no scaling, so a byte value of 200 becomes exactly 200.0.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Allocation`] if the image has a zero extent.
    pub fn from_rgba(image: &RgbaImage) -> Result<Self> {
        let mut field = Self::new(image.width(), image.height())?;
        for (x, y, px) in image.enumerate_pixels() {
            field.set(
                x,
                y,
                [f32::from(px[0]), f32::from(px[1]), f32::from(px[2])],
            );
        }
        Ok(field)
    }

    /// Convert the working format back to display pixels.
    ///
    /// Each channel is clamped to `[0, 255]` and truncated to a byte;
    /// alpha is forced to 255. Opacity is corrected afterwards by the
    /// mask reapplication pass, not here.
    #[must_use]
    pub fn to_rgba(&self) -> RgbaImage {
        let mut out = RgbaImage::new(self.width, self.height);
        for (x, y, px) in out.enumerate_pixels_mut() {
            let [r, g, b] = self.get(x, y);
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            {
                *px = Rgba([
                    r.clamp(0.0, 255.0) as u8,
                    g.clamp(0.0, 255.0) as u8,
                    b.clamp(0.0, 255.0) as u8,
                    255,
                ]);
            }
        }
        out
    }

    /// Run `kernel` once per row of this field, in parallel when the
    /// `parallel` feature is enabled.
    ///
    /// Each invocation receives the row's y coordinate and exclusive
    /// access to that row's `width * CHANNELS` floats. The kernel may
    /// read any frozen input it captures, so a stage that writes `self`
    /// while reading another field needs no synchronization; the call
    /// returning is the barrier before the next stage.
    pub(crate) fn for_each_row_mut<F>(&mut self, kernel: F)
    where
        F: Fn(u32, &mut [f32]) + Send + Sync,
    {
        let row_len = (self.width as usize) * CHANNELS;

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            self.data
                .par_chunks_mut(row_len)
                .enumerate()
                .for_each(|(y, row)| {
                    #[allow(clippy::cast_possible_truncation)]
                    kernel(y as u32, row);
                });
        }

        #[cfg(not(feature = "parallel"))]
        {
            for (y, row) in self.data.chunks_mut(row_len).enumerate() {
                #[allow(clippy::cast_possible_truncation)]
                kernel(y as u32, row);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_zero_extents() {
        assert!(matches!(
            Field3::new(0, 5),
            Err(Error::Allocation { width: 0, .. })
        ));
        assert!(matches!(
            Field3::new(5, 0),
            Err(Error::Allocation { height: 0, .. })
        ));
    }

    #[test]
    fn new_rejects_overflowing_extents() {
        assert!(Field3::new(u32::MAX, u32::MAX).is_err());
    }

    #[test]
    fn get_set_roundtrip() {
        let mut field = Field3::new(4, 3).unwrap();
        field.set(2, 1, [1.5, -2.0, 300.0]);
        assert_eq!(field.get(2, 1), [1.5, -2.0, 300.0]);
        assert_eq!(field.get(0, 0), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn from_rgba_drops_alpha_and_widens() {
        let mut img = RgbaImage::new(2, 2);
        img.put_pixel(0, 0, Rgba([10, 20, 30, 0]));
        img.put_pixel(1, 1, Rgba([200, 100, 50, 128]));

        let field = Field3::from_rgba(&img).unwrap();
        assert_eq!(field.get(0, 0), [10.0, 20.0, 30.0]);
        assert_eq!(field.get(1, 1), [200.0, 100.0, 50.0]);
    }

    #[test]
    fn to_rgba_clamps_and_sets_opaque_alpha() {
        let mut field = Field3::new(2, 1).unwrap();
        field.set(0, 0, [-5.0, 127.9, 300.0]);
        field.set(1, 0, [0.0, 255.0, 64.0]);

        let img = field.to_rgba();
        assert_eq!(img.get_pixel(0, 0).0, [0, 127, 255, 255]);
        assert_eq!(img.get_pixel(1, 0).0, [0, 255, 64, 255]);
    }

    #[test]
    fn byte_values_roundtrip_exactly() {
        let mut img = RgbaImage::new(3, 2);
        for (x, y, px) in img.enumerate_pixels_mut() {
            #[allow(clippy::cast_possible_truncation)]
            let v = ((x * 90 + y * 41) % 256) as u8;
            *px = Rgba([v, v.wrapping_add(7), v.wrapping_add(13), 255]);
        }

        let roundtrip = Field3::from_rgba(&img).unwrap().to_rgba();
        for (x, y, px) in img.enumerate_pixels() {
            assert_eq!(roundtrip.get_pixel(x, y), px);
        }
    }

    #[test]
    fn for_each_row_mut_visits_every_row_once() {
        let mut field = Field3::new(3, 4).unwrap();
        field.for_each_row_mut(|y, row| {
            for v in row.iter_mut() {
                #[allow(clippy::cast_precision_loss)]
                {
                    *v = y as f32;
                }
            }
        });
        for y in 0..4 {
            #[allow(clippy::cast_precision_loss)]
            let expected = [y as f32; 3];
            for x in 0..3 {
                assert_eq!(field.get(x, y), expected);
            }
        }
    }
}
