//! Error types for the poisson-heal crate.

/// Errors that can occur while validating inputs or running the heal pipeline.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Requested buffer extents are zero or overflow addressable memory.
    #[error("cannot allocate a {width}x{height} buffer with {channels} channels")]
    Allocation {
        /// Requested width in pixels.
        width: u32,
        /// Requested height in pixels.
        height: u32,
        /// Requested channels per pixel.
        channels: u32,
    },

    /// Mask, source, and destination dimensions disagree.
    #[error("{buffer} is {width}x{height}, expected {expected_width}x{expected_height}")]
    ShapeMismatch {
        /// Which input buffer has the wrong shape.
        buffer: &'static str,
        /// Actual width in pixels.
        width: u32,
        /// Actual height in pixels.
        height: u32,
        /// Expected width in pixels.
        expected_width: u32,
        /// Expected height in pixels.
        expected_height: u32,
    },

    /// The region is too small for a solvable interior to exist.
    #[error("region too small ({width}x{height}), healing needs at least 3x3")]
    RegionTooSmall {
        /// Region width in pixels.
        width: u32,
        /// Region height in pixels.
        height: u32,
    },

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An error occurred during image processing (load, save, encode).
    #[error("image processing error: {0}")]
    Image(#[from] image::ImageError),
}

/// A specialized `Result` type for this crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let io_err = Error::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert!(io_err.to_string().contains("gone"));

        let alloc = Error::Allocation {
            width: 0,
            height: 7,
            channels: 3,
        };
        assert!(alloc.to_string().contains("0x7"));

        let mismatch = Error::ShapeMismatch {
            buffer: "mask",
            width: 10,
            height: 20,
            expected_width: 30,
            expected_height: 40,
        };
        let msg = mismatch.to_string();
        assert!(msg.contains("mask"));
        assert!(msg.contains("10x20"));
        assert!(msg.contains("30x40"));

        let small = Error::RegionTooSmall {
            width: 2,
            height: 2,
        };
        assert!(small.to_string().contains("2x2"));
    }
}
