//! Error types for the depix crate.

use crate::geometry::Rectangle;
use crate::grid::ChannelLayout;

/// Errors that can occur while preparing inputs or moving images in and out of the engine.
///
/// Unmatched blocks are not errors; they are reported through
/// [`ResolutionStats`](crate::ResolutionStats).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A pixel grid with a zero dimension was supplied.
    #[error("image has no pixels ({width}x{height})")]
    EmptyImage {
        /// Width in pixels.
        width: u32,
        /// Height in pixels.
        height: u32,
    },

    /// A raw buffer did not hold `width * height * channels` bytes.
    #[error("pixel buffer holds {actual} bytes, expected {expected}")]
    BufferLength {
        /// Byte count implied by the dimensions and layout.
        expected: usize,
        /// Byte count actually supplied.
        actual: usize,
    },

    /// The pixelated and reference grids use different channel layouts.
    #[error("channel layout mismatch: pixelated image is {pixelated}, reference image is {reference}")]
    LayoutMismatch {
        /// Layout of the pixelated image.
        pixelated: ChannelLayout,
        /// Layout of the reference image.
        reference: ChannelLayout,
    },

    /// The requested pixelated region does not lie inside the pixelated image.
    #[error("region {bounds} is outside the {width}x{height} pixelated image")]
    BoundsOutsideImage {
        /// The offending region.
        bounds: Rectangle,
        /// Pixelated image width.
        width: u32,
        /// Pixelated image height.
        height: u32,
    },

    /// A search image index was not present in the registry.
    #[error("no search image with index {index} ({available} available)")]
    SearchImageIndex {
        /// Requested index.
        index: usize,
        /// Number of registered search images.
        available: usize,
    },

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The image format is not supported.
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// An error occurred while decoding or encoding an image.
    #[error("image processing error: {0}")]
    Image(#[from] image::ImageError),
}

/// A specialized `Result` type for this crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;

    #[test]
    fn error_display_messages() {
        let io_err = Error::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert!(io_err.to_string().contains("gone"));

        let unsupported = Error::UnsupportedFormat("tiff".to_string());
        assert!(unsupported.to_string().contains("tiff"));

        let empty = Error::EmptyImage {
            width: 0,
            height: 20,
        };
        assert!(empty.to_string().contains("0x20"));

        let mismatch = Error::LayoutMismatch {
            pixelated: ChannelLayout::Rgb,
            reference: ChannelLayout::Rgba,
        };
        let msg = mismatch.to_string();
        assert!(msg.contains("RGB"));
        assert!(msg.contains("RGBA"));

        let outside = Error::BoundsOutsideImage {
            bounds: Rectangle::new(Point::new(0, 0), Point::new(9, 9)),
            width: 4,
            height: 4,
        };
        let msg = outside.to_string();
        assert!(msg.contains("(0, 0)-(9, 9)"));
        assert!(msg.contains("4x4"));
    }
}
