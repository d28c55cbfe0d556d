//! In-memory pixel buffers shared by every pipeline stage.
//!
//! A [`PixelGrid`] is always non-empty. Colors are stored as four channels;
//! grids with an [`ChannelLayout::Rgb`] layout keep alpha fully opaque so that
//! equality and averaging behave the same for both layouts.

use std::fmt;

use image::{DynamicImage, RgbImage, RgbaImage};

use crate::error::{Error, Result};
use crate::geometry::{Point, Rectangle};

/// A pixel color with red, green, blue and alpha channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Color(pub [u8; 4]);

impl Color {
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    /// An opaque color.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b, u8::MAX])
    }

    /// A color with explicit alpha.
    #[must_use]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self([r, g, b, a])
    }

    /// Channel values in RGBA order.
    #[must_use]
    pub const fn channels(self) -> [u8; 4] {
        self.0
    }

    /// Per-channel mean of `count` colors whose channel totals are `sums`,
    /// rounded half-up. `count` must be non-zero.
    #[must_use]
    pub fn from_sums(sums: [u64; 4], count: u64) -> Self {
        debug_assert!(count > 0);
        let mean = |sum: u64| u8::try_from((sum + count / 2) / count).unwrap_or(u8::MAX);
        Self(sums.map(mean))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, a] = self.0;
        write!(f, "#{r:02x}{g:02x}{b:02x}{a:02x}")
    }
}

/// Channel layout of a decoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelLayout {
    /// Three 8-bit channels, implicitly opaque.
    Rgb,
    /// Four 8-bit channels.
    Rgba,
}

impl ChannelLayout {
    /// Bytes per pixel.
    #[must_use]
    pub const fn channel_count(self) -> usize {
        match self {
            Self::Rgb => 3,
            Self::Rgba => 4,
        }
    }
}

impl fmt::Display for ChannelLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Rgb => "RGB",
            Self::Rgba => "RGBA",
        })
    }
}

/// A `width x height` array of colors in row-major order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelGrid {
    width: u32,
    height: u32,
    layout: ChannelLayout,
    pixels: Vec<Color>,
}

impl PixelGrid {
    /// Create a grid filled with a single color.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyImage`] if either dimension is zero.
    pub fn new(width: u32, height: u32, layout: ChannelLayout, fill: Color) -> Result<Self> {
        Self::from_fn(width, height, layout, |_, _| fill)
    }

    /// Create a grid by evaluating `f(x, y)` for every pixel.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyImage`] if either dimension is zero.
    pub fn from_fn(
        width: u32,
        height: u32,
        layout: ChannelLayout,
        mut f: impl FnMut(u32, u32) -> Color,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::EmptyImage { width, height });
        }
        let mut pixels = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.push(normalize(layout, f(x, y)));
            }
        }
        Ok(Self {
            width,
            height,
            layout,
            pixels,
        })
    }

    /// Create a grid from interleaved 8-bit channel data.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyImage`] for a zero dimension and
    /// [`Error::BufferLength`] if `bytes` does not match the dimensions.
    pub fn from_raw(width: u32, height: u32, layout: ChannelLayout, bytes: &[u8]) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::EmptyImage { width, height });
        }
        let channels = layout.channel_count();
        let expected = width as usize * height as usize * channels;
        if bytes.len() != expected {
            return Err(Error::BufferLength {
                expected,
                actual: bytes.len(),
            });
        }
        let pixels = bytes
            .chunks_exact(channels)
            .map(|px| Color::rgba(px[0], px[1], px[2], px.get(3).copied().unwrap_or(u8::MAX)))
            .collect();
        Ok(Self {
            width,
            height,
            layout,
            pixels,
        })
    }

    /// Copy an RGB image.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyImage`] if the image has no pixels.
    pub fn from_rgb_image(img: &RgbImage) -> Result<Self> {
        Self::from_raw(img.width(), img.height(), ChannelLayout::Rgb, img.as_raw())
    }

    /// Copy an RGBA image.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyImage`] if the image has no pixels.
    pub fn from_rgba_image(img: &RgbaImage) -> Result<Self> {
        Self::from_raw(img.width(), img.height(), ChannelLayout::Rgba, img.as_raw())
    }

    /// Convert a decoded image, keeping alpha only if the source has it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyImage`] if the image has no pixels.
    pub fn from_dynamic(img: &DynamicImage) -> Result<Self> {
        if img.color().has_alpha() {
            Self::from_rgba_image(&img.to_rgba8())
        } else {
            Self::from_rgb_image(&img.to_rgb8())
        }
    }

    /// Export to an [`image`] buffer matching the grid's layout.
    #[must_use]
    pub fn to_dynamic(&self) -> DynamicImage {
        let channels = self.layout.channel_count();
        let raw: Vec<u8> = self
            .pixels
            .iter()
            .flat_map(|c| c.0.into_iter().take(channels))
            .collect();
        let (w, h) = (self.width, self.height);
        // `raw` holds exactly w * h * channels bytes, so `from_raw` cannot fail.
        match self.layout {
            ChannelLayout::Rgb => RgbImage::from_raw(w, h, raw)
                .map_or_else(|| DynamicImage::new_rgb8(w, h), DynamicImage::ImageRgb8),
            ChannelLayout::Rgba => RgbaImage::from_raw(w, h, raw)
                .map_or_else(|| DynamicImage::new_rgba8(w, h), DynamicImage::ImageRgba8),
        }
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Channel layout.
    #[must_use]
    pub fn layout(&self) -> ChannelLayout {
        self.layout
    }

    /// The rectangle covering the whole grid.
    #[must_use]
    pub fn bounds(&self) -> Rectangle {
        Rectangle::new(Point::new(0, 0), Point::new(self.width - 1, self.height - 1))
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Color at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is outside the grid.
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> Color {
        assert!(
            x < self.width && y < self.height,
            "pixel ({x}, {y}) outside {}x{} grid",
            self.width,
            self.height
        );
        self.pixels[self.index(x, y)]
    }

    /// Color at `(x, y)`, or `None` outside the grid.
    #[must_use]
    pub fn get_checked(&self, x: u32, y: u32) -> Option<Color> {
        (x < self.width && y < self.height).then(|| self.pixels[self.index(x, y)])
    }

    /// Overwrite the color at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is outside the grid.
    pub fn put(&mut self, x: u32, y: u32, color: Color) {
        assert!(
            x < self.width && y < self.height,
            "pixel ({x}, {y}) outside {}x{} grid",
            self.width,
            self.height
        );
        let idx = self.index(x, y);
        self.pixels[idx] = normalize(self.layout, color);
    }

    /// Copy of the pixels inside `rect`, row-major.
    #[must_use]
    pub fn crop(&self, rect: Rectangle) -> Option<Self> {
        let rect = rect.intersection(&self.bounds())?;
        let origin = rect.start();
        Self::from_fn(rect.width(), rect.height(), self.layout, |x, y| {
            self.get(origin.x + x, origin.y + y)
        })
        .ok()
    }
}

fn normalize(layout: ChannelLayout, color: Color) -> Color {
    match layout {
        ChannelLayout::Rgb => {
            let [r, g, b, _] = color.0;
            Color::rgb(r, g, b)
        }
        ChannelLayout::Rgba => color,
    }
}
