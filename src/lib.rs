//! Recover pixelated text by matching blocks against a reference rendering.
//!
//! Pixelation replaces each block of an image with the block's average color.
//! If another image renders the same kind of content the same way (same font,
//! background, spacing), every position in it can be pixelated with the same
//! rule and compared to the redacted blocks. Blocks whose color is reproduced
//! at exactly one position are recovered verbatim; neighbouring blocks then
//! disambiguate each other by their relative offsets.
//!
//! # Quick Start
//!
//! ```no_run
//! use depix::{DepixOptions, Depixelator, PixelGrid};
//!
//! let pixelated = image::open("redacted.png").unwrap().to_rgb8();
//! let search = image::open("debruijn.png").unwrap().to_rgb8();
//! let pixelated = PixelGrid::from_rgb_image(&pixelated).unwrap();
//! let search = PixelGrid::from_rgb_image(&search).unwrap();
//!
//! let engine = Depixelator::new(DepixOptions::default());
//! let result = engine.run(&pixelated, &search).unwrap();
//! println!("{}", result.stats);
//! result.image.to_dynamic().save("recovered.png").unwrap();
//! ```
//!
//! # Pipeline
//!
//! 1. [`segment`]: split the pixelated region into same-color rectangles.
//! 2. [`filter`]: discard rectangles that cannot identify content.
//! 3. [`group`]: batch rectangles by block size.
//! 4. [`matching`]: find every reference position producing each color.
//! 5. [`resolve`]: drop, split and propagate by geometry.
//! 6. [`reconstruct`]: copy or average the recovered blocks into the output.

#![deny(missing_docs)]

mod engine;
pub mod error;
pub mod files;
pub mod filter;
pub mod geometry;
pub mod grid;
pub mod group;
pub mod matching;
pub mod reconstruct;
pub mod registry;
pub mod resolve;
pub mod segment;

pub use engine::{depixelate, Analysis, DepixOptions, Depixelator, Reconstruction};
pub use error::{Error, Result};
pub use files::{
    default_output_path, is_supported_image, load_grid, process_file, save_grid, ProcessResult,
};
pub use filter::FilterOptions;
pub use geometry::{BlockSize, Point, Rectangle};
pub use grid::{ChannelLayout, Color, PixelGrid};
pub use registry::SearchImageRegistry;
pub use resolve::{PropagationOptions, PropagationRounds, ResolutionState, ResolutionStats};
pub use segment::ColorRectangle;
