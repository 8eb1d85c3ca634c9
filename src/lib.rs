//! # mattekey
//!
//! Removes a known solid matte color (magenta, white, ...) from rendered or
//! photographed images, turning it into transparency, and cleans the matte
//! tint left on translucent edge pixels.
//!
//! ```
//! use image::{Rgba, RgbaImage};
//! use mattekey::{key_image, KeyConfig, MatteColor};
//!
//! # fn main() -> mattekey::Result<()> {
//! let config = KeyConfig::new(MatteColor::MAGENTA, 60.0, 40.0)?;
//! let image = RgbaImage::from_pixel(2, 2, Rgba([255, 0, 255, 255]));
//!
//! let keyed = key_image(&image, &config);
//! assert_eq!(*keyed.get_pixel(0, 0), Rgba([0, 0, 0, 0]));
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod keying;
pub mod output;
pub mod source;

pub use error::{Error, Result};
pub use keying::{
    key_image, key_image_in_place, key_pixel, AlphaCoverage, KeyConfig, MatteColor, MatteFamily,
    SpillRule,
};
