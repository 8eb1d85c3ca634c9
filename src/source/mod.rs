mod file;

pub use file::FileSource;

use crate::Result;
use image::RgbaImage;

/// Trait for image sources feeding the keyer
pub trait ImageSource {
    /// Decode the full image into an RGBA buffer
    fn load(&mut self) -> Result<RgbaImage>;

    /// Human-readable name for logs
    fn describe(&self) -> String;
}
