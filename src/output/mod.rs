mod file;

pub use file::FileOutput;

use crate::Result;
use image::RgbaImage;

/// Trait for destinations of keyed images
pub trait OutputSink {
    /// Encode and persist a keyed image
    fn write_image(&mut self, image: &RgbaImage) -> Result<()>;

    /// Human-readable name for logs
    fn describe(&self) -> String;
}
