use super::ImageSource;
use crate::error::{Error, Result};
use image::RgbaImage;
use std::path::{Path, PathBuf};

/// Raster file on disk, in any format the `image` crate can decode.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ImageSource for FileSource {
    fn load(&mut self) -> Result<RgbaImage> {
        let _span = tracing::debug_span!("decode").entered();

        let img = image::open(&self.path).map_err(|source| Error::ImageLoad {
            path: self.path.clone(),
            source,
        })?;

        tracing::debug!(
            "Decoded {} ({}x{}, {:?})",
            self.path.display(),
            img.width(),
            img.height(),
            img.color()
        );

        Ok(img.into_rgba8())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
