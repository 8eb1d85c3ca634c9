use super::OutputSink;
use crate::error::{Error, Result};
use image::{ImageFormat, RgbaImage};
use std::fs;
use std::path::{Path, PathBuf};

/// Keyed image written to disk in a format that keeps the alpha channel.
pub struct FileOutput {
    path: PathBuf,
    format: ImageFormat,
}

impl FileOutput {
    /// Infer the format from the file extension.
    ///
    /// Fails for unknown extensions and for formats that would drop or
    /// quantize the alpha channel, so callers learn about it before any
    /// pixel work is done.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let format =
            ImageFormat::from_path(path).map_err(|_| Error::UnsupportedOutputFormat {
                path: path.to_path_buf(),
                reason: "unrecognised file extension".to_string(),
            })?;

        if let Some(reason) = alpha_rejection(format) {
            return Err(Error::UnsupportedOutputFormat {
                path: path.to_path_buf(),
                reason: reason.to_string(),
            });
        }

        Ok(Self {
            path: path.to_path_buf(),
            format,
        })
    }

    /// Always encode as PNG, whatever the extension says.
    pub fn png<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            format: ImageFormat::Png,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }
}

/// Why `format` can't hold a keyed image, if it can't.
fn alpha_rejection(format: ImageFormat) -> Option<&'static str> {
    match format {
        ImageFormat::Png
        | ImageFormat::WebP
        | ImageFormat::Tiff
        | ImageFormat::Tga
        | ImageFormat::Qoi => None,
        ImageFormat::Jpeg => Some("JPEG is lossy and has no alpha channel"),
        ImageFormat::Gif => Some("GIF only supports on/off transparency"),
        ImageFormat::Avif => Some("AVIF encoding is lossy"),
        _ => Some("format cannot store 8-bit RGBA losslessly"),
    }
}

impl OutputSink for FileOutput {
    fn write_image(&mut self, image: &RgbaImage) -> Result<()> {
        let _span = tracing::debug_span!("encode").entered();

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| Error::CreateDir {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        image
            .save_with_format(&self.path, self.format)
            .map_err(|source| Error::ImageSave {
                path: self.path.clone(),
                source,
            })?;

        tracing::debug!("Encoded {} as {:?}", self.path.display(), self.format);
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
