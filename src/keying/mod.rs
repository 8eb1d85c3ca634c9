//! Color-key alpha extraction and spill suppression.
//!
//! Every pixel is keyed on its own: alpha comes from [`classify`], color
//! from the config's [`SpillRule`]. Nothing is shared between pixels, so
//! large images are split across rayon workers.

mod classify;
mod despill;
pub mod types;

pub use classify::{classify, matte_distance, zone, Zone};
pub use despill::{spill_rule_for, SpillRule};
pub use types::{Channel, KeyConfig, MatteColor, MatteFamily};

use image::{Rgba, RgbaImage};
use rayon::prelude::*;

/// Images with at least this many pixels are keyed in parallel.
const PARALLEL_PIXEL_THRESHOLD: usize = 32 * 1024;

/// Key a single pixel. The source alpha is discarded.
#[inline]
pub fn key_pixel(pixel: Rgba<u8>, config: &KeyConfig) -> Rgba<u8> {
    let [r, g, b, _] = pixel.0;
    let alpha = classify([r, g, b], config);
    let [r, g, b] = config.suppress([r, g, b]);
    Rgba([r, g, b, alpha])
}

/// Key a copy of `image`.
pub fn key_image(image: &RgbaImage, config: &KeyConfig) -> RgbaImage {
    let mut output = image.clone();
    key_image_in_place(&mut output, config);
    output
}

/// Key `image` in place.
pub fn key_image_in_place(image: &mut RgbaImage, config: &KeyConfig) {
    let (width, height) = image.dimensions();
    let len = width as usize * height as usize;
    let _span = tracing::debug_span!("key_image", width, height).entered();

    let raw: &mut [u8] = image;
    if len >= PARALLEL_PIXEL_THRESHOLD {
        raw.par_chunks_exact_mut(4)
            .for_each(|pixel| key_chunk(pixel, config));
    } else {
        raw.chunks_exact_mut(4)
            .for_each(|pixel| key_chunk(pixel, config));
    }
}

#[inline]
fn key_chunk(pixel: &mut [u8], config: &KeyConfig) {
    let keyed = key_pixel(Rgba([pixel[0], pixel[1], pixel[2], pixel[3]]), config);
    pixel.copy_from_slice(&keyed.0);
}

/// How a keyed image splits into transparent, partial and opaque pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlphaCoverage {
    pub transparent: usize,
    pub partial: usize,
    pub opaque: usize,
}

impl AlphaCoverage {
    pub fn measure(image: &RgbaImage) -> Self {
        image
            .pixels()
            .fold(Self::default(), |mut coverage, pixel| {
                match pixel[3] {
                    0 => coverage.transparent += 1,
                    255 => coverage.opaque += 1,
                    _ => coverage.partial += 1,
                }
                coverage
            })
    }

    pub fn total(&self) -> usize {
        self.transparent + self.partial + self.opaque
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn magenta_60_40() -> KeyConfig {
        KeyConfig::new(MatteColor::MAGENTA, 60.0, 40.0).unwrap()
    }

    #[test]
    fn exact_magenta_becomes_clear_black() {
        let out = key_pixel(Rgba([255, 0, 255, 255]), &magenta_60_40());
        assert_eq!(out, Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn pure_green_passes_through() {
        let out = key_pixel(Rgba([0, 255, 0, 255]), &magenta_60_40());
        assert_eq!(out, Rgba([0, 255, 0, 255]));
    }

    #[test]
    fn tinted_foreground_is_despilled_and_opaque() {
        let out = key_pixel(Rgba([128, 64, 128, 255]), &magenta_60_40());
        assert_eq!(out, Rgba([64, 64, 64, 255]));
    }

    #[test]
    fn edge_pixel_gets_ramp_alpha_and_despill() {
        // distance 80: alpha 128, blue clamped to green, red reduced by 255
        let out = key_pixel(Rgba([175, 0, 255, 255]), &magenta_60_40());
        assert_eq!(out, Rgba([0, 0, 0, 128]));
    }

    #[test]
    fn source_alpha_is_overwritten() {
        let out = key_pixel(Rgba([0, 255, 0, 0]), &magenta_60_40());
        assert_eq!(out[3], 255);
    }

    #[test]
    fn white_matte_keys_without_despill() {
        let config = KeyConfig::new(MatteColor::WHITE, 60.0, 40.0).unwrap();
        assert_eq!(key_pixel(Rgba([255, 255, 255, 255]), &config), Rgba([255, 255, 255, 0]));
        assert_eq!(key_pixel(Rgba([90, 20, 200, 255]), &config), Rgba([90, 20, 200, 255]));
    }

    #[test]
    fn image_keeps_dimensions() {
        let image = RgbaImage::from_pixel(7, 3, Rgba([255, 0, 255, 255]));
        let out = key_image(&image, &magenta_60_40());
        assert_eq!(out.dimensions(), (7, 3));
        assert!(out.pixels().all(|p| *p == Rgba([0, 0, 0, 0])));
        // the source buffer is left alone
        assert_eq!(*image.get_pixel(0, 0), Rgba([255, 0, 255, 255]));
    }

    #[test]
    fn empty_image_is_fine() {
        let out = key_image(&RgbaImage::new(0, 0), &magenta_60_40());
        assert_eq!(out.dimensions(), (0, 0));
    }

    #[test]
    fn parallel_and_sequential_paths_agree() {
        let config = magenta_60_40();
        // 256 x 160 crosses the parallel threshold
        let image = RgbaImage::from_fn(256, 160, |x, y| {
            Rgba([x as u8, (y * 3 / 2) as u8, 255 - x as u8, (x ^ y) as u8])
        });
        assert!(image.len() / 4 >= PARALLEL_PIXEL_THRESHOLD);

        let parallel = key_image(&image, &config);
        for (x, y, pixel) in image.enumerate_pixels() {
            assert_eq!(
                *parallel.get_pixel(x, y),
                key_pixel(*pixel, &config),
                "mismatch at ({x}, {y})"
            );
        }
    }

    #[test]
    fn coverage_counts_alpha_bands() {
        let config = magenta_60_40();
        let mut image = RgbaImage::from_pixel(4, 1, Rgba([255, 0, 255, 255]));
        image.put_pixel(1, 0, Rgba([175, 0, 255, 255]));
        image.put_pixel(2, 0, Rgba([0, 255, 0, 255]));
        image.put_pixel(3, 0, Rgba([0, 0, 0, 255]));

        let coverage = AlphaCoverage::measure(&key_image(&image, &config));
        assert_eq!(
            coverage,
            AlphaCoverage {
                transparent: 1,
                partial: 1,
                opaque: 2,
            }
        );
        assert_eq!(coverage.total(), 4);
    }
}
