use super::types::{KeyConfig, MatteColor};

/// Where a pixel falls relative to the matte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    /// Closer than `tolerance`: background, fully transparent.
    Matte,
    /// Inside `[tolerance, tolerance + soft_edge)`: alpha ramps up.
    Edge,
    /// At or beyond `tolerance + soft_edge`: foreground, fully opaque.
    Foreground,
}

/// Euclidean distance between an RGB triple and the matte.
#[inline]
pub fn matte_distance(rgb: [u8; 3], matte: MatteColor) -> f64 {
    let sum_sq: i32 = rgb
        .iter()
        .zip(matte.channels())
        .map(|(&c, m)| {
            let d = i32::from(c) - i32::from(m);
            d * d
        })
        .sum();
    f64::from(sum_sq).sqrt()
}

/// Three-zone decision for a distance. The ramp interval is half-open.
#[inline]
pub fn zone(distance: f64, config: &KeyConfig) -> Zone {
    if distance < config.tolerance() {
        Zone::Matte
    } else if distance < config.tolerance() + config.soft_edge() {
        Zone::Edge
    } else {
        Zone::Foreground
    }
}

/// Alpha for a pixel from its distance to the matte.
///
/// Edge pixels get `255 * (distance - tolerance) / soft_edge` rounded half
/// up, so a pixel halfway through a 40-wide ramp maps to 128, not 127.
#[inline]
pub fn classify(rgb: [u8; 3], config: &KeyConfig) -> u8 {
    let distance = matte_distance(rgb, config.matte());
    match zone(distance, config) {
        Zone::Matte => 0,
        Zone::Edge => {
            // soft_edge > 0 here, otherwise the zone is empty
            let factor = (distance - config.tolerance()) / config.soft_edge();
            round_half_up(factor * 255.0)
        }
        Zone::Foreground => 255,
    }
}

#[inline]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn round_half_up(value: f64) -> u8 {
    (value + 0.5).floor().clamp(0.0, 255.0) as u8
}
