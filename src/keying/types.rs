use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

use super::despill::{spill_rule_for, SpillRule};

/// A color channel of an RGB(A) pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Red,
    Green,
    Blue,
}

impl Channel {
    /// Index of this channel inside an `Rgba<u8>` / `[u8; 3]`.
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Channel::Red => 0,
            Channel::Green => 1,
            Channel::Blue => 2,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Channel::Red => "red",
            Channel::Green => "green",
            Channel::Blue => "blue",
        };
        f.write_str(name)
    }
}

impl FromStr for Channel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "r" | "red" => Ok(Channel::Red),
            "g" | "green" => Ok(Channel::Green),
            "b" | "blue" => Ok(Channel::Blue),
            other => Err(Error::invalid_parameter(
                "channel",
                format!("expected red, green or blue, got {other:?}"),
            )),
        }
    }
}

/// The solid background color to key out. Always assumed fully opaque.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MatteColor([u8; 3]);

impl MatteColor {
    pub const MAGENTA: MatteColor = MatteColor([255, 0, 255]);
    pub const WHITE: MatteColor = MatteColor([255, 255, 255]);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b])
    }

    #[inline]
    pub const fn channels(&self) -> [u8; 3] {
        self.0
    }

    /// Category of this matte, used to pick a spill rule.
    pub fn family(&self) -> MatteFamily {
        let [r, g, b] = self.0.map(|c| c >= ELEVATED_CHANNEL);
        match (r, g, b) {
            (true, true, true) => MatteFamily::White,
            (true, false, true) => MatteFamily::Magenta,
            _ => MatteFamily::Unclassified,
        }
    }
}

/// A channel at or above this level counts as elevated in a matte signature.
const ELEVATED_CHANNEL: u8 = 128;

impl fmt::Display for MatteColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.0;
        write!(f, "#{r:02x}{g:02x}{b:02x}")
    }
}

/// Accepts a preset name (`magenta`, `white`), a hex color (`#ff00ff`,
/// `ff00ff`) or a decimal triple (`255,0,255`).
impl FromStr for MatteColor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let input = s.trim();
        let invalid = |reason: &str| Error::InvalidMatte {
            input: s.to_string(),
            reason: reason.to_string(),
        };

        match input.to_ascii_lowercase().as_str() {
            "magenta" => return Ok(Self::MAGENTA),
            "white" => return Ok(Self::WHITE),
            _ => {}
        }

        if input.contains(',') {
            let parts: Vec<&str> = input.split(',').map(str::trim).collect();
            if parts.len() != 3 {
                return Err(invalid("expected three comma-separated channels"));
            }
            let mut rgb = [0u8; 3];
            for (slot, part) in rgb.iter_mut().zip(&parts) {
                *slot = part
                    .parse()
                    .map_err(|_| invalid("channels must be integers in 0-255"))?;
            }
            return Ok(Self(rgb));
        }

        let hex = input.strip_prefix('#').unwrap_or(input);
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid(
                "expected a preset name, six hex digits or an R,G,B triple",
            ));
        }
        let mut rgb = [0u8; 3];
        for (i, slot) in rgb.iter_mut().enumerate() {
            *slot = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16)
                .map_err(|_| invalid("malformed hex digits"))?;
        }
        Ok(Self(rgb))
    }
}

/// Matte categories that the spill policy table is keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatteFamily {
    /// Red and blue elevated, green low.
    Magenta,
    /// All channels elevated.
    White,
    /// No known channel signature.
    Unclassified,
}

impl fmt::Display for MatteFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MatteFamily::Magenta => "magenta",
            MatteFamily::White => "white",
            MatteFamily::Unclassified => "unclassified",
        };
        f.write_str(name)
    }
}

/// Immutable settings for one keying run.
///
/// Pixels closer than `tolerance` to the matte become fully transparent,
/// alpha ramps linearly over the following `soft_edge` of distance, and
/// everything beyond is opaque. The spill rule is resolved from the matte's
/// family when the config is built and can be replaced afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyConfig {
    matte: MatteColor,
    tolerance: f64,
    soft_edge: f64,
    spill: Option<SpillRule>,
}

impl KeyConfig {
    /// Build a config, rejecting negative or non-finite distances.
    pub fn new(matte: MatteColor, tolerance: f64, soft_edge: f64) -> Result<Self> {
        validate_distance("tolerance", tolerance)?;
        validate_distance("soft_edge", soft_edge)?;

        Ok(Self {
            matte,
            tolerance,
            soft_edge,
            spill: spill_rule_for(matte.family()),
        })
    }

    /// Replace the spill rule picked from the policy table. `None` disables
    /// suppression.
    pub fn with_spill_rule(mut self, spill: Option<SpillRule>) -> Self {
        self.spill = spill;
        self
    }

    pub fn matte(&self) -> MatteColor {
        self.matte
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn soft_edge(&self) -> f64 {
        self.soft_edge
    }

    pub fn spill_rule(&self) -> Option<SpillRule> {
        self.spill
    }

    /// Despill `rgb` with this config's rule, or return it unchanged.
    #[inline]
    pub fn suppress(&self, rgb: [u8; 3]) -> [u8; 3] {
        match self.spill {
            Some(rule) => rule.suppress(rgb),
            None => rgb,
        }
    }
}

fn validate_distance(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(Error::invalid_parameter(name, "must be a finite number"));
    }
    if value < 0.0 {
        return Err(Error::invalid_parameter(
            name,
            format!("must be non-negative, got {value}"),
        ));
    }
    Ok(())
}
