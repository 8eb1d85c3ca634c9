use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

use super::types::{Channel, MatteFamily};

/// Channel-clamping despill rule.
///
/// A pixel carries spill when its `dominant` channel exceeds its `reference`
/// channel. The excess is removed from `dominant` (clamped down to
/// `reference`) and the same amount is taken from `compensated`, the channel
/// that rises together with `dominant` in the matte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpillRule {
    dominant: Channel,
    reference: Channel,
    compensated: Channel,
}

impl SpillRule {
    /// Magenta matte: blue over green marks spill, red moves with blue.
    pub const MAGENTA: SpillRule = SpillRule {
        dominant: Channel::Blue,
        reference: Channel::Green,
        compensated: Channel::Red,
    };

    /// The three channels must be pairwise distinct.
    pub fn new(dominant: Channel, reference: Channel, compensated: Channel) -> Result<Self> {
        if dominant == reference || dominant == compensated || reference == compensated {
            return Err(Error::invalid_parameter(
                "despill",
                format!("channels must differ, got {dominant},{reference},{compensated}"),
            ));
        }
        Ok(Self {
            dominant,
            reference,
            compensated,
        })
    }

    pub fn dominant(&self) -> Channel {
        self.dominant
    }

    pub fn reference(&self) -> Channel {
        self.reference
    }

    pub fn compensated(&self) -> Channel {
        self.compensated
    }

    /// Apply the rule to an RGB triple. Alpha is not involved.
    #[inline]
    pub fn suppress(&self, rgb: [u8; 3]) -> [u8; 3] {
        let dominant = rgb[self.dominant.index()];
        let reference = rgb[self.reference.index()];
        if dominant <= reference {
            return rgb;
        }

        let delta = dominant - reference;
        let mut out = rgb;
        out[self.dominant.index()] = reference;
        out[self.compensated.index()] = rgb[self.compensated.index()].saturating_sub(delta);
        out
    }
}

impl fmt::Display for SpillRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.dominant, self.reference, self.compensated)
    }
}

/// Parses `dominant,reference,compensated`, e.g. `blue,green,red`.
impl FromStr for SpillRule {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(',').collect();
        let [dominant, reference, compensated] = parts.as_slice() else {
            return Err(Error::invalid_parameter(
                "despill",
                format!("expected DOMINANT,REFERENCE,COMPENSATED, got {s:?}"),
            ));
        };
        Self::new(dominant.parse()?, reference.parse()?, compensated.parse()?)
    }
}

/// Spill policy table: which rule applies to which matte family.
///
/// Only magenta has a known correction. White mattes have no rule yet and
/// are keyed without despill rather than with a guessed one.
pub fn spill_rule_for(family: MatteFamily) -> Option<SpillRule> {
    match family {
        MatteFamily::Magenta => Some(SpillRule::MAGENTA),
        MatteFamily::White => None,
        MatteFamily::Unclassified => None,
    }
}
