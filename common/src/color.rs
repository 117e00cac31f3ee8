//! RGB colour values used for cell fills.
//!
//! Colours arrive as CSS-style strings in the configuration (`#7bc96f`,
//! `#fff`, `rgb(123, 201, 111)`) and leave as `#rrggbb` in rendered output.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::HeatmapError;

/// An opaque 8-bit-per-channel colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Interpolate channel-wise from `self` (t = 0) to `other` (t = 1).
    ///
    /// `t` is clamped to `[0, 1]`; a non-finite `t` yields `other`.
    pub fn lerp(self, other: Rgb, t: f64) -> Rgb {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 1.0 };
        let mix = |a: u8, b: u8| -> u8 {
            let v = a as f64 + (b as f64 - a as f64) * t;
            v.round().clamp(0.0, 255.0) as u8
        };
        Rgb::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = HeatmapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let invalid = || HeatmapError::InvalidColor {
            value: s.to_string(),
        };

        if let Some(hex) = raw.strip_prefix('#') {
            if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(invalid());
            }
            return match hex.len() {
                3 => {
                    let digit = |i: usize| {
                        u8::from_str_radix(&hex[i..i + 1], 16).map(|v| v * 17)
                    };
                    Ok(Rgb::new(
                        digit(0).map_err(|_| invalid())?,
                        digit(1).map_err(|_| invalid())?,
                        digit(2).map_err(|_| invalid())?,
                    ))
                }
                6 => {
                    let pair = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16);
                    Ok(Rgb::new(
                        pair(0).map_err(|_| invalid())?,
                        pair(2).map_err(|_| invalid())?,
                        pair(4).map_err(|_| invalid())?,
                    ))
                }
                _ => Err(invalid()),
            };
        }

        let lower = raw.to_ascii_lowercase();
        if let Some(body) = lower
            .strip_prefix("rgb(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            let channels: Vec<u8> = body
                .split(',')
                .map(|c| c.trim().parse::<u8>())
                .collect::<Result<_, _>>()
                .map_err(|_| invalid())?;
            if let [r, g, b] = channels[..] {
                return Ok(Rgb::new(r, g, b));
            }
        }

        Err(invalid())
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
