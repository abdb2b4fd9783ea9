//! Stroke and background colors.
//!
//! Colors are configured as hex strings and serialized the same way.

use crate::error::WaveError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// sRGB color with components in [0, 1].
///
/// Serializes as a hex string `"#rrggbb"`. The hex round-trip is quantized
/// to 8 bits per channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Srgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Srgb {
    pub const BLACK: Srgb = Srgb {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };

    pub const WHITE: Srgb = Srgb {
        r: 1.0,
        g: 1.0,
        b: 1.0,
    };

    /// Parses `"#rrggbb"`, `"rrggbb"` or the short form `"#rgb"` (case insensitive).
    ///
    /// Returns `WaveError::InvalidColor` for anything else.
    pub fn from_hex(hex: &str) -> Result<Srgb, WaveError> {
        let hex = hex.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let expanded: String = match hex.len() {
            3 => hex.chars().flat_map(|c| [c, c]).collect(),
            6 => hex.to_owned(),
            n => {
                return Err(WaveError::InvalidColor(format!(
                    "expected 3 or 6 hex digits, got {n}"
                )))
            }
        };
        let channel = |range: std::ops::Range<usize>, name: &str| {
            expanded
                .get(range)
                .ok_or_else(|| WaveError::InvalidColor(format!("non-ascii {name} component")))
                .and_then(|s| {
                    u8::from_str_radix(s, 16).map_err(|e| {
                        WaveError::InvalidColor(format!("invalid {name} component: {e}"))
                    })
                })
        };
        let r = channel(0..2, "red")?;
        let g = channel(2..4, "green")?;
        let b = channel(4..6, "blue")?;
        Ok(Srgb::from_rgb8(r, g, b))
    }

    /// Builds a color from 8-bit channels.
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Srgb {
        Srgb {
            r: r as f64 / 255.0,
            g: g as f64 / 255.0,
            b: b as f64 / 255.0,
        }
    }

    /// Quantizes to 8-bit channels with rounding.
    pub fn to_rgb8(self) -> [u8; 3] {
        let q = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b)]
    }

    /// Converts the color to a hex string like `"#rrggbb"`.
    pub fn to_hex(self) -> String {
        let [r, g, b] = self.to_rgb8();
        format!("#{r:02x}{g:02x}{b:02x}")
    }

    /// CSS `rgba(...)` string with the given alpha, as accepted by canvas stroke styles.
    pub fn to_css_rgba(self, alpha: f64) -> String {
        let [r, g, b] = self.to_rgb8();
        let a = if alpha.is_finite() {
            alpha.clamp(0.0, 1.0)
        } else {
            1.0
        };
        format!("rgba({r}, {g}, {b}, {a})")
    }
}

impl Serialize for Srgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Srgb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Srgb::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_hex_parses_long_form() {
        let c = Srgb::from_hex("#ff8000").unwrap();
        assert_eq!(c.to_rgb8(), [255, 128, 0]);
    }

    #[test]
    fn from_hex_accepts_missing_hash_and_uppercase() {
        let c = Srgb::from_hex("FF00AA").unwrap();
        assert_eq!(c.to_rgb8(), [255, 0, 170]);
    }

    #[test]
    fn from_hex_expands_short_form() {
        let c = Srgb::from_hex("#0f8").unwrap();
        assert_eq!(c.to_rgb8(), [0, 255, 136]);
    }

    #[test]
    fn from_hex_rejects_wrong_length() {
        assert!(matches!(
            Srgb::from_hex("#12345"),
            Err(WaveError::InvalidColor(_))
        ));
    }

    #[test]
    fn from_hex_rejects_non_hex_digits() {
        let err = Srgb::from_hex("#gg0000").unwrap_err();
        assert!(err.to_string().contains("red"), "got: {err}");
    }

    #[test]
    fn from_hex_rejects_multibyte_input() {
        assert!(Srgb::from_hex("#ééé").is_err());
    }

    #[test]
    fn to_hex_round_trips_8_bit_values() {
        assert_eq!(Srgb::from_hex("#1a2b3c").unwrap().to_hex(), "#1a2b3c");
    }

    #[test]
    fn css_rgba_clamps_alpha() {
        assert_eq!(Srgb::WHITE.to_css_rgba(2.0), "rgba(255, 255, 255, 1)");
        assert_eq!(Srgb::BLACK.to_css_rgba(0.25), "rgba(0, 0, 0, 0.25)");
        assert_eq!(Srgb::BLACK.to_css_rgba(f64::NAN), "rgba(0, 0, 0, 1)");
    }

    #[test]
    fn serde_uses_hex_strings() {
        let json = serde_json::to_string(&Srgb::from_rgb8(0, 255, 0)).unwrap();
        assert_eq!(json, "\"#00ff00\"");
        let back: Srgb = serde_json::from_str(&json).unwrap();
        assert_eq!(back.to_rgb8(), [0, 255, 0]);
        assert!(serde_json::from_str::<Srgb>("\"nope\"").is_err());
    }
}
