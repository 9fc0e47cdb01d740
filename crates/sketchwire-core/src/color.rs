//! Color handling for stroke attributes.
//!
//! Strokes carry their color as a CSS hex string on the wire; renderers
//! parse it into [`Rgba`] just before painting. A malformed string falls
//! back to opaque black rather than failing the stroke.

use serde::{Deserialize, Serialize};

/// An RGBA color with 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub const fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    pub const fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// Parse a CSS hex color (`#rgb`, `#rrggbb`, or `#rrggbbaa`).
    ///
    /// Returns opaque black for anything unparseable; stroke colors come
    /// off the wire unvalidated and a bad color must not drop the stroke.
    pub fn parse_hex(color: &str) -> Self {
        let Some(hex) = color.trim().strip_prefix('#') else {
            return Self::black();
        };
        match hex.len() {
            3 => {
                let r = u8::from_str_radix(&hex[0..1], 16).unwrap_or(0) * 17;
                let g = u8::from_str_radix(&hex[1..2], 16).unwrap_or(0) * 17;
                let b = u8::from_str_radix(&hex[2..3], 16).unwrap_or(0) * 17;
                Self::new(r, g, b, 255)
            }
            6 => {
                let r = u8::from_str_radix(&hex[0..2], 16).unwrap_or(0);
                let g = u8::from_str_radix(&hex[2..4], 16).unwrap_or(0);
                let b = u8::from_str_radix(&hex[4..6], 16).unwrap_or(0);
                Self::new(r, g, b, 255)
            }
            8 => {
                let r = u8::from_str_radix(&hex[0..2], 16).unwrap_or(0);
                let g = u8::from_str_radix(&hex[2..4], 16).unwrap_or(0);
                let b = u8::from_str_radix(&hex[4..6], 16).unwrap_or(0);
                let a = u8::from_str_radix(&hex[6..8], 16).unwrap_or(255);
                Self::new(r, g, b, a)
            }
            _ => Self::black(),
        }
    }

    /// Format as `#rrggbb` (alpha omitted when opaque).
    pub fn to_hex(self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Self::black()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_six_digit() {
        assert_eq!(Rgba::parse_hex("#ff0000"), Rgba::new(255, 0, 0, 255));
        assert_eq!(Rgba::parse_hex("#00ff7f"), Rgba::new(0, 255, 127, 255));
    }

    #[test]
    fn test_parse_short_form() {
        assert_eq!(Rgba::parse_hex("#f00"), Rgba::new(255, 0, 0, 255));
        assert_eq!(Rgba::parse_hex("#fff"), Rgba::white());
    }

    #[test]
    fn test_parse_with_alpha() {
        assert_eq!(Rgba::parse_hex("#11223344"), Rgba::new(0x11, 0x22, 0x33, 0x44));
    }

    #[test]
    fn test_malformed_falls_back_to_black() {
        assert_eq!(Rgba::parse_hex("red"), Rgba::black());
        assert_eq!(Rgba::parse_hex("#12345"), Rgba::black());
        assert_eq!(Rgba::parse_hex(""), Rgba::black());
    }

    #[test]
    fn test_hex_roundtrip() {
        let color = Rgba::new(18, 52, 86, 255);
        assert_eq!(Rgba::parse_hex(&color.to_hex()), color);
    }
}
