use std::fmt;
use std::str::FromStr;

use raqote::SolidSource;
use serde::{Deserialize, Serialize};

use crate::error::ColorParseError;

/// A straight (non-premultiplied) RGBA color.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(0xff, 0xff, 0xff);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const TRANSPARENT: Color = Color {
        r: 0,
        g: 0,
        b: 0,
        a: 0,
    };

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b, a: 0xff }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Color { r, g, b, a }
    }

    /// The same color with full alpha.
    pub const fn opaque(self) -> Self {
        Color::rgb(self.r, self.g, self.b)
    }

    /// Packs the color the way the canvas stores it: premultiplied `0xAARRGGBB`.
    pub fn to_premultiplied_argb(self) -> u32 {
        let a = u32::from(self.a);
        let mul = |c: u8| (u32::from(c) * a + 127) / 255;
        (a << 24) | (mul(self.r) << 16) | (mul(self.g) << 8) | mul(self.b)
    }

    /// Inverse of [`Color::to_premultiplied_argb`]. Exact for opaque colors.
    pub fn from_premultiplied_argb(px: u32) -> Self {
        let [b, g, r, a] = px.to_le_bytes();
        if a == 0 {
            return Color::TRANSPARENT;
        }
        let div = |c: u8| ((u32::from(c) * 255 + u32::from(a) / 2) / u32::from(a)).min(255) as u8;
        Color::rgba(div(r), div(g), div(b), a)
    }

    pub fn to_source(self) -> SolidSource {
        SolidSource::from_unpremultiplied_argb(self.a, self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    /// Parses `#rrggbb` or `#rrggbbaa`; the leading `#` is optional.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix('#').unwrap_or(s);
        let bytes = hex::decode(digits).map_err(|_| ColorParseError(s.to_owned()))?;
        match bytes[..] {
            [r, g, b] => Ok(Color::rgb(r, g, b)),
            [r, g, b, a] => Ok(Color::rgba(r, g, b, a)),
            _ => Err(ColorParseError(s.to_owned())),
        }
    }
}

impl TryFrom<String> for Color {
    type Error = ColorParseError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> String {
        color.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", hex::encode([self.r, self.g, self.b]))?;
        if self.a != 0xff {
            write!(f, "{}", hex::encode([self.a]))?;
        }
        Ok(())
    }
}

/// Colors drawn from the shared random source, one draw per channel in R, G, B order.
///
/// The bands keep noise layers apart from the challenge text: dots use the full range,
/// decorative glyphs stay light, rectangles sit in the middle and the challenge text is dark.
pub mod palette {
    use super::Color;
    use crate::rand::RandomSource;

    fn band(rng: &RandomSource, min: u8, span: usize) -> Color {
        let channel = || min + rng.next_int(span) as u8;
        let r = channel();
        let g = channel();
        let b = channel();
        Color::rgb(r, g, b)
    }

    /// Channels in `[0, 255]`.
    pub fn random(rng: &RandomSource) -> Color {
        band(rng, 0, 256)
    }

    /// Channels in `[200, 255)`.
    pub fn light(rng: &RandomSource) -> Color {
        band(rng, 200, 55)
    }

    /// Channels in `[100, 255)`.
    pub fn middle(rng: &RandomSource) -> Color {
        band(rng, 100, 155)
    }

    /// Channels in `[0, 100)`.
    pub fn dark(rng: &RandomSource) -> Color {
        band(rng, 0, 100)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::rand::RandomSource;

    #[test]
    fn test_parse_and_format() {
        let c: Color = "#1a2b3c".parse().unwrap();
        assert_eq!(c, Color::rgb(0x1a, 0x2b, 0x3c));
        assert_eq!(c.to_string(), "#1a2b3c");

        let c: Color = "ff000080".parse().unwrap();
        assert_eq!(c, Color::rgba(0xff, 0, 0, 0x80));
        assert_eq!(c.to_string(), "#ff000080");

        assert!("#12345".parse::<Color>().is_err());
        assert!("#zzzzzz".parse::<Color>().is_err());
        assert!("".parse::<Color>().is_err());
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&Color::WHITE).unwrap();
        assert_eq!(json, "\"#ffffff\"");
        let back: Color = serde_json::from_str("\"#000000\"").unwrap();
        assert_eq!(back, Color::BLACK);
        assert!(serde_json::from_str::<Color>("\"nope\"").is_err());
    }

    #[test]
    fn test_premultiplied_round_trip() {
        for c in [Color::WHITE, Color::BLACK, Color::rgb(12, 200, 99)] {
            assert_eq!(Color::from_premultiplied_argb(c.to_premultiplied_argb()), c);
        }
        assert_eq!(Color::TRANSPARENT.to_premultiplied_argb(), 0);
        assert_eq!(Color::WHITE.to_premultiplied_argb(), 0xffff_ffff);
        assert_eq!(Color::rgba(255, 0, 0, 128).to_premultiplied_argb(), 0x8080_0000);
    }

    #[test]
    fn test_palette_bands() {
        let rng = RandomSource::from_seed(3);
        for _ in 0..500 {
            let c = palette::light(&rng);
            assert!([c.r, c.g, c.b].iter().all(|v| (200..255).contains(v)));
            let c = palette::middle(&rng);
            assert!([c.r, c.g, c.b].iter().all(|v| (100..255).contains(v)));
            let c = palette::dark(&rng);
            assert!([c.r, c.g, c.b].iter().all(|v| *v < 100));
            assert_eq!(palette::random(&rng).a, 0xff);
        }
    }
}
