//! Line segments, the leaf primitive of every stroke.

use kurbo::{Line, Point, Rect};
use peniko::Color;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Nib width used when a segment arrives without one.
pub const DEFAULT_NIB: f64 = 8.0;

/// Nib thicknesses offered by the brush picker.
pub const NIB_SIZES: [f64; 3] = [2.0, 4.0, 12.0];

/// Identifier of one connected contributor (user/session).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContributorId(pub String);

impl ContributorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh id for a contributor that (re)connects.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContributorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ContributorId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Opaque key of an independent drawing page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageKey(pub u64);

impl PageKey {
    /// The page every session starts on.
    pub const INITIAL: PageKey = PageKey(0);
}

impl fmt::Display for PageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Serializable color representation (RGBA8, straight alpha).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
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

    /// The eraser "color": fully transparent black.
    pub fn is_eraser(&self) -> bool {
        *self == Self::transparent()
    }

    /// Parse `#rgb`, `#rrggbb`, `#rrggbbaa`, `black` or `white`.
    pub fn parse_hex(input: &str) -> Option<Self> {
        let input = input.trim();
        match input.to_ascii_lowercase().as_str() {
            "black" => return Some(Self::black()),
            "white" => return Some(Self::white()),
            _ => {}
        }

        let hex = input.strip_prefix('#')?;
        if !hex.is_ascii() {
            return None;
        }
        let byte = |s: &str| u8::from_str_radix(s, 16).ok();
        match hex.len() {
            3 => {
                let nibble = |i: usize| byte(&hex[i..=i]).map(|v| v * 17);
                Some(Self::new(nibble(0)?, nibble(1)?, nibble(2)?, 255))
            }
            6 => Some(Self::new(byte(&hex[0..2])?, byte(&hex[2..4])?, byte(&hex[4..6])?, 255)),
            8 => Some(Self::new(
                byte(&hex[0..2])?,
                byte(&hex[2..4])?,
                byte(&hex[4..6])?,
                byte(&hex[6..8])?,
            )),
            _ => None,
        }
    }

    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }
}

impl Default for SerializableColor {
    fn default() -> Self {
        Self::black()
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// A named entry of the color palette.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteEntry {
    pub name: String,
    pub color: SerializableColor,
}

/// The stock palette: eight inks plus the eraser.
pub fn default_palette() -> Vec<PaletteEntry> {
    [
        ("Black", SerializableColor::new(0x1A, 0x1A, 0x1A, 255)),
        ("White", SerializableColor::white()),
        ("MedGray", SerializableColor::new(0x80, 0x80, 0x80, 255)),
        ("Red", SerializableColor::new(0xF0, 0x4A, 0x3E, 255)),
        ("Orange", SerializableColor::new(0xF0, 0x91, 0x32, 255)),
        ("Yellow", SerializableColor::new(0xFF, 0xDA, 0x29, 255)),
        ("SkyBlue", SerializableColor::new(0x71, 0xD2, 0xF0, 255)),
        ("GrassGreen", SerializableColor::new(0x2B, 0xA3, 0x41, 255)),
        ("Erase", SerializableColor::transparent()),
    ]
    .into_iter()
    .map(|(name, color)| PaletteEntry {
        name: name.to_string(),
        color,
    })
    .collect()
}

/// Pixel blending rule applied when a segment is painted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompositingMode {
    /// Draw over existing content.
    #[default]
    NormalOver,
    /// Clear the pixels under the stroke path.
    EraseOut,
    /// Composite behind existing content.
    PaintUnder,
}

impl CompositingMode {
    /// Pick the mode for a brush: the transparent color erases, `under` wins over both.
    pub fn for_brush(color: SerializableColor, under: bool) -> Self {
        if under {
            CompositingMode::PaintUnder
        } else if color.is_eraser() {
            CompositingMode::EraseOut
        } else {
            CompositingMode::NormalOver
        }
    }
}

/// One straight piece of a stroke. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
    pub color: SerializableColor,
    #[serde(default = "default_nib")]
    pub width: f64,
    #[serde(default)]
    pub mode: CompositingMode,
    pub contributor: ContributorId,
}

fn default_nib() -> f64 {
    DEFAULT_NIB
}

impl Segment {
    /// Create a segment, choosing the compositing mode from the color.
    pub fn new(
        contributor: ContributorId,
        from: Point,
        to: Point,
        color: SerializableColor,
        width: f64,
    ) -> Self {
        Self {
            x0: from.x,
            y0: from.y,
            x1: to.x,
            y1: to.y,
            color,
            width,
            mode: CompositingMode::for_brush(color, false),
            contributor,
        }
    }

    /// Override the compositing mode.
    pub fn with_mode(mut self, mode: CompositingMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn start(&self) -> Point {
        Point::new(self.x0, self.y0)
    }

    pub fn end(&self) -> Point {
        Point::new(self.x1, self.y1)
    }

    pub fn line(&self) -> Line {
        Line::new(self.start(), self.end())
    }

    /// Area touched when painted, including the round caps.
    pub fn bounds(&self) -> Rect {
        let half = self.width.max(0.0) / 2.0;
        Rect::from_points(self.start(), self.end()).inflate(half, half)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!(
            SerializableColor::parse_hex("#F04A3E"),
            Some(SerializableColor::new(0xF0, 0x4A, 0x3E, 255))
        );
        assert_eq!(
            SerializableColor::parse_hex("#00000000"),
            Some(SerializableColor::transparent())
        );
        assert_eq!(
            SerializableColor::parse_hex("#fff"),
            Some(SerializableColor::white())
        );
        assert_eq!(SerializableColor::parse_hex("black"), Some(SerializableColor::black()));
        assert_eq!(SerializableColor::parse_hex("#12345"), None);
        assert_eq!(SerializableColor::parse_hex("123456"), None);
    }

    #[test]
    fn test_hex_roundtrip() {
        let color = SerializableColor::new(0x2B, 0xA3, 0x41, 255);
        assert_eq!(color.to_hex(), "#2BA341");
        assert_eq!(SerializableColor::transparent().to_hex(), "#00000000");
    }

    #[test]
    fn test_mode_for_brush() {
        let ink = SerializableColor::black();
        let eraser = SerializableColor::transparent();
        assert_eq!(CompositingMode::for_brush(ink, false), CompositingMode::NormalOver);
        assert_eq!(CompositingMode::for_brush(eraser, false), CompositingMode::EraseOut);
        assert_eq!(CompositingMode::for_brush(eraser, true), CompositingMode::PaintUnder);
        assert_eq!(CompositingMode::for_brush(ink, true), CompositingMode::PaintUnder);
    }

    #[test]
    fn test_segment_bounds_include_caps() {
        let segment = Segment::new(
            "u1".into(),
            Point::new(10.0, 10.0),
            Point::new(20.0, 10.0),
            SerializableColor::black(),
            4.0,
        );
        let bounds = segment.bounds();
        assert_eq!(bounds, Rect::new(8.0, 8.0, 22.0, 12.0));
    }

    #[test]
    fn test_segment_defaults_on_deserialize() {
        let json = r#"{"x0":0,"y0":0,"x1":1,"y1":1,"color":{"r":0,"g":0,"b":0,"a":255},"contributor":"u1"}"#;
        let segment: Segment = serde_json::from_str(json).unwrap();
        assert_eq!(segment.width, DEFAULT_NIB);
        assert_eq!(segment.mode, CompositingMode::NormalOver);
        assert_eq!(segment.contributor, ContributorId::new("u1"));
    }

    #[test]
    fn test_default_palette_ends_with_eraser() {
        let palette = default_palette();
        assert_eq!(palette.len(), 9);
        assert!(palette.last().unwrap().color.is_eraser());
    }
}
