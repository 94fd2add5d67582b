use serde::{Serialize, Deserialize};
use std::fmt;
use std::str::FromStr;

pub use kurbo::{Affine, Point, Rect, Size, Vec2};

/// An opaque RGB color, written as `#rrggbb`.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(0xff, 0xff, 0xff);
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Color {
        Color { r, g, b }
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .strip_prefix('#')
            .ok_or_else(|| format!("color `{}` must start with '#'", s))?;
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(format!("color `{}` is not #RRGGBB", s));
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|e| e.to_string());
        Ok(Color::rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> String {
        color.to_hex()
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Debug)]
pub struct Style {
    pub stroke_color: Color,
    pub stroke_width: f64,
    pub fill_color: Option<Color>,
}

impl Style {
    pub fn stroke(color: Color, width: f64) -> Style {
        Style { stroke_color: color, stroke_width: width, fill_color: None }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug)]
#[serde(rename_all = "lowercase")]
pub enum CornerStyle {
    Sharp,
    Curved,
}

impl CornerStyle {
    pub fn tag(self) -> &'static str {
        match self {
            CornerStyle::Sharp => "s",
            CornerStyle::Curved => "r",
        }
    }

    pub fn from_tag(tag: &str) -> Option<CornerStyle> {
        match tag {
            "s" => Some(CornerStyle::Sharp),
            "r" => Some(CornerStyle::Curved),
            _ => None,
        }
    }

    pub fn xml_name(self) -> &'static str {
        match self {
            CornerStyle::Sharp => "square",
            CornerStyle::Curved => "rounded",
        }
    }

    pub fn from_xml_name(name: &str) -> Option<CornerStyle> {
        match name {
            "square" => Some(CornerStyle::Sharp),
            "rounded" => Some(CornerStyle::Curved),
            _ => None,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    Line,
    Rectangle,
}

impl FromStr for Tool {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "line" => Ok(Tool::Line),
            "rect" | "rectangle" => Ok(Tool::Rectangle),
            other => Err(format!("unknown tool `{}`", other)),
        }
    }
}

/// Builds a rectangle anchored at `a` whose size is the absolute distance to `b`.
///
/// The origin always stays at `a`, even when `b` lies above or to the left of it.
pub fn rect_from_corners(a: Point, b: Point) -> Rect {
    let x1 = if b.x >= a.x { b.x } else { a.x + (a.x - b.x) };
    let y1 = if b.y >= a.y { b.y } else { a.y + (a.y - b.y) };
    Rect::new(a.x, a.y, x1, y1)
}
