use serde::{Serialize, Deserialize};

use crate::error::Result;
use crate::types::{Color, Style, Vec2};

/// Editor defaults. Every field is optional in JSON.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct EditorConfig {
    pub stroke_color: Color,
    pub stroke_width: f64,
    pub preview_color: Color,
    pub preview_stroke_width: f64,
    pub copy_offset: Vec2,
    /// Radius used to paint and hit-test curved rectangles.
    pub corner_radius: f64,
    /// Slack around lines and rectangle edges when hit-testing.
    pub hit_tolerance: f64,
    /// Spaces per nesting level in the text format.
    pub text_indent: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        EditorConfig {
            stroke_color: Color::WHITE,
            stroke_width: 4.0,
            preview_color: Color::WHITE,
            preview_stroke_width: 2.0,
            copy_offset: Vec2::new(20.0, 20.0),
            corner_radius: 50.0,
            hit_tolerance: 4.0,
            text_indent: 0,
        }
    }
}

impl EditorConfig {
    pub fn from_json(json: &str) -> Result<EditorConfig> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn shape_style(&self) -> Style {
        Style::stroke(self.stroke_color, self.stroke_width)
    }

    pub fn preview_style(&self) -> Style {
        Style::stroke(self.preview_color, self.preview_stroke_width)
    }
}
