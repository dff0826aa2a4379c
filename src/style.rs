//! Stroke styling and drawing modes
//!
//! These are the values the drawing core reads on every pointer event.
//! They are owned by [`crate::controls::Controls`] and handed to the core
//! by value, so a style change only reaches strokes issued after it.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub const MIN_STROKE_WIDTH: f32 = 1.0;
pub const MAX_STROKE_WIDTH: f32 = 50.0;
pub const DEFAULT_STROKE_WIDTH: f32 = 5.0;
pub const DEFAULT_STROKE_COLOR: &str = "black";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StyleError {
    #[error("invalid color '{0}'")]
    InvalidColor(String),
}

/// What a pointer gesture produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrawingMode {
    #[default]
    Freehand,
    Arrow,
    Circle,
    Square,
}

impl DrawingMode {
    pub const ALL: [DrawingMode; 4] = [
        DrawingMode::Freehand,
        DrawingMode::Arrow,
        DrawingMode::Circle,
        DrawingMode::Square,
    ];

    pub fn label(self) -> &'static str {
        match self {
            DrawingMode::Freehand => "Freehand",
            DrawingMode::Arrow => "Arrow",
            DrawingMode::Circle => "Circle",
            DrawingMode::Square => "Square",
        }
    }
}

impl fmt::Display for DrawingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Straight (non-premultiplied) RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);
    pub const BLACK: Color = Color::rgba(0, 0, 0, 255);
    pub const WHITE: Color = Color::rgba(255, 255, 255, 255);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    /// Parse any CSS color: `black`, `#1e90ff`, `rgb(0 128 0)`, ...
    pub fn parse(value: &str) -> Result<Self, StyleError> {
        let parsed = csscolorparser::parse(value.trim())
            .map_err(|_| StyleError::InvalidColor(value.to_string()))?;
        let [r, g, b, a] = parsed.to_rgba8();
        Ok(Self { r, g, b, a })
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Color and width of a stroke, in logical units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    pub color: Color,
    pub width: f32,
}

impl StrokeStyle {
    pub const fn new(color: Color, width: f32) -> Self {
        Self { color, width }
    }
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            width: DEFAULT_STROKE_WIDTH,
        }
    }
}

/// Snapshot of the configuration the drawing core reads per event.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DrawSettings {
    pub mode: DrawingMode,
    pub style: StrokeStyle,
}

impl DrawSettings {
    pub fn new(mode: DrawingMode, style: StrokeStyle) -> Self {
        Self { mode, style }
    }
}
