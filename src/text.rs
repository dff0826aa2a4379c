//! Label rendering with fontdue.

use fontdue::{Font, FontSettings, Metrics};
use log::{info, warn};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Fonts tried when the configuration does not name one.
const FALLBACK_FONTS: &[&str] = &[
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FontError {
    #[error("invalid font data: {0}")]
    Invalid(&'static str),
}

/// A rasterized glyph: coverage bitmap plus placement metrics.
struct Glyph {
    metrics: Metrics,
    coverage: Vec<u8>,
}

pub struct TextRenderer {
    font: Font,
    glyphs: HashMap<(char, u32), Glyph>,
}

impl TextRenderer {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, FontError> {
        let font = Font::from_bytes(bytes, FontSettings::default()).map_err(FontError::Invalid)?;
        Ok(Self {
            font,
            glyphs: HashMap::new(),
        })
    }

    /// Load the configured font, or the first fallback that exists.
    pub fn load(configured: Option<&Path>) -> Option<Self> {
        let candidates = configured
            .map(Path::to_path_buf)
            .into_iter()
            .chain(FALLBACK_FONTS.iter().map(PathBuf::from));

        for path in candidates {
            let bytes = match fs::read(&path) {
                Ok(bytes) => bytes,
                Err(_) => continue,
            };
            match Self::from_bytes(bytes) {
                Ok(renderer) => {
                    info!("Using font {}", path.display());
                    return Some(renderer);
                }
                Err(e) => warn!("Could not load font {}: {}", path.display(), e),
            }
        }
        warn!("No usable font found, labels will not be drawn");
        None
    }

    fn glyph(&mut self, ch: char, px: f32) -> &Glyph {
        let font = &self.font;
        self.glyphs
            .entry((ch, px.to_bits()))
            .or_insert_with(|| {
                let (metrics, coverage) = font.rasterize(ch, px);
                Glyph { metrics, coverage }
            })
    }

    /// Width of `text` in pixels at size `px`.
    pub fn measure(&mut self, text: &str, px: f32) -> f32 {
        text.chars().map(|ch| self.glyph(ch, px).metrics.advance_width).sum()
    }

    /// Distance from the top of a line to its baseline.
    pub fn ascent(&self, px: f32) -> f32 {
        self.font
            .horizontal_line_metrics(px)
            .map(|m| m.ascent)
            .unwrap_or(px * 0.8)
    }

    /// Visit every covered pixel of `text` laid out on one line.
    ///
    /// `origin` is the top-left corner of the line box; the callback gets
    /// pixel coordinates and coverage in `1..=255`.
    pub fn layout_line<F>(&mut self, text: &str, px: f32, origin: (i32, i32), mut plot: F)
    where
        F: FnMut(i32, i32, u8),
    {
        let baseline = origin.1 + self.ascent(px).round() as i32;
        let mut pen_x = origin.0 as f32;
        for ch in text.chars() {
            let glyph = self.glyph(ch, px);
            let m = glyph.metrics;
            let left = pen_x.round() as i32 + m.xmin;
            let top = baseline - (m.height as i32 + m.ymin);
            for row in 0..m.height {
                for col in 0..m.width {
                    let coverage = glyph.coverage[row * m.width + col];
                    if coverage > 0 {
                        plot(left + col as i32, top + row as i32, coverage);
                    }
                }
            }
            pen_x += m.advance_width;
        }
    }
}
