// filepath: src/config.rs
//! Configuration handling for hypr-sketch
//!
//! The configuration lives in `config.toml` under the user's config
//! directory. It seeds the drawing controls (mode, color, width, theme), the
//! color palette shown in the sidebar and the to-do list.

use crate::controls::Theme;
use crate::style::{
    Color, DrawingMode, StyleError, DEFAULT_STROKE_COLOR, DEFAULT_STROKE_WIDTH, MAX_STROKE_WIDTH,
    MIN_STROKE_WIDTH,
};
use crate::todo::TaskFilter;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error(transparent)]
    Style(#[from] StyleError),
    #[error("stroke width {0} is outside 1..=50")]
    Width(f32),
}

const DEFAULT_PALETTE: [&str; 8] = [
    "#000000", "#ffffff", "#ef4444", "#f97316", "#eab308", "#22c55e", "#3b82f6", "#a855f7",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TodoConfig {
    #[serde(default)]
    pub tasks: Vec<String>,
    #[serde(default)]
    pub filter: TaskFilter,
}

/// Configuration for the drawing window and its controls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SketchConfig {
    /// Logical surface size; when unset the surface fills the output.
    pub width: Option<u32>,
    pub height: Option<u32>,

    #[serde(default)]
    pub mode: DrawingMode,

    #[serde(default = "default_stroke_color")]
    pub stroke_color: String,

    #[serde(default = "default_stroke_width")]
    pub stroke_width: f32,

    #[serde(default)]
    pub theme: Theme,

    #[serde(default)]
    pub show_todo: bool,

    #[serde(default = "default_palette")]
    pub palette: Vec<String>,

    /// TrueType/OpenType font used for labels.
    pub font_path: Option<PathBuf>,

    #[serde(default)]
    pub todo: TodoConfig,
}

fn default_stroke_color() -> String {
    DEFAULT_STROKE_COLOR.to_string()
}

fn default_stroke_width() -> f32 {
    DEFAULT_STROKE_WIDTH
}

fn default_palette() -> Vec<String> {
    DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect()
}

impl Default for SketchConfig {
    fn default() -> Self {
        Self {
            width: None,
            height: None,
            mode: DrawingMode::default(),
            stroke_color: default_stroke_color(),
            stroke_width: default_stroke_width(),
            theme: Theme::default(),
            show_todo: false,
            palette: default_palette(),
            font_path: None,
            todo: TodoConfig::default(),
        }
    }
}

impl SketchConfig {
    /// Get the path to the configuration file
    pub fn get_config_path() -> PathBuf {
        let config_dir = if let Some(config_dir) = dirs::config_dir() {
            config_dir.join("hypr-sketch")
        } else {
            PathBuf::from(".config/hypr-sketch")
        };

        config_dir.join("config.toml")
    }

    /// Load configuration from the default location, writing defaults if it does not exist
    pub fn load_from_file() -> Result<Self, ConfigError> {
        Self::load_from_path(&Self::get_config_path())
    }

    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(content) => {
                let config: Self = toml::from_str(&content)?;
                config.validate()?;
                Ok(config)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::info!("No configuration at {}, writing defaults", path.display());
                let default_config = Self::default();
                default_config.save_to_path(path)?;
                Ok(default_config)
            }
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn save_to_path(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };

        // Create the directory if it doesn't exist
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).map_err(io_err)?;
        Ok(())
    }

    /// Reject values the drawing core must never see.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Color::parse(&self.stroke_color)?;
        if !(MIN_STROKE_WIDTH..=MAX_STROKE_WIDTH).contains(&self.stroke_width) {
            return Err(ConfigError::Width(self.stroke_width));
        }
        for color in &self.palette {
            Color::parse(color)?;
        }
        Ok(())
    }

    /// Fixed surface size, if both dimensions are configured.
    pub fn fixed_size(&self) -> Option<(u32, u32)> {
        match (self.width, self.height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => Some((w, h)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_created_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = SketchConfig::load_from_path(&path).unwrap();
        assert_eq!(config, SketchConfig::default());
        assert!(path.exists());

        let reloaded = SketchConfig::load_from_path(&path).unwrap();
        assert_eq!(reloaded, config);
    }

    #[test]
    fn partial_file_takes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r##"
mode = "circle"
stroke_color = "#ff8800"
theme = "dark"

[todo]
tasks = ["sketch layout", "review"]
"##,
        )
        .unwrap();

        let config = SketchConfig::load_from_path(&path).unwrap();
        assert_eq!(config.mode, DrawingMode::Circle);
        assert_eq!(config.stroke_color, "#ff8800");
        assert_eq!(config.stroke_width, DEFAULT_STROKE_WIDTH);
        assert_eq!(config.theme, Theme::Dark);
        assert_eq!(config.palette.len(), DEFAULT_PALETTE.len());
        assert_eq!(config.todo.tasks, vec!["sketch layout", "review"]);
        assert_eq!(config.fixed_size(), None);
    }

    #[test]
    fn round_trips_through_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let config = SketchConfig {
            width: Some(800),
            height: Some(600),
            mode: DrawingMode::Arrow,
            stroke_width: 12.0,
            show_todo: true,
            font_path: Some(PathBuf::from("/tmp/font.ttf")),
            ..SketchConfig::default()
        };
        config.save_to_path(&path).unwrap();

        let loaded = SketchConfig::load_from_path(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.fixed_size(), Some((800, 600)));
    }

    #[test]
    fn rejects_out_of_range_width() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "stroke_width = 80.0\n").unwrap();
        assert!(matches!(
            SketchConfig::load_from_path(&path),
            Err(ConfigError::Width(w)) if w == 80.0
        ));
    }

    #[test]
    fn rejects_bad_colors_and_modes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        fs::write(&path, "stroke_color = \"blurple\"\n").unwrap();
        assert!(matches!(
            SketchConfig::load_from_path(&path),
            Err(ConfigError::Style(StyleError::InvalidColor(_)))
        ));

        fs::write(&path, "mode = \"spiral\"\n").unwrap();
        assert!(matches!(
            SketchConfig::load_from_path(&path),
            Err(ConfigError::Parse(_))
        ));
    }
}
