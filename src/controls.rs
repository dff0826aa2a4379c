//! Drawing controls: the settings the drawing core reads, plus theme,
//! palette and to-do state.
//!
//! Values are validated here so the core can treat every input as valid.

use crate::config::SketchConfig;
use crate::style::{
    Color, DrawSettings, DrawingMode, StrokeStyle, StyleError, MAX_STROKE_WIDTH, MIN_STROKE_WIDTH,
};
use crate::todo::{TaskFilter, TaskId, TodoList};
use log::{info, warn};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn background(self) -> Color {
        match self {
            Theme::Light => Color::WHITE,
            Theme::Dark => Color::rgb(31, 41, 55),
        }
    }

    /// Text and canvas border color.
    pub fn foreground(self) -> Color {
        match self {
            Theme::Light => Color::BLACK,
            Theme::Dark => Color::WHITE,
        }
    }

    pub fn panel_background(self) -> Color {
        match self {
            Theme::Light => Color::rgb(243, 244, 246),
            Theme::Dark => Color::rgb(17, 24, 39),
        }
    }

    pub fn button(self) -> Color {
        match self {
            Theme::Light => Color::rgb(209, 213, 219),
            Theme::Dark => Color::rgb(75, 85, 99),
        }
    }

    /// Label of the button that switches away from this theme.
    pub fn switch_label(self) -> &'static str {
        match self {
            Theme::Light => "Dark",
            Theme::Dark => "Light",
        }
    }
}

/// Something the user clicked in the sidebar or the to-do overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAction {
    ToggleTheme,
    WidthDown,
    WidthUp,
    SelectColor(usize),
    Reset,
    SelectMode(DrawingMode),
    ToggleTodo,
    Quit,
    TodoFilter(TaskFilter),
    TodoToggle(TaskId),
    TodoDelete(TaskId),
}

/// Work the controls ask the rest of the application to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    ClearSurface,
    Quit,
}

#[derive(Debug, Clone)]
pub struct Controls {
    mode: DrawingMode,
    color: Color,
    width: f32,
    theme: Theme,
    palette: Vec<Color>,
    show_todo: bool,
    todo: TodoList,
}

impl Default for Controls {
    fn default() -> Self {
        Self::from_config(&SketchConfig::default())
    }
}

impl Controls {
    /// Build controls from configuration, falling back to defaults for bad values.
    pub fn from_config(config: &SketchConfig) -> Self {
        let color = Color::parse(&config.stroke_color).unwrap_or_else(|e| {
            warn!("{e}, using black");
            Color::BLACK
        });
        let palette = config
            .palette
            .iter()
            .filter_map(|c| match Color::parse(c) {
                Ok(color) => Some(color),
                Err(e) => {
                    warn!("Skipping palette entry: {e}");
                    None
                }
            })
            .collect();

        let mut todo = TodoList::from_texts(&config.todo.tasks);
        todo.set_filter(config.todo.filter);

        Self {
            mode: config.mode,
            color,
            width: clamp_width(config.stroke_width).unwrap_or(crate::style::DEFAULT_STROKE_WIDTH),
            theme: config.theme,
            palette,
            show_todo: config.show_todo,
            todo,
        }
    }

    /// Current values for the drawing core.
    pub fn settings(&self) -> DrawSettings {
        DrawSettings::new(self.mode, self.style())
    }

    pub fn style(&self) -> StrokeStyle {
        StrokeStyle::new(self.color, self.width)
    }

    pub fn mode(&self) -> DrawingMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: DrawingMode) {
        if self.mode != mode {
            info!("Drawing mode: {}", mode);
        }
        self.mode = mode;
    }

    pub fn color(&self) -> Color {
        self.color
    }

    /// Set the stroke color from a CSS color string.
    pub fn set_color(&mut self, value: &str) -> Result<(), StyleError> {
        self.color = Color::parse(value)?;
        Ok(())
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    /// Set the stroke width, clamped into 1..=50. NaN is ignored.
    pub fn set_width(&mut self, width: f32) {
        if let Some(width) = clamp_width(width) {
            self.width = width;
        }
    }

    pub fn adjust_width(&mut self, delta: f32) {
        self.set_width(self.width + delta);
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
    }

    pub fn show_todo(&self) -> bool {
        self.show_todo
    }

    pub fn toggle_todo(&mut self) {
        self.show_todo = !self.show_todo;
    }

    pub fn palette(&self) -> &[Color] {
        &self.palette
    }

    pub fn todo(&self) -> &TodoList {
        &self.todo
    }

    /// Apply a clicked control. Returns the command it implies, if any.
    pub fn apply(&mut self, action: ControlAction) -> Option<Command> {
        match action {
            ControlAction::ToggleTheme => self.toggle_theme(),
            ControlAction::WidthDown => self.adjust_width(-1.0),
            ControlAction::WidthUp => self.adjust_width(1.0),
            ControlAction::SelectColor(index) => match self.palette.get(index) {
                Some(&color) => self.color = color,
                None => warn!("No palette entry {}", index),
            },
            ControlAction::Reset => return Some(Command::ClearSurface),
            ControlAction::SelectMode(mode) => self.set_mode(mode),
            ControlAction::ToggleTodo => self.toggle_todo(),
            ControlAction::Quit => return Some(Command::Quit),
            ControlAction::TodoFilter(filter) => self.todo.set_filter(filter),
            ControlAction::TodoToggle(id) => {
                self.todo.toggle(id);
            }
            ControlAction::TodoDelete(id) => {
                self.todo.delete(id);
            }
        }
        None
    }
}

fn clamp_width(width: f32) -> Option<f32> {
    if width.is_nan() {
        None
    } else {
        Some(width.clamp(MIN_STROKE_WIDTH, MAX_STROKE_WIDTH))
    }
}
