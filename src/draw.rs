// filepath: src/draw.rs
//! Drawing utilities for hypr-sketch
//!
//! This file composes a full window frame: theme background, the sidebar
//! controls, the drawing canvas with its border and the optional to-do
//! overlay. Frames are built in RGBA and converted to the Wayland
//! `Argb8888` layout at the end.

use crate::controls::{ControlAction, Controls, Theme};
use crate::geometry::{Point, Rect};
use crate::layout::{Layout, TodoLayout};
use crate::raster::blend_pixel;
use crate::stroke::{PointerInput, StrokeController};
use crate::style::{Color, DrawSettings, DrawingMode, StrokeStyle};
use crate::surface::RenderSurface;
use crate::text::TextRenderer;
use std::collections::HashMap;

const BLUE: Color = Color::rgb(59, 130, 246);
const GREEN: Color = Color::rgb(34, 197, 94);
const RED: Color = Color::rgb(239, 68, 68);
const PURPLE: Color = Color::rgb(168, 85, 247);
const MUTED: Color = Color::rgb(107, 114, 128);

const LABEL_SIZE: f32 = 11.0;
const HEADER_SIZE: f32 = 16.0;
const CORNER_RADIUS: u32 = 4;
const ICON_SIZE: u32 = 18;

/// Canvas abstraction over an RGBA frame in device pixels.
///
/// Drawing methods take logical rectangles and scale them by `scale`.
pub struct Canvas<'a> {
    buffer: &'a mut [u8],
    width: u32,
    height: u32,
    scale: u32,
}

impl<'a> Canvas<'a> {
    /// Create a new canvas from a raw RGBA buffer of `width * height` device pixels
    pub fn new(buffer: &'a mut [u8], width: u32, height: u32, scale: u32) -> Self {
        Self {
            buffer,
            width,
            height,
            scale: scale.max(1),
        }
    }

    /// Get the width of the canvas in device pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Get the height of the canvas in device pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// Pixel at device coordinates.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y * self.width + x) * 4) as usize;
        let px = self.buffer.get(idx..idx + 4)?;
        Some(Color::rgba(px[0], px[1], px[2], px[3]))
    }

    fn to_device(&self, rect: Rect) -> Rect {
        let s = self.scale;
        Rect::new(rect.x * s as i32, rect.y * s as i32, rect.width * s, rect.height * s)
    }

    fn blend_at(&mut self, x: i32, y: i32, color: Color) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        if let Some(px) = self.buffer.get_mut(idx..idx + 4) {
            blend_pixel(px, color);
        }
    }

    pub fn fill(&mut self, color: Color) {
        crate::raster::fill_pixels(self.buffer, color);
    }

    /// Draw a filled rectangle
    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.fill_rounded_rect(rect, 0, color);
    }

    /// Draw a filled rectangle with rounded corners (radius in logical pixels)
    pub fn fill_rounded_rect(&mut self, rect: Rect, corner_radius: u32, color: Color) {
        let device = self.to_device(rect);
        let radius = (corner_radius * self.scale).min(device.width / 2).min(device.height / 2) as i32;

        // Ensure the rectangle is within bounds
        let x_start = device.x.max(0);
        let y_start = device.y.max(0);
        let x_end = device.right().min(self.width as i32);
        let y_end = device.bottom().min(self.height as i32);

        if x_end <= x_start || y_end <= y_start {
            return; // Nothing to draw
        }

        for y in y_start..y_end {
            for x in x_start..x_end {
                if radius > 0 && outside_rounded_corner(x - device.x, y - device.y, device, radius) {
                    continue;
                }
                self.blend_at(x, y, color);
            }
        }
    }

    /// Draw a rectangle border of `thickness` logical pixels, inside `rect`.
    pub fn outline_rect(&mut self, rect: Rect, thickness: u32, color: Color) {
        let t = thickness.min(rect.width / 2).min(rect.height / 2).max(1);
        let inner_h = rect.height.saturating_sub(2 * t);
        self.fill_rect(Rect::new(rect.x, rect.y, rect.width, t), color);
        self.fill_rect(Rect::new(rect.x, rect.bottom() - t as i32, rect.width, t), color);
        self.fill_rect(Rect::new(rect.x, rect.y + t as i32, t, inner_h), color);
        self.fill_rect(
            Rect::new(rect.right() - t as i32, rect.y + t as i32, t, inner_h),
            color,
        );
    }

    /// Composite a render surface's pixels with its top-left at `origin`.
    pub fn blit_surface(&mut self, surface: &RenderSurface, origin: Point) {
        let (src_width, src_height) = surface.buffer_size();
        let pixels = surface.pixels();
        let dx = (origin.x * self.scale as f64).round() as i32;
        let dy = (origin.y * self.scale as f64).round() as i32;

        for sy in 0..src_height {
            let y = dy + sy as i32;
            if y < 0 || y >= self.height as i32 {
                continue;
            }
            for sx in 0..src_width {
                let idx = ((sy * src_width + sx) * 4) as usize;
                let a = pixels[idx + 3];
                if a == 0 {
                    continue;
                }
                let color = Color::rgba(pixels[idx], pixels[idx + 1], pixels[idx + 2], a);
                self.blend_at(dx + sx as i32, y, color);
            }
        }
    }

    /// Draw text with its line box starting at `origin` (logical).
    pub fn draw_text(
        &mut self,
        text: &mut TextRenderer,
        origin: Point,
        label: &str,
        size: f32,
        color: Color,
    ) {
        let scale = self.scale as f64;
        let origin = (
            (origin.x * scale).round() as i32,
            (origin.y * scale).round() as i32,
        );
        text.layout_line(label, size * self.scale as f32, origin, |x, y, coverage| {
            let alpha = (color.a as u32 * coverage as u32 / 255) as u8;
            self.blend_at(x, y, Color { a: alpha, ..color });
        });
    }

    /// Draw text centered in `rect`.
    pub fn draw_text_centered(
        &mut self,
        text: &mut TextRenderer,
        rect: Rect,
        label: &str,
        size: f32,
        color: Color,
    ) {
        let width = text.measure(label, size);
        let x = rect.x as f64 + (rect.width as f64 - width as f64) / 2.0;
        let y = rect.y as f64 + (rect.height as f64 - size as f64 * 1.2) / 2.0;
        self.draw_text(text, Point::new(x, y), label, size, color);
    }
}

/// Whether local pixel `(x, y)` lies in a cut-off corner of `rect`.
fn outside_rounded_corner(x: i32, y: i32, rect: Rect, radius: i32) -> bool {
    let w = rect.width as i32;
    let h = rect.height as i32;
    let cx = if x < radius {
        radius
    } else if x >= w - radius {
        w - radius - 1
    } else {
        return false;
    };
    let cy = if y < radius {
        radius
    } else if y >= h - radius {
        h - radius - 1
    } else {
        return false;
    };
    let dx = x - cx;
    let dy = y - cy;
    dx * dx + dy * dy > radius * radius
}

/// Render a small preview of what a mode draws by replaying a gesture.
pub fn mode_icon(mode: DrawingMode, size: u32, scale: u32, color: Color) -> RenderSurface {
    let mut icon = RenderSurface::with_size(size, size, scale);
    let settings = DrawSettings::new(mode, StrokeStyle::new(color, 1.5));
    let s = size as f64;
    let inset = 3.0;

    let gesture: Vec<PointerInput> = match mode {
        DrawingMode::Freehand => {
            let mut inputs = vec![PointerInput::Down(Point::new(inset, s * 0.6))];
            for step in 1..=6 {
                let x = inset + (s - 2.0 * inset) * step as f64 / 6.0;
                let y = if step % 2 == 0 { s * 0.6 } else { s * 0.35 };
                inputs.push(PointerInput::Move(Point::new(x, y)));
            }
            inputs.push(PointerInput::Up(Point::new(s - inset, s * 0.6)));
            inputs
        }
        DrawingMode::Arrow => vec![
            PointerInput::Down(Point::new(inset, s - inset)),
            PointerInput::Up(Point::new(s - inset, inset)),
        ],
        DrawingMode::Circle => vec![
            PointerInput::Down(Point::new(s / 2.0, s / 2.0)),
            PointerInput::Up(Point::new(s - inset, s / 2.0)),
        ],
        DrawingMode::Square => vec![
            PointerInput::Down(Point::new(inset, inset)),
            PointerInput::Up(Point::new(s - inset, s - inset)),
        ],
    };

    let mut controller = StrokeController::new();
    for input in gesture {
        controller.handle(&mut icon, input, &settings);
    }
    icon
}

/// Mode icons already rendered, keyed by everything that changes their pixels.
#[derive(Debug, Default)]
pub struct IconCache {
    icons: HashMap<(DrawingMode, u32, u32, Color), RenderSurface>,
}

impl IconCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&mut self, mode: DrawingMode, size: u32, scale: u32, color: Color) -> &RenderSurface {
        self.icons
            .entry((mode, size, scale, color))
            .or_insert_with(|| mode_icon(mode, size, scale, color))
    }

    pub fn len(&self) -> usize {
        self.icons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.icons.is_empty()
    }
}

fn button_style(action: ControlAction, controls: &Controls) -> (Color, Color) {
    let theme = controls.theme();
    let idle = (theme.button(), theme.foreground());
    match action {
        ControlAction::ToggleTheme => (BLUE, Color::WHITE),
        ControlAction::Reset => (RED, Color::WHITE),
        ControlAction::ToggleTodo => (PURPLE, Color::WHITE),
        ControlAction::SelectMode(mode) if mode == controls.mode() => (GREEN, Color::WHITE),
        ControlAction::TodoFilter(filter) if filter == controls.todo().filter() => {
            (BLUE, Color::WHITE)
        }
        ControlAction::TodoDelete(_) => (RED, Color::WHITE),
        _ => idle,
    }
}

fn button_label(action: ControlAction, controls: &Controls) -> Option<String> {
    match action {
        ControlAction::ToggleTheme => Some(controls.theme().switch_label().to_string()),
        ControlAction::WidthDown => Some("-".into()),
        ControlAction::WidthUp => Some("+".into()),
        ControlAction::Reset => Some("Reset".into()),
        ControlAction::SelectMode(mode) => Some(mode.label().to_string()),
        ControlAction::ToggleTodo => Some(if controls.show_todo() { "Hide To-Do" } else { "Show To-Do" }.into()),
        ControlAction::Quit => Some("Quit".into()),
        ControlAction::TodoFilter(filter) => Some(filter.label().to_string()),
        ControlAction::TodoDelete(_) => Some("x".into()),
        ControlAction::SelectColor(_) | ControlAction::TodoToggle(_) => None,
    }
}

/// Draw one complete frame into `canvas`.
pub fn compose_frame(
    canvas: &mut Canvas,
    layout: &Layout,
    controls: &Controls,
    surface: &RenderSurface,
    icons: &mut IconCache,
    mut text: Option<&mut TextRenderer>,
) {
    let theme = controls.theme();
    canvas.fill(theme.background());
    canvas.fill_rect(layout.sidebar, theme.panel_background());

    // Drawing canvas and its border
    canvas.blit_surface(surface, layout.canvas.origin());
    canvas.outline_rect(layout.canvas, 1, theme.foreground());

    for button in &layout.buttons {
        if matches!(button.action, ControlAction::TodoToggle(_)) {
            continue; // drawn with their rows
        }
        if let ControlAction::SelectColor(index) = button.action {
            draw_swatch(canvas, button.area, controls, index);
            continue;
        }
        if let Some(todo) = &layout.todo {
            // overlay buttons are drawn after the overlay background
            if todo.area.contains(button.area.origin()) {
                continue;
            }
        }
        draw_button(canvas, button.area, button.action, controls, icons, text.as_deref_mut());
    }

    if let Some(text) = text.as_deref_mut() {
        let width = format!("{}", controls.width().round() as u32);
        canvas.draw_text_centered(text, layout.width_readout, &width, LABEL_SIZE, theme.foreground());
    }

    if let Some(todo) = &layout.todo {
        draw_todo(canvas, todo, layout, controls, icons, text);
    }
}

fn draw_button(
    canvas: &mut Canvas,
    area: Rect,
    action: ControlAction,
    controls: &Controls,
    icons: &mut IconCache,
    text: Option<&mut TextRenderer>,
) {
    let (fill, ink) = button_style(action, controls);
    canvas.fill_rounded_rect(area, CORNER_RADIUS, fill);

    let mut label_area = area;
    if let ControlAction::SelectMode(mode) = action {
        let icon = icons.get(mode, ICON_SIZE, canvas.scale(), ink);
        let offset = (area.height.saturating_sub(ICON_SIZE) / 2) as f64;
        canvas.blit_surface(icon, area.origin().offset(offset, offset));
        let taken = ICON_SIZE + 2 * offset as u32;
        label_area = Rect::new(area.x + taken as i32, area.y, area.width.saturating_sub(taken), area.height);
    }

    if let (Some(text), Some(label)) = (text, button_label(action, controls)) {
        canvas.draw_text_centered(text, label_area, &label, LABEL_SIZE, ink);
    }
}

fn draw_swatch(canvas: &mut Canvas, area: Rect, controls: &Controls, index: usize) {
    let Some(&color) = controls.palette().get(index) else {
        return;
    };
    canvas.fill_rect(area, color);
    if color == controls.color() {
        canvas.outline_rect(area, 2, GREEN);
    } else {
        canvas.outline_rect(area, 1, controls.theme().foreground());
    }
}

fn draw_todo(
    canvas: &mut Canvas,
    todo: &TodoLayout,
    layout: &Layout,
    controls: &Controls,
    icons: &mut IconCache,
    mut text: Option<&mut TextRenderer>,
) {
    let theme = controls.theme();
    canvas.fill_rounded_rect(todo.area, CORNER_RADIUS, theme.panel_background());
    canvas.outline_rect(todo.area, 1, theme.button());

    if let Some(text) = text.as_deref_mut() {
        canvas.draw_text(text, todo.header.origin(), "To-Do List", HEADER_SIZE, theme.foreground());
    }

    for button in &layout.buttons {
        if matches!(button.action, ControlAction::TodoFilter(_)) {
            draw_button(canvas, button.area, button.action, controls, icons, text.as_deref_mut());
        }
    }

    for row in &todo.rows {
        let Some(task) = controls.todo().tasks().iter().find(|t| t.id == row.id) else {
            continue;
        };
        canvas.fill_rect(row.checkbox, Color::WHITE);
        canvas.outline_rect(row.checkbox, 1, theme_ink(theme));
        if task.completed {
            canvas.fill_rect(row.checkbox.inset(3), GREEN);
        }

        let ink = if task.completed { MUTED } else { theme.foreground() };
        let text_x = row.checkbox.right() + 8;
        let text_area = Rect::new(
            text_x,
            row.area.y,
            (row.delete.x - text_x - 4).max(0) as u32,
            row.area.height,
        );
        if let Some(text) = text.as_deref_mut() {
            let y = text_area.y as f64 + (text_area.height as f64 - LABEL_SIZE as f64 * 1.2) / 2.0;
            canvas.draw_text(text, Point::new(text_area.x as f64, y), &task.text, LABEL_SIZE, ink);
            if task.completed {
                let width = (text.measure(&task.text, LABEL_SIZE).ceil() as u32).min(text_area.width);
                let mid = text_area.y + text_area.height as i32 / 2;
                canvas.fill_rect(Rect::new(text_area.x, mid, width, 1), ink);
            }
        }

        draw_button(
            canvas,
            row.delete,
            ControlAction::TodoDelete(row.id),
            controls,
            icons,
            text.as_deref_mut(),
        );
    }
}

fn theme_ink(theme: Theme) -> Color {
    match theme {
        Theme::Light => MUTED,
        Theme::Dark => Color::WHITE,
    }
}

/// Convert RGBA bytes into little-endian `Argb8888` (B, G, R, A in memory).
pub fn rgba_to_argb8888(rgba: &[u8], out: &mut [u8]) {
    for (src, dst) in rgba.chunks_exact(4).zip(out.chunks_exact_mut(4)) {
        dst[0] = src[2];
        dst[1] = src[1];
        dst[2] = src[0];
        dst[3] = src[3];
    }
}
