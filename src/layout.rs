// filepath: src/layout.rs
//! Layout of the sidebar, the canvas and the to-do overlay.
//!
//! All rectangles are in logical pixels relative to the window surface.

use crate::controls::{ControlAction, Controls};
use crate::geometry::{Point, Rect};
use crate::style::DrawingMode;
use crate::todo::{TaskFilter, TaskId};

pub const SIDEBAR_WIDTH: u32 = 96;
pub const TODO_WIDTH: u32 = 240;
pub const MARGIN: u32 = 8;

const BUTTON_WIDTH: u32 = SIDEBAR_WIDTH - 2 * MARGIN;
const BUTTON_HEIGHT: u32 = 26;
const BUTTON_SPACING: u32 = 6;
const SWATCH_SIZE: u32 = 17;
const SWATCH_SPACING: u32 = 4;
const SWATCHES_PER_ROW: usize = 4;
const STEP_BUTTON_WIDTH: u32 = 24;

const TODO_HEADER_HEIGHT: u32 = 28;
const TODO_FILTER_HEIGHT: u32 = 22;
const TODO_ROW_HEIGHT: u32 = 24;
const CHECKBOX_SIZE: u32 = 14;
const DELETE_SIZE: u32 = 18;

/// Which part of the window a point falls in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Sidebar,
    Canvas,
    Todo,
    Outside,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Button {
    pub action: ControlAction,
    pub area: Rect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TodoRow {
    pub id: TaskId,
    pub area: Rect,
    pub checkbox: Rect,
    pub delete: Rect,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoLayout {
    pub area: Rect,
    pub header: Rect,
    pub rows: Vec<TodoRow>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub sidebar: Rect,
    pub canvas: Rect,
    /// Where the current stroke width is printed, between the -/+ buttons.
    pub width_readout: Rect,
    pub buttons: Vec<Button>,
    pub todo: Option<TodoLayout>,
}

impl Layout {
    pub fn region_at(&self, point: Point) -> Region {
        if self.todo.as_ref().is_some_and(|t| t.area.contains(point)) {
            Region::Todo
        } else if self.sidebar.contains(point) {
            Region::Sidebar
        } else if self.canvas.contains(point) {
            Region::Canvas
        } else {
            Region::Outside
        }
    }

    /// The control under `point`, if any. Overlay buttons win over the sidebar.
    pub fn hit_test(&self, point: Point) -> Option<ControlAction> {
        self.buttons
            .iter()
            .rev()
            .find(|b| b.area.contains(point))
            .map(|b| b.action)
    }

    pub fn button_for(&self, action: ControlAction) -> Option<&Button> {
        self.buttons.iter().find(|b| b.action == action)
    }
}

/// Size of the canvas for a window of the given logical size.
pub fn canvas_rect(width: u32, height: u32) -> Rect {
    let x = SIDEBAR_WIDTH + MARGIN;
    Rect::new(
        x as i32,
        MARGIN as i32,
        width.saturating_sub(x + MARGIN),
        height.saturating_sub(2 * MARGIN),
    )
}

pub fn calculate_layout(width: u32, height: u32, controls: &Controls) -> Layout {
    let sidebar = Rect::new(0, 0, SIDEBAR_WIDTH.min(width), height);
    let canvas = canvas_rect(width, height);

    let mut buttons = Vec::new();
    let x = MARGIN as i32;
    let mut y = MARGIN as i32;
    let push = |buttons: &mut Vec<Button>, action, area| buttons.push(Button { action, area });

    push(
        &mut buttons,
        ControlAction::ToggleTheme,
        Rect::new(x, y, BUTTON_WIDTH, BUTTON_HEIGHT),
    );
    y += (BUTTON_HEIGHT + BUTTON_SPACING) as i32;

    push(
        &mut buttons,
        ControlAction::WidthDown,
        Rect::new(x, y, STEP_BUTTON_WIDTH, BUTTON_HEIGHT),
    );
    push(
        &mut buttons,
        ControlAction::WidthUp,
        Rect::new(
            x + (BUTTON_WIDTH - STEP_BUTTON_WIDTH) as i32,
            y,
            STEP_BUTTON_WIDTH,
            BUTTON_HEIGHT,
        ),
    );
    let width_readout = Rect::new(
        x + STEP_BUTTON_WIDTH as i32,
        y,
        BUTTON_WIDTH - 2 * STEP_BUTTON_WIDTH,
        BUTTON_HEIGHT,
    );
    y += (BUTTON_HEIGHT + BUTTON_SPACING) as i32;

    for (index, _) in controls.palette().iter().enumerate() {
        let col = (index % SWATCHES_PER_ROW) as i32;
        let row = (index / SWATCHES_PER_ROW) as i32;
        let step = (SWATCH_SIZE + SWATCH_SPACING) as i32;
        push(
            &mut buttons,
            ControlAction::SelectColor(index),
            Rect::new(x + col * step, y + row * step, SWATCH_SIZE, SWATCH_SIZE),
        );
    }
    let swatch_rows = controls.palette().len().div_ceil(SWATCHES_PER_ROW) as i32;
    y += swatch_rows * (SWATCH_SIZE + SWATCH_SPACING) as i32 + (BUTTON_SPACING - SWATCH_SPACING) as i32;

    let mut stacked = vec![ControlAction::Reset];
    stacked.extend(DrawingMode::ALL.map(ControlAction::SelectMode));
    stacked.push(ControlAction::ToggleTodo);
    for action in stacked {
        push(&mut buttons, action, Rect::new(x, y, BUTTON_WIDTH, BUTTON_HEIGHT));
        y += (BUTTON_HEIGHT + BUTTON_SPACING) as i32;
    }

    // Quit sits at the bottom unless the window is too short for that.
    let bottom = height as i32 - (MARGIN + BUTTON_HEIGHT) as i32;
    push(
        &mut buttons,
        ControlAction::Quit,
        Rect::new(x, bottom.max(y), BUTTON_WIDTH, BUTTON_HEIGHT),
    );

    let todo = controls
        .show_todo()
        .then(|| calculate_todo_layout(canvas, controls, &mut buttons));

    Layout {
        sidebar,
        canvas,
        width_readout,
        buttons,
        todo,
    }
}

fn calculate_todo_layout(canvas: Rect, controls: &Controls, buttons: &mut Vec<Button>) -> TodoLayout {
    let width = TODO_WIDTH.min(canvas.width.saturating_sub(2 * MARGIN));
    let area = Rect::new(
        canvas.right() - (width + MARGIN) as i32,
        canvas.y + MARGIN as i32,
        width,
        canvas.height.saturating_sub(2 * MARGIN),
    );
    let inner = area.inset(MARGIN);
    let header = Rect::new(inner.x, inner.y, inner.width, TODO_HEADER_HEIGHT);

    let mut y = header.bottom();
    let filter_count = TaskFilter::ALL.len() as u32;
    let filter_width = inner.width.saturating_sub(BUTTON_SPACING * (filter_count - 1)) / filter_count;
    for (i, filter) in TaskFilter::ALL.into_iter().enumerate() {
        buttons.push(Button {
            action: ControlAction::TodoFilter(filter),
            area: Rect::new(
                inner.x + i as i32 * (filter_width + BUTTON_SPACING) as i32,
                y,
                filter_width,
                TODO_FILTER_HEIGHT,
            ),
        });
    }
    y += (TODO_FILTER_HEIGHT + BUTTON_SPACING) as i32;

    let mut rows = Vec::new();
    for task in controls.todo().visible() {
        if y + TODO_ROW_HEIGHT as i32 > inner.bottom() {
            break;
        }
        let row = Rect::new(inner.x, y, inner.width, TODO_ROW_HEIGHT);
        let checkbox = Rect::new(
            row.x,
            row.y + ((TODO_ROW_HEIGHT - CHECKBOX_SIZE) / 2) as i32,
            CHECKBOX_SIZE,
            CHECKBOX_SIZE,
        );
        let delete = Rect::new(
            row.right() - DELETE_SIZE as i32,
            row.y + ((TODO_ROW_HEIGHT - DELETE_SIZE) / 2) as i32,
            DELETE_SIZE,
            DELETE_SIZE,
        );
        buttons.push(Button {
            action: ControlAction::TodoToggle(task.id),
            area: checkbox,
        });
        buttons.push(Button {
            action: ControlAction::TodoDelete(task.id),
            area: delete,
        });
        rows.push(TodoRow {
            id: task.id,
            area: row,
            checkbox,
            delete,
        });
        y += TODO_ROW_HEIGHT as i32;
    }

    TodoLayout { area, header, rows }
}
