//! Shape geometry committed at the end of a gesture.

use crate::geometry::Point;
use crate::style::DrawingMode;
use crate::surface::DrawTarget;
use std::f64::consts::{PI, TAU};

/// Arrowhead barb length in logical units.
pub const ARROW_HEAD_LENGTH: f64 = 10.0;

/// Angle between the shaft and each barb.
pub const ARROW_HEAD_ANGLE: f64 = PI / 6.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Arrow { from: Point, to: Point },
    Circle { center: Point, radius: f64 },
    /// `width`/`height` may be negative; the rectangle then extends left/up.
    Rectangle { origin: Point, width: f64, height: f64 },
}

impl Shape {
    /// The shape a drag from `anchor` to `end` produces, `None` for freehand.
    pub fn from_drag(mode: DrawingMode, anchor: Point, end: Point) -> Option<Shape> {
        match mode {
            DrawingMode::Freehand => None,
            DrawingMode::Arrow => Some(Shape::Arrow {
                from: anchor,
                to: end,
            }),
            DrawingMode::Circle => Some(Shape::Circle {
                center: anchor,
                radius: anchor.distance_to(end),
            }),
            DrawingMode::Square => Some(Shape::Rectangle {
                origin: anchor,
                width: end.x - anchor.x,
                height: end.y - anchor.y,
            }),
        }
    }

    /// Append this shape's primitives to the target's current path.
    pub fn trace<T: DrawTarget + ?Sized>(&self, target: &mut T) {
        match *self {
            Shape::Arrow { from, to } => {
                let [left, right] = arrow_barbs(from, to);
                target.move_to(from);
                target.line_to(to);
                target.line_to(left);
                target.move_to(to);
                target.line_to(right);
            }
            Shape::Circle { center, radius } => target.arc(center, radius, 0.0, TAU),
            Shape::Rectangle {
                origin,
                width,
                height,
            } => target.rect(origin, width, height),
        }
    }
}

/// End points of the two arrowhead barbs, both starting at `to`.
///
/// Each barb points back along the shaft, rotated by ±30° from it.
pub fn arrow_barbs(from: Point, to: Point) -> [Point; 2] {
    let angle = (to.y - from.y).atan2(to.x - from.x);
    let barb = |offset: f64| {
        Point::new(
            to.x - ARROW_HEAD_LENGTH * (angle + offset).cos(),
            to.y - ARROW_HEAD_LENGTH * (angle + offset).sin(),
        )
    };
    [barb(-ARROW_HEAD_ANGLE), barb(ARROW_HEAD_ANGLE)]
}
