//! Stroke controller: turns pointer gestures into render surface calls.
//!
//! Freehand gestures are rasterized one segment per move event. Shape
//! gestures draw nothing until release, then commit the whole shape in one
//! `begin_path` / primitives / `stroke` / `close_path` sequence.

use crate::geometry::Point;
use crate::shape::Shape;
use crate::style::{DrawSettings, DrawingMode};
use crate::surface::DrawTarget;
use log::debug;

/// Pointer input in canvas-local logical coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerInput {
    Down(Point),
    Move(Point),
    Up(Point),
    Leave(Point),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureState {
    Idle,
    Active {
        anchor: Point,
        mode: DrawingMode,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeController {
    state: GestureState,
}

impl Default for StrokeController {
    fn default() -> Self {
        Self::new()
    }
}

impl StrokeController {
    pub fn new() -> Self {
        Self {
            state: GestureState::Idle,
        }
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, GestureState::Active { .. })
    }

    /// Anchor of the gesture in progress.
    pub fn anchor(&self) -> Option<Point> {
        match self.state {
            GestureState::Active { anchor, .. } => Some(anchor),
            GestureState::Idle => None,
        }
    }

    /// Dispatch one pointer input. Returns whether anything was drawn or
    /// the gesture state changed.
    pub fn handle<T: DrawTarget + ?Sized>(
        &mut self,
        target: &mut T,
        input: PointerInput,
        settings: &DrawSettings,
    ) -> bool {
        match input {
            PointerInput::Down(at) => {
                self.pointer_down(target, at, settings);
                true
            }
            PointerInput::Move(at) => self.pointer_move(target, at, settings),
            PointerInput::Up(at) | PointerInput::Leave(at) => self.pointer_up(target, at, settings),
        }
    }

    /// Start a gesture at `at`. The drawing mode is fixed for its duration.
    pub fn pointer_down<T: DrawTarget + ?Sized>(
        &mut self,
        target: &mut T,
        at: Point,
        settings: &DrawSettings,
    ) {
        if self.is_active() {
            debug!("pointer down while a gesture is active, restarting it");
        }
        if settings.mode == DrawingMode::Freehand {
            target.begin_path();
            target.move_to(at);
        }
        self.state = GestureState::Active {
            anchor: at,
            mode: settings.mode,
        };
        debug!("{} gesture started at ({:.1}, {:.1})", settings.mode, at.x, at.y);
    }

    /// Returns true when a segment was rasterized.
    pub fn pointer_move<T: DrawTarget + ?Sized>(
        &mut self,
        target: &mut T,
        at: Point,
        settings: &DrawSettings,
    ) -> bool {
        let GestureState::Active { mode, .. } = self.state else {
            return false;
        };
        if mode != DrawingMode::Freehand {
            return false;
        }

        target.line_to(at);
        target.stroke(&settings.style);
        true
    }

    /// End the gesture at `at`: commit the shape, or close the freehand path.
    ///
    /// Also used for pointer-leave. Returns false when no gesture was active.
    pub fn pointer_up<T: DrawTarget + ?Sized>(
        &mut self,
        target: &mut T,
        at: Point,
        settings: &DrawSettings,
    ) -> bool {
        let GestureState::Active { anchor, mode } = self.state else {
            return false;
        };
        self.state = GestureState::Idle;

        match Shape::from_drag(mode, anchor, at) {
            None => target.close_path(),
            Some(shape) => {
                target.begin_path();
                shape.trace(target);
                target.stroke(&settings.style);
                target.close_path();
                debug!("committed {:?}", shape);
            }
        }
        true
    }

    /// Drop the gesture in progress without drawing. Used when the surface is resized.
    pub fn cancel(&mut self) {
        if self.is_active() {
            debug!("active gesture cancelled");
        }
        self.state = GestureState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{Color, StrokeStyle};
    use crate::surface::RenderSurface;
    use std::f64::consts::TAU;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        BeginPath,
        MoveTo(Point),
        LineTo(Point),
        Arc(Point, f64, f64, f64),
        Rect(Point, f64, f64),
        Stroke(StrokeStyle),
        ClosePath,
        Clear,
    }

    #[derive(Default)]
    struct Recorder {
        calls: Vec<Call>,
    }

    impl Recorder {
        fn strokes(&self) -> usize {
            self.calls
                .iter()
                .filter(|c| matches!(c, Call::Stroke(_)))
                .count()
        }
    }

    impl DrawTarget for Recorder {
        fn begin_path(&mut self) {
            self.calls.push(Call::BeginPath);
        }
        fn move_to(&mut self, point: Point) {
            self.calls.push(Call::MoveTo(point));
        }
        fn line_to(&mut self, point: Point) {
            self.calls.push(Call::LineTo(point));
        }
        fn arc(&mut self, center: Point, radius: f64, start_angle: f64, end_angle: f64) {
            self.calls
                .push(Call::Arc(center, radius, start_angle, end_angle));
        }
        fn rect(&mut self, origin: Point, width: f64, height: f64) {
            self.calls.push(Call::Rect(origin, width, height));
        }
        fn stroke(&mut self, style: &StrokeStyle) {
            self.calls.push(Call::Stroke(*style));
        }
        fn close_path(&mut self) {
            self.calls.push(Call::ClosePath);
        }
        fn clear(&mut self) {
            self.calls.push(Call::Clear);
        }
    }

    fn settings(mode: DrawingMode) -> DrawSettings {
        DrawSettings::new(mode, StrokeStyle::new(Color::BLACK, 5.0))
    }

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn freehand_strokes_once_per_move() {
        let mut target = Recorder::default();
        let mut controller = StrokeController::new();
        let s = settings(DrawingMode::Freehand);

        controller.pointer_down(&mut target, p(0.0, 0.0), &s);
        for i in 1..=7 {
            assert!(controller.pointer_move(&mut target, p(i as f64, i as f64 * 2.0), &s));
        }
        controller.pointer_up(&mut target, p(7.0, 14.0), &s);

        assert_eq!(target.strokes(), 7);
        assert_eq!(target.calls[0], Call::BeginPath);
        assert_eq!(target.calls[1], Call::MoveTo(p(0.0, 0.0)));
        assert_eq!(target.calls[2], Call::LineTo(p(1.0, 2.0)));
        assert_eq!(target.calls.last(), Some(&Call::ClosePath));
        assert!(!controller.is_active());
    }

    #[test]
    fn freehand_segments_counted_on_real_surface() {
        let mut surface = RenderSurface::with_size(200, 200, 2);
        let mut controller = StrokeController::new();
        let s = settings(DrawingMode::Freehand);

        controller.pointer_down(&mut surface, p(10.0, 10.0), &s);
        let moves = [p(20.0, 10.0), p(30.0, 15.0), p(40.0, 40.0), p(40.0, 80.0)];
        for at in moves {
            controller.pointer_move(&mut surface, at, &s);
        }
        controller.pointer_up(&mut surface, p(40.0, 80.0), &s);

        assert_eq!(surface.segments_rasterized(), moves.len() as u64);
        assert!(!surface.is_blank());
    }

    #[test]
    fn shape_modes_draw_nothing_until_release() {
        for mode in [DrawingMode::Arrow, DrawingMode::Circle, DrawingMode::Square] {
            let mut target = Recorder::default();
            let mut controller = StrokeController::new();
            let s = settings(mode);

            controller.pointer_down(&mut target, p(5.0, 5.0), &s);
            assert!(!controller.pointer_move(&mut target, p(10.0, 10.0), &s));
            assert!(!controller.pointer_move(&mut target, p(20.0, 30.0), &s));
            assert!(target.calls.is_empty(), "{mode} drew a preview");

            controller.pointer_up(&mut target, p(20.0, 30.0), &s);
            assert_eq!(target.strokes(), 1);
            assert_eq!(target.calls.first(), Some(&Call::BeginPath));
            let n = target.calls.len();
            assert!(matches!(target.calls[n - 2], Call::Stroke(_)));
            assert_eq!(target.calls[n - 1], Call::ClosePath);
        }
    }

    #[test]
    fn arrow_commit_draws_shaft_then_barbs() {
        let mut target = Recorder::default();
        let mut controller = StrokeController::new();
        let s = settings(DrawingMode::Arrow);

        controller.pointer_down(&mut target, p(0.0, 0.0), &s);
        controller.pointer_up(&mut target, p(100.0, 0.0), &s);

        let [left, right] = crate::shape::arrow_barbs(p(0.0, 0.0), p(100.0, 0.0));
        assert_eq!(
            target.calls,
            vec![
                Call::BeginPath,
                Call::MoveTo(p(0.0, 0.0)),
                Call::LineTo(p(100.0, 0.0)),
                Call::LineTo(left),
                Call::MoveTo(p(100.0, 0.0)),
                Call::LineTo(right),
                Call::Stroke(s.style),
                Call::ClosePath,
            ]
        );
    }

    #[test]
    fn circle_commit_uses_anchor_as_center() {
        let mut target = Recorder::default();
        let mut controller = StrokeController::new();
        let s = settings(DrawingMode::Circle);

        controller.pointer_down(&mut target, p(50.0, 50.0), &s);
        controller.pointer_move(&mut target, p(70.0, 70.0), &s);
        controller.pointer_up(&mut target, p(80.0, 50.0), &s);

        assert_eq!(target.calls[1], Call::Arc(p(50.0, 50.0), 30.0, 0.0, TAU));
    }

    #[test]
    fn inverted_square_renders_without_error() {
        let mut surface = RenderSurface::with_size(40, 40, 2);
        let mut controller = StrokeController::new();
        let s = settings(DrawingMode::Square);

        controller.pointer_down(&mut surface, p(30.0, 30.0), &s);
        controller.pointer_up(&mut surface, p(10.0, 10.0), &s);

        assert_eq!(surface.segments_rasterized(), 4);
        // top edge of the rectangle at logical y = 10
        assert_eq!(surface.pixel(40, 20), Some(Color::BLACK));
        assert_eq!(surface.pixel(40, 40), Some(Color::TRANSPARENT));

        let mut target = Recorder::default();
        controller.pointer_down(&mut target, p(10.0, 10.0), &s);
        controller.pointer_up(&mut target, p(-10.0, -10.0), &s);
        assert_eq!(target.calls[1], Call::Rect(p(10.0, 10.0), -20.0, -20.0));
    }

    #[test]
    fn idle_moves_and_releases_are_ignored() {
        let mut surface = RenderSurface::with_size(50, 50, 2);
        let mut controller = StrokeController::new();
        for mode in DrawingMode::ALL {
            let s = settings(mode);
            assert!(!controller.pointer_move(&mut surface, p(10.0, 10.0), &s));
            assert!(!controller.pointer_up(&mut surface, p(20.0, 20.0), &s));
            assert!(!controller.handle(&mut surface, PointerInput::Leave(p(1.0, 1.0)), &s));
            assert_eq!(controller.state(), GestureState::Idle);
        }
        assert!(surface.is_blank());
        assert_eq!(surface.segments_rasterized(), 0);
    }

    #[test]
    fn width_change_mid_gesture_only_affects_later_segments() {
        let mut surface = RenderSurface::with_size(100, 100, 2);
        let mut controller = StrokeController::new();
        let thin = DrawSettings::new(
            DrawingMode::Freehand,
            StrokeStyle::new(Color::BLACK, 2.0),
        );
        let thick = DrawSettings::new(
            DrawingMode::Freehand,
            StrokeStyle::new(Color::BLACK, 20.0),
        );

        controller.pointer_down(&mut surface, p(10.0, 20.0), &thin);
        controller.pointer_move(&mut surface, p(50.0, 20.0), &thin);
        controller.pointer_move(&mut surface, p(50.0, 80.0), &thick);
        controller.pointer_up(&mut surface, p(50.0, 80.0), &thick);

        // 8 logical px above the first segment stays empty
        assert_eq!(surface.pixel(60, 24), Some(Color::TRANSPARENT));
        // 8 logical px beside the second segment is inside the thick stroke
        assert_eq!(surface.pixel(84, 120), Some(Color::BLACK));
    }

    #[test]
    fn mode_is_latched_for_the_gesture() {
        let mut target = Recorder::default();
        let mut controller = StrokeController::new();

        controller.pointer_down(&mut target, p(0.0, 0.0), &settings(DrawingMode::Circle));
        controller.pointer_up(&mut target, p(3.0, 4.0), &settings(DrawingMode::Freehand));

        assert_eq!(target.calls[1], Call::Arc(p(0.0, 0.0), 5.0, 0.0, TAU));
    }

    #[test]
    fn leave_commits_like_release() {
        let mut target = Recorder::default();
        let mut controller = StrokeController::new();
        let s = settings(DrawingMode::Square);

        controller.handle(&mut target, PointerInput::Down(p(1.0, 1.0)), &s);
        assert!(controller.handle(&mut target, PointerInput::Leave(p(4.0, 6.0)), &s));
        assert_eq!(target.calls[1], Call::Rect(p(1.0, 1.0), 3.0, 5.0));
        assert!(!controller.is_active());
    }

    #[test]
    fn cancel_drops_gesture_without_drawing() {
        let mut target = Recorder::default();
        let mut controller = StrokeController::new();
        let s = settings(DrawingMode::Arrow);

        controller.pointer_down(&mut target, p(1.0, 1.0), &s);
        assert_eq!(controller.anchor(), Some(p(1.0, 1.0)));
        controller.cancel();
        assert!(!controller.pointer_up(&mut target, p(9.0, 9.0), &s));
        assert!(target.calls.is_empty());
        assert_eq!(controller.anchor(), None);
    }

    #[test]
    fn second_press_restarts_gesture() {
        let mut target = Recorder::default();
        let mut controller = StrokeController::new();
        let s = settings(DrawingMode::Freehand);

        controller.pointer_down(&mut target, p(1.0, 1.0), &s);
        controller.pointer_down(&mut target, p(5.0, 5.0), &s);
        assert_eq!(controller.anchor(), Some(p(5.0, 5.0)));
        assert_eq!(
            target.calls,
            vec![
                Call::BeginPath,
                Call::MoveTo(p(1.0, 1.0)),
                Call::BeginPath,
                Call::MoveTo(p(5.0, 5.0)),
            ]
        );
    }
}
