// filepath: src/pointer.rs
//! Pointer (mouse) event handling for hypr-sketch
//!
//! Window-level pointer events are routed to one of three places: the
//! stroke controller (canvas-local coordinates), a sidebar/overlay control,
//! or the stroke width (scroll wheel over the canvas).

use hypr_sketch::controls::ControlAction;
use hypr_sketch::geometry::Point;
use hypr_sketch::layout::{Layout, Region};
use hypr_sketch::stroke::PointerInput;
use log::{debug, trace};
use smithay_client_toolkit::seat::pointer::{PointerEvent, PointerEventKind};

/// Linux input code of the primary mouse button.
pub const BTN_LEFT: u32 = 0x110;

/// Pointer event in window-local logical coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WindowPointer {
    Enter(Point),
    Motion(Point),
    Press(Point),
    Release(Point),
    Leave,
    /// Vertical scroll; negative values scroll up.
    Scroll(Point, f64),
}

impl WindowPointer {
    /// Translate a toolkit pointer event. Buttons other than the left one are dropped.
    pub fn from_event(event: &PointerEvent) -> Option<Self> {
        let position = Point::from(event.position);
        match event.kind {
            PointerEventKind::Enter { .. } => Some(Self::Enter(position)),
            PointerEventKind::Leave { .. } => Some(Self::Leave),
            PointerEventKind::Motion { .. } => Some(Self::Motion(position)),
            PointerEventKind::Press { button, .. } if button == BTN_LEFT => {
                Some(Self::Press(position))
            }
            PointerEventKind::Release { button, .. } if button == BTN_LEFT => {
                Some(Self::Release(position))
            }
            PointerEventKind::Axis { vertical, .. } => {
                let amount = if vertical.discrete != 0 {
                    vertical.discrete as f64
                } else {
                    vertical.absolute
                };
                (amount != 0.0).then_some(Self::Scroll(position, amount))
            }
            _ => None,
        }
    }
}

/// Where a pointer event should go.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Routed {
    Stroke(PointerInput),
    Control(ControlAction),
    Width(f32),
}

#[derive(Debug, Default)]
pub struct PointerRouter {
    inside_canvas: bool,
    /// Last canvas-local position seen inside the canvas.
    last: Option<Point>,
}

impl PointerRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the canvas position, e.g. after the canvas was resized.
    pub fn reset(&mut self) {
        self.inside_canvas = false;
        self.last = None;
    }

    pub fn route(&mut self, layout: &Layout, event: WindowPointer) -> Option<Routed> {
        trace!("Routing pointer event {:?}", event);
        match event {
            WindowPointer::Enter(position) | WindowPointer::Motion(position) => {
                self.motion(layout, position)
            }
            WindowPointer::Press(position) => match layout.region_at(position) {
                Region::Canvas => {
                    let local = layout.canvas.to_local(position);
                    self.inside_canvas = true;
                    self.last = Some(local);
                    Some(Routed::Stroke(PointerInput::Down(local)))
                }
                Region::Sidebar | Region::Todo => {
                    let action = layout.hit_test(position)?;
                    debug!("Clicked {:?}", action);
                    Some(Routed::Control(action))
                }
                Region::Outside => None,
            },
            WindowPointer::Release(position) => {
                let local = layout.canvas.to_local(position);
                Some(Routed::Stroke(PointerInput::Up(local)))
            }
            WindowPointer::Leave => {
                self.inside_canvas = false;
                let last = self.last?;
                Some(Routed::Stroke(PointerInput::Leave(last)))
            }
            WindowPointer::Scroll(position, amount) => {
                if layout.region_at(position) != Region::Canvas {
                    return None;
                }
                // Scrolling up widens the stroke.
                Some(Routed::Width(if amount < 0.0 { 1.0 } else { -1.0 }))
            }
        }
    }

    fn motion(&mut self, layout: &Layout, position: Point) -> Option<Routed> {
        let local = layout.canvas.to_local(position);
        let inside = layout.region_at(position) == Region::Canvas;
        let was_inside = std::mem::replace(&mut self.inside_canvas, inside);

        if inside {
            self.last = Some(local);
            Some(Routed::Stroke(PointerInput::Move(local)))
        } else if was_inside {
            // Crossing into the sidebar or the overlay ends the gesture there.
            Some(Routed::Stroke(PointerInput::Leave(local)))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hypr_sketch::controls::Controls;
    use hypr_sketch::layout::calculate_layout;
    use hypr_sketch::style::DrawingMode;

    fn layout() -> Layout {
        calculate_layout(800, 600, &Controls::default())
    }

    #[test]
    fn canvas_press_becomes_local_pointer_down() {
        let mut router = PointerRouter::new();
        let routed = router.route(&layout(), WindowPointer::Press(Point::new(204.0, 58.0)));
        assert_eq!(
            routed,
            Some(Routed::Stroke(PointerInput::Down(Point::new(100.0, 50.0))))
        );
    }

    #[test]
    fn sidebar_press_hits_controls() {
        let layout = layout();
        let mut router = PointerRouter::new();
        let button = layout
            .button_for(ControlAction::SelectMode(DrawingMode::Circle))
            .unwrap();
        let inside = button.area.origin().offset(2.0, 2.0);
        assert_eq!(
            router.route(&layout, WindowPointer::Press(inside)),
            Some(Routed::Control(ControlAction::SelectMode(DrawingMode::Circle)))
        );
        // gap between the sidebar and the canvas
        assert_eq!(router.route(&layout, WindowPointer::Press(Point::new(100.0, 300.0))), None);
    }

    #[test]
    fn leaving_the_canvas_region_commits_at_exit_point() {
        let layout = layout();
        let mut router = PointerRouter::new();
        router.route(&layout, WindowPointer::Press(Point::new(300.0, 300.0)));
        router.route(&layout, WindowPointer::Motion(Point::new(150.0, 300.0)));

        let exit = router.route(&layout, WindowPointer::Motion(Point::new(50.0, 300.0)));
        assert_eq!(
            exit,
            Some(Routed::Stroke(PointerInput::Leave(Point::new(-54.0, 292.0))))
        );
        // further motion outside is not routed
        assert_eq!(router.route(&layout, WindowPointer::Motion(Point::new(40.0, 300.0))), None);
    }

    #[test]
    fn surface_leave_uses_last_canvas_position() {
        let layout = layout();
        let mut router = PointerRouter::new();
        assert_eq!(router.route(&layout, WindowPointer::Leave), None);

        router.route(&layout, WindowPointer::Enter(Point::new(304.0, 208.0)));
        assert_eq!(
            router.route(&layout, WindowPointer::Leave),
            Some(Routed::Stroke(PointerInput::Leave(Point::new(200.0, 200.0))))
        );
    }

    #[test]
    fn scroll_adjusts_width_only_over_canvas() {
        let layout = layout();
        let mut router = PointerRouter::new();
        assert_eq!(
            router.route(&layout, WindowPointer::Scroll(Point::new(300.0, 300.0), -1.0)),
            Some(Routed::Width(1.0))
        );
        assert_eq!(
            router.route(&layout, WindowPointer::Scroll(Point::new(300.0, 300.0), 10.0)),
            Some(Routed::Width(-1.0))
        );
        assert_eq!(
            router.route(&layout, WindowPointer::Scroll(Point::new(20.0, 300.0), -1.0)),
            None
        );
    }
}
