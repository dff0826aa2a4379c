//! Render surface: a device-pixel RGBA buffer plus the path being built.
//!
//! Coordinates handed to the path primitives are logical. The surface keeps
//! the path in logical units and applies its pixel ratio once, at stroke
//! time, so the buffer itself is never transformed per call.

use crate::geometry::Point;
use crate::raster::{self, StrokeOutline};
use crate::style::{Color, StrokeStyle};
use log::{debug, trace};
use std::f64::consts::TAU;

/// Buffer pixels per logical pixel on each axis.
pub const DEVICE_PIXEL_RATIO: u32 = 2;

/// Approximate device-pixel length of one flattened arc segment.
const ARC_SEGMENT_LENGTH: f64 = 2.0;
const MIN_ARC_STEPS: usize = 8;
const MAX_ARC_STEPS: usize = 4096;

/// Path-building and stroking primitives.
///
/// The stroke controller only speaks to this trait, which keeps the gesture
/// logic independent of where the pixels end up.
pub trait DrawTarget {
    fn begin_path(&mut self);
    fn move_to(&mut self, point: Point);
    fn line_to(&mut self, point: Point);
    /// Clockwise arc around `center` from `start_angle` to `end_angle` (radians).
    fn arc(&mut self, center: Point, radius: f64, start_angle: f64, end_angle: f64);
    fn rect(&mut self, origin: Point, width: f64, height: f64);
    /// Rasterize the segments added since the last stroke using `style`.
    fn stroke(&mut self, style: &StrokeStyle);
    fn close_path(&mut self);
    fn clear(&mut self);
}

/// One straight piece of a flattened path, in logical coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub from: Point,
    pub to: Point,
    /// Continues the previous segment of the same subpath.
    pub joined: bool,
    /// Set on a closing segment: index of the first segment of its subpath.
    pub closes: Option<usize>,
}

/// A flattened path: straight segments in logical coordinates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    segments: Vec<Segment>,
    current: Option<Point>,
    subpath_start: Option<Point>,
    /// Index of the first segment of the current subpath.
    subpath_first: Option<usize>,
    stroked: usize,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.segments.clear();
        self.current = None;
        self.subpath_start = None;
        self.subpath_first = None;
        self.stroked = 0;
    }

    pub fn move_to(&mut self, point: Point) {
        self.current = Some(point);
        self.subpath_start = Some(point);
        self.subpath_first = None;
    }

    /// Without a current point this behaves like `move_to`.
    pub fn line_to(&mut self, point: Point) {
        let Some(from) = self.current else {
            self.move_to(point);
            return;
        };
        let joined = self.subpath_first.is_some();
        if !joined {
            self.subpath_first = Some(self.segments.len());
        }
        self.segments.push(Segment {
            from,
            to: point,
            joined,
            closes: None,
        });
        self.current = Some(point);
    }

    /// Close the subpath back to its start and begin a new one there.
    pub fn close(&mut self) {
        if let (Some(current), Some(start)) = (self.current, self.subpath_start) {
            if current != start {
                self.segments.push(Segment {
                    from: current,
                    to: start,
                    joined: self.subpath_first.is_some(),
                    closes: self.subpath_first,
                });
            }
            self.move_to(start);
        }
    }

    /// Append a clockwise arc flattened into `steps` segments.
    ///
    /// A sweep of a full turn or more draws the whole circle.
    pub fn arc(&mut self, center: Point, radius: f64, start_angle: f64, end_angle: f64, steps: usize) {
        if !(radius >= 0.0) || !start_angle.is_finite() || !end_angle.is_finite() {
            return;
        }
        let sweep = arc_sweep(start_angle, end_angle);
        let point_at = |angle: f64| {
            Point::new(
                center.x + radius * angle.cos(),
                center.y + radius * angle.sin(),
            )
        };

        self.line_to(point_at(start_angle));
        if sweep == 0.0 {
            return;
        }
        let steps = steps.max(1);
        for step in 1..=steps {
            let angle = start_angle + sweep * step as f64 / steps as f64;
            self.line_to(point_at(angle));
        }
    }

    pub fn rect(&mut self, origin: Point, width: f64, height: f64) {
        self.move_to(origin);
        self.line_to(origin.offset(width, 0.0));
        self.line_to(origin.offset(width, height));
        self.line_to(origin.offset(0.0, height));
        self.close();
    }

    /// All segments, stroked or not.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Segments added since the last stroke.
    pub fn pending(&self) -> &[Segment] {
        &self.segments[self.stroked..]
    }

    pub fn mark_stroked(&mut self) {
        self.stroked = self.segments.len();
    }

    pub fn current_point(&self) -> Option<Point> {
        self.current
    }

    /// Outline of the pending segments, scaled into device space.
    ///
    /// A pending segment that continues an already stroked one still gets
    /// its join, so strokes issued one segment at a time meet the same way
    /// a single stroke would.
    pub fn pending_outline(&self, scale: f64) -> StrokeOutline {
        let mut outline = StrokeOutline::default();
        let segments = &self.segments;
        let closed_firsts: Vec<usize> = segments.iter().filter_map(|s| s.closes).collect();

        for (i, seg) in segments.iter().enumerate().skip(self.stroked) {
            let from = seg.from.scaled(scale);
            let to = seg.to.scaled(scale);
            outline.bodies.push((from, to));

            match i.checked_sub(1).filter(|_| seg.joined) {
                Some(prev) => outline.joins.push((segments[prev].from.scaled(scale), from, to)),
                None if closed_firsts.contains(&i) => {}
                None => outline.caps.push(from),
            }

            match seg.closes {
                Some(first) => outline.joins.push((from, to, segments[first].to.scaled(scale))),
                None if segments.get(i + 1).is_some_and(|next| next.joined) => {}
                None => outline.caps.push(to),
            }
        }
        outline
    }
}

/// Clockwise sweep in `[0, TAU]` from `start` to `end`.
fn arc_sweep(start: f64, end: f64) -> f64 {
    let delta = end - start;
    if delta >= TAU {
        TAU
    } else {
        delta.rem_euclid(TAU)
    }
}

/// The drawing buffer, addressed in device pixels.
#[derive(Debug, Default)]
pub struct RenderSurface {
    pixels: Vec<u8>,
    logical_width: u32,
    logical_height: u32,
    pixel_ratio: u32,
    path: Path,
    segments_rasterized: u64,
}

impl RenderSurface {
    /// An uninitialized 0x0 surface; every draw call is clipped away.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_size(logical_width: u32, logical_height: u32, pixel_ratio: u32) -> Self {
        let mut surface = Self::new();
        surface.initialize(logical_width, logical_height, pixel_ratio);
        surface
    }

    /// Size the buffer to `logical * pixel_ratio` and start blank.
    ///
    /// Calling this again (on resize) discards the previous content.
    pub fn initialize(&mut self, logical_width: u32, logical_height: u32, pixel_ratio: u32) {
        let pixel_ratio = pixel_ratio.max(1);
        let device_width = logical_width.saturating_mul(pixel_ratio);
        let device_height = logical_height.saturating_mul(pixel_ratio);
        let len = (device_width as usize)
            .saturating_mul(device_height as usize)
            .saturating_mul(4);

        self.pixels = vec![0; len];
        self.logical_width = logical_width;
        self.logical_height = logical_height;
        self.pixel_ratio = pixel_ratio;
        self.path.reset();
        debug!(
            "Render surface initialized: {}x{} logical, {}x{} device (ratio {})",
            logical_width, logical_height, device_width, device_height, pixel_ratio
        );
    }

    pub fn logical_size(&self) -> (u32, u32) {
        (self.logical_width, self.logical_height)
    }

    pub fn buffer_size(&self) -> (u32, u32) {
        (
            self.logical_width * self.pixel_ratio,
            self.logical_height * self.pixel_ratio,
        )
    }

    pub fn pixel_ratio(&self) -> u32 {
        self.pixel_ratio
    }

    /// Raw RGBA bytes, row-major, `buffer_size().0 * 4` bytes per row.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Pixel at device coordinates, if inside the buffer.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        let (width, height) = self.buffer_size();
        if x >= width || y >= height {
            return None;
        }
        let idx = ((y * width + x) * 4) as usize;
        let px = &self.pixels[idx..idx + 4];
        Some(Color::rgba(px[0], px[1], px[2], px[3]))
    }

    pub fn is_blank(&self) -> bool {
        self.pixels.iter().all(|&b| b == 0)
    }

    /// Total number of path segments rasterized since creation.
    pub fn segments_rasterized(&self) -> u64 {
        self.segments_rasterized
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn arc_steps(&self, radius: f64, start_angle: f64, end_angle: f64) -> usize {
        let sweep = arc_sweep(start_angle, end_angle);
        let length = sweep * radius * self.pixel_ratio as f64;
        let steps = (length / ARC_SEGMENT_LENGTH).ceil();
        if steps.is_finite() {
            (steps as usize).clamp(MIN_ARC_STEPS, MAX_ARC_STEPS)
        } else {
            MIN_ARC_STEPS
        }
    }
}

impl DrawTarget for RenderSurface {
    fn begin_path(&mut self) {
        self.path.reset();
    }

    fn move_to(&mut self, point: Point) {
        self.path.move_to(point);
    }

    fn line_to(&mut self, point: Point) {
        self.path.line_to(point);
    }

    fn arc(&mut self, center: Point, radius: f64, start_angle: f64, end_angle: f64) {
        let steps = self.arc_steps(radius, start_angle, end_angle);
        self.path.arc(center, radius, start_angle, end_angle, steps);
    }

    fn rect(&mut self, origin: Point, width: f64, height: f64) {
        self.path.rect(origin, width, height);
    }

    fn stroke(&mut self, style: &StrokeStyle) {
        let count = self.path.pending().len();
        if count == 0 {
            return;
        }

        let scale = self.pixel_ratio as f64;
        let outline = self.path.pending_outline(scale);
        let (width, height) = self.buffer_size();
        let radius = style.width as f64 * scale / 2.0;
        let painted = raster::stroke_outline(
            &mut self.pixels,
            width,
            height,
            &outline,
            radius,
            style.color,
        );
        trace!(
            "stroke: {} segment(s), width {}, {} pixel(s) painted",
            count,
            style.width,
            painted
        );

        self.segments_rasterized += count as u64;
        self.path.mark_stroked();
    }

    fn close_path(&mut self) {
        self.path.close();
    }

    fn clear(&mut self) {
        raster::fill_pixels(&mut self.pixels, Color::TRANSPARENT);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn black(width: f32) -> StrokeStyle {
        StrokeStyle::new(Color::BLACK, width)
    }

    #[test]
    fn initialize_scales_buffer_by_ratio() {
        let surface = RenderSurface::with_size(300, 200, DEVICE_PIXEL_RATIO);
        assert_eq!(surface.logical_size(), (300, 200));
        assert_eq!(surface.buffer_size(), (600, 400));
        assert_eq!(surface.pixels().len(), 600 * 400 * 4);
        assert!(surface.is_blank());
    }

    #[test]
    fn stroke_maps_logical_to_device_pixels() {
        let mut surface = RenderSurface::with_size(100, 100, 2);
        surface.begin_path();
        surface.move_to(Point::new(10.0, 50.0));
        surface.line_to(Point::new(90.0, 50.0));
        surface.stroke(&black(2.0));

        // logical y = 50 is device y = 100
        assert_eq!(surface.pixel(100, 99), Some(Color::BLACK));
        assert_eq!(surface.pixel(100, 100), Some(Color::BLACK));
        assert_eq!(surface.pixel(100, 50), Some(Color::TRANSPARENT));
        assert_eq!(surface.pixel(10, 99), Some(Color::TRANSPARENT));
    }

    #[test]
    fn stroke_only_rasterizes_pending_segments() {
        let mut surface = RenderSurface::with_size(50, 50, 2);
        surface.begin_path();
        surface.move_to(Point::new(5.0, 5.0));
        surface.line_to(Point::new(20.0, 5.0));
        surface.stroke(&black(2.0));
        assert_eq!(surface.segments_rasterized(), 1);

        surface.line_to(Point::new(20.0, 20.0));
        surface.stroke(&StrokeStyle::new(Color::rgb(255, 0, 0), 2.0));
        assert_eq!(surface.segments_rasterized(), 2);

        // the first segment kept its original color
        assert_eq!(surface.pixel(20, 9), Some(Color::BLACK));
        assert_eq!(surface.pixel(40, 30), Some(Color::rgb(255, 0, 0)));

        surface.stroke(&black(2.0));
        assert_eq!(surface.segments_rasterized(), 2);
    }

    #[test]
    fn rect_builds_closed_subpath_in_corner_order() {
        let mut path = Path::new();
        path.rect(Point::new(10.0, 10.0), -20.0, -20.0);
        let corners: Vec<Point> = path.segments().iter().map(|s| s.from).collect();
        assert_eq!(
            corners,
            vec![
                Point::new(10.0, 10.0),
                Point::new(-10.0, 10.0),
                Point::new(-10.0, -10.0),
                Point::new(10.0, -10.0),
            ]
        );
        assert_eq!(path.segments()[3].to, Point::new(10.0, 10.0));
        assert_eq!(path.segments()[3].closes, Some(0));
        assert_eq!(path.current_point(), Some(Point::new(10.0, 10.0)));
    }

    #[test]
    fn full_arc_returns_to_start() {
        let mut path = Path::new();
        path.arc(Point::new(50.0, 50.0), 30.0, 0.0, 2.0 * PI, 16);
        let segments = path.segments();
        assert_eq!(segments.len(), 16);
        assert_eq!(segments[0].from, Point::new(80.0, 50.0));
        let last = segments[15].to;
        assert!((last.x - 80.0).abs() < 1e-9 && (last.y - 50.0).abs() < 1e-9);
        for seg in segments {
            assert!((seg.from.distance_to(Point::new(50.0, 50.0)) - 30.0).abs() < 1e-9);
        }
    }

    #[test]
    fn arc_after_move_connects_with_a_line() {
        let mut path = Path::new();
        path.move_to(Point::new(0.0, 0.0));
        path.arc(Point::new(10.0, 0.0), 5.0, 0.0, PI, 4);
        let first = path.segments()[0];
        assert_eq!((first.from, first.to), (Point::new(0.0, 0.0), Point::new(15.0, 0.0)));
        assert!(path.segments()[1..].iter().all(|s| s.joined));
        assert_eq!(path.segments().len(), 5);
    }

    #[test]
    fn close_path_adds_closing_segment_but_draws_nothing() {
        let mut surface = RenderSurface::with_size(40, 40, 2);
        surface.begin_path();
        surface.move_to(Point::new(5.0, 5.0));
        surface.line_to(Point::new(30.0, 5.0));
        surface.line_to(Point::new(30.0, 30.0));
        surface.stroke(&black(1.0));
        let before = surface.pixels().to_vec();

        surface.close_path();
        assert_eq!(surface.path().pending().len(), 1);
        assert_eq!(surface.pixels(), &before[..]);
    }

    #[test]
    fn clear_blanks_full_device_extent_and_is_idempotent() {
        let mut surface = RenderSurface::with_size(30, 30, 2);
        surface.begin_path();
        surface.move_to(Point::new(0.0, 0.0));
        surface.line_to(Point::new(30.0, 30.0));
        surface.stroke(&black(10.0));
        // bottom-right device corner is beyond the logical extent
        assert_eq!(surface.pixel(59, 59), Some(Color::BLACK));

        surface.clear();
        let once = surface.pixels().to_vec();
        assert!(surface.is_blank());
        surface.clear();
        assert_eq!(surface.pixels(), &once[..]);
    }

    #[test]
    fn drawing_on_uninitialized_surface_is_harmless() {
        let mut surface = RenderSurface::new();
        surface.begin_path();
        surface.move_to(Point::new(1.0, 1.0));
        surface.line_to(Point::new(5.0, 5.0));
        surface.stroke(&black(3.0));
        surface.clear();
        assert_eq!(surface.buffer_size(), (0, 0));
        assert_eq!(surface.pixel(0, 0), None);
    }

    #[test]
    fn reinitialize_discards_content() {
        let mut surface = RenderSurface::with_size(20, 20, 2);
        surface.begin_path();
        surface.move_to(Point::new(2.0, 2.0));
        surface.line_to(Point::new(18.0, 18.0));
        surface.stroke(&black(4.0));
        assert!(!surface.is_blank());

        surface.initialize(40, 10, 2);
        assert!(surface.is_blank());
        assert_eq!(surface.buffer_size(), (80, 20));
        assert!(surface.path().segments().is_empty());
    }

    #[test]
    fn rect_corners_are_mitered() {
        let mut surface = RenderSurface::with_size(100, 100, 2);
        surface.begin_path();
        surface.rect(Point::new(30.0, 30.0), 40.0, 40.0);
        surface.stroke(&black(20.0));

        // outer corner of the closing join and of an ordinary corner
        assert_eq!(surface.pixel(43, 43), Some(Color::BLACK));
        assert_eq!(surface.pixel(156, 156), Some(Color::BLACK));
        // edge, for comparison
        assert_eq!(surface.pixel(43, 100), Some(Color::BLACK));
        assert_eq!(surface.pixel(38, 38), Some(Color::TRANSPARENT));
    }

    #[test]
    fn segments_stroked_one_at_a_time_still_join() {
        let mut surface = RenderSurface::with_size(50, 50, 1);
        surface.begin_path();
        surface.move_to(Point::new(10.0, 10.0));
        surface.line_to(Point::new(30.0, 10.0));
        surface.stroke(&black(8.0));
        // the round end cap does not reach the miter corner
        assert_eq!(surface.pixel(33, 6), Some(Color::TRANSPARENT));

        surface.line_to(Point::new(30.0, 30.0));
        surface.stroke(&black(8.0));
        assert_eq!(surface.pixel(33, 6), Some(Color::BLACK));
    }

    #[test]
    fn open_subpath_ends_are_round() {
        let mut surface = RenderSurface::with_size(50, 20, 1);
        surface.begin_path();
        surface.move_to(Point::new(10.0, 10.0));
        surface.line_to(Point::new(40.0, 10.0));
        surface.stroke(&black(8.0));
        // inside the cap disc, outside the corner of a square end
        assert_eq!(surface.pixel(42, 10), Some(Color::BLACK));
        assert_eq!(surface.pixel(43, 13), Some(Color::TRANSPARENT));
    }
}
