//! Software rasterization into RGBA byte buffers.
//!
//! Everything here works in device pixels. A pixel at `(x, y)` is sampled at
//! its center `(x + 0.5, y + 0.5)`, and anything outside the buffer is
//! clipped without complaint.

use crate::geometry::Point;
use crate::style::Color;

/// Smallest stroke radius that still lights up a pixel center on every row.
const MIN_RADIUS: f64 = 0.5;

/// Miter joins reaching further than this many half widths are beveled.
pub const MITER_LIMIT: f64 = 10.0;

/// The pieces a stroke is made of, in device coordinates.
///
/// Bodies are flat at both ends. Consecutive segments of a subpath meet in
/// a miter join; open subpath ends get round caps.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StrokeOutline {
    pub bodies: Vec<(Point, Point)>,
    /// `(previous point, vertex, next point)` for every join.
    pub joins: Vec<(Point, Point, Point)>,
    pub caps: Vec<Point>,
}

impl StrokeOutline {
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty() && self.joins.is_empty() && self.caps.is_empty()
    }
}

/// Integer pixel bounds, `x1`/`y1` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PixelBounds {
    x0: u32,
    y0: u32,
    x1: u32,
    y1: u32,
}

impl PixelBounds {
    fn around(points: &[Point], pad: f64, width: u32, height: u32) -> Option<Self> {
        let mut min_x = f64::INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        for p in points {
            min_x = min_x.min(p.x - pad);
            min_y = min_y.min(p.y - pad);
            max_x = max_x.max(p.x + pad);
            max_y = max_y.max(p.y + pad);
        }
        if !(min_x.is_finite() && max_x.is_finite() && min_y.is_finite() && max_y.is_finite()) {
            return None;
        }

        let x0 = min_x.floor().clamp(0.0, width as f64) as u32;
        let y0 = min_y.floor().clamp(0.0, height as f64) as u32;
        let x1 = (max_x.ceil() + 1.0).clamp(0.0, width as f64) as u32;
        let y1 = (max_y.ceil() + 1.0).clamp(0.0, height as f64) as u32;
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(Self { x0, y0, x1, y1 })
    }

    fn union(self, other: PixelBounds) -> PixelBounds {
        PixelBounds {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    fn width(&self) -> usize {
        (self.x1 - self.x0) as usize
    }

    fn height(&self) -> usize {
        (self.y1 - self.y0) as usize
    }
}

/// One filled region of a stroke.
#[derive(Debug, Clone, PartialEq)]
enum Piece {
    Body(Point, Point),
    Disc(Point),
    Polygon(Vec<Point>),
}

impl Piece {
    fn bounds(&self, radius: f64, width: u32, height: u32) -> Option<PixelBounds> {
        match self {
            Piece::Body(a, b) => PixelBounds::around(&[*a, *b], radius, width, height),
            Piece::Disc(p) => PixelBounds::around(&[*p], radius, width, height),
            Piece::Polygon(points) => PixelBounds::around(points, 0.0, width, height),
        }
    }

    fn covers(&self, point: Point, radius: f64) -> bool {
        match self {
            Piece::Body(a, b) => body_covers(point, *a, *b, radius),
            Piece::Disc(center) => center.distance_to(point) <= radius,
            Piece::Polygon(points) => inside_convex(point, points),
        }
    }
}

/// Stroke `outline` with the given half width.
///
/// Coverage is gathered into a mask first so that pixels shared by several
/// pieces are blended once. Returns the number of pixels painted.
pub fn stroke_outline(
    pixels: &mut [u8],
    width: u32,
    height: u32,
    outline: &StrokeOutline,
    radius: f64,
    color: Color,
) -> usize {
    if outline.is_empty() || color.a == 0 {
        return 0;
    }
    let radius = radius.max(MIN_RADIUS);

    let pieces: Vec<Piece> = outline
        .bodies
        .iter()
        .map(|&(a, b)| Piece::Body(a, b))
        .chain(
            outline
                .joins
                .iter()
                .filter_map(|&(prev, at, next)| join_piece(prev, at, next, radius)),
        )
        .chain(outline.caps.iter().map(|&p| Piece::Disc(p)))
        .collect();

    let placed: Vec<(&Piece, PixelBounds)> = pieces
        .iter()
        .filter_map(|piece| Some((piece, piece.bounds(radius, width, height)?)))
        .collect();
    let Some(bounds) = placed.iter().map(|&(_, b)| b).reduce(PixelBounds::union) else {
        return 0;
    };

    let mask_width = bounds.width();
    let mut mask = vec![false; mask_width * bounds.height()];

    for (piece, area) in placed {
        for y in area.y0..area.y1 {
            let row = (y - bounds.y0) as usize * mask_width;
            for x in area.x0..area.x1 {
                let idx = row + (x - bounds.x0) as usize;
                if mask[idx] {
                    continue;
                }
                let center = Point::new(x as f64 + 0.5, y as f64 + 0.5);
                if piece.covers(center, radius) {
                    mask[idx] = true;
                }
            }
        }
    }

    let mut painted = 0;
    for (i, covered) in mask.iter().enumerate() {
        if !covered {
            continue;
        }
        let x = bounds.x0 as usize + i % mask_width;
        let y = bounds.y0 as usize + i / mask_width;
        let idx = (y * width as usize + x) * 4;
        if let Some(px) = pixels.get_mut(idx..idx + 4) {
            blend_pixel(px, color);
            painted += 1;
        }
    }
    painted
}

fn unit(from: Point, to: Point) -> Option<(f64, f64)> {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let len = dx.hypot(dy);
    (len > 0.0 && len.is_finite()).then(|| (dx / len, dy / len))
}

/// The outer wedge where two segments meet at `at`.
///
/// Straight continuations and reversals need no wedge. When a neighbour has
/// no length there is no direction to miter against, so the vertex is filled
/// round.
fn join_piece(prev: Point, at: Point, next: Point, radius: f64) -> Option<Piece> {
    let (Some(d0), Some(d1)) = (unit(prev, at), unit(at, next)) else {
        return Some(Piece::Disc(at));
    };
    let cross = d0.0 * d1.1 - d0.1 * d1.0;
    if cross.abs() < 1e-9 {
        return None;
    }

    // outer side is opposite to the turn
    let side = if cross > 0.0 { -1.0 } else { 1.0 };
    let n0 = (-d0.1 * side, d0.0 * side);
    let n1 = (-d1.1 * side, d1.0 * side);
    let a = at.offset(n0.0 * radius, n0.1 * radius);
    let b = at.offset(n1.0 * radius, n1.1 * radius);

    let sum = (n0.0 + n1.0, n0.1 + n1.1);
    let sum_len = sum.0.hypot(sum.1);
    // miter length over half width is 2 / |n0 + n1|
    if sum_len > 0.0 && 2.0 / sum_len <= MITER_LIMIT {
        let reach = 2.0 * radius / (sum_len * sum_len);
        let tip = at.offset(sum.0 * reach, sum.1 * reach);
        Some(Piece::Polygon(vec![at, a, tip, b]))
    } else {
        Some(Piece::Polygon(vec![at, a, b]))
    }
}

/// Whether `point` lies inside the flat-ended body of segment `start..end`.
fn body_covers(point: Point, start: Point, end: Point, radius: f64) -> bool {
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return false;
    }
    let px = point.x - start.x;
    let py = point.y - start.y;
    let t = (px * dx + py * dy) / len_sq;
    if !(0.0..=1.0).contains(&t) {
        return false;
    }
    // perpendicular distance via the cross product
    let cross = px * dy - py * dx;
    cross * cross <= radius * radius * len_sq
}

fn inside_convex(point: Point, polygon: &[Point]) -> bool {
    let mut sign = 0.0;
    for (i, &a) in polygon.iter().enumerate() {
        let b = polygon[(i + 1) % polygon.len()];
        let c = (b.x - a.x) * (point.y - a.y) - (b.y - a.y) * (point.x - a.x);
        if c == 0.0 {
            continue;
        }
        if sign == 0.0 {
            sign = c.signum();
        } else if c.signum() != sign {
            return false;
        }
    }
    true
}

/// Source-over blend of a straight-alpha color onto a straight-alpha pixel.
pub fn blend_pixel(px: &mut [u8], color: Color) {
    match color.a {
        0 => {}
        255 => px.copy_from_slice(&color.to_array()),
        a => {
            let sa = a as f32 / 255.0;
            let da = px[3] as f32 / 255.0;
            let out_a = sa + da * (1.0 - sa);
            if out_a <= 0.0 {
                px.copy_from_slice(&[0, 0, 0, 0]);
                return;
            }
            let mix = |src: u8, dst: u8| -> u8 {
                ((src as f32 * sa + dst as f32 * da * (1.0 - sa)) / out_a).round() as u8
            };
            px[0] = mix(color.r, px[0]);
            px[1] = mix(color.g, px[1]);
            px[2] = mix(color.b, px[2]);
            px[3] = (out_a * 255.0).round() as u8;
        }
    }
}

/// Overwrite every pixel with `color`.
pub fn fill_pixels(pixels: &mut [u8], color: Color) {
    let value = color.to_array();
    for px in pixels.chunks_exact_mut(4) {
        px.copy_from_slice(&value);
    }
}
