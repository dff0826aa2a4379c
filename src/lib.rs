pub mod config;
pub mod controls;
pub mod draw;
pub mod geometry;
pub mod layout;
pub mod raster;
pub mod shape;
pub mod sketch;
pub mod stroke;
pub mod style;
pub mod surface;
pub mod text;
pub mod todo;

pub use crate::draw::Canvas;
pub use crate::geometry::{Point, Rect};
pub use crate::sketch::Sketch;
pub use crate::stroke::{PointerInput, StrokeController};
pub use crate::style::{Color, DrawSettings, DrawingMode, StrokeStyle};
pub use crate::surface::{DrawTarget, RenderSurface};
