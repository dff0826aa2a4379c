//! The drawing canvas: render surface plus the gesture driving it.

use crate::stroke::{PointerInput, StrokeController};
use crate::style::DrawSettings;
use crate::surface::{DrawTarget, RenderSurface, DEVICE_PIXEL_RATIO};
use log::debug;

#[derive(Debug, Default)]
pub struct Sketch {
    surface: RenderSurface,
    controller: StrokeController,
}

impl Sketch {
    /// A 0x0 sketch; nothing is drawn until the first `resize`.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_size(width: u32, height: u32) -> Self {
        let mut sketch = Self::new();
        sketch.resize(width, height);
        sketch
    }

    /// Re-initialize the surface at `width` x `height` logical pixels.
    ///
    /// The content is discarded and a gesture in progress is dropped, so a
    /// later release commits nothing.
    pub fn resize(&mut self, width: u32, height: u32) {
        debug!("Canvas resized to {}x{}", width, height);
        self.surface.initialize(width, height, DEVICE_PIXEL_RATIO);
        self.controller.cancel();
    }

    /// Feed one canvas pointer input. Returns whether a redraw is needed.
    pub fn handle(&mut self, input: PointerInput, settings: &DrawSettings) -> bool {
        self.controller.handle(&mut self.surface, input, settings)
    }

    pub fn clear(&mut self) {
        self.surface.clear();
    }

    pub fn surface(&self) -> &RenderSurface {
        &self.surface
    }

    pub fn controller(&self) -> &StrokeController {
        &self.controller
    }
}
