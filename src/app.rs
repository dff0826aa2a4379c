// filepath: src/app.rs
//! Main application logic for hypr-sketch

use crate::pointer::{PointerRouter, Routed, WindowPointer};
use anyhow::Context;
use hypr_sketch::config::SketchConfig;
use hypr_sketch::controls::{Command, Controls};
use hypr_sketch::draw::{self, Canvas, IconCache};
use hypr_sketch::layout::{calculate_layout, Layout};
use hypr_sketch::sketch::Sketch;
use hypr_sketch::surface::DEVICE_PIXEL_RATIO;
use hypr_sketch::text::TextRenderer;
use log::{debug, info, warn};
use smithay_client_toolkit::{
    output::OutputState,
    registry::RegistryState,
    seat::SeatState,
    shell::{
        wlr_layer::{Anchor, KeyboardInteractivity, LayerSurface},
        WaylandSurface,
    },
    shm::{
        slot::{Buffer, SlotPool},
        Shm,
    },
};
use wayland_client::protocol::{wl_pointer, wl_shm};
use wayland_client::QueueHandle;

pub struct SketchApp {
    registry_state: RegistryState,
    output_state: OutputState,
    seat_state: SeatState,
    shm_state: Shm,
    layer_surface: LayerSurface,
    pool: SlotPool,
    buffer: Option<Buffer>,
    /// Logical size of the layer surface.
    pub(crate) width: u32,
    pub(crate) height: u32,
    configured: bool,
    pointer: Option<wl_pointer::WlPointer>,

    sketch: Sketch,
    controls: Controls,
    layout: Layout,
    router: PointerRouter,
    text: Option<TextRenderer>,
    icons: IconCache,
    /// RGBA frame, converted into the shm buffer on present.
    frame: Vec<u8>,
    needs_redraw: bool,
    frame_pending: bool,
    pub(crate) exit: bool,
}

impl SketchApp {
    pub fn new(
        registry_state: RegistryState,
        output_state: OutputState,
        seat_state: SeatState,
        shm_state: Shm,
        layer_surface: LayerSurface,
        pool: SlotPool,
        config: &SketchConfig,
    ) -> Self {
        info!("Configuring layer surface");
        layer_surface.set_keyboard_interactivity(KeyboardInteractivity::None);
        layer_surface.set_exclusive_zone(-1);
        match config.fixed_size() {
            Some((width, height)) => {
                info!("Using fixed size {}x{}", width, height);
                layer_surface.set_anchor(Anchor::empty());
                layer_surface.set_size(width, height);
            }
            None => {
                layer_surface.set_anchor(Anchor::all());
                layer_surface.set_size(0, 0);
            }
        }
        info!("Committing layer surface configuration");
        layer_surface.wl_surface().commit();

        let controls = Controls::from_config(config);
        let text = TextRenderer::load(config.font_path.as_deref());
        let (width, height) = config.fixed_size().unwrap_or((0, 0));

        Self {
            registry_state,
            output_state,
            seat_state,
            shm_state,
            layer_surface,
            pool,
            buffer: None,
            width,
            height,
            configured: false,
            pointer: None,
            sketch: Sketch::new(),
            layout: calculate_layout(width, height, &controls),
            controls,
            router: PointerRouter::new(),
            text,
            icons: IconCache::new(),
            frame: Vec::new(),
            needs_redraw: true,
            frame_pending: false,
            exit: false,
        }
    }

    /// Apply a configure event. A changed size re-initializes the canvas,
    /// which discards its content and any gesture in progress.
    pub fn configure(&mut self, width: u32, height: u32, qh: &QueueHandle<Self>) {
        let width = if width == 0 { self.width } else { width };
        let height = if height == 0 { self.height } else { height };
        let first = !self.configured;
        self.configured = true;

        if first || (width, height) != (self.width, self.height) {
            info!("Surface now configured with size: {}x{}", width, height);
            self.width = width;
            self.height = height;
            self.relayout();
            self.sketch.resize(self.layout.canvas.width, self.layout.canvas.height);
            self.router.reset();
        }

        // A configure must be answered with a commit, so draw right away.
        self.frame_pending = false;
        self.request_redraw(qh);
    }

    fn relayout(&mut self) {
        self.layout = calculate_layout(self.width, self.height, &self.controls);
    }

    /// Mark the frame dirty; draws now unless a frame callback is pending.
    pub fn request_redraw(&mut self, qh: &QueueHandle<Self>) {
        self.needs_redraw = true;
        if !self.frame_pending {
            self.draw(qh);
        }
    }

    /// Frame callback from the compositor.
    pub fn frame_done(&mut self, qh: &QueueHandle<Self>) {
        self.frame_pending = false;
        if self.needs_redraw {
            self.draw(qh);
        }
    }

    pub fn draw(&mut self, qh: &QueueHandle<Self>) {
        if !self.configured {
            debug!("draw() called before surface is configured, skipping");
            return;
        }
        if let Err(e) = self.present(qh) {
            warn!("Skipping frame: {:#}", e);
        }
    }

    fn present(&mut self, qh: &QueueHandle<Self>) -> anyhow::Result<()> {
        let width = self.width * DEVICE_PIXEL_RATIO;
        let height = self.height * DEVICE_PIXEL_RATIO;
        let stride = width * 4;
        if width == 0 || height == 0 {
            return Ok(());
        }

        self.frame.resize((stride * height) as usize, 0);
        let mut canvas = Canvas::new(&mut self.frame, width, height, DEVICE_PIXEL_RATIO);
        draw::compose_frame(
            &mut canvas,
            &self.layout,
            &self.controls,
            self.sketch.surface(),
            &mut self.icons,
            self.text.as_mut(),
        );

        let (buffer, pixels) = self
            .pool
            .create_buffer(
                width as i32,
                height as i32,
                stride as i32,
                wl_shm::Format::Argb8888,
            )
            .context("failed to allocate frame buffer")?;
        draw::rgba_to_argb8888(&self.frame, pixels);

        let wl_surface = self.layer_surface.wl_surface();
        wl_surface.set_buffer_scale(DEVICE_PIXEL_RATIO as i32);
        wl_surface.damage_buffer(0, 0, width as i32, height as i32);
        wl_surface.frame(qh, wl_surface.clone());
        buffer
            .attach_to(wl_surface)
            .context("failed to attach frame buffer")?;
        wl_surface.commit();

        self.buffer = Some(buffer);
        self.needs_redraw = false;
        self.frame_pending = true;
        Ok(())
    }

    pub fn handle_pointer(&mut self, event: WindowPointer, qh: &QueueHandle<Self>) {
        let Some(routed) = self.router.route(&self.layout, event) else {
            return;
        };

        let changed = match routed {
            Routed::Stroke(input) => {
                let settings = self.controls.settings();
                self.sketch.handle(input, &settings)
            }
            Routed::Control(action) => {
                if let Some(command) = self.controls.apply(action) {
                    self.execute(command);
                }
                self.relayout();
                true
            }
            Routed::Width(delta) => {
                self.controls.adjust_width(delta);
                debug!("Stroke width: {}", self.controls.width());
                true
            }
        };

        if changed {
            self.request_redraw(qh);
        }
    }

    fn execute(&mut self, command: Command) {
        match command {
            Command::ClearSurface => {
                info!("Clearing canvas");
                self.sketch.clear();
            }
            Command::Quit => {
                info!("Quit requested");
                self.exit = true;
            }
        }
    }

    pub fn registry_state(&mut self) -> &mut RegistryState {
        &mut self.registry_state
    }

    pub fn output_state(&mut self) -> &mut OutputState {
        &mut self.output_state
    }

    pub fn seat_state(&mut self) -> &mut SeatState {
        &mut self.seat_state
    }

    pub fn shm_state(&mut self) -> &mut Shm {
        &mut self.shm_state
    }

    pub fn set_pointer(&mut self, pointer: Option<wl_pointer::WlPointer>) {
        if pointer.is_none() {
            if let Some(old) = self.pointer.take() {
                old.release();
            }
        }
        self.pointer = pointer;
        info!("Pointer set: {:?}", self.pointer.is_some());
    }

    pub fn close_layer_surface(&mut self) {
        info!("Layer surface closed");
        self.exit = true;
    }
}
