// filepath: src/main.rs

mod app;
mod pointer;
mod wayland;

use anyhow::Context;
use app::SketchApp;
use calloop::EventLoop;
use calloop_wayland_source::WaylandSource;
use hypr_sketch::config::SketchConfig;
use log::{info, warn};
use smithay_client_toolkit::{
    compositor::CompositorState,
    output::OutputState,
    registry::RegistryState,
    seat::SeatState,
    shell::wlr_layer::{Layer, LayerShell},
    shm::{slot::SlotPool, Shm},
};
use wayland_client::{globals::registry_queue_init, Connection};

/// Initial shm pool size; the pool grows on demand.
const INITIAL_POOL_SIZE: usize = 1920 * 1080 * 4;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    info!("Starting hypr-sketch");

    let config = SketchConfig::load_from_file().unwrap_or_else(|e| {
        warn!("Could not load configuration ({}), using defaults", e);
        SketchConfig::default()
    });
    info!("Configuration loaded");

    let conn = Connection::connect_to_env().context("failed to connect to Wayland")?;
    let (globals, event_queue) =
        registry_queue_init(&conn).context("failed to initialize registry")?;
    let qh = event_queue.handle();

    let compositor =
        CompositorState::bind(&globals, &qh).context("wl_compositor is not available")?;
    let layer_shell = LayerShell::bind(&globals, &qh).context("layer shell is not available")?;
    let shm = Shm::bind(&globals, &qh).context("wl_shm is not available")?;
    let seat_state = SeatState::new(&globals, &qh);

    let pool = SlotPool::new(INITIAL_POOL_SIZE, &shm).context("failed to create shm pool")?;

    let surface = compositor.create_surface(&qh);
    let layer_surface =
        layer_shell.create_layer_surface(&qh, surface, Layer::Top, Some("hypr-sketch"), None);

    let mut app = SketchApp::new(
        RegistryState::new(&globals),
        OutputState::new(&globals, &qh),
        seat_state,
        shm,
        layer_surface,
        pool,
        &config,
    );

    let mut event_loop: EventLoop<SketchApp> =
        EventLoop::try_new().context("failed to create event loop")?;
    WaylandSource::new(conn, event_queue)
        .insert(event_loop.handle())
        .map_err(|e| anyhow::anyhow!("failed to insert Wayland source: {}", e.error))?;

    info!("Entering event loop");
    while !app.exit {
        event_loop
            .dispatch(None, &mut app)
            .context("event loop dispatch failed")?;
    }

    info!("Exiting");
    Ok(())
}
