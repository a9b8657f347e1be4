//! Headless fast-navigation demo.
//!
//! Builds a seeded synthetic scene, orbits the camera around it for a number
//! of frames, then lets it sit idle so the controller crossfades back to full
//! quality. Mode changes, cull-set sizes and frustum partitions are logged.
//!
//! Run with `cargo run -p fastnav-demo -- --frames 240 --triangle-threshold 5000`.

mod settings;
mod sim;

use clap::Parser;
use fastnav_config::{CliArgs, Config, default_config_dir};
use fastnav_motion::{FastNav, MotionState, SurfaceRect};
use tracing::{info, warn};

use crate::settings::fast_nav_settings;
use crate::sim::{LogOverlay, SimViewer, generate_scene};

/// Simulated frame time.
const FRAME_DT: f32 = 1.0 / 60.0;
/// Camera speed during the flight.
const ORBIT_SPEED: f32 = 0.1;
/// Idle time simulated after the flight, in seconds.
const IDLE_SECONDS: f32 = 2.0;
/// Frames between progress reports.
const REPORT_EVERY: u32 = 30;

fn main() {
    let args = CliArgs::parse();

    let config_dir = match args.config.clone() {
        Some(dir) => Some(dir),
        None => default_config_dir()
            .inspect_err(|e| eprintln!("{e}, config will not be persisted"))
            .ok(),
    };

    let mut config = config_dir
        .as_deref()
        .map(Config::load_or_create)
        .transpose()
        .unwrap_or_else(|e| {
            eprintln!("Failed to load config: {e}, using defaults");
            None
        })
        .unwrap_or_default();
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.as_ref().map(|dir| dir.join("logs"));
    fastnav_log::init_logging(log_dir.as_deref(), cfg!(debug_assertions), Some(&config));

    let scene = generate_scene(args.objects, args.seed);
    info!(objects = args.objects, seed = args.seed, "generated scene");

    let mut viewer = SimViewer::new(scene, SurfaceRect::new(0.0, 0.0, 1280.0, 720.0));
    let mut nav = FastNav::new(LogOverlay::default(), fast_nav_settings(&config));
    nav.sync_camera(&viewer);

    let query = nav.objects_in_frustum(&viewer);
    let tree = nav.index().stats();
    info!(
        nodes = tree.node_count,
        deepest = tree.deepest,
        visible = query.inside.len() + query.intersecting.len(),
        outside = query.outside.len(),
        "spatial index built"
    );

    let mut last_state = nav.state();
    let mut report = |frame: u32, nav: &mut FastNav<LogOverlay>, viewer: &SimViewer| {
        let state = nav.state();
        if state != last_state {
            info!(frame, ?state, "mode changed");
            last_state = state;
        }
        if frame % REPORT_EVERY == 0 {
            let query = nav.objects_in_frustum(viewer);
            info!(
                frame,
                ?state,
                drawn = viewer.drawn(),
                detail_culled = nav.detail().applied().len(),
                effects_on = viewer.effects_on(),
                inside = query.inside.len(),
                intersecting = query.intersecting.len(),
                outside = query.outside.len(),
                fade = nav.compositor().opacity().unwrap_or(0.0),
                "frame"
            );
        }
    };

    for frame in 0..args.frames {
        viewer.camera.orbit(ORBIT_SPEED, FRAME_DT);
        nav.on_view_matrix_changed(&mut viewer);
        nav.tick(FRAME_DT, &mut viewer);
        report(frame, &mut nav, &viewer);
    }

    // Pick up edits made to config.ron while the demo was running.
    if let Some(dir) = config_dir.as_deref() {
        match config.reload(dir) {
            Ok(Some(mut reloaded)) => {
                reloaded.apply_cli_overrides(&args);
                nav.apply_settings(fast_nav_settings(&reloaded), &mut viewer);
                info!("applied reloaded config");
            }
            Ok(None) => {}
            Err(e) => warn!("config reload failed: {e}"),
        }
    }

    let idle_frames = (IDLE_SECONDS / FRAME_DT).ceil() as u32;
    for frame in args.frames..args.frames + idle_frames {
        nav.tick(FRAME_DT, &mut viewer);
        report(frame, &mut nav, &viewer);
    }

    if nav.state() != MotionState::Quality {
        warn!("still in fast mode after idling; idle timeout exceeds the simulated idle time");
    }

    let overlay = nav.destroy(&mut viewer);
    info!(
        crossfades = overlay.shown,
        effects_on = viewer.effects_on(),
        drawn = viewer.drawn(),
        "demo finished"
    );
}
