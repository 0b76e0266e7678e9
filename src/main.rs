mod collision;
mod components;
mod constants;
mod debug_overlay;
mod engine;
mod error;
mod events;
mod game_loop;
mod geometry;
mod grid;
mod level;
mod logging;
mod pathfinding;
mod queries;
mod systems;
mod time_system;

use std::path::PathBuf;

use clap::Parser;

use constants::FIXED_TIMESTEP;
use debug_overlay::DebugFlags;
use engine::{GameState, GAME_LOG};
use game_loop::GameLoop;
use level::LevelData;
use systems::player_input;
use time_system::FixedTimestep;

/// Headless run of the top-down arena: the player hunts the level's enemies
/// on autopilot while the enemies steer, path and fight back.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Level JSON file; the built-in arena is used when omitted
    #[arg(short, long)]
    level: Option<PathBuf>,

    /// Simulated seconds to run for
    #[arg(short, long, default_value_t = 30.0)]
    seconds: f32,

    /// Seed for enemy wandering
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Serve profiling data to puffin_viewer on the default port
    #[arg(long)]
    profile: bool,

    /// Collect debug overlay data each second and log a digest of it
    #[arg(long)]
    debug_overlay: bool,

    /// Let the player walk through walls
    #[arg(long)]
    noclip: bool,

    /// Flip a debug toggle by name; repeatable
    /// (collision, raycast, pathfinding, hitboxes, noclip)
    #[arg(long = "toggle", value_name = "NAME")]
    toggles: Vec<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    logging::init(args.verbose);

    let _profiler = if args.profile {
        let addr = format!("0.0.0.0:{}", puffin_http::DEFAULT_PORT);
        let server = puffin_http::Server::new(&addr).map_err(|e| e.to_string())?;
        puffin::set_scopes_on(true);
        log::info!(target: GAME_LOG.target(), "puffin server listening on {addr}");
        Some(server)
    } else {
        None
    };

    let level = match &args.level {
        Some(path) => LevelData::load(path)?,
        None => LevelData::demo(),
    };

    let mut state = GameState::from_level(&level, args.seed)?;
    if args.debug_overlay {
        state.debug = DebugFlags::all_visual();
    }
    state.debug.noclip = args.noclip;
    for name in &args.toggles {
        match state.debug.toggle(name) {
            Some(on) => {
                let value = if on { "on" } else { "off" };
                log::info!(target: GAME_LOG.target(), "debug `{name}` {value}");
            }
            None => log::warn!(
                target: GAME_LOG.target(),
                "unknown debug toggle `{name}`, expected one of {:?}",
                DebugFlags::NAMES
            ),
        }
    }

    let mut game_loop = GameLoop::new(FixedTimestep::default());
    let frames = (args.seconds.max(0.0) / FIXED_TIMESTEP).ceil() as u64;

    for frame in 0..frames {
        puffin::GlobalProfiler::lock().new_frame();

        let result = game_loop.run_frame(&mut state, FIXED_TIMESTEP, |s| {
            player_input::autopilot(&s.world, &s.collision, &s.waypoints, s.player_entity)
        });

        if frame % u64::from(constants::TICKS_PER_SECOND) == 0 {
            let overlay = state.debug_overlay();
            if !overlay.is_empty() {
                log::debug!(
                    target: GAME_LOG.target(),
                    "overlay: {} edges, aim {:?}, {} sight lines, {} paths, {} hitboxes",
                    overlay.edges.len(),
                    overlay.aim_hit,
                    overlay.sight_lines.len(),
                    overlay.paths.len(),
                    overlay.hitboxes.len()
                );
            }
        }

        if result.player_died {
            log::info!(target: GAME_LOG.target(), "player died at {:.2}s", state.clock.time);
            break;
        }
        if state.enemies_left() == 0 {
            log::info!(target: GAME_LOG.target(), "arena cleared at {:.2}s", state.clock.time);
            break;
        }
    }

    let summary = game_loop.summary;
    log::info!(
        target: GAME_LOG.target(),
        "{} ticks: {} kills, {} hits dealt, {} taken, {} misses, {} alerts, {} unreachable",
        state.clock.ticks,
        summary.kills,
        summary.hits_by_player,
        summary.hits_on_player,
        summary.misses,
        summary.enemies_alerted,
        summary.paths_not_found
    );

    Ok(())
}
