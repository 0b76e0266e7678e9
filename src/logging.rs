//! Logging setup and the per-subsystem log context.
//!
//! Subsystems never reach for a global logger object; they are handed a
//! `LogContext` at construction and log under its target, so output can be
//! filtered per subsystem with `RUST_LOG` (e.g. `RUST_LOG=edge_roguelike::ai=debug`).

use env_logger::{Builder, Env};
use log::LevelFilter;

/// Log target handed to a subsystem when it is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogContext {
    target: &'static str,
}

impl LogContext {
    pub const fn new(target: &'static str) -> Self {
        Self { target }
    }

    pub fn target(&self) -> &'static str {
        self.target
    }
}

/// Initializes the global `log` backend.
///
/// `verbose` lowers the default level to debug; `RUST_LOG` still wins.
pub fn init(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let env = Env::default().default_filter_or(level.to_string());
    let mut builder = Builder::from_env(env);

    // Only fails when a logger is already installed.
    let _ = builder.try_init();
}
