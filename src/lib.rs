//! Terminal Troubleshooter
//!
//! A sysadmin troubleshooting game played entirely in simulated shell
//! commands: list processes, read logs, restart services, scale
//! deployments — and fix the outage before moving to the next level.
//!
//! # Game Mechanics
//!
//! - **Simulation**: every command runs against an in-memory server world
//! - **Levels**: each level is an outage with ordered objectives
//! - **Hints**: repeated wrong commands on a step surface its hint
//! - **XP**: every solved objective awards experience
//!
//! # Architecture
//!
//! - `sim` - The simulated server environment (filesystem, processes,
//!   containers, pods, metrics)
//! - `shell` - The command interpreter: parse a raw line, simulate it,
//!   return a [`shell::CommandResult`]
//! - `game` - Level definitions and the progression engine
//! - `term` - Line-oriented terminal presentation

pub mod game;
pub mod shell;
pub mod sim;
pub mod term;

pub use game::{LevelEngine, LevelSet};
pub use shell::{CommandResult, Interpreter};
pub use sim::SimEnv;

/// Game version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Result type for the game
pub type Result<T> = anyhow::Result<T>;

/// Fatal errors in authored level data, detected at load time.
///
/// Everything that can go wrong *during* play (unknown commands, missing
/// targets, wrong-state operations) is an ordinary [`shell::CommandResult`];
/// only malformed level definitions abort the session.
#[derive(thiserror::Error, Debug)]
pub enum DataError {
    #[error("no levels defined")]
    NoLevels,

    #[error("level '{0}' has no steps")]
    EmptyLevel(String),

    #[error("level '{level}' step {step} has no expected commands")]
    EmptyStep { level: String, step: usize },

    #[error("duplicate level id: {0}")]
    DuplicateLevelId(String),

    #[error("failed to parse level file: {0}")]
    ParseError(#[from] serde_json::Error),
}
