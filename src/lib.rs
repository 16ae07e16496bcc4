//! CTF Arena - two-team capture the flag simulator
//!
//! Two rosters of autonomous players compete in a square arena. A match ends
//! when one team has every player jailed, when a flag is carried across the
//! midline, or when the clock runs out. A tournament plays a fixed number of
//! matches on the same world and tallies wins and ties.
//!
//! The core never integrates motion itself. Everything physical goes through
//! a [`host::SimulationHost`]; [`host::KinematicHost`] is the deterministic
//! reference implementation.

pub mod config;
pub mod game;
pub mod host;
pub mod protocol;
pub mod tournament;
pub mod util;

pub use config::{Config, ConfigError, GameConfig};
pub use host::{KinematicHost, SimulationHost};
pub use tournament::{Tournament, TournamentRunner};
