//! Game simulation modules

pub mod flag;
pub mod geometry;
pub mod jail;
pub mod r#match;
pub mod player;
pub mod policy;
pub mod rules;
pub mod sensing;
pub mod snapshot;
pub mod team;
pub mod world;

pub use flag::Flag;
pub use jail::Jail;
pub use player::{Player, PlayerHandle};
pub use policy::{Archetype, Decision, DecisionPolicy, Turn};
pub use r#match::{MatchController, MatchPhase, MatchState};
pub use sensing::Senses;
pub use team::{PerTeam, Team};
pub use world::World;
