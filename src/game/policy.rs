//! Decision archetypes: per-tick steering from a player's senses

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

use super::sensing::Senses;

/// Steering command for one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Turn {
    #[default]
    None,
    Left,
    Right,
}

impl Turn {
    /// Steer toward a target at signed `angle` (positive is to the right)
    pub fn toward(angle: f32) -> Self {
        if angle > 0.0 {
            Turn::Right
        } else if angle < 0.0 {
            Turn::Left
        } else {
            Turn::None
        }
    }
}

/// What a player does this tick
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Decision {
    pub turn: Turn,
    pub speed: f32,
}

/// Maps senses to a decision. Implementations must not mutate the world.
pub trait DecisionPolicy {
    fn decide(&self, senses: &Senses<'_>) -> Decision;
}

/// Built-in behaviours a team can field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Archetype {
    /// Raids for the enemy flag and runs it home
    HomeGuard,
    /// Hovers near its own flag
    FlagGuard,
    /// Stands still
    Idle,
}

impl Archetype {
    pub const ALL: [Archetype; 3] = [Archetype::HomeGuard, Archetype::FlagGuard, Archetype::Idle];

    pub fn name(self) -> &'static str {
        match self {
            Archetype::HomeGuard => "home_guard",
            Archetype::FlagGuard => "flag_guard",
            Archetype::Idle => "idle",
        }
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Archetype {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        Archetype::ALL
            .into_iter()
            .find(|a| a.name() == wanted)
            .ok_or_else(|| ConfigError::UnknownArchetype(s.to_string()))
    }
}

impl DecisionPolicy for Archetype {
    fn decide(&self, senses: &Senses<'_>) -> Decision {
        match self {
            Archetype::HomeGuard => home_guard(senses),
            Archetype::FlagGuard => flag_guard(senses),
            Archetype::Idle => Decision::default(),
        }
    }
}

fn home_guard(senses: &Senses<'_>) -> Decision {
    let me = senses.me();
    let turn = if me.has_flag() {
        Turn::toward(senses.angle_to(&me.home_location()))
    } else if let Some(flag) = senses.sense_other_flag() {
        Turn::toward(senses.angle_to(&flag.position))
    } else {
        // Patrol toward the midline, holding course once across it
        let target = me.other_home_location();
        if target == me.position {
            Turn::None
        } else {
            Turn::toward(senses.angle_to(&target))
        }
    };

    Decision { turn, speed: 1.0 }
}

fn flag_guard(senses: &Senses<'_>) -> Decision {
    match senses.angle_to_object(senses.sense_my_flag()) {
        Some(angle) => Decision {
            turn: Turn::toward(angle),
            speed: 0.3,
        },
        None => Decision {
            turn: Turn::None,
            speed: 1.0,
        },
    }
}
