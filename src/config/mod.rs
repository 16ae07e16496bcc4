//! Configuration module - environment variable parsing and game constants

use std::env;
use std::str::FromStr;

use crate::game::policy::Archetype;
use crate::game::team::Team;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human readable lines
    Pretty,
    /// One JSON object per line
    Json,
}

/// Process configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Log output format
    pub log_format: LogFormat,
    /// Simulation ticks per second, 0 runs unthrottled
    pub tick_hz: u32,
    /// Seed for the host random source
    pub seed: Option<u64>,
    /// Ticks between published status snapshots
    pub snapshot_every: u32,
    /// Archetype fielded by the blue team
    pub blue_archetype: Archetype,
    /// Archetype fielded by the red team
    pub red_archetype: Archetype,
    /// Game constants
    pub game: GameConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let log_format = match env::var("LOG_FORMAT").as_deref() {
            Ok("json") => LogFormat::Json,
            Ok("pretty") | Err(_) => LogFormat::Pretty,
            Ok(_) => return Err(ConfigError::Invalid("LOG_FORMAT")),
        };

        let config = Self {
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            log_format,
            tick_hz: parse_var("TICK_HZ")?.unwrap_or(0),
            seed: parse_var("SEED")?,
            snapshot_every: parse_var("SNAPSHOT_EVERY")?.unwrap_or(25),
            blue_archetype: archetype_var("BLUE_ARCHETYPE", Archetype::HomeGuard)?,
            red_archetype: archetype_var("RED_ARCHETYPE", Archetype::FlagGuard)?,
            game: GameConfig::from_env()?,
        };

        config.game.validate()?;
        Ok(config)
    }
}

/// Gameplay constants, injected into the tournament at construction
#[derive(Clone, Debug, PartialEq)]
pub struct GameConfig {
    /// Arena is `arena_size` x `arena_size`, centred on the origin
    pub arena_size: f32,
    /// Perception radius for flags, jails and players
    pub sensor_distance: f32,
    /// Search radius for the closest opponent query
    pub closest_opponent_radius: f32,
    /// Match length in host time units
    pub game_length: f32,
    /// Ticks to rest between matches
    pub pause_time: u32,
    /// Matches in a tournament
    pub tournament_length: u32,
    /// Players per team
    pub roster_size: u32,
    /// Radius around a resting flag where its defenders cannot tag
    pub no_tag_radius: f32,
    /// Steering increment per turn, radians
    pub turn_step: f32,
    /// Height players hover at
    pub hover_height: f32,
    /// Height flags rest at
    pub flag_height: f32,
    /// Flag spawn distance from its home edge
    pub flag_edge_offset: f32,
    /// Jail distance from the arena corner
    pub jail_edge_offset: f32,
    /// Velocity = speed_scale * speed * heading
    pub speed_scale: f32,
    /// Speed change applied by accelerate/decelerate
    pub speed_step: f32,
}

impl GameConfig {
    /// Half of the arena edge length
    pub fn half_extent(&self) -> f32 {
        self.arena_size / 2.0
    }

    /// Apply `CTF_*` overrides on top of the defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut game = Self::default();

        if let Some(v) = parse_var("CTF_ARENA_SIZE")? {
            game.arena_size = v;
        }
        if let Some(v) = parse_var("CTF_SENSOR_DISTANCE")? {
            game.sensor_distance = v;
        }
        if let Some(v) = parse_var("CTF_GAME_LENGTH")? {
            game.game_length = v;
        }
        if let Some(v) = parse_var("CTF_PAUSE_TIME")? {
            game.pause_time = v;
        }
        if let Some(v) = parse_var("CTF_TOURNAMENT_LENGTH")? {
            game.tournament_length = v;
        }
        if let Some(v) = parse_var("CTF_ROSTER_SIZE")? {
            game.roster_size = v;
        }
        if let Some(v) = parse_var("CTF_CLOSEST_OPPONENT_RADIUS")? {
            game.closest_opponent_radius = v;
        }
        if let Some(v) = parse_var("CTF_NO_TAG_RADIUS")? {
            game.no_tag_radius = v;
        }
        if let Some(v) = parse_var("CTF_TURN_STEP")? {
            game.turn_step = v;
        }
        if let Some(v) = parse_var("CTF_HOVER_HEIGHT")? {
            game.hover_height = v;
        }
        if let Some(v) = parse_var("CTF_FLAG_HEIGHT")? {
            game.flag_height = v;
        }
        if let Some(v) = parse_var("CTF_FLAG_EDGE_OFFSET")? {
            game.flag_edge_offset = v;
        }
        if let Some(v) = parse_var("CTF_JAIL_EDGE_OFFSET")? {
            game.jail_edge_offset = v;
        }
        if let Some(v) = parse_var("CTF_SPEED_SCALE")? {
            game.speed_scale = v;
        }
        if let Some(v) = parse_var("CTF_SPEED_STEP")? {
            game.speed_step = v;
        }

        Ok(game)
    }

    /// Reject values the match controller cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive(self.arena_size, "arena_size")?;
        positive(self.sensor_distance, "sensor_distance")?;
        positive(self.game_length, "game_length")?;
        non_negative(self.closest_opponent_radius, "closest_opponent_radius")?;
        non_negative(self.no_tag_radius, "no_tag_radius")?;
        non_negative(self.turn_step, "turn_step")?;
        non_negative(self.speed_scale, "speed_scale")?;
        non_negative(self.speed_step, "speed_step")?;
        if self.roster_size == 0 {
            return Err(ConfigError::OutOfRange("roster_size"));
        }
        if self.tournament_length == 0 {
            return Err(ConfigError::OutOfRange("tournament_length"));
        }
        Ok(())
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            arena_size: 50.0,
            sensor_distance: 20.0,
            closest_opponent_radius: 200.0,
            game_length: 500.0,
            pause_time: 75,
            tournament_length: 5,
            roster_size: 10,
            no_tag_radius: 5.0,
            turn_step: 0.03,
            hover_height: 0.2,
            flag_height: 1.0,
            flag_edge_offset: 5.0,
            jail_edge_offset: 5.0,
            speed_scale: 0.5,
            speed_step: 0.1,
        }
    }
}

fn parse_var<T: FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid(name)),
        Err(_) => Ok(None),
    }
}

// NaN fails both checks
fn positive(value: f32, name: &'static str) -> Result<(), ConfigError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange(name))
    }
}

fn non_negative(value: f32, name: &'static str) -> Result<(), ConfigError> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange(name))
    }
}

fn archetype_var(name: &'static str, default: Archetype) -> Result<Archetype, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.parse(),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),

    #[error("Value out of range: {0}")]
    OutOfRange(&'static str),

    #[error("Unknown archetype: {0}")]
    UnknownArchetype(String),

    #[error("{team} roster has {found} players, expected {expected}")]
    RosterSize { team: Team, expected: u32, found: u32 },

    #[error("{0} roster mixes archetypes")]
    MixedRoster(Team),
}
