//! Player agents: motion state, steering and per-tick movement

use std::fmt;

use nalgebra::{Rotation3, Vector3};
use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::host::{Body, SimulationHost};
use crate::protocol::PlayerRef;

use super::geometry::{clamp_to_arena, heading_of, pushing_against_edge, yaw_rotation};
use super::policy::{Archetype, Decision, Turn};
use super::team::Team;

/// Radius of a player's collision sphere
pub const PLAYER_RADIUS: f32 = 0.5;

/// Index of a player in the world roster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerHandle(pub usize);

impl fmt::Display for PlayerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct Player {
    pub handle: PlayerHandle,
    /// Number assigned by the tournament's id partition
    pub id: u32,
    pub team: Team,
    pub archetype: Archetype,
    pub position: Vector3<f32>,
    pub heading: Vector3<f32>,
    /// Steering angle in radians
    pub angle: f32,
    pub rotation: Rotation3<f32>,
    /// Always within [0, 1]
    pub speed: f32,
    /// Team of the flag being carried
    pub carrying: Option<Team>,
    pub in_jail: bool,
    pub jailed_position: Vector3<f32>,
    pub at_edge: bool,
    pub turning_left: bool,
    pub turning_right: bool,
}

impl Player {
    pub fn new(handle: PlayerHandle, id: u32, team: Team, archetype: Archetype) -> Self {
        Self {
            handle,
            id,
            team,
            archetype,
            position: Vector3::zeros(),
            heading: Vector3::x(),
            angle: 0.0,
            rotation: Rotation3::identity(),
            speed: 0.0,
            carrying: None,
            in_jail: false,
            jailed_position: Vector3::zeros(),
            at_edge: false,
            turning_left: false,
            turning_right: false,
        }
    }

    pub fn body(&self) -> Body {
        Body::Player(self.handle)
    }

    pub fn reference(&self) -> PlayerRef {
        PlayerRef {
            team: self.team,
            id: self.id,
            archetype: self.archetype,
        }
    }

    pub fn is_offsides(&self) -> bool {
        self.team.is_offsides_at(self.position.x)
    }

    pub fn has_flag(&self) -> bool {
        self.carrying.is_some()
    }

    /// Nearest point on the home side: here if already home, else the same
    /// spot moved onto the midline
    pub fn home_location(&self) -> Vector3<f32> {
        if self.is_offsides() {
            Vector3::new(0.0, self.position.y, self.position.z)
        } else {
            self.position
        }
    }

    /// Nearest point on the enemy side, mirroring [`Player::home_location`]
    pub fn other_home_location(&self) -> Vector3<f32> {
        if self.is_offsides() {
            self.position
        } else {
            Vector3::new(0.0, self.position.y, self.position.z)
        }
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed.clamp(0.0, 1.0);
    }

    pub fn accelerate(&mut self, config: &GameConfig) {
        self.set_speed(self.speed + config.speed_step);
    }

    pub fn decelerate(&mut self, config: &GameConfig) {
        self.set_speed(self.speed - config.speed_step);
    }

    /// Replace the steering angle and push the orientation to the host
    pub fn set_angle(&mut self, angle: f32, host: &mut impl SimulationHost) {
        self.angle = angle;
        self.rotation = yaw_rotation(angle);
        host.set_rotation(self.body(), self.rotation);
    }

    pub fn turn_left(&mut self, step: f32, host: &mut impl SimulationHost) {
        self.set_angle(self.angle - step, host);
    }

    pub fn turn_right(&mut self, step: f32, host: &mut impl SimulationHost) {
        self.set_angle(self.angle + step, host);
    }

    /// Keep turning left every tick until cleared
    pub fn set_turning_left(&mut self, turning: bool) {
        self.turning_left = turning;
    }

    pub fn set_turning_right(&mut self, turning: bool) {
        self.turning_right = turning;
    }

    pub fn apply_decision(&mut self, decision: Decision, turn_step: f32, host: &mut impl SimulationHost) {
        match decision.turn {
            Turn::Left => self.turn_left(turn_step, host),
            Turn::Right => self.turn_right(turn_step, host),
            Turn::None => {}
        }
        self.set_speed(decision.speed);
    }

    /// Stop in place and tell the host
    pub fn halt(&mut self, host: &mut impl SimulationHost) {
        self.speed = 0.0;
        host.set_velocity(self.body(), Vector3::zeros());
    }

    /// Teleport, mirroring the placement to the host
    pub fn place(&mut self, position: Vector3<f32>, host: &mut impl SimulationHost) {
        self.position = position;
        host.place(self.body(), position);
    }

    /// Free movement for one tick. Jail and carried-flag handling happen in
    /// the world before this runs.
    pub fn advance(&mut self, config: &GameConfig, host: &mut impl SimulationHost) {
        if self.turning_left {
            self.turn_left(config.turn_step, host);
        }
        if self.turning_right {
            self.turn_right(config.turn_step, host);
        }

        let half = config.half_extent();
        self.at_edge = pushing_against_edge(&self.position, &self.heading, half);
        if self.at_edge {
            self.speed = 0.0;
        }

        self.heading = heading_of(&self.rotation);
        host.set_velocity(self.body(), self.heading * (config.speed_scale * self.speed));

        let mut position = clamp_to_arena(self.position, half, half);
        position.y = config.hover_height;
        self.place(position, host);
    }
}
