//! What a player can perceive of the world around it

use nalgebra::Vector3;

use super::flag::Flag;
use super::geometry::{distance, signed_angle_to};
use super::jail::Jail;
use super::player::{Player, PlayerHandle};
use super::team::Team;
use super::world::World;

/// Anything with a position a player can steer toward
pub trait Located {
    fn location(&self) -> Vector3<f32>;
}

impl Located for Flag {
    fn location(&self) -> Vector3<f32> {
        self.position
    }
}

impl Located for Jail {
    fn location(&self) -> Vector3<f32> {
        self.position
    }
}

impl Located for Player {
    fn location(&self) -> Vector3<f32> {
        self.position
    }
}

impl Located for Vector3<f32> {
    fn location(&self) -> Vector3<f32> {
        *self
    }
}

/// Read-only view of the world from one player's seat
pub struct Senses<'a> {
    world: &'a World,
    me: &'a Player,
}

impl<'a> Senses<'a> {
    pub fn new(world: &'a World, handle: PlayerHandle) -> Option<Self> {
        let me = world.players.get(handle.0)?;
        Some(Self { world, me })
    }

    pub fn me(&self) -> &'a Player {
        self.me
    }

    fn in_range(&self, pos: &Vector3<f32>, radius: f32) -> bool {
        distance(&self.me.position, pos) < radius
    }

    fn sense_flag(&self, team: Team) -> Option<&'a Flag> {
        let flag = &self.world.flags[team];
        self.in_range(&flag.position, self.world.config.sensor_distance)
            .then_some(flag)
    }

    fn sense_jail(&self, team: Team) -> Option<&'a Jail> {
        let jail = &self.world.jails[team];
        self.in_range(&jail.position, self.world.config.sensor_distance)
            .then_some(jail)
    }

    fn sense_players(&self, team: Team) -> Vec<&'a Player> {
        let radius = self.world.config.sensor_distance;
        self.world
            .players
            .iter()
            .filter(|p| p.team == team && p.handle != self.me.handle && !p.in_jail)
            .filter(|p| self.in_range(&p.position, radius))
            .collect()
    }

    /// Own flag, if within sensor range
    pub fn sense_my_flag(&self) -> Option<&'a Flag> {
        self.sense_flag(self.me.team)
    }

    /// Enemy flag, if within sensor range
    pub fn sense_other_flag(&self) -> Option<&'a Flag> {
        self.sense_flag(self.me.team.opponent())
    }

    pub fn sense_my_jail(&self) -> Option<&'a Jail> {
        self.sense_jail(self.me.team)
    }

    pub fn sense_other_jail(&self) -> Option<&'a Jail> {
        self.sense_jail(self.me.team.opponent())
    }

    /// Free teammates within sensor range
    pub fn sense_my_team(&self) -> Vec<&'a Player> {
        self.sense_players(self.me.team)
    }

    /// Free opponents within sensor range
    pub fn sense_other_team(&self) -> Vec<&'a Player> {
        self.sense_players(self.me.team.opponent())
    }

    /// Nearest free opponent within the wide search radius
    pub fn closest_opponent(&self) -> Option<&'a Player> {
        let radius = self.world.config.closest_opponent_radius;
        let opponent = self.me.team.opponent();
        self.world
            .players
            .iter()
            .filter(|p| p.team == opponent && !p.in_jail)
            .map(|p| (distance(&self.me.position, &p.position), p))
            .filter(|(d, _)| *d < radius)
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, p)| p)
    }

    /// Signed steering angle toward `target`, positive means turn right
    pub fn angle_to(&self, target: &Vector3<f32>) -> f32 {
        signed_angle_to(
            &self.me.heading,
            &self.me.position,
            target,
            &self.me.rotation.transpose(),
        )
    }

    /// Steering angle toward an optionally sensed object
    pub fn angle_to_object<T: Located + ?Sized>(&self, object: Option<&T>) -> Option<f32> {
        object.map(|o| self.angle_to(&o.location()))
    }

    /// True while pushing against the arena boundary
    pub fn detect_edge(&self) -> bool {
        self.me.at_edge
    }
}
