//! Team flags and their no-tag zones

use nalgebra::Vector3;

use crate::host::{Body, Shape, SimulationHost};

use super::geometry::{clamp_to_arena, distance};
use super::player::PlayerHandle;
use super::team::Team;

/// Radius of the flag's collision sphere
pub const FLAG_RADIUS: f32 = 1.5;

/// A flag defended by `team`
#[derive(Debug, Clone)]
pub struct Flag {
    pub team: Team,
    pub position: Vector3<f32>,
    /// Where the flag last came to rest
    pub start_position: Vector3<f32>,
    pub carrier: Option<PlayerHandle>,
    pub no_tag_zone_active: bool,
}

impl Flag {
    /// Create a flag and register its body with the host
    pub fn new(team: Team, host: &mut impl SimulationHost) -> Self {
        host.register(Body::Flag(team), Shape::Sphere { radius: FLAG_RADIUS });
        Self {
            team,
            position: Vector3::zeros(),
            start_position: Vector3::zeros(),
            carrier: None,
            no_tag_zone_active: false,
        }
    }

    pub fn body(&self) -> Body {
        Body::Flag(self.team)
    }

    pub fn is_carried(&self) -> bool {
        self.carrier.is_some()
    }

    /// True once the flag is at least `threshold` away from where it rested
    pub fn has_moved(&self, threshold: f32) -> bool {
        distance(&self.position, &self.start_position) >= threshold
    }

    /// A flag in enemy territory has been captured
    pub fn is_offsides(&self) -> bool {
        self.team.is_offsides_at(self.position.x)
    }

    /// Move inside the arena and mirror the placement to the host
    pub fn move_to(&mut self, position: Vector3<f32>, half_extent: f32, host: &mut impl SimulationHost) {
        self.position = clamp_to_arena(position, half_extent, half_extent);
        host.place(self.body(), self.position);
    }

    /// Remove the no-tag zone. Returns whether one was active.
    pub fn kill_no_tag_zone(&mut self, host: &mut impl SimulationHost) -> bool {
        if !self.no_tag_zone_active {
            return false;
        }
        host.remove(Body::NoTagZone(self.team));
        self.no_tag_zone_active = false;
        true
    }

    /// Create a no-tag zone of `radius` at the current position
    pub fn make_no_tag_zone(&mut self, radius: f32, host: &mut impl SimulationHost) {
        let zone = Body::NoTagZone(self.team);
        host.register(zone, Shape::Sphere { radius });
        host.place(zone, self.position);
        self.no_tag_zone_active = true;
    }

    /// Rest the flag where it is: clear the carrier and rebuild the zone
    pub fn reset(&mut self, no_tag_radius: f32, host: &mut impl SimulationHost) {
        self.start_position = self.position;
        self.carrier = None;
        self.kill_no_tag_zone(host);
        self.make_no_tag_zone(no_tag_radius, host);
    }
}
