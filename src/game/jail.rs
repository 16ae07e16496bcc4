//! Jails hold the tagged players of one team

use nalgebra::Vector3;

use crate::host::{Body, Shape, SimulationHost};

use super::team::Team;

/// Half extents of the jail cell (a 3 x 1 x 3 box)
pub const JAIL_HALF_EXTENTS: [f32; 3] = [1.5, 0.5, 1.5];

/// Jail for the players of `team`. Immovable once built.
#[derive(Debug, Clone)]
pub struct Jail {
    pub team: Team,
    pub position: Vector3<f32>,
}

impl Jail {
    pub fn new(team: Team, position: Vector3<f32>, host: &mut impl SimulationHost) -> Self {
        let body = Body::Jail(team);
        let [x, y, z] = JAIL_HALF_EXTENTS;
        host.register(
            body,
            Shape::Cuboid {
                half_extents: Vector3::new(x, y, z),
            },
        );
        host.place(body, position);
        Self { team, position }
    }

    pub fn body(&self) -> Body {
        Body::Jail(self.team)
    }
}
