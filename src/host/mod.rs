//! Simulation host capabilities
//!
//! The game core never integrates motion, renders, or generates randomness on
//! its own. It places bodies, sets their velocity and orientation, reads the
//! clock, and asks the host to advance physics. The host answers with the
//! integrated positions and the contacts it observed.

pub mod kinematic;

use nalgebra::{Rotation3, Vector3};

use crate::game::player::PlayerHandle;
use crate::game::team::Team;

pub use kinematic::KinematicHost;

/// A physical body the core registers with the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Body {
    Player(PlayerHandle),
    Flag(Team),
    Jail(Team),
    /// Marker sphere around a resting flag
    NoTagZone(Team),
}

/// Collision shape of a body
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Sphere { radius: f32 },
    Cuboid { half_extents: Vector3<f32> },
}

/// Two registered bodies whose shapes intersect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contact {
    pub a: Body,
    pub b: Body,
}

/// Outcome of one physics step
#[derive(Debug, Clone, Default)]
pub struct PhysicsStep {
    /// Bodies whose position changed during integration
    pub moved: Vec<(Body, Vector3<f32>)>,
    /// Intersections after integration
    pub contacts: Vec<Contact>,
}

/// On-screen text slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisplaySlot {
    /// Win/tie tallies, or the tournament banner at the end
    Scoreboard,
    /// Time remaining in the current match
    Clock,
}

/// Everything the core needs from the engine it runs inside
pub trait SimulationHost {
    /// Monotonic simulation clock
    fn time(&self) -> f32;

    /// Uniformly distributed vector with each component in `[0, bound]`
    fn random_vector(&mut self, bounds: Vector3<f32>) -> Vector3<f32>;

    /// Replace the text shown in `slot`
    fn set_display_text(&mut self, slot: DisplaySlot, text: &str);

    /// Register a body so it takes part in physics and contact detection
    fn register(&mut self, body: Body, shape: Shape);

    /// Remove a body from the host
    fn remove(&mut self, body: Body);

    /// Teleport a body
    fn place(&mut self, body: Body, position: Vector3<f32>);

    /// Set a body's absolute orientation
    fn set_rotation(&mut self, body: Body, rotation: Rotation3<f32>);

    /// Set the velocity integrated on the next `advance`
    fn set_velocity(&mut self, body: Body, velocity: Vector3<f32>);

    /// Integrate one step and report contacts
    fn advance(&mut self) -> PhysicsStep;
}
