//! Deterministic reference host: Euler integration, overlap contacts, seeded
//! randomness and an in-memory text display.

use std::collections::HashMap;

use nalgebra::{Rotation3, Vector3};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::{Body, Contact, DisplaySlot, PhysicsStep, Shape, SimulationHost};

#[derive(Debug, Clone)]
struct BodyState {
    body: Body,
    shape: Shape,
    position: Vector3<f32>,
    rotation: Rotation3<f32>,
    velocity: Vector3<f32>,
}

/// Minimal engine used by the binary and the tests
pub struct KinematicHost {
    rng: ChaCha8Rng,
    time: f32,
    time_step: f32,
    bodies: Vec<BodyState>,
    display: HashMap<DisplaySlot, String>,
}

impl KinematicHost {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            time: 0.0,
            time_step: 1.0,
            bodies: Vec::new(),
            display: HashMap::new(),
        }
    }

    /// Use a different clock/integration step (default 1.0)
    pub fn with_time_step(mut self, time_step: f32) -> Self {
        self.time_step = time_step;
        self
    }

    pub fn display_text(&self, slot: DisplaySlot) -> Option<&str> {
        self.display.get(&slot).map(String::as_str)
    }

    pub fn position_of(&self, body: Body) -> Option<Vector3<f32>> {
        self.find(body).map(|idx| self.bodies[idx].position)
    }

    pub fn velocity_of(&self, body: Body) -> Option<Vector3<f32>> {
        self.find(body).map(|idx| self.bodies[idx].velocity)
    }

    pub fn rotation_of(&self, body: Body) -> Option<Rotation3<f32>> {
        self.find(body).map(|idx| self.bodies[idx].rotation)
    }

    pub fn is_registered(&self, body: Body) -> bool {
        self.find(body).is_some()
    }

    fn find(&self, body: Body) -> Option<usize> {
        self.bodies.iter().position(|b| b.body == body)
    }

    fn with_body(&mut self, body: Body, f: impl FnOnce(&mut BodyState)) {
        if let Some(idx) = self.find(body) {
            f(&mut self.bodies[idx]);
        }
    }
}

impl SimulationHost for KinematicHost {
    fn time(&self) -> f32 {
        self.time
    }

    fn random_vector(&mut self, bounds: Vector3<f32>) -> Vector3<f32> {
        Vector3::new(
            self.rng.gen::<f32>() * bounds.x,
            self.rng.gen::<f32>() * bounds.y,
            self.rng.gen::<f32>() * bounds.z,
        )
    }

    fn set_display_text(&mut self, slot: DisplaySlot, text: &str) {
        self.display.insert(slot, text.to_string());
    }

    fn register(&mut self, body: Body, shape: Shape) {
        if let Some(idx) = self.find(body) {
            self.bodies[idx].shape = shape;
            return;
        }
        self.bodies.push(BodyState {
            body,
            shape,
            position: Vector3::zeros(),
            rotation: Rotation3::identity(),
            velocity: Vector3::zeros(),
        });
    }

    fn remove(&mut self, body: Body) {
        self.bodies.retain(|b| b.body != body);
    }

    fn place(&mut self, body: Body, position: Vector3<f32>) {
        self.with_body(body, |b| b.position = position);
    }

    fn set_rotation(&mut self, body: Body, rotation: Rotation3<f32>) {
        self.with_body(body, |b| b.rotation = rotation);
    }

    fn set_velocity(&mut self, body: Body, velocity: Vector3<f32>) {
        self.with_body(body, |b| b.velocity = velocity);
    }

    fn advance(&mut self) -> PhysicsStep {
        let dt = self.time_step;
        self.time += dt;

        let mut step = PhysicsStep::default();
        for state in &mut self.bodies {
            if state.velocity == Vector3::zeros() {
                continue;
            }
            state.position += state.velocity * dt;
            step.moved.push((state.body, state.position));
        }

        for i in 0..self.bodies.len() {
            for j in (i + 1)..self.bodies.len() {
                let (a, b) = (&self.bodies[i], &self.bodies[j]);
                if shapes_overlap(&a.shape, &a.position, &b.shape, &b.position) {
                    step.contacts.push(Contact {
                        a: a.body,
                        b: b.body,
                    });
                }
            }
        }

        step
    }
}

fn shapes_overlap(sa: &Shape, pa: &Vector3<f32>, sb: &Shape, pb: &Vector3<f32>) -> bool {
    match (sa, sb) {
        (Shape::Sphere { radius: ra }, Shape::Sphere { radius: rb }) => {
            (pa - pb).norm() <= ra + rb
        }
        (Shape::Sphere { radius }, Shape::Cuboid { half_extents }) => {
            sphere_touches_box(pa, *radius, pb, half_extents)
        }
        (Shape::Cuboid { half_extents }, Shape::Sphere { radius }) => {
            sphere_touches_box(pb, *radius, pa, half_extents)
        }
        (Shape::Cuboid { half_extents: ha }, Shape::Cuboid { half_extents: hb }) => {
            let d = pa - pb;
            d.x.abs() <= ha.x + hb.x && d.y.abs() <= ha.y + hb.y && d.z.abs() <= ha.z + hb.z
        }
    }
}

fn sphere_touches_box(
    center: &Vector3<f32>,
    radius: f32,
    box_center: &Vector3<f32>,
    half: &Vector3<f32>,
) -> bool {
    let local = center - box_center;
    let closest = Vector3::new(
        local.x.clamp(-half.x, half.x),
        local.y.clamp(-half.y, half.y),
        local.z.clamp(-half.z, half.z),
    );
    (local - closest).norm() <= radius
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::team::Team;

    #[test]
    fn advance_integrates_velocity_and_ticks_clock() {
        let mut host = KinematicHost::new(7).with_time_step(0.5);
        host.register(Body::Flag(Team::Blue), Shape::Sphere { radius: 1.5 });
        host.place(Body::Flag(Team::Blue), Vector3::new(1.0, 1.0, 1.0));
        host.set_velocity(Body::Flag(Team::Blue), Vector3::new(2.0, 0.0, 0.0));

        let step = host.advance();
        assert_eq!(host.time(), 0.5);
        assert_eq!(step.moved.len(), 1);
        assert_eq!(step.moved[0].1, Vector3::new(2.0, 1.0, 1.0));
    }

    #[test]
    fn reports_sphere_and_box_contacts() {
        let mut host = KinematicHost::new(1);
        host.register(Body::Flag(Team::Red), Shape::Sphere { radius: 1.5 });
        host.register(
            Body::Jail(Team::Red),
            Shape::Cuboid {
                half_extents: Vector3::new(1.5, 0.5, 1.5),
            },
        );
        host.place(Body::Flag(Team::Red), Vector3::new(2.5, 0.0, 0.0));
        host.place(Body::Jail(Team::Red), Vector3::zeros());

        let step = host.advance();
        assert_eq!(
            step.contacts,
            vec![Contact {
                a: Body::Flag(Team::Red),
                b: Body::Jail(Team::Red),
            }]
        );

        host.place(Body::Flag(Team::Red), Vector3::new(10.0, 0.0, 0.0));
        assert!(host.advance().contacts.is_empty());
    }

    #[test]
    fn same_seed_same_vectors() {
        let bounds = Vector3::new(10.0, 0.0, 25.0);
        let mut a = KinematicHost::new(99);
        let mut b = KinematicHost::new(99);
        for _ in 0..5 {
            let va = a.random_vector(bounds);
            assert_eq!(va, b.random_vector(bounds));
            assert!(va.x >= 0.0 && va.x <= 10.0);
            assert_eq!(va.y, 0.0);
        }
    }
}
