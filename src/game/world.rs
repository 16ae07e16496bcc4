//! The arena: every flag, jail and player of the current tournament

use nalgebra::Vector3;
use tracing::debug;

use crate::config::GameConfig;
use crate::host::{Body, Shape, SimulationHost};

use super::flag::Flag;
use super::jail::Jail;
use super::player::{Player, PlayerHandle, PLAYER_RADIUS};
use super::policy::Archetype;
use super::team::{PerTeam, Team};

/// Upper bound for the random initial steering angle
const FULL_TURN: f32 = 6.29;

pub struct World {
    pub config: GameConfig,
    pub flags: PerTeam<Flag>,
    pub jails: PerTeam<Jail>,
    pub players: Vec<Player>,
    /// Jailed players per team
    pub captured: PerTeam<u32>,
}

impl World {
    /// Build the static scenery: both jails and both flags
    pub fn new(config: GameConfig, host: &mut impl SimulationHost) -> Self {
        let corner = config.half_extent() - config.jail_edge_offset;
        // Each team's jail sits in the far corner of enemy territory
        let jails = PerTeam::new(
            Jail::new(Team::Blue, Vector3::new(corner, 0.0, corner), host),
            Jail::new(Team::Red, Vector3::new(-corner, 0.0, -corner), host),
        );
        let flags = PerTeam::from_fn(|team| Flag::new(team, host));

        let mut world = Self {
            config,
            flags,
            jails,
            players: Vec::new(),
            captured: PerTeam::default(),
        };
        world.place_flags(host);
        world
    }

    /// Put both flags back near their home edges with a shared random z
    /// offset and rebuild their no-tag zones
    pub fn place_flags(&mut self, host: &mut impl SimulationHost) {
        let half = self.config.half_extent();
        let offset =
            host.random_vector(Vector3::new(0.0, 0.0, half)) - Vector3::new(0.0, 0.0, half / 2.0);
        let x = half - self.config.flag_edge_offset;

        for team in Team::ALL {
            let home = Vector3::new(team.home_sign() * x, self.config.flag_height, 0.0);
            let flag = &mut self.flags[team];
            flag.move_to(home + offset, half, host);
            flag.reset(self.config.no_tag_radius, host);
            debug!(team = %team, x = flag.position.x, z = flag.position.z, "Flag placed");
        }
    }

    /// Add a player on its home side facing a random direction
    pub fn spawn_player(
        &mut self,
        id: u32,
        team: Team,
        archetype: Archetype,
        host: &mut impl SimulationHost,
    ) -> PlayerHandle {
        let handle = PlayerHandle(self.players.len());
        host.register(Body::Player(handle), Shape::Sphere { radius: PLAYER_RADIUS });
        self.players.push(Player::new(handle, id, team, archetype));

        self.move_to_home_side(handle, host);
        let angle = host.random_vector(Vector3::new(FULL_TURN, 0.0, 0.0)).x;
        if let Some(player) = self.player_mut(handle) {
            player.set_angle(angle, host);
        }
        handle
    }

    pub fn player(&self, handle: PlayerHandle) -> Option<&Player> {
        self.players.get(handle.0)
    }

    pub fn player_mut(&mut self, handle: PlayerHandle) -> Option<&mut Player> {
        self.players.get_mut(handle.0)
    }

    pub fn handles(&self) -> impl Iterator<Item = PlayerHandle> {
        (0..self.players.len()).map(PlayerHandle)
    }

    pub fn team_players(&self, team: Team) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(move |p| p.team == team)
    }

    /// Random spot in the home half, away from the midline
    pub fn move_to_home_side(&mut self, handle: PlayerHandle, host: &mut impl SimulationHost) {
        let size = self.config.arena_size;
        let quarter = size / 4.0;
        let hover = self.config.hover_height;
        let r = host.random_vector(Vector3::new(quarter, 0.0, size));

        if let Some(player) = self.players.get_mut(handle.0) {
            let x = player.team.home_sign() * (quarter + r.x);
            player.place(Vector3::new(x, hover, r.z - size / 2.0), host);
        }
    }

    /// True when every rostered player of `team` is jailed
    pub fn all_captured(&self, team: Team) -> bool {
        self.captured[team] >= self.config.roster_size
    }
}
