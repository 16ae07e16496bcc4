//! Game rules: flag handling, tagging, jail and per-tick player movement

use nalgebra::Vector3;
use tracing::debug;

use crate::host::{Body, Contact, PhysicsStep, SimulationHost};
use crate::protocol::GameEvent;

use super::geometry::distance;
use super::player::PlayerHandle;
use super::policy::DecisionPolicy;
use super::sensing::Senses;
use super::team::Team;
use super::world::World;

impl World {
    /// `handle` grabs the flag of `flag_team` if the rules allow it
    pub fn pick_up(&mut self, handle: PlayerHandle, flag_team: Team, events: &mut Vec<GameEvent>) -> bool {
        let Some(player) = self.players.get_mut(handle.0) else {
            return false;
        };
        let flag = &mut self.flags[flag_team];
        if flag.team == player.team || flag.is_carried() || player.in_jail || player.has_flag() {
            return false;
        }

        flag.carrier = Some(handle);
        player.carrying = Some(flag_team);
        debug!(player = %handle, team = %player.team, flag = %flag_team, "Flag picked up");
        events.push(GameEvent::FlagPickedUp {
            player: player.reference(),
            flag: flag_team,
        });
        true
    }

    /// Release whatever flag `handle` carries. The flag stays where it is.
    pub fn drop_flag(&mut self, handle: PlayerHandle, events: &mut Vec<GameEvent>) -> Option<Team> {
        let player = self.players.get_mut(handle.0)?;
        let flag_team = player.carrying.take()?;
        self.flags[flag_team].carrier = None;

        debug!(player = %handle, flag = %flag_team, "Flag dropped");
        events.push(GameEvent::FlagDropped {
            player: player.reference(),
            flag: flag_team,
        });
        Some(flag_team)
    }

    /// Close to a flag that has not left its resting place
    pub fn in_no_tag_zone(&self, handle: PlayerHandle) -> bool {
        let radius = self.config.no_tag_radius;
        let Some(senses) = Senses::new(self, handle) else {
            return false;
        };
        senses.sense_my_flag().is_some_and(|flag| {
            distance(&senses.me().position, &flag.position) <= radius && !flag.has_moved(radius)
        })
    }

    /// `attacker` tags `defender`. Only offsides opponents go to jail, and
    /// never while the attacker guards its own resting flag. Jailed players
    /// neither tag nor get tagged.
    pub fn tag(
        &mut self,
        attacker: PlayerHandle,
        defender: PlayerHandle,
        host: &mut impl SimulationHost,
        events: &mut Vec<GameEvent>,
    ) -> bool {
        let (Some(a), Some(d)) = (self.player(attacker), self.player(defender)) else {
            return false;
        };
        if a.team == d.team || a.in_jail || d.in_jail || !d.is_offsides() {
            return false;
        }
        if self.in_no_tag_zone(attacker) {
            return false;
        }

        events.push(GameEvent::PlayerTagged {
            tagger: a.reference(),
            target: d.reference(),
        });
        self.drop_flag(defender, events);
        self.go_to_jail(defender, host, events)
    }

    /// Lock `handle` up next to its team's jail
    pub fn go_to_jail(
        &mut self,
        handle: PlayerHandle,
        host: &mut impl SimulationHost,
        events: &mut Vec<GameEvent>,
    ) -> bool {
        let jitter = host.random_vector(Vector3::new(1.0, 0.0, 1.0)) - Vector3::new(0.5, -0.5, 0.5);
        let Some(player) = self.players.get_mut(handle.0) else {
            return false;
        };
        if player.in_jail {
            return false;
        }

        let team = player.team;
        player.in_jail = true;
        player.jailed_position = self.jails[team].position + jitter;
        let cell = player.jailed_position;
        player.place(cell, host);
        player.halt(host);
        self.captured[team] += 1;

        debug!(player = %handle, team = %team, captured = self.captured[team], "Player jailed");
        events.push(GameEvent::PlayerJailed {
            player: player.reference(),
        });
        true
    }

    /// Release `handle` to its home side
    pub fn get_freed(&mut self, handle: PlayerHandle, host: &mut impl SimulationHost) -> bool {
        let Some(player) = self.players.get_mut(handle.0) else {
            return false;
        };
        if !player.in_jail {
            return false;
        }
        player.in_jail = false;
        let team = player.team;
        self.captured[team] = self.captured[team].saturating_sub(1);
        self.move_to_home_side(handle, host);
        true
    }

    /// Free every jailed player of `team`. Returns how many were released.
    pub fn jail_break(
        &mut self,
        team: Team,
        host: &mut impl SimulationHost,
        events: &mut Vec<GameEvent>,
    ) -> u32 {
        let jailed: Vec<PlayerHandle> = self
            .team_players(team)
            .filter(|p| p.in_jail)
            .map(|p| p.handle)
            .collect();

        let mut freed = 0;
        for handle in jailed {
            if self.get_freed(handle, host) {
                freed += 1;
            }
        }

        if freed > 0 {
            debug!(team = %team, freed, "Jail break");
            events.push(GameEvent::JailBreak { team, freed });
        }
        freed
    }

    /// A free player touching its own team's jail breaks everyone out
    pub fn touch_jail(
        &mut self,
        handle: PlayerHandle,
        jail_team: Team,
        host: &mut impl SimulationHost,
        events: &mut Vec<GameEvent>,
    ) -> u32 {
        let rescuer = self
            .player(handle)
            .is_some_and(|p| !p.in_jail && p.team == jail_team);
        if !rescuer {
            return 0;
        }
        self.jail_break(jail_team, host, events)
    }

    /// Return a player to a fresh start-of-match state
    pub fn reset_player(
        &mut self,
        handle: PlayerHandle,
        host: &mut impl SimulationHost,
        events: &mut Vec<GameEvent>,
    ) {
        self.drop_flag(handle, events);
        self.move_to_home_side(handle, host);
        if let Some(player) = self.players.get_mut(handle.0) {
            player.in_jail = false;
            player.at_edge = false;
            player.turning_left = false;
            player.turning_right = false;
            player.halt(host);
        }
    }

    /// Decide and move one player for this tick
    pub fn iterate_player(&mut self, handle: PlayerHandle, host: &mut impl SimulationHost) {
        let Some(player) = self.players.get(handle.0) else {
            return;
        };
        if player.in_jail {
            let cell = player.jailed_position;
            if let Some(player) = self.players.get_mut(handle.0) {
                player.place(cell, host);
            }
            return;
        }

        let decision = match Senses::new(self, handle) {
            Some(senses) => senses.me().archetype.decide(&senses),
            None => return,
        };

        let half = self.config.half_extent();
        let player = &mut self.players[handle.0];
        player.apply_decision(decision, self.config.turn_step, host);

        if let Some(flag_team) = player.carrying {
            self.flags[flag_team].move_to(player.position, half, host);
        }
        player.advance(&self.config, host);
    }

    /// Take the host's integrated positions and resolve contacts. Contacts
    /// are ignored while `live` is false.
    pub fn apply_physics(
        &mut self,
        step: PhysicsStep,
        live: bool,
        host: &mut impl SimulationHost,
        events: &mut Vec<GameEvent>,
    ) {
        let half = self.config.half_extent();
        for (body, position) in step.moved {
            match body {
                Body::Player(handle) => {
                    if let Some(player) = self.players.get_mut(handle.0) {
                        player.position = position;
                    }
                }
                Body::Flag(team) => self.flags[team].move_to(position, half, host),
                Body::Jail(_) | Body::NoTagZone(_) => {}
            }
        }

        if live {
            for contact in step.contacts {
                self.handle_contact(contact, host, events);
            }
        }
    }

    /// Dispatch one contact to the matching rule
    pub fn handle_contact(
        &mut self,
        contact: Contact,
        host: &mut impl SimulationHost,
        events: &mut Vec<GameEvent>,
    ) {
        match (contact.a, contact.b) {
            (Body::Player(p), Body::Flag(team)) | (Body::Flag(team), Body::Player(p)) => {
                self.pick_up(p, team, events);
            }
            (Body::Player(p), Body::Jail(team)) | (Body::Jail(team), Body::Player(p)) => {
                self.touch_jail(p, team, host, events);
            }
            (Body::Player(a), Body::Player(b)) => {
                self.tag(a, b, host, events);
                self.tag(b, a, host, events);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::game::policy::Archetype;
    use crate::host::KinematicHost;

    fn setup(players: &[(Team, [f32; 2])]) -> (World, KinematicHost) {
        let mut host = KinematicHost::new(42);
        let mut world = World::new(GameConfig::default(), &mut host);
        for (i, (team, [x, z])) in players.iter().enumerate() {
            let handle = world.spawn_player(i as u32 + 1, *team, Archetype::Idle, &mut host);
            world.players[handle.0].place(Vector3::new(*x, 0.2, *z), &mut host);
        }
        (world, host)
    }

    #[test]
    fn pick_up_requires_enemy_free_flag() {
        let (mut world, _host) = setup(&[(Team::Blue, [18.0, 0.0]), (Team::Red, [19.0, 0.0])]);
        let mut events = Vec::new();

        assert!(!world.pick_up(PlayerHandle(1), Team::Red, &mut events));
        assert!(world.pick_up(PlayerHandle(0), Team::Red, &mut events));
        assert_eq!(world.flags[Team::Red].carrier, Some(PlayerHandle(0)));
        assert_eq!(world.players[0].carrying, Some(Team::Red));

        // Already carried
        assert!(!world.pick_up(PlayerHandle(0), Team::Red, &mut events));
        assert_eq!(events.len(), 1);

        assert_eq!(world.drop_flag(PlayerHandle(0), &mut events), Some(Team::Red));
        assert_eq!(world.flags[Team::Red].carrier, None);
        assert_eq!(world.drop_flag(PlayerHandle(0), &mut events), None);
    }

    #[test]
    fn jailed_players_cannot_pick_up() {
        let (mut world, _host) = setup(&[(Team::Blue, [18.0, 0.0])]);
        world.players[0].in_jail = true;
        assert!(!world.pick_up(PlayerHandle(0), Team::Red, &mut Vec::new()));
    }

    #[test]
    fn tagging_jails_only_offsides_opponents() {
        let (mut world, mut host) = setup(&[
            (Team::Red, [5.0, 10.0]),
            (Team::Blue, [4.0, 10.0]),
            (Team::Red, [6.0, 10.0]),
        ]);
        let mut events = Vec::new();

        // Same team
        assert!(!world.tag(PlayerHandle(0), PlayerHandle(2), &mut host, &mut events));
        // Red defender at home
        assert!(!world.tag(PlayerHandle(1), PlayerHandle(0), &mut host, &mut events));
        assert!(!world.players[0].in_jail);

        world.players[1].carrying = Some(Team::Red);
        world.flags[Team::Red].carrier = Some(PlayerHandle(1));
        assert!(world.tag(PlayerHandle(0), PlayerHandle(1), &mut host, &mut events));

        let blue = &world.players[1];
        assert!(blue.in_jail);
        assert_eq!(blue.carrying, None);
        assert_eq!(world.flags[Team::Red].carrier, None);
        assert_eq!(world.captured[Team::Blue], 1);
        let jail = world.jails[Team::Blue].position;
        assert!((blue.position.x - jail.x).abs() <= 0.5);
        assert!((blue.position.z - jail.z).abs() <= 0.5);
        assert!(matches!(events.last(), Some(GameEvent::PlayerJailed { .. })));
    }

    #[test]
    fn no_tag_zone_protects_offsides_attackers_guarding_home_flag() {
        let (mut world, mut host) = setup(&[(Team::Red, [0.0, 0.0]), (Team::Blue, [0.0, 0.0])]);
        let red_flag = world.flags[Team::Red].position;
        world.players[0].place(red_flag + Vector3::new(-2.0, -0.8, 0.0), &mut host);
        world.players[1].place(red_flag + Vector3::new(-2.5, -0.8, 0.0), &mut host);
        let mut events = Vec::new();

        assert!(world.in_no_tag_zone(PlayerHandle(0)));
        assert!(!world.tag(PlayerHandle(0), PlayerHandle(1), &mut host, &mut events));
        assert!(!world.players[1].in_jail);

        // Once the flag has left its resting place the zone is gone
        let moved = red_flag + Vector3::new(-6.0, 0.0, 0.0);
        world.flags[Team::Red].move_to(moved, 25.0, &mut host);
        assert!(!world.in_no_tag_zone(PlayerHandle(0)));
        assert!(world.tag(PlayerHandle(0), PlayerHandle(1), &mut host, &mut events));
    }

    #[test]
    fn jail_break_frees_the_whole_team() {
        let (mut world, mut host) = setup(&[
            (Team::Red, [-5.0, 0.0]),
            (Team::Red, [-6.0, 0.0]),
            (Team::Red, [-7.0, 0.0]),
            (Team::Blue, [-8.0, 0.0]),
            (Team::Red, [10.0, 0.0]),
            (Team::Blue, [9.0, 0.0]),
        ]);
        let mut events = Vec::new();
        for h in 0..3 {
            assert!(world.tag(PlayerHandle(3), PlayerHandle(h), &mut host, &mut events));
        }
        assert!(world.tag(PlayerHandle(4), PlayerHandle(5), &mut host, &mut events));
        assert_eq!(world.captured[Team::Red], 3);
        assert_eq!(world.captured[Team::Blue], 1);

        // Jailed players touching their own jail do nothing
        assert_eq!(world.touch_jail(PlayerHandle(0), Team::Red, &mut host, &mut events), 0);
        // A blue player touching the red jail does nothing
        assert_eq!(world.touch_jail(PlayerHandle(3), Team::Red, &mut host, &mut events), 0);

        assert_eq!(world.touch_jail(PlayerHandle(4), Team::Red, &mut host, &mut events), 3);
        assert_eq!(world.captured[Team::Red], 0);
        for h in 0..3 {
            let p = &world.players[h];
            assert!(!p.in_jail);
            assert!(!p.is_offsides());
        }
        // The blue prisoner stays put
        assert!(world.players[5].in_jail);
        assert_eq!(world.captured[Team::Blue], 1);
        assert!(matches!(
            events.last(),
            Some(GameEvent::JailBreak { team: Team::Red, freed: 3 })
        ));
    }

    #[test]
    fn carried_flag_follows_carrier() {
        let (mut world, mut host) = setup(&[(Team::Blue, [15.0, 3.0])]);
        world.pick_up(PlayerHandle(0), Team::Red, &mut Vec::new());
        world.iterate_player(PlayerHandle(0), &mut host);
        let flag = world.flags[Team::Red].position;
        assert_eq!((flag.x, flag.z), (15.0, 3.0));
    }

    #[test]
    fn jailed_players_hold_their_cell() {
        let (mut world, mut host) = setup(&[(Team::Blue, [5.0, 0.0]), (Team::Red, [6.0, 0.0])]);
        let mut events = Vec::new();
        world.tag(PlayerHandle(1), PlayerHandle(0), &mut host, &mut events);
        let cell = world.players[0].jailed_position;

        world.players[0].position = Vector3::new(1.0, 0.2, 1.0);
        world.iterate_player(PlayerHandle(0), &mut host);
        assert_eq!(world.players[0].position, cell);
    }

    #[test]
    fn jailed_attackers_cannot_tag() {
        let (mut world, mut host) = setup(&[
            (Team::Blue, [0.3, 0.0]),
            (Team::Red, [1.0, 0.0]),
            (Team::Red, [-0.3, 0.0]),
        ]);
        let mut events = Vec::new();
        let contact = |a: usize, b: usize| Contact {
            a: Body::Player(PlayerHandle(a)),
            b: Body::Player(PlayerHandle(b)),
        };

        // Both contacts were observed before either is resolved
        world.handle_contact(contact(0, 1), &mut host, &mut events);
        world.handle_contact(contact(0, 2), &mut host, &mut events);

        assert!(world.players[0].in_jail);
        assert!(!world.players[1].in_jail);
        assert!(!world.players[2].in_jail);
        assert_eq!(world.captured[Team::Blue], 1);
        assert_eq!(world.captured[Team::Red], 0);
    }

    #[test]
    fn player_contacts_tag_both_ways() {
        let (mut world, mut host) = setup(&[(Team::Blue, [3.0, 0.0]), (Team::Red, [3.5, 0.0])]);
        let mut events = Vec::new();
        world.handle_contact(
            Contact {
                a: Body::Player(PlayerHandle(1)),
                b: Body::Player(PlayerHandle(0)),
            },
            &mut host,
            &mut events,
        );
        assert!(world.players[0].in_jail);
        assert!(!world.players[1].in_jail);
    }
}
