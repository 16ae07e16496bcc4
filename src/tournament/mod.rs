//! Tournament: a fixed number of matches between two rosters

pub mod identity;
pub mod runner;

pub use identity::IdAssigner;
pub use runner::{RunnerError, RunnerHandle, TournamentRunner};

use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use crate::config::{ConfigError, GameConfig};
use crate::game::policy::Archetype;
use crate::game::r#match::{MatchController, MatchPhase};
use crate::game::snapshot::{scoreboard_text, tournament_banner};
use crate::game::team::{PerTeam, Team};
use crate::host::{DisplaySlot, SimulationHost};
use crate::protocol::{GameEvent, MatchOutcome, MatchReport, TournamentEvent, TournamentReport};

/// Win and tie tallies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TournamentState {
    pub wins: PerTeam<u32>,
    pub ties: u32,
    pub matches_target: u32,
}

impl TournamentState {
    pub fn new(matches_target: u32) -> Self {
        Self {
            wins: PerTeam::default(),
            ties: 0,
            matches_target,
        }
    }

    pub fn played(&self) -> u32 {
        self.wins.blue + self.wins.red + self.ties
    }

    pub fn is_complete(&self) -> bool {
        self.played() >= self.matches_target
    }

    pub fn record(&mut self, outcome: MatchOutcome) {
        match outcome.winner() {
            Some(team) => self.wins[team] += 1,
            None => self.ties += 1,
        }
    }

    /// Team with strictly more wins
    pub fn leader(&self) -> Option<Team> {
        match self.wins.blue.cmp(&self.wins.red) {
            std::cmp::Ordering::Greater => Some(Team::Blue),
            std::cmp::Ordering::Less => Some(Team::Red),
            std::cmp::Ordering::Equal => None,
        }
    }
}

pub struct Tournament {
    id: Uuid,
    started_at: DateTime<Utc>,
    archetypes: PerTeam<Archetype>,
    state: TournamentState,
    controller: MatchController,
    ticks: u64,
    reports: Vec<MatchReport>,
}

impl Tournament {
    /// Field `roster_size` players of `blue` then `roster_size` of `red`
    pub fn new(
        config: GameConfig,
        blue: Archetype,
        red: Archetype,
        host: &mut impl SimulationHost,
    ) -> Result<Self, ConfigError> {
        let roster_size = config.roster_size as usize;
        let roster: Vec<(Team, Archetype)> = std::iter::repeat((Team::Blue, blue))
            .take(roster_size)
            .chain(std::iter::repeat((Team::Red, red)).take(roster_size))
            .collect();
        Self::with_roster(config, &roster, host)
    }

    /// Create players in the given order. Each team must field exactly
    /// `roster_size` players of a single archetype.
    pub fn with_roster(
        config: GameConfig,
        roster: &[(Team, Archetype)],
        host: &mut impl SimulationHost,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut archetypes: PerTeam<Option<Archetype>> = PerTeam::default();
        let mut counts: PerTeam<u32> = PerTeam::default();
        for (team, archetype) in roster {
            match archetypes[*team] {
                Some(existing) if existing != *archetype => {
                    return Err(ConfigError::MixedRoster(*team));
                }
                _ => archetypes[*team] = Some(*archetype),
            }
            counts[*team] += 1;
        }
        for team in Team::ALL {
            if counts[team] != config.roster_size {
                return Err(ConfigError::RosterSize {
                    team,
                    expected: config.roster_size,
                    found: counts[team],
                });
            }
        }
        let archetypes = PerTeam::from_fn(|team| archetypes[team].unwrap_or(Archetype::Idle));

        let mut controller = MatchController::setup(config, host);
        let mut ids = IdAssigner::new();
        for (team, archetype) in roster {
            let id = ids.next_id(*archetype);
            controller.world_mut().spawn_player(id, *team, *archetype, host);
        }

        let tournament = Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            archetypes,
            state: TournamentState::new(controller.config().tournament_length),
            controller,
            ticks: 0,
            reports: Vec::new(),
        };
        host.set_display_text(
            DisplaySlot::Scoreboard,
            &scoreboard_text(tournament.state.wins, tournament.state.ties),
        );
        info!(
            tournament_id = %tournament.id,
            blue = %tournament.archetypes.blue,
            red = %tournament.archetypes.red,
            matches = tournament.state.matches_target,
            "Tournament created"
        );
        Ok(tournament)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> &TournamentState {
        &self.state
    }

    pub fn controller(&self) -> &MatchController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut MatchController {
        &mut self.controller
    }

    pub fn archetypes(&self) -> PerTeam<Archetype> {
        self.archetypes
    }

    /// Ticks run so far
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn reports(&self) -> &[MatchReport] {
        &self.reports
    }

    pub fn is_complete(&self) -> bool {
        self.state.is_complete()
    }

    /// Run one simulation tick
    pub fn tick(&mut self, host: &mut impl SimulationHost) -> Vec<TournamentEvent> {
        let mut out = Vec::new();
        if self.is_complete() {
            return out;
        }
        self.ticks += 1;

        let mut game_events: Vec<GameEvent> = Vec::new();
        let was_active = self.controller.phase() == MatchPhase::Active;
        let result = self.controller.iterate(host, &mut game_events);

        if !was_active && self.controller.phase() == MatchPhase::Active {
            out.push(TournamentEvent::MatchStarted {
                match_number: self.controller.state().match_number,
            });
        }

        if let Some(report) = result {
            self.finish_match(report, host, &mut game_events, &mut out);
            return out;
        }

        let live = self.controller.is_live();
        let world = self.controller.world_mut();
        if live {
            for handle in world.handles().collect::<Vec<_>>() {
                world.iterate_player(handle, host);
            }
        }
        let step = host.advance();
        world.apply_physics(step, live, host, &mut game_events);

        out.extend(game_events.into_iter().map(|event| TournamentEvent::Game { event }));
        out
    }

    fn finish_match(
        &mut self,
        report: MatchReport,
        host: &mut impl SimulationHost,
        game_events: &mut Vec<GameEvent>,
        out: &mut Vec<TournamentEvent>,
    ) {
        self.state.record(report.outcome);
        info!(
            match_number = report.match_number,
            played = self.state.played(),
            blue_wins = self.state.wins.blue,
            red_wins = self.state.wins.red,
            ties = self.state.ties,
            "Match recorded"
        );
        self.reports.push(report.clone());

        out.extend(game_events.drain(..).map(|event| TournamentEvent::Game { event }));
        out.push(TournamentEvent::MatchEnded { report });

        if self.is_complete() {
            self.controller.end_tournament();
            let report = self.report_final(host);
            out.push(TournamentEvent::TournamentEnded { report });
            return;
        }

        self.controller.reset_world(host, game_events);
        host.set_display_text(
            DisplaySlot::Scoreboard,
            &scoreboard_text(self.state.wins, self.state.ties),
        );
        out.extend(game_events.drain(..).map(|event| TournamentEvent::Game { event }));
    }

    /// Tick until the tournament ends or `max_ticks` more ticks have run
    pub fn run_to_completion(
        &mut self,
        host: &mut impl SimulationHost,
        max_ticks: u64,
    ) -> Option<TournamentReport> {
        for _ in 0..max_ticks {
            for event in self.tick(host) {
                if let TournamentEvent::TournamentEnded { report } = event {
                    return Some(report);
                }
            }
        }
        None
    }

    /// Final tallies, logged and put on the scoreboard
    pub fn report_final(&self, host: &mut impl SimulationHost) -> TournamentReport {
        let report = TournamentReport {
            tournament_id: self.id,
            started_at: self.started_at,
            finished_at: Utc::now(),
            archetypes: self.archetypes,
            matches_played: self.state.played(),
            wins: self.state.wins,
            ties: self.state.ties,
            winner: self.state.leader(),
            matches: self.reports.clone(),
        };

        info!("The Red team won {} games!", report.wins.red);
        info!("The Blue team won {} games!", report.wins.blue);
        info!("There were {} ties!", report.ties);
        let banner = tournament_banner(&report);
        info!(tournament_id = %report.tournament_id, "{}", banner);
        host.set_display_text(DisplaySlot::Scoreboard, banner);

        report
    }
}
