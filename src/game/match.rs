//! Match phases, win evaluation and the per-match tick

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::GameConfig;
use crate::host::{DisplaySlot, SimulationHost};
use crate::protocol::{GameEvent, MatchOutcome, MatchReport, WinReason};

use super::snapshot::time_left_text;
use super::team::{PerTeam, Team};
use super::world::World;

/// Match phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPhase {
    /// Scenery built, no tick run yet
    Setup,
    /// Resting between matches
    Paused,
    /// Match in progress
    Active,
    /// Result decided, waiting for the tournament to reset
    MatchEnded,
    /// No further ticks do anything
    TournamentEnded,
}

/// Per-match counters
#[derive(Debug, Clone, PartialEq)]
pub struct MatchState {
    pub match_number: u32,
    /// Active ticks that did not end the match
    pub iteration_count: u64,
    /// Paused ticks left before play resumes
    pub pause_counter: u32,
    pub start_time: f32,
    pub end_time: f32,
    /// Active ticks during which each team held the enemy flag
    pub possession_ticks: PerTeam<u64>,
}

impl MatchState {
    pub fn new(match_number: u32, pause_counter: u32) -> Self {
        Self {
            match_number,
            iteration_count: 0,
            pause_counter,
            start_time: 0.0,
            end_time: 0.0,
            possession_ticks: PerTeam::default(),
        }
    }

    pub fn possession_percent(&self, team: Team) -> f32 {
        if self.iteration_count == 0 {
            return 0.0;
        }
        self.possession_ticks[team] as f32 * 100.0 / self.iteration_count as f32
    }
}

/// Runs one match at a time on a persistent world
pub struct MatchController {
    phase: MatchPhase,
    state: MatchState,
    world: World,
}

impl MatchController {
    /// Build the scenery for the first match. Players are added afterwards.
    pub fn setup(config: GameConfig, host: &mut impl SimulationHost) -> Self {
        let world = World::new(config, host);
        Self {
            phase: MatchPhase::Setup,
            state: MatchState::new(1, 0),
            world,
        }
    }

    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn config(&self) -> &GameConfig {
        &self.world.config
    }

    pub fn captured_count(&self, team: Team) -> u32 {
        self.world.captured[team]
    }

    /// Clock time since the start latch
    pub fn game_time(&self, now: f32) -> f32 {
        now - self.state.start_time
    }

    pub fn time_remaining(&self, now: f32) -> f32 {
        match self.phase {
            MatchPhase::Active => (self.world.config.game_length - self.game_time(now)).max(0.0),
            MatchPhase::MatchEnded | MatchPhase::TournamentEnded => 0.0,
            MatchPhase::Setup | MatchPhase::Paused => self.world.config.game_length,
        }
    }

    /// Whether players move and contacts count this tick
    pub fn is_live(&self) -> bool {
        self.phase == MatchPhase::Active
    }

    /// Advance the match clock by one tick. Returns the report when this
    /// tick decided the match.
    pub fn iterate(
        &mut self,
        host: &mut impl SimulationHost,
        events: &mut Vec<GameEvent>,
    ) -> Option<MatchReport> {
        if matches!(self.phase, MatchPhase::MatchEnded | MatchPhase::TournamentEnded) {
            return None;
        }

        if self.state.pause_counter > 0 {
            self.state.pause_counter -= 1;
            self.phase = MatchPhase::Paused;
            return None;
        }

        if self.phase != MatchPhase::Active {
            self.phase = MatchPhase::Active;
            info!(match_number = self.state.match_number, "Match started");
        }

        let now = host.time();
        if self.state.iteration_count < 2 {
            self.state.start_time = now;
        }

        let radius = self.world.config.no_tag_radius;
        for team in Team::ALL {
            let flag = &mut self.world.flags[team];
            if flag.no_tag_zone_active && flag.has_moved(radius) && flag.kill_no_tag_zone(host) {
                events.push(GameEvent::NoTagZoneCleared { team });
            }
        }

        let game_time = self.game_time(now);
        if let Some((outcome, reason)) = self.evaluate(game_time) {
            self.state.end_time = now;
            self.phase = MatchPhase::MatchEnded;
            return Some(self.report(outcome, reason));
        }

        for team in Team::ALL {
            if self.world.flags[team.opponent()].is_carried() {
                self.state.possession_ticks[team] += 1;
            }
        }
        self.state.iteration_count += 1;

        let remaining = self.world.config.game_length - game_time;
        host.set_display_text(DisplaySlot::Clock, &time_left_text(remaining));
        None
    }

    /// First satisfied rule wins
    pub fn evaluate(&self, game_time: f32) -> Option<(MatchOutcome, WinReason)> {
        let world = &self.world;
        if world.all_captured(Team::Red) {
            return Some((MatchOutcome::Winner(Team::Blue), WinReason::AllCaptured(Team::Red)));
        }
        if world.all_captured(Team::Blue) {
            return Some((MatchOutcome::Winner(Team::Red), WinReason::AllCaptured(Team::Blue)));
        }
        if world.flags[Team::Blue].is_offsides() {
            return Some((MatchOutcome::Winner(Team::Red), WinReason::FlagCaptured(Team::Blue)));
        }
        if world.flags[Team::Red].is_offsides() {
            return Some((MatchOutcome::Winner(Team::Blue), WinReason::FlagCaptured(Team::Red)));
        }
        if game_time >= world.config.game_length {
            return Some((MatchOutcome::Tie, WinReason::TimeUp));
        }
        None
    }

    /// Summarize the finished match and log it
    pub fn report(&self, outcome: MatchOutcome, reason: WinReason) -> MatchReport {
        let report = MatchReport {
            match_number: self.state.match_number,
            outcome,
            reason,
            start_time: self.state.start_time,
            end_time: self.state.end_time,
            iterations: self.state.iteration_count,
            captured: self.world.captured,
            possession_percent: PerTeam::from_fn(|team| self.state.possession_percent(team)),
        };

        match outcome {
            MatchOutcome::Winner(team) => {
                info!(match_number = report.match_number, winner = %team, "*** The {} team wins! ***", team)
            }
            MatchOutcome::Tie => info!(match_number = report.match_number, "*** The match was a tie! ***"),
        }
        info!(
            start_time = report.start_time,
            end_time = report.end_time,
            iterations = report.iterations,
            "Match timing"
        );
        for team in Team::ALL {
            if self.world.all_captured(team) {
                info!("All of the {} players were captured.", team);
            }
            if self.world.flags[team].is_offsides() {
                info!("The {} flag was captured.", team);
            }
        }
        info!(
            blue = report.possession_percent.blue,
            red = report.possession_percent.red,
            "Flag possession percentage"
        );

        report
    }

    /// Prepare the next match: fresh flags, players home, counters cleared
    pub fn reset_world(&mut self, host: &mut impl SimulationHost, events: &mut Vec<GameEvent>) {
        for handle in self.world.handles().collect::<Vec<_>>() {
            self.world.reset_player(handle, host, events);
        }
        self.world.place_flags(host);
        self.world.captured = PerTeam::default();

        self.state = MatchState::new(self.state.match_number + 1, self.world.config.pause_time);
        self.phase = MatchPhase::Paused;
        info!(
            match_number = self.state.match_number,
            pause_ticks = self.state.pause_counter,
            "World reset"
        );
    }

    pub fn end_tournament(&mut self) {
        self.phase = MatchPhase::TournamentEnded;
    }
}
