//! Event and report definitions
//! These are the serialized types published by the tournament runner

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::game::policy::Archetype;
use crate::game::r#match::MatchPhase;
use crate::game::team::{PerTeam, Team};

/// Identifies a player in events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRef {
    pub team: Team,
    /// Tournament-assigned number, unique per archetype partition
    pub id: u32,
    pub archetype: Archetype,
}

/// Gameplay events raised while a match is running
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum GameEvent {
    /// A player grabbed the enemy flag
    FlagPickedUp { player: PlayerRef, flag: Team },

    /// A carrier let go of a flag (tagged or reset)
    FlagDropped { player: PlayerRef, flag: Team },

    /// A tag that sent its target to jail
    PlayerTagged { tagger: PlayerRef, target: PlayerRef },

    PlayerJailed { player: PlayerRef },

    /// Every jailed player of `team` was released
    JailBreak { team: Team, freed: u32 },

    /// A flag left its resting place and lost its no-tag zone
    NoTagZoneCleared { team: Team },
}

/// How a match was decided
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "team", rename_all = "snake_case")]
pub enum WinReason {
    /// Every player of this team is jailed
    AllCaptured(Team),
    /// This team's flag was carried across the midline
    FlagCaptured(Team),
    /// The clock ran out
    TimeUp,
}

/// Match result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", content = "team", rename_all = "snake_case")]
pub enum MatchOutcome {
    Winner(Team),
    Tie,
}

impl MatchOutcome {
    pub fn winner(self) -> Option<Team> {
        match self {
            MatchOutcome::Winner(team) => Some(team),
            MatchOutcome::Tie => None,
        }
    }
}

/// Summary emitted when a match ends
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchReport {
    pub match_number: u32,
    pub outcome: MatchOutcome,
    pub reason: WinReason,
    /// Host clock at the start latch
    pub start_time: f32,
    pub end_time: f32,
    pub iterations: u64,
    /// Jailed players per team at the end
    pub captured: PerTeam<u32>,
    /// Share of iterations each team held the enemy flag, 0-100
    pub possession_percent: PerTeam<f32>,
}

/// Summary emitted when the tournament ends
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TournamentReport {
    pub tournament_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub archetypes: PerTeam<Archetype>,
    pub matches_played: u32,
    pub wins: PerTeam<u32>,
    pub ties: u32,
    /// None on a tie
    pub winner: Option<Team>,
    pub matches: Vec<MatchReport>,
}

/// Flag state in a snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlagStatus {
    pub x: f32,
    pub z: f32,
    pub carrier: Option<PlayerRef>,
    pub no_tag_zone_active: bool,
}

/// Periodic view of the tournament
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    /// Runner tick number
    pub tick: u64,
    pub match_number: u32,
    pub phase: MatchPhase,
    pub time_remaining: f32,
    pub captured: PerTeam<u32>,
    pub wins: PerTeam<u32>,
    pub ties: u32,
    pub flags: PerTeam<FlagStatus>,
}

/// Everything the runner publishes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TournamentEvent {
    MatchStarted { match_number: u32 },

    Game { event: GameEvent },

    Snapshot { status: StatusSnapshot },

    MatchEnded { report: MatchReport },

    TournamentEnded { report: TournamentReport },
}
