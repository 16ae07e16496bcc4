//! Status snapshots and on-screen text

use crate::protocol::{FlagStatus, StatusSnapshot, TournamentReport};

use super::r#match::MatchController;
use super::team::{PerTeam, Team};

/// Builds periodic status snapshots
pub struct SnapshotBuilder {
    /// Tick counter since last snapshot
    ticks_since_snapshot: u32,
    /// Snapshot interval in ticks, 0 disables periodic snapshots
    snapshot_interval: u32,
}

impl SnapshotBuilder {
    pub fn new(snapshot_interval: u32) -> Self {
        Self {
            ticks_since_snapshot: 0,
            snapshot_interval,
        }
    }

    /// Check if it's time to publish a snapshot
    pub fn should_send(&mut self) -> bool {
        if self.snapshot_interval == 0 {
            return false;
        }
        self.ticks_since_snapshot += 1;
        if self.ticks_since_snapshot >= self.snapshot_interval {
            self.ticks_since_snapshot = 0;
            true
        } else {
            false
        }
    }

    /// Force snapshot on next check (used when a match ends)
    pub fn force_next(&mut self) {
        self.ticks_since_snapshot = self.snapshot_interval.saturating_sub(1);
    }

    pub fn build(
        &self,
        tick: u64,
        controller: &MatchController,
        wins: PerTeam<u32>,
        ties: u32,
        now: f32,
    ) -> StatusSnapshot {
        let world = controller.world();
        let flags = PerTeam::from_fn(|team| {
            let flag = &world.flags[team];
            FlagStatus {
                x: flag.position.x,
                z: flag.position.z,
                carrier: flag
                    .carrier
                    .and_then(|handle| world.player(handle))
                    .map(|p| p.reference()),
                no_tag_zone_active: flag.no_tag_zone_active,
            }
        });

        StatusSnapshot {
            tick,
            match_number: controller.state().match_number,
            phase: controller.phase(),
            time_remaining: controller.time_remaining(now),
            captured: world.captured,
            wins,
            ties,
            flags,
        }
    }
}

/// Scoreboard line shown between and during matches
pub fn scoreboard_text(wins: PerTeam<u32>, ties: u32) -> String {
    format!("Red: {}  Blue: {}   Ties: {}", wins.red, wins.blue, ties)
}

/// Clock line for the current match
pub fn time_left_text(remaining: f32) -> String {
    format!("Time Left: {:.2}", remaining)
}

/// Banner shown once the tournament is over
pub fn tournament_banner(report: &TournamentReport) -> &'static str {
    match report.winner {
        Some(Team::Blue) => "Blue wins the Tournament!",
        Some(Team::Red) => "Red wins the Tournament!",
        None => "The Tournament was a Tie!",
    }
}
