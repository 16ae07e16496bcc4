//! Async tick loop that drives a tournament and publishes its events

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::broadcast;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{info, warn};
use uuid::Uuid;

use crate::game::snapshot::SnapshotBuilder;
use crate::host::SimulationHost;
use crate::protocol::{StatusSnapshot, TournamentEvent, TournamentReport};
use crate::util::time::{tick_interval, Timer};

use super::Tournament;

/// Yield to the scheduler this often when running unthrottled
const UNTHROTTLED_YIELD_EVERY: u64 = 256;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RunnerError {
    #[error("Tournament did not finish within {0} ticks")]
    TickBudgetExhausted(u64),
}

/// Cheap handle for observers of a running tournament
#[derive(Clone)]
pub struct RunnerHandle {
    pub id: Uuid,
    events_tx: broadcast::Sender<TournamentEvent>,
    status: Arc<RwLock<Option<StatusSnapshot>>>,
    ticks: Arc<AtomicU64>,
}

impl RunnerHandle {
    pub fn subscribe(&self) -> broadcast::Receiver<TournamentEvent> {
        self.events_tx.subscribe()
    }

    /// Most recent published snapshot
    pub fn latest_status(&self) -> Option<StatusSnapshot> {
        self.status.read().clone()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }
}

/// Owns the tournament and the host for the lifetime of the run
pub struct TournamentRunner<H> {
    tournament: Tournament,
    host: H,
    tick_hz: u32,
    max_ticks: Option<u64>,
    events_tx: broadcast::Sender<TournamentEvent>,
    snapshot_builder: SnapshotBuilder,
    status: Arc<RwLock<Option<StatusSnapshot>>>,
    ticks: Arc<AtomicU64>,
}

impl<H: SimulationHost + Send + 'static> TournamentRunner<H> {
    pub fn new(
        tournament: Tournament,
        host: H,
        tick_hz: u32,
        snapshot_every: u32,
    ) -> (Self, RunnerHandle) {
        let (events_tx, _) = broadcast::channel(1024);
        let status = Arc::new(RwLock::new(None));
        let ticks = Arc::new(AtomicU64::new(0));

        let handle = RunnerHandle {
            id: tournament.id(),
            events_tx: events_tx.clone(),
            status: status.clone(),
            ticks: ticks.clone(),
        };

        let runner = Self {
            tournament,
            host,
            tick_hz,
            max_ticks: None,
            events_tx,
            snapshot_builder: SnapshotBuilder::new(snapshot_every),
            status,
            ticks,
        };

        (runner, handle)
    }

    /// Give up after `max_ticks` ticks
    pub fn with_max_ticks(mut self, max_ticks: u64) -> Self {
        self.max_ticks = Some(max_ticks);
        self
    }

    /// Run the tick loop until the tournament ends
    pub async fn run(mut self) -> Result<TournamentReport, RunnerError> {
        info!(
            tournament_id = %self.tournament.id(),
            tick_hz = self.tick_hz,
            "Tournament runner started"
        );
        let timer = Timer::new();

        let mut ticker = tick_interval(self.tick_hz).map(|period| {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            ticker
        });

        loop {
            let tick = self.ticks.load(Ordering::Relaxed);
            match ticker.as_mut() {
                Some(ticker) => {
                    ticker.tick().await;
                }
                None if tick % UNTHROTTLED_YIELD_EVERY == 0 => tokio::task::yield_now().await,
                None => {}
            }

            if let Some(max) = self.max_ticks {
                if tick >= max {
                    warn!(tournament_id = %self.tournament.id(), ticks = tick, "Tick budget exhausted");
                    return Err(RunnerError::TickBudgetExhausted(max));
                }
            }

            let events = self.tournament.tick(&mut self.host);
            let tick = self.ticks.fetch_add(1, Ordering::Relaxed) + 1;

            let mut final_report = None;
            for event in events {
                match &event {
                    TournamentEvent::MatchEnded { .. } => self.snapshot_builder.force_next(),
                    TournamentEvent::TournamentEnded { report } => final_report = Some(report.clone()),
                    _ => {}
                }
                // No subscribers is fine
                let _ = self.events_tx.send(event);
            }

            if self.snapshot_builder.should_send() || final_report.is_some() {
                self.publish_snapshot(tick);
            }

            if let Some(report) = final_report {
                info!(
                    tournament_id = %report.tournament_id,
                    ticks = tick,
                    elapsed_ms = timer.elapsed_ms(),
                    "Tournament runner finished"
                );
                return Ok(report);
            }
        }
    }

    fn publish_snapshot(&mut self, tick: u64) {
        let state = self.tournament.state();
        let status = self.snapshot_builder.build(
            tick,
            self.tournament.controller(),
            state.wins,
            state.ties,
            self.host.time(),
        );
        *self.status.write() = Some(status.clone());
        let _ = self.events_tx.send(TournamentEvent::Snapshot { status });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::game::policy::Archetype;
    use crate::host::KinematicHost;

    fn short_tournament(host: &mut KinematicHost) -> Tournament {
        let config = GameConfig {
            roster_size: 1,
            tournament_length: 1,
            game_length: 5.0,
            pause_time: 0,
            ..GameConfig::default()
        };
        Tournament::new(config, Archetype::Idle, Archetype::Idle, host).expect("valid config")
    }

    #[tokio::test]
    async fn unthrottled_run_finishes() {
        let mut host = KinematicHost::new(2);
        let tournament = short_tournament(&mut host);
        let (runner, handle) = TournamentRunner::new(tournament, host, 0, 2);
        let mut events = handle.subscribe();

        let report = runner.run().await.expect("finishes");
        assert_eq!(report.ties, 1);
        assert!(handle.ticks() > 0);
        assert!(handle.latest_status().is_some());

        let mut saw_end = false;
        while let Ok(event) = events.try_recv() {
            if matches!(event, TournamentEvent::TournamentEnded { .. }) {
                saw_end = true;
            }
        }
        assert!(saw_end);
    }

    #[tokio::test]
    async fn tick_budget_is_enforced() {
        let mut host = KinematicHost::new(2);
        let tournament = short_tournament(&mut host);
        let (runner, _handle) = TournamentRunner::new(tournament, host, 0, 0);

        let result = runner.with_max_ticks(2).run().await;
        assert_eq!(result.err(), Some(RunnerError::TickBudgetExhausted(2)));
    }
}
