use ctf_arena::config::GameConfig;
use ctf_arena::game::{Archetype, MatchPhase, PerTeam, Team};
use ctf_arena::host::{DisplaySlot, KinematicHost};
use ctf_arena::protocol::{MatchOutcome, TournamentEvent, WinReason};
use ctf_arena::tournament::{Tournament, TournamentRunner};

#[test]
fn ids_partition_by_first_archetype_even_when_interleaved() {
    let mut host = KinematicHost::new(9);
    let roster: Vec<(Team, Archetype)> = (0..20)
        .map(|i| {
            if i % 2 == 0 {
                (Team::Red, Archetype::FlagGuard)
            } else {
                (Team::Blue, Archetype::HomeGuard)
            }
        })
        .collect();
    let tournament = Tournament::with_roster(GameConfig::default(), &roster, &mut host)
        .expect("valid roster");

    let world = tournament.controller().world();
    let mut red: Vec<u32> = world.team_players(Team::Red).map(|p| p.id).collect();
    let mut blue: Vec<u32> = world.team_players(Team::Blue).map(|p| p.id).collect();
    red.sort_unstable();
    blue.sort_unstable();
    assert_eq!(red, (1..=10).collect::<Vec<_>>());
    assert_eq!(blue, (1..=10).collect::<Vec<_>>());
    assert_eq!(tournament.controller().world().players.len(), 20);
}

#[test]
fn standard_roster_creates_blue_then_red() {
    let mut host = KinematicHost::new(9);
    let tournament = Tournament::new(
        GameConfig::default(),
        Archetype::HomeGuard,
        Archetype::FlagGuard,
        &mut host,
    )
    .expect("valid config");

    let players = &tournament.controller().world().players;
    assert_eq!(players.len(), 20);
    assert!(players[..10].iter().all(|p| p.team == Team::Blue));
    assert!(players[10..].iter().all(|p| p.team == Team::Red));
    assert_eq!(players[0].id, 1);
    assert_eq!(players[10].id, 1);
    assert_eq!(players[19].id, 10);
    assert!(players.iter().all(|p| !p.is_offsides()));
    assert_eq!(
        tournament.archetypes(),
        PerTeam::new(Archetype::HomeGuard, Archetype::FlagGuard)
    );
}

#[test]
fn idle_tournament_of_one_is_a_tie() {
    let mut host = KinematicHost::new(1);
    let config = GameConfig {
        tournament_length: 1,
        ..GameConfig::default()
    };
    let mut tournament =
        Tournament::new(config, Archetype::Idle, Archetype::Idle, &mut host).expect("valid config");

    let report = tournament
        .run_to_completion(&mut host, 1_000)
        .expect("finishes within the match length");

    assert_eq!(report.ties, 1);
    assert_eq!(report.matches_played, 1);
    assert_eq!(report.winner, None);
    let only = &report.matches[0];
    assert_eq!(only.outcome, MatchOutcome::Tie);
    assert_eq!(only.reason, WinReason::TimeUp);
    assert!(only.end_time - only.start_time >= 500.0);
    assert_eq!(only.possession_percent[Team::Blue], 0.0);
    assert_eq!(
        host.display_text(DisplaySlot::Scoreboard),
        Some("The Tournament was a Tie!")
    );
}

#[test]
fn tournament_stops_after_its_length() {
    let mut host = KinematicHost::new(64);
    let config = GameConfig {
        tournament_length: 3,
        game_length: 50.0,
        pause_time: 5,
        ..GameConfig::default()
    };
    let mut tournament = Tournament::new(
        config,
        Archetype::HomeGuard,
        Archetype::FlagGuard,
        &mut host,
    )
    .expect("valid config");

    let mut started = 0;
    let mut ended = 0;
    let mut final_reports = 0;
    for _ in 0..5_000 {
        for event in tournament.tick(&mut host) {
            match event {
                TournamentEvent::MatchStarted { .. } => started += 1,
                TournamentEvent::MatchEnded { .. } => ended += 1,
                TournamentEvent::TournamentEnded { .. } => final_reports += 1,
                _ => {}
            }
        }
    }

    let state = tournament.state();
    assert_eq!(state.wins.blue + state.wins.red + state.ties, 3);
    assert_eq!((started, ended, final_reports), (3, 3, 1));
    assert_eq!(tournament.controller().phase(), MatchPhase::TournamentEnded);
}

#[test]
fn runner_publishes_results_as_json() {
    let mut host = KinematicHost::new(3);
    let config = GameConfig {
        tournament_length: 2,
        game_length: 30.0,
        pause_time: 2,
        ..GameConfig::default()
    };
    let tournament =
        Tournament::new(config, Archetype::Idle, Archetype::Idle, &mut host).expect("valid config");
    let (runner, handle) = TournamentRunner::new(tournament, host, 0, 10);
    let mut events = handle.subscribe();

    let report = tokio_test::block_on(runner.run());
    tokio_test::assert_ok!(&report);

    let mut lines = Vec::new();
    while let Ok(event) = events.try_recv() {
        if matches!(
            event,
            TournamentEvent::MatchEnded { .. } | TournamentEvent::TournamentEnded { .. }
        ) {
            lines.push(serde_json::to_value(&event).expect("serializable"));
        }
    }

    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0]["type"], "match_ended");
    assert_eq!(lines[0]["report"]["outcome"]["result"], "tie");
    assert_eq!(lines[2]["type"], "tournament_ended");
    assert_eq!(lines[2]["report"]["ties"], 2);

    let status = handle.latest_status().expect("snapshot published");
    assert_eq!(status.ties, 2);
    assert_eq!(status.phase, MatchPhase::TournamentEnded);
}
