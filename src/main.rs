//! CTF Arena - headless tournament runner
//!
//! Builds a tournament from environment configuration, runs it on the
//! reference host and prints match and tournament results as JSON lines.

use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ctf_arena::config::{Config, LogFormat};
use ctf_arena::host::KinematicHost;
use ctf_arena::protocol::TournamentEvent;
use ctf_arena::tournament::{Tournament, TournamentRunner};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    init_tracing(&config.log_level, config.log_format);

    let seed = config.seed.unwrap_or_else(rand::random);
    info!(
        seed,
        blue = %config.blue_archetype,
        red = %config.red_archetype,
        matches = config.game.tournament_length,
        "Starting CTF arena"
    );

    let mut host = KinematicHost::new(seed);
    let tournament = Tournament::new(
        config.game.clone(),
        config.blue_archetype,
        config.red_archetype,
        &mut host,
    )?;
    let (runner, handle) =
        TournamentRunner::new(tournament, host, config.tick_hz, config.snapshot_every);

    let mut events = handle.subscribe();
    let printer = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event @ (TournamentEvent::MatchEnded { .. } | TournamentEvent::TournamentEnded { .. })) => {
                    match serde_json::to_string(&event) {
                        Ok(line) => println!("{line}"),
                        Err(e) => warn!(error = %e, "Failed to serialize event"),
                    }
                }
                Ok(_) => {}
                Err(RecvError::Lagged(n)) => warn!(skipped = n, "Event printer lagged"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    let run = tokio::spawn(runner.run());
    tokio::select! {
        result = run => {
            let report = result??;
            // Let the printer drain once every sender is gone
            drop(handle);
            printer.await?;
            info!(
                tournament_id = %report.tournament_id,
                blue_wins = report.wins.blue,
                red_wins = report.wins.red,
                ties = report.ties,
                "Tournament complete"
            );
        }
        _ = shutdown_signal() => {
            info!(ticks = handle.ticks(), "Tournament interrupted");
            printer.abort();
        }
    }

    Ok(())
}

/// Initialize tracing/logging. Logs go to stderr, results to stdout.
fn init_tracing(log_level: &str, format: LogFormat) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    let registry = tracing_subscriber::registry().with(env_filter);
    match format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .init(),
        LogFormat::Pretty => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, stopping tournament");
        }
        _ = terminate => {
            info!("Received terminate signal, stopping tournament");
        }
    }
}
