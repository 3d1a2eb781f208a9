//! Strictly Sim - Unified CLI
//!
//! Runs the HTTP API, a standalone game engine, or one-off simulations.

#![warn(missing_docs)]

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use std::path::Path;
use std::str::FromStr;
use strictly_sim::{
    GameOutcome, LocalGameEngine, Player, Services, SessionResult, SimulatorConfig, StrategyKind,
    engine_router, router, serve,
};
use strum::IntoEnumIterator;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,strictly_sim=debug")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve {
            config,
            host,
            port,
            engine_url,
        } => run_server(&config, host, port, engine_url).await,
        Command::Engine { host, port } => run_engine(host, port).await,
        Command::Simulate {
            strategy,
            engine_url,
            games,
            config,
        } => run_simulation(&config, &strategy, engine_url, games).await,
        Command::Strategies => {
            list_strategies();
            Ok(())
        }
    }
}

/// Loads config, then applies environment and command-line overrides.
fn load_config(
    path: &Path,
    host: Option<String>,
    port: Option<u16>,
    engine_url: Option<String>,
) -> Result<SimulatorConfig> {
    let mut config = SimulatorConfig::load_or_default(path)?.apply_env()?;
    if let Some(host) = host {
        config = config.with_host(host);
    }
    if let Some(port) = port {
        config = config.with_port(port);
    }
    if let Some(url) = engine_url {
        config = config.with_engine_url(url);
    }
    Ok(config)
}

/// Cancels `token` on Ctrl-C.
fn shutdown_on_ctrl_c(token: CancellationToken) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Shutdown requested"),
            Err(e) => warn!(error = %e, "Failed to listen for Ctrl-C"),
        }
        token.cancel();
    });
}

/// Run the full HTTP API
#[instrument(skip_all)]
async fn run_server(
    path: &Path,
    host: Option<String>,
    port: Option<u16>,
    engine_url: Option<String>,
) -> Result<()> {
    let config = load_config(path, host, port, engine_url)?;
    info!(?config, "Starting Strictly Sim server");

    let shutdown = CancellationToken::new();
    let services = Services::from_config(&config, shutdown.clone())?;
    let app = router(services.app_state(&config));

    let addr = config.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    shutdown_on_ctrl_c(shutdown.clone());
    serve(listener, app, shutdown).await?;
    Ok(())
}

/// Run only the game engine API
#[instrument]
async fn run_engine(host: String, port: u16) -> Result<()> {
    info!("Starting standalone game engine");

    let addr = format!("{}:{}", host, port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    let shutdown = CancellationToken::new();
    shutdown_on_ctrl_c(shutdown.clone());
    serve(listener, engine_router(LocalGameEngine::new()), shutdown).await?;
    Ok(())
}

/// Play `games` games in one session and print each result
#[instrument(skip(path, engine_url))]
async fn run_simulation(
    path: &Path,
    strategy: &str,
    engine_url: Option<String>,
    games: u32,
) -> Result<()> {
    let config = load_config(path, None, None, engine_url)?;
    let strategy = StrategyKind::from_str(strategy)
        .with_context(|| format!("Unknown strategy {:?}", strategy))?;

    let shutdown = CancellationToken::new();
    shutdown_on_ctrl_c(shutdown.clone());
    let services = Services::from_config(&config, shutdown)?;

    let session = services.sessions.create_session(strategy).await?;
    let id = session.id().clone();
    println!("Session {} using {}", id, strategy);

    let (mut x_wins, mut o_wins, mut draws) = (0u32, 0u32, 0u32);
    for round in 1..=games {
        let session = services.sessions.simulate(&id).await?;
        let outcome = match session.result() {
            Some(SessionResult::Win) => GameOutcome::from(session.winner()),
            _ => GameOutcome::Draw,
        };
        match outcome {
            GameOutcome::Win(Player::X) => x_wins += 1,
            GameOutcome::Win(Player::O) => o_wins += 1,
            GameOutcome::Draw => draws += 1,
        }
        println!("Game {:>3}: {} in {} moves", round, outcome, session.moves().len());
    }

    println!("X wins: {}  O wins: {}  Draws: {}", x_wins, o_wins, draws);
    Ok(())
}

/// Print every known strategy id
fn list_strategies() {
    for kind in StrategyKind::iter() {
        println!("{}", kind);
    }
}
