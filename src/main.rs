#![cfg_attr(not(test), deny(clippy::panic))]

use clap::Parser;
use std::net::SocketAddr;
use steal_arena_server::config;
use steal_arena_server::logging;
use steal_arena_server::server::ServerConfig;
use steal_arena_server::websocket;

/// Steal Arena -- real-time room coordinator with a WebRTC voice signaling relay
#[derive(Parser, Debug)]
#[command(name = "steal-arena-server")]
#[command(about = "An in-memory WebSocket coordinator for small multiplayer rooms")]
#[command(version)]
struct Cli {
    /// Validate configuration and exit without starting the server.
    #[arg(long, short = 'c', conflicts_with = "print_config")]
    validate_config: bool,

    /// Print the merged configuration to stdout (as JSON) and exit.
    #[arg(long, conflicts_with = "validate_config")]
    print_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cfg = config::load();

    if cli.print_config {
        let json = serde_json::to_string_pretty(&cfg)
            .map_err(|e| anyhow::anyhow!("Failed to serialize config: {e}"))?;
        println!("{json}");
        return Ok(());
    }

    // load() only warns; here the result decides the exit status
    let validation_result = config::validate_config(&cfg);

    if cli.validate_config {
        match validation_result {
            Ok(()) => {
                println!("Configuration validation passed");
                println!();
                println!("Configuration summary:");
                println!("  Port: {}", cfg.port);
                println!("  Max players per room: {}", cfg.game.max_players_per_room);
                println!(
                    "  Attack requires same room: {}",
                    cfg.game.attack_requires_same_room
                );
                println!(
                    "  Signaling room check: {}",
                    cfg.signaling.enforce_room_membership
                );
                println!(
                    "  Metrics auth required: {}",
                    cfg.security.require_metrics_auth
                );
                return Ok(());
            }
            Err(e) => {
                eprintln!("Configuration validation failed:\n{e}");
                std::process::exit(1);
            }
        }
    }

    validation_result?;

    let _log_guard = logging::init_with_config(&cfg.logging);

    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.port));
    let server_config = ServerConfig::from(&cfg);

    websocket::run_server(
        addr,
        server_config,
        cfg.security.cors_origins.clone(),
        shutdown_signal(),
    )
    .await
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
