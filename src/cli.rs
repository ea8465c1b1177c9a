use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use crate::auth::FirebaseVerifier;
use crate::config;
use crate::database::{seed, DatabaseManager};
use crate::server;
use crate::state::AppState;
use crate::upload::{CloudinaryHost, UploadPolicy};

#[derive(Parser)]
#[command(name = "portfolio-api")]
#[command(about = "Portfolio backend API - articles, projects, owner profile and images")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Connect, seed default data and serve the HTTP API (default)")]
    Serve {
        #[arg(long, short, help = "Listen port (overrides PORT)")]
        port: Option<u16>,
    },

    #[command(about = "Seed default data and exit")]
    Seed,
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command.unwrap_or(Commands::Serve { port: None }) {
        Commands::Serve { port } => serve(port).await,
        Commands::Seed => seed_only().await,
    }
}

async fn serve(port: Option<u16>) -> anyhow::Result<()> {
    let config = config::config();
    info!("Starting Portfolio API in {:?} mode", config.environment);

    if config.auth.project_id.is_none() {
        if crate::is_production!() {
            anyhow::bail!("FIREBASE_PROJECT_ID or FIREBASE_CREDENTIALS must be set in production");
        }
        warn!("No Firebase project configured, every protected route will answer 401");
    }

    let manager = DatabaseManager::connect(&config.database)
        .await
        .context("failed to configure MongoDB client")?;

    let verifier = Arc::new(FirebaseVerifier::new(&config.auth));
    let host = Arc::new(CloudinaryHost::new(&config.image_host).context("invalid image host configuration")?);
    let state = AppState::new(manager.database(), verifier, host, UploadPolicy::from(&config.upload));

    // A database that is down at boot should not keep the API from starting
    if let Err(e) = seed::run(&state.articles, &state.users, &state.profile).await {
        warn!("Seeding skipped: {}", e);
    }

    let app = server::app(state, config);

    let port = port.unwrap_or(config.server.port);
    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!("Portfolio API listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    manager.shutdown().await;
    Ok(())
}

async fn seed_only() -> anyhow::Result<()> {
    let config = config::config();
    let manager = DatabaseManager::connect(&config.database).await?;
    let db = manager.database();

    DatabaseManager::health_check(&db)
        .await
        .context("MongoDB is not reachable")?;

    let report = seed::run(
        &crate::database::ArticleStore::new(&db),
        &crate::database::UserStore::new(&db),
        &crate::database::ProfileStore::new(&db),
    )
    .await?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    manager.shutdown().await;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
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
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
