//! Faucet service binary

use clap::Parser;
use drip::{api, FaucetConfig, FaucetService, HttpLedgerClient};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Faucet service CLI
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Listen address
    #[arg(long)]
    listen_addr: Option<String>,

    /// Ledger node RPC URL
    #[arg(long)]
    rpc_url: Option<String>,

    /// Dispense amount (in wei)
    #[arg(long)]
    amount: Option<u128>,

    /// Cooldown between requests for the same address (hours)
    #[arg(long)]
    cooldown_hours: Option<u64>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let env_filter = if args.debug {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::from_default_env()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting drip faucet v{}", env!("CARGO_PKG_VERSION"));

    let mut config = FaucetConfig::from_env()?;

    // CLI overrides
    if let Some(addr) = args.listen_addr {
        config.listen_addr = addr;
    }
    if let Some(rpc_url) = args.rpc_url {
        config.rpc_url = rpc_url;
    }
    if let Some(amount) = args.amount {
        config.amount_wei = amount;
    }
    if let Some(hours) = args.cooldown_hours {
        config.cooldown = Duration::from_secs(hours * 3600);
    }

    info!("Configuration:");
    info!("  Listen address: {}", config.listen_addr);
    info!("  RPC URL: {}", config.rpc_url);
    info!("  Dispense amount: {} wei", config.amount_wei);
    info!("  Address cooldown: {}s", config.cooldown.as_secs());

    let ledger = Arc::new(HttpLedgerClient::new(config.rpc_url.clone(), config.rpc_timeout)?);
    let service = Arc::new(FaucetService::init(&config, ledger).await?);

    // Informational only: a failed balance query must not block startup
    match service.faucet_balance().await {
        Ok(balance) => info!("Faucet balance: {} wei", balance),
        Err(e) => warn!("Could not verify faucet balance: {}", e),
    }

    let mut app = api::router(service.clone()).layer(TraceLayer::new_for_http());

    if config.cors_enabled {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        app = app.layer(cors);
        info!("CORS enabled");
    }

    // Periodic cooldown-table pruning keeps memory bounded
    let prune_service = service.clone();
    let prune_interval = config.cooldown.max(Duration::from_secs(3600));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(prune_interval);
        loop {
            interval.tick().await;
            prune_service.prune_cooldowns();
        }
    });

    let addr: SocketAddr = config.listen_addr.parse()?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down gracefully");
    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C");
        },
        _ = terminate => {
            info!("Received terminate signal");
        },
    }
}
