use anyhow::{Context, Result};
use clap::Parser;
use jarvis_backend::{
    create_router, AgentProcess, AppState, Config, EgressSession, LocalRecordings,
    S3ObjectStore, StorageDirectory,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "jarvis-backend", version, about = "Recording and storage API for LiveKit rooms")]
struct Args {
    /// Config file (extension optional)
    #[arg(long, default_value = "config/jarvis-backend")]
    config: String,

    /// Address to bind (overrides config)
    #[arg(long)]
    bind: Option<String>,

    /// Port to listen on (overrides config)
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::from_filename(".env.local").ok();
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let mut cfg = Config::load(&args.config).context("Failed to load config")?;
    if let Some(bind) = args.bind {
        cfg.service.http.bind = bind;
    }
    if let Some(port) = args.port {
        cfg.service.http.port = port;
    }

    info!("{} v{}", cfg.service.name, env!("CARGO_PKG_VERSION"));

    // Everything fallible runs before the egress session is opened
    let store = S3ObjectStore::new(&cfg.storage).context("Failed to initialize storage client")?;
    let storage = Arc::new(StorageDirectory::new(
        Arc::new(store),
        Duration::from_secs(cfg.storage.url_expiration_secs),
    ));

    let egress = Arc::new(
        EgressSession::connect(&cfg.livekit, &cfg.storage)
            .context("Failed to initialize egress session")?,
    );
    info!("Egress session initialized");

    let recordings = LocalRecordings::new(&cfg.egress.output_dir);
    if let Err(e) = tokio::fs::create_dir_all(recordings.dir()).await {
        error!("Failed to create recordings directory {:?}: {}", recordings.dir(), e);
    }

    let agent = AgentProcess::launch(&cfg.agent);

    let app = create_router(AppState::new(Arc::clone(&egress), storage, recordings));
    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);

    let served = async {
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;
        info!("HTTP server listening on http://{}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("HTTP server failed")
    }
    .await;

    // Release the provider handle whether or not serving succeeded
    egress.close().await;
    if let Some(agent) = agent {
        agent.shutdown().await;
    }

    served
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
