use anyhow::Context;
use clap::Parser;
use duet_server::{Config, SessionManager, build_app, serve};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Config::parse();

    if !config.static_dir.is_dir() {
        warn!(
            "Static directory {} not found. Static files will not be served.",
            config.static_dir.display()
        );
    }

    let sessions = SessionManager::new();
    let app = build_app(sessions, &config.static_dir);

    let addr = config.addr();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Signaling server listening on http://{}", addr);

    serve(listener, app).await.context("server failed")?;
    Ok(())
}
