mod config;
mod error;
mod loader;
mod page;
mod server;

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use config::Config;
use loader::Loader;
use server::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    info!("starting lawbook server");

    let config = Config::from_env()?;
    info!(
        source = %config.source,
        listen_addr = %config.listen_addr,
        footnote_heading = %config.footnote_heading,
        "configuration loaded"
    );

    let loader = Loader::new(&config)?;
    let listen_addr = config.listen_addr;
    let state = Arc::new(AppState::new(config, loader));

    // Warm start only; every page load fetches the document again.
    if state.reload().await.is_err() {
        warn!("initial document load failed, pages will show the load error until it succeeds");
    }

    let listener = TcpListener::bind(listen_addr).await?;
    info!(listen_addr = %listen_addr, "serving HTTP");
    axum::serve(listener, server::build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = signal::ctrl_c().await;
    };
    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        if let Ok(mut stream) = signal(SignalKind::terminate()) {
            let _ = stream.recv().await;
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
