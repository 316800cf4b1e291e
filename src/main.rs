use clap::Parser;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::info;
use vqa_storage::{
    cli::{run_command, Args, Command},
    config::Config,
    routes::create_router,
    utils::init_logger,
    AppState, FileStore,
};

/// Wait for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::error!("Failed to install SIGTERM handler: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logger();

    // Load configuration
    let mut config = Config::from_env()?;
    info!("Configuration loaded: {:?}", config.storage);

    // One gateway handle for the whole process
    let store = FileStore::from_config(&config.storage)?;

    match args.command.unwrap_or(Command::Serve { host: None, port: None }) {
        Command::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }

            let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
            let state = AppState { config, store };
            let app = create_router(state);

            info!("Server listening on {}", addr);
            let listener = TcpListener::bind(addr).await?;
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await
                .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;
        }
        command => run_command(&store, command).await?,
    }

    Ok(())
}
