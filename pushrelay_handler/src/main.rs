use env_logger::Env;
use log::info;
use pushrelay_handler::{server, RelayConfig, RelayHandler};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

const CONFIG_PATH_ENV: &str = "PUSHRELAY_CONFIG_PATH";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config_path = env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from);
    let config = RelayConfig::new(config_path)?;
    let handler = Arc::new(RelayHandler::from_config(&config)?);

    let address = config.server.address();
    let listener = TcpListener::bind(&address).await?;
    info!("pushrelay listening on {}", address);
    axum::serve(listener, server::router(handler))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutting down");
    }
}
