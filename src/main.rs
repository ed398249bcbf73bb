use anyhow::Result;
use sdac_elia::coordinator::PriceCoordinator;
use sdac_elia::feed::EliaFeedClient;
use sdac_elia::logging::{get_logger, init_logging};
use sdac_elia::{APP_VERSION, Config};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load().map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;
    init_logging(&config.logging)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!("SDAC Elia {} starting up", APP_VERSION);

    let feed = Arc::new(EliaFeedClient::new(&config.feed)?);
    let mut coordinator = PriceCoordinator::new(&config, feed)
        .map_err(|e| anyhow::anyhow!("Failed to set up coordinator: {}", e))?;

    #[cfg(feature = "web")]
    let web_task = config.web.enabled.then(|| {
        let state = sdac_elia::web::AppState::new(
            coordinator.subscribe(),
            sdac_elia::sensor::default_sensors(coordinator.tariffs()),
        );
        let host = config.web.host.clone();
        let port = config.web.port;
        tokio::spawn(async move {
            if let Err(e) = sdac_elia::web::serve(state, &host, port).await {
                error!("Web server error: {}", e);
            }
        })
    });

    // Ctrl-C ends the poll loop
    let (shutdown_tx, shutdown_rx) = mpsc::unbounded_channel::<()>();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            get_logger("main").info("Interrupt received, shutting down");
            let _ = shutdown_tx.send(());
        }
    });

    let result = coordinator.run(shutdown_rx).await;

    #[cfg(feature = "web")]
    if let Some(task) = web_task {
        task.abort();
    }

    match result {
        Ok(()) => {
            info!("Coordinator shutdown complete");
            Ok(())
        }
        Err(e) => {
            error!("Coordinator failed with error: {}", e);
            Err(anyhow::anyhow!("Coordinator error: {}", e))
        }
    }
}
