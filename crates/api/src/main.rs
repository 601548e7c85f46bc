//! Biosensor Registry - Main Entry Point

use api::{init_logging, init_metrics, open_repository, run_server, AppState, Settings};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Optional config file path as the only argument
    let config_path = std::env::args().nth(1);
    let settings = Settings::load(config_path.as_deref())?;

    init_logging(&settings.logging)?;

    info!("=== Biosensor Registry v{} ===", env!("CARGO_PKG_VERSION"));

    let repository = open_repository(&settings.storage).await?;
    let mut state = AppState::new(repository, settings);

    match init_metrics() {
        Ok(handle) => state = state.with_metrics(handle),
        Err(e) => warn!(error = %e, "Prometheus recorder not installed; /metrics disabled"),
    }

    run_server(state).await
}
