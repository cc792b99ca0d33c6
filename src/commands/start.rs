use anyhow::Result;
use colored::Colorize;
use joi_energy::{config, init_tracing, server};
use std::path::Path;
use tracing::info;

/// Execute the start command
///
/// Logging is configured from the loaded file, so it is initialized here
/// rather than in `main`.
pub async fn execute(config_path: &Path) -> Result<()> {
    println!("{}", "Starting JOI Energy...".green());

    let cfg = config::load_config(&config_path.to_string_lossy())?;
    init_tracing(&cfg.server.log_level, &cfg.server.log_format);

    info!(config = %config_path.display(), "Configuration loaded");

    // Blocks until shutdown
    server::start_server(cfg).await?;

    Ok(())
}
