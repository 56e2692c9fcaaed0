//! Match server (default binary).
//!
//! Reads `TETROMATCH_*` settings from the environment, sets up logging and serves the
//! JSON adapter until interrupted.

use anyhow::Result;

use tetromatch::adapter::{run_server, ServerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServerConfig::from_env();
    tetromatch::init_logging(config.log_dir.as_deref())?;
    log::info!(
        "[main] starting on {}:{} with {:?} gravity",
        config.host,
        config.port,
        config.engine.gravity
    );

    tokio::select! {
        result = run_server(config, None) => result,
        _ = tokio::signal::ctrl_c() => {
            log::warn!("[main] interrupt received, shutting down");
            Ok(())
        }
    }
}
