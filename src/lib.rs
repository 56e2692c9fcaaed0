//! tetromatch (workspace facade crate).
//!
//! Re-exports the workspace crates under one name so binaries, tests and benches can use
//! `tetromatch::{core,engine,adapter,types}` while the implementation lives under `crates/`.

pub use tetromatch_adapter as adapter;
pub use tetromatch_core as core;
pub use tetromatch_engine as engine;
pub use tetromatch_types as types;

/// Initialize logging: terminal at info, plus a debug-level file under `log_dir` if given
pub fn init_logging(log_dir: Option<&str>) -> anyhow::Result<()> {
    use anyhow::Context;
    use simplelog::{
        ColorChoice, CombinedLogger, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
        WriteLogger,
    };

    let config = ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();

    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();
    loggers.push(TermLogger::new(
        log::LevelFilter::Info,
        config.clone(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    ));

    if let Some(dir) = log_dir {
        std::fs::create_dir_all(dir).with_context(|| format!("creating log dir {}", dir))?;
        let time = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let path = std::path::Path::new(dir).join(format!("{}.log", time));
        let file = std::fs::File::create(&path)
            .with_context(|| format!("creating log file {}", path.display()))?;
        loggers.push(WriteLogger::new(log::LevelFilter::Debug, config, file));
    }

    CombinedLogger::init(loggers).context("initializing logger")
}
