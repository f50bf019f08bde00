//! Logging setup for the batch run.
//!
//! Events always go to stderr. A daily rolling file and systemd-journald
//! (Linux only) can be enabled on top through `[logging]` in the config.
//!
//! The filter comes from the `SEED_PHOTOS_LOG` environment variable:
//! - `SEED_PHOTOS_LOG=debug` also shows every strategy miss
//! - `SEED_PHOTOS_LOG=info` for per-person progress (default)
//! - `SEED_PHOTOS_LOG=warn` for failed downloads only
//!
//! Without it, `logging.level` from the config is used.

use anyhow::Result;
use std::sync::OnceLock;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

/// Initialize the logging system. Call once, before the run starts.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_env("SEED_PHOTOS_LOG")
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = match &config.log_dir {
        Some(log_dir) => {
            std::fs::create_dir_all(log_dir)?;

            let file_appender = tracing_appender::rolling::daily(log_dir, "seed-photos.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            // Dropping the guard would stop the writer thread
            static GUARD: OnceLock<WorkerGuard> = OnceLock::new();
            let _ = GUARD.set(guard);

            Some(fmt::layer().with_writer(non_blocking).with_ansi(false))
        }
        None => None,
    };

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(file_layer);

    #[cfg(target_os = "linux")]
    {
        if config.journald {
            match tracing_journald::layer() {
                Ok(journald_layer) => {
                    registry.with(journald_layer).try_init()?;
                    tracing::debug!("Logging initialized with journald backend");
                    return Ok(());
                }
                Err(e) => {
                    registry.try_init()?;
                    tracing::warn!("journald unavailable, logging to stderr only: {}", e);
                    return Ok(());
                }
            }
        }
    }

    registry.try_init()?;
    Ok(())
}
