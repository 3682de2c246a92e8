use std::fs::{self, File};
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{Level, event};
use tracing_appender::non_blocking::{self, WorkerGuard};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{LoggingConfig, ResolvedOutputs};

/// Environment variable that overrides the configured filter.
pub const LOG_FILTER_ENV: &str = "TICHU_SIM_LOG";

/// Keeps the background log writer alive; drop it only after the run.
pub struct LoggingGuard {
    _guard: WorkerGuard,
    pub telemetry_path: PathBuf,
}

/// Filter used when `TICHU_SIM_LOG` is unset: the configured level for the
/// simulator and the engine, warnings only for everything else.
pub fn default_directives(level: Level) -> String {
    let level = level.as_str().to_ascii_lowercase();
    format!("warn,tichu_sim={level},tichu_core={level}")
}

/// Installs a JSON subscriber writing to the telemetry file next to the turn
/// rows. Returns `None` when structured logging is switched off.
pub fn init_logging(
    logging: &LoggingConfig,
    outputs: &ResolvedOutputs,
) -> Result<Option<LoggingGuard>> {
    if !logging.enable_structured {
        return Ok(None);
    }

    let telemetry_path = outputs.telemetry.clone();
    if let Some(dir) = telemetry_path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
    {
        fs::create_dir_all(dir)
            .with_context(|| format!("creating telemetry directory at {}", dir.display()))?;
    }
    let file = File::create(&telemetry_path)
        .with_context(|| format!("creating telemetry file at {}", telemetry_path.display()))?;

    let (writer, guard) = non_blocking::NonBlockingBuilder::default()
        .lossy(false)
        .finish(file);

    let level = logging.level().unwrap_or(Level::INFO);
    let filter = EnvFilter::try_from_env(LOG_FILTER_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directives(level)));

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .json()
        .with_current_span(true)
        .with_span_list(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_span_events(FmtSpan::NONE)
        .with_writer(writer)
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_ok() {
        event!(
            target: "tichu_sim::logging",
            Level::INFO,
            path = %telemetry_path.display(),
            level = %level,
            "structured logging enabled"
        );
    }

    Ok(Some(LoggingGuard {
        _guard: guard,
        telemetry_path,
    }))
}
