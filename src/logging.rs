use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::Rotation;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::layer::Layered;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::config::{LogFormat, LoggingConfig};

type FilteredRegistry = Layered<EnvFilter, Registry>;
type BoxedLayer = Box<dyn Layer<FilteredRegistry> + Send + Sync>;

/// Keeps the file writer's background worker alive. Drop it at shutdown to
/// flush buffered lines.
#[must_use = "dropping the guard stops file logging"]
pub struct LoggingGuard {
    _file: Option<WorkerGuard>,
}

/// Initialize logging: stdout plus an optional rolling file, in JSON or text.
///
/// Level comes from `logging.level` when set, then `RUST_LOG`, then `info`.
/// Calling this twice leaves the first subscriber in place.
pub fn init_with_config(cfg: &LoggingConfig) -> LoggingGuard {
    let mut layers: Vec<BoxedLayer> = vec![format_layer(cfg.format, std::io::stdout, true)];

    let mut file_guard = None;
    if cfg.enable_file_logging {
        if let Some((writer, guard)) = open_file_writer(cfg) {
            layers.push(format_layer(cfg.format, writer, false));
            file_guard = Some(guard);
        }
    }

    let _ = tracing_subscriber::registry()
        .with(env_filter(cfg))
        .with(layers)
        .try_init();

    LoggingGuard { _file: file_guard }
}

fn env_filter(cfg: &LoggingConfig) -> EnvFilter {
    match cfg.level {
        Some(level) => EnvFilter::new(level.as_str()),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    }
}

fn format_layer<W>(format: LogFormat, writer: W, ansi: bool) -> BoxedLayer
where
    W: for<'w> tracing_subscriber::fmt::MakeWriter<'w> + Send + Sync + 'static,
{
    match format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_ansi(false)
            .with_timer(UtcTime::rfc_3339())
            .with_writer(writer)
            .boxed(),
        LogFormat::Text => tracing_subscriber::fmt::layer()
            .with_ansi(ansi)
            .with_timer(UtcTime::rfc_3339())
            .with_writer(writer)
            .boxed(),
    }
}

fn rotation_for(name: &str) -> Rotation {
    match name.to_lowercase().as_str() {
        "hourly" => Rotation::HOURLY,
        "never" => Rotation::NEVER,
        _ => Rotation::DAILY,
    }
}

fn open_file_writer(cfg: &LoggingConfig) -> Option<(NonBlocking, WorkerGuard)> {
    if let Err(err) = std::fs::create_dir_all(&cfg.dir) {
        eprintln!(
            "Failed to create log directory '{}' ({err}), continuing with stdout logs",
            cfg.dir
        );
        return None;
    }

    let appender = tracing_appender::rolling::RollingFileAppender::new(
        rotation_for(&cfg.rotation),
        &cfg.dir,
        &cfg.filename,
    );
    Some(tracing_appender::non_blocking(appender))
}
