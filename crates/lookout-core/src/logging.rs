//! Log output for lookout.
//!
//! Two daily-rotated JSON files are written under `~/.lookout/logs/`:
//!
//! - `lookout.log` holds every record that passes the level filter
//! - `activity.log` holds only the activity feed, one flat JSON object per
//!   event logged with [`ACTIVITY_TARGET`]
//!
//! A compact human-readable copy goes to stderr. `RUST_LOG` overrides the
//! default `lookout=info` (or `lookout=debug` with `--verbose`).
//!
//! ```no_run
//! use lookout_core::logging::{self, ACTIVITY_TARGET};
//!
//! let _guard = logging::init_logging(None, false).expect("logging init");
//!
//! tracing::debug!(agent_id = "developer", "scanning workspace");
//! tracing::info!(target: ACTIVITY_TARGET, agent_id = "developer", "Created memory/today.md");
//! ```

use std::path::PathBuf;

use tracing::{Metadata, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer,
    filter::filter_fn,
    fmt::{self, MakeWriter},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
};

use crate::error::{LookoutError, Result};

/// Tracing target of activity feed records.
pub const ACTIVITY_TARGET: &str = "lookout::activity";

/// Daily-rotated file holding every record.
pub const LOG_FILE: &str = "lookout.log";

/// Daily-rotated file holding only activity feed records.
pub const ACTIVITY_FILE: &str = "activity.log";

/// Flushes both log files when dropped. Hold it for the life of the process.
pub struct LogGuard {
    _file_guard: WorkerGuard,
    _activity_guard: WorkerGuard,
}

/// Install the global subscriber.
///
/// `log_dir` defaults to `~/.lookout/logs/` and is created if missing.
pub fn init_logging(log_dir: Option<PathBuf>, verbose: bool) -> Result<LogGuard> {
    let log_dir = match log_dir {
        Some(dir) => dir,
        None => default_log_dir()?,
    };

    std::fs::create_dir_all(&log_dir).map_err(|e| LookoutError::DirectoryCreation {
        path: log_dir.clone(),
        source: e,
    })?;

    let (file_writer, file_guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::daily(&log_dir, LOG_FILE));
    let (activity_writer, activity_guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::daily(&log_dir, ACTIVITY_FILE));

    let default_level = if verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("lookout={default_level}")));

    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .json()
        .with_current_span(true)
        .with_span_list(false);

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(verbose)
        .with_file(verbose)
        .with_line_number(verbose)
        .compact();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(activity_layer(activity_writer))
        .with(console_layer)
        .init();

    tracing::debug!(log_dir = %log_dir.display(), verbose, "logging initialized");

    Ok(LogGuard {
        _file_guard: file_guard,
        _activity_guard: activity_guard,
    })
}

fn is_activity(metadata: &Metadata<'_>) -> bool {
    metadata.target() == ACTIVITY_TARGET
}

/// JSON layer that passes only activity feed records, fields flattened.
fn activity_layer<S, W>(writer: W) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false)
        .json()
        .flatten_event(true)
        .with_current_span(false)
        .with_span_list(false)
        .with_filter(filter_fn(is_activity))
}

/// `~/.lookout/logs/`
pub fn default_log_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").map_err(|_| LookoutError::ConfigMissingField {
        field: "HOME environment variable".to_string(),
    })?;

    Ok(PathBuf::from(home).join(".lookout").join("logs"))
}
