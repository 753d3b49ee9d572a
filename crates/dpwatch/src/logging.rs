//! Subscriber setup for the binary. Library code only emits `tracing` events.

use crate::error::{Error, Result};
use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_FILTER: &str = "dpwatch=info,daystore=info";
const VERBOSE_FILTER: &str = "dpwatch=debug,daystore=debug";

/// Logs to stderr and, when `log_file` is given, to a daily-rotated file next to it.
///
/// `RUST_LOG` overrides the default filter.
pub fn init(log_file: Option<&Path>, verbose: bool) -> Result<()> {
    let default = if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let file_layer = match log_file {
        Some(path) => Some(
            fmt::layer()
                .with_ansi(false)
                .with_writer(file_appender(path)?),
        ),
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .try_init()
        .map_err(|e| Error::Setup(format!("cannot install logger: {e}")))
}

/// Daily appender for `path`: writes go to `<dir>/<name>.<YYYY-MM-DD>`.
pub fn file_appender(path: &Path) -> Result<RollingFileAppender> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| Error::Setup(format!("invalid log file name {}", path.display())))?;
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(name)
        .build(dir)
        .map_err(|e| Error::Setup(format!("cannot open log file {}: {}", path.display(), e)))
}
