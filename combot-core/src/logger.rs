//! Tracing setup for the bot process. Every event goes to stdout and to an append-mode
//! log file through the same fmt layer, so both show the same lines.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Arc;

use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry,
};

/// Filter used when `RUST_LOG` is unset: our crates at `info`, HTTP and polling internals
/// only when they warn.
pub const DEFAULT_LOG_FILTER: &str = "info,teloxide=warn,reqwest=warn,hyper=warn";

/// Opens `path` for appending, creating it and its parent directory.
pub fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Installs the global subscriber. Load `.env` first or its `RUST_LOG` is not seen.
pub fn init_tracing(log_file_path: &str) -> anyhow::Result<()> {
    let file = Arc::new(open_log_file(Path::new(log_file_path))?);
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stdout.and(file))
        .with_span_events(FmtSpan::CLOSE)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(false)
        .with_line_number(false);

    Registry::default()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to set global subscriber: {}", e))
}
