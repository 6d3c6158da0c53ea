//! Tracing initialization.
//!
//! The probe command logs to stderr. The interactive viewer owns the
//! terminal, so its logs go to a file through a non-blocking appender; the
//! returned guard must stay alive until the TUI exits or trailing records
//! are lost.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Log to stderr, filtered by `RUST_LOG` (default `info`).
pub fn init_stderr() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Log to `dir/depthscope.log`, filtered by `RUST_LOG` (default `info`).
pub fn init_file(dir: &Path) -> WorkerGuard {
    let appender = tracing_appender::rolling::never(dir, "depthscope.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(writer)
        .with_ansi(false)
        .init();
    guard
}
