//! Structured JSONL logging to file plus human-readable stderr output.
//!
//! The binding system itself only emits `tracing` events; hosts that embed
//! the crate without their own subscriber can call `init` once at startup
//! to get dual output:
//! - **JSONL to file** (`<log_dir>/shortcut-kit.jsonl`) - structured, one
//!   JSON object per line
//! - **Pretty to stderr** - compact, for developers
//!
//! # Usage
//!
//! ```rust,ignore
//! use shortcut_kit::logging;
//!
//! // MUST keep the guard alive for the duration of the program.
//! let _guard = logging::init(None);
//!
//! tracing::info!(name = "CenterView", "rebind committed");
//! ```

use std::fs::{self, OpenOptions};
use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Guard that must be kept alive for the duration of the program.
/// Dropping it flushes and closes the log file.
pub struct LoggingGuard {
    _file_guard: WorkerGuard,
}

/// Initialize the dual-output logging system.
///
/// `log_dir` overrides the default log location (the user's home
/// directory under `.shortcut-kit/logs`, or the system temp directory
/// when no home exists). Returns a guard the caller must hold; dropping
/// it flushes remaining log lines.
pub fn init(log_dir: Option<PathBuf>) -> LoggingGuard {
    let log_dir = log_dir.unwrap_or_else(default_log_dir);
    if let Err(e) = fs::create_dir_all(&log_dir) {
        eprintln!("[LOGGING] Failed to create log directory: {}", e);
    }
    let log_path = log_dir.join("shortcut-kit.jsonl");

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .unwrap_or_else(|e| {
            eprintln!("[LOGGING] Failed to open log file: {}", e);
            OpenOptions::new()
                .write(true)
                .open("/dev/null")
                .expect("Failed to open /dev/null")
        });

    // Non-blocking writer so logging never stalls the event thread
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file);

    // Default to info, allow override via RUST_LOG
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let json_layer = fmt::layer()
        .json()
        .with_writer(non_blocking_file)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_target(true)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .with_span_events(FmtSpan::NONE);

    let pretty_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(false)
        .compact();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(pretty_layer)
        .init();

    tracing::info!(log_path = %log_path.display(), "Shortcut logging initialized");

    LoggingGuard {
        _file_guard: file_guard,
    }
}

fn default_log_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".shortcut-kit").join("logs"))
        .unwrap_or_else(|| std::env::temp_dir().join("shortcut-kit-logs"))
}
