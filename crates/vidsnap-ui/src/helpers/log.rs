// crates/vidsnap-ui/src/helpers/log.rs
//
// Logging setup for the binary.
//
// Release builds on Windows run with `windows_subsystem = "windows"`, so a
// double-click launch has no console and stderr goes nowhere. Every event is
// therefore also appended to a file in the OS temp directory.
//
// File: %TEMP%\vidsnap.log (or $TMPDIR/vidsnap.log). Append-only.
//
// Level comes from RUST_LOG when set, `info` otherwise:
//   RUST_LOG=vidsnap_media=debug vidsnap ~/Videos/clip.mp4

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

pub const LOG_FILE: &str = "vidsnap.log";

pub fn log_path() -> PathBuf {
    std::env::temp_dir().join(LOG_FILE)
}

fn filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Installs the global subscriber. Never fails: if the log file can't be
/// opened, events still reach stderr.
pub fn init() {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path())
        .ok()
        .map(|f| {
            fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(f))
                .with_filter(filter())
        });

    let stderr = fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(filter());

    let _ = tracing_subscriber::registry()
        .with(stderr)
        .with(file)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_lives_in_temp_dir() {
        let p = log_path();
        assert_eq!(p.parent(), Some(std::env::temp_dir().as_path()));
        assert!(p.ends_with(LOG_FILE));
    }
}
