use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::progress::Console;

const DEFAULT_LOG_FILE: &str = "./logs/structure-sync.log";

/// Install the stdout and file log layers.
///
/// Terminal output goes through `console` so it does not collide with the
/// spinner. The file at `LOG_FILE_PATH` gets timestamps, levels and worker
/// thread names. Keep the returned guard alive until exit so the file writer
/// is flushed.
pub fn init_logger(console: &Console) -> impl Drop {
    let filter = env::var("TRACING_LEVEL").unwrap_or_else(|_| "info".to_string());
    let filter_layer = EnvFilter::new(filter);

    let raw_path = env::var("LOG_FILE_PATH").unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string());
    let (log_dir, log_file) = split_log_path(&raw_path);

    let file_appender = tracing_appender::rolling::never(&log_dir, &log_file);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let console = console.clone();
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(move || console.writer())
                .with_target(false)
                .without_time()
                .with_ansi(true),
        )
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_thread_names(true)
                .with_ansi(false),
        )
        .with(filter_layer)
        .init();

    debug!("Logging to {}", log_dir.join(&log_file).display());

    guard
}

/// Split a log file path into the directory for the appender and the file name.
fn split_log_path(raw: &str) -> (PathBuf, OsString) {
    let path = Path::new(raw);
    match path.file_name() {
        Some(name) => {
            let dir = match path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => PathBuf::from("."),
            };
            (dir, name.to_os_string())
        }
        None => split_log_path(DEFAULT_LOG_FILE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_log_path() {
        let (dir, file) = split_log_path(DEFAULT_LOG_FILE);
        assert_eq!(dir, PathBuf::from("./logs"));
        assert_eq!(file, OsString::from("structure-sync.log"));
    }

    #[test]
    fn test_bare_file_name_logs_to_working_directory() {
        let (dir, file) = split_log_path("sync.log");
        assert_eq!(dir, PathBuf::from("."));
        assert_eq!(file, OsString::from("sync.log"));
    }

    #[test]
    fn test_directory_only_falls_back_to_default() {
        let (dir, file) = split_log_path("/");
        assert_eq!(dir, PathBuf::from("./logs"));
        assert_eq!(file, OsString::from("structure-sync.log"));
    }
}
