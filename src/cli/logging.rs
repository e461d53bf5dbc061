//! Logging initialization

use std::path::PathBuf;

/// Initialize logging based on debug flag
/// Returns the log file path if debug logging is enabled
///
/// Logs go to a file rather than stderr so the diagram text on stdout can
/// be piped around without log lines bleeding into it.
pub fn init_logging(debug: bool) -> Option<PathBuf> {
    if !debug {
        // No logging by default (silent operation)
        return None;
    }

    let log_path = tempfile::Builder::new()
        .prefix("k8s-diagram-")
        .suffix(".log")
        .tempfile()
        .map(|f| {
            let path = f.path().to_path_buf();
            // Keep the file alive past this function; the OS temp cleaner
            // reclaims it eventually
            std::mem::forget(f);
            path
        })
        .unwrap_or_else(|_| {
            std::env::temp_dir().join(format!("k8s-diagram-{}.log", std::process::id()))
        });

    match std::fs::OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(&log_path)
    {
        Ok(file) => {
            tracing_subscriber::fmt()
                .with_writer(file)
                .with_env_filter(
                    tracing_subscriber::EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
                )
                .with_ansi(false) // No ANSI codes in log file
                .with_target(true)
                .init();
            Some(log_path)
        }
        Err(_) => None,
    }
}
