use std::path::Path;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initializes logging with console output on stderr and a JSON file log.
///
/// Stdout is left to the command's own results.
pub fn init_logging(log_dir: &Path, verbose: bool) {
    // Ensure logs directory exists; file logging is skipped if it cannot be created
    let file_layer = match std::fs::create_dir_all(log_dir) {
        Ok(()) => {
            // Create a non-blocking file appender for daily log rotation
            let file_appender = tracing_appender::rolling::daily(log_dir, "webfont-dl.log");
            let (non_blocking_writer, guard) = tracing_appender::non_blocking(file_appender);
            // We need to keep the guard alive for the whole process so logs are flushed on exit
            std::mem::forget(guard);
            Some(fmt::layer().json().with_writer(non_blocking_writer))
        }
        Err(_) => None,
    };

    let console_layer = fmt::layer().with_target(verbose).with_writer(std::io::stderr);

    // Determine filter: respect RUST_LOG if set; otherwise quiet unless verbose
    let default_filter = if verbose { "webfont_dl=debug,warn" } else { "webfont_dl=warn" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    // Set the global default subscriber; a second init (e.g. in tests) is ignored
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .try_init();
}
