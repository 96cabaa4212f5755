use hedgebets::config::LoggingConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber. Keep the returned guard alive until exit
/// so buffered file output is flushed.
pub fn init_logging(config: &LoggingConfig) -> Option<WorkerGuard> {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let level = if config.level.trim().is_empty() {
        "info"
    } else {
        config.level.trim()
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,hedgebets={level}")));

    // `tracing_appender::rolling::daily` panics if it can't create the
    // initial log file, so preflight writability.
    let (file_layer, guard) = match config.dir.as_deref().filter(|d| !d.trim().is_empty()) {
        Some(log_dir) if writable(log_dir) => {
            let file_appender = tracing_appender::rolling::daily(log_dir, "hedgebets.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true);
            (Some(layer), Some(guard))
        }
        Some(log_dir) => {
            eprintln!(
                "Warning: Could not write to log directory {}, file logging disabled",
                log_dir
            );
            (None, None)
        }
        None => (None, None),
    };

    // Console goes to stderr so table/JSON output stays clean
    let (console_layer, json_layer) = if config.json {
        (
            None,
            Some(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            ),
        )
    } else {
        (
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            ),
            None,
        )
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(json_layer)
        .with(file_layer)
        .init();

    guard
}

fn writable(log_dir: &str) -> bool {
    if std::fs::create_dir_all(log_dir).is_err() {
        return false;
    }
    let test_path = std::path::Path::new(log_dir).join(".hedgebets_write_test");
    match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&test_path)
    {
        Ok(_) => {
            let _ = std::fs::remove_file(&test_path);
            true
        }
        Err(_) => false,
    }
}
