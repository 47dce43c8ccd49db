use log::{debug, error, info, log_enabled, warn, Level, LevelFilter};

/// Initializes the logger with the `env_logger` crate.
///
/// The level comes from `RUST_LOG` (default: errors only).
pub fn init_logger() {
    env_logger::init();
}

/// Initializes `env_logger` with a fixed minimum level.
///
/// `RUST_LOG` still refines per-module filters on top of `level`. Calling this
/// more than once is harmless; later calls are ignored.
///
/// # Examples
/// ```rust,no_run
/// use log::LevelFilter;
/// use st25dv_rs::logging::init_logger_with_level;
///
/// init_logger_with_level(LevelFilter::Debug);
/// log::debug!("bus traffic will be shown");
/// ```
pub fn init_logger_with_level(level: LevelFilter) {
    let _ = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp_millis()
        .try_init();
}

/// Map a `-v` count to a level: 0 = warn, 1 = info, 2 = debug, 3+ = trace
pub fn level_from_verbosity(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Logs an error message.
pub fn log_error(message: &str) {
    if log_enabled!(Level::Error) {
        error!("{message}");
    }
}

/// Logs a warning message.
pub fn log_warn(message: &str) {
    if log_enabled!(Level::Warn) {
        warn!("{message}");
    }
}

/// Logs an informational message.
pub fn log_info(message: &str) {
    if log_enabled!(Level::Info) {
        info!("{message}");
    }
}

/// Logs a debug message.
pub fn log_debug(message: &str) {
    if log_enabled!(Level::Debug) {
        debug!("{message}");
    }
}
