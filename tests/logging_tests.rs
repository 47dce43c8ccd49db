//! Unit tests for the logging functionality in the `st25dv-rs` crate.

use log::LevelFilter;
use st25dv_rs::logging::{init_logger_with_level, log_debug, log_error, log_info, log_warn};

/// Tests that the logging helpers work as expected after initialization.
#[test]
fn test_logging() {
    init_logger_with_level(LevelFilter::Trace);
    log_error("This is an error message");
    log_warn("This is a warning message");
    log_info("This is an info message");
    log_debug("This is a debug message");
}

/// Tests that driver traffic can be logged at trace level without panicking.
#[test]
fn test_driver_logs_at_trace() {
    init_logger_with_level(LevelFilter::Trace);
    let mut driver = st25dv_rs::St25dvDriver::new(st25dv_rs::MockI2cBus::new());
    driver.read_tag_info().unwrap();
    assert!(driver.unlock_with_factory_password().unwrap());
}
