#![deny(missing_docs)]
//! Shared logging utilities for the site tracker workspace.
//!
//! This crate provides the `tracker_*` logging macros used across the codebase,
//! a thread-local run id that tags every line logged during a tracking run,
//! and a minimal test initializer for the global logger.

use std::cell::Cell;

#[doc(hidden)]
pub use log;

thread_local! {
    /// Thread-local storage for the id of the tracking run in progress.
    static RUN_ID: Cell<u64> = const { Cell::new(0) };
}

/// Sets the tracking run id for the current thread.
/// The orchestrator calls this once at the start of every run.
pub fn set_run_id(run_id: u64) {
    RUN_ID.with(|v| v.set(run_id));
}

/// Retrieves the tracking run id for the current thread.
/// Returns 0 outside of a run.
pub fn current_run_id() -> u64 {
    RUN_ID.with(|v| v.get())
}

/// Clears the run id once a run has finished.
pub fn clear_run_id() {
    set_run_id(0);
}

/// Prefix prepended to log lines emitted while a run is active.
#[doc(hidden)]
pub fn run_prefix() -> String {
    match current_run_id() {
        0 => String::new(),
        id => format!("[run {id}] "),
    }
}

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! tracker_trace {
    ($($arg:tt)*) => {{
        $crate::log::trace!("{}{}", $crate::run_prefix(), format_args!($($arg)*));
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! tracker_debug {
    ($($arg:tt)*) => {{
        $crate::log::debug!("{}{}", $crate::run_prefix(), format_args!($($arg)*));
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! tracker_info {
    ($($arg:tt)*) => {{
        $crate::log::info!("{}{}", $crate::run_prefix(), format_args!($($arg)*));
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! tracker_warn {
    ($($arg:tt)*) => {{
        $crate::log::warn!("{}{}", $crate::run_prefix(), format_args!($($arg)*));
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! tracker_error {
    ($($arg:tt)*) => {{
        $crate::log::error!("{}{}", $crate::run_prefix(), format_args!($($arg)*));
    }};
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
