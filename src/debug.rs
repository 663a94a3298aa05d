// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Firmware Logging
//!
//! Crate-internal logging macros. With the `logging` feature (the default)
//! they forward to the [`log`] facade, so the board code decides where the
//! lines end up (early UART, RAM console, nowhere). Without the feature the
//! arguments are still type-checked but nothing is emitted.
//!
//! # Usage
//!
//! ```ignore
//! log_info!("GICv2: {} lines", count);
//! log_error!("GICv2: reserved interrupt id {}", id);
//! ```

#[cfg(feature = "logging")]
#[doc(hidden)]
pub use log as __log;

/// Log target used for every line emitted by this crate
pub const LOG_TARGET: &str = "bootirq";

#[cfg(feature = "logging")]
macro_rules! __log_at {
    ($level:ident, $($arg:tt)*) => {
        $crate::debug::__log::$level!(target: $crate::debug::LOG_TARGET, $($arg)*)
    };
}

#[cfg(not(feature = "logging"))]
macro_rules! __log_at {
    ($level:ident, $($arg:tt)*) => {{
        let _ = format_args!($($arg)*);
    }};
}

/// Log a trace message
macro_rules! log_trace {
    ($($arg:tt)*) => { __log_at!(trace, $($arg)*) };
}

/// Log a debug message
macro_rules! log_debug {
    ($($arg:tt)*) => { __log_at!(debug, $($arg)*) };
}

/// Log an info message
macro_rules! log_info {
    ($($arg:tt)*) => { __log_at!(info, $($arg)*) };
}

/// Log a warning message
macro_rules! log_warn {
    ($($arg:tt)*) => { __log_at!(warn, $($arg)*) };
}

/// Log an error message
macro_rules! log_error {
    ($($arg:tt)*) => { __log_at!(error, $($arg)*) };
}
