// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Logging setup.
//!
//! Diagnostics always go to stderr; stdout is reserved for the generated
//! configuration.

use crate::constants::{DEBUG_LOG_LEVEL, DEFAULT_LOG_LEVEL, LOG_FORMAT_ENV};
use tracing_subscriber::EnvFilter;

/// Log filter used when `RUST_LOG` is not set.
pub fn default_filter(debug: bool) -> &'static str {
    if debug {
        DEBUG_LOG_LEVEL
    } else {
        DEFAULT_LOG_LEVEL
    }
}

/// Initialize logging.
///
/// Respects `RUST_LOG` if set, otherwise logs at `warn`, or `debug` when
/// `debug` is requested. `RUST_LOG_FORMAT=json` switches to JSON output.
pub fn init(debug: bool) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(debug)));

    let log_format = std::env::var(LOG_FORMAT_ENV).unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }
}
