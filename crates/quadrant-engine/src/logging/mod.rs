//! Logging utilities.
//!
//! This module centralizes logger initialization. Everything else in the
//! workspace logs through the `log` facade only.

mod init;

pub use init::{DEFAULT_FILTER, LoggingConfig, init_logging};
