//! Logger setup.
//!
//! The crate logs through the `log` facade; this module installs
//! `env_logger` as the backend once per process.

mod init;

pub use init::{init_logging, LoggingConfig, DEFAULT_FILTER};
