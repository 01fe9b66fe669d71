//! fxctl Library
//!
//! Operator tooling for the Tonebridge effects layer: capability dumps,
//! default-state export and persisted-state inspection against the
//! reference engines.
//!
//! This library exposes the command implementations for testing purposes.

pub mod commands;
pub mod config;
pub mod error;

pub use config::{load, DEFAULT_CONFIG_FILE, ENV_PREFIX};
pub use error::{CliError, Result};
