//! Logging setup.
//!
//! Code in the engine logs through the `log` facade; `env_logger` is the only
//! backend wired here.

mod init;

pub use init::{init_logging, LoggingConfig};
