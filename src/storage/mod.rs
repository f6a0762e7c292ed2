//! Client configuration storage
//!
//! Targets, the current-target selection, and the session token live in a
//! single TOML file under the user config directory. Writes are atomic
//! (temp file + rename) and serialized with an exclusive file lock so
//! concurrent invocations don't tear the file.

mod config;

pub use config::{ClientConfig, ConfigError, ConfigStore};
