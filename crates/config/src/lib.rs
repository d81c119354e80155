//! Relay configuration: layered sources (CLI flags, environment, optional
//! `relaybot.toml`) merged into a validated [`RelayConfig`].

pub mod env_subst;
pub mod error;
pub mod loader;
pub mod schema;

pub use {
    error::{ConfigError, MIN_SECRET_LEN},
    loader::{discover_and_load, load_config},
    schema::{PartialConfig, RelayConfig, validate_secret},
};
