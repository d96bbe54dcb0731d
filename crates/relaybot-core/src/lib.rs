//! Relaybot core — configuration, message bus, and shared utilities.
//!
//! This crate holds everything the other crates agree on:
//! - [`config`]: typed configuration (`~/.relaybot/config.json` + env vars)
//! - [`bus`]: the inbound/outbound message queues between the Telegram
//!   channel and the relay loop
//! - [`utils`]: data-directory and path helpers

pub mod bus;
pub mod config;
pub mod utils;

pub use config::{load_config, RelayConfig};
