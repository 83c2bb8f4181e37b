//! Storage Layer
//!
//! Handles configuration persistence (TOML).

pub mod config;

pub use config::*;
