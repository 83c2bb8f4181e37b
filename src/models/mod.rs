//! Data Models
//!
//! Configuration structures for the responder.

pub mod settings;

pub use settings::*;
