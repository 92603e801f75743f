//! Schema module - Configuration types for the decoder.

mod config;

pub use config::*;
