//! Type definitions for updater configuration

mod runtime_config;

pub use runtime_config::*;
