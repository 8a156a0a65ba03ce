//! # nea-core
//!
//! Core library for the NotEnoughAddons updater providing:
//! - Runtime configuration types (network, release source, artifact layout)
//! - Hierarchical configuration loading (embedded defaults, file, environment)
//! - The shared error type

pub mod config;
pub mod error;
pub mod types;

pub use config::HierarchicalConfigLoader;
pub use error::{Error, Result};
