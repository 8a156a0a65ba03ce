//! Common test infrastructure for nea-update tests
//!
//! # Usage
//!
//! ```ignore
//! mod common;
//! use common::*;
//! ```
//!
//! # Modules
//!
//! - `constants`: build numbers, artifact content, known digests
//! - `builders`: runtime config and orchestrator construction against a mock server
//! - `mock_server`: Wiremock setup helpers for the release index and artifacts

// Each test binary uses a different subset of the helpers
#![allow(dead_code)]
#![allow(unused_imports)]

pub mod builders;
pub mod constants;
pub mod mock_server;

pub use builders::*;
pub use constants::*;
pub use mock_server::*;
