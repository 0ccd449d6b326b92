//! Shared utilities for attendd
//!
//! This crate provides:
//! - ID types (SessionId) and the opaque SessionToken credential
//! - Time utilities (mockable wall clock, attendance date keys, display formatting)
//! - Default paths for the config file, data directory and database

mod ids;
mod paths;
mod time;

pub use ids::*;
pub use paths::*;
pub use time::*;
