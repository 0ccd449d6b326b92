//! Platform trait interfaces for attendd
//!
//! This crate defines the capability-based interface between the
//! reconciliation core and platform-specific implementations: a one-shot
//! geolocation query and a permission-gated notification display.
//! It contains no platform code itself.

mod mock;
mod traits;

pub use mock::*;
pub use traits::*;
