//! Linux host adapters for attendd
//!
//! Provides:
//! - Location from an external command, a fixed coordinate, or nothing
//! - Desktop notifications through `notify-send` or a compatible command

mod location;
mod notify;

pub use location::*;
pub use notify::*;
