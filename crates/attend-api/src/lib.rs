//! Shared domain types for attendd
//!
//! This crate defines the values that flow through a reconciliation pass:
//! - Office geofence and location samples
//! - Attendance records as returned by the attendance service
//! - Reconciliation outcomes and attendance state
//! - Status messages and the engine snapshot shown to the user

mod status;
mod types;

pub use status::*;
pub use types::*;

/// Default check-in notification title when the service supplies none
pub const DEFAULT_CHECK_IN_TITLE: &str = "Check-in";

/// Default check-in notification body when the service supplies none
pub const DEFAULT_CHECK_IN_BODY: &str = "Successfully checked in";
