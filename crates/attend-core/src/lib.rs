//! Geofence reconciliation core for attendd
//!
//! This crate contains:
//! - Haversine distance to the office
//! - One-shot location sampling with a deadline
//! - Fetching today's open attendance record
//! - The CHECK_IN / CHECK_OUT / NONE decision and the engine that acts on it
//! - Session lifecycle and the periodic scheduler bound to it
//! - Permission-gated notifications

mod distance;
mod engine;
mod error;
mod fetcher;
mod notifier;
mod reconciler;
mod report;
mod sampler;
mod scheduler;
mod session;

pub use distance::*;
pub use engine::*;
pub use error::*;
pub use fetcher::*;
pub use notifier::*;
pub use reconciler::*;
pub use report::*;
pub use sampler::*;
pub use scheduler::*;
pub use session::*;
