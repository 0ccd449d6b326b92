//! Results of a reconciliation pass

use attend_api::ReconciliationOutcome;

use crate::PassError;

/// What a single pass did
#[derive(Debug, Clone, PartialEq)]
pub enum PassReport {
    /// The pass ran to completion; a transition, if any, was confirmed
    Completed(ReconciliationOutcome),

    /// No usable token; nothing was sampled or called
    LoginRequired,

    /// Another pass was still in flight
    Suppressed,

    /// The session ended while the pass was running; results were dropped
    Discarded,

    /// The pass stopped early; state is unchanged and the next tick retries
    Failed(PassError),
}

impl PassReport {
    pub fn outcome(&self) -> Option<&ReconciliationOutcome> {
        match self {
            PassReport::Completed(outcome) => Some(outcome),
            _ => None,
        }
    }
}
