//! Errors raised inside a reconciliation pass

use attend_host_api::LocationError;
use attend_remote::RemoteError;
use thiserror::Error;

/// Why a pass stopped early. Never escapes the scheduler.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PassError {
    #[error(transparent)]
    Location(#[from] LocationError),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// The service answered check-in without confirming it
    #[error("Check-in not confirmed: {message}")]
    CheckInNotConfirmed { message: String },
}

pub type PassResult<T> = Result<T, PassError>;
