//! Attendance service contract for attendd
//!
//! The reconciliation core talks to the remote attendance service only
//! through [`AttendanceApi`]. Two implementations live here:
//! - [`HttpAttendanceApi`]: the real service over HTTPS
//! - [`MockAttendanceApi`]: an in-memory service for tests

mod http;
mod mock;

pub use http::*;
pub use mock::*;

use async_trait::async_trait;
use attend_api::{AttendanceRecord, CheckInResponse};
use attend_util::SessionToken;
use thiserror::Error;

/// Header carrying the employee credential on every call
pub const TOKEN_HEADER: &str = "x-employee-token";

/// Errors from the attendance service
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RemoteError {
    /// The service rejected the token (401/403)
    #[error("Session token rejected by attendance service")]
    Unauthorized,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Unexpected status {code}: {body}")]
    Status { code: u16, body: String },

    #[error("Malformed response: {0}")]
    Decode(String),
}

impl RemoteError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, RemoteError::Unauthorized)
    }
}

pub type RemoteResult<T> = Result<T, RemoteError>;

/// The remote attendance service
#[async_trait]
pub trait AttendanceApi: Send + Sync {
    /// List every attendance record of the employee
    async fn list_attendance(&self, token: &SessionToken) -> RemoteResult<Vec<AttendanceRecord>>;

    /// Check the employee in for today
    async fn check_in(&self, token: &SessionToken) -> RemoteResult<CheckInResponse>;

    /// Check the employee out of today's open record
    async fn check_out(&self, token: &SessionToken) -> RemoteResult<()>;
}
