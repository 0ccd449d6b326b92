//! Store trait definitions

use attend_util::SessionToken;

use crate::{AuditEvent, StoreResult};

/// Main store trait
pub trait Store: Send + Sync {
    // Audit log

    /// Append an audit event
    fn append_audit(&self, event: AuditEvent) -> StoreResult<()>;

    /// Get recent audit events, newest first
    fn get_recent_audits(&self, limit: usize) -> StoreResult<Vec<AuditEvent>>;

    // Session token

    /// Load the saved session token, if any
    fn load_token(&self) -> StoreResult<Option<SessionToken>>;

    /// Save the session token, replacing any previous one
    fn save_token(&self, token: &SessionToken) -> StoreResult<()>;

    /// Remove the saved session token. Returns whether one existed.
    fn clear_token(&self) -> StoreResult<bool>;

    // Health

    /// Check if store is healthy
    fn is_healthy(&self) -> bool;
}
