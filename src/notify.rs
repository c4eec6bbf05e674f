//! Membership-change notifications.
//!
//! Observers are registered explicitly on the [`MembershipService`] and
//! receive a callback after every successful mutation. Notifications are
//! fire-and-forget: they run after the transaction has committed and
//! cannot fail or undo it. Typical subscribers are cache invalidation
//! and audit logging.
//!
//! [`MembershipService`]: crate::service::MembershipService

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// The whole membership set was replaced.
    Set,
    /// One or more folders were added to the set.
    Added,
    /// One or more folders were removed from the set.
    Removed,
}

/// What changed for one attachment, carrying the post-change set.
#[derive(Debug, Clone, Serialize)]
pub struct MembershipChange {
    pub attachment_id: i64,
    pub folder_ids: Vec<i64>,
    pub kind: ChangeKind,
}

pub trait MembershipObserver: Send + Sync {
    fn membership_changed(&self, change: &MembershipChange);
}

/// Observer that traces every change. Wired in by the server binary so
/// deployments get an audit trail out of the box.
pub struct LogObserver;

impl MembershipObserver for LogObserver {
    fn membership_changed(&self, change: &MembershipChange) {
        tracing::info!(
            attachment_id = change.attachment_id,
            kind = ?change.kind,
            folder_ids = ?change.folder_ids,
            "membership changed"
        );
    }
}
