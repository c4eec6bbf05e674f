//! Policy layer over the membership store.
//!
//! The service is constructed once at startup and handed to the request
//! layer; it owns input validation, the set/add/remove mode semantics,
//! bulk application across attachments, and change notifications. All
//! mutations bottom out in [`MembershipStore::set_attachment_folders`]
//! (or a single-pair upsert/delete), so the atomic unit an external
//! reader can observe is always the full membership set of one
//! attachment.

use std::sync::{Arc, RwLock};

use crate::error::{Error, Result};
use crate::notify::{ChangeKind, MembershipChange, MembershipObserver};
use crate::store::MembershipStore;
use crate::types::{AssignMode, BulkReport};

pub struct MembershipService {
    store: Arc<dyn MembershipStore>,
    observers: RwLock<Vec<Arc<dyn MembershipObserver>>>,
}

fn validate_attachment_id(attachment_id: i64) -> Result<()> {
    if attachment_id <= 0 {
        return Err(Error::InvalidId("attachment", attachment_id));
    }
    Ok(())
}

fn validate_folder_id(folder_id: i64) -> Result<()> {
    if folder_id <= 0 {
        return Err(Error::InvalidId("folder", folder_id));
    }
    Ok(())
}

fn validate_folder_ids(folder_ids: &[i64]) -> Result<()> {
    for &id in folder_ids {
        validate_folder_id(id)?;
    }
    Ok(())
}

impl MembershipService {
    pub fn new(store: Arc<dyn MembershipStore>) -> Self {
        Self {
            store,
            observers: RwLock::new(Vec::new()),
        }
    }

    /// Registers an observer for membership changes. Observers are
    /// invoked after the mutation has committed and cannot affect its
    /// outcome.
    pub fn subscribe(&self, observer: Arc<dyn MembershipObserver>) {
        self.observers
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(observer);
    }

    fn notify(&self, attachment_id: i64, folder_ids: &[i64], kind: ChangeKind) {
        let change = MembershipChange {
            attachment_id,
            folder_ids: folder_ids.to_vec(),
            kind,
        };
        let observers = self.observers.read().unwrap_or_else(|e| e.into_inner());
        for observer in observers.iter() {
            observer.membership_changed(&change);
        }
    }

    /// Folder ids for one attachment, ascending. Empty means
    /// uncategorized.
    pub fn folders(&self, attachment_id: i64) -> Result<Vec<i64>> {
        validate_attachment_id(attachment_id)?;
        self.store.get_attachment_folders(attachment_id)
    }

    pub fn folder_attachments(&self, folder_id: i64) -> Result<Vec<i64>> {
        validate_folder_id(folder_id)?;
        self.store.list_folder_attachments(folder_id)
    }

    pub fn folder_attachment_count(&self, folder_id: i64) -> Result<i64> {
        validate_folder_id(folder_id)?;
        self.store.count_folder_attachments(folder_id)
    }

    /// Applies `folder_ids` to one attachment under the given mode and
    /// returns the resulting membership set.
    ///
    /// `add` and `remove` are read-modify-replace: the current set is
    /// unioned with (or subtracted by) the request and the result is
    /// written with one transactional set, so even a multi-folder add is
    /// all-or-nothing. Two racing applies on the same attachment
    /// serialize at the storage layer; the last commit wins the whole
    /// set.
    pub fn apply(
        &self,
        attachment_id: i64,
        mode: AssignMode,
        folder_ids: &[i64],
    ) -> Result<Vec<i64>> {
        validate_attachment_id(attachment_id)?;
        validate_folder_ids(folder_ids)?;

        let (target, kind) = match mode {
            AssignMode::Set => (folder_ids.to_vec(), ChangeKind::Set),
            AssignMode::Add => {
                let mut current = self.store.get_attachment_folders(attachment_id)?;
                current.extend_from_slice(folder_ids);
                (current, ChangeKind::Added)
            }
            AssignMode::Remove => {
                let current = self.store.get_attachment_folders(attachment_id)?;
                let target = current
                    .into_iter()
                    .filter(|id| !folder_ids.contains(id))
                    .collect();
                (target, ChangeKind::Removed)
            }
        };

        self.store.set_attachment_folders(attachment_id, &target)?;

        let result = self.store.get_attachment_folders(attachment_id)?;
        self.notify(attachment_id, &result, kind);
        Ok(result)
    }

    /// Single-pair additive assignment. Never touches the attachment's
    /// other folders; adding an existing pair is a successful no-op and
    /// emits no notification.
    pub fn add_one(&self, attachment_id: i64, folder_id: i64) -> Result<Vec<i64>> {
        validate_attachment_id(attachment_id)?;
        validate_folder_id(folder_id)?;

        let inserted = self.store.add_attachment_to_folder(attachment_id, folder_id)?;
        let result = self.store.get_attachment_folders(attachment_id)?;
        if inserted {
            self.notify(attachment_id, &result, ChangeKind::Added);
        }
        Ok(result)
    }

    /// Single-pair removal. Removing an absent pair is a successful
    /// no-op and emits no notification.
    pub fn remove_one(&self, attachment_id: i64, folder_id: i64) -> Result<Vec<i64>> {
        validate_attachment_id(attachment_id)?;
        validate_folder_id(folder_id)?;

        let deleted = self
            .store
            .remove_attachment_from_folder(attachment_id, folder_id)?;
        let result = self.store.get_attachment_folders(attachment_id)?;
        if deleted {
            self.notify(attachment_id, &result, ChangeKind::Removed);
        }
        Ok(result)
    }

    /// Applies `folder_ids` under `mode` to each attachment in turn.
    ///
    /// Each attachment's update is its own atomic unit: a failure on one
    /// neither rolls back the attachments already written nor stops the
    /// remainder. The report carries every per-item outcome.
    pub fn apply_many(
        &self,
        attachment_ids: &[i64],
        mode: AssignMode,
        folder_ids: &[i64],
    ) -> Result<BulkReport> {
        validate_folder_ids(folder_ids)?;

        let mut report = BulkReport::default();
        for &attachment_id in attachment_ids {
            match self.apply(attachment_id, mode, folder_ids) {
                Ok(result) => report.record_success(attachment_id, result),
                Err(e) => {
                    tracing::warn!(attachment_id, error = %e, "bulk apply item failed");
                    report.record_failure(attachment_id, e.to_string());
                }
            }
        }
        Ok(report)
    }

    /// Removes every membership row for an externally-deleted folder.
    /// Each attachment that lost the folder gets a removal notification
    /// carrying its remaining set.
    pub fn purge_folder(&self, folder_id: i64) -> Result<i64> {
        validate_folder_id(folder_id)?;
        let affected = self.store.list_folder_attachments(folder_id)?;
        let purged = self.store.purge_folder(folder_id)?;
        if purged > 0 {
            tracing::info!(folder_id, purged, "purged folder memberships");
            for attachment_id in affected {
                let remaining = self.store.get_attachment_folders(attachment_id)?;
                self.notify(attachment_id, &remaining, ChangeKind::Removed);
            }
        }
        Ok(purged)
    }

    /// Removes every membership row for an externally-deleted attachment.
    pub fn purge_attachment(&self, attachment_id: i64) -> Result<i64> {
        validate_attachment_id(attachment_id)?;
        let purged = self.store.purge_attachment(attachment_id)?;
        if purged > 0 {
            self.notify(attachment_id, &[], ChangeKind::Removed);
        }
        Ok(purged)
    }
}
