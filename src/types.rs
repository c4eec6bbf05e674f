use serde::{Deserialize, Serialize};

/// How a batch of folder ids is applied to an attachment's membership set.
///
/// Whatever the mode, the write the storage layer sees is always a full
/// replacement of the attachment's set, so readers never observe a
/// half-applied update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignMode {
    /// Replace the whole membership set with exactly the given folders.
    #[default]
    Set,
    /// Union the given folders into the current set; never removes.
    Add,
    /// Subtract the given folders from the current set.
    Remove,
}

/// Per-attachment outcome of a bulk apply.
#[derive(Debug, Clone, Serialize)]
pub struct BulkItem {
    pub attachment_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder_ids: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Tally for a bulk apply across attachments.
///
/// Bulk operations are never a single transaction: each attachment's
/// update commits (or fails) on its own, and the report carries every
/// outcome rather than collapsing them into one boolean.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BulkReport {
    pub succeeded: u32,
    pub failed: u32,
    pub items: Vec<BulkItem>,
}

impl BulkReport {
    pub fn record_success(&mut self, attachment_id: i64, folder_ids: Vec<i64>) {
        self.succeeded += 1;
        self.items.push(BulkItem {
            attachment_id,
            folder_ids: Some(folder_ids),
            error: None,
        });
    }

    pub fn record_failure(&mut self, attachment_id: i64, error: impl Into<String>) {
        self.failed += 1;
        self.items.push(BulkItem {
            attachment_id,
            folder_ids: None,
            error: Some(error.into()),
        });
    }
}
