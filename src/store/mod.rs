mod schema;
mod sqlite;

pub use sqlite::SqliteStore;

use crate::error::Result;

/// MembershipStore defines the database interface for the
/// attachment<->folder relation.
///
/// Attachment and folder ids are foreign references owned by external
/// systems; the store records associations without verifying that either
/// side exists. Callers are expected to pass positive ids (the service
/// layer enforces this); the schema's CHECK constraints are the backstop.
pub trait MembershipStore: Send + Sync {
    fn initialize(&self) -> Result<()>;

    /// Folder ids currently associated with the attachment, ascending.
    /// Empty if the attachment is uncategorized.
    fn get_attachment_folders(&self, attachment_id: i64) -> Result<Vec<i64>>;

    /// Replaces the attachment's entire membership set with `folder_ids`
    /// (deduplicated), inside a single transaction. On failure the prior
    /// set is left intact. An empty slice leaves the attachment
    /// uncategorized.
    fn set_attachment_folders(&self, attachment_id: i64, folder_ids: &[i64]) -> Result<()>;

    /// Idempotent upsert of a single membership row. Never touches the
    /// attachment's other memberships. Returns true iff a row was
    /// actually inserted.
    fn add_attachment_to_folder(&self, attachment_id: i64, folder_id: i64) -> Result<bool>;

    /// Deletes exactly the one (attachment, folder) row. Returns true
    /// iff a row was actually deleted; an absent pair is a successful
    /// no-op.
    fn remove_attachment_from_folder(&self, attachment_id: i64, folder_id: i64) -> Result<bool>;

    // Folder-side queries
    fn list_folder_attachments(&self, folder_id: i64) -> Result<Vec<i64>>;
    fn count_folder_attachments(&self, folder_id: i64) -> Result<i64>;

    // Orphan cleanup for externally-deleted entities. Neither side of
    // the relation is cascade-deleted automatically; these remove every
    // row referencing the id and return the count.
    fn purge_folder(&self, folder_id: i64) -> Result<i64>;
    fn purge_attachment(&self, attachment_id: i64) -> Result<i64>;
}
