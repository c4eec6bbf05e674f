use std::path::Path;
use std::sync::Mutex;

use rusqlite::{Connection, params};

use super::MembershipStore;
use super::schema::SCHEMA;
use crate::error::{Error, Result};

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// In-memory store, used by tests and embedders that don't want a
    /// database file.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Returns a guard to the underlying database connection.
    /// This allows consuming applications to execute custom SQL.
    pub fn connection(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn()
    }
}

fn dedup(folder_ids: &[i64]) -> Vec<i64> {
    let mut ids = folder_ids.to_vec();
    ids.sort_unstable();
    ids.dedup();
    ids
}

impl MembershipStore for SqliteStore {
    fn initialize(&self) -> Result<()> {
        self.conn().execute_batch(SCHEMA)?;
        Ok(())
    }

    fn get_attachment_folders(&self, attachment_id: i64) -> Result<Vec<i64>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT folder_id FROM attachment_folders
             WHERE attachment_id = ?1 ORDER BY folder_id",
        )?;

        let rows = stmt.query_map(params![attachment_id], |row| row.get(0))?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn set_attachment_folders(&self, attachment_id: i64, folder_ids: &[i64]) -> Result<()> {
        let folder_ids = dedup(folder_ids);

        let mut conn = self.conn();
        let tx = conn.transaction()?;

        tx.execute(
            "DELETE FROM attachment_folders WHERE attachment_id = ?1",
            params![attachment_id],
        )?;

        for folder_id in &folder_ids {
            tx.execute(
                "INSERT INTO attachment_folders (attachment_id, folder_id) VALUES (?1, ?2)",
                params![attachment_id, folder_id],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    fn add_attachment_to_folder(&self, attachment_id: i64, folder_id: i64) -> Result<bool> {
        let rows = self.conn().execute(
            "INSERT OR IGNORE INTO attachment_folders (attachment_id, folder_id) VALUES (?1, ?2)",
            params![attachment_id, folder_id],
        )?;
        Ok(rows > 0)
    }

    fn remove_attachment_from_folder(&self, attachment_id: i64, folder_id: i64) -> Result<bool> {
        let rows = self.conn().execute(
            "DELETE FROM attachment_folders WHERE attachment_id = ?1 AND folder_id = ?2",
            params![attachment_id, folder_id],
        )?;
        Ok(rows > 0)
    }

    fn list_folder_attachments(&self, folder_id: i64) -> Result<Vec<i64>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT attachment_id FROM attachment_folders
             WHERE folder_id = ?1 ORDER BY attachment_id",
        )?;

        let rows = stmt.query_map(params![folder_id], |row| row.get(0))?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn count_folder_attachments(&self, folder_id: i64) -> Result<i64> {
        let conn = self.conn();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM attachment_folders WHERE folder_id = ?1",
            params![folder_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn purge_folder(&self, folder_id: i64) -> Result<i64> {
        let rows = self.conn().execute(
            "DELETE FROM attachment_folders WHERE folder_id = ?1",
            params![folder_id],
        )?;
        Ok(rows as i64)
    }

    fn purge_attachment(&self, attachment_id: i64) -> Result<i64> {
        let rows = self.conn().execute(
            "DELETE FROM attachment_folders WHERE attachment_id = ?1",
            params![attachment_id],
        )?;
        Ok(rows as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_store() -> SqliteStore {
        let store = SqliteStore::open_in_memory().unwrap();
        store.initialize().unwrap();
        store
    }

    #[test]
    fn test_initialize_creates_table() {
        let temp = TempDir::new().unwrap();
        let store = SqliteStore::new(temp.path().join("test.db")).unwrap();
        store.initialize().unwrap();

        let conn = store.conn();
        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();

        assert!(tables.contains(&"attachment_folders".to_string()));
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let store = test_store();
        store.initialize().unwrap();
    }

    #[test]
    fn test_set_and_get_roundtrip() {
        let store = test_store();

        store.set_attachment_folders(10, &[3, 1, 2]).unwrap();
        assert_eq!(store.get_attachment_folders(10).unwrap(), vec![1, 2, 3]);

        // Calling set again with the same folders changes nothing.
        store.set_attachment_folders(10, &[3, 1, 2]).unwrap();
        assert_eq!(store.get_attachment_folders(10).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_set_deduplicates_input() {
        let store = test_store();

        store.set_attachment_folders(10, &[1, 1, 2, 2, 2]).unwrap();
        assert_eq!(store.get_attachment_folders(10).unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_set_replaces_previous_set() {
        let store = test_store();

        store.set_attachment_folders(10, &[1, 2, 3]).unwrap();
        store.set_attachment_folders(10, &[4, 5]).unwrap();
        assert_eq!(store.get_attachment_folders(10).unwrap(), vec![4, 5]);
    }

    #[test]
    fn test_set_empty_uncategorizes() {
        let store = test_store();

        store.set_attachment_folders(10, &[1, 2]).unwrap();
        store.set_attachment_folders(10, &[]).unwrap();
        assert_eq!(store.get_attachment_folders(10).unwrap(), Vec::<i64>::new());
    }

    #[test]
    fn test_get_unknown_attachment_is_empty() {
        let store = test_store();
        assert_eq!(store.get_attachment_folders(999).unwrap(), Vec::<i64>::new());
    }

    #[test]
    fn test_set_rolls_back_on_failure() {
        let store = test_store();

        store.set_attachment_folders(10, &[1, 2, 3]).unwrap();

        // A folder id of 0 violates the CHECK constraint after some rows
        // have already been inserted; the whole transaction must roll
        // back, leaving the previous set intact rather than empty or
        // partially replaced.
        let result = store.set_attachment_folders(10, &[4, 5, 0]);
        assert!(result.is_err());

        assert_eq!(store.get_attachment_folders(10).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_add_is_additive_and_idempotent() {
        let store = test_store();

        store.set_attachment_folders(10, &[1, 2]).unwrap();

        let inserted = store.add_attachment_to_folder(10, 3).unwrap();
        assert!(inserted);
        assert_eq!(store.get_attachment_folders(10).unwrap(), vec![1, 2, 3]);

        // Already present: successful no-op.
        let inserted = store.add_attachment_to_folder(10, 3).unwrap();
        assert!(!inserted);
        assert_eq!(store.get_attachment_folders(10).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_remove_is_precise() {
        let store = test_store();

        store.set_attachment_folders(10, &[1, 2, 3]).unwrap();

        let removed = store.remove_attachment_from_folder(10, 2).unwrap();
        assert!(removed);
        assert_eq!(store.get_attachment_folders(10).unwrap(), vec![1, 3]);

        // Already absent: successful no-op.
        let removed = store.remove_attachment_from_folder(10, 2).unwrap();
        assert!(!removed);
        assert_eq!(store.get_attachment_folders(10).unwrap(), vec![1, 3]);
    }

    #[test]
    fn test_attachments_are_independent() {
        let store = test_store();

        store.set_attachment_folders(10, &[1, 2]).unwrap();
        store.set_attachment_folders(11, &[2, 3]).unwrap();

        store.set_attachment_folders(10, &[]).unwrap();
        assert_eq!(store.get_attachment_folders(11).unwrap(), vec![2, 3]);
    }

    #[test]
    fn test_folder_side_queries() {
        let store = test_store();

        store.set_attachment_folders(10, &[1, 2]).unwrap();
        store.set_attachment_folders(11, &[2]).unwrap();
        store.set_attachment_folders(12, &[2, 3]).unwrap();

        assert_eq!(store.list_folder_attachments(2).unwrap(), vec![10, 11, 12]);
        assert_eq!(store.count_folder_attachments(2).unwrap(), 3);
        assert_eq!(store.count_folder_attachments(99).unwrap(), 0);
    }

    #[test]
    fn test_purge_folder() {
        let store = test_store();

        store.set_attachment_folders(10, &[1, 2]).unwrap();
        store.set_attachment_folders(11, &[2]).unwrap();

        let purged = store.purge_folder(2).unwrap();
        assert_eq!(purged, 2);
        assert_eq!(store.get_attachment_folders(10).unwrap(), vec![1]);
        assert_eq!(store.get_attachment_folders(11).unwrap(), Vec::<i64>::new());

        assert_eq!(store.purge_folder(2).unwrap(), 0);
    }

    #[test]
    fn test_purge_attachment() {
        let store = test_store();

        store.set_attachment_folders(10, &[1, 2]).unwrap();
        store.set_attachment_folders(11, &[2]).unwrap();

        let purged = store.purge_attachment(10).unwrap();
        assert_eq!(purged, 2);
        assert_eq!(store.get_attachment_folders(10).unwrap(), Vec::<i64>::new());
        assert_eq!(store.get_attachment_folders(11).unwrap(), vec![2]);
    }

    #[test]
    fn test_duplicate_pair_rejected_by_schema() {
        let store = test_store();

        store.add_attachment_to_folder(10, 1).unwrap();
        let conn = store.conn();
        let result = conn.execute(
            "INSERT INTO attachment_folders (attachment_id, folder_id) VALUES (10, 1)",
            [],
        );
        assert!(result.is_err());
    }
}
