pub const SCHEMA: &str = r#"
-- The attachment<->folder many-to-many relation. Both ids reference
-- entities owned by external systems (media manager, folder tree); no
-- foreign keys on purpose. The pair is the primary key, so a membership
-- can never be recorded twice.
CREATE TABLE IF NOT EXISTS attachment_folders (
    attachment_id INTEGER NOT NULL CHECK (attachment_id > 0),
    folder_id INTEGER NOT NULL CHECK (folder_id > 0),
    created_at TEXT DEFAULT (datetime('now')),
    PRIMARY KEY (attachment_id, folder_id)
);

CREATE INDEX IF NOT EXISTS idx_attachment_folders_folder ON attachment_folders(folder_id);
"#;
