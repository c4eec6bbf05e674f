use serde::{Deserialize, Serialize};

use crate::types::{AssignMode, BulkReport};

#[derive(Debug, Deserialize)]
pub struct AttachmentFoldersRequest {
    pub folder_ids: Vec<i64>,
    #[serde(default)]
    pub mode: AssignMode,
}

#[derive(Debug, Deserialize)]
pub struct BulkAssignRequest {
    pub attachment_ids: Vec<i64>,
    pub folder_ids: Vec<i64>,
    #[serde(default)]
    pub mode: AssignMode,
}

#[derive(Debug, Serialize)]
pub struct AttachmentFoldersResponse {
    pub attachment_id: i64,
    pub folder_ids: Vec<i64>,
}

#[derive(Debug, Serialize)]
pub struct BulkAssignResponse {
    #[serde(flatten)]
    pub report: BulkReport,
}

#[derive(Debug, Serialize)]
pub struct FolderAttachmentsResponse {
    pub folder_id: i64,
    pub attachment_ids: Vec<i64>,
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct PurgeResponse {
    pub purged: i64,
}
