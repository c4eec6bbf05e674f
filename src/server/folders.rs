use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};

use crate::server::AppState;
use crate::server::auth::RequireAuth;
use crate::server::dto::{FolderAttachmentsResponse, PurgeResponse};
use crate::server::response::{ApiError, ApiResponse, StoreResultExt};

pub async fn list_folder_attachments(
    _auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let attachment_ids = state
        .service
        .folder_attachments(id)
        .api_err("Failed to list folder attachments")?;

    let count = attachment_ids.len() as i64;
    Ok::<_, ApiError>(Json(ApiResponse::success(FolderAttachmentsResponse {
        folder_id: id,
        attachment_ids,
        count,
    })))
}

/// Count without the listing; cheap enough to poll for every folder
/// badge in a sidebar.
pub async fn count_folder_attachments(
    _auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let count = state
        .service
        .folder_attachment_count(id)
        .api_err("Failed to count folder attachments")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(
        serde_json::json!({ "folder_id": id, "count": count }),
    )))
}

/// Drops every membership referencing a folder that was deleted in the
/// external folder tree. Nothing cascades automatically; the platform
/// calls this when it removes a folder.
pub async fn purge_folder(
    _auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let purged = state
        .service
        .purge_folder(id)
        .api_err("Failed to purge folder memberships")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(PurgeResponse { purged })))
}
