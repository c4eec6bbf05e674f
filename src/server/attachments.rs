use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};

use crate::server::AppState;
use crate::server::auth::RequireAuth;
use crate::server::dto::{
    AttachmentFoldersRequest, AttachmentFoldersResponse, BulkAssignRequest, BulkAssignResponse,
    PurgeResponse,
};
use crate::server::response::{ApiError, ApiResponse, StoreResultExt};

pub async fn get_attachment_folders(
    _auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let folder_ids = state
        .service
        .folders(id)
        .api_err("Failed to get attachment folders")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(AttachmentFoldersResponse {
        attachment_id: id,
        folder_ids,
    })))
}

/// Applies the request's folder ids to one attachment under the given
/// mode (defaults to `set`). The response carries the resulting set, so
/// clients don't need a follow-up read.
pub async fn set_attachment_folders(
    _auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<AttachmentFoldersRequest>,
) -> impl IntoResponse {
    let folder_ids = state
        .service
        .apply(id, req.mode, &req.folder_ids)
        .api_err("Failed to update attachment folders")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(AttachmentFoldersResponse {
        attachment_id: id,
        folder_ids,
    })))
}

pub async fn add_attachment_folder(
    _auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Path((id, folder_id)): Path<(i64, i64)>,
) -> impl IntoResponse {
    let folder_ids = state
        .service
        .add_one(id, folder_id)
        .api_err("Failed to add attachment to folder")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(AttachmentFoldersResponse {
        attachment_id: id,
        folder_ids,
    })))
}

pub async fn remove_attachment_folder(
    _auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Path((id, folder_id)): Path<(i64, i64)>,
) -> impl IntoResponse {
    let folder_ids = state
        .service
        .remove_one(id, folder_id)
        .api_err("Failed to remove attachment from folder")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(AttachmentFoldersResponse {
        attachment_id: id,
        folder_ids,
    })))
}

pub async fn purge_attachment(
    _auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let purged = state
        .service
        .purge_attachment(id)
        .api_err("Failed to purge attachment memberships")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(PurgeResponse { purged })))
}

/// Applies one folder change to many attachments. Always 200 with a
/// per-attachment tally; partial failure is expected output here, not an
/// error status.
pub async fn bulk_assign(
    _auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Json(req): Json<BulkAssignRequest>,
) -> impl IntoResponse {
    let report = state
        .service
        .apply_many(&req.attachment_ids, req.mode, &req.folder_ids)
        .api_err("Failed to apply bulk folder change")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(BulkAssignResponse { report })))
}
