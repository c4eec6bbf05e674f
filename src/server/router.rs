use std::sync::Arc;
use std::time::Instant;

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::{
    Router,
    routing::{delete, get, post, put},
};

use super::{attachments, folders};
use crate::service::MembershipService;

pub struct AppState {
    pub service: Arc<MembershipService>,
    /// Deployment token checked by the `RequireAuth` extractor.
    pub api_token: String,
}

impl AppState {
    pub fn new(service: Arc<MembershipService>, api_token: String) -> Self {
        Self { service, api_token }
    }
}

async fn health() -> &'static str {
    "OK"
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    let latency = start.elapsed();
    let status = response.status();

    tracing::info!(
        "{} {} {} {}ms",
        method,
        uri.path(),
        status.as_u16(),
        latency.as_millis()
    );

    response
}

pub fn create_router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        // Attachment side
        .route(
            "/attachments/{id}/folders",
            get(attachments::get_attachment_folders),
        )
        .route(
            "/attachments/{id}/folders",
            put(attachments::set_attachment_folders),
        )
        .route(
            "/attachments/{id}/folders/{folder_id}",
            post(attachments::add_attachment_folder),
        )
        .route(
            "/attachments/{id}/folders/{folder_id}",
            delete(attachments::remove_attachment_folder),
        )
        .route("/attachments/{id}", delete(attachments::purge_attachment))
        .route("/attachments/folders", post(attachments::bulk_assign))
        // Folder side
        .route(
            "/folders/{id}/attachments",
            get(folders::list_folder_attachments),
        )
        .route(
            "/folders/{id}/attachments/count",
            get(folders::count_folder_attachments),
        )
        .route("/folders/{id}/attachments", delete(folders::purge_folder));

    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api)
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}
