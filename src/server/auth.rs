//! Static bearer-token gate.
//!
//! Session and capability checks belong to whatever fronts this service
//! (the media platform authenticates its own users); the server itself
//! only verifies the deployment token minted at `manyfold admin init`.

use std::sync::Arc;

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::server::AppState;

/// Extractor that requires the deployment API token.
pub struct RequireAuth;

/// Comparison time must not depend on where the tokens diverge.
fn tokens_match(given: &str, expected: &str) -> bool {
    if given.len() != expected.len() {
        return false;
    }
    given
        .bytes()
        .zip(expected.bytes())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

#[derive(Debug)]
pub enum AuthError {
    MissingAuth,
    InvalidScheme,
    InvalidToken,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::MissingAuth => (StatusCode::UNAUTHORIZED, "Authentication required"),
            AuthError::InvalidScheme => (StatusCode::UNAUTHORIZED, "Invalid authorization scheme"),
            AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid token"),
        };

        let body = json!({ "data": null, "error": message });

        let mut response = (status, Json(body)).into_response();
        response.headers_mut().insert(
            "WWW-Authenticate",
            "Bearer realm=\"manyfold\"".parse().unwrap(),
        );

        response
    }
}

impl FromRequestParts<Arc<AppState>> for RequireAuth {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or(AuthError::MissingAuth)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidScheme)?;

        if !tokens_match(token, &state.api_token) {
            return Err(AuthError::InvalidToken);
        }

        Ok(RequireAuth)
    }
}
