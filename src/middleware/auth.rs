use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use uuid::Uuid;

use crate::AppState;

/// Identity established by [`require_bearer_auth`], pulled out of request
/// extensions by the protected handlers. Carries only the user id; every
/// ownership check downstream keys on it.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub Uuid);

pub async fn require_bearer_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let Some(auth_header) = req.headers().get(axum::http::header::AUTHORIZATION) else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "Unauthorized - No token provided"})),
        )
            .into_response();
    };
    let Ok(auth_str) = auth_header.to_str() else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "Unauthorized - No token provided"})),
        )
            .into_response();
    };
    let Some(token) = auth_str.strip_prefix("Bearer ") else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "Unauthorized - No token provided"})),
        )
            .into_response();
    };

    match state.token_service.verify(token) {
        Ok(user_id) => {
            req.extensions_mut().insert(CurrentUser(user_id));
            next.run(req).await
        }
        Err(_) => (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "Unauthorized - Invalid token"})),
        )
            .into_response(),
    }
}
