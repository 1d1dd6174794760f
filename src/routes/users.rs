use axum::{
    extract::State,
    response::{IntoResponse, Json},
    Extension,
};
use serde_json::json;

use crate::{
    dto::user_dto::{ProfileResponse, UpdatePasswordPayload, UpdateProfilePayload},
    error::Result,
    middleware::auth::CurrentUser,
    AppState,
};

#[utoipa::path(
    put,
    path = "/api/users/update-profile",
    request_body = UpdateProfilePayload,
    responses(
        (status = 200, description = "Profile updated", body = Json<ProfileResponse>),
        (status = 400, description = "Name is required"),
        (status = 404, description = "User not found")
    )
)]
#[axum::debug_handler]
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<UpdateProfilePayload>,
) -> Result<impl IntoResponse> {
    let updated = state.user_service.update_profile(user.0, &payload.name).await?;
    Ok(Json(ProfileResponse {
        message: "Profile updated".to_string(),
        user: updated.into(),
    }))
}

#[utoipa::path(
    put,
    path = "/api/users/update-password",
    request_body = UpdatePasswordPayload,
    responses(
        (status = 200, description = "Password updated"),
        (status = 400, description = "Missing, short or wrong password"),
        (status = 404, description = "User not found")
    )
)]
#[axum::debug_handler]
pub async fn update_password(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<UpdatePasswordPayload>,
) -> Result<impl IntoResponse> {
    state
        .user_service
        .update_password(user.0, &payload.old_password, &payload.new_password)
        .await?;
    Ok(Json(json!({ "message": "Password updated successfully" })))
}

#[utoipa::path(
    delete,
    path = "/api/users/delete",
    responses(
        (status = 200, description = "Account and jobs removed"),
        (status = 401, description = "Missing or invalid token")
    )
)]
#[axum::debug_handler]
pub async fn delete_account(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse> {
    state.user_service.delete_account(user.0).await?;
    Ok(Json(
        json!({ "message": "Account and all jobs deleted successfully" }),
    ))
}
