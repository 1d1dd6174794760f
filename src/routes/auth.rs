use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use validator::Validate;

use crate::{
    dto::auth_dto::{AuthResponse, GoogleTokenPayload, LoginPayload, RegisterPayload},
    error::Result,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterPayload,
    responses(
        (status = 201, description = "Account created", body = Json<AuthResponse>),
        (status = 400, description = "Invalid fields or email already in use")
    )
)]
#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let (user, token) = state
        .auth_service
        .register(payload.name, payload.email, payload.password)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User registered successfully".to_string(),
            user: user.into(),
            token,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Logged in", body = Json<AuthResponse>),
        (status = 400, description = "Invalid email or password")
    )
)]
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<impl IntoResponse> {
    let (user, token) = state
        .auth_service
        .login(&payload.email, &payload.password)
        .await?;
    Ok(Json(AuthResponse {
        message: "Login successful".to_string(),
        user: user.into(),
        token,
    }))
}

#[utoipa::path(
    post,
    path = "/api/auth/google/token",
    request_body = GoogleTokenPayload,
    responses(
        (status = 200, description = "Signed in with Google", body = Json<AuthResponse>),
        (status = 401, description = "Google token rejected")
    )
)]
#[axum::debug_handler]
pub async fn google_token(
    State(state): State<AppState>,
    Json(payload): Json<GoogleTokenPayload>,
) -> Result<impl IntoResponse> {
    let (user, token) = state.auth_service.login_with_google(&payload.token).await?;
    Ok(Json(AuthResponse {
        message: "Google login successful".to_string(),
        user: user.into(),
        token,
    }))
}
