pub mod config;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;
pub mod utils;

use std::sync::Arc;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::services::{
    auth_service::AuthService, google_service::GoogleAuthService, job_service::JobService,
    token_service::TokenService, user_service::UserService,
};
use crate::store::{JobStore, UserStore};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub token_service: TokenService,
    pub auth_service: AuthService,
    pub job_service: JobService,
    pub user_service: UserService,
}

impl AppState {
    pub fn new(config: Config, users: Arc<dyn UserStore>, jobs: Arc<dyn JobStore>) -> Self {
        let token_service = TokenService::new(&config.jwt_secret, config.jwt_ttl_secs);
        let google = config
            .google_client_id
            .clone()
            .map(|client_id| Arc::new(GoogleAuthService::new(client_id)));
        let auth_service = AuthService::new(users.clone(), token_service.clone(), google);
        let job_service = JobService::new(jobs.clone());
        let user_service = UserService::new(users, jobs);

        Self {
            config: Arc::new(config),
            token_service,
            auth_service,
            job_service,
            user_service,
        }
    }
}

/// Assembles the full router over `state`. Used by `main` and by the
/// integration tests, so both always serve the identical surface.
pub fn app(state: AppState) -> Router {
    let base_routes = Router::new().route("/health", get(routes::health::health));

    let auth_api = Router::new()
        .route("/api/auth/register", post(routes::auth::register))
        .route("/api/auth/login", post(routes::auth::login))
        .route("/api/auth/google/token", post(routes::auth::google_token));

    // `/stats` sits alongside `/:id`; the router prefers the static segment,
    // so `stats` is never parsed as a job id.
    let jobs_api = Router::new()
        .route(
            "/api/jobs",
            get(routes::jobs::list_jobs).post(routes::jobs::create_job),
        )
        .route("/api/jobs/stats", get(routes::jobs::job_stats))
        .route(
            "/api/jobs/:id",
            get(routes::jobs::get_job)
                .put(routes::jobs::update_job)
                .delete(routes::jobs::delete_job),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_bearer_auth,
        ));

    let users_api = Router::new()
        .route(
            "/api/users/update-profile",
            put(routes::users::update_profile),
        )
        .route(
            "/api/users/update-password",
            put(routes::users::update_password),
        )
        .route("/api/users/delete", delete(routes::users::delete_account))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_bearer_auth,
        ));

    let cors = middleware::cors::cors_layer(state.config.client_origin.as_deref());

    base_routes
        .merge(auth_api)
        .merge(jobs_api)
        .merge(users_api)
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
