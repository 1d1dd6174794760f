pub mod auth_service;
pub mod google_service;
pub mod job_service;
pub mod token_service;
pub mod user_service;
