use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// A registered account. `password_hash` is `None` for accounts created
/// through Google sign-in that never set a password. The struct does not
/// implement `Serialize`; response DTOs decide what goes on the wire, so the
/// hash stays out of every response.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub google_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for [`crate::store::UserStore::insert`]. At least one of
/// `password_hash` or `google_id` is expected to be set.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub google_id: Option<String>,
}
