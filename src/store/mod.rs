pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::job::{Job, JobChanges, JobStatus, NewJob};
use crate::models::user::{NewUser, User};

/// Filters for a job listing, already normalized by the service layer: the
/// `all` sentinel and blank search strings have been folded to `None`. The
/// remaining literals are matched verbatim, so a value no job carries simply
/// matches nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobFilter {
    pub status: Option<String>,
    pub job_type: Option<String>,
    pub search: Option<String>,
}

/// Orderings a listing can ask for. `None` at the call site leaves the
/// store's own ordering in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobSort {
    Latest,
    Oldest,
    PositionAsc,
    PositionDesc,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a new account. Fails with [`crate::error::Error::DuplicateEmail`]
    /// when the email is already taken, compared case-insensitively.
    async fn insert(&self, new_user: NewUser) -> Result<User>;

    /// Case-insensitive lookup by email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;

    async fn update_name(&self, id: Uuid, name: &str) -> Result<Option<User>>;

    async fn update_password_hash(&self, id: Uuid, password_hash: &str) -> Result<Option<User>>;

    /// Records the Google subject id on an account that does not have one
    /// yet. An already linked account is returned unchanged.
    async fn link_google_id(&self, id: Uuid, google_id: &str) -> Result<Option<User>>;

    /// Removes the account. Returns `false` when no such user existed.
    async fn delete(&self, id: Uuid) -> Result<bool>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JobStore: Send + Sync {
    async fn insert(&self, new_job: NewJob) -> Result<Job>;

    /// One page of the owner's jobs under `filter`, ordered by `sort` and
    /// windowed by `skip`/`limit`.
    async fn list(
        &self,
        owner: Uuid,
        filter: &JobFilter,
        sort: Option<JobSort>,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<Job>>;

    /// Total number of the owner's jobs matching `filter`, ignoring the page
    /// window.
    async fn count(&self, owner: Uuid, filter: &JobFilter) -> Result<i64>;

    /// Fetch by id, scoped to the owner. A job owned by someone else is
    /// reported the same way as a missing one.
    async fn get(&self, owner: Uuid, id: Uuid) -> Result<Option<Job>>;

    async fn update(&self, owner: Uuid, id: Uuid, changes: JobChanges) -> Result<Option<Job>>;

    async fn delete(&self, owner: Uuid, id: Uuid) -> Result<bool>;

    /// Removes every job the owner has. Returns how many went away.
    async fn delete_by_owner(&self, owner: Uuid) -> Result<u64>;

    /// Per-status counts for the owner. Statuses with no jobs are absent;
    /// zero-filling is the caller's concern.
    async fn status_counts(&self, owner: Uuid) -> Result<Vec<(JobStatus, i64)>>;
}
