use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::job::{Job, JobChanges, JobStatus, JobType, NewJob};
use crate::models::user::{NewUser, User};
use crate::store::{JobFilter, JobSort, JobStore, UserStore};

const USER_COLUMNS: &str = "id, name, email, password_hash, google_id, created_at, updated_at";
const JOB_COLUMNS: &str =
    "id, position, company, location, status, job_type, created_by, created_at, updated_at";

pub async fn create_pool(config: &Config) -> Result<PgPool> {
    let database_url = config.database_url.as_deref().ok_or_else(|| {
        Error::Config("DATABASE_URL is required for the postgres store".to_string())
    })?;
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(std::time::Duration::from_secs(30))
        .connect(database_url)
        .await?;
    Ok(pool)
}

fn map_unique_violation(err: sqlx::Error) -> Error {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return Error::DuplicateEmail;
        }
    }
    err.into()
}

#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn insert(&self, new_user: NewUser) -> Result<User> {
        let query = format!(
            "INSERT INTO users (id, name, email, password_hash, google_id)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {}",
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(Uuid::new_v4())
            .bind(&new_user.name)
            .bind(&new_user.email)
            .bind(new_user.password_hash.as_deref())
            .bind(new_user.google_id.as_deref())
            .fetch_one(&self.pool)
            .await
            .map_err(map_unique_violation)?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let query = format!(
            "SELECT {} FROM users WHERE LOWER(email) = LOWER($1)",
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let query = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn update_name(&self, id: Uuid, name: &str) -> Result<Option<User>> {
        let query = format!(
            "UPDATE users SET name = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn update_password_hash(&self, id: Uuid, password_hash: &str) -> Result<Option<User>> {
        let query = format!(
            "UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(password_hash)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn link_google_id(&self, id: Uuid, google_id: &str) -> Result<Option<User>> {
        // Only an unlinked account is written; an already linked one falls
        // through to a plain read so the caller still gets the user back.
        let query = format!(
            "UPDATE users SET google_id = $2, updated_at = NOW()
             WHERE id = $1 AND google_id IS NULL
             RETURNING {}",
            USER_COLUMNS
        );
        let linked = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(google_id)
            .fetch_optional(&self.pool)
            .await?;
        match linked {
            Some(user) => Ok(Some(user)),
            None => self.find_by_id(id).await,
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[derive(Debug, FromRow)]
struct JobRow {
    id: Uuid,
    position: String,
    company: String,
    location: String,
    status: String,
    job_type: String,
    created_by: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<JobRow> for Job {
    type Error = Error;

    fn try_from(row: JobRow) -> Result<Job> {
        let status = JobStatus::from_str(&row.status).map_err(|_| {
            Error::Internal(format!("Job {} carries unknown status {}", row.id, row.status))
        })?;
        let job_type = JobType::from_str(&row.job_type).map_err(|_| {
            Error::Internal(format!("Job {} carries unknown type {}", row.id, row.job_type))
        })?;
        Ok(Job {
            id: row.id,
            position: row.position,
            company: row.company,
            location: row.location,
            status,
            job_type,
            created_by: row.created_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// WHERE clause for a job listing. `$1` is always the owner id; the returned
/// args continue the placeholder sequence from `$2` in order.
fn build_filters(filter: &JobFilter) -> (String, Vec<String>) {
    let mut clause = String::from("WHERE created_by = $1");
    let mut args: Vec<String> = Vec::new();
    if let Some(status) = &filter.status {
        args.push(status.clone());
        clause.push_str(&format!(" AND status = ${}", args.len() + 1));
    }
    if let Some(job_type) = &filter.job_type {
        args.push(job_type.clone());
        clause.push_str(&format!(" AND job_type = ${}", args.len() + 1));
    }
    if let Some(search) = &filter.search {
        let pattern = format!("%{}%", search);
        args.push(pattern.clone());
        let first = args.len() + 1;
        args.push(pattern);
        clause.push_str(&format!(
            " AND (position ILIKE ${} OR company ILIKE ${})",
            first,
            first + 1
        ));
    }
    (clause, args)
}

fn order_clause(sort: Option<JobSort>) -> &'static str {
    match sort {
        Some(JobSort::Latest) => " ORDER BY created_at DESC",
        Some(JobSort::Oldest) => " ORDER BY created_at ASC",
        Some(JobSort::PositionAsc) => " ORDER BY position ASC",
        Some(JobSort::PositionDesc) => " ORDER BY position DESC",
        None => "",
    }
}

#[derive(Clone)]
pub struct PgJobStore {
    pool: PgPool,
}

impl PgJobStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobStore for PgJobStore {
    async fn insert(&self, new_job: NewJob) -> Result<Job> {
        let query = format!(
            "INSERT INTO jobs (id, position, company, location, status, job_type, created_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {}",
            JOB_COLUMNS
        );
        let row = sqlx::query_as::<_, JobRow>(&query)
            .bind(Uuid::new_v4())
            .bind(&new_job.position)
            .bind(&new_job.company)
            .bind(&new_job.location)
            .bind(new_job.status.as_str())
            .bind(new_job.job_type.as_str())
            .bind(new_job.created_by)
            .fetch_one(&self.pool)
            .await?;
        row.try_into()
    }

    async fn list(
        &self,
        owner: Uuid,
        filter: &JobFilter,
        sort: Option<JobSort>,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<Job>> {
        let (where_clause, args) = build_filters(filter);
        let limit_pos = args.len() + 2;
        let query = format!(
            "SELECT {} FROM jobs {}{} LIMIT ${} OFFSET ${}",
            JOB_COLUMNS,
            where_clause,
            order_clause(sort),
            limit_pos,
            limit_pos + 1
        );
        let mut q = sqlx::query_as::<_, JobRow>(&query).bind(owner);
        for arg in &args {
            q = q.bind(arg.as_str());
        }
        let rows = q.bind(limit).bind(skip).fetch_all(&self.pool).await?;
        rows.into_iter().map(Job::try_from).collect()
    }

    async fn count(&self, owner: Uuid, filter: &JobFilter) -> Result<i64> {
        let (where_clause, args) = build_filters(filter);
        let query = format!("SELECT COUNT(*) FROM jobs {}", where_clause);
        let mut q = sqlx::query_scalar::<_, i64>(&query).bind(owner);
        for arg in &args {
            q = q.bind(arg.as_str());
        }
        let total = q.fetch_one(&self.pool).await?;
        Ok(total)
    }

    async fn get(&self, owner: Uuid, id: Uuid) -> Result<Option<Job>> {
        let query = format!(
            "SELECT {} FROM jobs WHERE id = $1 AND created_by = $2",
            JOB_COLUMNS
        );
        let row = sqlx::query_as::<_, JobRow>(&query)
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Job::try_from).transpose()
    }

    async fn update(&self, owner: Uuid, id: Uuid, changes: JobChanges) -> Result<Option<Job>> {
        let query = format!(
            "UPDATE jobs SET
                position = COALESCE($3, position),
                company = COALESCE($4, company),
                location = COALESCE($5, location),
                status = COALESCE($6, status),
                job_type = COALESCE($7, job_type),
                updated_at = NOW()
             WHERE id = $1 AND created_by = $2
             RETURNING {}",
            JOB_COLUMNS
        );
        let row = sqlx::query_as::<_, JobRow>(&query)
            .bind(id)
            .bind(owner)
            .bind(changes.position.as_deref())
            .bind(changes.company.as_deref())
            .bind(changes.location.as_deref())
            .bind(changes.status.map(|s| s.as_str()))
            .bind(changes.job_type.map(|t| t.as_str()))
            .fetch_optional(&self.pool)
            .await?;
        row.map(Job::try_from).transpose()
    }

    async fn delete(&self, owner: Uuid, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM jobs WHERE id = $1 AND created_by = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_by_owner(&self, owner: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM jobs WHERE created_by = $1")
            .bind(owner)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn status_counts(&self, owner: Uuid) -> Result<Vec<(JobStatus, i64)>> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            "SELECT status, COUNT(*) FROM jobs WHERE created_by = $1 GROUP BY status",
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter()
            .map(|(status, count)| {
                let status = JobStatus::from_str(&status).map_err(|_| {
                    Error::Internal(format!("Jobs table carries unknown status {}", status))
                })?;
                Ok((status, count))
            })
            .collect()
    }
}
