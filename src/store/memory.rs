//! In-memory store used when `STORE_BACKEND=memory`. Data lives only for the
//! lifetime of the process, which is exactly what local demos and the
//! integration tests want.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::job::{Job, JobChanges, JobStatus, NewJob};
use crate::models::user::{NewUser, User};
use crate::store::{JobFilter, JobSort, JobStore, UserStore};

#[derive(Default)]
pub struct MemUserStore {
    users: RwLock<HashMap<Uuid, User>>,
}

impl MemUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemUserStore {
    async fn insert(&self, new_user: NewUser) -> Result<User> {
        let mut users = self.users.write().await;
        if users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(&new_user.email))
        {
            return Err(Error::DuplicateEmail);
        }
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: new_user.name,
            email: new_user.email,
            password_hash: new_user.password_hash,
            google_id: new_user.google_id,
            created_at: now,
            updated_at: now,
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn update_name(&self, id: Uuid, name: &str) -> Result<Option<User>> {
        let mut users = self.users.write().await;
        Ok(users.get_mut(&id).map(|user| {
            user.name = name.to_string();
            user.updated_at = Utc::now();
            user.clone()
        }))
    }

    async fn update_password_hash(&self, id: Uuid, password_hash: &str) -> Result<Option<User>> {
        let mut users = self.users.write().await;
        Ok(users.get_mut(&id).map(|user| {
            user.password_hash = Some(password_hash.to_string());
            user.updated_at = Utc::now();
            user.clone()
        }))
    }

    async fn link_google_id(&self, id: Uuid, google_id: &str) -> Result<Option<User>> {
        let mut users = self.users.write().await;
        Ok(users.get_mut(&id).map(|user| {
            if user.google_id.is_none() {
                user.google_id = Some(google_id.to_string());
                user.updated_at = Utc::now();
            }
            user.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut users = self.users.write().await;
        Ok(users.remove(&id).is_some())
    }
}

/// Jobs are kept newest-first, so the unsorted listing already reads like a
/// feed of recent activity.
#[derive(Default)]
pub struct MemJobStore {
    jobs: RwLock<Vec<Job>>,
}

impl MemJobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches(job: &Job, owner: Uuid, filter: &JobFilter) -> bool {
    if job.created_by != owner {
        return false;
    }
    if let Some(status) = &filter.status {
        if job.status.as_str() != status {
            return false;
        }
    }
    if let Some(job_type) = &filter.job_type {
        if job.job_type.as_str() != job_type {
            return false;
        }
    }
    if let Some(search) = &filter.search {
        let needle = search.to_lowercase();
        let hit = job.position.to_lowercase().contains(&needle)
            || job.company.to_lowercase().contains(&needle);
        if !hit {
            return false;
        }
    }
    true
}

#[async_trait]
impl JobStore for MemJobStore {
    async fn insert(&self, new_job: NewJob) -> Result<Job> {
        let now = Utc::now();
        let job = Job {
            id: Uuid::new_v4(),
            position: new_job.position,
            company: new_job.company,
            location: new_job.location,
            status: new_job.status,
            job_type: new_job.job_type,
            created_by: new_job.created_by,
            created_at: now,
            updated_at: now,
        };
        let mut jobs = self.jobs.write().await;
        jobs.insert(0, job.clone());
        Ok(job)
    }

    async fn list(
        &self,
        owner: Uuid,
        filter: &JobFilter,
        sort: Option<JobSort>,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<Job>> {
        let jobs = self.jobs.read().await;
        let mut selected: Vec<Job> = jobs
            .iter()
            .filter(|job| matches(job, owner, filter))
            .cloned()
            .collect();
        match sort {
            Some(JobSort::Latest) => selected.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            Some(JobSort::Oldest) => selected.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
            Some(JobSort::PositionAsc) => selected.sort_by(|a, b| a.position.cmp(&b.position)),
            Some(JobSort::PositionDesc) => selected.sort_by(|a, b| b.position.cmp(&a.position)),
            None => {}
        }
        let skip = skip.max(0) as usize;
        let limit = limit.max(0) as usize;
        Ok(selected.into_iter().skip(skip).take(limit).collect())
    }

    async fn count(&self, owner: Uuid, filter: &JobFilter) -> Result<i64> {
        let jobs = self.jobs.read().await;
        Ok(jobs.iter().filter(|job| matches(job, owner, filter)).count() as i64)
    }

    async fn get(&self, owner: Uuid, id: Uuid) -> Result<Option<Job>> {
        let jobs = self.jobs.read().await;
        Ok(jobs
            .iter()
            .find(|job| job.id == id && job.created_by == owner)
            .cloned())
    }

    async fn update(&self, owner: Uuid, id: Uuid, changes: JobChanges) -> Result<Option<Job>> {
        let mut jobs = self.jobs.write().await;
        let Some(job) = jobs
            .iter_mut()
            .find(|job| job.id == id && job.created_by == owner)
        else {
            return Ok(None);
        };
        if let Some(position) = changes.position {
            job.position = position;
        }
        if let Some(company) = changes.company {
            job.company = company;
        }
        if let Some(location) = changes.location {
            job.location = location;
        }
        if let Some(status) = changes.status {
            job.status = status;
        }
        if let Some(job_type) = changes.job_type {
            job.job_type = job_type;
        }
        job.updated_at = Utc::now();
        Ok(Some(job.clone()))
    }

    async fn delete(&self, owner: Uuid, id: Uuid) -> Result<bool> {
        let mut jobs = self.jobs.write().await;
        let before = jobs.len();
        jobs.retain(|job| !(job.id == id && job.created_by == owner));
        Ok(jobs.len() < before)
    }

    async fn delete_by_owner(&self, owner: Uuid) -> Result<u64> {
        let mut jobs = self.jobs.write().await;
        let before = jobs.len();
        jobs.retain(|job| job.created_by != owner);
        Ok((before - jobs.len()) as u64)
    }

    async fn status_counts(&self, owner: Uuid) -> Result<Vec<(JobStatus, i64)>> {
        let jobs = self.jobs.read().await;
        let mut counts: HashMap<JobStatus, i64> = HashMap::new();
        for job in jobs.iter().filter(|job| job.created_by == owner) {
            *counts.entry(job.status).or_insert(0) += 1;
        }
        Ok(counts.into_iter().collect())
    }
}
