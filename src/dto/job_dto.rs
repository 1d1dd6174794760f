use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::job::{Job, JobStatus, JobType};
use crate::services::job_service::JobPage;

/// `status` and `jobType` ride as plain strings and are parsed against the
/// known literals by the service, so an unknown value answers 400 rather
/// than a deserialization failure.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobPayload {
    #[serde(default)]
    #[validate(length(min = 1, message = "Position is required"))]
    pub position: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Company is required"))]
    pub company: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Location is required"))]
    pub location: String,
    pub status: Option<String>,
    pub job_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateJobPayload {
    #[validate(length(min = 1, message = "Position cannot be empty"))]
    pub position: Option<String>,
    #[validate(length(min = 1, message = "Company cannot be empty"))]
    pub company: Option<String>,
    #[validate(length(min = 1, message = "Location cannot be empty"))]
    pub location: Option<String>,
    pub status: Option<String>,
    pub job_type: Option<String>,
}

/// Listing parameters exactly as they appear in the query string. `page` and
/// `limit` stay strings here; the service coerces them.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct JobListQuery {
    pub status: Option<String>,
    pub job_type: Option<String>,
    pub search: Option<String>,
    pub sort: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobResponse {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub position: String,
    pub company: String,
    pub location: String,
    pub status: JobStatus,
    pub job_type: JobType,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobListResponse {
    pub jobs: Vec<JobResponse>,
    pub total_jobs: i64,
    pub num_of_pages: i64,
    pub current_page: i64,
}

/// Every status appears as a top-level key, zero when unused.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct JobStatsResponse {
    pub applied: i64,
    pub interview: i64,
    pub rejected: i64,
    pub offer: i64,
}

impl From<Job> for JobResponse {
    fn from(value: Job) -> Self {
        Self {
            id: value.id,
            position: value.position,
            company: value.company,
            location: value.location,
            status: value.status,
            job_type: value.job_type,
            created_by: value.created_by,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl From<JobPage> for JobListResponse {
    fn from(value: JobPage) -> Self {
        Self {
            jobs: value.jobs.into_iter().map(Into::into).collect(),
            total_jobs: value.total,
            num_of_pages: value.num_of_pages,
            current_page: value.current_page,
        }
    }
}

impl From<HashMap<JobStatus, i64>> for JobStatsResponse {
    fn from(value: HashMap<JobStatus, i64>) -> Self {
        let count = |status: JobStatus| value.get(&status).copied().unwrap_or(0);
        Self {
            applied: count(JobStatus::Applied),
            interview: count(JobStatus::Interview),
            rejected: count(JobStatus::Rejected),
            offer: count(JobStatus::Offer),
        }
    }
}
