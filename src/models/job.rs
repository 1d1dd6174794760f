use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Error;

/// Pipeline stage of an application. Stored as its display string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobStatus {
    #[default]
    Applied,
    Interview,
    Rejected,
    Offer,
}

impl JobStatus {
    pub const ALL: [JobStatus; 4] = [
        JobStatus::Applied,
        JobStatus::Interview,
        JobStatus::Rejected,
        JobStatus::Offer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Applied => "Applied",
            JobStatus::Interview => "Interview",
            JobStatus::Rejected => "Rejected",
            JobStatus::Offer => "Offer",
        }
    }
}

impl FromStr for JobStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Applied" => Ok(JobStatus::Applied),
            "Interview" => Ok(JobStatus::Interview),
            "Rejected" => Ok(JobStatus::Rejected),
            "Offer" => Ok(JobStatus::Offer),
            other => Err(Error::BadRequest(format!("Invalid status: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobType {
    #[default]
    #[serde(rename = "Full-time")]
    FullTime,
    #[serde(rename = "Part-time")]
    PartTime,
    Internship,
    Contract,
}

impl JobType {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::FullTime => "Full-time",
            JobType::PartTime => "Part-time",
            JobType::Internship => "Internship",
            JobType::Contract => "Contract",
        }
    }
}

impl FromStr for JobType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Full-time" => Ok(JobType::FullTime),
            "Part-time" => Ok(JobType::PartTime),
            "Internship" => Ok(JobType::Internship),
            "Contract" => Ok(JobType::Contract),
            other => Err(Error::BadRequest(format!("Invalid job type: {}", other))),
        }
    }
}

/// One tracked application, always owned by the user in `created_by`.
#[derive(Debug, Clone)]
pub struct Job {
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

#[derive(Debug, Clone)]
pub struct NewJob {
    pub position: String,
    pub company: String,
    pub location: String,
    pub status: JobStatus,
    pub job_type: JobType,
    pub created_by: Uuid,
}

/// Field-wise patch for [`crate::store::JobStore::update`]. `None` leaves the
/// stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct JobChanges {
    pub position: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub status: Option<JobStatus>,
    pub job_type: Option<JobType>,
}
