use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use uuid::Uuid;

use crate::dto::job_dto::{CreateJobPayload, JobListQuery, UpdateJobPayload};
use crate::error::{Error, Result};
use crate::models::job::{Job, JobChanges, JobStatus, JobType, NewJob};
use crate::store::{JobFilter, JobSort, JobStore};

/// One message for both a missing id and someone else's job, so probing ids
/// learns nothing.
const NOT_FOUND_MESSAGE: &str = "Job not found or access denied";

const DEFAULT_PAGE_SIZE: i64 = 50;

#[derive(Debug)]
pub struct JobPage {
    pub jobs: Vec<Job>,
    pub total: i64,
    pub num_of_pages: i64,
    pub current_page: i64,
}

#[derive(Clone)]
pub struct JobService {
    jobs: Arc<dyn JobStore>,
}

impl JobService {
    pub fn new(jobs: Arc<dyn JobStore>) -> Self {
        Self { jobs }
    }

    pub async fn create(&self, owner: Uuid, payload: CreateJobPayload) -> Result<Job> {
        let status = parse_or_default::<JobStatus>(payload.status)?;
        let job_type = parse_or_default::<JobType>(payload.job_type)?;
        self.jobs
            .insert(NewJob {
                position: payload.position,
                company: payload.company,
                location: payload.location,
                status,
                job_type,
                created_by: owner,
            })
            .await
    }

    pub async fn list(&self, owner: Uuid, query: JobListQuery) -> Result<JobPage> {
        let page = positive_param(query.page.as_deref(), 1);
        let limit = positive_param(query.limit.as_deref(), DEFAULT_PAGE_SIZE);
        let filter = JobFilter {
            status: literal_filter(query.status),
            job_type: literal_filter(query.job_type),
            search: normalized_search(query.search),
        };
        let sort = parse_sort(query.sort.as_deref());
        let skip = (page - 1) * limit;

        let jobs = self.jobs.list(owner, &filter, sort, skip, limit).await?;
        let total = self.jobs.count(owner, &filter).await?;
        let num_of_pages = if total == 0 {
            0
        } else {
            (total + limit - 1) / limit
        };
        Ok(JobPage {
            jobs,
            total,
            num_of_pages,
            current_page: page,
        })
    }

    pub async fn get(&self, owner: Uuid, id: Uuid) -> Result<Job> {
        self.jobs.get(owner, id).await?.ok_or_else(not_found)
    }

    pub async fn update(&self, owner: Uuid, id: Uuid, payload: UpdateJobPayload) -> Result<Job> {
        let changes = JobChanges {
            position: payload.position,
            company: payload.company,
            location: payload.location,
            status: payload
                .status
                .as_deref()
                .map(JobStatus::from_str)
                .transpose()?,
            job_type: payload
                .job_type
                .as_deref()
                .map(JobType::from_str)
                .transpose()?,
        };
        self.jobs
            .update(owner, id, changes)
            .await?
            .ok_or_else(not_found)
    }

    pub async fn delete(&self, owner: Uuid, id: Uuid) -> Result<()> {
        if self.jobs.delete(owner, id).await? {
            Ok(())
        } else {
            Err(not_found())
        }
    }

    /// Per-status totals with every known status present, zero when unused.
    pub async fn stats(&self, owner: Uuid) -> Result<HashMap<JobStatus, i64>> {
        let counts = self.jobs.status_counts(owner).await?;
        let mut stats: HashMap<JobStatus, i64> =
            JobStatus::ALL.iter().map(|status| (*status, 0)).collect();
        for (status, count) in counts {
            stats.insert(status, count);
        }
        Ok(stats)
    }
}

fn not_found() -> Error {
    Error::NotFound(NOT_FOUND_MESSAGE.to_string())
}

fn parse_or_default<T>(raw: Option<String>) -> Result<T>
where
    T: FromStr<Err = Error> + Default,
{
    match raw {
        Some(raw) => raw.parse(),
        None => Ok(T::default()),
    }
}

/// Pagination values arrive as raw strings. Anything that is not a positive
/// integer collapses to 1 instead of erroring.
fn positive_param(raw: Option<&str>, default: i64) -> i64 {
    match raw {
        None => default,
        Some(raw) => match raw.trim().parse::<i64>() {
            Ok(n) if n >= 1 => n,
            _ => 1,
        },
    }
}

/// `all` (and absence) disables the filter. Any other literal is kept
/// verbatim, including values no job can carry.
fn literal_filter(raw: Option<String>) -> Option<String> {
    raw.filter(|value| value != "all")
}

fn normalized_search(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// An omitted sort means newest-first; an unrecognized one leaves the store's
/// own ordering in place.
fn parse_sort(raw: Option<&str>) -> Option<JobSort> {
    match raw {
        None => Some(JobSort::Latest),
        Some("latest") => Some(JobSort::Latest),
        Some("oldest") => Some(JobSort::Oldest),
        Some("a-z") => Some(JobSort::PositionAsc),
        Some("z-a") => Some(JobSort::PositionDesc),
        Some(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemJobStore;

    fn service() -> JobService {
        JobService::new(Arc::new(MemJobStore::new()))
    }

    fn create_payload(position: &str) -> CreateJobPayload {
        CreateJobPayload {
            position: position.to_string(),
            company: "Acme".to_string(),
            location: "Remote".to_string(),
            status: None,
            job_type: None,
        }
    }

    #[test]
    fn pagination_params_collapse_to_one() {
        assert_eq!(positive_param(None, 1), 1);
        assert_eq!(positive_param(None, 50), 50);
        assert_eq!(positive_param(Some("3"), 1), 3);
        assert_eq!(positive_param(Some(" 7 "), 1), 7);
        assert_eq!(positive_param(Some("0"), 50), 1);
        assert_eq!(positive_param(Some("-3"), 50), 1);
        assert_eq!(positive_param(Some("abc"), 50), 1);
        assert_eq!(positive_param(Some(""), 50), 1);
    }

    #[test]
    fn all_sentinel_disables_the_filter_but_other_literals_stay() {
        assert_eq!(literal_filter(None), None);
        assert_eq!(literal_filter(Some("all".to_string())), None);
        assert_eq!(
            literal_filter(Some("Interview".to_string())),
            Some("Interview".to_string())
        );
        assert_eq!(
            literal_filter(Some("Ghosted".to_string())),
            Some("Ghosted".to_string())
        );
    }

    #[test]
    fn search_is_trimmed_and_blank_means_no_filter() {
        assert_eq!(normalized_search(None), None);
        assert_eq!(normalized_search(Some("   ".to_string())), None);
        assert_eq!(
            normalized_search(Some("  acme  ".to_string())),
            Some("acme".to_string())
        );
    }

    #[test]
    fn sort_defaults_to_latest_and_ignores_unknown_values() {
        assert_eq!(parse_sort(None), Some(JobSort::Latest));
        assert_eq!(parse_sort(Some("latest")), Some(JobSort::Latest));
        assert_eq!(parse_sort(Some("oldest")), Some(JobSort::Oldest));
        assert_eq!(parse_sort(Some("a-z")), Some(JobSort::PositionAsc));
        assert_eq!(parse_sort(Some("z-a")), Some(JobSort::PositionDesc));
        assert_eq!(parse_sort(Some("bogus")), None);
    }

    #[tokio::test]
    async fn create_falls_back_to_default_status_and_type() {
        let service = service();
        let owner = Uuid::new_v4();
        let job = service.create(owner, create_payload("Backend")).await.unwrap();
        assert_eq!(job.status, JobStatus::Applied);
        assert_eq!(job.job_type, JobType::FullTime);
        assert_eq!(job.created_by, owner);
    }

    #[tokio::test]
    async fn create_rejects_unknown_status_literals() {
        let service = service();
        let mut payload = create_payload("Backend");
        payload.status = Some("Ghosted".to_string());
        let err = service.create(Uuid::new_v4(), payload).await.unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));
    }

    #[tokio::test]
    async fn page_count_is_a_ceiling_and_totals_ignore_the_window() {
        let service = service();
        let owner = Uuid::new_v4();
        for i in 0..12 {
            service
                .create(owner, create_payload(&format!("Role {:02}", i)))
                .await
                .unwrap();
        }

        let query = JobListQuery {
            page: Some("3".to_string()),
            limit: Some("5".to_string()),
            ..JobListQuery::default()
        };
        let page = service.list(owner, query).await.unwrap();
        assert_eq!(page.jobs.len(), 2);
        assert_eq!(page.total, 12);
        assert_eq!(page.num_of_pages, 3);
        assert_eq!(page.current_page, 3);

        let query = JobListQuery {
            page: Some("not-a-number".to_string()),
            limit: Some("5".to_string()),
            ..JobListQuery::default()
        };
        let page = service.list(owner, query).await.unwrap();
        assert_eq!(page.current_page, 1);
        assert_eq!(page.jobs.len(), 5);
    }

    #[tokio::test]
    async fn empty_result_has_zero_pages() {
        let service = service();
        let page = service
            .list(Uuid::new_v4(), JobListQuery::default())
            .await
            .unwrap();
        assert_eq!(page.total, 0);
        assert_eq!(page.num_of_pages, 0);
        assert_eq!(page.current_page, 1);
    }

    #[tokio::test]
    async fn stats_are_zero_filled_for_every_status() {
        let service = service();
        let owner = Uuid::new_v4();
        let empty = service.stats(owner).await.unwrap();
        assert_eq!(empty.len(), 4);
        assert!(empty.values().all(|&count| count == 0));

        let mut payload = create_payload("Backend");
        payload.status = Some("Interview".to_string());
        service.create(owner, payload).await.unwrap();

        let stats = service.stats(owner).await.unwrap();
        assert_eq!(stats[&JobStatus::Interview], 1);
        assert_eq!(stats[&JobStatus::Offer], 0);
        assert_eq!(stats.len(), 4);
    }

    #[tokio::test]
    async fn missing_and_foreign_jobs_read_the_same() {
        let service = service();
        let owner = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        let job = service.create(owner, create_payload("Backend")).await.unwrap();

        let foreign = service.get(stranger, job.id).await.unwrap_err();
        let missing = service.get(owner, Uuid::new_v4()).await.unwrap_err();
        for err in [foreign, missing] {
            match err {
                Error::NotFound(msg) => assert_eq!(msg, NOT_FOUND_MESSAGE),
                other => panic!("expected NotFound, got {:?}", other),
            }
        }

        let err = service.delete(stranger, job.id).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
