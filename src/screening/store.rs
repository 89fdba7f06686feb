use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use chrono::Utc;

use super::domain::{
    ScreeningJob, ScreeningJobId, ScreeningJobStatus, ScreeningResult, ScreeningResultId,
};

/// Error enumeration for storage failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Outcome of a result write that may race a job deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultWrite {
    /// Result persisted and the job's processed counter advanced.
    Persisted,
    /// The owning job no longer exists; the write was dropped.
    JobMissing,
}

/// Persistence seam for screening jobs and their results.
///
/// Counter increments are atomic with the owning write: implementations must
/// not expose read-modify-write races on `processed_count`, and shortlist
/// updates for one job must be serialized.
pub trait ResultStore: Send + Sync {
    fn insert_job(&self, job: ScreeningJob) -> Result<ScreeningJob, StoreError>;
    fn fetch_job(&self, id: &ScreeningJobId) -> Result<Option<ScreeningJob>, StoreError>;

    /// Persist one scored result and advance the job's processed counter.
    /// Writes against a deleted job are dropped, not errors.
    fn insert_result(&self, result: ScreeningResult) -> Result<ResultWrite, StoreError>;

    /// Record a per-resume scoring failure: advances both the processed and
    /// skipped counters. Tolerates a deleted job the same way as
    /// [`ResultStore::insert_result`].
    fn record_skip(&self, job_id: &ScreeningJobId) -> Result<ResultWrite, StoreError>;

    /// Move a drained job to its terminal status: `Completed` if at least one
    /// result was persisted, `Failed` otherwise. Returns the updated job, or
    /// `None` if it was deleted mid-flight.
    fn finalize_job(&self, job_id: &ScreeningJobId) -> Result<Option<ScreeningJob>, StoreError>;

    fn results_for_job(
        &self,
        job_id: &ScreeningJobId,
    ) -> Result<Vec<ScreeningResult>, StoreError>;

    /// Flip `is_shortlisted` on every listed result that belongs to the job,
    /// in one serialized update. Ids from other jobs are ignored; the return
    /// value counts only matched ids.
    fn update_shortlist(
        &self,
        job_id: &ScreeningJobId,
        result_ids: &[ScreeningResultId],
        shortlisted: bool,
    ) -> Result<usize, StoreError>;

    /// Delete the job and cascade to all of its results in one transaction.
    /// Returns whether the job existed (idempotent for unknown ids).
    fn delete_job(&self, job_id: &ScreeningJobId) -> Result<bool, StoreError>;
}

static JOB_SEQUENCE: AtomicU64 = AtomicU64::new(1);

/// Allocates a process-unique screening job id.
pub fn next_job_id() -> ScreeningJobId {
    let id = JOB_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ScreeningJobId(format!("scr-{id:06}"))
}

#[derive(Debug, Default)]
struct StoreInner {
    jobs: HashMap<ScreeningJobId, ScreeningJob>,
    results: HashMap<ScreeningJobId, Vec<ScreeningResult>>,
}

/// The shipped [`ResultStore`]: a single RwLock over the job and result maps.
/// Holding the write lock for every mutation gives the atomic-counter and
/// serialized-shortlist guarantees without finer-grained locking.
#[derive(Debug, Default)]
pub struct InMemoryResultStore {
    inner: RwLock<StoreInner>,
}

impl InMemoryResultStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResultStore for InMemoryResultStore {
    fn insert_job(&self, job: ScreeningJob) -> Result<ScreeningJob, StoreError> {
        let mut inner = self.inner.write().expect("store lock poisoned");
        if inner.jobs.contains_key(&job.id) {
            return Err(StoreError::Conflict);
        }
        inner.results.insert(job.id.clone(), Vec::new());
        inner.jobs.insert(job.id.clone(), job.clone());
        Ok(job)
    }

    fn fetch_job(&self, id: &ScreeningJobId) -> Result<Option<ScreeningJob>, StoreError> {
        let inner = self.inner.read().expect("store lock poisoned");
        Ok(inner.jobs.get(id).cloned())
    }

    fn insert_result(&self, result: ScreeningResult) -> Result<ResultWrite, StoreError> {
        let mut inner = self.inner.write().expect("store lock poisoned");
        let job_id = result.screening_job_id.clone();
        match inner.jobs.get_mut(&job_id) {
            Some(job) => {
                job.processed_count += 1;
                job.updated_at = Utc::now();
            }
            None => return Ok(ResultWrite::JobMissing),
        }
        inner
            .results
            .get_mut(&job_id)
            .ok_or_else(|| StoreError::Unavailable("result set missing for job".to_string()))?
            .push(result);
        Ok(ResultWrite::Persisted)
    }

    fn record_skip(&self, job_id: &ScreeningJobId) -> Result<ResultWrite, StoreError> {
        let mut inner = self.inner.write().expect("store lock poisoned");
        match inner.jobs.get_mut(job_id) {
            Some(job) => {
                job.processed_count += 1;
                job.skipped_count += 1;
                job.updated_at = Utc::now();
                Ok(ResultWrite::Persisted)
            }
            None => Ok(ResultWrite::JobMissing),
        }
    }

    fn finalize_job(&self, job_id: &ScreeningJobId) -> Result<Option<ScreeningJob>, StoreError> {
        let mut inner = self.inner.write().expect("store lock poisoned");
        let Some(job) = inner.jobs.get_mut(job_id) else {
            return Ok(None);
        };
        job.status = if job.result_count() > 0 {
            ScreeningJobStatus::Completed
        } else {
            ScreeningJobStatus::Failed
        };
        job.updated_at = Utc::now();
        Ok(Some(job.clone()))
    }

    fn results_for_job(
        &self,
        job_id: &ScreeningJobId,
    ) -> Result<Vec<ScreeningResult>, StoreError> {
        let inner = self.inner.read().expect("store lock poisoned");
        if !inner.jobs.contains_key(job_id) {
            return Err(StoreError::NotFound);
        }
        Ok(inner.results.get(job_id).cloned().unwrap_or_default())
    }

    fn update_shortlist(
        &self,
        job_id: &ScreeningJobId,
        result_ids: &[ScreeningResultId],
        shortlisted: bool,
    ) -> Result<usize, StoreError> {
        let mut inner = self.inner.write().expect("store lock poisoned");
        if !inner.jobs.contains_key(job_id) {
            return Err(StoreError::NotFound);
        }
        let results = inner
            .results
            .get_mut(job_id)
            .ok_or_else(|| StoreError::Unavailable("result set missing for job".to_string()))?;

        let mut affected = 0;
        for result in results.iter_mut() {
            if result_ids.contains(&result.id) {
                result.is_shortlisted = shortlisted;
                affected += 1;
            }
        }

        if let Some(job) = inner.jobs.get_mut(job_id) {
            job.updated_at = Utc::now();
        }
        Ok(affected)
    }

    fn delete_job(&self, job_id: &ScreeningJobId) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().expect("store lock poisoned");
        let existed = inner.jobs.remove(job_id).is_some();
        inner.results.remove(job_id);
        Ok(existed)
    }
}
