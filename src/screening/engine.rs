use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::cache::RankedViewCache;
use super::catalog::JobCatalog;
use super::domain::{
    JobRequirements, ResumeDocument, ScreeningJob, ScreeningJobId, ScreeningJobStatus,
    ScreeningResult, ScreeningResultId,
};
use super::oracle::{OracleError, ScoringOracle, SkillAssessment};
use super::store::{next_job_id, ResultStore, ResultWrite, StoreError};

/// Batch intake and scoring violations. Any of these aborts submission before
/// a job record is created.
#[derive(Debug, thiserror::Error)]
pub enum ScreeningError {
    #[error("batch contains no resumes")]
    EmptyBatch,
    #[error("batch of {submitted} resumes exceeds the limit of {limit}")]
    BatchTooLarge { submitted: usize, limit: usize },
    #[error("resume for candidate '{candidate_id}' has no extracted text")]
    EmptyResume { candidate_id: String },
    #[error("job posting '{job_posting_id}' does not exist")]
    UnknownJobPosting { job_posting_id: String },
    #[error("screening job not found")]
    JobNotFound,
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for ScreeningError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => ScreeningError::JobNotFound,
            other => ScreeningError::Store(other),
        }
    }
}

/// Orchestrates a screening batch: creates the job record, fans scoring work
/// out to a bounded worker pool, persists results as they land, and settles
/// the job's terminal status once the batch drains.
pub struct ScreeningEngine<S, O, C> {
    store: Arc<S>,
    oracle: Arc<O>,
    catalog: Arc<C>,
    cache: Arc<RankedViewCache>,
    max_batch_size: usize,
    scoring_concurrency: usize,
}

impl<S, O, C> ScreeningEngine<S, O, C>
where
    S: ResultStore + 'static,
    O: ScoringOracle + 'static,
    C: JobCatalog + 'static,
{
    pub fn new(
        store: Arc<S>,
        oracle: Arc<O>,
        catalog: Arc<C>,
        cache: Arc<RankedViewCache>,
        max_batch_size: usize,
        scoring_concurrency: usize,
    ) -> Self {
        Self {
            store,
            oracle,
            catalog,
            cache,
            max_batch_size,
            scoring_concurrency: scoring_concurrency.max(1),
        }
    }

    /// Validate and accept a batch. Returns the job snapshot immediately;
    /// scoring continues in a background task and progress is observable
    /// through [`ScreeningEngine::job_status`].
    pub fn submit_batch(
        &self,
        job_posting_id: &str,
        employer_id: &str,
        resumes: Vec<ResumeDocument>,
    ) -> Result<ScreeningJob, ScreeningError> {
        let (job, requirements) = self.accept_batch(job_posting_id, employer_id, &resumes)?;

        let store = Arc::clone(&self.store);
        let oracle = Arc::clone(&self.oracle);
        let cache = Arc::clone(&self.cache);
        let job_id = job.id.clone();
        let concurrency = self.scoring_concurrency;
        tokio::spawn(async move {
            run_batch(store, oracle, cache, job_id, requirements, resumes, concurrency).await;
        });

        Ok(job)
    }

    /// Accept a batch and drive it to completion before returning. Used by
    /// the offline CLI and by tests that need deterministic completion; the
    /// HTTP path uses [`ScreeningEngine::submit_batch`].
    pub async fn submit_batch_and_wait(
        &self,
        job_posting_id: &str,
        employer_id: &str,
        resumes: Vec<ResumeDocument>,
    ) -> Result<ScreeningJob, ScreeningError> {
        let (job, requirements) = self.accept_batch(job_posting_id, employer_id, &resumes)?;
        self.process_batch(job.id.clone(), requirements, resumes)
            .await;
        self.job_status(&job.id)
    }

    /// Validation + job creation, shared by the async path and the offline
    /// CLI which drives [`run_batch`] to completion itself.
    pub(crate) fn accept_batch(
        &self,
        job_posting_id: &str,
        employer_id: &str,
        resumes: &[ResumeDocument],
    ) -> Result<(ScreeningJob, JobRequirements), ScreeningError> {
        if resumes.is_empty() {
            return Err(ScreeningError::EmptyBatch);
        }
        if resumes.len() > self.max_batch_size {
            return Err(ScreeningError::BatchTooLarge {
                submitted: resumes.len(),
                limit: self.max_batch_size,
            });
        }
        if let Some(resume) = resumes.iter().find(|r| r.text.trim().is_empty()) {
            return Err(ScreeningError::EmptyResume {
                candidate_id: resume.candidate_id.0.clone(),
            });
        }

        let requirements = self.catalog.requirements(job_posting_id).ok_or_else(|| {
            ScreeningError::UnknownJobPosting {
                job_posting_id: job_posting_id.to_string(),
            }
        })?;

        let mut job = ScreeningJob::new(
            next_job_id(),
            employer_id,
            job_posting_id,
            resumes.len() as u32,
        );
        // Accepted batches start scoring right away.
        job.status = ScreeningJobStatus::Processing;
        let job = self.store.insert_job(job)?;

        info!(
            job_id = %job.id.0,
            posting = %job.job_posting_id,
            total = job.total_resumes,
            "screening batch accepted"
        );

        Ok((job, requirements))
    }

    /// Drive one accepted batch to completion. Exposed within the crate so
    /// the CLI and tests can await the drain deterministically.
    pub(crate) async fn process_batch(
        &self,
        job_id: ScreeningJobId,
        requirements: JobRequirements,
        resumes: Vec<ResumeDocument>,
    ) {
        run_batch(
            Arc::clone(&self.store),
            Arc::clone(&self.oracle),
            Arc::clone(&self.cache),
            job_id,
            requirements,
            resumes,
            self.scoring_concurrency,
        )
        .await;
    }

    pub fn job_status(&self, job_id: &ScreeningJobId) -> Result<ScreeningJob, ScreeningError> {
        self.store
            .fetch_job(job_id)?
            .ok_or(ScreeningError::JobNotFound)
    }

    /// Cascade-delete a job and its results. Idempotent: deleting an unknown
    /// id reports `false` rather than erroring. In-flight scoring writes for
    /// the deleted job are dropped at the store.
    pub fn delete_job(&self, job_id: &ScreeningJobId) -> Result<bool, ScreeningError> {
        let existed = self.store.delete_job(job_id)?;
        self.cache.forget(job_id);
        if existed {
            info!(job_id = %job_id.0, "screening job deleted");
        }
        Ok(existed)
    }
}

async fn run_batch<S, O>(
    store: Arc<S>,
    oracle: Arc<O>,
    cache: Arc<RankedViewCache>,
    job_id: ScreeningJobId,
    requirements: JobRequirements,
    resumes: Vec<ResumeDocument>,
    concurrency: usize,
) where
    S: ResultStore + 'static,
    O: ScoringOracle + 'static,
{
    let permits = Arc::new(Semaphore::new(concurrency));
    let requirements = Arc::new(requirements);
    let mut tasks = JoinSet::new();

    for resume in resumes {
        let permit = match Arc::clone(&permits).acquire_owned().await {
            Ok(permit) => permit,
            // Semaphore is never closed while the batch runs.
            Err(_) => break,
        };
        let store = Arc::clone(&store);
        let oracle = Arc::clone(&oracle);
        let requirements = Arc::clone(&requirements);
        let job_id = job_id.clone();

        tasks.spawn(async move {
            let _permit = permit;
            score_one(store, oracle, job_id, requirements, resume).await;
        });
    }

    while let Some(joined) = tasks.join_next().await {
        if let Err(err) = joined {
            error!(job_id = %job_id.0, error = %err, "scoring task panicked");
            if let Err(err) = store.record_skip(&job_id) {
                error!(job_id = %job_id.0, error = %err, "failed to record skip");
            }
        }
    }

    match store.finalize_job(&job_id) {
        Ok(Some(job)) => {
            info!(
                job_id = %job.id.0,
                status = job.status.label(),
                processed = job.processed_count,
                skipped = job.skipped_count,
                "screening batch drained"
            );
            cache.invalidate(&job_id);
        }
        Ok(None) => {
            debug!(job_id = %job_id.0, "job deleted before finalize");
            cache.forget(&job_id);
        }
        Err(err) => {
            error!(job_id = %job_id.0, error = %err, "failed to finalize job");
            cache.invalidate(&job_id);
        }
    }
}

async fn score_one<S, O>(
    store: Arc<S>,
    oracle: Arc<O>,
    job_id: ScreeningJobId,
    requirements: Arc<JobRequirements>,
    resume: ResumeDocument,
) where
    S: ResultStore,
    O: ScoringOracle,
{
    let verdict = oracle
        .score(&resume, &requirements)
        .await
        .and_then(validate_assessment);

    match verdict {
        Ok(assessment) => {
            let result = ScreeningResult {
                id: ScreeningResultId(Uuid::new_v4().to_string()),
                screening_job_id: job_id.clone(),
                candidate_id: resume.candidate_id,
                candidate_name: resume.candidate_name,
                match_percentage: assessment.match_percentage,
                matched_skills: assessment.matched_skills,
                missing_skills: assessment.missing_skills,
                strengths: assessment.strengths,
                improvement_areas: assessment.improvement_areas,
                recommendations: assessment.recommendations,
                is_shortlisted: false,
                created_at: chrono::Utc::now(),
            };
            match store.insert_result(result) {
                Ok(ResultWrite::Persisted) => {}
                Ok(ResultWrite::JobMissing) => {
                    debug!(job_id = %job_id.0, "dropping result for deleted job");
                }
                Err(err) => {
                    error!(job_id = %job_id.0, error = %err, "failed to persist result");
                    // A failed write still counts as an attempted resume.
                    if let Err(err) = store.record_skip(&job_id) {
                        error!(job_id = %job_id.0, error = %err, "failed to record skip");
                    }
                }
            }
        }
        Err(err) => {
            warn!(
                job_id = %job_id.0,
                candidate = %resume.candidate_id.0,
                error = %err,
                "scoring failed, recording skip"
            );
            match store.record_skip(&job_id) {
                Ok(_) => {}
                Err(err) => {
                    error!(job_id = %job_id.0, error = %err, "failed to record skip");
                }
            }
        }
    }
}

/// Assessments outside 0..=100 are treated like any other oracle failure.
fn validate_assessment(assessment: SkillAssessment) -> Result<SkillAssessment, OracleError> {
    if assessment.match_percentage > 100 {
        return Err(OracleError::OutOfRange {
            value: i64::from(assessment.match_percentage),
        });
    }
    Ok(assessment)
}
