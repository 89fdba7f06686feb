use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::response::Response;
use serde_json::Value;

use crate::config::ScreeningConfig;
use crate::screening::domain::{
    CandidateId, JobRequirements, ResumeDocument, ScreeningJob, ScreeningJobId, ScreeningResult,
    ScreeningResultId,
};
use crate::screening::oracle::{KeywordOverlapOracle, OracleError, ScoringOracle, SkillAssessment};
use crate::screening::store::{ResultStore, ResultWrite, StoreError};
use crate::screening::{screening_router, InMemoryJobCatalog, InMemoryResultStore, ScreeningService};

pub(super) const POSTING_ID: &str = "posting-1";

pub(super) fn screening_config() -> ScreeningConfig {
    ScreeningConfig {
        max_batch_size: 10,
        scoring_concurrency: 4,
        cache_ttl: Duration::from_secs(30),
        cache_capacity: 64,
        max_page_size: 50,
        postings_csv: None,
    }
}

pub(super) fn catalog() -> Arc<InMemoryJobCatalog> {
    let catalog = Arc::new(InMemoryJobCatalog::new());
    catalog.insert(JobRequirements {
        job_posting_id: POSTING_ID.to_string(),
        title: "Backend Engineer".to_string(),
        required_skills: vec!["Rust".to_string(), "PostgreSQL".to_string()],
        preferred_skills: vec!["Kubernetes".to_string()],
    });
    catalog
}

pub(super) fn resume(id: &str, name: &str, text: &str) -> ResumeDocument {
    ResumeDocument {
        candidate_id: CandidateId(id.to_string()),
        candidate_name: name.to_string(),
        file_name: format!("{id}.pdf"),
        text: text.to_string(),
    }
}

/// Five resumes whose keyword overlap against [`catalog`]'s posting yields
/// 100, 80, 60, 40 and 0 percent respectively.
pub(super) fn standard_batch() -> Vec<ResumeDocument> {
    vec![
        resume(
            "cand-ada",
            "Ada Lovelace",
            "Rust services backed by PostgreSQL, deployed on Kubernetes.",
        ),
        resume(
            "cand-grace",
            "Grace Hopper",
            "Rust and PostgreSQL experience in production.",
        ),
        resume(
            "cand-edsger",
            "Edsger Dijkstra",
            "Rust tooling and Kubernetes operations.",
        ),
        resume("cand-alan", "Alan Turing", "Rust enthusiast."),
        resume("cand-barbara", "Barbara Liskov", "Java and Spring developer."),
    ]
}

pub(super) type MemoryService =
    ScreeningService<InMemoryResultStore, KeywordOverlapOracle, InMemoryJobCatalog>;

pub(super) fn build_service() -> (Arc<MemoryService>, Arc<InMemoryResultStore>) {
    build_service_with_config(screening_config())
}

pub(super) fn build_service_with_config(
    config: ScreeningConfig,
) -> (Arc<MemoryService>, Arc<InMemoryResultStore>) {
    let store = Arc::new(InMemoryResultStore::new());
    let service = Arc::new(ScreeningService::new(
        store.clone(),
        Arc::new(KeywordOverlapOracle::new()),
        catalog(),
        &config,
    ));
    (service, store)
}

/// Drive the standard batch to completion and return the settled job.
pub(super) async fn screen_standard_batch(service: &MemoryService) -> ScreeningJob {
    service
        .submit_batch_and_wait(POSTING_ID, "emp-1", standard_batch())
        .await
        .expect("batch screens")
}

/// Oracle double that refuses every resume.
pub(super) struct FailingOracle;

#[async_trait]
impl ScoringOracle for FailingOracle {
    async fn score(
        &self,
        _resume: &ResumeDocument,
        _requirements: &JobRequirements,
    ) -> Result<SkillAssessment, OracleError> {
        Err(OracleError::Unavailable("model offline".to_string()))
    }
}

/// Oracle double that fails candidates whose id starts with `bad-` and
/// delegates the rest to the keyword scorer.
pub(super) struct SelectiveOracle {
    inner: KeywordOverlapOracle,
}

impl SelectiveOracle {
    pub(super) fn new() -> Self {
        Self {
            inner: KeywordOverlapOracle::new(),
        }
    }
}

#[async_trait]
impl ScoringOracle for SelectiveOracle {
    async fn score(
        &self,
        resume: &ResumeDocument,
        requirements: &JobRequirements,
    ) -> Result<SkillAssessment, OracleError> {
        if resume.candidate_id.0.starts_with("bad-") {
            return Err(OracleError::Malformed {
                reason: "unreadable resume".to_string(),
            });
        }
        self.inner.score(resume, requirements).await
    }
}

/// Oracle double that reports a match percentage beyond the valid range.
pub(super) struct OverflowOracle;

#[async_trait]
impl ScoringOracle for OverflowOracle {
    async fn score(
        &self,
        _resume: &ResumeDocument,
        _requirements: &JobRequirements,
    ) -> Result<SkillAssessment, OracleError> {
        Ok(SkillAssessment {
            match_percentage: 150,
            matched_skills: vec!["Rust".to_string()],
            missing_skills: Vec::new(),
            strengths: Vec::new(),
            improvement_areas: Vec::new(),
            recommendations: Vec::new(),
        })
    }
}

/// Store double whose result writes always fail while progress tracking and
/// reads keep working.
pub(super) struct UnreliableStore {
    inner: InMemoryResultStore,
}

impl UnreliableStore {
    pub(super) fn new() -> Self {
        Self {
            inner: InMemoryResultStore::new(),
        }
    }
}

impl ResultStore for UnreliableStore {
    fn insert_job(&self, job: ScreeningJob) -> Result<ScreeningJob, StoreError> {
        self.inner.insert_job(job)
    }

    fn fetch_job(&self, id: &ScreeningJobId) -> Result<Option<ScreeningJob>, StoreError> {
        self.inner.fetch_job(id)
    }

    fn insert_result(&self, _result: ScreeningResult) -> Result<ResultWrite, StoreError> {
        Err(StoreError::Unavailable("write path offline".to_string()))
    }

    fn record_skip(&self, job_id: &ScreeningJobId) -> Result<ResultWrite, StoreError> {
        self.inner.record_skip(job_id)
    }

    fn finalize_job(&self, job_id: &ScreeningJobId) -> Result<Option<ScreeningJob>, StoreError> {
        self.inner.finalize_job(job_id)
    }

    fn results_for_job(
        &self,
        job_id: &ScreeningJobId,
    ) -> Result<Vec<ScreeningResult>, StoreError> {
        self.inner.results_for_job(job_id)
    }

    fn update_shortlist(
        &self,
        job_id: &ScreeningJobId,
        result_ids: &[ScreeningResultId],
        shortlisted: bool,
    ) -> Result<usize, StoreError> {
        self.inner.update_shortlist(job_id, result_ids, shortlisted)
    }

    fn delete_job(&self, job_id: &ScreeningJobId) -> Result<bool, StoreError> {
        self.inner.delete_job(job_id)
    }
}

pub(super) fn build_service_with_store<S: ResultStore + 'static>(
    store: Arc<S>,
) -> Arc<ScreeningService<S, KeywordOverlapOracle, InMemoryJobCatalog>> {
    Arc::new(ScreeningService::new(
        store,
        Arc::new(KeywordOverlapOracle::new()),
        catalog(),
        &screening_config(),
    ))
}

pub(super) fn build_service_with_oracle<O: ScoringOracle + 'static>(
    oracle: O,
) -> Arc<ScreeningService<InMemoryResultStore, O, InMemoryJobCatalog>> {
    Arc::new(ScreeningService::new(
        Arc::new(InMemoryResultStore::new()),
        Arc::new(oracle),
        catalog(),
        &screening_config(),
    ))
}

pub(super) fn router_with_service(service: Arc<MemoryService>) -> axum::Router {
    screening_router(service)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
