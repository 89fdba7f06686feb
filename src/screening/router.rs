use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::catalog::JobCatalog;
use super::domain::{ResumeDocument, ScreeningJobId, ScreeningResultId};
use super::engine::ScreeningError;
use super::export::ExportFormat;
use super::oracle::ScoringOracle;
use super::ranking::{CategoryFilter, PageRequest, RankingError, ResultFilter, SortKey, SortSpec};
use super::service::ScreeningService;
use super::shortlist::{ShortlistAction, ShortlistError};
use super::store::ResultStore;

/// Router builder exposing the screening HTTP surface.
pub fn screening_router<S, O, C>(service: Arc<ScreeningService<S, O, C>>) -> Router
where
    S: ResultStore + 'static,
    O: ScoringOracle + 'static,
    C: JobCatalog + 'static,
{
    Router::new()
        .route("/api/v1/screenings", post(submit_handler::<S, O, C>))
        .route(
            "/api/v1/screenings/:job_id",
            get(status_handler::<S, O, C>).delete(delete_handler::<S, O, C>),
        )
        .route(
            "/api/v1/screenings/:job_id/results",
            get(results_handler::<S, O, C>),
        )
        .route(
            "/api/v1/screenings/:job_id/shortlist",
            post(shortlist_handler::<S, O, C>),
        )
        .route(
            "/api/v1/screenings/:job_id/export",
            get(export_handler::<S, O, C>),
        )
        .route(
            "/api/v1/screenings/:job_id/analytics",
            get(analytics_handler::<S, O, C>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub struct SubmitBatchRequest {
    pub job_posting_id: String,
    pub employer_id: String,
    pub resumes: Vec<ResumeDocument>,
}

pub(crate) async fn submit_handler<S, O, C>(
    State(service): State<Arc<ScreeningService<S, O, C>>>,
    axum::Json(request): axum::Json<SubmitBatchRequest>,
) -> Response
where
    S: ResultStore + 'static,
    O: ScoringOracle + 'static,
    C: JobCatalog + 'static,
{
    match service.submit_batch(&request.job_posting_id, &request.employer_id, request.resumes) {
        Ok(job) => {
            let payload = json!({
                "screening_job_id": job.id.0,
                "status": job.status.label(),
                "total_resumes": job.total_resumes,
            });
            (StatusCode::ACCEPTED, axum::Json(payload)).into_response()
        }
        Err(err @ (ScreeningError::EmptyBatch
        | ScreeningError::BatchTooLarge { .. }
        | ScreeningError::EmptyResume { .. }
        | ScreeningError::UnknownJobPosting { .. })) => validation_error(err),
        Err(other) => internal_error(other),
    }
}

pub(crate) async fn status_handler<S, O, C>(
    State(service): State<Arc<ScreeningService<S, O, C>>>,
    Path(job_id): Path<String>,
) -> Response
where
    S: ResultStore + 'static,
    O: ScoringOracle + 'static,
    C: JobCatalog + 'static,
{
    let id = ScreeningJobId(job_id);
    match service.job_status(&id) {
        Ok(job) => {
            let payload = json!({
                "screening_job_id": job.id.0,
                "status": job.status.label(),
                "total_resumes": job.total_resumes,
                "processed_count": job.processed_count,
                "skipped_count": job.skipped_count,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(ScreeningError::JobNotFound) => not_found(),
        Err(other) => internal_error(other),
    }
}

pub(crate) async fn delete_handler<S, O, C>(
    State(service): State<Arc<ScreeningService<S, O, C>>>,
    Path(job_id): Path<String>,
) -> Response
where
    S: ResultStore + 'static,
    O: ScoringOracle + 'static,
    C: JobCatalog + 'static,
{
    let id = ScreeningJobId(job_id);
    // Deletes converge on the same end state, so unknown ids succeed too.
    match service.delete_job(&id) {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(other) => internal_error(other),
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ResultsQuery {
    pub min_match: Option<u8>,
    pub max_match: Option<u8>,
    pub category: Option<String>,
    pub shortlisted_only: Option<bool>,
    pub sort_by: Option<String>,
    pub sort_desc: Option<bool>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl ResultsQuery {
    fn into_specs(self) -> Result<(ResultFilter, SortSpec, PageRequest), String> {
        let category = match self.category.as_deref() {
            Some(raw) => CategoryFilter::parse(raw)
                .ok_or_else(|| format!("unknown match category '{raw}'"))?,
            None => CategoryFilter::All,
        };
        let key = match self.sort_by.as_deref() {
            Some(raw) => {
                SortKey::parse(raw).ok_or_else(|| format!("unknown sort field '{raw}'"))?
            }
            None => SortKey::Rank,
        };

        let filter = ResultFilter {
            min_match: self.min_match.unwrap_or(0),
            max_match: self.max_match.unwrap_or(100),
            category,
            shortlisted_only: self.shortlisted_only.unwrap_or(false),
        };
        let sort = SortSpec {
            key,
            descending: self.sort_desc.unwrap_or(false),
        };
        let page = PageRequest {
            page: self.page.unwrap_or(1),
            page_size: self.page_size.unwrap_or(PageRequest::default().page_size),
        };
        Ok((filter, sort, page))
    }
}

pub(crate) async fn results_handler<S, O, C>(
    State(service): State<Arc<ScreeningService<S, O, C>>>,
    Path(job_id): Path<String>,
    Query(query): Query<ResultsQuery>,
) -> Response
where
    S: ResultStore + 'static,
    O: ScoringOracle + 'static,
    C: JobCatalog + 'static,
{
    let id = ScreeningJobId(job_id);
    let (filter, sort, page) = match query.into_specs() {
        Ok(specs) => specs,
        Err(message) => {
            let payload = json!({ "error": message });
            return (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response();
        }
    };

    match service.results(&id, &filter, &sort, &page) {
        Ok(view) => {
            let payload = json!({
                "results": view.items,
                "total": view.total,
                "page": view.page,
                "page_size": view.page_size,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(RankingError::JobNotFound) => not_found(),
        Err(err @ RankingError::InvalidPagination { .. }) => validation_error(err),
        Err(other) => internal_error(other),
    }
}

#[derive(Debug, Deserialize)]
pub struct ShortlistRequest {
    pub candidate_result_ids: Vec<String>,
    #[serde(default = "default_shortlist_action")]
    pub action: ShortlistAction,
}

fn default_shortlist_action() -> ShortlistAction {
    ShortlistAction::Add
}

pub(crate) async fn shortlist_handler<S, O, C>(
    State(service): State<Arc<ScreeningService<S, O, C>>>,
    Path(job_id): Path<String>,
    axum::Json(request): axum::Json<ShortlistRequest>,
) -> Response
where
    S: ResultStore + 'static,
    O: ScoringOracle + 'static,
    C: JobCatalog + 'static,
{
    let id = ScreeningJobId(job_id);
    let result_ids: Vec<ScreeningResultId> = request
        .candidate_result_ids
        .into_iter()
        .map(ScreeningResultId)
        .collect();

    match service.update_shortlist(&id, &result_ids, request.action) {
        Ok(affected) => {
            let payload = json!({ "affected": affected });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(err @ ShortlistError::EmptySelection) => validation_error(err),
        Err(ShortlistError::JobNotFound) => not_found(),
        Err(other) => internal_error(other),
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ExportQuery {
    pub format: Option<String>,
    /// Comma-separated result ids to narrow the export.
    pub ids: Option<String>,
}

pub(crate) async fn export_handler<S, O, C>(
    State(service): State<Arc<ScreeningService<S, O, C>>>,
    Path(job_id): Path<String>,
    Query(query): Query<ExportQuery>,
) -> Response
where
    S: ResultStore + 'static,
    O: ScoringOracle + 'static,
    C: JobCatalog + 'static,
{
    let id = ScreeningJobId(job_id);
    let format = match query.format.as_deref() {
        None => ExportFormat::Csv,
        Some(raw) => match ExportFormat::parse(raw) {
            Some(format) => format,
            None => {
                let payload = json!({ "error": format!("unknown export format '{raw}'") });
                return (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response();
            }
        },
    };

    let selection: Option<Vec<ScreeningResultId>> = query.ids.map(|raw| {
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| ScreeningResultId(s.to_string()))
            .collect()
    });

    match service.export(&id, format, selection.as_deref()) {
        Ok(payload) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, payload.content_type)],
            payload.bytes,
        )
            .into_response(),
        Err(super::export::ExportError::JobNotFound) => not_found(),
        Err(other) => internal_error(other),
    }
}

pub(crate) async fn analytics_handler<S, O, C>(
    State(service): State<Arc<ScreeningService<S, O, C>>>,
    Path(job_id): Path<String>,
) -> Response
where
    S: ResultStore + 'static,
    O: ScoringOracle + 'static,
    C: JobCatalog + 'static,
{
    let id = ScreeningJobId(job_id);
    match service.analytics(&id) {
        Ok(analytics) => (StatusCode::OK, axum::Json(analytics)).into_response(),
        Err(super::analytics::AnalyticsError::JobNotFound) => not_found(),
        Err(other) => internal_error(other),
    }
}

fn not_found() -> Response {
    let payload = json!({ "error": "screening job not found" });
    (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
}

fn validation_error(err: impl std::fmt::Display) -> Response {
    let payload = json!({ "error": err.to_string() });
    (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
}

fn internal_error(err: impl std::fmt::Display) -> Response {
    // Storage details stay in the logs, not in the response body.
    tracing::error!(error = %err, "screening request failed");
    let payload = json!({ "error": "internal error" });
    (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
}
