use std::collections::HashSet;
use std::sync::Arc;

use super::domain::{ScreeningJobId, ScreeningResult, ScreeningResultId};
use super::store::{ResultStore, StoreError};

/// Serialization target for a result-set export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Json => "application/json",
        }
    }
}

/// A rendered export ready to stream back to the caller.
#[derive(Debug, Clone)]
pub struct ExportPayload {
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("screening job not found")]
    JobNotFound,
    #[error("csv serialization failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("json serialization failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for ExportError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => ExportError::JobNotFound,
            other => ExportError::Store(other),
        }
    }
}

const CSV_HEADER: [&str; 12] = [
    "result_id",
    "candidate_id",
    "candidate_name",
    "match_percentage",
    "match_category",
    "matched_skills",
    "missing_skills",
    "strengths",
    "improvement_areas",
    "recommendations",
    "shortlisted",
    "created_at",
];

/// Serializes a job's result set (optionally narrowed to explicit result
/// ids) to CSV or JSON. Exports always read the full unfiltered set; the
/// only narrowing is the explicit id selection.
pub struct ExportService<S> {
    store: Arc<S>,
}

impl<S: ResultStore> ExportService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn export(
        &self,
        job_id: &ScreeningJobId,
        format: ExportFormat,
        selection: Option<&[ScreeningResultId]>,
    ) -> Result<ExportPayload, ExportError> {
        let mut results = self.store.results_for_job(job_id)?;

        if let Some(ids) = selection {
            let wanted: HashSet<&ScreeningResultId> = ids.iter().collect();
            results.retain(|result| wanted.contains(&result.id));
        }

        // Deterministic export order: best match first.
        results.sort_by(|a, b| {
            b.match_percentage
                .cmp(&a.match_percentage)
                .then_with(|| a.created_at.cmp(&b.created_at))
                .then_with(|| a.id.cmp(&b.id))
        });

        let bytes = match format {
            ExportFormat::Csv => render_csv(&results)?,
            ExportFormat::Json => serde_json::to_vec(&results)?,
        };

        Ok(ExportPayload {
            content_type: format.content_type(),
            bytes,
        })
    }
}

fn render_csv(results: &[ScreeningResult]) -> Result<Vec<u8>, csv::Error> {
    // Quote every cell so free-text fields (names, recommendations) can never
    // smuggle in delimiters; the writer doubles internal quotes.
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(Vec::new());

    writer.write_record(CSV_HEADER)?;
    for result in results {
        writer.write_record([
            result.id.0.as_str(),
            result.candidate_id.0.as_str(),
            result.candidate_name.as_str(),
            &result.match_percentage.to_string(),
            result.category().label(),
            &result.matched_skills.join("; "),
            &result.missing_skills.join("; "),
            &result.strengths.join("; "),
            &result.improvement_areas.join("; "),
            &result.recommendations.join("; "),
            if result.is_shortlisted { "true" } else { "false" },
            &result.created_at.to_rfc3339(),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|err| err.into_error().into())
}
