use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for a screening job (one batch run against a posting).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScreeningJobId(pub String);

/// Identifier wrapper for a single candidate's scored result.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScreeningResultId(pub String);

/// Identifier wrapper for the candidate a resume belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CandidateId(pub String);

/// Lifecycle of a screening batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreeningJobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl ScreeningJobStatus {
    pub fn label(self) -> &'static str {
        match self {
            ScreeningJobStatus::Pending => "pending",
            ScreeningJobStatus::Processing => "processing",
            ScreeningJobStatus::Completed => "completed",
            ScreeningJobStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ScreeningJobStatus::Completed | ScreeningJobStatus::Failed
        )
    }
}

/// One batch-scoring run of N resumes against a single job posting.
///
/// `processed_count` counts attempted resumes (persisted result or recorded
/// skip), so it always reaches `total_resumes` once the batch drains. The
/// number of persisted results is `processed_count - skipped_count`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreeningJob {
    pub id: ScreeningJobId,
    pub employer_id: String,
    pub job_posting_id: String,
    pub status: ScreeningJobStatus,
    pub total_resumes: u32,
    pub processed_count: u32,
    pub skipped_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ScreeningJob {
    pub fn new(
        id: ScreeningJobId,
        employer_id: impl Into<String>,
        job_posting_id: impl Into<String>,
        total_resumes: u32,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            employer_id: employer_id.into(),
            job_posting_id: job_posting_id.into(),
            status: ScreeningJobStatus::Pending,
            total_resumes,
            processed_count: 0,
            skipped_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Count of results actually persisted for this job so far.
    pub fn result_count(&self) -> u32 {
        self.processed_count.saturating_sub(self.skipped_count)
    }
}

/// The scored record for one candidate within a screening job.
///
/// `match_percentage` is immutable once written; re-screening a candidate
/// produces a new result. Only `is_shortlisted` mutates after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreeningResult {
    pub id: ScreeningResultId,
    pub screening_job_id: ScreeningJobId,
    pub candidate_id: CandidateId,
    pub candidate_name: String,
    pub match_percentage: u8,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub strengths: Vec<String>,
    pub improvement_areas: Vec<String>,
    pub recommendations: Vec<String>,
    pub is_shortlisted: bool,
    pub created_at: DateTime<Utc>,
}

impl ScreeningResult {
    pub fn category(&self) -> MatchCategory {
        MatchCategory::classify(self.match_percentage)
    }
}

/// Fixed banding of match percentages: strong >= 70, moderate 50..=69,
/// weak < 50. The partition is total, so category counts over any result set
/// always sum to the set's size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchCategory {
    Strong,
    Moderate,
    Weak,
}

impl MatchCategory {
    pub const STRONG_THRESHOLD: u8 = 70;
    pub const MODERATE_THRESHOLD: u8 = 50;

    pub fn classify(match_percentage: u8) -> Self {
        if match_percentage >= Self::STRONG_THRESHOLD {
            MatchCategory::Strong
        } else if match_percentage >= Self::MODERATE_THRESHOLD {
            MatchCategory::Moderate
        } else {
            MatchCategory::Weak
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MatchCategory::Strong => "strong",
            MatchCategory::Moderate => "moderate",
            MatchCategory::Weak => "weak",
        }
    }
}

/// A resume as handed to the engine: text already extracted upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumeDocument {
    pub candidate_id: CandidateId,
    pub candidate_name: String,
    pub file_name: String,
    pub text: String,
}

/// Read-only snapshot of a job posting's requirements, consumed during scoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRequirements {
    pub job_posting_id: String,
    pub title: String,
    pub required_skills: Vec<String>,
    pub preferred_skills: Vec<String>,
}
