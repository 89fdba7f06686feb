//! Bulk resume screening: batch intake, scoring fan-out, ranking, shortlist
//! curation, exports, and analytics over a job posting's candidate pool.
//!
//! `ScreeningEngine` owns the write path (ingest -> score -> persist ->
//! finalize), everything after it reads from the [`store::ResultStore`];
//! ranked views are memoized in [`cache::RankedViewCache`] and invalidated
//! per job on any result or shortlist write.

pub mod analytics;
pub mod cache;
pub mod catalog;
pub mod domain;
pub mod engine;
pub mod export;
pub mod oracle;
pub mod ranking;
pub mod router;
pub mod service;
pub mod shortlist;
pub mod store;

#[cfg(test)]
mod tests;

pub use analytics::{AnalyticsAggregator, AnalyticsError, ScreeningAnalytics};
pub use cache::RankedViewCache;
pub use catalog::{InMemoryJobCatalog, JobCatalog};
pub use domain::{
    CandidateId, JobRequirements, MatchCategory, ResumeDocument, ScreeningJob, ScreeningJobId,
    ScreeningJobStatus, ScreeningResult, ScreeningResultId,
};
pub use engine::{ScreeningEngine, ScreeningError};
pub use export::{ExportError, ExportFormat, ExportPayload, ExportService};
pub use oracle::{KeywordOverlapOracle, OracleError, ScoringOracle, SkillAssessment};
pub use ranking::{
    CategoryFilter, PageRequest, RankedPage, RankingError, RankingService, ResultFilter, SortKey,
    SortSpec,
};
pub use router::screening_router;
pub use service::ScreeningService;
pub use shortlist::{ShortlistAction, ShortlistError, ShortlistManager};
pub use store::{InMemoryResultStore, ResultStore, ResultWrite, StoreError};
