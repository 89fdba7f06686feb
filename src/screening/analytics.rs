use std::sync::Arc;

use serde::Serialize;

use super::domain::{MatchCategory, ScreeningJobId};
use super::store::{ResultStore, StoreError};

/// Distribution and summary statistics over a job's full result set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScreeningAnalytics {
    pub total_screened: usize,
    pub average_match: f64,
    pub max_match: u8,
    pub min_match: u8,
    pub strong_matches: usize,
    pub moderate_matches: usize,
    pub weak_matches: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum AnalyticsError {
    #[error("screening job not found")]
    JobNotFound,
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for AnalyticsError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => AnalyticsError::JobNotFound,
            other => AnalyticsError::Store(other),
        }
    }
}

/// Computes analytics straight from the store; never cache-dependent.
pub struct AnalyticsAggregator<S> {
    store: Arc<S>,
}

impl<S: ResultStore> AnalyticsAggregator<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn analytics(&self, job_id: &ScreeningJobId) -> Result<ScreeningAnalytics, AnalyticsError> {
        let results = self.store.results_for_job(job_id)?;

        if results.is_empty() {
            return Ok(ScreeningAnalytics {
                total_screened: 0,
                average_match: 0.0,
                max_match: 0,
                min_match: 0,
                strong_matches: 0,
                moderate_matches: 0,
                weak_matches: 0,
            });
        }

        let mut sum: u64 = 0;
        let mut max_match = 0u8;
        let mut min_match = 100u8;
        let mut strong_matches = 0;
        let mut moderate_matches = 0;
        let mut weak_matches = 0;

        for result in &results {
            let pct = result.match_percentage;
            sum += u64::from(pct);
            max_match = max_match.max(pct);
            min_match = min_match.min(pct);
            match MatchCategory::classify(pct) {
                MatchCategory::Strong => strong_matches += 1,
                MatchCategory::Moderate => moderate_matches += 1,
                MatchCategory::Weak => weak_matches += 1,
            }
        }

        Ok(ScreeningAnalytics {
            total_screened: results.len(),
            average_match: sum as f64 / results.len() as f64,
            max_match,
            min_match,
            strong_matches,
            moderate_matches,
            weak_matches,
        })
    }
}
