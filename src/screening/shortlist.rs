use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::cache::RankedViewCache;
use super::domain::{ScreeningJobId, ScreeningResultId};
use super::store::{ResultStore, StoreError};

/// Direction of a bulk shortlist update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShortlistAction {
    Add,
    Remove,
}

#[derive(Debug, thiserror::Error)]
pub enum ShortlistError {
    #[error("candidate result id list must not be empty")]
    EmptySelection,
    #[error("screening job not found")]
    JobNotFound,
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for ShortlistError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => ShortlistError::JobNotFound,
            other => ShortlistError::Store(other),
        }
    }
}

/// Bulk add/remove of candidates on a job's shortlist. The only in-place
/// mutation permitted on results after creation.
pub struct ShortlistManager<S> {
    store: Arc<S>,
    cache: Arc<RankedViewCache>,
}

impl<S: ResultStore> ShortlistManager<S> {
    pub fn new(store: Arc<S>, cache: Arc<RankedViewCache>) -> Self {
        Self { store, cache }
    }

    /// Apply the action to every listed result that belongs to the job.
    /// Foreign ids are silently excluded and do not count toward the affected
    /// total. Re-adding an already shortlisted candidate is a no-op success.
    pub fn update(
        &self,
        job_id: &ScreeningJobId,
        result_ids: &[ScreeningResultId],
        action: ShortlistAction,
    ) -> Result<usize, ShortlistError> {
        if result_ids.is_empty() {
            return Err(ShortlistError::EmptySelection);
        }

        let shortlisted = matches!(action, ShortlistAction::Add);
        let affected = self
            .store
            .update_shortlist(job_id, result_ids, shortlisted)?;
        self.cache.invalidate(job_id);

        info!(
            job_id = %job_id.0,
            affected,
            action = if shortlisted { "add" } else { "remove" },
            "shortlist updated"
        );
        Ok(affected)
    }
}
