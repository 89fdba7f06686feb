use std::cmp::Ordering;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::domain::{MatchCategory, ScreeningJobId, ScreeningResult};
use super::store::{ResultStore, StoreError};

/// Category constraint applied before banded filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryFilter {
    #[default]
    All,
    Strong,
    Moderate,
    Weak,
}

impl CategoryFilter {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "all" => Some(Self::All),
            "strong" => Some(Self::Strong),
            "moderate" => Some(Self::Moderate),
            "weak" => Some(Self::Weak),
            _ => None,
        }
    }

    fn admits(self, category: MatchCategory) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Strong => category == MatchCategory::Strong,
            CategoryFilter::Moderate => category == MatchCategory::Moderate,
            CategoryFilter::Weak => category == MatchCategory::Weak,
        }
    }
}

/// Filter over a job's result set. `min_match > max_match` selects nothing
/// (an empty view, not an error).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResultFilter {
    pub min_match: u8,
    pub max_match: u8,
    pub category: CategoryFilter,
    pub shortlisted_only: bool,
}

impl Default for ResultFilter {
    fn default() -> Self {
        Self {
            min_match: 0,
            max_match: 100,
            category: CategoryFilter::All,
            shortlisted_only: false,
        }
    }
}

impl ResultFilter {
    /// Clamp match bounds into 0..=100 so equivalent queries share cache keys.
    pub fn normalized(mut self) -> Self {
        self.min_match = self.min_match.min(100);
        self.max_match = self.max_match.min(100);
        self
    }

    fn admits(&self, result: &ScreeningResult) -> bool {
        let pct = result.match_percentage;
        pct >= self.min_match
            && pct <= self.max_match
            && self.category.admits(result.category())
            && (!self.shortlisted_only || result.is_shortlisted)
    }
}

/// Read-time ordering of a job's results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Canonical ranking: match desc, created_at asc, id asc.
    #[default]
    Rank,
    /// Numeric match percentage with configurable direction, ties by id.
    Match,
    /// Case-insensitive candidate name, ties by id.
    Name,
}

impl SortKey {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "rank" => Some(Self::Rank),
            "match" => Some(Self::Match),
            "name" => Some(Self::Name),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SortSpec {
    pub key: SortKey,
    pub descending: bool,
}

/// 1-indexed page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 20,
        }
    }
}

/// An ordered, filtered, paginated projection of a job's results.
#[derive(Debug, Clone, Serialize)]
pub struct RankedPage {
    pub items: Vec<ScreeningResult>,
    pub total: usize,
    pub page: u32,
    pub page_size: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum RankingError {
    #[error("screening job not found")]
    JobNotFound,
    #[error("page must be >= 1 and page size within 1..={max}")]
    InvalidPagination { max: u32 },
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for RankingError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => RankingError::JobNotFound,
            other => RankingError::Store(other),
        }
    }
}

/// Computes ranked views of a job's result set straight from the store.
pub struct RankingService<S> {
    store: Arc<S>,
    max_page_size: u32,
}

impl<S: ResultStore> RankingService<S> {
    pub fn new(store: Arc<S>, max_page_size: u32) -> Self {
        Self {
            store,
            max_page_size,
        }
    }

    pub fn ranked_page(
        &self,
        job_id: &ScreeningJobId,
        filter: &ResultFilter,
        sort: &SortSpec,
        page: &PageRequest,
    ) -> Result<RankedPage, RankingError> {
        if page.page == 0 || page.page_size == 0 || page.page_size > self.max_page_size {
            return Err(RankingError::InvalidPagination {
                max: self.max_page_size,
            });
        }

        let filter = filter.normalized();
        let mut results: Vec<ScreeningResult> = self
            .store
            .results_for_job(job_id)?
            .into_iter()
            .filter(|result| filter.admits(result))
            .collect();

        sort_results(&mut results, sort);

        let total = results.len();
        let offset = (page.page as usize - 1) * page.page_size as usize;
        let items = if offset >= total {
            Vec::new()
        } else {
            results
                .into_iter()
                .skip(offset)
                .take(page.page_size as usize)
                .collect()
        };

        Ok(RankedPage {
            items,
            total,
            page: page.page,
            page_size: page.page_size,
        })
    }

    /// The unfiltered result set, in canonical rank order. Feeds exports and
    /// analytics, which never go through the cache.
    pub fn all_ranked(&self, job_id: &ScreeningJobId) -> Result<Vec<ScreeningResult>, RankingError> {
        let mut results = self.store.results_for_job(job_id)?;
        sort_results(&mut results, &SortSpec::default());
        Ok(results)
    }
}

fn sort_results(results: &mut [ScreeningResult], sort: &SortSpec) {
    match sort.key {
        SortKey::Rank => {
            results.sort_by(rank_order);
            if sort.descending {
                results.reverse();
            }
        }
        SortKey::Match => {
            results.sort_by(|a, b| {
                let ordering = a.match_percentage.cmp(&b.match_percentage);
                let ordering = if sort.descending {
                    ordering.reverse()
                } else {
                    ordering
                };
                ordering.then_with(|| a.id.cmp(&b.id))
            });
        }
        SortKey::Name => {
            results.sort_by(|a, b| {
                let ordering = a
                    .candidate_name
                    .to_lowercase()
                    .cmp(&b.candidate_name.to_lowercase());
                let ordering = if sort.descending {
                    ordering.reverse()
                } else {
                    ordering
                };
                ordering.then_with(|| a.id.cmp(&b.id))
            });
        }
    }
}

/// Best match first; ties broken by earliest creation, then id, so the rank
/// order is total and reproducible.
fn rank_order(a: &ScreeningResult, b: &ScreeningResult) -> Ordering {
    b.match_percentage
        .cmp(&a.match_percentage)
        .then_with(|| a.created_at.cmp(&b.created_at))
        .then_with(|| a.id.cmp(&b.id))
}
