//! Ranked-view cache in front of the ranking service.
//!
//! Keys combine the job id, the normalized query parameters, and a per-job
//! generation drawn from a process-wide sequence. A job is tracked from the
//! first stored view; invalidation swaps in a fresh generation, orphaning
//! every cached view for that job at once, and deletion stops tracking the
//! job entirely. Generations are never reissued, so orphaned views can no
//! longer be looked up and simply age out through TTL/LRU. The cache is a
//! latency optimization only — misses always recompute from the store, never
//! the other way around.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use moka::sync::Cache;

use super::domain::ScreeningJobId;
use super::ranking::{PageRequest, RankedPage, ResultFilter, SortSpec};

static GENERATION_SEQUENCE: AtomicU64 = AtomicU64::new(0);

fn next_generation() -> u64 {
    GENERATION_SEQUENCE.fetch_add(1, Ordering::Relaxed)
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RankedViewKey {
    job_id: ScreeningJobId,
    filter: ResultFilter,
    sort: SortSpec,
    page: PageRequest,
    generation: u64,
}

pub struct RankedViewCache {
    entries: Cache<RankedViewKey, Arc<RankedPage>>,
    generations: RwLock<HashMap<ScreeningJobId, u64>>,
}

impl RankedViewCache {
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        Self {
            entries: Cache::builder()
                .max_capacity(capacity)
                .time_to_live(ttl)
                .build(),
            generations: RwLock::new(HashMap::new()),
        }
    }

    fn key(
        job_id: &ScreeningJobId,
        filter: &ResultFilter,
        sort: &SortSpec,
        page: &PageRequest,
        generation: u64,
    ) -> RankedViewKey {
        RankedViewKey {
            job_id: job_id.clone(),
            filter: filter.normalized(),
            sort: *sort,
            page: *page,
            generation,
        }
    }

    pub fn lookup(
        &self,
        job_id: &ScreeningJobId,
        filter: &ResultFilter,
        sort: &SortSpec,
        page: &PageRequest,
    ) -> Option<Arc<RankedPage>> {
        let generation = self
            .generations
            .read()
            .expect("cache generation lock poisoned")
            .get(job_id)
            .copied()?;
        self.entries
            .get(&Self::key(job_id, filter, sort, page, generation))
    }

    pub fn store(
        &self,
        job_id: &ScreeningJobId,
        filter: &ResultFilter,
        sort: &SortSpec,
        page: &PageRequest,
        view: Arc<RankedPage>,
    ) {
        let generation = {
            let mut generations = self
                .generations
                .write()
                .expect("cache generation lock poisoned");
            *generations
                .entry(job_id.clone())
                .or_insert_with(next_generation)
        };
        self.entries
            .insert(Self::key(job_id, filter, sort, page, generation), view);
    }

    /// Drop every cached view for one job. Other jobs are untouched.
    pub fn invalidate(&self, job_id: &ScreeningJobId) {
        let mut generations = self
            .generations
            .write()
            .expect("cache generation lock poisoned");
        if let Some(generation) = generations.get_mut(job_id) {
            *generation = next_generation();
        }
    }

    /// Invalidate and stop tracking a deleted job, so the generation map does
    /// not grow with the number of jobs ever screened.
    pub fn forget(&self, job_id: &ScreeningJobId) {
        self.generations
            .write()
            .expect("cache generation lock poisoned")
            .remove(job_id);
    }

    /// Number of jobs with a live generation. Exposed for tests.
    pub fn tracked_jobs(&self) -> usize {
        self.generations
            .read()
            .expect("cache generation lock poisoned")
            .len()
    }

    pub fn entry_count(&self) -> u64 {
        self.entries.entry_count()
    }
}

impl std::fmt::Debug for RankedViewCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RankedViewCache")
            .field("entries", &self.entries.entry_count())
            .field("tracked_jobs", &self.tracked_jobs())
            .finish()
    }
}
