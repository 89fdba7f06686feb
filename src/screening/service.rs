use std::sync::Arc;

use crate::config::ScreeningConfig;

use super::analytics::{AnalyticsAggregator, AnalyticsError, ScreeningAnalytics};
use super::cache::RankedViewCache;
use super::catalog::JobCatalog;
use super::domain::{ResumeDocument, ScreeningJob, ScreeningJobId, ScreeningResultId};
use super::engine::{ScreeningEngine, ScreeningError};
use super::export::{ExportError, ExportFormat, ExportPayload, ExportService};
use super::oracle::ScoringOracle;
use super::ranking::{PageRequest, RankedPage, RankingError, RankingService, ResultFilter, SortSpec};
use super::shortlist::{ShortlistAction, ShortlistError, ShortlistManager};
use super::store::ResultStore;

/// Facade composing the screening components behind one injection point, the
/// shape the router and CLI consume.
pub struct ScreeningService<S, O, C> {
    engine: ScreeningEngine<S, O, C>,
    ranking: RankingService<S>,
    shortlist: ShortlistManager<S>,
    export: ExportService<S>,
    analytics: AnalyticsAggregator<S>,
    cache: Arc<RankedViewCache>,
}

impl<S, O, C> ScreeningService<S, O, C>
where
    S: ResultStore + 'static,
    O: ScoringOracle + 'static,
    C: JobCatalog + 'static,
{
    pub fn new(store: Arc<S>, oracle: Arc<O>, catalog: Arc<C>, config: &ScreeningConfig) -> Self {
        let cache = Arc::new(RankedViewCache::new(
            config.cache_capacity,
            config.cache_ttl,
        ));
        let engine = ScreeningEngine::new(
            Arc::clone(&store),
            oracle,
            catalog,
            Arc::clone(&cache),
            config.max_batch_size,
            config.scoring_concurrency,
        );
        let ranking = RankingService::new(Arc::clone(&store), config.max_page_size);
        let shortlist = ShortlistManager::new(Arc::clone(&store), Arc::clone(&cache));
        let export = ExportService::new(Arc::clone(&store));
        let analytics = AnalyticsAggregator::new(store);

        Self {
            engine,
            ranking,
            shortlist,
            export,
            analytics,
            cache,
        }
    }

    /// Accept a batch; scoring proceeds in the background.
    pub fn submit_batch(
        &self,
        job_posting_id: &str,
        employer_id: &str,
        resumes: Vec<ResumeDocument>,
    ) -> Result<ScreeningJob, ScreeningError> {
        self.engine.submit_batch(job_posting_id, employer_id, resumes)
    }

    /// Accept a batch and wait for the drain. Offline/CLI path.
    pub async fn submit_batch_and_wait(
        &self,
        job_posting_id: &str,
        employer_id: &str,
        resumes: Vec<ResumeDocument>,
    ) -> Result<ScreeningJob, ScreeningError> {
        self.engine
            .submit_batch_and_wait(job_posting_id, employer_id, resumes)
            .await
    }

    pub fn job_status(&self, job_id: &ScreeningJobId) -> Result<ScreeningJob, ScreeningError> {
        self.engine.job_status(job_id)
    }

    /// Ranked view of a job's results, read through the cache.
    pub fn results(
        &self,
        job_id: &ScreeningJobId,
        filter: &ResultFilter,
        sort: &SortSpec,
        page: &PageRequest,
    ) -> Result<Arc<RankedPage>, RankingError> {
        if let Some(view) = self.cache.lookup(job_id, filter, sort, page) {
            return Ok(view);
        }
        let view = Arc::new(self.ranking.ranked_page(job_id, filter, sort, page)?);
        self.cache
            .store(job_id, filter, sort, page, Arc::clone(&view));
        Ok(view)
    }

    pub fn update_shortlist(
        &self,
        job_id: &ScreeningJobId,
        result_ids: &[ScreeningResultId],
        action: ShortlistAction,
    ) -> Result<usize, ShortlistError> {
        self.shortlist.update(job_id, result_ids, action)
    }

    pub fn export(
        &self,
        job_id: &ScreeningJobId,
        format: ExportFormat,
        selection: Option<&[ScreeningResultId]>,
    ) -> Result<ExportPayload, ExportError> {
        self.export.export(job_id, format, selection)
    }

    pub fn analytics(&self, job_id: &ScreeningJobId) -> Result<ScreeningAnalytics, AnalyticsError> {
        self.analytics.analytics(job_id)
    }

    pub fn delete_job(&self, job_id: &ScreeningJobId) -> Result<bool, ScreeningError> {
        self.engine.delete_job(job_id)
    }

    /// Direct access for tests asserting cache behavior.
    pub fn cache(&self) -> &RankedViewCache {
        &self.cache
    }
}
