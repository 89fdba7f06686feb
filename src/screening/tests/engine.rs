use super::common::*;
use std::time::Duration;

use crate::screening::domain::{ScreeningJobId, ScreeningJobStatus};
use crate::screening::ScreeningError;

#[tokio::test]
async fn empty_batch_is_rejected_before_job_creation() {
    let (service, store) = build_service();

    match service.submit_batch(POSTING_ID, "emp-1", Vec::new()) {
        Err(ScreeningError::EmptyBatch) => {}
        other => panic!("expected empty batch rejection, got {other:?}"),
    }

    // No job record is left behind by a rejected submission.
    use crate::screening::ResultStore;
    assert!(store
        .fetch_job(&ScreeningJobId("scr-000001".to_string()))
        .expect("fetch")
        .is_none());
}

#[tokio::test]
async fn oversized_batch_reports_submitted_and_limit() {
    let mut config = screening_config();
    config.max_batch_size = 3;
    let (service, _) = build_service_with_config(config);

    let mut resumes = standard_batch();
    resumes.truncate(4);

    match service.submit_batch(POSTING_ID, "emp-1", resumes) {
        Err(ScreeningError::BatchTooLarge { submitted, limit }) => {
            assert_eq!(submitted, 4);
            assert_eq!(limit, 3);
        }
        other => panic!("expected batch too large, got {other:?}"),
    }
}

#[tokio::test]
async fn resume_without_text_is_rejected_with_candidate_id() {
    let (service, _) = build_service();
    let mut resumes = standard_batch();
    resumes.push(resume("cand-blank", "No Text", "   "));

    match service.submit_batch(POSTING_ID, "emp-1", resumes) {
        Err(ScreeningError::EmptyResume { candidate_id }) => {
            assert_eq!(candidate_id, "cand-blank");
        }
        other => panic!("expected empty resume rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn unknown_posting_is_rejected() {
    let (service, _) = build_service();

    match service.submit_batch("posting-missing", "emp-1", standard_batch()) {
        Err(ScreeningError::UnknownJobPosting { job_posting_id }) => {
            assert_eq!(job_posting_id, "posting-missing");
        }
        other => panic!("expected unknown posting rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn drained_batch_completes_with_full_progress() {
    let (service, _) = build_service();

    let job = screen_standard_batch(&service).await;

    assert_eq!(job.status, ScreeningJobStatus::Completed);
    assert_eq!(job.total_resumes, 5);
    assert_eq!(job.processed_count, 5);
    assert_eq!(job.skipped_count, 0);
    assert_eq!(job.result_count(), 5);
}

#[tokio::test]
async fn scoring_failures_skip_the_resume_not_the_batch() {
    let service = build_service_with_oracle(SelectiveOracle::new());

    let mut resumes = standard_batch();
    resumes.push(resume("bad-parse", "Corrupt Upload", "unreadable bytes"));

    let job = service
        .submit_batch_and_wait(POSTING_ID, "emp-1", resumes)
        .await
        .expect("batch screens");

    assert_eq!(job.status, ScreeningJobStatus::Completed);
    assert_eq!(job.processed_count, 6);
    assert_eq!(job.skipped_count, 1);
    assert_eq!(job.result_count(), 5);
}

#[tokio::test]
async fn out_of_range_scores_are_skipped_not_persisted() {
    let service = build_service_with_oracle(OverflowOracle);

    let job = service
        .submit_batch_and_wait(
            POSTING_ID,
            "emp-1",
            vec![resume("cand-over", "Ada Lovelace", "Rust everywhere.")],
        )
        .await
        .expect("batch drains");

    assert_eq!(job.processed_count, 1);
    assert_eq!(job.skipped_count, 1);
    assert_eq!(job.result_count(), 0);
    assert_eq!(job.status, ScreeningJobStatus::Failed);
}

#[tokio::test]
async fn failed_result_writes_still_advance_progress() {
    let service = build_service_with_store(std::sync::Arc::new(UnreliableStore::new()));

    let job = service
        .submit_batch_and_wait(POSTING_ID, "emp-1", standard_batch())
        .await
        .expect("batch drains");

    assert_eq!(job.processed_count, job.total_resumes);
    assert_eq!(job.skipped_count, 5);
    assert_eq!(job.result_count(), 0);
    assert_eq!(job.status, ScreeningJobStatus::Failed);
}

#[tokio::test]
async fn batch_with_no_persisted_results_fails() {
    let service = build_service_with_oracle(FailingOracle);

    let job = service
        .submit_batch_and_wait(POSTING_ID, "emp-1", standard_batch())
        .await
        .expect("batch drains");

    assert_eq!(job.status, ScreeningJobStatus::Failed);
    assert_eq!(job.processed_count, 5);
    assert_eq!(job.skipped_count, 5);
    assert_eq!(job.result_count(), 0);
}

#[tokio::test]
async fn submit_batch_returns_processing_snapshot_and_settles() {
    let (service, _) = build_service();

    let snapshot = service
        .submit_batch(POSTING_ID, "emp-1", standard_batch())
        .expect("batch accepted");
    assert_eq!(snapshot.status, ScreeningJobStatus::Processing);
    assert_eq!(snapshot.total_resumes, 5);
    assert_eq!(snapshot.processed_count, 0);

    // Background scoring settles shortly after acceptance.
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        let job = service.job_status(&snapshot.id).expect("job exists");
        if job.status.is_terminal() {
            assert_eq!(job.status, ScreeningJobStatus::Completed);
            assert_eq!(job.processed_count, 5);
            break;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "batch did not settle in time"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test]
async fn job_status_for_unknown_id_is_not_found() {
    let (service, _) = build_service();

    match service.job_status(&ScreeningJobId("scr-unknown".to_string())) {
        Err(ScreeningError::JobNotFound) => {}
        other => panic!("expected not found, got {other:?}"),
    }
}

#[tokio::test]
async fn delete_is_idempotent_and_cascades() {
    let (service, _) = build_service();
    let job = screen_standard_batch(&service).await;

    assert!(service.delete_job(&job.id).expect("delete"));
    assert!(!service.delete_job(&job.id).expect("repeat delete"));

    match service.job_status(&job.id) {
        Err(ScreeningError::JobNotFound) => {}
        other => panic!("expected not found after delete, got {other:?}"),
    }
    match service.analytics(&job.id) {
        Err(crate::screening::AnalyticsError::JobNotFound) => {}
        other => panic!("expected cascaded delete, got {other:?}"),
    }
}
