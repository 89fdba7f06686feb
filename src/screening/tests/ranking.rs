use super::common::*;
use std::collections::HashSet;

use crate::screening::domain::ScreeningJobId;
use crate::screening::{
    CategoryFilter, PageRequest, RankingError, ResultFilter, ShortlistAction, SortKey, SortSpec,
};

#[tokio::test]
async fn default_view_ranks_best_match_first() {
    let (service, _) = build_service();
    let job = screen_standard_batch(&service).await;

    let view = service
        .results(
            &job.id,
            &ResultFilter::default(),
            &SortSpec::default(),
            &PageRequest::default(),
        )
        .expect("ranked view");

    assert_eq!(view.total, 5);
    let percentages: Vec<u8> = view.items.iter().map(|r| r.match_percentage).collect();
    assert_eq!(percentages, vec![100, 80, 60, 40, 0]);
}

#[tokio::test]
async fn pages_partition_the_result_set() {
    let (service, _) = build_service();
    let job = screen_standard_batch(&service).await;

    let mut seen = HashSet::new();
    for page in 1..=3u32 {
        let view = service
            .results(
                &job.id,
                &ResultFilter::default(),
                &SortSpec::default(),
                &PageRequest { page, page_size: 2 },
            )
            .expect("page");
        assert_eq!(view.total, 5);
        assert_eq!(view.page, page);
        let expected_len = if page == 3 { 1 } else { 2 };
        assert_eq!(view.items.len(), expected_len);
        for item in &view.items {
            assert!(seen.insert(item.id.clone()), "pages must not overlap");
        }
    }
    assert_eq!(seen.len(), 5);

    // Past the last page the view is empty, not an error.
    let beyond = service
        .results(
            &job.id,
            &ResultFilter::default(),
            &SortSpec::default(),
            &PageRequest {
                page: 9,
                page_size: 2,
            },
        )
        .expect("page");
    assert!(beyond.items.is_empty());
    assert_eq!(beyond.total, 5);
}

#[tokio::test]
async fn pagination_bounds_are_validated() {
    let (service, _) = build_service();
    let job = screen_standard_batch(&service).await;

    for request in [
        PageRequest {
            page: 0,
            page_size: 10,
        },
        PageRequest {
            page: 1,
            page_size: 0,
        },
        PageRequest {
            page: 1,
            page_size: 51,
        },
    ] {
        match service.results(
            &job.id,
            &ResultFilter::default(),
            &SortSpec::default(),
            &request,
        ) {
            Err(RankingError::InvalidPagination { max }) => assert_eq!(max, 50),
            other => panic!("expected pagination error for {request:?}, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn inverted_match_bounds_select_nothing() {
    let (service, _) = build_service();
    let job = screen_standard_batch(&service).await;

    let filter = ResultFilter {
        min_match: 90,
        max_match: 10,
        ..ResultFilter::default()
    };
    let view = service
        .results(
            &job.id,
            &filter,
            &SortSpec::default(),
            &PageRequest::default(),
        )
        .expect("empty view");
    assert_eq!(view.total, 0);
    assert!(view.items.is_empty());
}

#[tokio::test]
async fn category_filter_selects_one_band() {
    let (service, _) = build_service();
    let job = screen_standard_batch(&service).await;

    let filter = ResultFilter {
        category: CategoryFilter::Moderate,
        ..ResultFilter::default()
    };
    let view = service
        .results(
            &job.id,
            &filter,
            &SortSpec::default(),
            &PageRequest::default(),
        )
        .expect("view");
    assert_eq!(view.total, 1);
    assert_eq!(view.items[0].match_percentage, 60);
}

#[tokio::test]
async fn shortlisted_only_reflects_shortlist_updates() {
    let (service, _) = build_service();
    let job = screen_standard_batch(&service).await;

    let all = service
        .results(
            &job.id,
            &ResultFilter::default(),
            &SortSpec::default(),
            &PageRequest::default(),
        )
        .expect("view");
    let top_id = all.items[0].id.clone();

    service
        .update_shortlist(&job.id, &[top_id.clone()], ShortlistAction::Add)
        .expect("shortlist");

    let filter = ResultFilter {
        shortlisted_only: true,
        ..ResultFilter::default()
    };
    let shortlisted = service
        .results(
            &job.id,
            &filter,
            &SortSpec::default(),
            &PageRequest::default(),
        )
        .expect("view");
    assert_eq!(shortlisted.total, 1);
    assert_eq!(shortlisted.items[0].id, top_id);
    assert!(shortlisted.items[0].is_shortlisted);
}

#[tokio::test]
async fn name_sort_orders_case_insensitively() {
    let (service, _) = build_service();
    let job = screen_standard_batch(&service).await;

    let sort = SortSpec {
        key: SortKey::Name,
        descending: false,
    };
    let view = service
        .results(
            &job.id,
            &ResultFilter::default(),
            &sort,
            &PageRequest::default(),
        )
        .expect("view");
    let names: Vec<&str> = view.items.iter().map(|r| r.candidate_name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "Ada Lovelace",
            "Alan Turing",
            "Barbara Liskov",
            "Edsger Dijkstra",
            "Grace Hopper"
        ]
    );
}

#[tokio::test]
async fn match_sort_ascending_reverses_the_ranking() {
    let (service, _) = build_service();
    let job = screen_standard_batch(&service).await;

    let sort = SortSpec {
        key: SortKey::Match,
        descending: false,
    };
    let view = service
        .results(
            &job.id,
            &ResultFilter::default(),
            &sort,
            &PageRequest::default(),
        )
        .expect("view");
    let percentages: Vec<u8> = view.items.iter().map(|r| r.match_percentage).collect();
    assert_eq!(percentages, vec![0, 40, 60, 80, 100]);
}

/// Four resumes scoring [80, 80, 40, 40] against the fixture posting.
fn tied_batch() -> Vec<crate::screening::ResumeDocument> {
    vec![
        resume("cand-s1", "First Strong", "Rust and PostgreSQL."),
        resume("cand-w1", "First Weak", "Rust."),
        resume("cand-s2", "Second Strong", "Rust and PostgreSQL."),
        resume("cand-w2", "Second Weak", "Rust."),
    ]
}

#[tokio::test]
async fn tied_matches_break_ties_by_result_id() {
    let (service, _) = build_service();
    let job = service
        .submit_batch_and_wait(POSTING_ID, "emp-1", tied_batch())
        .await
        .expect("batch screens");

    let sort = SortSpec {
        key: SortKey::Match,
        descending: true,
    };
    let view = service
        .results(
            &job.id,
            &ResultFilter::default(),
            &sort,
            &PageRequest::default(),
        )
        .expect("view");

    let percentages: Vec<u8> = view.items.iter().map(|r| r.match_percentage).collect();
    assert_eq!(percentages, vec![80, 80, 40, 40]);
    // Within each tied pair the order is fixed by ascending result id.
    assert!(view.items[0].id < view.items[1].id);
    assert!(view.items[2].id < view.items[3].id);
}

#[tokio::test]
async fn rank_order_is_total_over_tied_matches() {
    let (service, _) = build_service();
    let job = service
        .submit_batch_and_wait(POSTING_ID, "emp-1", tied_batch())
        .await
        .expect("batch screens");

    let view = service
        .results(
            &job.id,
            &ResultFilter::default(),
            &SortSpec::default(),
            &PageRequest::default(),
        )
        .expect("view");

    let percentages: Vec<u8> = view.items.iter().map(|r| r.match_percentage).collect();
    assert_eq!(percentages, vec![80, 80, 40, 40]);
    for pair in view.items.windows(2) {
        if pair[0].match_percentage == pair[1].match_percentage {
            assert!(
                (pair[0].created_at, &pair[0].id) < (pair[1].created_at, &pair[1].id),
                "tied results must order by creation time then id"
            );
        }
    }
}

#[tokio::test]
async fn unknown_job_is_not_found() {
    let (service, _) = build_service();

    match service.results(
        &ScreeningJobId("scr-unknown".to_string()),
        &ResultFilter::default(),
        &SortSpec::default(),
        &PageRequest::default(),
    ) {
        Err(RankingError::JobNotFound) => {}
        other => panic!("expected not found, got {other:?}"),
    }
}
