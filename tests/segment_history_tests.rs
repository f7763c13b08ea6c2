// SPDX-License-Identifier: MIT

//! Segment-effort reconciliation tests: local-wins merge, date backfill,
//! best-effort remote history, and malformed segment detail.

use std::sync::Arc;

use paceline::db::{CredentialStore, MemoryStore};
use paceline::error::Error;
use paceline::models::Activity;
use paceline::services::segment::SegmentService;
use paceline::services::token::TokenManager;

mod common;

use common::FakeApi;

const SEGMENT_ID: u64 = 7;

async fn service(api: FakeApi) -> SegmentService {
    let api = Arc::new(api);
    let store = Arc::new(MemoryStore::new());
    store.save(&common::credentials(3600)).await.unwrap();
    let tokens = Arc::new(TokenManager::new(api.clone(), store));
    SegmentService::new(api, tokens)
}

/// Cached activities: one detailed with an undated effort on the segment,
/// one detailed with a dated effort, one on another segment, one summary.
fn local_activities() -> Vec<Activity> {
    let mut first = common::run(1, "2024-01-05T08:00:00Z");
    first.segment_efforts = Some(vec![common::effort(10, SEGMENT_ID, None)]);

    let mut second = common::run(2, "2024-02-05T08:00:00Z");
    second.segment_efforts = Some(vec![common::effort(
        11,
        SEGMENT_ID,
        Some("2024-02-05T08:10:00Z"),
    )]);

    let mut other = common::run(3, "2024-03-05T08:00:00Z");
    other.segment_efforts = Some(vec![common::effort(12, 8, Some("2024-03-05T08:10:00Z"))]);

    vec![
        first,
        second,
        other,
        common::run(4, "2024-04-05T08:00:00Z"),
    ]
}

#[tokio::test(start_paused = true)]
async fn merge_is_local_first_and_deduplicated_by_id() {
    common::init_tracing();
    // Remote history re-serves effort 11 with different timing plus a new
    // effort 13; the duplicate appears on both pages to check idempotence.
    let mut remote_duplicate = common::effort(11, SEGMENT_ID, Some("2024-02-05T08:10:00Z"));
    remote_duplicate.elapsed_time = 999;
    let service = service(FakeApi {
        segments: [(SEGMENT_ID, common::segment(SEGMENT_ID, "Cedar Climb"))].into(),
        effort_pages: vec![
            vec![
                remote_duplicate.clone(),
                common::effort(13, SEGMENT_ID, Some("2024-03-20T09:00:00Z")),
            ],
            vec![remote_duplicate],
        ],
        ..Default::default()
    })
    .await;

    let history = service
        .load_segment_history(SEGMENT_ID, &local_activities(), |_| {})
        .await
        .expect("history loads");

    assert_eq!(history.segment.name, "Cedar Climb");

    let ids: Vec<u64> = history.efforts.iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![10, 11, 13], "ascending by date, no duplicates");

    // Local efforts win on id collision; the remote copy of 11 never
    // overwrites the locally cached timing.
    let eleven = history.efforts.iter().find(|e| e.id == 11).unwrap();
    assert_eq!(eleven.elapsed_time, 240);
}

#[tokio::test(start_paused = true)]
async fn undated_local_effort_inherits_activity_date() {
    let service = service(FakeApi {
        segments: [(SEGMENT_ID, common::segment(SEGMENT_ID, "Cedar Climb"))].into(),
        ..Default::default()
    })
    .await;

    let history = service
        .load_segment_history(SEGMENT_ID, &local_activities(), |_| {})
        .await
        .expect("history loads");

    let ten = history.efforts.iter().find(|e| e.id == 10).unwrap();
    assert_eq!(ten.start_date.as_deref(), Some("2024-01-05T08:00:00Z"));
}

#[tokio::test(start_paused = true)]
async fn effort_without_resolvable_date_is_dropped() {
    let service = service(FakeApi {
        segments: [(SEGMENT_ID, common::segment(SEGMENT_ID, "Cedar Climb"))].into(),
        ..Default::default()
    })
    .await;

    // Parent activity has a malformed start date, so the undated effort has
    // nothing to inherit.
    let mut broken = common::run(1, "not-a-date");
    broken.segment_efforts = Some(vec![common::effort(10, SEGMENT_ID, None)]);

    let history = service
        .load_segment_history(SEGMENT_ID, &[broken], |_| {})
        .await
        .expect("history loads");

    assert!(history.efforts.is_empty());
}

#[tokio::test(start_paused = true)]
async fn remote_history_failure_still_returns_local_efforts() {
    // The per-segment history endpoint can be rate-limited or restricted;
    // local data must stay visible on its own.
    let service = service(FakeApi {
        segments: [(SEGMENT_ID, common::segment(SEGMENT_ID, "Cedar Climb"))].into(),
        effort_history_fails: true,
        ..Default::default()
    })
    .await;

    let history = service
        .load_segment_history(SEGMENT_ID, &local_activities(), |_| {})
        .await
        .expect("local-only result");

    let ids: Vec<u64> = history.efforts.iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![10, 11]);
}

#[tokio::test(start_paused = true)]
async fn nameless_segment_detail_is_a_data_error() {
    let service = service(FakeApi {
        segments: [(SEGMENT_ID, common::segment(SEGMENT_ID, ""))].into(),
        ..Default::default()
    })
    .await;

    let err = service
        .load_segment_history(SEGMENT_ID, &local_activities(), |_| {})
        .await
        .expect_err("nameless segment");

    assert!(matches!(err, Error::Data(_)));
}
