//! End-to-end regression tests.
//!
//! Drive the poller over scripted snapshots and check what the counters and
//! the HTTP surface report afterwards.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use runwatch_api::build_router;
use runwatch_metrics::*;
use runwatch_state::*;

const STOPPED_AT: i64 = 1_700_000_000;

fn test_run(id: i64, repo: &str, workflow: &str, status: Status, stopped: Option<i64>) -> ActionRun {
    ActionRun {
        id,
        title: Some(format!("run {id}")),
        repository_name: Some(repo.to_string()),
        workflow_id: Some(workflow.to_string()),
        status: Some(status),
        stopped,
        ..Default::default()
    }
}

fn failed(id: i64, repo: &str, workflow: &str) -> ActionRun {
    test_run(id, repo, workflow, Status::Failure, Some(STOPPED_AT))
}

fn harness(runs: Vec<ActionRun>) -> (MemoryRunSource, Arc<CounterRegistry>, Poller) {
    let source = MemoryRunSource::new(runs);
    let counters = Arc::new(CounterRegistry::new());
    let poller = Poller::new(Arc::new(source.clone()), counters.clone());
    (source, counters, poller)
}

fn amount(report: &CycleReport, category: Category, repo: &str, workflow: &str) -> Option<i64> {
    report
        .increments(category)
        .iter()
        .find(|i| i.repository == repo && i.workflow == workflow)
        .map(|i| i.amount)
}

#[tokio::test]
async fn repeated_failure_counts_once_and_grows_with_new_failures() {
    let (source, counters, mut poller) = harness(vec![failed(1, "repoA", "wf1")]);

    let first = poller.poll_once().await.unwrap();
    assert_eq!(amount(&first, Category::Failure, "repoA", "wf1"), Some(1));

    let second = poller.poll_once().await.unwrap();
    assert_eq!(amount(&second, Category::Failure, "repoA", "wf1"), Some(0));

    source.push_run(failed(2, "repoA", "wf1"));
    let third = poller.poll_once().await.unwrap();
    assert_eq!(amount(&third, Category::Failure, "repoA", "wf1"), Some(1));

    assert_eq!(counters.get(Category::Failure, "repoA", "wf1"), Some(2));
}

#[tokio::test]
async fn running_run_never_contributes() {
    let running = test_run(1, "repoA", "wf1", Status::Running, None);
    let (_, counters, mut poller) = harness(vec![running]);

    for _ in 0..3 {
        let report = poller.poll_once().await.unwrap();
        for category in Category::ALL {
            assert!(report.increments(category).is_empty(), "{category}");
            assert!(counters.samples(category).is_empty(), "{category}");
        }
    }
}

#[tokio::test]
async fn fetch_failure_keeps_last_good_state() {
    let (source, counters, mut poller) = harness(vec![failed(1, "repoA", "wf1")]);

    poller.poll_once().await.unwrap();
    let after_first = poller.snapshots().clone();

    source.fail_next(SourceError::Connect("connection refused".to_string()));
    assert!(poller.poll_once().await.is_err());
    assert_eq!(poller.snapshots(), &after_first);

    source.push_run(failed(2, "repoA", "wf1"));
    source.push_run(failed(3, "repoB", "wf2"));
    let third = poller.poll_once().await.unwrap();

    assert_eq!(amount(&third, Category::Failure, "repoA", "wf1"), Some(1));
    assert_eq!(amount(&third, Category::Failure, "repoB", "wf2"), Some(1));
    assert_eq!(
        poller.snapshots().previous(Category::Failure),
        after_first.current(Category::Failure)
    );
    assert_eq!(counters.get(Category::Failure, "repoA", "wf1"), Some(2));
}

#[tokio::test]
async fn categories_track_their_own_statuses() {
    let (_, counters, mut poller) = harness(vec![
        failed(1, "web", "ci.yml"),
        test_run(2, "web", "ci.yml", Status::Cancelled, Some(STOPPED_AT)),
        test_run(3, "web", "ci.yml", Status::Skipped, Some(STOPPED_AT)),
        test_run(4, "web", "ci.yml", Status::Success, Some(STOPPED_AT)),
        test_run(5, "web", "ci.yml", Status::Cancelled, Some(0)),
    ]);

    poller.poll_once().await.unwrap();

    assert_eq!(counters.get(Category::Failure, "web", "ci.yml"), Some(1));
    assert_eq!(counters.get(Category::NotSuccess, "web", "ci.yml"), Some(3));
    assert_eq!(
        counters.get(Category::FailureOrCancelled, "web", "ci.yml"),
        Some(3)
    );
}

#[tokio::test]
async fn unlabelled_runs_export_under_unknown() {
    let run = ActionRun {
        id: 1,
        status: Some(Status::Failure),
        stopped: Some(STOPPED_AT),
        ..Default::default()
    };
    let (_, counters, mut poller) = harness(vec![run]);

    poller.poll_once().await.unwrap();
    assert_eq!(
        counters.get(Category::Failure, UNKNOWN_LABEL, UNKNOWN_LABEL),
        Some(1)
    );
}

#[tokio::test]
async fn vanished_label_pair_keeps_its_counter() {
    let (source, counters, mut poller) = harness(vec![failed(1, "old", "gone.yml")]);
    poller.poll_once().await.unwrap();

    source.set_runs(vec![]);
    let report = poller.poll_once().await.unwrap();

    assert!(report.increments(Category::Failure).is_empty());
    assert_eq!(counters.get(Category::Failure, "old", "gone.yml"), Some(1));
}

#[tokio::test]
async fn metrics_endpoint_reflects_poll_results() {
    let (_, counters, mut poller) = harness(vec![
        failed(1, "repoA", "wf1"),
        failed(2, "repoA", "wf1"),
    ]);
    poller.poll_once().await.unwrap();

    let source: Arc<dyn RecordSource> = Arc::new(MemoryRunSource::default());
    let router = build_router(source, counters);

    let req = Request::builder().uri("/metrics").body(Body::empty()).unwrap();
    let resp = router.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body = resp.into_body().collect().await.unwrap().to_bytes();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("# TYPE action_runs_failure_total counter"));
    assert!(text.contains(
        "action_runs_failure_total{repository_name=\"repoA\",workflow_id=\"wf1\"} 2"
    ));
}

#[tokio::test]
async fn action_runs_endpoint_dumps_the_store() {
    let source = MemoryRunSource::new(vec![
        failed(2, "repoA", "wf1"),
        test_run(1, "repoA", "wf1", Status::Waiting, None),
    ]);
    let router = build_router(Arc::new(source), Arc::new(CounterRegistry::new()));

    let req = Request::builder()
        .uri("/action-runs")
        .body(Body::empty())
        .unwrap();
    let resp = router.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body = resp.into_body().collect().await.unwrap().to_bytes();
    let runs: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(runs.as_array().unwrap().len(), 2);
    assert_eq!(runs[0]["status"], "failure");
    assert_eq!(runs[1]["status"], "waiting");
    assert!(runs[1].get("stopped").is_none());
}

#[tokio::test]
async fn unknown_route_is_404() {
    let router = build_router(
        Arc::new(MemoryRunSource::default()),
        Arc::new(CounterRegistry::new()),
    );

    let req = Request::builder().uri("/nope").body(Body::empty()).unwrap();
    let resp = router.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
