//! Pagination policy against a scripted page source (no network)

use std::cell::RefCell;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

use indicatif::ProgressBar;
use jobline_jsearch::{
    fetch_jobs, FetchError, FetchPolicy, PageFailure, PageResponse, PageSource, StopReason,
    TransportError,
};

type Reply = Result<PageResponse, TransportError>;

/// Replays canned replies in order and records every (query, page) asked for
struct ScriptedSource {
    replies: RefCell<VecDeque<Reply>>,
    calls: RefCell<Vec<(String, u32)>>,
    called_at: RefCell<Vec<Instant>>,
}

impl ScriptedSource {
    fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: RefCell::new(replies.into()),
            calls: RefCell::new(Vec::new()),
            called_at: RefCell::new(Vec::new()),
        }
    }

    fn pages_called(&self) -> Vec<u32> {
        self.calls.borrow().iter().map(|(_, p)| *p).collect()
    }

    /// Time between consecutive requests
    fn gaps(&self) -> Vec<Duration> {
        self.called_at
            .borrow()
            .windows(2)
            .map(|w| w[1] - w[0])
            .collect()
    }
}

impl PageSource for ScriptedSource {
    fn fetch_page(&self, query: &str, page: u32) -> Result<PageResponse, TransportError> {
        self.calls.borrow_mut().push((query.to_string(), page));
        self.called_at.borrow_mut().push(Instant::now());
        self.replies
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Ok(PageResponse::new(200, r#"{"data":[]}"#)))
    }
}

fn ok_page(ids: &[&str]) -> Reply {
    let data: Vec<serde_json::Value> = ids
        .iter()
        .map(|id| serde_json::json!({"job_id": id, "job_title": "Data Analyst"}))
        .collect();
    Ok(PageResponse::new(
        200,
        serde_json::json!({"status": "OK", "data": data}).to_string(),
    ))
}

fn status(code: u16) -> Reply {
    Ok(PageResponse::new(code, "{\"message\":\"nope\"}"))
}

fn run(source: &ScriptedSource, pages: u32) -> Result<jobline_jsearch::FetchOutcome, FetchError> {
    fetch_jobs(
        source,
        "Data Analyst",
        1,
        pages,
        &FetchPolicy::immediate(),
        &ProgressBar::hidden(),
    )
}

#[test]
fn collects_all_pages_in_order() {
    let source = ScriptedSource::new(vec![ok_page(&["a", "b"]), ok_page(&["c"]), ok_page(&[])]);
    let outcome = run(&source, 3).unwrap();

    assert_eq!(outcome.records.len(), 3);
    assert_eq!(outcome.records[2]["job_id"], "c");
    assert_eq!(outcome.pages_ok, 3);
    assert!(outcome.failed_pages.is_empty());
    assert!(outcome.stopped.is_none());
    assert_eq!(source.pages_called(), [1, 2, 3]);
    assert!(source.calls.borrow().iter().all(|(q, _)| q == "Data Analyst"));
}

#[test]
fn rate_limit_retries_exactly_once_then_succeeds() {
    let source = ScriptedSource::new(vec![status(429), ok_page(&["a"]), ok_page(&["b"])]);
    let outcome = run(&source, 2).unwrap();

    assert_eq!(source.pages_called(), [1, 1, 2]);
    assert_eq!(outcome.records.len(), 2);
    assert!(outcome.failed_pages.is_empty());
}

#[test]
fn rate_limit_twice_marks_page_failed() {
    let source = ScriptedSource::new(vec![status(429), status(429), ok_page(&["b"])]);
    let outcome = run(&source, 2).unwrap();

    assert_eq!(source.pages_called(), [1, 1, 2]);
    assert_eq!(outcome.failed_pages.len(), 1);
    assert_eq!(outcome.failed_pages[0].page, 1);
    assert_eq!(outcome.failed_pages[0].failure, PageFailure::RateLimited);
    assert_eq!(outcome.records.len(), 1);
}

#[test]
fn unauthorized_aborts_without_results() {
    let source = ScriptedSource::new(vec![ok_page(&["a"]), status(401), ok_page(&["c"])]);
    let err = run(&source, 3).unwrap_err();

    assert!(matches!(err, FetchError::Unauthorized { page: 2 }));
    assert_eq!(source.pages_called(), [1, 2]);
}

#[test]
fn unauthorized_after_rate_limit_retry_still_aborts() {
    let source = ScriptedSource::new(vec![status(429), status(401)]);
    let err = run(&source, 2).unwrap_err();
    assert!(matches!(err, FetchError::Unauthorized { page: 1 }));
}

#[test]
fn forbidden_stops_but_keeps_collected() {
    let source = ScriptedSource::new(vec![ok_page(&["a", "b"]), status(403), ok_page(&["c"])]);
    let outcome = run(&source, 3).unwrap();

    assert_eq!(outcome.records.len(), 2);
    assert_eq!(outcome.stopped, Some(StopReason::Forbidden { page: 2 }));
    assert_eq!(source.pages_called(), [1, 2]);
    assert!(outcome.failed_pages.is_empty());
}

#[test]
fn transport_and_decode_errors_skip_page() {
    let source = ScriptedSource::new(vec![
        Err(TransportError::Timeout),
        Err(TransportError::Connect("refused".into())),
        Ok(PageResponse::new(200, "<html>gateway</html>")),
        ok_page(&["d"]),
    ]);
    let outcome = run(&source, 4).unwrap();

    let failed: Vec<u32> = outcome.failed_pages.iter().map(|f| f.page).collect();
    assert_eq!(failed, [1, 2, 3]);
    assert_eq!(outcome.failed_pages[0].failure, PageFailure::Timeout);
    assert!(matches!(
        outcome.failed_pages[1].failure,
        PageFailure::Connection(_)
    ));
    assert!(matches!(
        outcome.failed_pages[2].failure,
        PageFailure::MalformedJson(_)
    ));
    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.pages_ok, 1);
}

#[test]
fn unexpected_status_is_recorded_and_skipped() {
    let source = ScriptedSource::new(vec![status(500), ok_page(&["b"])]);
    let outcome = run(&source, 2).unwrap();

    assert!(matches!(
        outcome.failed_pages[0].failure,
        PageFailure::Status { status: 500, .. }
    ));
    assert_eq!(outcome.records.len(), 1);
}

#[test]
fn start_page_offsets_requests() {
    let source = ScriptedSource::new(vec![]);
    let outcome = fetch_jobs(
        &source,
        "Rust",
        5,
        2,
        &FetchPolicy::immediate(),
        &ProgressBar::hidden(),
    )
    .unwrap();
    assert_eq!(source.pages_called(), [5, 6]);
    assert_eq!(outcome.start_page, 5);
    assert_eq!(outcome.pages_requested, 2);
}

#[test]
fn zero_pages_makes_no_requests() {
    let source = ScriptedSource::new(vec![]);
    let outcome = run(&source, 0).unwrap();
    assert!(source.pages_called().is_empty());
    assert!(outcome.records.is_empty());
}

fn paced(page_delay_ms: u64, retry_delay_ms: u64) -> FetchPolicy {
    FetchPolicy {
        page_delay: Duration::from_millis(page_delay_ms),
        retry_delay: Duration::from_millis(retry_delay_ms),
    }
}

#[test]
fn page_delay_between_pages_but_not_after_last() {
    let page_delay = Duration::from_millis(60);
    let source = ScriptedSource::new(vec![ok_page(&["a"]), ok_page(&["b"]), ok_page(&["c"])]);
    let outcome = fetch_jobs(
        &source,
        "Data Analyst",
        1,
        3,
        &paced(60, 0),
        &ProgressBar::hidden(),
    )
    .unwrap();
    let returned = Instant::now();

    assert_eq!(outcome.pages_ok, 3);
    let gaps = source.gaps();
    assert_eq!(gaps.len(), 2);
    assert!(gaps.iter().all(|g| *g >= page_delay), "gaps: {gaps:?}");

    let last_call = *source.called_at.borrow().last().unwrap();
    assert!(
        returned - last_call < page_delay / 2,
        "slept after the last page: {:?}",
        returned - last_call
    );
}

#[test]
fn retry_delay_precedes_the_single_retry() {
    let retry_delay = Duration::from_millis(80);
    let source = ScriptedSource::new(vec![status(429), ok_page(&["a"]), ok_page(&["b"])]);
    let outcome = fetch_jobs(
        &source,
        "Data Analyst",
        1,
        2,
        &paced(0, 80),
        &ProgressBar::hidden(),
    )
    .unwrap();

    assert_eq!(source.pages_called(), [1, 1, 2]);
    assert_eq!(outcome.records.len(), 2);
    let gaps = source.gaps();
    assert!(gaps[0] >= retry_delay, "retry came after {:?}", gaps[0]);
    assert!(gaps[1] < retry_delay, "no retry delay expected: {:?}", gaps[1]);
}

#[test]
fn single_page_has_no_delay() {
    let source = ScriptedSource::new(vec![ok_page(&["a"])]);
    let started = Instant::now();
    fetch_jobs(
        &source,
        "Data Analyst",
        1,
        1,
        &paced(500, 500),
        &ProgressBar::hidden(),
    )
    .unwrap();
    assert!(started.elapsed() < Duration::from_millis(250));
}
