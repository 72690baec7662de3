//! Pagination loop with the per-page retry / abort / stop policy.
//!
//! | response                      | action                                       |
//! |-------------------------------|----------------------------------------------|
//! | 200 with `data` array         | keep records                                 |
//! | 200 with unparsable body      | page failed, continue                        |
//! | 429                           | sleep `retry_delay`, retry once              |
//! | 401                           | abort the run                                |
//! | 403                           | stop paging, keep what was collected         |
//! | other status / transport error| page failed, continue                        |

use std::time::{Duration, Instant};

use indicatif::ProgressBar;
use jobline_core::is_shutdown_requested;
use serde::Deserialize;
use serde_json::Value;

use crate::api::{PageResponse, PageSource, TransportError};
use crate::config::FetchPolicy;

/// Longest body excerpt kept for an unexpected status
const SNIPPET_LEN: usize = 200;

/// Errors that abort the whole run
#[derive(Debug)]
pub enum FetchError {
    /// API key or host not configured (names the missing variable)
    MissingCredentials(&'static str),
    /// HTTP 401 from the API
    Unauthorized { page: u32 },
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingCredentials(var) => {
                write!(f, "API credentials not found: {var} is not set")
            }
            Self::Unauthorized { page } => {
                write!(f, "HTTP 401 on page {page}: API key rejected")
            }
        }
    }
}

impl std::error::Error for FetchError {}

/// Why a single page produced no records
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageFailure {
    Timeout,
    Connection(String),
    Transport(String),
    MalformedJson(String),
    /// Still 429 after the retry
    RateLimited,
    Status { status: u16, snippet: String },
}

impl std::fmt::Display for PageFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Timeout => f.write_str("timeout"),
            Self::Connection(msg) => write!(f, "connection error: {msg}"),
            Self::Transport(msg) => write!(f, "request error: {msg}"),
            Self::MalformedJson(msg) => write!(f, "JSON decode error: {msg}"),
            Self::RateLimited => f.write_str("rate limited (429) after retry"),
            Self::Status { status, snippet } => write!(f, "HTTP {status}: {snippet}"),
        }
    }
}

impl From<TransportError> for PageFailure {
    fn from(e: TransportError) -> Self {
        match e {
            TransportError::Timeout => Self::Timeout,
            TransportError::Connect(msg) => Self::Connection(msg),
            TransportError::Other(msg) => Self::Transport(msg),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedPage {
    pub page: u32,
    pub failure: PageFailure,
}

/// Why pagination ended before the last requested page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// HTTP 403 on this page
    Forbidden { page: u32 },
    /// Shutdown signal seen before this page
    Shutdown { page: u32 },
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Forbidden { page } => write!(f, "HTTP 403 on page {page}"),
            Self::Shutdown { page } => write!(f, "shutdown before page {page}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub query: String,
    pub start_page: u32,
    pub pages_requested: u32,
    pub pages_ok: u32,
    pub records: Vec<Value>,
    pub failed_pages: Vec<FailedPage>,
    pub stopped: Option<StopReason>,
    pub elapsed: Duration,
}

impl FetchOutcome {
    /// Pagination ended before the last requested page (403 or shutdown).
    pub fn stopped_early(&self) -> bool {
        self.stopped.is_some()
    }
}

/// Final result of one page, after any 429 retry
#[derive(Debug)]
enum PageResult {
    Records(Vec<Value>),
    Failed(PageFailure),
    Unauthorized,
    Forbidden,
}

/// One response: final, or a 429 that may be retried
#[derive(Debug)]
enum Attempt {
    Done(PageResult),
    RateLimited,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Option<Vec<Value>>,
}

/// Extract the `data` array from a search response body.
///
/// A missing or null `data` is an empty page; a body that is not a JSON
/// object is an error.
pub fn parse_records(body: &str) -> Result<Vec<Value>, serde_json::Error> {
    let resp: SearchResponse = serde_json::from_str(body)?;
    Ok(resp.data.unwrap_or_default())
}

fn snippet(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() <= SNIPPET_LEN {
        return trimmed.to_string();
    }
    let cut: String = trimmed.chars().take(SNIPPET_LEN).collect();
    format!("{cut}...")
}

fn classify(response: Result<PageResponse, TransportError>) -> Attempt {
    let response = match response {
        Ok(r) => r,
        Err(e) => return Attempt::Done(PageResult::Failed(e.into())),
    };
    let result = match response.status {
        200 => match parse_records(&response.body) {
            Ok(records) => PageResult::Records(records),
            Err(e) => PageResult::Failed(PageFailure::MalformedJson(e.to_string())),
        },
        401 => PageResult::Unauthorized,
        403 => PageResult::Forbidden,
        429 => return Attempt::RateLimited,
        status => PageResult::Failed(PageFailure::Status {
            status,
            snippet: snippet(&response.body),
        }),
    };
    Attempt::Done(result)
}

/// One page, with the single fixed-delay retry on 429.
fn fetch_with_retry(
    source: &impl PageSource,
    query: &str,
    page: u32,
    policy: &FetchPolicy,
    pb: &ProgressBar,
) -> PageResult {
    if let Attempt::Done(result) = classify(source.fetch_page(query, page)) {
        return result;
    }
    log::warn!(
        "page {page}: rate limited (429), retrying once in {:?}",
        policy.retry_delay
    );
    pb.set_message(format!("page {page}: 429, retrying..."));
    std::thread::sleep(policy.retry_delay);
    match classify(source.fetch_page(query, page)) {
        Attempt::Done(result) => result,
        Attempt::RateLimited => PageResult::Failed(PageFailure::RateLimited),
    }
}

/// Fetch pages `start_page .. start_page + num_pages` in order.
///
/// Per-page failures are collected into [`FetchOutcome::failed_pages`]; only a
/// 401 aborts with an error.
pub fn fetch_jobs(
    source: &impl PageSource,
    query: &str,
    start_page: u32,
    num_pages: u32,
    policy: &FetchPolicy,
    pb: &ProgressBar,
) -> Result<FetchOutcome, FetchError> {
    let started = Instant::now();
    let mut outcome = FetchOutcome {
        query: query.to_string(),
        start_page,
        pages_requested: num_pages,
        pages_ok: 0,
        records: Vec::new(),
        failed_pages: Vec::new(),
        stopped: None,
        elapsed: Duration::ZERO,
    };

    let end_page = start_page.saturating_add(num_pages);
    for (i, page) in (start_page..end_page).enumerate() {
        if is_shutdown_requested() {
            log::warn!("Shutdown requested, stopping before page {page}");
            outcome.stopped = Some(StopReason::Shutdown { page });
            pb.finish_with_message(format!("stopped: shutdown before page {page}"));
            break;
        }
        if i > 0 {
            std::thread::sleep(policy.page_delay);
        }

        pb.set_message(format!("page {page}"));
        log::info!("Fetching page {page}...");

        match fetch_with_retry(source, query, page, policy, pb) {
            PageResult::Records(jobs) => {
                log::info!("  fetched {} jobs from page {page}", jobs.len());
                outcome.records.extend(jobs);
                outcome.pages_ok += 1;
            }
            PageResult::Failed(failure) => {
                log::warn!("  page {page} failed: {failure}");
                outcome.failed_pages.push(FailedPage { page, failure });
            }
            PageResult::Forbidden => {
                log::warn!(
                    "page {page}: HTTP 403, stopping pagination (keeping {} jobs)",
                    outcome.records.len()
                );
                outcome.stopped = Some(StopReason::Forbidden { page });
                pb.finish_with_message(format!("stopped: HTTP 403 on page {page}"));
                break;
            }
            PageResult::Unauthorized => {
                log::error!("page {page}: HTTP 401, aborting run");
                return Err(FetchError::Unauthorized { page });
            }
        }
        pb.inc(1);
    }

    outcome.elapsed = started.elapsed();
    Ok(outcome)
}
