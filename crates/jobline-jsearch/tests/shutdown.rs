//! Shutdown flag handling. Own test binary: the flag is process-global.

use indicatif::ProgressBar;
use jobline_jsearch::{fetch_jobs, FetchPolicy, PageResponse, PageSource, StopReason, TransportError};

struct CountingSource(std::cell::Cell<u32>);

impl PageSource for CountingSource {
    fn fetch_page(&self, _query: &str, _page: u32) -> Result<PageResponse, TransportError> {
        self.0.set(self.0.get() + 1);
        Ok(PageResponse::new(200, r#"{"data":[{"job_id":"x"}]}"#))
    }
}

#[test]
fn shutdown_stops_before_next_page() {
    jobline_core::request_shutdown();
    let source = CountingSource(std::cell::Cell::new(0));
    let outcome = fetch_jobs(
        &source,
        "Data Analyst",
        1,
        3,
        &FetchPolicy::immediate(),
        &ProgressBar::hidden(),
    )
    .unwrap();

    assert_eq!(source.0.get(), 0);
    assert_eq!(outcome.stopped, Some(StopReason::Shutdown { page: 1 }));
    assert!(outcome.records.is_empty());
}
