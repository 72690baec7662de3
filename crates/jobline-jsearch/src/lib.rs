//! Jobline JSearch - paginated job search fetcher
//!
//! Pages through the JSearch API (RapidAPI), applying the retry / abort /
//! stop policy per page, and profiles the raw records it collected.

pub mod api;
pub mod config;
pub mod explore;
pub mod runner;
pub mod stats;

// Re-exports
pub use api::{JSearchClient, PageResponse, PageSource, TransportError};
pub use config::{Credentials, FetchPolicy};
pub use explore::{ExploreReport, FieldProfile};
pub use runner::{fetch_jobs, FailedPage, FetchError, FetchOutcome, PageFailure, StopReason};
pub use stats::FetchSummary;
