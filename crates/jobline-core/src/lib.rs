//! Jobline Core - Shared infrastructure for the job-posting ETL pipeline
//!
//! Logging, progress reporting, graceful shutdown, the shared HTTP client,
//! and the in-memory [`Table`] with its CSV / JSON / Parquet codecs.

pub mod codec;
pub mod http;
pub mod logging;
pub mod manifest;
pub mod progress;
pub mod shutdown;
pub mod table;

// Re-exports for convenience
pub use codec::{load_records, load_table, save_records, save_table, write_parquet, TableFormat};
pub use http::{http_client, HttpConfig, SHARED_RUNTIME};
pub use logging::{init_logging, IndicatifLogger};
pub use manifest::{hash_file, FailedPageEntry, FileDigest, RunManifest};
pub use progress::{fmt_num, fmt_pct, ProgressContext, SharedProgress};
pub use shutdown::{install_signal_handlers, is_shutdown_requested, request_shutdown};
pub use table::{cell_text, present, Row, Table};
