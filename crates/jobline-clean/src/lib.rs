//! Jobline Clean - column transforms and validation for job-posting tables
//!
//! Each transform is a pass over one or a few columns of a [`Table`]; the
//! [`pipeline`] module fixes their order for the clean and validate stages.
//!
//! [`Table`]: jobline_core::Table

pub mod location;
pub mod pipeline;
pub mod rename;
pub mod report;
pub mod salary;
pub mod seniority;
pub mod skills;
pub mod validate;

// Re-exports
pub use pipeline::{clean_table, validate_table, CleanReport, ValidationReport};
pub use seniority::{classify_title, Seniority};
pub use skills::extract_skills;
