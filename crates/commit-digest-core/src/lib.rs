//! Core library for commit-digest.
//!
//! This crate holds the pure part of the pipeline: resolving the reporting
//! window, filtering commits by date and author, and grouping the survivors
//! by day, repository and branch.

mod error;
mod filter;
mod group;
mod range;

pub use error::{CoreError, CoreResult};
pub use filter::CommitFilter;
pub use group::{BranchMap, GroupedReport, RepositoryMap};
pub use range::DateRange;
