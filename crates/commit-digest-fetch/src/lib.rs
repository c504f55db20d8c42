//! Azure DevOps commit history client for commit-digest.
//!
//! This crate handles:
//! - Normalizing the `dev.azure.com` and `*.visualstudio.com` URL styles
//! - Listing branches and paging through their commit history
//! - Tolerating per-repository failures across a batch of repositories

mod client;
mod error;
mod locator;
mod query;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use client::{DevOpsClient, FetchOutcome, RepositoryFailure};
pub use error::{FetchError, FetchResult};
pub use locator::RepositoryLocator;
pub use query::CommitQuery;
