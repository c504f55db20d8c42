//! Commit types for commit-digest.
//!
//! This crate provides [`Commit`], one commit as reported by the hosting
//! service, tagged with the repository and branch it was fetched from.

mod commit;

pub use commit::Commit;
