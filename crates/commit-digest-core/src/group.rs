//! Hierarchical grouping: day, then repository, then branch.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use commit_digest_commit::Commit;

/// Commits of one day and repository, keyed by branch.
pub type BranchMap = BTreeMap<String, Vec<Commit>>;

/// Commits of one day, keyed by repository.
pub type RepositoryMap = BTreeMap<String, BranchMap>;

/// Commits grouped by day, repository and branch.
///
/// Iteration order: days newest first, repositories and branches
/// lexicographically ascending, commits newest first with the commit id as
/// tie-break.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupedReport {
    days: BTreeMap<NaiveDate, RepositoryMap>,
}

impl GroupedReport {
    /// Groups the given commits.
    ///
    /// A commit listed twice on the same branch is kept once.
    #[must_use]
    pub fn build(commits: impl IntoIterator<Item = Commit>) -> Self {
        let mut days: BTreeMap<NaiveDate, RepositoryMap> = BTreeMap::new();

        for commit in commits {
            days.entry(commit.day())
                .or_default()
                .entry(commit.repository.clone())
                .or_default()
                .entry(commit.branch.clone())
                .or_default()
                .push(commit);
        }

        for commits in days
            .values_mut()
            .flat_map(BTreeMap::values_mut)
            .flat_map(BTreeMap::values_mut)
        {
            commits.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.id.cmp(&b.id)));
            commits.dedup_by(|a, b| a.id == b.id);
        }

        Self { days }
    }

    /// Iterates over days, newest first.
    pub fn days(&self) -> impl Iterator<Item = (&NaiveDate, &RepositoryMap)> {
        self.days.iter().rev()
    }

    /// Returns true if the report holds no commits.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Returns the number of commit entries.
    #[must_use]
    pub fn total_commits(&self) -> usize {
        self.days
            .values()
            .flat_map(BTreeMap::values)
            .flat_map(BTreeMap::values)
            .map(Vec::len)
            .sum()
    }

    /// Returns the number of distinct repositories.
    #[must_use]
    pub fn repository_count(&self) -> usize {
        self.days
            .values()
            .flat_map(BTreeMap::keys)
            .collect::<BTreeSet<_>>()
            .len()
    }

    /// Returns the earliest day.
    #[must_use]
    pub fn first_day(&self) -> Option<NaiveDate> {
        self.days.keys().next().copied()
    }

    /// Returns the most recent day.
    #[must_use]
    pub fn last_day(&self) -> Option<NaiveDate> {
        self.days.keys().next_back().copied()
    }
}
