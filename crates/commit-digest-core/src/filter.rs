//! Client-side commit filtering.

use commit_digest_commit::Commit;
use tracing::debug;

use crate::DateRange;

/// Date-range and author predicate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitFilter {
    range: DateRange,
    author: Option<String>,
}

impl CommitFilter {
    /// Creates a filter. A blank author disables author filtering.
    #[must_use]
    pub fn new(range: DateRange, author: Option<&str>) -> Self {
        let author = author
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(str::to_lowercase);
        Self { range, author }
    }

    /// Returns the date range.
    #[must_use]
    pub fn range(&self) -> &DateRange {
        &self.range
    }

    /// Returns the normalized (lowercase) author filter.
    #[must_use]
    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }

    /// Returns true if the commit is inside the range and, when an author
    /// filter is set, authored by that name (case-insensitive exact match).
    #[must_use]
    pub fn matches(&self, commit: &Commit) -> bool {
        self.range.contains(commit.date)
            && self
                .author
                .as_deref()
                .is_none_or(|author| commit.author.trim().to_lowercase() == author)
    }

    /// Keeps the matching commits, preserving order.
    pub fn apply(&self, commits: impl IntoIterator<Item = Commit>) -> Vec<Commit> {
        let mut total = 0usize;
        let kept: Vec<Commit> = commits
            .into_iter()
            .inspect(|_| total += 1)
            .filter(|c| self.matches(c))
            .collect();
        debug!(total, kept = kept.len(), "filtered commits");
        kept
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, NaiveDate, TimeZone, Utc};

    fn make(id: &str, author: &str, date: DateTime<Utc>) -> Commit {
        Commit::builder(id, date)
            .author(author)
            .branch("main")
            .repository("frontend")
            .build()
    }

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, d, 12, 0, 0).unwrap()
    }

    fn sample() -> Vec<Commit> {
        vec![
            make("a", "Jane Doe", day(1)),
            make("b", "John Smith", day(2)),
            make("c", "jane doe", day(3)),
            make("d", "Jane Doe", day(10)),
        ]
    }

    #[test]
    fn test_no_filter_keeps_everything() {
        let kept = CommitFilter::default().apply(sample());
        assert_eq!(kept.len(), 4);
    }

    #[test]
    fn test_author_filter_case_insensitive_exact() {
        let filter = CommitFilter::new(DateRange::unbounded(), Some("Jane Doe"));
        let ids: Vec<_> = filter.apply(sample()).into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["a", "c", "d"]);
    }

    #[test]
    fn test_author_filter_is_not_substring() {
        let filter = CommitFilter::new(DateRange::unbounded(), Some("Jane"));
        assert!(filter.apply(sample()).is_empty());
    }

    #[test]
    fn test_blank_author_disables_filter() {
        let filter = CommitFilter::new(DateRange::unbounded(), Some("   "));
        assert!(filter.author().is_none());
        assert_eq!(filter.apply(sample()).len(), 4);
    }

    #[test]
    fn test_date_filter() {
        let range = DateRange::resolve(
            0,
            NaiveDate::from_ymd_opt(2025, 1, 2),
            NaiveDate::from_ymd_opt(2025, 1, 3),
            Utc::now(),
        )
        .unwrap();
        let filter = CommitFilter::new(range, None);
        let ids: Vec<_> = filter.apply(sample()).into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["b", "c"]);
    }

    #[test]
    fn test_combined_filters() {
        let range = DateRange::resolve(0, NaiveDate::from_ymd_opt(2025, 1, 2), None, Utc::now())
            .unwrap();
        let filter = CommitFilter::new(range, Some("JANE DOE"));
        let ids: Vec<_> = filter.apply(sample()).into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["c", "d"]);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let filter = CommitFilter::new(DateRange::unbounded(), Some("jane doe"));
        let once = filter.apply(sample());
        let twice = filter.apply(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_empty_input() {
        let filter = CommitFilter::new(DateRange::unbounded(), Some("Jane Doe"));
        assert!(filter.apply(Vec::new()).is_empty());
    }
}
