//! Server-side search constraints.

use chrono::{DateTime, SecondsFormat, Utc};

/// Optional constraints forwarded to the commit-listing endpoint.
///
/// The service applies them loosely (author is a substring match); callers
/// still filter the results client-side.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitQuery {
    /// Author name.
    pub author: Option<String>,
    /// Earliest commit date.
    pub from: Option<DateTime<Utc>>,
    /// Latest commit date.
    pub to: Option<DateTime<Utc>>,
}

impl CommitQuery {
    /// Returns the `searchCriteria.*` query parameters for these constraints.
    #[must_use]
    pub fn search_criteria(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();

        if let Some(author) = &self.author {
            params.push(("searchCriteria.author", author.clone()));
        }
        if let Some(from) = self.from {
            params.push(("searchCriteria.fromDate", format_date(from)));
        }
        if let Some(to) = self.to {
            params.push(("searchCriteria.toDate", format_date(to)));
        }

        params
    }
}

fn format_date(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_empty_query_has_no_criteria() {
        assert!(CommitQuery::default().search_criteria().is_empty());
    }

    #[test]
    fn test_full_query() {
        let query = CommitQuery {
            author: Some("Jane Doe".to_string()),
            from: Some(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()),
            to: Some(Utc.with_ymd_and_hms(2025, 1, 31, 23, 59, 59).unwrap()),
        };

        assert_eq!(
            query.search_criteria(),
            vec![
                ("searchCriteria.author", "Jane Doe".to_string()),
                ("searchCriteria.fromDate", "2025-01-01T00:00:00Z".to_string()),
                ("searchCriteria.toDate", "2025-01-31T23:59:59Z".to_string()),
            ]
        );
    }
}
