//! Commit record as retrieved from the hosting service.

use chrono::{DateTime, NaiveDate, Utc};

/// Number of characters kept by [`Commit::short_id`].
pub const SHORT_ID_LEN: usize = 8;

/// A commit fetched from a remote repository.
///
/// The same upstream commit may appear several times when it is reachable
/// from more than one branch; each copy carries the branch it was listed on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    /// The commit identifier (SHA).
    pub id: String,

    /// The author display name.
    pub author: String,

    /// The author timestamp.
    pub date: DateTime<Utc>,

    /// The full commit message.
    pub message: String,

    /// The branch the commit was listed on.
    pub branch: String,

    /// The repository name, derived from its URL.
    pub repository: String,
}

impl Commit {
    /// Creates a new commit builder.
    #[must_use]
    pub fn builder(id: impl Into<String>, date: DateTime<Utc>) -> CommitBuilder {
        CommitBuilder::new(id, date)
    }

    /// Returns the short identifier (first 8 characters).
    #[must_use]
    pub fn short_id(&self) -> &str {
        match self.id.char_indices().nth(SHORT_ID_LEN) {
            Some((end, _)) => &self.id[..end],
            None => &self.id,
        }
    }

    /// Returns the message with every run of whitespace collapsed to a
    /// single space.
    #[must_use]
    pub fn one_line_message(&self) -> String {
        self.message.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Returns the calendar day of the commit (UTC).
    #[must_use]
    pub fn day(&self) -> NaiveDate {
        self.date.date_naive()
    }

    /// Returns the time of day formatted as `HH:MM:SS`.
    #[must_use]
    pub fn time(&self) -> String {
        self.date.format("%H:%M:%S").to_string()
    }
}

/// Builder for [`Commit`].
#[derive(Debug)]
pub struct CommitBuilder {
    id: String,
    date: DateTime<Utc>,
    author: String,
    message: String,
    branch: String,
    repository: String,
}

impl CommitBuilder {
    fn new(id: impl Into<String>, date: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            date,
            author: String::new(),
            message: String::new(),
            branch: String::new(),
            repository: String::new(),
        }
    }

    /// Sets the author name.
    #[must_use]
    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    /// Sets the message.
    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Sets the branch.
    #[must_use]
    pub fn branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = branch.into();
        self
    }

    /// Sets the repository name.
    #[must_use]
    pub fn repository(mut self, repository: impl Into<String>) -> Self {
        self.repository = repository.into();
        self
    }

    /// Builds the commit.
    #[must_use]
    pub fn build(self) -> Commit {
        Commit {
            id: self.id,
            author: self.author,
            date: self.date,
            message: self.message,
            branch: self.branch,
            repository: self.repository,
        }
    }
}
