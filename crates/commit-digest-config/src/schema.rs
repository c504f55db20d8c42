//! Configuration schema.

use std::fmt;

use serde::Deserialize;

use crate::{ConfigError, ConfigResult};

/// Default number of records requested per page.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Largest page size accepted.
pub const MAX_PAGE_SIZE: u32 = 1000;

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Number of records requested per page.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Repositories to report on, in the order they are fetched.
    #[serde(default)]
    pub repositories: Vec<RepositoryConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            repositories: Vec::new(),
        }
    }
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl Config {
    /// Checks the values serde cannot check on its own.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if no repository is configured, an
    /// entry has a blank `url` or `token`, or `page_size` is out of range.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.repositories.is_empty() {
            return Err(ConfigError::Invalid(
                "no repositories configured".to_string(),
            ));
        }

        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(ConfigError::Invalid(format!(
                "page_size must be between 1 and {MAX_PAGE_SIZE}, got {}",
                self.page_size
            )));
        }

        for (index, repo) in self.repositories.iter().enumerate() {
            if repo.url.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "repository #{} has an empty url",
                    index + 1
                )));
            }
            if repo.token.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "repository {} has an empty token",
                    repo.url
                )));
            }
        }

        Ok(())
    }
}

/// How the access token is presented to the service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthScheme {
    /// `Authorization: Bearer <token>`.
    #[default]
    Bearer,
    /// HTTP Basic with an empty user name and the token as password.
    Basic,
}

/// One repository entry.
#[derive(Clone, Deserialize)]
pub struct RepositoryConfig {
    /// Repository web or clone URL.
    pub url: String,

    /// Access token.
    pub token: String,

    /// Token presentation.
    #[serde(default)]
    pub auth: AuthScheme,

    /// Branches to fetch. Empty means every branch.
    #[serde(default)]
    pub branches: Vec<String>,

    /// Collection base URL replacing `https://dev.azure.com/{organization}`.
    #[serde(default)]
    pub api_url: Option<String>,
}

impl RepositoryConfig {
    /// Creates an entry with bearer auth and no branch restriction.
    #[must_use]
    pub fn new(url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            token: token.into(),
            auth: AuthScheme::default(),
            branches: Vec::new(),
            api_url: None,
        }
    }
}

// The token never reaches log output.
impl fmt::Debug for RepositoryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RepositoryConfig")
            .field("url", &self.url)
            .field("token", &"<redacted>")
            .field("auth", &self.auth)
            .field("branches", &self.branches)
            .field("api_url", &self.api_url)
            .finish()
    }
}
