//! Repository URL normalization.

use reqwest::Url;

use crate::{FetchError, FetchResult};

const DEV_AZURE_HOST: &str = "dev.azure.com";
const VISUALSTUDIO_SUFFIX: &str = ".visualstudio.com";

/// Organization, project and repository parsed from a repository URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryLocator {
    /// Organization (account) name.
    pub organization: String,
    /// Project name.
    pub project: String,
    /// Repository name.
    pub repository: String,
}

impl RepositoryLocator {
    /// Parses a repository web or clone URL.
    ///
    /// Accepted forms:
    /// - `https://dev.azure.com/{organization}/{project}/_git/{repository}`
    /// - `https://{organization}.visualstudio.com/[DefaultCollection/]{project}/_git/{repository}`
    ///
    /// A `user@` prefix, a `.git` suffix and trailing slashes are ignored.
    /// When the project segment is omitted the project is assumed to share
    /// the repository's name.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::UnsupportedUrl`] for any other URL.
    pub fn parse(url: &str) -> FetchResult<Self> {
        let unsupported = || FetchError::UnsupportedUrl {
            url: url.to_string(),
        };

        let parsed = Url::parse(url.trim()).map_err(|_| unsupported())?;
        let host = parsed.host_str().ok_or_else(unsupported)?.to_ascii_lowercase();
        let segments: Vec<&str> = parsed
            .path_segments()
            .map(|segments| segments.filter(|s| !s.is_empty()).collect())
            .unwrap_or_default();

        let git_index = segments
            .iter()
            .position(|s| *s == "_git")
            .ok_or_else(unsupported)?;
        let repository = segments
            .get(git_index + 1)
            .map(|name| name.trim_end_matches(".git"))
            .filter(|name| !name.is_empty())
            .ok_or_else(unsupported)?;

        let (organization, before_git) = if host == DEV_AZURE_HOST {
            let (organization, rest) = segments[..git_index]
                .split_first()
                .ok_or_else(unsupported)?;
            (organization.to_string(), rest)
        } else if let Some(organization) = host.strip_suffix(VISUALSTUDIO_SUFFIX) {
            let rest = match segments[..git_index].split_first() {
                Some((first, rest)) if first.eq_ignore_ascii_case("DefaultCollection") => rest,
                _ => &segments[..git_index],
            };
            (organization.to_string(), rest)
        } else {
            return Err(unsupported());
        };

        let project = match before_git {
            [] => repository,
            [project] => *project,
            _ => return Err(unsupported()),
        };

        if organization.is_empty() {
            return Err(unsupported());
        }

        Ok(Self {
            organization,
            project: project.to_string(),
            repository: repository.to_string(),
        })
    }

    /// Returns the REST base for this repository.
    ///
    /// `collection` replaces `https://dev.azure.com/{organization}` when set.
    #[must_use]
    pub fn api_base(&self, collection: Option<&str>) -> String {
        let collection = match collection {
            Some(base) => base.trim_end_matches('/').to_string(),
            None => format!("https://{DEV_AZURE_HOST}/{}", self.organization),
        };
        format!(
            "{collection}/{}/_apis/git/repositories/{}",
            self.project, self.repository
        )
    }
}
