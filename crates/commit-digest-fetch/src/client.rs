//! Azure DevOps REST client.
//!
//! Commits are listed per branch: branches come from the configuration or
//! from `GET …/refs?filter=heads/` (paged with the `x-ms-continuationtoken`
//! header), then each branch's history is paged with `$top`/`$skip`.

use std::time::Duration;

use chrono::{DateTime, Utc};
use commit_digest_commit::Commit;
use commit_digest_config::{AuthScheme, RepositoryConfig};
use reqwest::header::{ACCEPT, HeaderMap};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::{CommitQuery, FetchError, FetchResult, RepositoryLocator};

/// REST API version sent with every request.
pub const API_VERSION: &str = "7.0";

/// Response header carrying the next page cursor.
const CONTINUATION_HEADER: &str = "x-ms-continuationtoken";

const BRANCH_REF_PREFIX: &str = "refs/heads/";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Envelope shared by the list endpoints.
#[derive(Debug, Deserialize)]
struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    value: Vec<T>,
}

/// Commit record from `GET …/commits`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GitCommitRef {
    commit_id: String,
    author: GitUserDate,
    #[serde(default)]
    comment: String,
}

/// Author or committer signature.
#[derive(Debug, Deserialize)]
struct GitUserDate {
    #[serde(default)]
    name: String,
    date: DateTime<Utc>,
}

/// Ref record from `GET …/refs`.
#[derive(Debug, Deserialize)]
struct GitRef {
    name: String,
}

impl GitCommitRef {
    fn into_commit(self, branch: &str, repository: &str) -> Commit {
        Commit::builder(self.commit_id, self.author.date)
            .author(self.author.name)
            .message(self.comment)
            .branch(branch)
            .repository(repository)
            .build()
    }
}

/// A repository that could not be fetched.
#[derive(Debug)]
pub struct RepositoryFailure {
    /// The configured URL.
    pub url: String,
    /// What went wrong.
    pub error: FetchError,
}

/// Result of fetching a batch of repositories.
#[derive(Debug, Default)]
pub struct FetchOutcome {
    /// Commits from every successful repository, in configuration order.
    pub commits: Vec<Commit>,
    /// Names of the repositories fetched successfully.
    pub fetched: Vec<String>,
    /// Repositories skipped because of an error.
    pub failures: Vec<RepositoryFailure>,
}

impl FetchOutcome {
    /// Returns true if at least one repository was attempted and none
    /// succeeded.
    #[must_use]
    pub fn all_failed(&self) -> bool {
        self.fetched.is_empty() && !self.failures.is_empty()
    }
}

/// Per-repository request context.
struct RepositoryRequest<'a> {
    name: &'a str,
    base: String,
    config: &'a RepositoryConfig,
}

/// Azure DevOps commit history client.
pub struct DevOpsClient {
    client: reqwest::Client,
    page_size: u32,
}

impl DevOpsClient {
    /// Creates a client requesting `page_size` records per page.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Client`] if the HTTP client cannot be built.
    pub fn new(page_size: u32) -> FetchResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self {
            client,
            page_size: page_size.max(1),
        })
    }

    /// Returns the page size.
    #[must_use]
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Fetches every repository in order, one at a time.
    ///
    /// A failing repository is logged and skipped; the others are still
    /// fetched.
    pub async fn fetch_all(
        &self,
        repositories: &[RepositoryConfig],
        query: &CommitQuery,
    ) -> FetchOutcome {
        let mut outcome = FetchOutcome::default();

        for repo in repositories {
            match self.fetch_repository(repo, query).await {
                Ok((name, commits)) => {
                    info!(repository = %name, commits = commits.len(), "fetched commits");
                    outcome.commits.extend(commits);
                    outcome.fetched.push(name);
                }
                Err(error) => {
                    warn!(url = %repo.url, %error, "skipping repository");
                    outcome.failures.push(RepositoryFailure {
                        url: repo.url.clone(),
                        error,
                    });
                }
            }
        }

        outcome
    }

    /// Fetches the commits of one repository across its branches.
    ///
    /// Returns the repository name together with the commits.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not supported, or any request fails,
    /// answers with a non-success status, or returns an unexpected body.
    pub async fn fetch_repository(
        &self,
        repo: &RepositoryConfig,
        query: &CommitQuery,
    ) -> FetchResult<(String, Vec<Commit>)> {
        let locator = RepositoryLocator::parse(&repo.url)?;
        let request = RepositoryRequest {
            name: &locator.repository,
            base: locator.api_base(repo.api_url.as_deref()),
            config: repo,
        };

        info!(repository = %request.name, "fetching commits");

        let branches = if repo.branches.is_empty() {
            self.list_branches(&request).await?
        } else {
            repo.branches.clone()
        };
        debug!(repository = %request.name, ?branches, "resolved branches");

        let mut commits = Vec::new();
        for branch in &branches {
            commits.extend(self.branch_commits(&request, branch, query).await?);
        }

        Ok((locator.repository.clone(), commits))
    }

    /// Lists `refs/heads/*` branch names, following continuation tokens.
    async fn list_branches(&self, request: &RepositoryRequest<'_>) -> FetchResult<Vec<String>> {
        let url = format!("{}/refs", request.base);
        let mut branches = Vec::new();
        let mut continuation: Option<String> = None;

        loop {
            let mut params = vec![
                ("filter", "heads/".to_string()),
                ("$top", self.page_size.to_string()),
                ("api-version", API_VERSION.to_string()),
            ];
            if let Some(token) = &continuation {
                params.push(("continuationToken", token.clone()));
            }

            let (page, headers): (ListResponse<GitRef>, _) =
                self.get_json(request, &url, &params).await?;

            branches.extend(page.value.into_iter().filter_map(|r| {
                r.name
                    .strip_prefix(BRANCH_REF_PREFIX)
                    .map(str::to_string)
            }));

            let next = headers
                .get(CONTINUATION_HEADER)
                .and_then(|v| v.to_str().ok())
                .filter(|v| !v.is_empty())
                .map(str::to_string);

            match next {
                Some(token) if continuation.as_ref() != Some(&token) => {
                    continuation = Some(token);
                }
                _ => break,
            }
        }

        Ok(branches)
    }

    /// Pages through the history of one branch.
    async fn branch_commits(
        &self,
        request: &RepositoryRequest<'_>,
        branch: &str,
        query: &CommitQuery,
    ) -> FetchResult<Vec<Commit>> {
        let url = format!("{}/commits", request.base);
        let page_size = self.page_size as usize;
        let mut commits = Vec::new();
        let mut skip = 0usize;

        loop {
            let mut params = vec![
                ("searchCriteria.itemVersion.version", branch.to_string()),
                ("searchCriteria.itemVersion.versionType", "branch".to_string()),
                ("searchCriteria.$top", self.page_size.to_string()),
                ("searchCriteria.$skip", skip.to_string()),
                ("api-version", API_VERSION.to_string()),
            ];
            params.extend(query.search_criteria());

            let (page, _): (ListResponse<GitCommitRef>, _) =
                self.get_json(request, &url, &params).await?;

            let count = page.value.len();
            debug!(repository = %request.name, %branch, skip, count, "fetched page");

            commits.extend(
                page.value
                    .into_iter()
                    .map(|raw| raw.into_commit(branch, request.name)),
            );

            if count < page_size {
                break;
            }
            skip += count;
        }

        Ok(commits)
    }

    /// Issues an authenticated GET and decodes the JSON body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        request: &RepositoryRequest<'_>,
        url: &str,
        params: &[(&str, String)],
    ) -> FetchResult<(T, HeaderMap)> {
        let builder = self
            .client
            .get(url)
            .query(params)
            .header(ACCEPT, "application/json");
        let builder = match request.config.auth {
            AuthScheme::Bearer => builder.bearer_auth(&request.config.token),
            AuthScheme::Basic => builder.basic_auth("", Some(&request.config.token)),
        };

        let response = builder
            .send()
            .await
            .map_err(|source| FetchError::Request {
                repository: request.name.to_string(),
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                repository: request.name.to_string(),
                url: url.to_string(),
                status,
            });
        }

        let headers = response.headers().clone();
        let body = response
            .text()
            .await
            .map_err(|source| FetchError::Request {
                repository: request.name.to_string(),
                url: url.to_string(),
                source,
            })?;

        let value = serde_json::from_str(&body).map_err(|source| FetchError::Decode {
            repository: request.name.to_string(),
            url: url.to_string(),
            source,
        })?;

        Ok((value, headers))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockResponse, MockServer, commit_json, list_body, refs_body};
    use chrono::TimeZone;

    fn repo_for(server: &MockServer, name: &str) -> RepositoryConfig {
        let mut repo =
            RepositoryConfig::new(format!("https://dev.azure.com/contoso/web/_git/{name}"), "pat");
        repo.api_url = Some(server.url());
        repo
    }

    #[test]
    fn test_decode_commit_list() {
        let body = r#"{
            "count": 1,
            "value": [{
                "commitId": "0123456789abcdef0123456789abcdef01234567",
                "author": {"name": "Jane Doe", "email": "jane@example.com", "date": "2025-01-01T10:30:00Z"},
                "committer": {"name": "Jane Doe", "email": "jane@example.com", "date": "2025-01-01T10:31:00Z"},
                "comment": "Fix login redirect",
                "url": "https://dev.azure.com/..."
            }]
        }"#;

        let page: ListResponse<GitCommitRef> = serde_json::from_str(body).unwrap();
        let commit = page
            .value
            .into_iter()
            .next()
            .unwrap()
            .into_commit("main", "frontend");

        assert_eq!(commit.id, "0123456789abcdef0123456789abcdef01234567");
        assert_eq!(commit.author, "Jane Doe");
        assert_eq!(
            commit.date,
            Utc.with_ymd_and_hms(2025, 1, 1, 10, 30, 0).unwrap()
        );
        assert_eq!(commit.message, "Fix login redirect");
        assert_eq!(commit.branch, "main");
        assert_eq!(commit.repository, "frontend");
    }

    #[test]
    fn test_decode_commit_with_offset_date() {
        let body = r#"{"value": [{
            "commitId": "abc",
            "author": {"name": "A", "email": "a@x", "date": "2025-01-01T10:30:00+02:00"}
        }]}"#;
        let page: ListResponse<GitCommitRef> = serde_json::from_str(body).unwrap();
        assert_eq!(
            page.value[0].author.date,
            Utc.with_ymd_and_hms(2025, 1, 1, 8, 30, 0).unwrap()
        );
        assert!(page.value[0].comment.is_empty());
    }

    #[test]
    fn test_decode_empty_list() {
        let page: ListResponse<GitRef> = serde_json::from_str(r#"{"count": 0}"#).unwrap();
        assert!(page.value.is_empty());
    }

    #[test]
    fn test_all_failed() {
        let mut outcome = FetchOutcome::default();
        assert!(!outcome.all_failed());

        outcome.failures.push(RepositoryFailure {
            url: "https://github.com/x/y".to_string(),
            error: FetchError::UnsupportedUrl {
                url: "https://github.com/x/y".to_string(),
            },
        });
        assert!(outcome.all_failed());

        outcome.fetched.push("frontend".to_string());
        assert!(!outcome.all_failed());
    }

    #[test]
    fn test_page_size_is_at_least_one() {
        let client = DevOpsClient::new(0).unwrap();
        assert_eq!(client.page_size(), 1);
    }

    #[tokio::test]
    async fn test_fetch_repository_lists_branches_and_tags_commits() {
        let server = MockServer::start(|req| {
            if req.path.ends_with("/refs") {
                return MockResponse::json(refs_body(&["main", "dev"]));
            }
            match req.param("searchCriteria.itemVersion.version") {
                Some("main") => MockResponse::json(list_body(vec![
                    commit_json("m2", "Jane Doe", "2025-01-01T12:00:00Z", "second"),
                    commit_json("m1", "Jane Doe", "2025-01-01T09:00:00Z", "first"),
                ])),
                Some("dev") => MockResponse::json(list_body(vec![commit_json(
                    "d1",
                    "John Smith",
                    "2025-01-01T10:00:00Z",
                    "wip",
                )])),
                _ => MockResponse::status(404),
            }
        })
        .unwrap();

        let client = DevOpsClient::new(100).unwrap();
        let (name, commits) = client
            .fetch_repository(&repo_for(&server, "frontend"), &CommitQuery::default())
            .await
            .unwrap();

        assert_eq!(name, "frontend");
        let summary: Vec<_> = commits
            .iter()
            .map(|c| (c.id.as_str(), c.branch.as_str(), c.repository.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("m2", "main", "frontend"),
                ("m1", "main", "frontend"),
                ("d1", "dev", "frontend"),
            ]
        );

        let requests = server.requests();
        assert_eq!(requests[0].path, "/web/_apis/git/repositories/frontend/refs");
        assert_eq!(requests[0].param("filter"), Some("heads/"));
        assert!(requests.iter().all(|r| r.param("api-version") == Some(API_VERSION)));
    }

    #[tokio::test]
    async fn test_bearer_and_basic_auth() {
        let server = MockServer::start(|req| {
            if req.path.ends_with("/refs") {
                MockResponse::json(refs_body(&[]))
            } else {
                MockResponse::json(list_body(vec![]))
            }
        })
        .unwrap();
        let client = DevOpsClient::new(100).unwrap();

        let bearer = repo_for(&server, "a");
        client
            .fetch_repository(&bearer, &CommitQuery::default())
            .await
            .unwrap();

        let mut basic = repo_for(&server, "b");
        basic.auth = AuthScheme::Basic;
        client
            .fetch_repository(&basic, &CommitQuery::default())
            .await
            .unwrap();

        let requests = server.requests();
        assert_eq!(requests[0].header("authorization"), Some("Bearer pat"));
        // base64(":pat")
        assert_eq!(requests[1].header("authorization"), Some("Basic OnBhdA=="));
    }

    #[tokio::test]
    async fn test_commit_paging_follows_skip() {
        let server = MockServer::start(|req| {
            let skip: usize = req
                .param("searchCriteria.$skip")
                .and_then(|s| s.parse().ok())
                .unwrap_or(0);
            let page: Vec<_> = (skip..5)
                .take(2)
                .map(|i| commit_json(&format!("c{i}"), "Jane Doe", "2025-01-01T00:00:00Z", "m"))
                .collect();
            MockResponse::json(list_body(page))
        })
        .unwrap();

        let mut repo = repo_for(&server, "frontend");
        repo.branches = vec!["main".to_string()];

        let client = DevOpsClient::new(2).unwrap();
        let (_, commits) = client
            .fetch_repository(&repo, &CommitQuery::default())
            .await
            .unwrap();

        let ids: Vec<_> = commits.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["c0", "c1", "c2", "c3", "c4"]);

        let skips: Vec<_> = server
            .requests()
            .iter()
            .map(|r| r.param("searchCriteria.$skip").unwrap_or("").to_string())
            .collect();
        assert_eq!(skips, vec!["0", "2", "4"]);
    }

    #[tokio::test]
    async fn test_branch_listing_follows_continuation_token() {
        let server = MockServer::start(|req| {
            if req.path.ends_with("/refs") {
                return match req.param("continuationToken") {
                    None => MockResponse::json(refs_body(&["main"]))
                        .with_header(CONTINUATION_HEADER, "next-page"),
                    Some("next-page") => MockResponse::json(refs_body(&["release/1.0"])),
                    Some(_) => MockResponse::status(400),
                };
            }
            MockResponse::json(list_body(vec![]))
        })
        .unwrap();

        let client = DevOpsClient::new(100).unwrap();
        client
            .fetch_repository(&repo_for(&server, "frontend"), &CommitQuery::default())
            .await
            .unwrap();

        let branches: Vec<_> = server
            .requests()
            .iter()
            .filter_map(|r| {
                r.param("searchCriteria.itemVersion.version")
                    .map(str::to_string)
            })
            .collect();
        assert_eq!(branches, vec!["main", "release/1.0"]);
    }

    #[tokio::test]
    async fn test_search_criteria_are_forwarded() {
        let server = MockServer::start(|_| MockResponse::json(list_body(vec![]))).unwrap();
        let mut repo = repo_for(&server, "frontend");
        repo.branches = vec!["main".to_string()];

        let query = CommitQuery {
            author: Some("Jane Doe".to_string()),
            from: Some(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()),
            to: Some(Utc.with_ymd_and_hms(2025, 1, 2, 0, 0, 0).unwrap()),
        };
        DevOpsClient::new(100)
            .unwrap()
            .fetch_repository(&repo, &query)
            .await
            .unwrap();

        let request = &server.requests()[0];
        assert_eq!(request.param("searchCriteria.author"), Some("Jane Doe"));
        assert_eq!(
            request.param("searchCriteria.fromDate"),
            Some("2025-01-01T00:00:00Z")
        );
        assert_eq!(
            request.param("searchCriteria.toDate"),
            Some("2025-01-02T00:00:00Z")
        );
        assert_eq!(
            request.param("searchCriteria.itemVersion.versionType"),
            Some("branch")
        );
    }

    #[tokio::test]
    async fn test_non_success_status_is_an_error() {
        let server = MockServer::start(|_| MockResponse::status(401)).unwrap();
        let result = DevOpsClient::new(100)
            .unwrap()
            .fetch_repository(&repo_for(&server, "frontend"), &CommitQuery::default())
            .await;

        match result {
            Err(FetchError::Status {
                repository, status, ..
            }) => {
                assert_eq!(repository, "frontend");
                assert_eq!(status, reqwest::StatusCode::UNAUTHORIZED);
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_host_is_a_request_error() {
        let mut repo =
            RepositoryConfig::new("https://dev.azure.com/contoso/web/_git/frontend", "pat");
        repo.api_url = Some("http://127.0.0.1:1".to_string());

        let result = DevOpsClient::new(100)
            .unwrap()
            .fetch_repository(&repo, &CommitQuery::default())
            .await;

        match result {
            Err(FetchError::Request { repository, .. }) => assert_eq!(repository, "frontend"),
            other => panic!("expected request error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_an_error() {
        let server = MockServer::start(|_| MockResponse::json("<html>sign in</html>")).unwrap();
        let result = DevOpsClient::new(100)
            .unwrap()
            .fetch_repository(&repo_for(&server, "frontend"), &CommitQuery::default())
            .await;

        assert!(matches!(result, Err(FetchError::Decode { .. })));
    }

    #[tokio::test]
    async fn test_fetch_all_skips_failing_repository() {
        let server = MockServer::start(|req| {
            if req.path.contains("/repositories/broken/") {
                return MockResponse::status(500);
            }
            if req.path.ends_with("/refs") {
                return MockResponse::json(refs_body(&["main"]));
            }
            MockResponse::json(list_body(vec![commit_json(
                "abc",
                "Jane Doe",
                "2025-01-01T00:00:00Z",
                "ok",
            )]))
        })
        .unwrap();

        let repos = vec![
            repo_for(&server, "broken"),
            RepositoryConfig::new("https://github.com/contoso/web", "pat"),
            repo_for(&server, "frontend"),
        ];

        let outcome = DevOpsClient::new(100)
            .unwrap()
            .fetch_all(&repos, &CommitQuery::default())
            .await;

        assert_eq!(outcome.fetched, vec!["frontend"]);
        assert_eq!(outcome.commits.len(), 1);
        assert_eq!(outcome.failures.len(), 2);
        assert!(matches!(
            outcome.failures[1].error,
            FetchError::UnsupportedUrl { .. }
        ));
        assert!(!outcome.all_failed());
    }
}
