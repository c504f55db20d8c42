//! The report pipeline: load, fetch, filter, group, render.

use std::fmt;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::{NaiveDate, Utc};
use tracing::{info, warn};

use commit_digest_config::load_config;
use commit_digest_core::{CommitFilter, DateRange, GroupedReport};
use commit_digest_fetch::{CommitQuery, DevOpsClient};
use commit_digest_render::{Layout, ReportMeta, write_pdf};

/// Inputs of one report run.
#[derive(Debug, Clone)]
pub struct ReportArgs {
    pub config: PathBuf,
    pub days: u32,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub output: PathBuf,
    pub author: Option<String>,
}

/// What a run produced, printed on stdout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub output: PathBuf,
    pub commits: usize,
    pub fetched: usize,
    pub failed: usize,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Report written to {}", self.output.display())?;
        writeln!(f, "Commits: {}", self.commits)?;
        writeln!(
            f,
            "Repositories: {} fetched, {} failed",
            self.fetched, self.failed
        )
    }
}

/// Runs the whole pipeline and writes the PDF.
pub fn run(args: &ReportArgs) -> Result<Summary> {
    let config = load_config(&args.config)
        .with_context(|| format!("failed to load config from {}", args.config.display()))?;

    let now = Utc::now();
    let range = DateRange::resolve(args.days, args.start_date, args.end_date, now)
        .context("invalid date range")?;
    let filter = CommitFilter::new(range, args.author.as_deref());
    let query = CommitQuery {
        author: filter.author().map(str::to_string),
        from: range.start,
        to: range.end,
    };

    let client = DevOpsClient::new(config.page_size).context("failed to create HTTP client")?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to create async runtime")?;
    let outcome = runtime.block_on(client.fetch_all(&config.repositories, &query));

    if outcome.all_failed() {
        bail!(
            "all {} repositories failed to fetch; no report written",
            outcome.failures.len()
        );
    }

    let commits = filter.apply(outcome.commits);
    let report = GroupedReport::build(commits);
    if report.is_empty() {
        warn!("no commits matched; writing an empty report");
    }

    let mut meta = ReportMeta::new(now);
    meta.author = author_label(args.author.as_deref());
    meta.skipped = outcome.failures.iter().map(|f| f.url.clone()).collect();

    let layout = Layout::build(&report, &meta);
    write_pdf(&layout, &args.output)?;

    info!(
        output = %args.output.display(),
        commits = report.total_commits(),
        "report complete"
    );

    Ok(Summary {
        output: args.output.clone(),
        commits: report.total_commits(),
        fetched: outcome.fetched.len(),
        failed: outcome.failures.len(),
    })
}

/// The author as shown in the report, or `None` when the filter is off.
fn author_label(author: Option<&str>) -> Option<String> {
    author
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(str::to_string)
}
