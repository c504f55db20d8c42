//! CLI definition.

use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use clap::Parser;

use crate::report;

/// Summarize Azure DevOps commit history into a PDF report.
#[derive(Debug, Parser)]
#[command(name = "commit-digest")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file listing the repositories (TOML or JSON)
    #[arg(short, long, env = "COMMIT_DIGEST_CONFIG")]
    pub config: PathBuf,

    /// Number of trailing days to include (0 disables the window)
    #[arg(short, long, default_value_t = 30)]
    pub days: u32,

    /// First day to include (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub start_date: Option<NaiveDate>,

    /// Last day to include (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub end_date: Option<NaiveDate>,

    /// Output PDF path
    #[arg(short, long, default_value = "commits_report.pdf")]
    pub output: PathBuf,

    /// Only include commits by this author (exact name, case-insensitive)
    #[arg(short, long)]
    pub author: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Runs the report pipeline.
    pub fn run(self) -> Result<()> {
        let args = report::ReportArgs {
            config: self.config,
            days: self.days,
            start_date: self.start_date,
            end_date: self.end_date,
            output: self.output,
            author: self.author,
        };
        let summary = report::run(&args)?;
        print!("{summary}");
        Ok(())
    }
}
