//! Page layout of the report.
//!
//! Coordinates are millimetres from the bottom-left corner of an A4 page,
//! `y` being the text baseline.

use chrono::{DateTime, Utc};
use commit_digest_commit::Commit;
use commit_digest_core::GroupedReport;

use crate::metrics::{char_width_mm, text_width_mm};

/// A4 width.
pub const PAGE_WIDTH_MM: f32 = 210.0;
/// A4 height.
pub const PAGE_HEIGHT_MM: f32 = 297.0;

const MARGIN_MM: f32 = 20.0;
const FOOTER_Y_MM: f32 = 10.0;

/// Characters of the commit message kept on a commit line.
pub const MESSAGE_WIDTH: usize = 100;
/// Characters of the author name kept on a commit line.
pub const AUTHOR_WIDTH: usize = 24;

/// Marks text cut to fit.
const ELLIPSIS: &str = "...";

/// Document title.
pub const TITLE: &str = "Commit History Report";

/// Text style of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Title,
    Subtitle,
    Summary,
    Notice,
    Day,
    Repository,
    Branch,
    Commit,
    Footer,
}

impl Style {
    /// Font size in points.
    #[must_use]
    pub fn font_size(self) -> f32 {
        match self {
            Self::Title => 20.0,
            Self::Day => 14.0,
            Self::Repository => 12.0,
            Self::Branch => 11.0,
            Self::Summary | Self::Notice => 10.0,
            Self::Subtitle => 9.0,
            Self::Footer => 8.0,
            Self::Commit => 7.0,
        }
    }

    /// Vertical space consumed by a line, including the gap above it.
    #[must_use]
    pub const fn advance(self) -> f32 {
        match self {
            Self::Title | Self::Day => 12.0,
            Self::Repository => 9.0,
            Self::Notice => 8.0,
            Self::Branch => 7.0,
            Self::Subtitle | Self::Summary => 6.0,
            Self::Commit => 5.0,
            Self::Footer => 0.0,
        }
    }

    /// Left indentation relative to the margin.
    #[must_use]
    pub fn indent(self) -> f32 {
        match self {
            Self::Repository => 4.0,
            Self::Branch => 8.0,
            Self::Commit => 12.0,
            _ => 0.0,
        }
    }

    /// Whether the line is set in bold.
    #[must_use]
    pub fn is_bold(self) -> bool {
        matches!(
            self,
            Self::Title | Self::Summary | Self::Day | Self::Repository
        )
    }

    /// Fill colour as RGB components in `0.0..=1.0`.
    #[must_use]
    pub fn rgb(self) -> (f32, f32, f32) {
        match self {
            Self::Day => (0.10, 0.30, 0.80),
            Self::Subtitle | Self::Branch | Self::Footer => (0.40, 0.40, 0.40),
            _ => (0.0, 0.0, 0.0),
        }
    }

    fn is_heading(self) -> bool {
        matches!(self, Self::Day | Self::Repository | Self::Branch)
    }
}

/// A positioned line of text.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub text: String,
    pub style: Style,
    pub x: f32,
    pub y: f32,
}

/// One page of lines, top to bottom.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub lines: Vec<Line>,
}

/// Context printed in the report header.
#[derive(Debug, Clone)]
pub struct ReportMeta {
    /// When the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Active author filter, if any.
    pub author: Option<String>,
    /// Repositories that could not be fetched.
    pub skipped: Vec<String>,
}

impl ReportMeta {
    /// Creates metadata with no filter and no skipped repositories.
    #[must_use]
    pub fn new(generated_at: DateTime<Utc>) -> Self {
        Self {
            generated_at,
            author: None,
            skipped: Vec::new(),
        }
    }
}

/// The report laid out on pages.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub title: String,
    pub pages: Vec<Page>,
}

impl Layout {
    /// Lays out the report.
    ///
    /// A heading is moved to the next page unless it fits together with the
    /// headings nested right below it and one commit line.
    #[must_use]
    pub fn build(report: &GroupedReport, meta: &ReportMeta) -> Self {
        let mut composer = Composer::new();

        composer.push(Style::Title, TITLE);
        composer.push(
            Style::Subtitle,
            format!(
                "Generated on {}",
                meta.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
            ),
        );
        for line in summary_lines(report, meta) {
            composer.push(Style::Summary, line);
        }

        if report.is_empty() {
            composer.push(Style::Notice, "No commits found for the selected range.");
        }

        let day_block = Style::Day.advance() + Style::Repository.advance() + BRANCH_BLOCK;
        let repository_block = Style::Repository.advance() + BRANCH_BLOCK;

        for (day, repositories) in report.days() {
            composer.keep_together(day_block);
            composer.push(Style::Day, day.format("%Y-%m-%d (%A)").to_string());

            for (repository, branches) in repositories {
                composer.keep_together(repository_block);
                composer.push(Style::Repository, format!("Repository: {repository}"));

                for (branch, commits) in branches {
                    composer.keep_together(BRANCH_BLOCK);
                    composer.push(
                        Style::Branch,
                        format!("Branch: {branch} ({})", plural(commits.len(), "commit")),
                    );

                    for commit in commits {
                        composer.keep_together(Style::Commit.advance());
                        composer.push(Style::Commit, commit_line(commit));
                    }
                }
            }
        }

        let mut pages = composer.finish();
        let total = pages.len();
        for (index, page) in pages.iter_mut().enumerate() {
            page.lines.push(Line {
                text: format!("Page {} of {total}", index + 1),
                style: Style::Footer,
                x: MARGIN_MM,
                y: FOOTER_Y_MM,
            });
        }

        Self {
            title: TITLE.to_string(),
            pages,
        }
    }

    /// Iterates over the text of every line, page by page.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.pages
            .iter()
            .flat_map(|page| page.lines.iter())
            .map(|line| line.text.as_str())
    }
}

/// A branch heading plus one commit line.
const BRANCH_BLOCK: f32 = Style::Branch.advance() + Style::Commit.advance();

/// Horizontal room for a line of `style` between its indent and the right
/// margin.
fn available_width(style: Style) -> f32 {
    PAGE_WIDTH_MM - 2.0 * MARGIN_MM - style.indent()
}

/// Formats one commit line: short id, time, author and message.
///
/// The message keeps at most [`MESSAGE_WIDTH`] characters and is cut further
/// when the line would run into the right margin.
fn commit_line(commit: &Commit) -> String {
    let prefix = format!(
        "{}  {}  {}  ",
        commit.short_id(),
        commit.time(),
        truncate(commit.author.trim(), AUTHOR_WIDTH)
    );
    let room = available_width(Style::Commit) - text_width_mm(&prefix, Style::Commit.font_size());
    let message = fit_width(&commit.one_line_message(), room, Style::Commit.font_size());
    format!("{prefix}{message}")
}

/// Truncates to [`MESSAGE_WIDTH`] characters, then to `max_mm` of rendered
/// width.
fn fit_width(text: &str, max_mm: f32, font_size: f32) -> String {
    let truncated = truncate(text, MESSAGE_WIDTH);
    if text_width_mm(&truncated, font_size) <= max_mm {
        return truncated;
    }

    let budget = max_mm - text_width_mm(ELLIPSIS, font_size);
    let mut used = 0.0;
    let mut end = 0;
    for (index, c) in text.char_indices() {
        used += char_width_mm(c, font_size);
        if used > budget {
            break;
        }
        end = index + c.len_utf8();
    }
    format!("{}{ELLIPSIS}", text[..end].trim_end())
}

fn summary_lines(report: &GroupedReport, meta: &ReportMeta) -> Vec<String> {
    let range = match (report.first_day(), report.last_day()) {
        (Some(first), Some(last)) => format!("{first} to {last}"),
        _ => "No commits".to_string(),
    };

    let mut lines = vec![
        format!("Total commits: {}", report.total_commits()),
        format!("Date range: {range}"),
        format!("Repositories: {}", report.repository_count()),
    ];
    if let Some(author) = &meta.author {
        lines.push(format!("Author: {author}"));
    }
    if !meta.skipped.is_empty() {
        lines.push(format!("Skipped repositories: {}", meta.skipped.join(", ")));
    }
    lines
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

/// Keeps at most `max` characters, marking the cut with "...".
fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((end, _)) => format!("{}{ELLIPSIS}", &text[..end]),
        None => text.to_string(),
    }
}

/// Places lines top to bottom, starting new pages as needed.
struct Composer {
    pages: Vec<Page>,
    current: Page,
    cursor: f32,
}

impl Composer {
    fn new() -> Self {
        Self {
            pages: Vec::new(),
            current: Page::default(),
            cursor: PAGE_HEIGHT_MM - MARGIN_MM,
        }
    }

    /// Starts a new page unless `height` still fits on the current one.
    fn keep_together(&mut self, height: f32) {
        if self.cursor - height < MARGIN_MM && !self.current.lines.is_empty() {
            self.new_page();
        }
    }

    fn push(&mut self, style: Style, text: impl Into<String>) {
        self.keep_together(style.advance());
        self.cursor -= style.advance();
        self.current.lines.push(Line {
            text: text.into(),
            style,
            x: MARGIN_MM + style.indent(),
            y: self.cursor,
        });
    }

    fn new_page(&mut self) {
        self.pages.push(std::mem::take(&mut self.current));
        self.cursor = PAGE_HEIGHT_MM - MARGIN_MM;
    }

    fn finish(mut self) -> Vec<Page> {
        if !self.current.lines.is_empty() || self.pages.is_empty() {
            self.pages.push(self.current);
        }
        self.pages
    }
}
