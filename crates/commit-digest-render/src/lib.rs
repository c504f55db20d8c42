//! Report rendering for commit-digest.
//!
//! Rendering happens in two steps: [`Layout::build`] places every line of
//! the report on A4 pages, then [`write_pdf`] draws those pages and writes
//! the document.

mod error;
mod layout;
mod metrics;
mod pdf;

pub use error::{RenderError, RenderResult};
pub use layout::{Layout, Line, Page, ReportMeta, Style};
pub use pdf::write_pdf;
