//! CLI output formatting for build and check runs.
//!
//! Output is information-centric: the primary display for every document is
//! its semantic identity — positional index, feed name, record count — with
//! filesystem paths as indented context lines. Each command has a `format_*`
//! function returning lines (pure, testable) and a `print_*` wrapper that
//! writes them to stdout.
//!
//! ```text
//! 001 heat-pack (24 movies) → heat-pack/index.html
//!     Template: Dark
//!     Pages: 24
//! 002 noir (7 movies) → noir/index.html
//!     Template: Dark
//!     Pages: 7
//!
//! Built 2 documents, 31 detail pages
//! ```

use std::path::{Path, PathBuf};

/// Result summary of one built document.
#[derive(Debug)]
pub struct DocumentReport {
    /// Feed name (input file stem) the document was built from.
    pub name: String,
    /// Display name of the template bundle used.
    pub template: String,
    /// Records in the document after normalization.
    pub movies: usize,
    /// The document's list page.
    pub list_page: PathBuf,
    /// Number of detail pages written.
    pub detail_pages: usize,
}

/// Summary of one normalized feed (check command).
#[derive(Debug)]
pub struct FeedReport {
    pub name: String,
    /// Records in the raw feed.
    pub scraped: usize,
    /// Records surviving filter + distinct.
    pub kept: usize,
}

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Path shown relative to the output root when possible.
fn display_path(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

pub fn format_build_output(reports: &[DocumentReport], output_dir: &Path) -> Vec<String> {
    let mut lines = Vec::new();
    for (pos, report) in reports.iter().enumerate() {
        lines.push(format!(
            "{} {} ({} movies) → {}",
            format_index(pos + 1),
            report.name,
            report.movies,
            display_path(&report.list_page, output_dir),
        ));
        lines.push(format!("    Template: {}", report.template));
        lines.push(format!("    Pages: {}", report.detail_pages));
    }
    let details: usize = reports.iter().map(|r| r.detail_pages).sum();
    lines.push(String::new());
    lines.push(format!(
        "Built {} {}, {} detail pages",
        reports.len(),
        plural(reports.len(), "document", "documents"),
        details
    ));
    lines
}

pub fn print_build_output(reports: &[DocumentReport], output_dir: &Path) {
    for line in format_build_output(reports, output_dir) {
        println!("{line}");
    }
}

pub fn format_check_output(feeds: &[FeedReport]) -> Vec<String> {
    let mut lines = Vec::new();
    for (pos, feed) in feeds.iter().enumerate() {
        lines.push(format!(
            "{} {} ({} scraped, {} kept)",
            format_index(pos + 1),
            feed.name,
            feed.scraped,
            feed.kept,
        ));
        let dropped = feed.scraped.saturating_sub(feed.kept);
        if dropped > 0 {
            lines.push(format!("    Dropped: {} without usable title", dropped));
        }
    }
    lines
}

pub fn print_check_output(feeds: &[FeedReport]) {
    for line in format_check_output(feeds) {
        println!("{line}");
    }
}

fn plural<'a>(n: usize, one: &'a str, many: &'a str) -> &'a str {
    if n == 1 { one } else { many }
}
