//! Line-driven pager over a finished scan.
//!
//! Reads one command per line: `j`/`k` scroll a line, `n`/`p` a page, `t` or a
//! blank-space line toggles open-only/all, `s` saves CSV, `q` quits.

use anyhow::Result;
use std::io::{BufRead, Write};
use std::path::Path;
use tracing::warn;

use crate::export::write_results_csv;
use crate::table::render_page;
use crate::types::ScanReport;
use crate::view::{apply, ViewCommand, ViewState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagerInput {
    View(ViewCommand),
    Save,
    Quit,
}

pub fn parse_input(line: &str) -> Option<PagerInput> {
    if !line.is_empty() && line.trim().is_empty() {
        return Some(PagerInput::View(ViewCommand::ToggleFilter));
    }
    match line.trim() {
        "j" | "down" => Some(PagerInput::View(ViewCommand::LineDown)),
        "k" | "up" => Some(PagerInput::View(ViewCommand::LineUp)),
        "n" | "right" => Some(PagerInput::View(ViewCommand::PageDown)),
        "p" | "left" => Some(PagerInput::View(ViewCommand::PageUp)),
        "t" => Some(PagerInput::View(ViewCommand::ToggleFilter)),
        "s" => Some(PagerInput::Save),
        "q" | "quit" => Some(PagerInput::Quit),
        _ => None,
    }
}

/// Run the pager until `q` or end of input. Returns the final view state.
pub fn run<R: BufRead, W: Write>(
    report: &ScanReport,
    mut state: ViewState,
    csv_path: &Path,
    input: R,
    mut out: W,
) -> Result<ViewState> {
    write!(out, "{}", render_page(&report.target, &report.results, state))?;
    writeln!(out, "{HELP}")?;

    for line in input.lines() {
        match parse_input(&line?) {
            Some(PagerInput::View(cmd)) => state = apply(&report.results, state, cmd),
            Some(PagerInput::Save) => match write_results_csv(csv_path, &report.results) {
                Ok(()) => writeln!(out, "Results exported to {}", csv_path.display())?,
                Err(e) => {
                    warn!(error = %e, "CSV export failed");
                    writeln!(out, "Export failed: {e:#}")?;
                }
            },
            Some(PagerInput::Quit) => break,
            None => {
                writeln!(out, "{HELP}")?;
                continue;
            }
        }
        write!(out, "{}", render_page(&report.target, &report.results, state))?;
        writeln!(out, "{HELP}")?;
    }
    Ok(state)
}

const HELP: &str =
    "\n[j/k] line  [n/p] page  [t] toggle open/all  [s] save CSV  [q] quit";
