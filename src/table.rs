use colored::Colorize;
use std::fmt::Write;

use crate::export::state_label;
use crate::types::PortResult;
use crate::view::{visible_rows, ViewState};

const RULE: &str = "------------------------------------------------------------------------";

fn colored_state(open: bool) -> String {
    let label = state_label(open);
    if open {
        label.green().to_string()
    } else {
        label.red().to_string()
    }
}

fn cell(r: &PortResult) -> String {
    format!(
        "{}\t{}\t{}",
        r.port(),
        colored_state(r.tcp_open()),
        colored_state(r.udp_open())
    )
}

/// Render one page of the three-column result table.
pub fn render_page(target: &str, results: &[PortResult], state: ViewState) -> String {
    let mut out = String::new();
    let filter = if state.show_all { "all ports" } else { "open ports" };
    let _ = writeln!(out, "\nResults for {target} ({filter}):");
    let _ = writeln!(out, "Port\tTCP\tUDP\t| Port\tTCP\tUDP\t| Port\tTCP\tUDP");
    let _ = writeln!(out, "{RULE}");

    for row in visible_rows(results, state) {
        if row.iter().all(Option::is_none) {
            break;
        }
        // Columns fill left to right, so only trailing slots can be empty.
        let cells: Vec<String> = row.iter().flatten().map(cell).collect();
        let _ = writeln!(out, "{}", cells.join("\t| "));
    }
    out
}
