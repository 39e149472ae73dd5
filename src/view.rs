//! Terminal-independent paging over a result collection.
//!
//! Results are laid out in three side-by-side columns of `page_size` rows. `top`
//! is the index of the first result shown in the left column.

use crate::types::PortResult;

pub const COLUMNS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewState {
    pub top: usize,
    pub show_all: bool,
    pub page_size: usize,
}

impl ViewState {
    /// Open-only view starting at the top.
    pub fn new(page_size: usize) -> Self {
        Self {
            top: 0,
            show_all: false,
            page_size: page_size.max(1),
        }
    }

    fn span(&self) -> usize {
        COLUMNS * self.page_size
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewCommand {
    LineDown,
    LineUp,
    PageDown,
    PageUp,
    ToggleFilter,
}

/// Results visible under the current filter.
pub fn filtered(results: &[PortResult], show_all: bool) -> Vec<PortResult> {
    results
        .iter()
        .filter(|r| show_all || r.any_open())
        .copied()
        .collect()
}

/// Next view state after `cmd`. Moves that would scroll past either end are ignored.
pub fn apply(results: &[PortResult], state: ViewState, cmd: ViewCommand) -> ViewState {
    let len = filtered(results, state.show_all).len();
    let mut next = state;
    match cmd {
        ViewCommand::LineDown if state.top + state.page_size < len => next.top += 1,
        ViewCommand::LineUp if state.top > 0 => next.top -= 1,
        ViewCommand::PageDown if state.top + state.span() < len => {
            next.top = (state.top + state.span()).min(len - state.span());
        }
        ViewCommand::PageUp if state.top > 0 => {
            next.top = state.top.saturating_sub(state.span());
        }
        ViewCommand::ToggleFilter => {
            next.show_all = !state.show_all;
            next.top = 0;
        }
        _ => {}
    }
    next
}

/// Rows of the current page. Row `i` holds results `top+i`, `top+i+page_size`
/// and `top+i+2*page_size`; slots past the end are `None`.
pub fn visible_rows(results: &[PortResult], state: ViewState) -> Vec<[Option<PortResult>; COLUMNS]> {
    let items = filtered(results, state.show_all);
    (0..state.page_size)
        .map(|i| {
            let mut row = [None; COLUMNS];
            for (col, slot) in row.iter_mut().enumerate() {
                *slot = items.get(state.top + i + col * state.page_size).copied();
            }
            row
        })
        .collect()
}
