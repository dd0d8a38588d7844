//! Pit discovery: the full initial scan and the incremental border scan.
use rayon::prelude::*;

use crate::grid::{Cell, GridView};
use crate::marker::VisitedMarker;

/// Work-list test: a pit whose neighbourhood holds some data.
#[inline]
fn is_listed_pit(grid: &GridView<'_>, cell: Cell) -> bool {
    grid.is_pit(cell) && grid.surrounding_min(cell).is_finite()
}

/// Finds every pit of the grid, in row-major order.
///
/// Rows are examined in parallel; nothing is written.
pub fn full_scan(grid: &GridView<'_>) -> Vec<Cell> {
    let cols = grid.cols();
    (0..grid.rows())
        .into_par_iter()
        .flat_map(|row| {
            let mut local_pits = Vec::new();
            for col in 0..cols {
                let cell = Cell::new(col, row);
                if is_listed_pit(grid, cell) {
                    local_pits.push(cell);
                }
            }
            local_pits
        })
        .collect()
}

/// Finds the pits exposed by the last flooding pass.
///
/// Only the unmarked neighbours of `newly_marked` can have changed
/// neighbourhoods, so only those are tested. Pits of the `previous`
/// work-list that are still unmarked are carried over. Each cell is listed
/// once.
pub fn border_scan(
    grid: &GridView<'_>,
    marker: &VisitedMarker,
    newly_marked: &[Cell],
    previous: &[Cell],
) -> Vec<Cell> {
    let mut queued = VisitedMarker::new(grid.cols(), grid.rows());
    let mut pits = Vec::new();

    let border = newly_marked.iter().flat_map(|&cell| grid.neighbors(cell));
    for cell in border.chain(previous.iter().copied()) {
        if marker.is_marked(cell) || queued.is_marked(cell) {
            continue;
        }
        if is_listed_pit(grid, cell) {
            queued.mark(cell);
            pits.push(cell);
        }
    }
    pits
}
