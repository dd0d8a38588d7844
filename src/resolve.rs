//! Depression growth from a pit until an exit is found.
use crate::error::{DepitError, Result};
use crate::grid::{Cell, GridView};
use crate::marker::VisitedMarker;
use crate::progress::ProgressMonitor;

/// A resolved depression: where it drains and which cells belong to it.
#[derive(Debug, Clone, PartialEq)]
pub struct Depression {
    pub exit: Cell,
    pub exit_elevation: f64,
    /// Member cells in the order they joined, the seed pit first.
    pub members: Vec<Cell>,
    /// No drain was found and no valid cell outside the members touches
    /// the depression. Water can never leave it.
    pub enclosed: bool,
}

/// Per-depression bitsets, reused across depressions.
///
/// They are reset through the member list, so a depression costs time in
/// its own size and not in the size of the grid.
#[derive(Debug, Clone)]
pub struct Scratch {
    pub(crate) members: VisitedMarker,
    pub(crate) flooded: VisitedMarker,
}

impl Scratch {
    pub fn new(cols: usize, rows: usize) -> Self {
        Self {
            members: VisitedMarker::new(cols, rows),
            flooded: VisitedMarker::new(cols, rows),
        }
    }

    pub(crate) fn forget(&mut self, cells: &[Cell]) {
        for &cell in cells {
            self.members.unmark(cell);
            self.flooded.unmark(cell);
        }
    }
}

/// Lowest cell of `cells`; ties go to the first one.
fn lowest_of(grid: &GridView<'_>, cells: &[Cell]) -> Option<(Cell, f64)> {
    let mut lowest: Option<(Cell, f64)> = None;
    for &cell in cells {
        let z = grid.elevation(cell);
        if lowest.is_none_or(|(_, lz)| z < lz) {
            lowest = Some((cell, z));
        }
    }
    lowest
}

fn highest_member(grid: &GridView<'_>, members: &[Cell]) -> Option<(Cell, f64)> {
    let mut highest: Option<(Cell, f64)> = None;
    for &cell in members {
        let z = grid.elevation(cell);
        if highest.is_none_or(|(_, hz)| z > hz) {
            highest = Some((cell, z));
        }
    }
    highest
}

/// Grows the depression seeded at `pit` and picks its exit.
///
/// Members are marked in `marker` as they join and flagged in `scratch`
/// for the flood that follows. Returns `Ok(None)` when the monitor
/// cancels; the cells marked so far stay marked.
pub fn resolve_pit(
    grid: &GridView<'_>,
    marker: &mut VisitedMarker,
    scratch: &mut Scratch,
    pit: Cell,
    depression: usize,
    monitor: &dyn ProgressMonitor,
) -> Result<Option<Depression>> {
    let mut members = vec![pit];
    marker.mark(pit);
    scratch.members.mark(pit);

    let mut drain: Option<(Cell, f64)> = None;
    let mut candidates: Vec<Cell> = Vec::with_capacity(8);
    let mut cursor = 0;
    while cursor < members.len() {
        if monitor.is_canceled() {
            scratch.forget(&members);
            return Ok(None);
        }
        let current = members[cursor];
        cursor += 1;

        candidates.clear();
        candidates.extend(grid.valid_neighbors(current).filter(|&n| !marker.is_marked(n)));
        let Some((lowest, lowest_z)) = lowest_of(grid, &candidates) else {
            continue;
        };

        // the lowest neighbour can take the water: no need to grow from here
        if !grid.is_pit_where(lowest, |n| !marker.is_marked(n)) {
            if drain.is_none_or(|(_, dz)| lowest_z < dz) {
                drain = Some((lowest, lowest_z));
            }
            continue;
        }

        for &neighbor in &candidates {
            if grid.is_pit_where(neighbor, |n| !marker.is_marked(n)) {
                marker.mark(neighbor);
                scratch.members.mark(neighbor);
                members.push(neighbor);
            }
        }
    }

    let enclosed = drain.is_none()
        && members
            .iter()
            .all(|&m| grid.valid_neighbors(m).all(|n| scratch.members.is_marked(n)));
    let exit = drain.or_else(|| highest_member(grid, &members));
    let Some((exit, exit_elevation)) = exit.filter(|(_, z)| z.is_finite()) else {
        scratch.forget(&members);
        return Err(DepitError::NoExit {
            col: pit.col,
            row: pit.row,
            depression,
        });
    };

    log::trace!(
        "Depression {} at ({}, {}): {} cells, exit ({}, {}) at {}{}",
        depression,
        pit.col,
        pit.row,
        members.len(),
        exit.col,
        exit.row,
        exit_elevation,
        if enclosed { ", enclosed" } else { "" }
    );

    Ok(Some(Depression {
        exit,
        exit_elevation,
        members,
        enclosed,
    }))
}
