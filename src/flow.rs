//! D8 flow directions.
//!
//! Flow direction encoding:
//! ```text
//!   4  3  2
//!   5  .  1
//!   6  7  8
//! ```
//! Cells without a valid downstream neighbour get [`FLOW_NODATA`].
use ndarray::{Array2, Zip};

use crate::error::Result;
use crate::grid::{Cell, D8_OFFSETS, GridView};

/// Flow code of cells that drain nowhere: invalid, on the edge, next to
/// no-data, or without a strictly lower neighbour.
pub const FLOW_NODATA: i32 = -9999;

fn flow_code(grid: &GridView<'_>, cell: Cell, distances: &[f64; 8]) -> i32 {
    if !grid.is_valid(cell) || grid.touches_boundary(cell) || grid.touches_no_data(cell) {
        return FLOW_NODATA;
    }
    let z = grid.elevation(cell);
    let mut max_slope = 0.0;
    let mut code = FLOW_NODATA;
    for (dir, distance) in distances.iter().enumerate() {
        if let Some(n) = grid.neighbor(cell, dir) {
            let slope = (z - grid.elevation(n)) / distance;
            if slope > max_slope {
                max_slope = slope;
                code = dir as i32 + 1;
            }
        }
    }
    code
}

/// Steepest-descent direction of every cell of `grid`.
///
/// The direction is the neighbour with the steepest slope, that is the
/// drop divided by the distance to it, not simply the lowest neighbour.
/// A diagonal neighbour lies `hypot(resx, resy)` away, so a lower diagonal
/// can lose to a cardinal neighbour with a smaller drop, and the answer
/// depends on the resolution. Runs in parallel, read-only.
pub fn flow_directions(grid: &GridView<'_>) -> Array2<i32> {
    let (resx, resy) = (grid.resx(), grid.resy());
    let diag = resx.hypot(resy);
    let distances = [resx, diag, resy, diag, resx, diag, resy, diag];

    let mut flow = Array2::from_elem((grid.rows(), grid.cols()), FLOW_NODATA);
    Zip::indexed(&mut flow).par_for_each(|(row, col), code| {
        *code = flow_code(grid, Cell::new(col, row), &distances);
    });
    flow
}

/// D8 flow directions of an already depitted DEM.
///
/// Returns the direction grid and its no-data code.
///
/// # Example
///
/// ```
/// use ndarray::array;
/// use depit::d8_flow_directions;
///
/// let dem = array![
///     [9.0, 9.0, 9.0],
///     [9.0, 5.0, 1.0],
///     [9.0, 9.0, 9.0],
/// ];
/// let (flow, nd) = d8_flow_directions(&dem, -9999.0, 10.0, 10.0).unwrap();
/// assert_eq!(flow[[1, 1]], 1);
/// assert_eq!(flow[[0, 0]], nd);
/// ```
pub fn d8_flow_directions(dem: &Array2<f64>, nodata: f64, resx: f64, resy: f64) -> Result<(Array2<i32>, i32)> {
    let grid = GridView::new(dem, nodata, resx, resy)?;
    Ok((flow_directions(&grid), FLOW_NODATA))
}

/// The `(row, col)` a cell drains into, following its flow code.
pub fn downstream(flow: &Array2<i32>, row: usize, col: usize) -> Option<(usize, usize)> {
    let code = *flow.get((row, col))?;
    if !(1..=8).contains(&code) {
        return None;
    }
    let (dc, dr) = D8_OFFSETS[(code - 1) as usize];
    let r = row.checked_add_signed(dr)?;
    let c = col.checked_add_signed(dc)?;
    flow.get((r, c)).map(|_| (r, c))
}
