//! Elevation grid accessor.
//!
//! [`Grid`] wraps a view of the caller's `Array2<f64>` together with the
//! no-data value and the cell resolution. Arrays are indexed `[[row, col]]`
//! as everywhere else in the crate, while [`Cell`] references name the
//! column first.
use ndarray::{ArrayBase, ArrayView2, ArrayViewMut2, Data, DataMut, Ix2, ViewRepr};

use crate::error::{DepitError, Result};

/// D8 neighbour offsets as `(col_offset, row_offset)`, indexed by
/// direction code minus one: E, NE, N, NW, W, SW, S, SE.
pub(crate) const D8_OFFSETS: [(isize, isize); 8] = [
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// A (column, row) reference into a [`Grid`].
///
/// Cells only carry coordinates; every query goes through the grid they
/// were obtained from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    pub col: usize,
    pub row: usize,
}

impl Cell {
    pub fn new(col: usize, row: usize) -> Self {
        Self { col, row }
    }
}

/// Elevation grid over any ndarray storage.
pub struct Grid<S: Data<Elem = f64>> {
    z: ArrayBase<S, Ix2>,
    nodata: f64,
    resx: f64,
    resy: f64,
}

impl<S: Data<Elem = f64>> std::fmt::Debug for Grid<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Grid")
            .field("z", &self.z)
            .field("nodata", &self.nodata)
            .field("resx", &self.resx)
            .field("resy", &self.resy)
            .finish()
    }
}

/// Read-only grid borrowing the caller's array.
pub type GridView<'a> = Grid<ViewRepr<&'a f64>>;

/// Writable grid borrowing the caller's array.
pub type GridViewMut<'a> = Grid<ViewRepr<&'a mut f64>>;

impl<S: Data<Elem = f64>> Grid<S> {
    /// Wraps `z`, rejecting empty arrays and unusable resolutions.
    pub fn from_array(z: ArrayBase<S, Ix2>, nodata: f64, resx: f64, resy: f64) -> Result<Self> {
        let (rows, cols) = z.dim();
        if rows == 0 || cols == 0 {
            return Err(DepitError::InvalidDimensions { rows, cols });
        }
        if !(resx.is_finite() && resy.is_finite() && resx > 0.0 && resy > 0.0) {
            return Err(DepitError::InvalidResolution { resx, resy });
        }
        Ok(Self { z, nodata, resx, resy })
    }

    pub fn cols(&self) -> usize {
        self.z.ncols()
    }

    pub fn rows(&self) -> usize {
        self.z.nrows()
    }

    pub fn nodata(&self) -> f64 {
        self.nodata
    }

    pub fn resx(&self) -> f64 {
        self.resx
    }

    pub fn resy(&self) -> f64 {
        self.resy
    }

    /// Read-only reborrow of this grid.
    pub fn view(&self) -> GridView<'_> {
        Grid {
            z: self.z.view(),
            nodata: self.nodata,
            resx: self.resx,
            resy: self.resy,
        }
    }

    /// The elevations as an ndarray view.
    pub fn elevations(&self) -> ArrayView2<'_, f64> {
        self.z.view()
    }

    /// Checked construction of a cell reference.
    pub fn cell(&self, col: usize, row: usize) -> Result<Cell> {
        if col >= self.cols() || row >= self.rows() {
            return Err(DepitError::IndexOutOfBounds {
                col,
                row,
                cols: self.cols(),
                rows: self.rows(),
            });
        }
        Ok(Cell { col, row })
    }

    /// Checked read of the elevation at (col, row).
    pub fn get(&self, col: usize, row: usize) -> Result<f64> {
        let cell = self.cell(col, row)?;
        Ok(self.elevation(cell))
    }

    /// Elevation of a cell obtained from this grid.
    ///
    /// # Panics
    /// If `cell` lies outside the grid.
    #[inline]
    pub fn elevation(&self, cell: Cell) -> f64 {
        self.z[[cell.row, cell.col]]
    }

    /// True when the cell holds data: not the no-data value, not NaN or infinite.
    #[inline]
    pub fn is_valid(&self, cell: Cell) -> bool {
        let z = self.elevation(cell);
        z != self.nodata && z.is_finite()
    }

    /// The neighbour at D8 direction index `dir` (code minus one), if in bounds.
    #[inline]
    pub(crate) fn neighbor(&self, cell: Cell, dir: usize) -> Option<Cell> {
        let (dc, dr) = D8_OFFSETS[dir];
        let col = cell.col.checked_add_signed(dc)?;
        let row = cell.row.checked_add_signed(dr)?;
        (col < self.cols() && row < self.rows()).then_some(Cell { col, row })
    }

    /// The in-bounds 8-neighbourhood of `cell`, in D8 code order.
    pub fn neighbors(&self, cell: Cell) -> impl Iterator<Item = Cell> + '_ {
        (0..8).filter_map(move |dir| self.neighbor(cell, dir))
    }

    /// The in-bounds neighbours that hold data.
    pub fn valid_neighbors(&self, cell: Cell) -> impl Iterator<Item = Cell> + '_ {
        self.neighbors(cell).filter(move |&n| self.is_valid(n))
    }

    /// True when some neighbour position falls outside the grid.
    #[inline]
    pub fn touches_boundary(&self, cell: Cell) -> bool {
        cell.col == 0 || cell.row == 0 || cell.col + 1 >= self.cols() || cell.row + 1 >= self.rows()
    }

    /// True when some in-bounds neighbour is no-data.
    pub fn touches_no_data(&self, cell: Cell) -> bool {
        self.neighbors(cell).any(|n| !self.is_valid(n))
    }

    /// Lowest elevation among the valid neighbours, infinite if there are none.
    pub fn surrounding_min(&self, cell: Cell) -> f64 {
        self.valid_neighbors(cell)
            .map(|n| self.elevation(n))
            .fold(f64::INFINITY, f64::min)
    }

    /// Pit test against the valid neighbours accepted by `keep`.
    ///
    /// Cells on the edge of the grid drain off it and are never pits.
    /// Otherwise the cell is a pit when no kept neighbour is strictly lower,
    /// so flats count as pits. No-data neighbours are ignored.
    pub fn is_pit_where<F>(&self, cell: Cell, keep: F) -> bool
    where
        F: Fn(Cell) -> bool,
    {
        if !self.is_valid(cell) || self.touches_boundary(cell) {
            return false;
        }
        let z = self.elevation(cell);
        self.valid_neighbors(cell)
            .filter(|&n| keep(n))
            .all(|n| z <= self.elevation(n))
    }

    /// Pit test against the full neighbourhood.
    pub fn is_pit(&self, cell: Cell) -> bool {
        self.is_pit_where(cell, |_| true)
    }
}

impl<S: DataMut<Elem = f64>> Grid<S> {
    /// Checked write of the elevation at (col, row).
    pub fn set(&mut self, col: usize, row: usize, value: f64) -> Result<()> {
        let cell = self.cell(col, row)?;
        self.set_elevation(cell, value);
        Ok(())
    }

    /// Writes the elevation of a cell obtained from this grid.
    ///
    /// # Panics
    /// If `cell` lies outside the grid.
    #[inline]
    pub fn set_elevation(&mut self, cell: Cell, value: f64) {
        self.z[[cell.row, cell.col]] = value;
    }
}

impl<'a> GridViewMut<'a> {
    /// Writable grid over the caller's DEM.
    pub fn new_mut(dem: &'a mut ndarray::Array2<f64>, nodata: f64, resx: f64, resy: f64) -> Result<Self> {
        let z: ArrayViewMut2<'a, f64> = dem.view_mut();
        Grid::from_array(z, nodata, resx, resy)
    }
}

impl<'a> GridView<'a> {
    /// Read-only grid over the caller's DEM.
    pub fn new(dem: &'a ndarray::Array2<f64>, nodata: f64, resx: f64, resy: f64) -> Result<Self> {
        Grid::from_array(dem.view(), nodata, resx, resy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array2, array};

    const ND: f64 = -9999.0;

    #[test]
    fn test_rejects_empty_and_bad_resolution() {
        let empty = Array2::<f64>::zeros((0, 3));
        assert_eq!(
            GridView::new(&empty, ND, 1.0, 1.0).unwrap_err(),
            DepitError::InvalidDimensions { rows: 0, cols: 3 }
        );
        let dem = array![[1.0]];
        assert!(GridView::new(&dem, ND, 0.0, 1.0).is_err());
        assert!(GridView::new(&dem, ND, 1.0, f64::NAN).is_err());
        assert!(GridView::new(&dem, ND, -2.0, 1.0).is_err());
    }

    #[test]
    fn test_checked_access() {
        let mut dem = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
        let mut grid = GridViewMut::new_mut(&mut dem, ND, 1.0, 1.0).unwrap();
        assert_eq!(grid.get(2, 1).unwrap(), 6.0);
        assert_eq!(
            grid.get(3, 0).unwrap_err(),
            DepitError::IndexOutOfBounds { col: 3, row: 0, cols: 3, rows: 2 }
        );
        assert!(grid.set(0, 2, 1.0).is_err());
        grid.set(0, 1, 7.5).unwrap();
        assert_eq!(dem[[1, 0]], 7.5);
    }

    #[test]
    fn test_neighbors_are_clipped_to_grid() {
        let dem = Array2::<f64>::zeros((3, 4));
        let grid = GridView::new(&dem, ND, 1.0, 1.0).unwrap();
        assert_eq!(grid.neighbors(Cell::new(0, 0)).count(), 3);
        assert_eq!(grid.neighbors(Cell::new(1, 0)).count(), 5);
        assert_eq!(grid.neighbors(Cell::new(1, 1)).count(), 8);
        let first: Vec<Cell> = grid.neighbors(Cell::new(1, 1)).take(3).collect();
        // E, NE, N
        assert_eq!(first, vec![Cell::new(2, 1), Cell::new(2, 0), Cell::new(1, 0)]);
    }

    #[test]
    fn test_validity_and_no_data() {
        let dem = array![
            [1.0, 1.0, 1.0, 1.0],
            [1.0, 2.0, 1.0, 1.0],
            [1.0, 1.0, 1.0, ND],
            [1.0, 1.0, f64::NAN, 1.0],
        ];
        let grid = GridView::new(&dem, ND, 1.0, 1.0).unwrap();
        assert!(!grid.is_valid(Cell::new(3, 2)));
        assert!(!grid.is_valid(Cell::new(2, 3)));
        assert!(grid.touches_no_data(Cell::new(2, 2)));
        assert!(!grid.touches_no_data(Cell::new(1, 1)));
        assert!(grid.touches_boundary(Cell::new(3, 1)));
        assert!(!grid.touches_boundary(Cell::new(1, 1)));
        assert_eq!(grid.valid_neighbors(Cell::new(2, 2)).count(), 6);
    }

    #[test]
    fn test_pit_predicate() {
        let dem = array![
            [5.0, 5.0, 5.0, 5.0, 5.0],
            [5.0, 1.0, 1.0, 3.0, 5.0],
            [5.0, 5.0, 5.0, 2.0, 5.0],
            [5.0, 5.0, 5.0, 5.0, 5.0],
        ];
        let grid = GridView::new(&dem, ND, 1.0, 1.0).unwrap();
        // flats count
        assert!(grid.is_pit(Cell::new(1, 1)));
        assert!(grid.is_pit(Cell::new(2, 1)));
        assert!(!grid.is_pit(Cell::new(3, 1)));
        // edge cells never are
        assert!(!grid.is_pit(Cell::new(0, 0)));
        // ignoring the flat partner leaves (2,1) still a pit, ignoring the
        // lower neighbour turns (3,1) into one
        assert!(grid.is_pit_where(Cell::new(2, 1), |n| n != Cell::new(1, 1)));
        assert!(grid.is_pit_where(Cell::new(3, 1), |n| {
            n != Cell::new(2, 1) && n != Cell::new(3, 2)
        }));
        assert_eq!(grid.surrounding_min(Cell::new(3, 1)), 1.0);
    }

    #[test]
    fn test_pit_next_to_no_data() {
        let dem = array![
            [9.0, 9.0, 9.0, 9.0, 9.0],
            [9.0, 1.0, 3.0, 4.0, 9.0],
            [9.0, 3.0, ND, 0.5, 9.0],
            [9.0, ND, ND, ND, 9.0],
            [9.0, 9.0, 9.0, 9.0, 9.0],
        ];
        let grid = GridView::new(&dem, ND, 1.0, 1.0).unwrap();
        // no-data neighbours neither block nor count as lower
        assert!(grid.touches_no_data(Cell::new(1, 1)));
        assert!(grid.is_pit(Cell::new(1, 1)));
        assert!(grid.is_pit(Cell::new(3, 2)));
        assert!(!grid.is_pit(Cell::new(2, 1)));
        assert!(!grid.is_pit(Cell::new(2, 2)));
    }
}
