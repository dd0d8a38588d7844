//! # Depit
//!
//! `depit` removes the pits of a digital elevation model (DEM) and derives
//! D8 flow directions from the corrected surface.
//!
//! Every pit grows into a depression until a cell is found through which it
//! can drain, then the depression is flooded with a small elevation step
//! per ring so that every cell has a way down to that exit. Newly exposed
//! pits next to the flooded cells are picked up by the following pass.
//! Cells on the edge of the grid are outlets; no-data cells are ignored.
//!
//! DEMs are `ndarray::Array2<f64>` indexed `[[row, col]]`.
//!
//! ## Example
//!
//! ```
//! use ndarray::array;
//! use depit::{depit, DepitParams, LogMonitor, FLOW_NODATA};
//!
//! let mut dem = array![
//!     [10.0, 12.0, 10.0, 10.0],
//!     [12.0,  9.0, 12.0, 12.0],
//!     [10.0, 12.0, 10.0, 11.0],
//! ];
//!
//! let mut monitor = LogMonitor::new();
//! let depitted = depit(&mut dem, -3.0, 8.0, 8.0, &DepitParams::default(), &mut monitor)
//!     .expect("valid DEM")
//!     .complete()
//!     .expect("not canceled");
//! assert!(dem[[1, 1]] >= 10.0);
//! assert_ne!(depitted.flow[[1, 1]], FLOW_NODATA);
//! ```
pub mod engine;
pub mod error;
pub mod flood;
pub mod flow;
pub mod grid;
pub mod marker;
pub mod progress;
pub mod resolve;
pub mod scan;

pub use engine::{DepitOutcome, DepitParams, DepitStats, Depitted, depit};
pub use error::{DepitError, Result};
pub use flood::DEFAULT_EPSILON;
pub use flow::{FLOW_NODATA, d8_flow_directions, downstream, flow_directions};
pub use grid::{Cell, Grid, GridView, GridViewMut};
pub use marker::VisitedMarker;
pub use progress::{LogMonitor, NullMonitor, ProgressMonitor};
