//! The pit removal driver.
use ndarray::Array2;

use crate::error::{DepitError, Result};
use crate::flood::{DEFAULT_EPSILON, flood};
use crate::flow::{FLOW_NODATA, flow_directions};
use crate::grid::{Cell, GridViewMut};
use crate::marker::VisitedMarker;
use crate::progress::ProgressMonitor;
use crate::resolve::{Scratch, resolve_pit};
use crate::scan::{border_scan, full_scan};

/// Parameters for [`depit`].
#[derive(Debug, Clone, PartialEq)]
pub struct DepitParams {
    /// Elevation added per flood ring, in map units.
    pub epsilon: f64,
    /// Per-pit progress is reported until fewer pits than this remain.
    pub verbose_threshold: usize,
    /// Upper bound on the number of passes before giving up.
    pub max_passes: usize,
}

impl Default for DepitParams {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_EPSILON,
            verbose_threshold: 10_000,
            max_passes: 1_000,
        }
    }
}

impl DepitParams {
    fn validate(&self) -> Result<()> {
        if !(self.epsilon.is_finite() && self.epsilon > 0.0) {
            return Err(DepitError::InvalidParameter {
                name: "epsilon",
                value: self.epsilon.to_string(),
                reason: "must be finite and positive".to_string(),
            });
        }
        if self.max_passes == 0 {
            return Err(DepitError::InvalidParameter {
                name: "max_passes",
                value: self.max_passes.to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Counters of a depit run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DepitStats {
    /// Passes, each one starting from a full scan with a clean marker.
    pub passes: usize,
    /// Resolve and border scan rounds, over all passes.
    pub iterations: usize,
    /// Depressions resolved and flooded.
    pub depressions: usize,
    /// Cells that joined a depression at least once.
    pub marked_cells: usize,
    /// Times a cell was raised.
    pub raised_cells: usize,
}

/// Output of a completed run; the filled elevations are in the DEM itself.
#[derive(Debug, Clone)]
pub struct Depitted {
    /// D8 codes, see [`crate::flow`].
    pub flow: Array2<i32>,
    /// No-data code of `flow`.
    pub flow_nodata: i32,
    /// Cells that were part of some depression.
    pub pits: Array2<bool>,
    pub stats: DepitStats,
}

#[derive(Debug, Clone)]
pub enum DepitOutcome {
    Complete(Depitted),
    /// The monitor canceled the run. The DEM holds the depressions flooded
    /// so far and must not be taken as depitted; no flow grid was made.
    Canceled(DepitStats),
}

impl DepitOutcome {
    /// The result of a completed run, `None` if canceled.
    pub fn complete(self) -> Option<Depitted> {
        match self {
            DepitOutcome::Complete(depitted) => Some(depitted),
            DepitOutcome::Canceled(_) => None,
        }
    }

    pub fn is_canceled(&self) -> bool {
        matches!(self, DepitOutcome::Canceled(_))
    }

    pub fn stats(&self) -> &DepitStats {
        match self {
            DepitOutcome::Complete(depitted) => &depitted.stats,
            DepitOutcome::Canceled(stats) => stats,
        }
    }
}

fn canceled(mut stats: DepitStats, depressed: &VisitedMarker) -> DepitOutcome {
    stats.marked_cells = depressed.count();
    log::info!(
        "Depit canceled after {} iterations, {} depressions",
        stats.iterations,
        stats.depressions
    );
    DepitOutcome::Canceled(stats)
}

/// Full scan without the sealed cells, which can never drain.
fn extract_pits(grid: &GridViewMut<'_>, sealed: &VisitedMarker, monitor: &mut dyn ProgressMonitor) -> Vec<Cell> {
    monitor.begin_task("Extract pits from DEM...", Some(grid.rows()));
    let mut pits = full_scan(&grid.view());
    pits.retain(|&pit| !sealed.is_marked(pit));
    monitor.worked(grid.rows());
    monitor.done();
    pits
}

/// Removes the pits of `dem` in place and computes its D8 flow directions.
///
/// Pits are found with a full scan, then each one grows into a depression
/// until an exit is found and the depression is flooded so that it drains
/// to the exit. Cells next to the flooded ones are scanned again, and so
/// on until no pits remain. Cells on the edge of the grid are outlets and
/// are never filled. No-data cells are ignored: a cell next to no-data is
/// a pit when none of its valid neighbours is lower.
///
/// A cell is marked at most once per pass, not once per run. A later
/// depression can raise the exit of an earlier one and strand it, so every
/// pass ends with a full scan; the stranded pits start a new pass with a
/// clean marker and their cells can be marked again.
///
/// An island of data cut off by no-data has nowhere to drain. It is
/// flooded once from its highest cell and then left alone, so it may
/// still hold a pit afterwards.
///
/// # Parameters
///
/// - `dem`: the elevations, filled in place.
/// - `nodata`: the value of no-data cells.
/// - `resx`, `resy`: the cell size, used to weight diagonal slopes.
/// - `params`: see [`DepitParams`].
/// - `monitor`: receives progress and may cancel the run.
///
/// # Errors
///
/// Invalid dimensions, resolution or parameters are rejected before any
/// cell is touched. [`DepitError::NoExit`] and [`DepitError::NotConverged`]
/// abort the run and leave the DEM partially filled.
///
/// # Example
///
/// ```
/// use ndarray::array;
/// use depit::{depit, DepitParams, NullMonitor};
///
/// let mut dem = array![
///     [5.0, 2.0, 5.0],
///     [5.0, 1.0, 5.0],
///     [5.0, 5.0, 5.0],
/// ];
/// let outcome = depit(&mut dem, -9999.0, 8.0, 8.0, &DepitParams::default(), &mut NullMonitor).unwrap();
/// let depitted = outcome.complete().unwrap();
/// assert!(dem[[1, 1]] > 2.0);
/// assert_eq!(depitted.flow[[1, 1]], 3);
/// ```
pub fn depit(
    dem: &mut Array2<f64>,
    nodata: f64,
    resx: f64,
    resy: f64,
    params: &DepitParams,
    monitor: &mut dyn ProgressMonitor,
) -> Result<DepitOutcome> {
    params.validate()?;
    let mut grid = GridViewMut::new_mut(dem, nodata, resx, resy)?;
    let (cols, rows) = (grid.cols(), grid.rows());
    log::info!("Depitting {} x {} DEM", cols, rows);

    let mut marker = VisitedMarker::new(cols, rows);
    let mut depressed = VisitedMarker::new(cols, rows);
    let mut sealed = VisitedMarker::new(cols, rows);
    let mut scratch = Scratch::new(cols, rows);
    let mut stats = DepitStats::default();
    let mut verbose = true;

    let mut pits = extract_pits(&grid, &sealed, monitor);
    log::debug!("Full scan found {} pits", pits.len());

    while !pits.is_empty() {
        if stats.passes == params.max_passes {
            return Err(DepitError::NotConverged { passes: stats.passes });
        }
        stats.passes += 1;
        marker.clear();

        let mut iteration = 0;
        while !pits.is_empty() {
            if monitor.is_canceled() {
                return Ok(canceled(stats, &depressed));
            }
            iteration += 1;
            stats.iterations += 1;

            monitor.begin_task(
                &format!("Processing {} pits (iteration {}.{})... ", pits.len(), stats.passes, iteration),
                verbose.then_some(pits.len()),
            );
            let mut newly_marked: Vec<Cell> = Vec::new();
            for &pit in &pits {
                if marker.is_marked(pit) {
                    if verbose {
                        monitor.worked(1);
                    }
                    continue;
                }
                if monitor.is_canceled() {
                    return Ok(canceled(stats, &depressed));
                }
                stats.depressions += 1;

                let resolved = resolve_pit(&grid.view(), &mut marker, &mut scratch, pit, stats.depressions, &*monitor)?;
                let Some(depression) = resolved else {
                    return Ok(canceled(stats, &depressed));
                };
                stats.raised_cells += flood(&mut grid, &depression, &mut scratch, params.epsilon);
                for &member in &depression.members {
                    depressed.mark(member);
                }
                if depression.enclosed {
                    log::debug!("Sealing enclosed depression at ({}, {})", pit.col, pit.row);
                    for &member in &depression.members {
                        sealed.mark(member);
                    }
                }
                newly_marked.extend_from_slice(&depression.members);

                if verbose {
                    monitor.worked(1);
                }
            }
            monitor.done();

            let left = border_scan(&grid.view(), &marker, &newly_marked, &pits);
            monitor.message(&format!("Left pits: {}", left.len()));
            log::debug!(
                "Iteration {}.{}: {} cells marked, {} pits left",
                stats.passes,
                iteration,
                newly_marked.len(),
                left.len()
            );
            if left.len() < params.verbose_threshold {
                verbose = false;
            }
            pits = left;
        }

        pits = extract_pits(&grid, &sealed, monitor);
        if !pits.is_empty() {
            log::debug!("Pass {} stranded {} pits", stats.passes, pits.len());
        }
    }
    stats.marked_cells = depressed.count();

    if monitor.is_canceled() {
        return Ok(canceled(stats, &depressed));
    }
    monitor.begin_task("Calculating flowdirections...", Some(rows));
    let flow = flow_directions(&grid.view());
    monitor.worked(rows);
    monitor.done();

    log::info!(
        "Depit done: {} depressions in {} passes, {} cells raised",
        stats.depressions,
        stats.passes,
        stats.raised_cells
    );

    Ok(DepitOutcome::Complete(Depitted {
        flow,
        flow_nodata: FLOW_NODATA,
        pits: depressed.to_mask(),
        stats,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NullMonitor;
    use ndarray::array;

    #[test]
    fn test_rejects_bad_params() {
        let mut dem = array![[1.0]];
        let params = DepitParams {
            epsilon: 0.0,
            ..DepitParams::default()
        };
        let err = depit(&mut dem, -9999.0, 1.0, 1.0, &params, &mut NullMonitor).unwrap_err();
        assert!(matches!(err, DepitError::InvalidParameter { name: "epsilon", .. }));

        let params = DepitParams {
            max_passes: 0,
            ..DepitParams::default()
        };
        let err = depit(&mut dem, -9999.0, 1.0, 1.0, &params, &mut NullMonitor).unwrap_err();
        assert!(matches!(err, DepitError::InvalidParameter { name: "max_passes", .. }));

        let err = depit(&mut dem, -9999.0, f64::INFINITY, 1.0, &DepitParams::default(), &mut NullMonitor)
            .unwrap_err();
        assert!(matches!(err, DepitError::InvalidResolution { .. }));
    }

    #[test]
    fn test_gives_up_after_max_passes() {
        // needs a second pass to refill a stranded exit
        let mut dem = array![
            [8.0, 12.0, 4.0, 4.0, 1.0, 0.0],
            [5.0, 18.0, 1.0, 12.0, 1.0, 1.0],
            [9.0, 3.0, 6.0, 15.0, 4.0, 2.0],
            [12.0, 2.0, 5.0, 1.0, 12.0, 10.0],
            [15.0, 14.0, 8.0, 13.0, 8.0, 20.0],
        ];
        let params = DepitParams {
            max_passes: 1,
            ..DepitParams::default()
        };
        let err = depit(&mut dem, -9999.0, 8.0, 8.0, &params, &mut NullMonitor).unwrap_err();
        assert_eq!(err, DepitError::NotConverged { passes: 1 });
    }

    #[test]
    fn test_single_cell() {
        let mut dem = array![[1.0]];
        let outcome = depit(&mut dem, -9999.0, 1.0, 1.0, &DepitParams::default(), &mut NullMonitor).unwrap();
        let depitted = outcome.complete().unwrap();
        assert_eq!(depitted.stats, DepitStats::default());
        assert_eq!(depitted.flow, array![[FLOW_NODATA]]);
        assert_eq!(dem, array![[1.0]]);
    }

    #[test]
    fn test_outcome_accessors() {
        let stats = DepitStats {
            iterations: 2,
            ..DepitStats::default()
        };
        let outcome = DepitOutcome::Canceled(stats);
        assert!(outcome.is_canceled());
        assert_eq!(outcome.stats().iterations, 2);
        assert!(outcome.complete().is_none());
    }
}
