//! Raising a resolved depression so that it drains to its exit.
use std::collections::VecDeque;

use crate::grid::{Cell, GridViewMut};
use crate::resolve::{Depression, Scratch};

/// Default elevation step between successive flood rings, in map units.
pub const DEFAULT_EPSILON: f64 = 2.0e-6;

/// Floods the members of `depression` outward from its exit, ring by ring.
///
/// Each member reached from a cell at level `L` becomes `L + epsilon` if it
/// lies at or below `L` and keeps its elevation otherwise; that elevation
/// is then the level of the next ring. Every member ends up strictly above
/// the cell it was reached from. Returns the number of raised cells and
/// clears the depression from `scratch`.
pub fn flood(grid: &mut GridViewMut<'_>, depression: &Depression, scratch: &mut Scratch, epsilon: f64) -> usize {
    let mut raised = 0;
    let mut queue: VecDeque<(Cell, f64)> = VecDeque::with_capacity(depression.members.len());

    scratch.flooded.mark(depression.exit);
    queue.push_back((depression.exit, depression.exit_elevation));

    while let Some((cell, level)) = queue.pop_front() {
        for dir in 0..8 {
            let Some(n) = grid.neighbor(cell, dir) else {
                continue;
            };
            if !scratch.members.is_marked(n) || scratch.flooded.is_marked(n) {
                continue;
            }
            let z = grid.elevation(n);
            let flooded_z = if z <= level {
                raised += 1;
                level + epsilon
            } else {
                z
            };
            grid.set_elevation(n, flooded_z);
            scratch.flooded.mark(n);
            queue.push_back((n, flooded_z));
        }
    }

    scratch.flooded.unmark(depression.exit);
    scratch.forget(&depression.members);
    raised
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array2, array};

    const ND: f64 = -9999.0;
    const EP: f64 = DEFAULT_EPSILON;

    fn depression(exit: Cell, exit_elevation: f64, members: &[Cell], scratch: &mut Scratch) -> Depression {
        for &m in members {
            scratch.members.mark(m);
        }
        Depression {
            exit,
            exit_elevation,
            members: members.to_vec(),
            enclosed: false,
        }
    }

    #[test]
    fn test_rings_step_up_from_exit() {
        let mut dem: Array2<f64> = array![
            [9.0, 9.0, 9.0, 9.0, 9.0],
            [9.0, 1.0, 1.0, 1.0, 2.0],
            [9.0, 9.0, 9.0, 9.0, 9.0],
        ];
        let mut scratch = Scratch::new(5, 3);
        let members = [Cell::new(1, 1), Cell::new(2, 1), Cell::new(3, 1)];
        let dep = depression(Cell::new(4, 1), 2.0, &members, &mut scratch);
        let mut grid = GridViewMut::new_mut(&mut dem, ND, 1.0, 1.0).unwrap();
        let raised = flood(&mut grid, &dep, &mut scratch, EP);
        assert_eq!(raised, 3);
        let expected = [2.0 + 3.0 * EP, 2.0 + 2.0 * EP, 2.0 + EP];
        for (col, want) in (1..4).zip(expected) {
            assert!((dem[[1, col]] - want).abs() < 1e-12, "col {col}: {}", dem[[1, col]]);
        }
        assert_eq!(dem[[1, 4]], 2.0);
        assert_eq!(scratch.members.count(), 0);
        assert_eq!(scratch.flooded.count(), 0);
    }

    #[test]
    fn test_higher_members_keep_their_elevation() {
        let mut dem: Array2<f64> = array![
            [9.0, 9.0, 9.0, 9.0, 9.0],
            [9.0, 1.0, 5.0, 1.0, 2.0],
            [9.0, 9.0, 9.0, 9.0, 9.0],
        ];
        let mut scratch = Scratch::new(5, 3);
        let members = [Cell::new(1, 1), Cell::new(2, 1), Cell::new(3, 1)];
        let dep = depression(Cell::new(4, 1), 2.0, &members, &mut scratch);
        let mut grid = GridViewMut::new_mut(&mut dem, ND, 1.0, 1.0).unwrap();
        let raised = flood(&mut grid, &dep, &mut scratch, EP);
        assert_eq!(raised, 2);
        assert!((dem[[1, 3]] - (2.0 + EP)).abs() < 1e-12);
        assert_eq!(dem[[1, 2]], 5.0);
        assert!((dem[[1, 1]] - (5.0 + EP)).abs() < 1e-12);
    }

    #[test]
    fn test_non_members_untouched() {
        let mut dem: Array2<f64> = array![
            [9.0, 9.0, 9.0, 9.0],
            [9.0, 1.0, 0.5, 9.0],
            [9.0, 0.0, 9.0, 9.0],
            [9.0, 9.0, 9.0, 9.0],
        ];
        let orig = dem.clone();
        let mut scratch = Scratch::new(4, 4);
        let dep = depression(Cell::new(2, 1), 0.5, &[Cell::new(1, 1)], &mut scratch);
        let mut grid = GridViewMut::new_mut(&mut dem, ND, 1.0, 1.0).unwrap();
        flood(&mut grid, &dep, &mut scratch, EP);
        assert!((dem[[1, 1]] - (0.5 + EP)).abs() < 1e-12);
        for ((idx, z), o) in dem.indexed_iter().zip(orig.iter()) {
            if idx != (1, 1) {
                assert_eq!(z, o);
            }
        }
    }
}
