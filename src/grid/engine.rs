//! # Generation engine.
//!
//! [`next`] is pure: it reads the current [`Grid`] and allocates a new one of
//! identical shape. Callers detect convergence by comparing the two.
//!
//! Neighbour lookup wraps with Euclidean remainder so that offset `-1` on
//! row/column 0 lands on the last row/column.

use super::{Cell, Grid};

const OFFSETS: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Computes the next generation of `grid`.
///
/// # Example
/// ```
/// use lifevisor::{Grid, grid::engine};
///
/// let lonely = Grid::from_alive(3, 3, &[(1, 1)]).unwrap();
/// let next = engine::next(&lonely);
/// assert_eq!(next.alive_count(), 0);
/// assert_eq!(lonely.alive_count(), 1);
/// ```
pub fn next(grid: &Grid) -> Grid {
    let (rows, cols) = (grid.rows(), grid.cols());
    let mut cells = Vec::with_capacity(rows * cols);

    for (r, row) in grid.iter_rows().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            cells.push(cell.step(live_neighbors(grid, r, c)));
        }
    }
    Grid::from_parts(rows, cols, cells)
}

/// Counts live cells in the Moore neighbourhood of `(row, col)` on the torus.
///
/// On boards narrower than 3 in a dimension the same physical cell can be
/// reached through more than one offset; each offset is counted.
pub fn live_neighbors(grid: &Grid, row: usize, col: usize) -> u8 {
    let rows = grid.rows() as isize;
    let cols = grid.cols() as isize;

    OFFSETS
        .iter()
        .filter(|(dr, dc)| {
            let r = (row as isize + dr).rem_euclid(rows) as usize;
            let c = (col as isize + dc).rem_euclid(cols) as usize;
            grid.get(r, c).is_some_and(|cell: &Cell| cell.alive)
        })
        .count() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: usize, cols: usize, alive: &[(usize, usize)]) -> Grid {
        Grid::from_alive(rows, cols, alive).unwrap()
    }

    #[test]
    fn preserves_dimensions() {
        for (rows, cols) in [(1, 1), (1, 7), (3, 3), (4, 9), (10, 2)] {
            let g = grid(rows, cols, &[(0, 0)]);
            let next = next(&g);
            assert_eq!((next.rows(), next.cols()), (rows, cols));
            assert!(next.iter_rows().all(|row| row.len() == cols));
        }
    }

    #[test]
    fn lone_cell_dies() {
        let g = grid(5, 5, &[(2, 2)]);
        assert!(!next(&g).is_alive(2, 2));
    }

    #[test]
    fn crowded_cell_dies() {
        // centre has 4 live neighbours
        let g = grid(5, 5, &[(2, 2), (1, 1), (1, 3), (3, 1), (3, 3)]);
        assert_eq!(live_neighbors(&g, 2, 2), 4);
        assert!(!next(&g).is_alive(2, 2));
    }

    #[test]
    fn all_alive_collapses() {
        let all: Vec<_> = (0..3).flat_map(|r| (0..3).map(move |c| (r, c))).collect();
        let next = next(&grid(3, 3, &all));
        assert_eq!(next.alive_count(), 0);
    }

    #[test]
    fn three_neighbours_give_birth_with_age_zero() {
        let mut rows = grid(5, 5, &[(1, 1), (1, 2), (2, 1)]).to_rows();
        rows[2][2].age = 5;
        let g = Grid::new(rows).unwrap();

        let next = next(&g);
        assert_eq!(next.get(2, 2), Some(&Cell::BORN));
    }

    #[test]
    fn block_is_stable_and_ages() {
        let block = [(1, 1), (1, 2), (2, 1), (2, 2)];
        let g = grid(4, 4, &block);
        let gen1 = next(&g);
        let gen2 = next(&gen1);

        assert_eq!(gen1.alive_cells(), block.to_vec());
        for &(r, c) in &block {
            assert_eq!(gen1.get(r, c).map(|c| c.age), Some(1));
            assert_eq!(gen2.get(r, c).map(|c| c.age), Some(2));
        }
        assert_ne!(g, gen1, "ages differ, so the grids are not equal");
    }

    #[test]
    fn blinker_oscillates() {
        let horizontal = grid(5, 5, &[(2, 1), (2, 2), (2, 3)]);
        let vertical = next(&horizontal);
        assert_eq!(vertical.alive_cells(), vec![(1, 2), (2, 2), (3, 2)]);

        let back = next(&vertical);
        assert_eq!(back.alive_cells(), horizontal.alive_cells());
    }

    #[test]
    fn neighbours_wrap_across_corners() {
        // (0,0) sees (4,4), (4,0) and (0,4) only through wraparound
        let g = grid(5, 5, &[(4, 4), (4, 0), (0, 4)]);
        assert_eq!(live_neighbors(&g, 0, 0), 3);
        assert!(next(&g).is_alive(0, 0));
    }

    #[test]
    fn corners_are_adjacent_on_small_torus() {
        let g = grid(3, 3, &[(2, 2)]);
        assert_eq!(live_neighbors(&g, 0, 0), 1);

        let g = grid(3, 3, &[(0, 0), (0, 2), (2, 0), (2, 2)]);
        assert_eq!(live_neighbors(&g, 1, 1), 4);
        assert!(!next(&g).is_alive(1, 1));
    }

    #[test]
    fn input_is_not_mutated() {
        let g = grid(4, 4, &[(0, 0), (0, 1), (1, 0)]);
        let before = g.clone();
        let _ = next(&g);
        assert_eq!(g, before);
    }

    #[test]
    fn empty_board_is_a_fixed_point() {
        let g = Grid::dead(6, 6).unwrap();
        assert_eq!(next(&g), g);
    }
}
