//! # Rectangular toroidal board.
//!
//! [`Grid`] stores cells row-major in one vector together with its
//! dimensions, so structural equality (`==`) compares shape and every cell
//! in order. On the wire it is an array of rows, each an array of cells:
//!
//! ```text
//! [[{"alive":true,"age":2},{"alive":false,"age":0}], ...]
//! ```
//!
//! ## Rules
//! - At least one row and one column.
//! - Every row has the same length.
//! - Dimensions never change: [`engine::next`](super::engine::next) returns
//!   a new grid of the same shape.

use serde::{Deserialize, Serialize};

use crate::error::GridError;

use super::Cell;

/// Immutable-per-generation board of [`Cell`]s.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<Cell>>", into = "Vec<Vec<Cell>>")]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Builds a grid from rows, validating shape.
    ///
    /// # Example
    /// ```
    /// use lifevisor::{Cell, Grid, GridError};
    ///
    /// assert_eq!(Grid::new(vec![]), Err(GridError::Empty));
    /// assert_eq!(Grid::new(vec![vec![]]), Err(GridError::Empty));
    ///
    /// let g = Grid::new(vec![vec![Cell::DEAD; 3]; 2]).unwrap();
    /// assert_eq!((g.rows(), g.cols()), (2, 3));
    /// ```
    pub fn new(rows: Vec<Vec<Cell>>) -> Result<Self, GridError> {
        let expected = rows.first().map_or(0, Vec::len);
        if expected == 0 {
            return Err(GridError::Empty);
        }
        if let Some((row, found)) = rows
            .iter()
            .map(Vec::len)
            .enumerate()
            .find(|(_, len)| *len != expected)
        {
            return Err(GridError::Ragged {
                row,
                expected,
                found,
            });
        }

        let n_rows = rows.len();
        let cells = rows.into_iter().flatten().collect();
        Ok(Self {
            rows: n_rows,
            cols: expected,
            cells,
        })
    }

    /// An all-dead grid.
    pub fn dead(rows: usize, cols: usize) -> Result<Self, GridError> {
        if rows == 0 || cols == 0 {
            return Err(GridError::Empty);
        }
        let len = rows
            .checked_mul(cols)
            .ok_or(GridError::TooLarge { rows, cols })?;
        Ok(Self {
            rows,
            cols,
            cells: vec![Cell::DEAD; len],
        })
    }

    /// A grid with newborn cells at `alive` coordinates.
    ///
    /// Any coordinate outside the board is rejected with [`GridError::OutOfBounds`].
    pub fn from_alive(rows: usize, cols: usize, alive: &[(usize, usize)]) -> Result<Self, GridError> {
        let mut grid = Self::dead(rows, cols)?;
        for &(row, col) in alive {
            if row >= rows || col >= cols {
                return Err(GridError::OutOfBounds {
                    row,
                    col,
                    rows,
                    cols,
                });
            }
            grid.cells[row * cols + col] = Cell::BORN;
        }
        Ok(grid)
    }

    /// Assembles a grid from already-validated parts.
    pub(crate) fn from_parts(rows: usize, cols: usize, cells: Vec<Cell>) -> Self {
        debug_assert_eq!(rows * cols, cells.len());
        Self { rows, cols, cells }
    }

    /// Number of rows.
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Cell at `(row, col)`, or `None` when out of range.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<&Cell> {
        if row < self.rows && col < self.cols {
            self.cells.get(row * self.cols + col)
        } else {
            None
        }
    }

    /// Whether the cell at `(row, col)` is alive; out of range reads as dead.
    #[inline]
    pub fn is_alive(&self, row: usize, col: usize) -> bool {
        self.get(row, col).is_some_and(|c| c.alive)
    }

    /// Iterates rows as slices.
    pub fn iter_rows(&self) -> impl ExactSizeIterator<Item = &[Cell]> + '_ {
        self.cells.chunks_exact(self.cols)
    }

    /// Number of live cells.
    pub fn alive_count(&self) -> usize {
        self.cells.iter().filter(|c| c.alive).count()
    }

    /// Coordinates of live cells, row-major.
    pub fn alive_cells(&self) -> Vec<(usize, usize)> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| c.alive)
            .map(|(i, _)| (i / self.cols, i % self.cols))
            .collect()
    }

    /// Copies the board out as nested rows.
    pub fn to_rows(&self) -> Vec<Vec<Cell>> {
        self.iter_rows().map(<[Cell]>::to_vec).collect()
    }

    /// Computes the next generation. See [`engine::next`](super::engine::next).
    #[inline]
    pub fn next_generation(&self) -> Grid {
        super::engine::next(self)
    }
}

impl TryFrom<Vec<Vec<Cell>>> for Grid {
    type Error = GridError;

    fn try_from(rows: Vec<Vec<Cell>>) -> Result<Self, Self::Error> {
        Grid::new(rows)
    }
}

impl From<Grid> for Vec<Vec<Cell>> {
    fn from(grid: Grid) -> Self {
        grid.to_rows()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ragged_rows_are_rejected() {
        let rows = vec![vec![Cell::DEAD; 3], vec![Cell::DEAD; 2]];
        assert_eq!(
            Grid::new(rows),
            Err(GridError::Ragged {
                row: 1,
                expected: 3,
                found: 2
            })
        );
    }

    #[test]
    fn empty_dimensions_are_rejected() {
        assert_eq!(Grid::dead(0, 4), Err(GridError::Empty));
        assert_eq!(Grid::dead(4, 0), Err(GridError::Empty));
        assert_eq!(Grid::from_alive(0, 0, &[(0, 0)]), Err(GridError::Empty));
    }

    #[test]
    fn oversized_dimensions_are_rejected() {
        assert_eq!(
            Grid::dead(usize::MAX, 2),
            Err(GridError::TooLarge {
                rows: usize::MAX,
                cols: 2
            })
        );
    }

    #[test]
    fn out_of_range_coordinates_are_rejected() {
        assert_eq!(
            Grid::from_alive(2, 3, &[(0, 0), (1, 3)]),
            Err(GridError::OutOfBounds {
                row: 1,
                col: 3,
                rows: 2,
                cols: 3
            })
        );
        assert!(Grid::from_alive(2, 3, &[(2, 0)]).is_err());
        assert!(Grid::from_alive(2, 3, &[(1, 2)]).is_ok());
    }

    #[test]
    fn rows_round_trip_preserves_order() {
        let g = Grid::from_alive(2, 3, &[(0, 2), (1, 0)]).unwrap();
        let rows = g.to_rows();
        assert!(rows[0][2].alive);
        assert!(rows[1][0].alive);
        assert!(!rows[0][0].alive);
        assert_eq!(Grid::new(rows).unwrap(), g);
        assert_eq!(g.alive_cells(), vec![(0, 2), (1, 0)]);
    }

    #[test]
    fn equality_is_structural() {
        let a = Grid::from_alive(2, 2, &[(0, 0)]).unwrap();
        let b = Grid::from_alive(2, 2, &[(0, 0)]).unwrap();
        let transposed_shape = Grid::from_alive(1, 4, &[(0, 0)]).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, transposed_shape);

        let mut rows = a.to_rows();
        rows[0][0].age = 1;
        assert_ne!(a, Grid::new(rows).unwrap());
    }

    #[test]
    fn json_shape_is_nested_rows() {
        let g = Grid::from_alive(1, 2, &[(0, 1)]).unwrap();
        let json = serde_json::to_value(&g).unwrap();
        assert_eq!(
            json,
            serde_json::json!([[{"alive": false, "age": 0}, {"alive": true, "age": 0}]])
        );
    }

    #[test]
    fn json_input_is_validated() {
        let ragged = r#"[[{"alive":true,"age":0}],[]]"#;
        assert!(serde_json::from_str::<Grid>(ragged).is_err());
        assert!(serde_json::from_str::<Grid>("[]").is_err());

        let ok = r#"[[{"alive":true,"age":4},{"alive":false}]]"#;
        let g: Grid = serde_json::from_str(ok).unwrap();
        assert_eq!(g.get(0, 0), Some(&Cell { alive: true, age: 4 }));
        assert_eq!(g.get(0, 1), Some(&Cell::DEAD));
        assert_eq!(g.get(1, 0), None);
    }
}
