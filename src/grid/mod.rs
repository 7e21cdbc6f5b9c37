//! Toroidal board and the generation rule.
//!
//! ## Contents
//! - [`Cell`] alive flag plus a consecutive-generations-alive counter
//! - [`Grid`] fixed-size rectangular board whose edges wrap
//! - [`engine`] the pure `next(&Grid) -> Grid` step
//!
//! ```text
//!   (rows-1, cols-1) ┆ (rows-1, 0) ...
//!   ─ ─ ─ ─ ─ ─ ─ ─ ─┼─ ─ ─ ─ ─ ─ ─ ─
//!   (0, cols-1)      ┆ (0, 0) (0, 1) ...      every edge wraps to the opposite one
//! ```

mod board;
mod cell;
pub mod engine;

pub use board::Grid;
pub use cell::Cell;
