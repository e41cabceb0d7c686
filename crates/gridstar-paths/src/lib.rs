//! A* pathfinding over the cell grids of `gridstar-core`.
//!
//! A [`Pathfinder`] is bound to a [`GridProvider`] at construction and
//! answers [`Pathfinder::find_path`] queries between world positions:
//!
//! ```
//! use gridstar_core::{Grid, GridConfig, Point, WorldPos};
//! use gridstar_paths::Pathfinder;
//!
//! let mut grid = Grid::build(GridConfig::new(5, 5)).unwrap();
//! grid.set_walkable(Point::new(2, 2), false).unwrap();
//!
//! let mut pf = Pathfinder::new(grid);
//! let outcome = pf.find_path(WorldPos::ground(0.0, 0.0), WorldPos::ground(4.0, 4.0)).unwrap();
//! let path = outcome.path().expect("reachable");
//! assert_eq!(path.last(), Some(Point::new(4, 4)));
//! ```
//!
//! Movement is 8-directional with octile step costs (10 orthogonal, 14
//! diagonal). The open set is a binary heap ordered by `f`, then `h`, then
//! discovery order, so a fixed grid and fixed endpoints always produce the
//! same path.
//!
//! # Outcomes
//!
//! | Result | Meaning |
//! |---|---|
//! | `Ok(SearchOutcome::Found(path))` | target reached |
//! | `Ok(SearchOutcome::Unreachable { .. })` | no walkable route exists |
//! | `Ok(SearchOutcome::BudgetExceeded { .. })` | [`SearchOptions::max_expansions`] ran out |
//! | `Err(PathError)` | setup problem, no search was attempted |

mod astar;
mod distance;
mod neighbors;
mod options;
mod path;
mod pathfinder;
mod traits;

pub use distance::{DIAGONAL_COST, ORTHOGONAL_COST, chebyshev, octile};
pub use neighbors::Neighbors;
pub use options::{Diagonals, SearchOptions};
pub use path::{Path, PathError, PathRequest, SearchOutcome};
pub use pathfinder::Pathfinder;
pub use traits::{GridProvider, Walkability};
