use std::fmt;

use gridstar_core::{Grid, Node, Point, WorldPos};

use crate::distance::chebyshev;
use crate::traits::GridProvider;

/// A route found by [`Pathfinder`](crate::Pathfinder).
///
/// `steps` runs from the first cell after the start to the target,
/// inclusive. The start cell itself is not part of the path, so a path
/// whose start and target coincide is empty.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Path {
    pub(crate) steps: Vec<Point>,
    pub(crate) cost: i32,
    pub(crate) expanded: usize,
}

impl Path {
    /// Cells to walk through, in order.
    #[inline]
    pub fn steps(&self) -> &[Point] {
        &self.steps
    }

    /// Sum of the step costs along the path.
    #[inline]
    pub fn cost(&self) -> i32 {
        self.cost
    }

    /// Number of cells whose neighbors the search examined. The target
    /// itself is not counted.
    #[inline]
    pub fn expanded(&self) -> usize {
        self.expanded
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// The final cell, or `None` for an empty path.
    #[inline]
    pub fn last(&self) -> Option<Point> {
        self.steps.last().copied()
    }

    /// Whether every step is adjacent to the one before it, starting from
    /// `start`.
    pub fn is_contiguous_from(&self, start: Point) -> bool {
        let mut prev = start;
        for &p in &self.steps {
            if chebyshev(prev, p) != 1 {
                return false;
            }
            prev = p;
        }
        true
    }

    /// World positions of the step cells.
    pub fn world_positions<G: GridProvider + ?Sized>(&self, grid: &G) -> Vec<WorldPos> {
        self.steps.iter().map(|&p| grid.cell_to_world(p)).collect()
    }

    /// Nodes of `grid` along the path. Cells outside `grid` are skipped.
    ///
    /// Takes a concrete [`Grid`] since [`GridProvider`] only exposes
    /// coordinates, not node storage.
    pub fn nodes<'g>(&self, grid: &'g Grid) -> impl Iterator<Item = &'g Node> {
        self.steps.iter().filter_map(move |&p| grid.node(p))
    }

    /// Take the cells out of the path.
    pub fn into_steps(self) -> Vec<Point> {
        self.steps
    }
}

/// Result of a search that ran.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SearchOutcome {
    /// The target was reached.
    Found(Path),
    /// The open set ran dry: no walkable route exists.
    Unreachable { expanded: usize },
    /// The expansion budget ran out before the target was reached.
    BudgetExceeded { expanded: usize },
}

impl SearchOutcome {
    #[inline]
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    #[inline]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Found(path) => Some(path),
            _ => None,
        }
    }

    #[inline]
    pub fn into_path(self) -> Option<Path> {
        match self {
            Self::Found(path) => Some(path),
            _ => None,
        }
    }

    /// Number of cells expanded by the search.
    pub fn expanded(&self) -> usize {
        match self {
            Self::Found(path) => path.expanded,
            Self::Unreachable { expanded } | Self::BudgetExceeded { expanded } => *expanded,
        }
    }
}

/// A search request whose endpoints may not have been assigned yet.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathRequest {
    pub start: Option<WorldPos>,
    pub target: Option<WorldPos>,
}

impl PathRequest {
    /// A request with both endpoints set.
    pub fn new(start: WorldPos, target: WorldPos) -> Self {
        Self {
            start: Some(start),
            target: Some(target),
        }
    }

    /// Set the start position.
    pub fn with_start(mut self, start: WorldPos) -> Self {
        self.start = Some(start);
        self
    }

    /// Set the target position.
    pub fn with_target(mut self, target: WorldPos) -> Self {
        self.target = Some(target);
        self
    }
}

/// Setup problems that prevent a search from running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathError {
    /// The grid provider has no cells.
    GridNotBuilt,
    /// The request has no start position.
    MissingStart,
    /// The request has no target position.
    MissingTarget,
    /// A grid-coordinate endpoint lies outside the grid.
    OutOfRange(Point),
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GridNotBuilt => write!(f, "grid has not been built"),
            Self::MissingStart => write!(f, "start position is missing"),
            Self::MissingTarget => write!(f, "target position is missing"),
            Self::OutOfRange(p) => write!(f, "cell {p} is outside the grid"),
        }
    }
}

impl std::error::Error for PathError {}
