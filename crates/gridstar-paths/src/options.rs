//! Search configuration.

use gridstar_core::Point;

/// When a diagonal step between two cells is allowed.
///
/// A diagonal step from `a` to `b` passes between two orthogonally adjacent
/// "corner" cells, `(b.x, a.y)` and `(a.x, b.y)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Diagonals {
    /// Diagonal steps ignore the corner cells.
    #[default]
    Always,
    /// Forbid squeezing between two blocked corner cells.
    UnlessBothBlocked,
    /// Forbid cutting past any blocked corner cell.
    UnlessAnyBlocked,
}

impl Diagonals {
    /// Whether the step `from → to` is allowed, given a walkability test for
    /// the corner cells. Orthogonal steps are always allowed.
    pub fn permits(self, from: Point, to: Point, walkable: impl Fn(Point) -> bool) -> bool {
        if from.x == to.x || from.y == to.y {
            return true;
        }
        match self {
            Self::Always => true,
            Self::UnlessBothBlocked => {
                walkable(Point::new(to.x, from.y)) || walkable(Point::new(from.x, to.y))
            }
            Self::UnlessAnyBlocked => {
                walkable(Point::new(to.x, from.y)) && walkable(Point::new(from.x, to.y))
            }
        }
    }
}

/// Options for [`Pathfinder`](crate::Pathfinder) searches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SearchOptions {
    /// Stop once this many cells have had their neighbors examined and
    /// report
    /// [`SearchOutcome::BudgetExceeded`](crate::SearchOutcome::BudgetExceeded).
    /// `None` searches until the open set is exhausted.
    pub max_expansions: Option<usize>,
    /// Diagonal movement rule.
    pub diagonals: Diagonals,
}

impl SearchOptions {
    /// Cap the number of expanded cells.
    pub fn with_max_expansions(mut self, max: usize) -> Self {
        self.max_expansions = Some(max);
        self
    }

    /// Replace the diagonal movement rule.
    pub fn with_diagonals(mut self, diagonals: Diagonals) -> Self {
        self.diagonals = diagonals;
        self
    }
}


#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use super::*;

    #[test]
    fn options_from_json() {
        let opts: SearchOptions =
            serde_json::from_str(r#"{"max_expansions": 50, "diagonals": "unless_any_blocked"}"#)
                .unwrap();
        assert_eq!(opts.max_expansions, Some(50));
        assert_eq!(opts.diagonals, Diagonals::UnlessAnyBlocked);

        let opts: SearchOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(opts, SearchOptions::default());
    }
}
