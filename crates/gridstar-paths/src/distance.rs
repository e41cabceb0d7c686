use gridstar_core::Point;

/// Cost of a horizontal or vertical step.
pub const ORTHOGONAL_COST: i32 = 10;

/// Cost of a diagonal step (√2 · 10, rounded).
pub const DIAGONAL_COST: i32 = 14;

/// Octile distance between two cells: the cost of the cheapest
/// 8-directional route on an obstacle-free grid.
///
/// Used both as the step cost between adjacent cells and as the A*
/// heuristic; it never overestimates, so the heuristic is admissible and
/// consistent.
#[inline]
pub fn octile(a: Point, b: Point) -> i32 {
    let dx = (a.x - b.x).abs();
    let dy = (a.y - b.y).abs();
    let diag = dx.min(dy);
    DIAGONAL_COST * diag + ORTHOGONAL_COST * (dx.max(dy) - diag)
}

/// Chebyshev (L∞) distance between two points.
#[inline]
pub fn chebyshev(a: Point, b: Point) -> i32 {
    (a.x - b.x).abs().max((a.y - b.y).abs())
}
