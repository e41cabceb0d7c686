use gridstar_core::{Point, Range};

use crate::options::Diagonals;
use crate::traits::Walkability;

/// Cached neighbor computation helper.
///
/// Enumerates the up-to-eight cells around a point that lie inside a
/// [`Range`], in a fixed order: `dx` outer, `dy` inner, each over −1..=1.
/// That order determines which of several equally good candidates a search
/// discovers first.
pub struct Neighbors {
    buf: Vec<Point>,
}

impl Default for Neighbors {
    fn default() -> Self {
        Self::new()
    }
}

impl Neighbors {
    /// Create a new `Neighbors` helper.
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(8),
        }
    }

    /// Return the in-range 8-directional neighbors of `p`.
    pub fn all(&mut self, p: Point, bounds: Range) -> &[Point] {
        self.buf.clear();
        for dx in -1..=1 {
            for dy in -1..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let n = p.shift(dx, dy);
                if bounds.contains(n) {
                    self.buf.push(n);
                }
            }
        }
        &self.buf
    }

    /// Return the in-range neighbors of `p` that can be stepped onto from
    /// `p`: walkable, and for diagonal moves also allowed by `diagonals`.
    pub fn walkable<W: Walkability + ?Sized>(
        &mut self,
        p: Point,
        bounds: Range,
        walk: &W,
        diagonals: Diagonals,
    ) -> &[Point] {
        self.all(p, bounds);
        self.buf
            .retain(|&n| walk.is_walkable(n) && diagonals.permits(p, n, |c| walk.is_walkable(c)));
        &self.buf
    }
}
