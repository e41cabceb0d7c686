use std::sync::Arc;

use gridstar_core::{Grid, Point, Range, WorldPos};

/// Walkability source — tells whether a cell can be stepped on.
pub trait Walkability {
    /// Whether `p` is traversable. Called only for in-range cells.
    fn is_walkable(&self, p: Point) -> bool;
}

/// Grid provider — extents and world↔grid conversion.
pub trait GridProvider: Walkability {
    /// Number of cells along X. Non-positive means the grid is not built.
    fn width(&self) -> i32;

    /// Number of cells along Y. Non-positive means the grid is not built.
    fn height(&self) -> i32;

    /// Cell nearest to `pos`, clamped into the grid. Must never fail.
    fn cell_at_world(&self, pos: WorldPos) -> Point;

    /// World position of the center of cell `p`.
    fn cell_to_world(&self, p: Point) -> WorldPos;

    /// The range of valid cells.
    fn bounds(&self) -> Range {
        Range::with_size(self.width(), self.height())
    }
}

impl Walkability for Grid {
    #[inline]
    fn is_walkable(&self, p: Point) -> bool {
        Grid::is_walkable(self, p)
    }
}

impl GridProvider for Grid {
    #[inline]
    fn width(&self) -> i32 {
        Grid::width(self)
    }

    #[inline]
    fn height(&self) -> i32 {
        Grid::height(self)
    }

    #[inline]
    fn cell_at_world(&self, pos: WorldPos) -> Point {
        self.world_to_cell(pos)
    }

    #[inline]
    fn cell_to_world(&self, p: Point) -> WorldPos {
        Grid::cell_to_world(self, p)
    }

    #[inline]
    fn bounds(&self) -> Range {
        Grid::bounds(self)
    }
}

macro_rules! forward_provider {
    ($($ty:ty),*) => {$(
        impl<T: Walkability + ?Sized> Walkability for $ty {
            #[inline]
            fn is_walkable(&self, p: Point) -> bool {
                (**self).is_walkable(p)
            }
        }

        impl<T: GridProvider + ?Sized> GridProvider for $ty {
            #[inline]
            fn width(&self) -> i32 {
                (**self).width()
            }

            #[inline]
            fn height(&self) -> i32 {
                (**self).height()
            }

            #[inline]
            fn cell_at_world(&self, pos: WorldPos) -> Point {
                (**self).cell_at_world(pos)
            }

            #[inline]
            fn cell_to_world(&self, p: Point) -> WorldPos {
                (**self).cell_to_world(p)
            }

            #[inline]
            fn bounds(&self) -> Range {
                (**self).bounds()
            }
        }
    )*};
}

forward_provider!(&T, &mut T, Box<T>, Arc<T>);
