//! The cell arena: [`Node`], [`Grid`] and its [`GridConfig`].
//!
//! A [`Grid`] owns `width × height` nodes in a flat row-major buffer and
//! converts between world space and grid space. It is built once and never
//! changes shape; only the walkable flag of individual nodes may be updated
//! between searches.

use std::fmt;

use crate::geom::{Point, Range, WorldPos};

/// One grid cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    world: WorldPos,
    pos: Point,
    walkable: bool,
}

impl Node {
    fn new(world: WorldPos, pos: Point) -> Self {
        Self {
            world,
            pos,
            walkable: true,
        }
    }

    /// World-space position of the cell center.
    #[inline]
    pub fn world_pos(&self) -> WorldPos {
        self.world
    }

    /// Grid coordinates of the cell.
    #[inline]
    pub fn pos(&self) -> Point {
        self.pos
    }

    /// Whether searches may route through this cell.
    #[inline]
    pub fn is_walkable(&self) -> bool {
        self.walkable
    }

    /// Mark the cell as open (`true`) or blocked.
    #[inline]
    pub fn set_walkable(&mut self, walkable: bool) {
        self.walkable = walkable;
    }
}

/// Parameters for [`Grid::build`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GridConfig {
    /// Number of cells along X.
    pub width: i32,
    /// Number of cells along Z.
    pub height: i32,
    /// Distance between the centers of two orthogonally adjacent cells.
    pub node_radius: f32,
    /// World position of cell (0, 0).
    pub origin: WorldPos,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: 200,
            height: 200,
            node_radius: 2.0,
            origin: WorldPos::ZERO,
        }
    }
}

impl GridConfig {
    /// A `width × height` grid with unit spacing anchored at the world origin.
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            node_radius: 1.0,
            origin: WorldPos::ZERO,
        }
    }

    /// Replace the cell spacing.
    pub fn with_node_radius(mut self, node_radius: f32) -> Self {
        self.node_radius = node_radius;
        self
    }

    /// Replace the world position of cell (0, 0).
    pub fn with_origin(mut self, origin: WorldPos) -> Self {
        self.origin = origin;
        self
    }
}

/// A fixed-size 2D arena of [`Node`]s.
#[derive(Debug, Clone)]
pub struct Grid {
    nodes: Vec<Node>,
    bounds: Range,
    node_radius: f32,
    origin: WorldPos,
}

impl Grid {
    /// Allocate every cell of the grid described by `cfg`.
    ///
    /// Cell (x, y) is placed at `origin + (x·radius, 0, y·radius)`.
    pub fn build(cfg: GridConfig) -> Result<Self, GridError> {
        if cfg.width <= 0 || cfg.height <= 0 {
            return Err(GridError::InvalidDimensions {
                width: cfg.width,
                height: cfg.height,
            });
        }
        if !(cfg.node_radius.is_finite() && cfg.node_radius > 0.0) {
            return Err(GridError::InvalidNodeRadius(cfg.node_radius));
        }

        let bounds = Range::with_size(cfg.width, cfg.height);
        let mut nodes = Vec::with_capacity(bounds.len());
        for p in bounds {
            let offset = WorldPos::new(p.x as f32, 0.0, p.y as f32) * cfg.node_radius;
            nodes.push(Node::new(cfg.origin + offset, p));
        }

        log::debug!(
            "grid built: {}x{} cells, radius {}, origin {}",
            cfg.width,
            cfg.height,
            cfg.node_radius,
            cfg.origin
        );

        Ok(Self {
            nodes,
            bounds,
            node_radius: cfg.node_radius,
            origin: cfg.origin,
        })
    }

    /// Number of cells along X.
    #[inline]
    pub fn width(&self) -> i32 {
        self.bounds.width()
    }

    /// Number of cells along Z.
    #[inline]
    pub fn height(&self) -> i32 {
        self.bounds.height()
    }

    /// The range of valid grid coordinates.
    #[inline]
    pub fn bounds(&self) -> Range {
        self.bounds
    }

    /// Distance between adjacent cell centers.
    #[inline]
    pub fn node_radius(&self) -> f32 {
        self.node_radius
    }

    /// World position of cell (0, 0).
    #[inline]
    pub fn origin(&self) -> WorldPos {
        self.origin
    }

    /// Number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The configuration this grid was built from.
    pub fn config(&self) -> GridConfig {
        GridConfig {
            width: self.width(),
            height: self.height(),
            node_radius: self.node_radius,
            origin: self.origin,
        }
    }

    #[inline]
    fn index(&self, p: Point) -> Option<usize> {
        if !self.bounds.contains(p) {
            return None;
        }
        Some(self.offset(p))
    }

    /// Row-major offset of an in-bounds `p`.
    #[inline]
    fn offset(&self, p: Point) -> usize {
        p.y as usize * self.width() as usize + p.x as usize
    }

    /// Grid coordinates of the cell nearest to `pos`.
    ///
    /// Uses round-half-to-even on the X and Z offsets from the origin, then
    /// clamps each axis into the grid. Positions outside the grid therefore
    /// resolve to the nearest edge cell; use [`Grid::contains_world`] to
    /// detect them.
    pub fn world_to_cell(&self, pos: WorldPos) -> Point {
        let x = ((pos.x - self.origin.x) / self.node_radius).round_ties_even() as i32;
        let y = ((pos.z - self.origin.z) / self.node_radius).round_ties_even() as i32;
        self.bounds.clamp(Point::new(x, y))
    }

    /// Whether `pos` resolves to a cell without clamping.
    pub fn contains_world(&self, pos: WorldPos) -> bool {
        let fx = ((pos.x - self.origin.x) / self.node_radius).round_ties_even();
        let fy = ((pos.z - self.origin.z) / self.node_radius).round_ties_even();
        if !(fx.is_finite() && fy.is_finite()) {
            return false;
        }
        self.bounds.contains(Point::new(fx as i32, fy as i32))
    }

    /// World position of the center of cell `p`. Defined for any `p`,
    /// including coordinates outside the grid.
    pub fn cell_to_world(&self, p: Point) -> WorldPos {
        self.origin + WorldPos::new(p.x as f32, 0.0, p.y as f32) * self.node_radius
    }

    /// The node nearest to `pos`. Never fails; see [`Grid::world_to_cell`].
    pub fn node_at_world(&self, pos: WorldPos) -> &Node {
        let p = self.world_to_cell(pos);
        // world_to_cell always yields an in-bounds point.
        &self.nodes[self.offset(p)]
    }

    /// The node at grid coordinates `p`, or `None` if `p` is out of range.
    #[inline]
    pub fn node(&self, p: Point) -> Option<&Node> {
        self.index(p).map(|i| &self.nodes[i])
    }

    /// Mutable access to the node at `p`, or `None` if `p` is out of range.
    #[inline]
    pub fn node_mut(&mut self, p: Point) -> Option<&mut Node> {
        self.index(p).map(|i| &mut self.nodes[i])
    }

    /// Whether cell `p` can be stepped on. Out-of-range cells are not.
    #[inline]
    pub fn is_walkable(&self, p: Point) -> bool {
        self.node(p).is_some_and(Node::is_walkable)
    }

    /// Update the walkable flag of cell `p`.
    pub fn set_walkable(&mut self, p: Point, walkable: bool) -> Result<(), GridError> {
        let node = self.node_mut(p).ok_or(GridError::OutOfRange(p))?;
        node.set_walkable(walkable);
        Ok(())
    }

    /// Mark every cell of `cells` as blocked.
    pub fn block_all(&mut self, cells: impl IntoIterator<Item = Point>) -> Result<(), GridError> {
        for p in cells {
            self.set_walkable(p, false)?;
        }
        Ok(())
    }

    /// All nodes in row-major order.
    #[inline]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Row-major iterator over all nodes.
    pub fn iter(&self) -> std::slice::Iter<'_, Node> {
        self.nodes.iter()
    }
}

impl<'a> IntoIterator for &'a Grid {
    type Item = &'a Node;
    type IntoIter = std::slice::Iter<'a, Node>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Errors reported by [`Grid`] construction and updates.
#[derive(Debug, Clone, PartialEq)]
pub enum GridError {
    /// Width or height is not positive.
    InvalidDimensions { width: i32, height: i32 },
    /// Node radius is not a positive finite number.
    InvalidNodeRadius(f32),
    /// A grid coordinate lies outside the grid.
    OutOfRange(Point),
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDimensions { width, height } => {
                write!(f, "grid dimensions must be positive, got {width}x{height}")
            }
            Self::InvalidNodeRadius(r) => {
                write!(f, "node radius must be positive and finite, got {r}")
            }
            Self::OutOfRange(p) => write!(f, "cell {p} is outside the grid"),
        }
    }
}

impl std::error::Error for GridError {}
