use std::cmp::Ordering;
use std::collections::BinaryHeap;

use gridstar_core::{Point, Range};

use crate::neighbors::Neighbors;
use crate::options::SearchOptions;
use crate::traits::GridProvider;

/// Sentinel parent index meaning "no parent".
pub(crate) const NO_PARENT: usize = usize::MAX;

// ---------------------------------------------------------------------------
// Per-search scratch
// ---------------------------------------------------------------------------

/// Search bookkeeping for one cell. Only meaningful when `generation`
/// matches the current search; otherwise the cell is unseen.
#[derive(Clone)]
pub(crate) struct ScratchNode {
    pub(crate) g: i32,
    pub(crate) h: i32,
    pub(crate) parent: usize,
    pub(crate) generation: u32,
    pub(crate) open: bool,
    pub(crate) closed: bool,
}

impl Default for ScratchNode {
    fn default() -> Self {
        Self {
            g: 0,
            h: 0,
            parent: NO_PARENT,
            generation: 0,
            open: false,
            closed: false,
        }
    }
}

impl ScratchNode {
    #[inline]
    pub(crate) fn f(&self) -> i32 {
        self.g + self.h
    }
}

/// Open-set entry, ordered for `BinaryHeap` so that the lowest `f` pops
/// first, then the lowest `h`, then the earliest pushed.
#[derive(Clone, Copy, Eq, PartialEq)]
pub(crate) struct OpenEntry {
    pub(crate) idx: usize,
    pub(crate) f: i32,
    pub(crate) h: i32,
    pub(crate) seq: u64,
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap.
        other
            .f
            .cmp(&self.f)
            .then_with(|| other.h.cmp(&self.h))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Side table of [`ScratchNode`]s plus the open set, reused across
/// searches. Bumping the generation invalidates every entry at once.
pub(crate) struct Scratch {
    pub(crate) nodes: Vec<ScratchNode>,
    pub(crate) generation: u32,
    pub(crate) open: BinaryHeap<OpenEntry>,
    pub(crate) seq: u64,
    /// Cells closed by the current search, in expansion order.
    pub(crate) closed: Vec<usize>,
    pub(crate) bounds: Range,
}

impl Scratch {
    fn new() -> Self {
        Self {
            nodes: Vec::new(),
            generation: 0,
            open: BinaryHeap::new(),
            seq: 0,
            closed: Vec::new(),
            bounds: Range::default(),
        }
    }

    /// Prepare for a search over `bounds`.
    pub(crate) fn begin(&mut self, bounds: Range) {
        let len = bounds.len();
        if self.nodes.len() < len {
            self.nodes.clear();
            self.nodes.resize(len, ScratchNode::default());
            self.generation = 0;
        }
        self.generation = self.generation.wrapping_add(1);
        if self.generation == 0 {
            // Wrapped: stale stamps could now look current.
            self.nodes.fill(ScratchNode::default());
            self.generation = 1;
        }
        self.bounds = bounds;
        self.open.clear();
        self.seq = 0;
        self.closed.clear();
    }

    /// Flat index of `p`, or `None` if out of range.
    #[inline]
    pub(crate) fn idx(&self, p: Point) -> Option<usize> {
        if !self.bounds.contains(p) {
            return None;
        }
        let x = (p.x - self.bounds.min.x) as usize;
        let y = (p.y - self.bounds.min.y) as usize;
        Some(y * self.bounds.width() as usize + x)
    }

    #[inline]
    pub(crate) fn point(&self, idx: usize) -> Point {
        let w = self.bounds.width() as usize;
        Point::new(
            (idx % w) as i32 + self.bounds.min.x,
            (idx / w) as i32 + self.bounds.min.y,
        )
    }

    /// Scratch entry for `idx`, reset first if it belongs to an older search.
    #[inline]
    pub(crate) fn node_mut(&mut self, idx: usize) -> &mut ScratchNode {
        let generation = self.generation;
        let n = &mut self.nodes[idx];
        if n.generation != generation {
            *n = ScratchNode {
                generation,
                ..ScratchNode::default()
            };
        }
        n
    }

    #[inline]
    pub(crate) fn is_closed(&self, idx: usize) -> bool {
        let n = &self.nodes[idx];
        n.generation == self.generation && n.closed
    }

    /// Put `idx` in the open set with the given costs.
    pub(crate) fn push_open(&mut self, idx: usize, g: i32, h: i32, parent: usize) {
        let n = self.node_mut(idx);
        n.g = g;
        n.h = h;
        n.parent = parent;
        n.open = true;
        let seq = self.seq;
        self.seq += 1;
        self.open.push(OpenEntry {
            idx,
            f: g + h,
            h,
            seq,
        });
    }

    /// Offer a route to `idx` costing `tentative_g`, coming from `parent`.
    ///
    /// A cell that is not yet open is always accepted. A cell that is
    /// already open is updated only when the new route is strictly cheaper;
    /// ties keep the parent that discovered it first. Returns whether the
    /// cell was updated.
    pub(crate) fn relax(&mut self, idx: usize, tentative_g: i32, h: i32, parent: usize) -> bool {
        let n = self.node_mut(idx);
        if n.closed || (n.open && tentative_g >= n.g) {
            return false;
        }
        self.push_open(idx, tentative_g, h, parent);
        true
    }

    /// Pop the best live open entry and close it.
    pub(crate) fn pop_best(&mut self) -> Option<usize> {
        while let Some(entry) = self.open.pop() {
            let generation = self.generation;
            let n = &mut self.nodes[entry.idx];
            // Entries superseded by a cheaper push are stale.
            if n.generation != generation || n.closed || n.f() != entry.f {
                continue;
            }
            n.open = false;
            n.closed = true;
            self.closed.push(entry.idx);
            return Some(entry.idx);
        }
        None
    }
}

// ---------------------------------------------------------------------------
// Pathfinder
// ---------------------------------------------------------------------------

/// A* pathfinder bound to a grid provider.
///
/// The provider is injected at construction; `G` may be an owned
/// [`Grid`](gridstar_core::Grid), a reference, or an `Arc`. Each
/// `Pathfinder` owns its own scratch table, so several pathfinders can
/// search one shared grid at the same time, and repeated searches on the
/// same grid incur no allocations after warm-up.
pub struct Pathfinder<G> {
    pub(crate) grid: G,
    pub(crate) options: SearchOptions,
    pub(crate) scratch: Scratch,
    pub(crate) nbuf: Neighbors,
}

impl<G: GridProvider> Pathfinder<G> {
    /// Create a pathfinder over `grid` with default options.
    pub fn new(grid: G) -> Self {
        Self::with_options(grid, SearchOptions::default())
    }

    /// Create a pathfinder over `grid` with the given options.
    pub fn with_options(grid: G, options: SearchOptions) -> Self {
        Self {
            grid,
            options,
            scratch: Scratch::new(),
            nbuf: Neighbors::new(),
        }
    }

    #[inline]
    pub fn grid(&self) -> &G {
        &self.grid
    }

    /// Mutable access to the grid, e.g. to update walkability between
    /// searches.
    #[inline]
    pub fn grid_mut(&mut self) -> &mut G {
        &mut self.grid
    }

    /// Give the grid back, dropping the scratch state.
    pub fn into_grid(self) -> G {
        self.grid
    }

    #[inline]
    pub fn options(&self) -> SearchOptions {
        self.options
    }

    /// Options for subsequent searches.
    pub fn set_options(&mut self, options: SearchOptions) {
        self.options = options;
    }

    /// Cells taken off the open set by the most recent search, in order.
    /// Unlike [`SearchOutcome::expanded`](crate::SearchOutcome::expanded),
    /// this includes the target and a cell popped when the budget ran out.
    pub fn expanded_cells(&self) -> impl Iterator<Item = Point> + '_ {
        self.scratch.closed.iter().map(|&i| self.scratch.point(i))
    }
}
