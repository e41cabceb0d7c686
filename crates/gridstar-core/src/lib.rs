//! **gridstar-core** — grid data model for the *gridstar* pathfinder.
//!
//! This crate provides the geometry primitives ([`Point`], [`Range`],
//! [`WorldPos`]) and the [`Grid`] arena of [`Node`]s that searches run on.
//! It knows nothing about the search itself.

pub mod geom;
pub mod grid;

pub use geom::{Point, Range, RangeIter, WorldPos};
pub use grid::{Grid, GridConfig, GridError, Node};
