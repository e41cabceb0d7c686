//! Scenario runner shared by the `gridstar` demo binary.
//!
//! A [`Scenario`] describes a grid, its blocked cells, two endpoints and
//! search options. Scenarios are loaded from JSON or taken from
//! [`builtin`], run through a [`Pathfinder`], and the resulting path is
//! written to the log.

use std::fmt;
use std::path::Path as FsPath;

use gridstar_core::{Grid, GridConfig, GridError, Point, WorldPos};
use gridstar_paths::{PathError, PathRequest, Pathfinder, SearchOptions, SearchOutcome};
use serde::{Deserialize, Serialize};

/// A self-contained pathfinding setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub grid: GridConfig,
    /// Cells marked non-walkable after the grid is built.
    #[serde(default)]
    pub blocked: Vec<Point>,
    pub start: Option<WorldPos>,
    pub target: Option<WorldPos>,
    #[serde(default)]
    pub options: SearchOptions,
}

impl Scenario {
    pub fn from_json(text: &str) -> Result<Self, ScenarioError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: impl AsRef<FsPath>) -> Result<Self, ScenarioError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Build the grid and apply the blocked cells.
    pub fn build_grid(&self) -> Result<Grid, ScenarioError> {
        let mut grid = Grid::build(self.grid)?;
        grid.block_all(self.blocked.iter().copied())?;
        Ok(grid)
    }

    pub fn run(&self) -> Result<Report, ScenarioError> {
        let grid = self.build_grid()?;
        let mut pf = Pathfinder::with_options(grid, self.options);
        let request = PathRequest {
            start: self.start,
            target: self.target,
        };
        let outcome = pf.run(&request)?;
        let waypoints = outcome
            .path()
            .map(|p| p.world_positions(pf.grid()))
            .unwrap_or_default();
        Ok(Report {
            name: self.name.clone(),
            outcome,
            waypoints,
        })
    }
}

/// What a scenario run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub name: String,
    pub outcome: SearchOutcome,
    /// World positions of the path cells; empty unless a path was found.
    pub waypoints: Vec<WorldPos>,
}

impl Report {
    /// Write the outcome and every path node to the log.
    pub fn log(&self) {
        match &self.outcome {
            SearchOutcome::Found(path) => {
                log::info!(
                    "[{}] path found: {} steps, cost {}, {} cells expanded",
                    self.name,
                    path.len(),
                    path.cost(),
                    path.expanded()
                );
                for (cell, pos) in path.steps().iter().zip(&self.waypoints) {
                    log::info!("[{}] path node {cell} at {pos}", self.name);
                }
            }
            SearchOutcome::Unreachable { expanded } => {
                log::warn!("[{}] target unreachable ({expanded} cells expanded)", self.name);
            }
            SearchOutcome::BudgetExceeded { expanded } => {
                log::warn!("[{}] gave up after {expanded} expansions", self.name);
            }
        }
    }
}

/// Scenarios run when no file is given.
pub fn builtin() -> Vec<Scenario> {
    let five = GridConfig::new(5, 5);
    vec![
        Scenario {
            name: "open-diagonal".into(),
            grid: five,
            blocked: Vec::new(),
            start: Some(WorldPos::ground(0.0, 0.0)),
            target: Some(WorldPos::ground(4.0, 4.0)),
            options: SearchOptions::default(),
        },
        Scenario {
            name: "wall-detour".into(),
            grid: five,
            blocked: (0..4).map(|y| Point::new(2, y)).collect(),
            start: Some(WorldPos::ground(0.0, 0.0)),
            target: Some(WorldPos::ground(4.0, 4.0)),
            options: SearchOptions::default(),
        },
        Scenario {
            name: "enclosed".into(),
            grid: five,
            blocked: vec![
                Point::new(1, 1),
                Point::new(2, 1),
                Point::new(3, 1),
                Point::new(1, 2),
                Point::new(3, 2),
                Point::new(1, 3),
                Point::new(2, 3),
                Point::new(3, 3),
            ],
            start: Some(WorldPos::ground(0.0, 0.0)),
            target: Some(WorldPos::ground(2.0, 2.0)),
            options: SearchOptions::default(),
        },
        Scenario {
            name: "wide-field".into(),
            grid: GridConfig::default(),
            blocked: (0..199).map(|z| Point::new(100, z)).collect(),
            start: Some(WorldPos::ground(10.0, 10.0)),
            target: Some(WorldPos::ground(390.0, 20.0)),
            options: SearchOptions::default(),
        },
    ]
}

/// Errors from loading or running a scenario.
#[derive(Debug)]
pub enum ScenarioError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Grid(GridError),
    Path(PathError),
}

impl fmt::Display for ScenarioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "cannot read scenario: {e}"),
            Self::Parse(e) => write!(f, "invalid scenario: {e}"),
            Self::Grid(e) => write!(f, "grid setup failed: {e}"),
            Self::Path(e) => write!(f, "search setup failed: {e}"),
        }
    }
}

impl std::error::Error for ScenarioError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Parse(e) => Some(e),
            Self::Grid(e) => Some(e),
            Self::Path(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for ScenarioError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for ScenarioError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e)
    }
}

impl From<GridError> for ScenarioError {
    fn from(e: GridError) -> Self {
        Self::Grid(e)
    }
}

impl From<PathError> for ScenarioError {
    fn from(e: PathError) -> Self {
        Self::Path(e)
    }
}
