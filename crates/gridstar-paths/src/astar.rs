use gridstar_core::{Point, WorldPos};

use crate::Pathfinder;
use crate::distance::octile;
use crate::path::{Path, PathError, PathRequest, SearchOutcome};
use crate::pathfinder::NO_PARENT;
use crate::traits::GridProvider;

enum Stop {
    Found,
    Exhausted,
    Budget,
}

impl<G: GridProvider> Pathfinder<G> {
    /// Find a path between two world positions.
    ///
    /// Both positions are resolved to their nearest cell, clamped into the
    /// grid. Neither endpoint needs to be walkable: the start is always
    /// expanded, and an unwalkable target is simply never reached.
    pub fn find_path(
        &mut self,
        start: WorldPos,
        target: WorldPos,
    ) -> Result<SearchOutcome, PathError> {
        self.ensure_built()?;
        let from = self.grid.cell_at_world(start);
        let to = self.grid.cell_at_world(target);
        log::trace!("find_path: {start} -> {from}, {target} -> {to}");
        self.search(from, to)
    }

    /// Find a path between two cells given in grid coordinates.
    pub fn find_path_cells(
        &mut self,
        start: Point,
        target: Point,
    ) -> Result<SearchOutcome, PathError> {
        self.ensure_built()?;
        let bounds = self.grid.bounds();
        for p in [start, target] {
            if !bounds.contains(p) {
                return Err(PathError::OutOfRange(p));
            }
        }
        self.search(start, target)
    }

    /// Run a request whose endpoints may be unset.
    pub fn run(&mut self, request: &PathRequest) -> Result<SearchOutcome, PathError> {
        let start = request.start.ok_or(PathError::MissingStart)?;
        let target = request.target.ok_or(PathError::MissingTarget)?;
        self.find_path(start, target)
    }

    fn ensure_built(&self) -> Result<(), PathError> {
        if self.grid.width() <= 0 || self.grid.height() <= 0 {
            log::debug!("find_path: grid has no cells");
            return Err(PathError::GridNotBuilt);
        }
        Ok(())
    }

    fn search(&mut self, from: Point, to: Point) -> Result<SearchOutcome, PathError> {
        self.scratch.begin(self.grid.bounds());
        let bounds = self.scratch.bounds;
        let (Some(start_idx), Some(goal_idx)) = (self.scratch.idx(from), self.scratch.idx(to))
        else {
            // Providers must clamp; treat a stray cell as a setup error.
            return Err(PathError::OutOfRange(if bounds.contains(from) { to } else { from }));
        };

        if start_idx == goal_idx {
            return Ok(SearchOutcome::Found(Path::default()));
        }

        self.scratch.push_open(start_idx, 0, octile(from, to), NO_PARENT);

        let mut nbuf = std::mem::take(&mut self.nbuf);
        let mut expanded = 0usize;

        let stop = 'search: loop {
            let Some(ci) = self.scratch.pop_best() else {
                break 'search Stop::Exhausted;
            };

            if ci == goal_idx {
                break 'search Stop::Found;
            }
            // The target is accepted even with the budget spent; only
            // neighbor expansion is capped.
            if self
                .options
                .max_expansions
                .is_some_and(|max| expanded >= max)
            {
                break 'search Stop::Budget;
            }
            expanded += 1;

            let current = self.scratch.point(ci);
            let current_g = self.scratch.nodes[ci].g;

            let walkable = nbuf.walkable(current, bounds, &self.grid, self.options.diagonals);
            for &np in walkable {
                let Some(ni) = self.scratch.idx(np) else {
                    continue;
                };
                if self.scratch.is_closed(ni) {
                    continue;
                }
                let tentative_g = current_g + octile(current, np);
                self.scratch.relax(ni, tentative_g, octile(np, to), ci);
            }
        };

        self.nbuf = nbuf;

        match stop {
            Stop::Found => {
                let path = self.reconstruct(start_idx, goal_idx, expanded);
                log::debug!(
                    "find_path {from} -> {to}: {} steps, cost {}, {expanded} expanded",
                    path.len(),
                    path.cost()
                );
                Ok(SearchOutcome::Found(path))
            }
            Stop::Exhausted => {
                log::debug!("find_path {from} -> {to}: unreachable after {expanded} expanded");
                Ok(SearchOutcome::Unreachable { expanded })
            }
            Stop::Budget => {
                log::debug!("find_path {from} -> {to}: budget of {expanded} expansions exceeded");
                Ok(SearchOutcome::BudgetExceeded { expanded })
            }
        }
    }

    /// Walk parent links back from the goal, stopping before the start.
    fn reconstruct(&self, start_idx: usize, goal_idx: usize, expanded: usize) -> Path {
        let mut steps = Vec::new();
        let mut ci = goal_idx;
        while ci != start_idx && ci != NO_PARENT {
            steps.push(self.scratch.point(ci));
            ci = self.scratch.nodes[ci].parent;
        }
        steps.reverse();
        Path {
            steps,
            cost: self.scratch.nodes[goal_idx].g,
            expanded,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use gridstar_core::{Grid, GridConfig, Range};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;
    use crate::distance::chebyshev;
    use crate::options::{Diagonals, SearchOptions};
    use crate::traits::Walkability;

    /// Build a unit-spaced grid from rows of `.` (open) and `#` (blocked).
    /// Row `i` of the picture is grid row `y = i`.
    fn grid_from(rows: &[&str]) -> Grid {
        let h = rows.len() as i32;
        let w = rows[0].len() as i32;
        let mut grid = Grid::build(GridConfig::new(w, h)).unwrap();
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                if ch == '#' {
                    grid.set_walkable(Point::new(x as i32, y as i32), false).unwrap();
                }
            }
        }
        grid
    }

    fn open_grid(w: i32, h: i32) -> Grid {
        Grid::build(GridConfig::new(w, h)).unwrap()
    }

    fn cell(x: i32, y: i32) -> WorldPos {
        WorldPos::ground(x as f32, y as f32)
    }

    fn step_cost(start: Point, path: &Path) -> i32 {
        let mut prev = start;
        let mut total = 0;
        for &p in path.steps() {
            total += octile(prev, p);
            prev = p;
        }
        total
    }

    /// Cheapest route cost by repeated edge relaxation over all cells.
    fn brute_force_cost(grid: &Grid, from: Point, to: Point, diagonals: Diagonals) -> Option<i32> {
        let bounds = grid.bounds();
        let idx = |p: Point| (p.y * bounds.width() + p.x) as usize;
        let mut dist = vec![i32::MAX; bounds.len()];
        dist[idx(from)] = 0;
        let mut changed = true;
        while changed {
            changed = false;
            for p in bounds {
                if dist[idx(p)] == i32::MAX {
                    continue;
                }
                for q in bounds {
                    if chebyshev(p, q) != 1
                        || !grid.is_walkable(q)
                        || !diagonals.permits(p, q, |c| grid.is_walkable(c))
                    {
                        continue;
                    }
                    let d = dist[idx(p)] + octile(p, q);
                    if d < dist[idx(q)] {
                        dist[idx(q)] = d;
                        changed = true;
                    }
                }
            }
        }
        let d = dist[idx(to)];
        (d != i32::MAX).then_some(d)
    }

    #[test]
    fn open_grid_pure_diagonal() {
        let mut pf = Pathfinder::new(open_grid(5, 5));
        let outcome = pf.find_path(cell(0, 0), cell(4, 4)).unwrap();
        let path = outcome.into_path().unwrap();
        assert_eq!(
            path.steps(),
            &[Point::new(1, 1), Point::new(2, 2), Point::new(3, 3), Point::new(4, 4)]
        );
        assert_eq!(path.cost(), 56);
        assert_eq!(step_cost(Point::new(0, 0), &path), 56);
    }

    #[test]
    fn wall_forces_detour_through_gap() {
        let grid = grid_from(&[
            "..#..", //
            "..#..",
            "..#..",
            "..#..",
            ".....",
        ]);
        let mut pf = Pathfinder::new(grid);
        let path = pf.find_path(cell(0, 0), cell(4, 4)).unwrap().into_path().unwrap();
        assert!(path.steps().contains(&Point::new(2, 4)));
        assert!(path.cost() > 56);
        assert_eq!(path.last(), Some(Point::new(4, 4)));
        assert!(path.is_contiguous_from(Point::new(0, 0)));
        assert_eq!(path.cost(), step_cost(Point::new(0, 0), &path));
        assert!(path.steps().iter().all(|&p| pf.grid().is_walkable(p)));
    }

    #[test]
    fn same_cell_gives_empty_path() {
        let mut pf = Pathfinder::new(open_grid(5, 5));
        // Both positions round to cell (2, 3).
        let outcome = pf
            .find_path(WorldPos::ground(2.2, 3.1), WorldPos::ground(1.8, 2.9))
            .unwrap();
        let path = outcome.into_path().unwrap();
        assert!(path.is_empty());
        assert_eq!(path.cost(), 0);
    }

    #[test]
    fn enclosed_target_is_unreachable() {
        let grid = grid_from(&[
            ".....", //
            ".###.",
            ".#.#.",
            ".###.",
            ".....",
        ]);
        let mut pf = Pathfinder::new(grid);
        let outcome = pf.find_path(cell(0, 0), cell(2, 2)).unwrap();
        assert!(matches!(outcome, SearchOutcome::Unreachable { .. }));
        // Every walkable cell outside the ring was expanded.
        assert_eq!(outcome.expanded(), 16);
    }

    #[test]
    fn blocked_target_is_unreachable() {
        let mut grid = open_grid(4, 4);
        grid.set_walkable(Point::new(3, 3), false).unwrap();
        let mut pf = Pathfinder::new(grid);
        let outcome = pf.find_path(cell(0, 0), cell(3, 3)).unwrap();
        assert!(!outcome.is_found());
    }

    #[test]
    fn blocked_start_still_expands() {
        let mut grid = open_grid(4, 1);
        grid.set_walkable(Point::new(0, 0), false).unwrap();
        let mut pf = Pathfinder::new(grid);
        let path = pf.find_path(cell(0, 0), cell(3, 0)).unwrap().into_path().unwrap();
        assert_eq!(path.steps(), &[Point::new(1, 0), Point::new(2, 0), Point::new(3, 0)]);
        assert_eq!(path.cost(), 30);
    }

    #[test]
    fn endpoints_outside_grid_are_clamped() {
        let mut pf = Pathfinder::new(open_grid(5, 5));
        let path = pf
            .find_path(WorldPos::ground(-10.0, -10.0), WorldPos::ground(40.0, 0.0))
            .unwrap()
            .into_path()
            .unwrap();
        assert_eq!(path.last(), Some(Point::new(4, 0)));
        assert_eq!(path.len(), 4);
        assert_eq!(path.cost(), 40);
    }

    #[test]
    fn lower_h_wins_equal_f() {
        // From (0,0) to (2,1): (1,0) and (1,1) both have f = 24, with h = 14
        // and h = 10. (1,0) is discovered first but (1,1) is expanded first.
        let mut pf = Pathfinder::new(open_grid(5, 5));
        let path = pf.find_path(cell(0, 0), cell(2, 1)).unwrap().into_path().unwrap();
        assert_eq!(path.steps(), &[Point::new(1, 1), Point::new(2, 1)]);
        assert_eq!(path.cost(), 24);
        let order: Vec<_> = pf.expanded_cells().collect();
        assert_eq!(order, vec![Point::new(0, 0), Point::new(1, 1), Point::new(2, 1)]);
    }

    #[test]
    fn equal_candidates_expand_in_discovery_order() {
        // (1,0) and (1,2) tie on f and h; (1,0) is discovered first.
        let grid = grid_from(&[
            "...", //
            ".#.",
            "...",
        ]);
        let mut pf = Pathfinder::new(grid);
        let path = pf.find_path(cell(0, 1), cell(2, 1)).unwrap().into_path().unwrap();
        assert_eq!(path.steps(), &[Point::new(1, 0), Point::new(2, 1)]);
        assert_eq!(path.cost(), 28);
    }

    #[test]
    fn repeated_runs_are_identical() {
        let grid = grid_from(&[
            "........", //
            "..####..",
            "......#.",
            ".####.#.",
            "......#.",
            "#####...",
        ]);
        let mut pf = Pathfinder::new(grid);
        let first = pf.find_path(cell(0, 0), cell(7, 5)).unwrap();
        let first_order: Vec<_> = pf.expanded_cells().collect();
        for _ in 0..5 {
            // An unrelated search in between must not leak scratch state.
            pf.find_path(cell(7, 0), cell(0, 4)).unwrap();
            assert_eq!(pf.find_path(cell(0, 0), cell(7, 5)).unwrap(), first);
            assert_eq!(pf.expanded_cells().collect::<Vec<_>>(), first_order);
        }
    }

    #[test]
    fn minimal_cost_matches_brute_force() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        for diagonals in [Diagonals::Always, Diagonals::UnlessBothBlocked, Diagonals::UnlessAnyBlocked] {
            let mut pf = Pathfinder::with_options(
                open_grid(5, 5),
                SearchOptions::default().with_diagonals(diagonals),
            );
            for _ in 0..200 {
                for p in Range::with_size(5, 5) {
                    let walkable = !rng.random_bool(0.3);
                    pf.grid_mut().set_walkable(p, walkable).unwrap();
                }
                let from = Point::new(rng.random_range(0..5), rng.random_range(0..5));
                let to = Point::new(rng.random_range(0..5), rng.random_range(0..5));
                let expected = brute_force_cost(pf.grid(), from, to, diagonals);
                let outcome = pf.find_path_cells(from, to).unwrap();
                match (expected, outcome.path()) {
                    (Some(cost), Some(path)) => {
                        assert_eq!(path.cost(), cost, "{from} -> {to}");
                        assert_eq!(step_cost(from, path), cost);
                        assert!(path.is_contiguous_from(from));
                        if from != to {
                            assert_eq!(path.last(), Some(to));
                        }
                        let mut prev = from;
                        for &p in path.steps() {
                            assert!(pf.grid().is_walkable(p));
                            assert!(diagonals.permits(prev, p, |c| pf.grid().is_walkable(c)));
                            prev = p;
                        }
                    }
                    (None, None) => {
                        assert!(matches!(outcome, SearchOutcome::Unreachable { .. }));
                    }
                    (expected, got) => {
                        panic!("{from} -> {to}: expected {expected:?}, got {got:?}")
                    }
                }
            }
        }
    }

    #[test]
    fn diagonal_policy_blocks_corner_cut() {
        let grid = grid_from(&[
            ".#", //
            "..",
        ]);
        let mut pf = Pathfinder::new(grid);
        let cut = pf.find_path(cell(0, 0), cell(1, 1)).unwrap().into_path().unwrap();
        assert_eq!(cut.steps(), &[Point::new(1, 1)]);

        pf.set_options(SearchOptions::default().with_diagonals(Diagonals::UnlessAnyBlocked));
        let around = pf.find_path(cell(0, 0), cell(1, 1)).unwrap().into_path().unwrap();
        assert_eq!(around.steps(), &[Point::new(0, 1), Point::new(1, 1)]);
        assert_eq!(around.cost(), 20);

        pf.set_options(SearchOptions::default().with_diagonals(Diagonals::UnlessBothBlocked));
        let squeeze = pf.find_path(cell(0, 0), cell(1, 1)).unwrap().into_path().unwrap();
        assert_eq!(squeeze.steps(), &[Point::new(1, 1)]);
    }

    #[test]
    fn squeeze_between_two_blocked_corners() {
        let grid = grid_from(&[
            ".#", //
            "#.",
        ]);
        let mut pf = Pathfinder::new(grid);
        assert!(pf.find_path(cell(0, 0), cell(1, 1)).unwrap().is_found());
        pf.set_options(SearchOptions::default().with_diagonals(Diagonals::UnlessBothBlocked));
        assert!(matches!(
            pf.find_path(cell(0, 0), cell(1, 1)).unwrap(),
            SearchOutcome::Unreachable { expanded: 1 }
        ));
    }

    #[test]
    fn budget_stops_search_explicitly() {
        let mut pf = Pathfinder::with_options(
            open_grid(20, 20),
            SearchOptions::default().with_max_expansions(3),
        );
        let outcome = pf.find_path(cell(0, 0), cell(19, 0)).unwrap();
        assert_eq!(outcome, SearchOutcome::BudgetExceeded { expanded: 3 });

        // A target found within budget is still reported.
        let outcome = pf.find_path(cell(0, 0), cell(2, 0)).unwrap();
        let path = outcome.into_path().unwrap();
        assert_eq!(path.len(), 2);
        assert_eq!(path.expanded(), 2);
    }

    #[test]
    fn budget_of_one_reaches_adjacent_target() {
        let mut pf = Pathfinder::with_options(
            open_grid(5, 1),
            SearchOptions::default().with_max_expansions(1),
        );
        let path = pf.find_path(cell(0, 0), cell(1, 0)).unwrap().into_path().unwrap();
        assert_eq!(path.steps(), &[Point::new(1, 0)]);
        assert_eq!(path.expanded(), 1);

        // Two cells away needs a second expansion.
        assert_eq!(
            pf.find_path(cell(0, 0), cell(2, 0)).unwrap(),
            SearchOutcome::BudgetExceeded { expanded: 1 }
        );
    }

    #[test]
    fn zero_budget_expands_nothing() {
        let mut pf = Pathfinder::with_options(
            open_grid(5, 1),
            SearchOptions::default().with_max_expansions(0),
        );
        assert_eq!(
            pf.find_path(cell(0, 0), cell(1, 0)).unwrap(),
            SearchOutcome::BudgetExceeded { expanded: 0 }
        );
        // Same-cell requests need no expansion at all.
        assert!(pf.find_path(cell(3, 0), cell(3, 0)).unwrap().is_found());
    }

    #[test]
    fn into_grid_returns_the_updated_grid() {
        let mut pf = Pathfinder::new(open_grid(3, 3));
        pf.grid_mut().set_walkable(Point::new(1, 1), false).unwrap();
        let grid = pf.into_grid();
        assert!(!grid.is_walkable(Point::new(1, 1)));
        assert_eq!(grid.len(), 9);
    }

    #[test]
    fn request_runs_like_find_path() {
        let mut pf = Pathfinder::new(open_grid(4, 4));
        let via_request = pf.run(&PathRequest::new(cell(0, 3), cell(3, 0))).unwrap();
        let direct = pf.find_path(cell(0, 3), cell(3, 0)).unwrap();
        assert_eq!(via_request, direct);
        assert_eq!(
            via_request.into_path().unwrap().into_steps(),
            vec![Point::new(1, 2), Point::new(2, 1), Point::new(3, 0)]
        );
    }

    #[test]
    fn walkability_changes_between_searches() {
        let mut pf = Pathfinder::new(open_grid(3, 3));
        assert_eq!(pf.find_path(cell(0, 1), cell(2, 1)).unwrap().path().map(Path::cost), Some(20));
        for y in 0..3 {
            pf.grid_mut().set_walkable(Point::new(1, y), false).unwrap();
        }
        assert!(!pf.find_path(cell(0, 1), cell(2, 1)).unwrap().is_found());
        pf.grid_mut().set_walkable(Point::new(1, 2), true).unwrap();
        let path = pf.find_path(cell(0, 1), cell(2, 1)).unwrap().into_path().unwrap();
        assert_eq!(path.steps(), &[Point::new(1, 2), Point::new(2, 1)]);
    }

    #[test]
    fn scaled_grid_resolves_world_positions() {
        let cfg = GridConfig::new(6, 6)
            .with_node_radius(2.0)
            .with_origin(WorldPos::new(-5.0, 0.0, 10.0));
        let mut pf = Pathfinder::new(Grid::build(cfg).unwrap());
        let path = pf
            .find_path(WorldPos::new(-5.2, 3.0, 10.4), WorldPos::new(1.1, 0.0, 10.0))
            .unwrap()
            .into_path()
            .unwrap();
        assert_eq!(path.last(), Some(Point::new(3, 0)));
        assert_eq!(
            path.world_positions(pf.grid()).last(),
            Some(&WorldPos::new(1.0, 0.0, 10.0))
        );
    }

    #[test]
    fn shared_grid_supports_independent_pathfinders() {
        let grid = Arc::new(grid_from(&[
            ".....", //
            ".###.",
            ".....",
        ]));
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let grid = Arc::clone(&grid);
                std::thread::spawn(move || {
                    let mut pf = Pathfinder::new(grid);
                    let from = if i % 2 == 0 { cell(0, 1) } else { cell(4, 1) };
                    let to = if i % 2 == 0 { cell(4, 1) } else { cell(0, 1) };
                    pf.find_path(from, to).unwrap().into_path().unwrap().cost()
                })
            })
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), 48);
        }
    }

    #[test]
    fn borrowed_grid_works_as_provider() {
        let grid = open_grid(3, 3);
        let mut a = Pathfinder::new(&grid);
        let mut b = Pathfinder::new(&grid);
        let pa = a.find_path(cell(0, 0), cell(2, 2)).unwrap();
        let pb = b.find_path(cell(2, 2), cell(0, 0)).unwrap();
        assert_eq!(pa.path().map(Path::cost), pb.path().map(Path::cost));
    }

    struct Unbuilt;

    impl Walkability for Unbuilt {
        fn is_walkable(&self, _: Point) -> bool {
            true
        }
    }

    impl GridProvider for Unbuilt {
        fn width(&self) -> i32 {
            0
        }
        fn height(&self) -> i32 {
            0
        }
        fn cell_at_world(&self, _: WorldPos) -> Point {
            Point::ZERO
        }
        fn cell_to_world(&self, _: Point) -> WorldPos {
            WorldPos::ZERO
        }
    }

    #[test]
    fn unbuilt_grid_is_a_setup_error() {
        let mut pf = Pathfinder::new(Unbuilt);
        assert_eq!(
            pf.find_path(WorldPos::ZERO, WorldPos::ZERO),
            Err(PathError::GridNotBuilt)
        );
        assert_eq!(
            pf.find_path_cells(Point::ZERO, Point::ZERO),
            Err(PathError::GridNotBuilt)
        );
    }

    #[test]
    fn missing_endpoints_are_setup_errors() {
        let mut pf = Pathfinder::new(open_grid(3, 3));
        let req = PathRequest::default();
        assert_eq!(pf.run(&req), Err(PathError::MissingStart));
        let req = req.with_start(cell(0, 0));
        assert_eq!(pf.run(&req), Err(PathError::MissingTarget));
        let req = req.with_target(cell(2, 0));
        assert!(pf.run(&req).unwrap().is_found());
    }

    #[test]
    fn grid_coordinates_are_checked() {
        let mut pf = Pathfinder::new(open_grid(3, 3));
        assert_eq!(
            pf.find_path_cells(Point::new(0, 0), Point::new(3, 0)),
            Err(PathError::OutOfRange(Point::new(3, 0)))
        );
        assert_eq!(
            pf.find_path_cells(Point::new(-1, 0), Point::new(1, 0)),
            Err(PathError::OutOfRange(Point::new(-1, 0)))
        );
    }
}
