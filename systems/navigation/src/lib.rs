#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Grid-based path planner that steers ships around static bodies.
//!
//! A [`Planner`] is constructed once per match. It rasterizes the bodies into
//! an [`ObstacleMap`], answers path requests with a uniform-cost search
//! weighted by a pluggable [`CellWeighting`], collapses the resulting cell
//! route into waypoints, and memoizes the remaining waypoints per unit so a
//! ship consumes one waypoint per turn.

mod cache;
mod cost_field;
mod obstacles;
mod search;
mod simplify;

use std::time::Duration;

use log::trace;
use orbital_conquest_core::{Body, CellCoord, GridSize, PlanError, Point, UnitId};
use serde::Deserialize;

pub use cache::PathCache;
pub use cost_field::{
    CellWeighting, CostField, GoalDistance, OriginDistance, PathRequest, Weighting,
};
pub use obstacles::ObstacleMap;
pub use search::{find_path, SearchBudget};
pub use simplify::{simplify, SimplifyConfig};

/// Tuning knobs for a [`Planner`].
///
/// Every field has a default, so partial configuration files are accepted.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Extra radius added to every body when rasterizing obstacles.
    pub obstacle_inflation: f64,
    /// Clearance beyond a target's radius used for approach destinations.
    pub standoff_distance: f64,
    /// Half-width of the corridor merged into a sloped segment.
    pub band_half_width: f64,
    /// Offset tolerated from a vertical or horizontal segment.
    pub axis_tolerance: f64,
    /// Maximum number of cells a single search may expand.
    pub max_expansions: Option<usize>,
    /// Wall-clock budget of a single search in milliseconds.
    pub time_budget_ms: Option<u64>,
    /// Weighting strategy applied to every search.
    pub weighting: Weighting,
}

impl PlannerConfig {
    /// Simplification tolerances described by the configuration.
    #[must_use]
    pub fn simplify_config(&self) -> SimplifyConfig {
        SimplifyConfig {
            band_half_width: self.band_half_width,
            axis_tolerance: self.axis_tolerance,
        }
    }

    /// Search limits described by the configuration.
    #[must_use]
    pub fn search_budget(&self) -> SearchBudget {
        let mut budget = SearchBudget::unlimited();
        if let Some(max_expansions) = self.max_expansions {
            budget = budget.with_max_expansions(max_expansions);
        }
        if let Some(millis) = self.time_budget_ms {
            budget = budget.with_time_limit(Duration::from_millis(millis));
        }
        budget
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        let simplify = SimplifyConfig::default();
        Self {
            obstacle_inflation: 0.0,
            standoff_distance: 2.0,
            band_half_width: simplify.band_half_width,
            axis_tolerance: simplify.axis_tolerance,
            max_expansions: None,
            time_budget_ms: None,
            weighting: Weighting::default(),
        }
    }
}

/// Match-scoped path planner owning the obstacle map and per-unit routes.
#[derive(Debug)]
pub struct Planner<W = Weighting> {
    obstacles: ObstacleMap,
    weighting: W,
    simplify: SimplifyConfig,
    budget: SearchBudget,
    standoff_distance: f64,
    cache: PathCache,
}

impl Planner<Weighting> {
    /// Builds a planner using the weighting selected by the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::EmptyGrid`] when `size` has no cells.
    pub fn new(size: GridSize, bodies: &[Body], config: &PlannerConfig) -> Result<Self, PlanError> {
        Self::with_weighting(size, bodies, config, config.weighting)
    }
}

impl<W> Planner<W>
where
    W: CellWeighting,
{
    /// Builds a planner using a caller-provided weighting strategy.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::EmptyGrid`] when `size` has no cells.
    pub fn with_weighting(
        size: GridSize,
        bodies: &[Body],
        config: &PlannerConfig,
        weighting: W,
    ) -> Result<Self, PlanError> {
        if size.cell_count() == 0 {
            return Err(PlanError::EmptyGrid);
        }

        Ok(Self {
            obstacles: ObstacleMap::build(size, bodies, config.obstacle_inflation),
            weighting,
            simplify: config.simplify_config(),
            budget: config.search_budget(),
            standoff_distance: config.standoff_distance,
            cache: PathCache::new(),
        })
    }

    /// Returns the next point the unit should steer towards.
    ///
    /// A stored route is followed until exhausted, even when `destination`
    /// changed since it was computed; call [`Planner::invalidate`] when the
    /// unit's objective changes. Without a stored route a new one is
    /// searched, simplified, and stored without its starting waypoint.
    ///
    /// # Errors
    ///
    /// Propagates every [`PlanError`] produced while locating the endpoints
    /// or searching; nothing is cached on failure.
    pub fn plan(&mut self, unit: UnitId, origin: Point, destination: Point) -> Result<Point, PlanError> {
        if let Some(next) = self.cache.pop_next(unit) {
            trace!("unit {} follows cached waypoint {next}", unit.get());
            return Ok(next);
        }

        let origin_cell = self.locate(origin)?;
        let goal_cell = self.locate(destination)?;
        let waypoints = self.route_between(origin_cell, goal_cell)?;

        let mut remaining = waypoints.into_iter();
        let start = remaining.next();
        let next = if remaining.len() == 0 {
            start
        } else {
            remaining.next()
        };
        let Some(next) = next else {
            return Err(PlanError::Unreachable {
                origin: origin_cell,
                goal: goal_cell,
            });
        };

        self.cache.store(unit, remaining);
        trace!(
            "unit {} planned {origin_cell} -> {goal_cell}, next waypoint {next}",
            unit.get()
        );
        Ok(next)
    }

    /// Drops any route stored for the unit, reporting whether one existed.
    pub fn invalidate(&mut self, unit: UnitId) -> bool {
        self.cache.clear(unit)
    }

    /// Drops the routes of every unit not listed in `alive`.
    pub fn retain_units(&mut self, alive: &[UnitId]) {
        self.cache.retain_units(alive);
    }

    /// Computes the full simplified route between two points without caching.
    ///
    /// # Errors
    ///
    /// See [`Planner::plan`].
    pub fn find_route(&self, origin: Point, destination: Point) -> Result<Vec<Point>, PlanError> {
        let origin_cell = self.locate(origin)?;
        let goal_cell = self.locate(destination)?;
        self.route_between(origin_cell, goal_cell)
    }

    /// Computes the raw cell-by-cell route between two cells without caching.
    ///
    /// # Errors
    ///
    /// See [`find_path`].
    pub fn find_cells(&self, origin: CellCoord, goal: CellCoord) -> Result<Vec<CellCoord>, PlanError> {
        let size = self.obstacles.size();
        let request = PathRequest::new(origin, goal);
        let costs = CostField::build(size, &request, &self.weighting);
        find_path(&self.obstacles, &costs, &request, &self.budget)
    }

    /// Waypoints still queued for the unit.
    #[must_use]
    pub fn route(&self, unit: UnitId) -> Option<impl Iterator<Item = &Point> + '_> {
        self.cache.route(unit).map(|route| route.iter())
    }

    /// Obstacle map rasterized at construction.
    #[must_use]
    pub fn obstacles(&self) -> &ObstacleMap {
        &self.obstacles
    }

    /// Clearance beyond a target's radius used for approach destinations.
    #[must_use]
    pub fn standoff_distance(&self) -> f64 {
        self.standoff_distance
    }

    fn locate(&self, point: Point) -> Result<CellCoord, PlanError> {
        point
            .cell()
            .filter(|cell| self.obstacles.size().contains(*cell))
            .ok_or(PlanError::OutOfBounds { point })
    }

    fn route_between(&self, origin: CellCoord, goal: CellCoord) -> Result<Vec<Point>, PlanError> {
        let cells = self.find_cells(origin, goal)?;
        let points: Vec<Point> = cells.into_iter().map(Point::from_cell).collect();
        Ok(simplify(&points, &self.simplify))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_configuration_keeps_defaults() {
        let config: PlannerConfig =
            toml::from_str("standoff_distance = 3.5\nweighting = \"goal_distance\"\n")
                .expect("config parses");

        assert!((config.standoff_distance - 3.5).abs() < f64::EPSILON);
        assert_eq!(config.weighting, Weighting::GoalDistance);
        assert!((config.band_half_width - 0.8).abs() < f64::EPSILON);
        assert!((config.axis_tolerance - 1.1).abs() < f64::EPSILON);
        assert_eq!(config.max_expansions, None);
    }

    #[test]
    fn budget_reflects_configuration() {
        let config = PlannerConfig {
            max_expansions: Some(50),
            time_budget_ms: Some(20),
            ..PlannerConfig::default()
        };

        let budget = config.search_budget();
        assert_eq!(budget.max_expansions(), Some(50));
        assert_eq!(budget.time_limit(), Some(Duration::from_millis(20)));
    }

    #[test]
    fn empty_grid_is_rejected() {
        let result = Planner::new(GridSize::new(0, 0), &[], &PlannerConfig::default());
        assert!(matches!(result, Err(PlanError::EmptyGrid)));
    }

    #[test]
    fn plan_steps_straight_to_the_end_of_a_corridor() {
        let mut planner = Planner::new(GridSize::new(10, 10), &[], &PlannerConfig::default())
            .expect("planner builds");
        let unit = UnitId::new(1);

        let next = planner
            .plan(unit, Point::new(0.2, -0.1), Point::new(8.8, 0.3))
            .expect("route exists");

        assert_eq!(next, Point::new(9.0, 0.0));
        assert!(planner.route(unit).is_none());
    }

    #[test]
    fn plan_to_the_current_cell_returns_it() {
        let mut planner = Planner::new(GridSize::new(4, 4), &[], &PlannerConfig::default())
            .expect("planner builds");

        let next = planner
            .plan(UnitId::new(2), Point::new(2.1, 1.9), Point::new(1.8, 2.2))
            .expect("trivial route");

        assert_eq!(next, Point::new(2.0, 2.0));
    }

    #[test]
    fn points_off_the_grid_are_rejected() {
        let mut planner = Planner::new(GridSize::new(4, 4), &[], &PlannerConfig::default())
            .expect("planner builds");

        let result = planner.plan(UnitId::new(3), Point::new(1.0, 1.0), Point::new(4.6, 1.0));

        assert_eq!(
            result,
            Err(PlanError::OutOfBounds {
                point: Point::new(4.6, 1.0)
            })
        );
        assert!(planner.route(UnitId::new(3)).is_none());
    }
}
