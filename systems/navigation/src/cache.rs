//! Per-unit memoized routes consumed one waypoint per turn.

use std::collections::{HashMap, VecDeque};

use orbital_conquest_core::{Point, UnitId};

/// Remaining waypoints of every unit that currently follows a route.
///
/// Entries never expire on their own: a unit keeps following its stored
/// route until it is exhausted or explicitly cleared.
#[derive(Clone, Debug, Default)]
pub struct PathCache {
    routes: HashMap<UnitId, VecDeque<Point>>,
}

impl PathCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pops the next waypoint stored for the unit.
    ///
    /// The entry is discarded once its last waypoint has been handed out.
    pub fn pop_next(&mut self, unit: UnitId) -> Option<Point> {
        let route = self.routes.get_mut(&unit)?;
        let next = route.pop_front();
        if route.is_empty() {
            let _ = self.routes.remove(&unit);
        }
        next
    }

    /// Stores a route for the unit, replacing any previous one.
    ///
    /// Empty routes are not stored.
    pub fn store<I>(&mut self, unit: UnitId, waypoints: I)
    where
        I: IntoIterator<Item = Point>,
    {
        let route: VecDeque<Point> = waypoints.into_iter().collect();
        if route.is_empty() {
            let _ = self.routes.remove(&unit);
            return;
        }

        let _ = self.routes.insert(unit, route);
    }

    /// Drops the route stored for the unit, reporting whether one existed.
    pub fn clear(&mut self, unit: UnitId) -> bool {
        self.routes.remove(&unit).is_some()
    }

    /// Waypoints still queued for the unit.
    #[must_use]
    pub fn route(&self, unit: UnitId) -> Option<&VecDeque<Point>> {
        self.routes.get(&unit)
    }

    /// Drops every route whose unit is not listed in `alive`.
    pub fn retain_units(&mut self, alive: &[UnitId]) {
        self.routes.retain(|unit, _| alive.contains(unit));
    }

    /// Number of units with a stored route.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Reports whether no unit has a stored route.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
