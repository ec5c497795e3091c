//! Per-request cell weights consumed by the grid search.

use orbital_conquest_core::{CellCoord, GridSize, Point};
use serde::Deserialize;

/// Origin and goal cells of a single search request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PathRequest {
    origin: CellCoord,
    goal: CellCoord,
}

impl PathRequest {
    /// Creates a request travelling from `origin` to `goal`.
    #[must_use]
    pub const fn new(origin: CellCoord, goal: CellCoord) -> Self {
        Self { origin, goal }
    }

    /// Cell the search starts from.
    #[must_use]
    pub const fn origin(&self) -> CellCoord {
        self.origin
    }

    /// Cell the search attempts to reach.
    #[must_use]
    pub const fn goal(&self) -> CellCoord {
        self.goal
    }
}

/// Strategy assigning the weight paid for entering a cell.
///
/// The search adds the weight of every entered cell to the accumulated path
/// cost, so implementations shape which routes are preferred without the
/// search engine knowing how.
pub trait CellWeighting {
    /// Weight paid for entering `cell` while serving `request`.
    fn weight(&self, cell: CellCoord, request: &PathRequest) -> u32;
}

/// Weighs each cell by its rounded-up distance from the request origin.
///
/// This is a static potential rather than a goal-directed heuristic: routes
/// hugging the origin are favoured regardless of where the goal lies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OriginDistance;

impl CellWeighting for OriginDistance {
    fn weight(&self, cell: CellCoord, request: &PathRequest) -> u32 {
        ceil_distance(cell, request.origin())
    }
}

/// Weighs each cell by its rounded-up distance to the request goal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GoalDistance;

impl CellWeighting for GoalDistance {
    fn weight(&self, cell: CellCoord, request: &PathRequest) -> u32 {
        ceil_distance(cell, request.goal())
    }
}

/// Configurable selection between the built-in weighting strategies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weighting {
    /// Distance from the origin, see [`OriginDistance`].
    #[default]
    OriginDistance,
    /// Distance to the goal, see [`GoalDistance`].
    GoalDistance,
}

impl CellWeighting for Weighting {
    fn weight(&self, cell: CellCoord, request: &PathRequest) -> u32 {
        match self {
            Self::OriginDistance => OriginDistance.weight(cell, request),
            Self::GoalDistance => GoalDistance.weight(cell, request),
        }
    }
}

/// Dense grid of per-cell weights computed for a single request.
#[derive(Clone, Debug)]
pub struct CostField {
    size: GridSize,
    weights: Vec<u32>,
}

impl CostField {
    /// Evaluates `weighting` for every cell of the grid.
    #[must_use]
    pub fn build<W>(size: GridSize, request: &PathRequest, weighting: &W) -> Self
    where
        W: CellWeighting + ?Sized,
    {
        let weights = size
            .cells()
            .map(|cell| weighting.weight(cell, request))
            .collect();
        Self { size, weights }
    }

    /// Weight stored for the cell, if it lies within the field.
    #[must_use]
    pub fn weight(&self, cell: CellCoord) -> Option<u32> {
        self.size
            .index(cell)
            .and_then(|index| self.weights.get(index).copied())
    }
}

fn ceil_distance(from: CellCoord, to: CellCoord) -> u32 {
    let distance = Point::from_cell(from).distance_to(Point::from_cell(to));
    distance.ceil() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_distance_rounds_up() {
        let request = PathRequest::new(CellCoord::new(0, 0), CellCoord::new(4, 4));
        let field = CostField::build(GridSize::new(5, 5), &request, &OriginDistance);

        assert_eq!(field.weight(CellCoord::new(0, 0)), Some(0));
        assert_eq!(field.weight(CellCoord::new(3, 0)), Some(3));
        assert_eq!(field.weight(CellCoord::new(1, 1)), Some(2));
        assert_eq!(field.weight(CellCoord::new(3, 4)), Some(5));
        assert_eq!(field.weight(CellCoord::new(5, 0)), None);
    }

    #[test]
    fn origin_distance_ignores_the_goal() {
        let towards_east = PathRequest::new(CellCoord::new(2, 2), CellCoord::new(4, 2));
        let towards_west = PathRequest::new(CellCoord::new(2, 2), CellCoord::new(0, 2));
        let size = GridSize::new(5, 5);

        let east = CostField::build(size, &towards_east, &OriginDistance);
        let west = CostField::build(size, &towards_west, &OriginDistance);

        for cell in size.cells() {
            assert_eq!(east.weight(cell), west.weight(cell));
        }
    }

    #[test]
    fn goal_distance_is_zero_at_the_goal() {
        let request = PathRequest::new(CellCoord::new(0, 0), CellCoord::new(3, 1));
        let field = CostField::build(GridSize::new(5, 5), &request, &Weighting::GoalDistance);

        assert_eq!(field.weight(CellCoord::new(3, 1)), Some(0));
        assert_eq!(field.weight(CellCoord::new(0, 0)), Some(4));
    }
}
