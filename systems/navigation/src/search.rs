//! Uniform-cost search over the obstacle-masked grid.

use std::{
    cmp::Ordering,
    collections::BinaryHeap,
    time::{Duration, Instant},
};

use log::{debug, trace};
use orbital_conquest_core::{CellCoord, GridSize, PlanError, Point};

use crate::{CostField, ObstacleMap, PathRequest};

/// Number of expansions between wall-clock checks.
const DEADLINE_CHECK_INTERVAL: usize = 64;

/// Limits bounding the work a single search may perform.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchBudget {
    max_expansions: Option<usize>,
    time_limit: Option<Duration>,
}

impl SearchBudget {
    /// Budget without any limits.
    #[must_use]
    pub const fn unlimited() -> Self {
        Self {
            max_expansions: None,
            time_limit: None,
        }
    }

    /// Caps the number of cells the search may expand.
    #[must_use]
    pub const fn with_max_expansions(mut self, max_expansions: usize) -> Self {
        self.max_expansions = Some(max_expansions);
        self
    }

    /// Caps the wall-clock time a single search may take.
    #[must_use]
    pub const fn with_time_limit(mut self, time_limit: Duration) -> Self {
        self.time_limit = Some(time_limit);
        self
    }

    /// Maximum number of expansions, if capped.
    #[must_use]
    pub const fn max_expansions(&self) -> Option<usize> {
        self.max_expansions
    }

    /// Maximum wall-clock duration, if capped.
    #[must_use]
    pub const fn time_limit(&self) -> Option<Duration> {
        self.time_limit
    }
}

/// Finds the cheapest 4-connected route from the request origin to its goal.
///
/// Entering a cell costs the weight stored in `costs`; the frontier pops the
/// lowest accumulated cost first and breaks ties on the cell's column, then
/// its row. Blocked cells are never enqueued. The returned route includes
/// both endpoints.
///
/// # Errors
///
/// * [`PlanError::EmptyGrid`] when the grid has no cells.
/// * [`PlanError::OutOfBounds`] when either endpoint lies outside the grid.
/// * [`PlanError::OriginBlocked`] when the origin lies inside an obstacle.
/// * [`PlanError::Unreachable`] when the goal is blocked or the frontier
///   empties before the goal is settled.
/// * [`PlanError::BudgetExhausted`] when `budget` runs out first.
pub fn find_path(
    obstacles: &ObstacleMap,
    costs: &CostField,
    request: &PathRequest,
    budget: &SearchBudget,
) -> Result<Vec<CellCoord>, PlanError> {
    let size = obstacles.size();
    let origin = request.origin();
    let goal = request.goal();

    if size.cell_count() == 0 {
        return Err(PlanError::EmptyGrid);
    }

    for endpoint in [origin, goal] {
        if !size.contains(endpoint) {
            return Err(PlanError::OutOfBounds {
                point: Point::from_cell(endpoint),
            });
        }
    }

    if obstacles.is_blocked(origin) {
        debug!("path search rejected: origin {origin} is blocked");
        return Err(PlanError::OriginBlocked { cell: origin });
    }

    if origin == goal {
        return Ok(vec![origin]);
    }

    if obstacles.is_blocked(goal) {
        debug!("path search rejected: goal {goal} is blocked");
        return Err(PlanError::Unreachable { origin, goal });
    }

    let mut state = SearchState::new(size);
    state.settle_origin(origin);

    let started = Instant::now();
    let mut expanded = 0_usize;

    while let Some(FrontierEntry { priority, cell }) = state.frontier.pop() {
        let Some(best) = state.best_cost(cell) else {
            continue;
        };
        if priority > best {
            continue;
        }

        expanded += 1;
        if budget.max_expansions().map_or(false, |limit| expanded > limit) {
            debug!("path search from {origin} to {goal} hit the expansion cap at {expanded}");
            return Err(PlanError::BudgetExhausted { expanded });
        }
        if let Some(limit) = budget.time_limit() {
            if expanded % DEADLINE_CHECK_INTERVAL == 0 && started.elapsed() > limit {
                debug!("path search from {origin} to {goal} ran out of time after {expanded}");
                return Err(PlanError::BudgetExhausted { expanded });
            }
        }

        if cell == goal {
            trace!("path search from {origin} to {goal} settled after {expanded} expansions");
            return state.reconstruct(origin, goal);
        }

        for neighbor in neighbors(cell, size) {
            if obstacles.is_blocked(neighbor) {
                continue;
            }

            let Some(weight) = costs.weight(neighbor) else {
                continue;
            };

            let candidate = best.saturating_add(u64::from(weight));
            state.relax(cell, neighbor, candidate);
        }
    }

    debug!("path search from {origin} to {goal} exhausted the frontier after {expanded}");
    Err(PlanError::Unreachable { origin, goal })
}

#[derive(Debug)]
struct SearchState {
    size: GridSize,
    frontier: BinaryHeap<FrontierEntry>,
    best: Vec<Option<u64>>,
    came_from: Vec<Option<CellCoord>>,
}

impl SearchState {
    fn new(size: GridSize) -> Self {
        let cell_count = size.cell_count();
        Self {
            size,
            frontier: BinaryHeap::new(),
            best: vec![None; cell_count],
            came_from: vec![None; cell_count],
        }
    }

    fn settle_origin(&mut self, origin: CellCoord) {
        if let Some(index) = self.size.index(origin) {
            self.best[index] = Some(0);
            self.frontier.push(FrontierEntry {
                priority: 0,
                cell: origin,
            });
        }
    }

    fn best_cost(&self, cell: CellCoord) -> Option<u64> {
        self.size.index(cell).and_then(|index| self.best[index])
    }

    fn relax(&mut self, from: CellCoord, to: CellCoord, cost: u64) {
        let Some(index) = self.size.index(to) else {
            return;
        };

        if self.best[index].map_or(false, |known| known <= cost) {
            return;
        }

        self.best[index] = Some(cost);
        self.came_from[index] = Some(from);
        self.frontier.push(FrontierEntry {
            priority: cost,
            cell: to,
        });
    }

    fn reconstruct(&self, origin: CellCoord, goal: CellCoord) -> Result<Vec<CellCoord>, PlanError> {
        let mut path = vec![goal];
        let mut current = goal;

        while current != origin {
            let previous = self
                .size
                .index(current)
                .and_then(|index| self.came_from[index]);
            let Some(previous) = previous else {
                return Err(PlanError::Unreachable { origin, goal });
            };

            if path.len() > self.came_from.len() {
                return Err(PlanError::Unreachable { origin, goal });
            }

            path.push(previous);
            current = previous;
        }

        path.reverse();
        Ok(path)
    }
}

/// Frontier element ordered so that [`BinaryHeap`] pops the smallest
/// priority first, then the smallest column, then the smallest row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct FrontierEntry {
    priority: u64,
    cell: CellCoord,
}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| other.cell.column().cmp(&self.cell.column()))
            .then_with(|| other.cell.row().cmp(&self.cell.row()))
    }
}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Edge-adjacent neighbours in left, right, up, down order.
///
/// Cells on the grid border omit the out-of-range neighbour on that side.
fn neighbors(cell: CellCoord, size: GridSize) -> impl Iterator<Item = CellCoord> {
    let mut candidates = [None; 4];
    let mut count = 0;

    if let Some(column) = cell.column().checked_sub(1) {
        candidates[count] = Some(CellCoord::new(column, cell.row()));
        count += 1;
    }

    if let Some(column) = cell.column().checked_add(1) {
        if column < size.width() {
            candidates[count] = Some(CellCoord::new(column, cell.row()));
            count += 1;
        }
    }

    if let Some(row) = cell.row().checked_sub(1) {
        candidates[count] = Some(CellCoord::new(cell.column(), row));
        count += 1;
    }

    if let Some(row) = cell.row().checked_add(1) {
        if row < size.height() {
            candidates[count] = Some(CellCoord::new(cell.column(), row));
            count += 1;
        }
    }

    candidates.into_iter().take(count).flatten()
}
