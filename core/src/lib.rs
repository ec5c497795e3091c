#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Orbital Conquest fleet agent.
//!
//! This crate defines the vocabulary that connects the host adapter, the
//! per-match world state, and the pure systems. Adapters feed [`TurnSnapshot`]
//! observations into the world, systems query the world and the path planner,
//! and respond exclusively with [`Command`] batches destined for the host.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Distance from a body's surface within which a ship may attempt to dock.
pub const DOCK_RADIUS: f64 = 4.0;

/// Radius of a single ship measured in grid units.
pub const SHIP_RADIUS: f64 = 0.5;

/// Unique identifier assigned to a player by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(u32);

impl PlayerId {
    /// Creates a new player identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a ship.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(u32);

impl UnitId {
    /// Creates a new unit identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a body (planet).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyId(u32);

impl BodyId {
    /// Creates a new body identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single grid cell expressed as column (`x`) and row (`y`).
///
/// The derived ordering compares the column first and the row second, which
/// is the tie-break order the path search relies on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Reports whether the two cells share an edge.
    #[must_use]
    pub fn is_adjacent_to(self, other: CellCoord) -> bool {
        self.manhattan_distance(other) == 1
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

/// Position on the continuous game plane.
///
/// Cell `(c, r)` is centred on the point `(c, r)`, so a point maps onto the
/// grid by rounding each coordinate to the nearest integer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Point {
    /// Creates a point from its coordinates.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Centre point of the provided cell.
    #[must_use]
    pub fn from_cell(cell: CellCoord) -> Self {
        Self::new(f64::from(cell.column()), f64::from(cell.row()))
    }

    /// Squared Euclidean distance to another point.
    #[must_use]
    pub fn squared_distance_to(self, other: Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance_to(self, other: Point) -> f64 {
        self.squared_distance_to(other).sqrt()
    }

    /// Discretizes the point onto the nearest cell.
    ///
    /// Returns `None` when either coordinate is not finite or rounds to a
    /// negative or unrepresentable index. Upper bounds are the caller's
    /// concern because the grid size is not known here.
    #[must_use]
    pub fn cell(self) -> Option<CellCoord> {
        let column = discretize(self.x)?;
        let row = discretize(self.y)?;
        Some(CellCoord::new(column, row))
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}

fn discretize(value: f64) -> Option<u32> {
    if !value.is_finite() {
        return None;
    }

    let rounded = value.round();
    if rounded < 0.0 || rounded > f64::from(u32::MAX) {
        return None;
    }

    Some(rounded as u32)
}

/// Dimensions of the match grid measured in whole cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridSize {
    width: u32,
    height: u32,
}

impl GridSize {
    /// Creates a new size descriptor with explicit dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.width && cell.row() < self.height
    }

    /// Total number of cells, or zero when the product does not fit `usize`.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        let width = usize::try_from(self.width).unwrap_or(0);
        let height = usize::try_from(self.height).unwrap_or(0);
        width.checked_mul(height).unwrap_or(0)
    }

    /// Row-major offset of the cell, if it lies inside the grid.
    #[must_use]
    pub fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }

        let width = usize::try_from(self.width).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let row = usize::try_from(cell.row()).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }

    /// Iterator over every cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> {
        let width = self.width;
        (0..self.height).flat_map(move |row| (0..width).map(move |column| CellCoord::new(column, row)))
    }
}

/// Circular keep-out zone on the plane.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Body {
    /// Centre of the circle.
    pub center: Point,
    /// Radius of the circle.
    pub radius: f64,
}

impl Body {
    /// Creates a keep-out zone from its centre and radius.
    #[must_use]
    pub const fn new(center: Point, radius: f64) -> Self {
        Self { center, radius }
    }
}

/// Docking lifecycle reported by the host for each ship.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DockingStatus {
    /// Ship is free to move.
    Undocked,
    /// Ship is in the process of docking.
    Docking,
    /// Ship is docked and producing.
    Docked,
    /// Ship is in the process of leaving its body.
    Undocking,
}

/// Immutable representation of a single body used for queries.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BodySnapshot {
    /// Identifier assigned to the body by the host.
    pub id: BodyId,
    /// Centre of the body.
    pub center: Point,
    /// Radius of the body.
    pub radius: f64,
    /// Player owning the body, if any.
    #[serde(default)]
    pub owner: Option<PlayerId>,
    /// Maximum number of ships that may dock simultaneously.
    pub docking_spots: u32,
    /// Ships currently docked to the body.
    #[serde(default)]
    pub docked_units: Vec<UnitId>,
}

impl BodySnapshot {
    /// Keep-out zone covered by the body.
    #[must_use]
    pub fn body(&self) -> Body {
        Body::new(self.center, self.radius)
    }

    /// Reports whether any player owns the body.
    #[must_use]
    pub fn is_owned(&self) -> bool {
        self.owner.is_some()
    }

    /// Reports whether another ship could still dock.
    #[must_use]
    pub fn has_free_spot(&self) -> bool {
        self.docked_units.len() < usize::try_from(self.docking_spots).unwrap_or(usize::MAX)
    }
}

/// Immutable representation of a single ship used for queries.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnitSnapshot {
    /// Identifier assigned to the ship by the host.
    pub id: UnitId,
    /// Player controlling the ship.
    pub owner: PlayerId,
    /// Current position of the ship.
    pub position: Point,
    /// Docking lifecycle of the ship.
    pub docking_status: DockingStatus,
}

/// Observation of the whole match delivered by the host at the start of a turn.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TurnSnapshot {
    /// Player controlled by this agent.
    pub player: PlayerId,
    /// Dimensions of the match grid.
    pub size: GridSize,
    /// Every body on the map.
    pub bodies: Vec<BodySnapshot>,
    /// Every ship on the map, regardless of owner.
    pub units: Vec<UnitSnapshot>,
}

/// Commands emitted towards the host once per turn.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Command {
    /// Steer the ship towards the provided point.
    MoveTo {
        /// Ship receiving the order.
        unit: UnitId,
        /// Point the ship should steer towards this turn.
        destination: Point,
    },
    /// Dock the ship to the provided body.
    Dock {
        /// Ship receiving the order.
        unit: UnitId,
        /// Body the ship should dock to.
        body: BodyId,
    },
    /// Keep the ship where it is for this turn.
    Hold {
        /// Ship receiving the order.
        unit: UnitId,
    },
}

impl Command {
    /// Ship addressed by the command.
    #[must_use]
    pub const fn unit(&self) -> UnitId {
        match self {
            Self::MoveTo { unit, .. } | Self::Dock { unit, .. } | Self::Hold { unit } => *unit,
        }
    }
}

/// Events emitted by the world when it absorbs a turn observation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// The first observation of a match fixed the grid and the controlled player.
    MatchStarted {
        /// Player controlled by this agent.
        player: PlayerId,
        /// Dimensions of the match grid.
        size: GridSize,
    },
    /// An own ship seen on the previous turn is missing from the latest one.
    UnitLost {
        /// Ship that disappeared.
        unit: UnitId,
    },
}

/// Reasons a path request may fail.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum PlanError {
    /// The requested origin or destination does not map onto the grid.
    #[error("point {point} lies outside the grid")]
    OutOfBounds {
        /// Offending point.
        point: Point,
    },
    /// The requested origin lies inside a keep-out zone.
    #[error("origin cell {cell} is blocked by an obstacle")]
    OriginBlocked {
        /// Offending origin cell.
        cell: CellCoord,
    },
    /// No obstacle-free route connects origin and goal.
    #[error("no path from {origin} to {goal}")]
    Unreachable {
        /// Cell the search started from.
        origin: CellCoord,
        /// Cell the search attempted to reach.
        goal: CellCoord,
    },
    /// The search exceeded its expansion or wall-clock budget.
    #[error("search budget exhausted after expanding {expanded} cells")]
    BudgetExhausted {
        /// Number of cells expanded before giving up.
        expanded: usize,
    },
    /// The planner was configured with a zero-sized grid.
    #[error("grid has no cells")]
    EmptyGrid,
}
