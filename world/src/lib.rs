#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative per-match state for the Orbital Conquest fleet agent.
//!
//! The host delivers a complete [`TurnSnapshot`] every turn. [`apply`] folds it
//! into the [`World`], and systems read the result exclusively through the
//! [`query`] module.

use log::{info, warn};
use orbital_conquest_core::{
    BodySnapshot, Event, GridSize, PlayerId, TurnSnapshot, UnitId, UnitSnapshot,
};

/// Represents the state of the match as last observed.
#[derive(Debug, Default)]
pub struct World {
    player: Option<PlayerId>,
    size: Option<GridSize>,
    bodies: Vec<BodySnapshot>,
    units: Vec<UnitSnapshot>,
    turn: u64,
}

impl World {
    /// Creates an empty world awaiting its first observation.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn own_unit_ids(&self) -> Vec<UnitId> {
        match self.player {
            Some(player) => self
                .units
                .iter()
                .filter(|unit| unit.owner == player)
                .map(|unit| unit.id)
                .collect(),
            None => Vec::new(),
        }
    }
}

/// Applies the latest observation to the world, emitting resulting events.
///
/// The first observation fixes the grid size for the rest of the match; later
/// observations reporting a different size keep the original one.
pub fn apply(world: &mut World, snapshot: TurnSnapshot, out_events: &mut Vec<Event>) {
    let previous_units = world.own_unit_ids();

    match world.size {
        None => {
            info!(
                "match started for player {} on a {}x{} grid",
                snapshot.player.get(),
                snapshot.size.width(),
                snapshot.size.height()
            );
            world.size = Some(snapshot.size);
            out_events.push(Event::MatchStarted {
                player: snapshot.player,
                size: snapshot.size,
            });
        }
        Some(size) if size != snapshot.size => {
            warn!(
                "ignoring grid size change from {}x{} to {}x{}",
                size.width(),
                size.height(),
                snapshot.size.width(),
                snapshot.size.height()
            );
        }
        Some(_) => {}
    }

    world.player = Some(snapshot.player);
    world.bodies = snapshot.bodies;
    world.units = snapshot.units;
    world.turn = world.turn.saturating_add(1);

    let current_units = world.own_unit_ids();
    for unit in previous_units {
        if !current_units.contains(&unit) {
            out_events.push(Event::UnitLost { unit });
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::cmp::Ordering;

    use orbital_conquest_core::{
        BodySnapshot, DockingStatus, GridSize, PlayerId, Point, UnitSnapshot, DOCK_RADIUS,
    };

    use super::World;

    /// Player controlled by this agent, once the first observation arrived.
    #[must_use]
    pub fn player(world: &World) -> Option<PlayerId> {
        world.player
    }

    /// Grid size fixed by the first observation.
    #[must_use]
    pub fn grid_size(world: &World) -> Option<GridSize> {
        world.size
    }

    /// Number of observations absorbed so far.
    #[must_use]
    pub fn turn(world: &World) -> u64 {
        world.turn
    }

    /// Every body on the map.
    #[must_use]
    pub fn bodies(world: &World) -> &[BodySnapshot] {
        &world.bodies
    }

    /// Ships controlled by this agent, in observation order.
    pub fn my_ships(world: &World) -> impl Iterator<Item = &UnitSnapshot> + '_ {
        let player = world.player;
        world
            .units
            .iter()
            .filter(move |unit| Some(unit.owner) == player)
    }

    /// Ships controlled by this agent that are free to move.
    pub fn undocked_ships(world: &World) -> impl Iterator<Item = &UnitSnapshot> + '_ {
        my_ships(world).filter(|unit| unit.docking_status == DockingStatus::Undocked)
    }

    /// Unowned bodies ordered by distance from `from`, nearest first.
    ///
    /// Equal distances are ordered by body identifier.
    #[must_use]
    pub fn empty_bodies_by_distance(world: &World, from: Point) -> Vec<&BodySnapshot> {
        let mut bodies: Vec<&BodySnapshot> =
            world.bodies.iter().filter(|body| !body.is_owned()).collect();
        bodies.sort_by(|left, right| {
            compare_distance(from, left.center, right.center).then(left.id.cmp(&right.id))
        });
        bodies
    }

    /// Ships of other players ordered by distance from `from`, nearest first.
    ///
    /// Equal distances are ordered by unit identifier.
    #[must_use]
    pub fn enemy_ships_by_distance(world: &World, from: Point) -> Vec<&UnitSnapshot> {
        let player = world.player;
        let mut ships: Vec<&UnitSnapshot> = world
            .units
            .iter()
            .filter(|unit| Some(unit.owner) != player)
            .collect();
        ships.sort_by(|left, right| {
            compare_distance(from, left.position, right.position).then(left.id.cmp(&right.id))
        });
        ships
    }

    /// Reports whether the ship is close enough to dock and a spot is free.
    #[must_use]
    pub fn can_dock(ship: &UnitSnapshot, body: &BodySnapshot) -> bool {
        body.has_free_spot() && ship.position.distance_to(body.center) <= body.radius + DOCK_RADIUS
    }

    /// Point at `reach` from `center` on the side facing `from`.
    ///
    /// A ship sitting exactly on the centre approaches along the positive
    /// `x` axis. The result is clamped into the grid once its size is known.
    #[must_use]
    pub fn standoff_point(world: &World, from: Point, center: Point, reach: f64) -> Point {
        let dx = from.x - center.x;
        let dy = from.y - center.y;
        let length = (dx * dx + dy * dy).sqrt();
        let (ux, uy) = if length > f64::EPSILON {
            (dx / length, dy / length)
        } else {
            (1.0, 0.0)
        };
        let point = Point::new(center.x + ux * reach, center.y + uy * reach);

        match world.size {
            Some(size) if size.width() > 0 && size.height() > 0 => Point::new(
                point.x.clamp(0.0, f64::from(size.width() - 1)),
                point.y.clamp(0.0, f64::from(size.height() - 1)),
            ),
            _ => point,
        }
    }

    fn compare_distance(from: Point, left: Point, right: Point) -> Ordering {
        from.squared_distance_to(left)
            .total_cmp(&from.squared_distance_to(right))
    }
}
