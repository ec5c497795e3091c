#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Per-turn fleet controller that expands onto empty bodies and then hunts
//! enemy ships, steering every move through the grid path planner.

use std::collections::HashMap;

use log::{debug, info, warn};
use orbital_conquest_core::{
    BodyId, BodySnapshot, Command, DockingStatus, Event, Point, UnitId, UnitSnapshot, SHIP_RADIUS,
};
use orbital_conquest_system_navigation::{Planner, PlannerConfig};
use orbital_conquest_world::{query, World};

/// What a ship is currently heading for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Objective {
    /// Approach and dock to an unowned body.
    Colonize(BodyId),
    /// Close in on an enemy ship.
    Attack(UnitId),
}

/// Pure system that reacts to world events and emits one command per ship.
#[derive(Debug)]
pub struct FleetControl {
    config: PlannerConfig,
    planner: Option<Planner>,
    objectives: HashMap<UnitId, Objective>,
}

impl FleetControl {
    /// Creates a controller that builds its planner with `config` once the
    /// match starts.
    #[must_use]
    pub fn new(config: PlannerConfig) -> Self {
        Self {
            config,
            planner: None,
            objectives: HashMap::new(),
        }
    }

    /// Consumes world events and the current world state to emit commands.
    pub fn handle(&mut self, events: &[Event], world: &World, out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::MatchStarted { size, .. } => {
                    let bodies: Vec<_> = query::bodies(world)
                        .iter()
                        .map(BodySnapshot::body)
                        .collect();
                    self.objectives.clear();
                    self.planner = match Planner::new(*size, &bodies, &self.config) {
                        Ok(planner) => {
                            info!(
                                "planner ready with {} blocked cells",
                                planner.obstacles().blocked_count()
                            );
                            Some(planner)
                        }
                        Err(error) => {
                            warn!("planner unavailable: {error}");
                            None
                        }
                    };
                }
                Event::UnitLost { unit } => {
                    let _ = self.objectives.remove(unit);
                    if let Some(planner) = self.planner.as_mut() {
                        let _ = planner.invalidate(*unit);
                    }
                }
            }
        }

        let Some(planner) = self.planner.as_mut() else {
            return;
        };

        let alive: Vec<UnitId> = query::my_ships(world).map(|ship| ship.id).collect();
        planner.retain_units(&alive);
        self.objectives.retain(|unit, _| alive.contains(unit));

        let own_count = alive.len();
        let mut turn = TurnAssignments::default();

        for ship in query::my_ships(world) {
            if ship.docking_status != DockingStatus::Undocked {
                if self.objectives.remove(&ship.id).is_some() {
                    let _ = planner.invalidate(ship.id);
                }
                continue;
            }

            let empty = query::empty_bodies_by_distance(world, ship.position);
            if let Some(body) = turn.pick_body(&empty) {
                update_objective(
                    &mut self.objectives,
                    planner,
                    ship.id,
                    Objective::Colonize(body.id),
                );

                if query::can_dock(ship, body) {
                    let _ = planner.invalidate(ship.id);
                    out.push(Command::Dock {
                        unit: ship.id,
                        body: body.id,
                    });
                    continue;
                }

                let reach = body.radius + planner.standoff_distance();
                let destination = query::standoff_point(world, ship.position, body.center, reach);
                out.push(steer(planner, ship, destination));
                continue;
            }

            let enemies = query::enemy_ships_by_distance(world, ship.position);
            let Some(enemy) = turn.pick_enemy(&enemies, own_count) else {
                if self.objectives.remove(&ship.id).is_some() {
                    let _ = planner.invalidate(ship.id);
                }
                out.push(Command::Hold { unit: ship.id });
                continue;
            };

            update_objective(
                &mut self.objectives,
                planner,
                ship.id,
                Objective::Attack(enemy.id),
            );
            let reach = SHIP_RADIUS + planner.standoff_distance();
            let destination = query::standoff_point(world, ship.position, enemy.position, reach);
            out.push(steer(planner, ship, destination));
        }
    }

    /// Objective the ship pursued during the latest turn.
    #[must_use]
    pub fn objective(&self, unit: UnitId) -> Option<Objective> {
        self.objectives.get(&unit).copied()
    }

    /// Planner built when the match started.
    #[must_use]
    pub fn planner(&self) -> Option<&Planner> {
        self.planner.as_ref()
    }
}

impl Default for FleetControl {
    fn default() -> Self {
        Self::new(PlannerConfig::default())
    }
}

/// Claims made by ships earlier in the same turn.
#[derive(Debug, Default)]
struct TurnAssignments {
    claimed_bodies: Vec<BodyId>,
    attackers: HashMap<UnitId, usize>,
}

impl TurnAssignments {
    /// Nearest empty body not yet claimed this turn, or the nearest overall.
    fn pick_body<'a>(&mut self, empty: &[&'a BodySnapshot]) -> Option<&'a BodySnapshot> {
        let chosen = empty
            .iter()
            .copied()
            .find(|body| !self.claimed_bodies.contains(&body.id))
            .or_else(|| empty.first().copied())?;
        self.claimed_bodies.push(chosen.id);
        Some(chosen)
    }

    /// Nearest enemy still below its share of attackers, or the nearest overall.
    fn pick_enemy<'a>(
        &mut self,
        enemies: &[&'a UnitSnapshot],
        own_count: usize,
    ) -> Option<&'a UnitSnapshot> {
        if enemies.is_empty() {
            return None;
        }

        let share = own_count.div_ceil(enemies.len()).max(1);
        let chosen = enemies
            .iter()
            .copied()
            .find(|enemy| self.attackers.get(&enemy.id).copied().unwrap_or(0) < share)
            .or_else(|| enemies.first().copied())?;
        *self.attackers.entry(chosen.id).or_insert(0) += 1;
        Some(chosen)
    }
}

fn update_objective(
    objectives: &mut HashMap<UnitId, Objective>,
    planner: &mut Planner,
    unit: UnitId,
    objective: Objective,
) {
    if let Some(previous) = objectives.insert(unit, objective) {
        if previous != objective && planner.invalidate(unit) {
            debug!("unit {} switched from {previous:?} to {objective:?}", unit.get());
        }
    }
}

fn steer(planner: &mut Planner, ship: &UnitSnapshot, destination: Point) -> Command {
    let next = match planner.plan(ship.id, ship.position, destination) {
        Ok(next) => next,
        Err(error) => {
            warn!(
                "unit {} flies straight to {destination}: {error}",
                ship.id.get()
            );
            destination
        }
    };

    Command::MoveTo {
        unit: ship.id,
        destination: next,
    }
}
