use orbital_conquest_core::{Body, CellCoord, GridSize, PlanError, Point, UnitId};
use orbital_conquest_system_navigation::{
    simplify, GoalDistance, Planner, PlannerConfig, SimplifyConfig,
};

fn planner(size: GridSize, bodies: &[Body]) -> Planner {
    Planner::new(size, bodies, &PlannerConfig::default()).expect("planner builds")
}

fn pin(column: u32, row: u32) -> Body {
    Body::new(Point::new(f64::from(column), f64::from(row)), 0.6)
}

fn wall_with_gap_at_the_bottom() -> Vec<Body> {
    (0..8).map(|row| pin(5, row)).collect()
}

fn assert_valid_route(planner: &Planner, path: &[CellCoord], origin: CellCoord, goal: CellCoord) {
    assert_eq!(path.first(), Some(&origin), "route must start at the origin");
    assert_eq!(path.last(), Some(&goal), "route must end at the goal");
    for cell in path {
        assert!(
            !planner.obstacles().is_blocked(*cell),
            "route crosses blocked cell {cell}"
        );
    }
    for pair in path.windows(2) {
        assert!(
            pair[0].is_adjacent_to(pair[1]),
            "{} and {} are not edge-adjacent",
            pair[0],
            pair[1]
        );
    }
}

#[test]
fn every_pair_on_an_empty_grid_connects_origin_and_goal() {
    let size = GridSize::new(6, 6);
    let planner = planner(size, &[]);

    for origin in size.cells() {
        for goal in size.cells() {
            let path = planner
                .find_cells(origin, goal)
                .expect("empty grid keeps every goal reachable");
            assert_valid_route(&planner, &path, origin, goal);
        }
    }
}

#[test]
fn straight_row_is_reduced_to_its_endpoints() {
    let planner = planner(GridSize::new(10, 10), &[]);

    let cells = planner
        .find_cells(CellCoord::new(0, 0), CellCoord::new(9, 0))
        .expect("goal is reachable");
    let expected: Vec<_> = (0..10).map(|column| CellCoord::new(column, 0)).collect();
    assert_eq!(cells, expected);

    let route = planner
        .find_route(Point::new(0.0, 0.0), Point::new(9.0, 0.0))
        .expect("goal is reachable");
    assert_eq!(route, vec![Point::new(0.0, 0.0), Point::new(9.0, 0.0)]);
}

#[test]
fn straight_column_is_reduced_to_its_endpoints() {
    let planner = planner(GridSize::new(10, 10), &[]);

    let route = planner
        .find_route(Point::new(3.0, 9.0), Point::new(3.0, 1.0))
        .expect("goal is reachable");

    assert_eq!(route, vec![Point::new(3.0, 9.0), Point::new(3.0, 1.0)]);
}

#[test]
fn route_detours_around_a_body() {
    let center = Point::new(5.0, 5.0);
    let planner = planner(GridSize::new(12, 12), &[Body::new(center, 3.0)]);
    let origin = CellCoord::new(0, 5);
    let goal = CellCoord::new(11, 5);

    let path = planner.find_cells(origin, goal).expect("body can be bypassed");

    assert_valid_route(&planner, &path, origin, goal);
    assert!(path.len() > 12, "route should leave the blocked row");
    for cell in &path {
        assert!(
            Point::from_cell(*cell).squared_distance_to(center) >= 9.0,
            "{cell} lies inside the body"
        );
    }

    let points: Vec<_> = path.iter().copied().map(Point::from_cell).collect();
    let waypoints = simplify(&points, &SimplifyConfig::default());
    assert_eq!(waypoints.first(), points.first());
    assert_eq!(waypoints.last(), points.last());
    assert!(waypoints.len() < points.len());
    assert_eq!(simplify(&waypoints, &SimplifyConfig::default()), waypoints);
}

#[test]
fn unreachable_goal_is_reported_without_caching() {
    let mut planner = planner(GridSize::new(10, 10), &[Body::new(Point::new(7.0, 7.0), 2.0)]);
    let unit = UnitId::new(4);

    let result = planner.plan(unit, Point::new(0.0, 0.0), Point::new(7.0, 7.0));

    assert_eq!(
        result,
        Err(PlanError::Unreachable {
            origin: CellCoord::new(0, 0),
            goal: CellCoord::new(7, 7),
        })
    );
    assert!(planner.route(unit).is_none());
}

#[test]
fn origin_inside_a_body_is_rejected() {
    let mut planner = planner(GridSize::new(10, 10), &[Body::new(Point::new(2.0, 2.0), 2.0)]);

    let result = planner.plan(UnitId::new(5), Point::new(2.0, 2.0), Point::new(9.0, 9.0));

    assert_eq!(
        result,
        Err(PlanError::OriginBlocked {
            cell: CellCoord::new(2, 2)
        })
    );
}

#[test]
fn cached_route_is_followed_until_invalidated() {
    let mut planner = planner(GridSize::new(10, 10), &wall_with_gap_at_the_bottom());
    let unit = UnitId::new(9);
    let origin = Point::new(0.0, 0.0);

    let _ = planner
        .plan(unit, origin, Point::new(9.0, 0.0))
        .expect("gap keeps the goal reachable");
    let cached = planner
        .route(unit)
        .and_then(|mut route| route.next().copied())
        .expect("detour leaves waypoints queued");

    let stale = planner
        .plan(unit, origin, Point::new(0.0, 9.0))
        .expect("cached waypoint is returned");
    assert_eq!(stale, cached, "stored route is followed despite the new goal");

    let _ = planner.invalidate(unit);
    assert!(planner.route(unit).is_none());

    let _ = planner
        .plan(unit, origin, Point::new(9.0, 0.0))
        .expect("gap keeps the goal reachable");
    assert!(planner.invalidate(unit));

    let fresh = planner
        .plan(unit, origin, Point::new(0.0, 9.0))
        .expect("column is open");
    assert_eq!(fresh, Point::new(0.0, 9.0));
    assert_ne!(fresh, cached);
}

#[test]
fn routes_are_owned_per_unit() {
    let mut planner = planner(GridSize::new(10, 10), &wall_with_gap_at_the_bottom());
    let first = UnitId::new(1);
    let second = UnitId::new(2);

    let _ = planner
        .plan(first, Point::new(0.0, 0.0), Point::new(9.0, 0.0))
        .expect("gap keeps the goal reachable");
    let next = planner
        .plan(second, Point::new(0.0, 0.0), Point::new(0.0, 9.0))
        .expect("column is open");

    assert_eq!(next, Point::new(0.0, 9.0));
    assert!(planner.route(first).is_some());

    planner.retain_units(&[second]);
    assert!(planner.route(first).is_none());
}

#[test]
fn goal_weighting_can_be_substituted() {
    let size = GridSize::new(12, 12);
    let bodies = [Body::new(Point::new(5.0, 5.0), 3.0)];
    let planner = Planner::with_weighting(size, &bodies, &PlannerConfig::default(), GoalDistance)
        .expect("planner builds");
    let origin = CellCoord::new(0, 5);
    let goal = CellCoord::new(11, 5);

    let path = planner.find_cells(origin, goal).expect("body can be bypassed");

    assert_eq!(path.first(), Some(&origin));
    assert_eq!(path.last(), Some(&goal));
    assert!(path.iter().all(|cell| !planner.obstacles().is_blocked(*cell)));
}

#[test]
fn expansion_budget_surfaces_as_an_error() {
    let config = PlannerConfig {
        max_expansions: Some(3),
        ..PlannerConfig::default()
    };
    let mut planner =
        Planner::new(GridSize::new(30, 30), &[], &config).expect("planner builds");

    let result = planner.plan(UnitId::new(6), Point::new(0.0, 0.0), Point::new(29.0, 29.0));

    assert!(matches!(result, Err(PlanError::BudgetExhausted { .. })));
}
