//! Collinearity-based waypoint reduction.

use log::debug;
use orbital_conquest_core::Point;

/// Tolerances deciding when a point still continues the active segment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimplifyConfig {
    /// Half-width of the corridor around a sloped segment; points whose
    /// perpendicular distance is strictly below it are merged.
    pub band_half_width: f64,
    /// Maximum offset from a vertical or horizontal segment, inclusive.
    pub axis_tolerance: f64,
}

impl Default for SimplifyConfig {
    fn default() -> Self {
        Self {
            band_half_width: 0.8,
            axis_tolerance: 1.1,
        }
    }
}

/// Collapses a cell-by-cell route into the waypoints where it changes course.
///
/// The first and last points are always kept. Routes shorter than three
/// points are returned unchanged. Reduction passes repeat until one keeps
/// every point, so simplifying an already simplified route is a no-op.
#[must_use]
pub fn simplify(path: &[Point], config: &SimplifyConfig) -> Vec<Point> {
    let mut current = reduce_once(path, config);
    loop {
        let next = reduce_once(&current, config);
        // Each pass keeps an ordered subset, so equal length means equal points.
        if next.len() == current.len() {
            return current;
        }
        current = next;
    }
}

/// One anchor-to-end sweep over the route.
fn reduce_once(path: &[Point], config: &SimplifyConfig) -> Vec<Point> {
    let [first, second, rest @ ..] = path else {
        return path.to_vec();
    };
    if rest.is_empty() {
        return path.to_vec();
    }

    let mut anchor = *first;
    let mut end = *second;
    let mut waypoints = vec![anchor];

    for &point in rest {
        if !is_collinear(anchor, end, point, config) {
            waypoints.push(end);
            anchor = end;
        }
        end = point;
    }

    waypoints.push(end);
    waypoints
}

/// Reports whether `point` lies within tolerance of the line through `a` and `b`.
fn is_collinear(a: Point, b: Point, point: Point, config: &SimplifyConfig) -> bool {
    if b.x == a.x {
        if b.y == a.y {
            debug!("collinearity test against coincident points {a} and {b}");
            return true;
        }
        return (point.x - a.x).abs() <= config.axis_tolerance;
    }

    if b.y == a.y {
        return (point.y - a.y).abs() <= config.axis_tolerance;
    }

    let slope = (b.y - a.y) / (b.x - a.x);
    let intercept = (a.y * b.x - b.y * a.x) / (b.x - a.x);
    let normal_slope = -1.0 / slope;
    let normal_intercept = point.y - normal_slope * point.x;

    let foot_x = (normal_intercept - intercept) / (slope - normal_slope);
    let foot = Point::new(foot_x, slope * foot_x + intercept);

    point.distance_to(foot) < config.band_half_width
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points(coords: &[(f64, f64)]) -> Vec<Point> {
        coords.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    #[test]
    fn horizontal_corridor_collapses_to_endpoints() {
        let path: Vec<_> = (0..10).map(|x| Point::new(f64::from(x), 0.0)).collect();
        let simplified = simplify(&path, &SimplifyConfig::default());
        assert_eq!(simplified, points(&[(0.0, 0.0), (9.0, 0.0)]));
    }

    #[test]
    fn vertical_corridor_collapses_to_endpoints() {
        let path: Vec<_> = (0..7).map(|y| Point::new(4.0, f64::from(y))).collect();
        let simplified = simplify(&path, &SimplifyConfig::default());
        assert_eq!(simplified, points(&[(4.0, 0.0), (4.0, 6.0)]));
    }

    #[test]
    fn short_paths_are_returned_unchanged() {
        let config = SimplifyConfig::default();
        assert!(simplify(&[], &config).is_empty());

        let pair = points(&[(0.0, 0.0), (1.0, 0.0)]);
        assert_eq!(simplify(&pair, &config), pair);
    }

    #[test]
    fn corner_emits_a_waypoint() {
        let path = points(&[
            (0.0, 0.0),
            (1.0, 0.0),
            (2.0, 0.0),
            (2.0, 1.0),
            (2.0, 2.0),
        ]);
        let simplified = simplify(&path, &SimplifyConfig::default());

        assert_eq!(simplified, points(&[(0.0, 0.0), (2.0, 1.0), (2.0, 2.0)]));
        assert_eq!(simplify(&simplified, &SimplifyConfig::default()), simplified);
    }

    #[test]
    fn long_corner_keeps_the_turn() {
        let mut path: Vec<_> = (0..6).map(|x| Point::new(f64::from(x), 0.0)).collect();
        path.extend((1..6).map(|y| Point::new(5.0, f64::from(y))));

        let simplified = simplify(&path, &SimplifyConfig::default());

        assert_eq!(simplified.first(), path.first());
        assert_eq!(simplified.last(), path.last());
        assert_eq!(simplified, points(&[(0.0, 0.0), (5.0, 1.0), (5.0, 5.0)]));
        assert_eq!(simplify(&simplified, &SimplifyConfig::default()), simplified);
    }

    #[test]
    fn staircase_is_treated_as_a_diagonal() {
        let path = points(&[
            (0.0, 0.0),
            (1.0, 0.0),
            (1.0, 1.0),
            (2.0, 1.0),
            (2.0, 2.0),
            (3.0, 2.0),
            (3.0, 3.0),
        ]);
        let simplified = simplify(&path, &SimplifyConfig::default());

        assert_eq!(simplified.first(), Some(&Point::new(0.0, 0.0)));
        assert_eq!(simplified.last(), Some(&Point::new(3.0, 3.0)));
        assert!(simplified.len() < path.len());
    }

    #[test]
    fn shallow_staircase_reaches_a_fixed_point() {
        let mut path = vec![Point::new(24.0, 10.0)];
        let mut x = 24.0;
        let mut y = 10.0;
        for _ in 0..6 {
            for _ in 0..2 {
                x -= 1.0;
                path.push(Point::new(x, y));
            }
            y += 1.0;
            path.push(Point::new(x, y));
        }
        let config = SimplifyConfig::default();

        let simplified = simplify(&path, &config);

        assert_eq!(simplified.first(), path.first());
        assert_eq!(simplified.last(), path.last());
        assert_eq!(reduce_once(&simplified, &config), simplified);
        assert_eq!(simplify(&simplified, &config), simplified);
    }

    #[test]
    fn axis_tolerance_is_inclusive() {
        let config = SimplifyConfig::default();
        let a = Point::new(0.0, 0.0);
        let b = Point::new(0.0, 5.0);

        assert!(is_collinear(a, b, Point::new(1.1, 6.0), &config));
        assert!(!is_collinear(a, b, Point::new(1.2, 6.0), &config));
    }

    #[test]
    fn sloped_band_is_strict() {
        let config = SimplifyConfig::default();
        let a = Point::new(0.0, 0.0);
        let b = Point::new(4.0, 4.0);

        assert!(is_collinear(a, b, Point::new(5.0, 5.5), &config));
        assert!(!is_collinear(a, b, Point::new(5.0, 6.2), &config));
    }

    #[test]
    fn coincident_anchor_points_are_trivially_collinear() {
        let config = SimplifyConfig::default();
        let a = Point::new(3.0, 3.0);
        assert!(is_collinear(a, a, Point::new(9.0, -4.0), &config));
    }
}
