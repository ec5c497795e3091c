//! Static obstacle rasterization used by the planner.

use orbital_conquest_core::{Body, CellCoord, GridSize, Point};

/// Dense occupancy grid marking every cell whose centre lies inside a body.
///
/// The map is built once per match from the static bodies and never rebuilt,
/// so bodies discovered later are not reflected. Cells are stored in
/// row-major order.
#[derive(Clone, Debug)]
pub struct ObstacleMap {
    size: GridSize,
    blocked: Vec<bool>,
}

impl ObstacleMap {
    /// Rasterizes the provided keep-out zones onto a grid of the given size.
    ///
    /// A cell is blocked when the squared distance from its centre to a body
    /// centre is strictly below `(radius + inflation)^2`. Only the bounding
    /// box of each body is scanned.
    #[must_use]
    pub fn build(size: GridSize, bodies: &[Body], inflation: f64) -> Self {
        let mut blocked = vec![false; size.cell_count()];
        if blocked.is_empty() {
            return Self { size, blocked };
        }

        for body in bodies {
            let reach = body.radius + inflation;
            if !reach.is_finite() || reach <= 0.0 {
                continue;
            }
            if !body.center.x.is_finite() || !body.center.y.is_finite() {
                continue;
            }

            let Some((columns, rows)) = bounding_box(size, body.center, reach) else {
                continue;
            };

            let limit = reach * reach;
            for row in rows.0..=rows.1 {
                for column in columns.0..=columns.1 {
                    let cell = CellCoord::new(column, row);
                    if Point::from_cell(cell).squared_distance_to(body.center) >= limit {
                        continue;
                    }

                    if let Some(index) = size.index(cell) {
                        blocked[index] = true;
                    }
                }
            }
        }

        Self { size, blocked }
    }

    /// Dimensions of the rasterized grid.
    #[must_use]
    pub const fn size(&self) -> GridSize {
        self.size
    }

    /// Reports whether the cell is impassable.
    ///
    /// Cells outside the grid are reported as blocked.
    #[must_use]
    pub fn is_blocked(&self, cell: CellCoord) -> bool {
        self.size
            .index(cell)
            .and_then(|index| self.blocked.get(index).copied())
            .unwrap_or(true)
    }

    /// Number of blocked cells inside the grid.
    #[must_use]
    pub fn blocked_count(&self) -> usize {
        self.blocked.iter().filter(|blocked| **blocked).count()
    }
}

type Span = (u32, u32);

fn bounding_box(size: GridSize, center: Point, reach: f64) -> Option<(Span, Span)> {
    let columns = span(center.x, reach, size.width())?;
    let rows = span(center.y, reach, size.height())?;
    Some((columns, rows))
}

fn span(center: f64, reach: f64, extent: u32) -> Option<Span> {
    let last = extent.checked_sub(1)?;
    let low = (center - reach).floor();
    let high = (center + reach).ceil();

    if high < 0.0 || low > f64::from(last) {
        return None;
    }

    let low = low.max(0.0) as u32;
    let high = high.min(f64::from(last)) as u32;
    Some((low, high))
}
