//! Geometry Policy
//!
//! Spatial tolerance, grid snapping and the decomposition of an arbitrary
//! two-point request into a routable path. Stateless: the same policy value is
//! handed to every transaction and rule.

use serde::{Deserialize, Serialize};

use super::point::Point;

/// Which segment directions count as "direct" (drawable without a corner).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Routing {
    /// Horizontal and vertical segments only.
    #[default]
    Orthogonal,
    /// Horizontal, vertical and 45° diagonal segments.
    Octilinear,
}

/// Direction class of a direct segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Horizontal,
    Vertical,
    Diagonal,
}

/// Preferred leg order when a corner has to be inserted.
///
/// Under octilinear routing `HorizontalFirst` means "straight leg first" and
/// `VerticalFirst` means "diagonal leg first".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathStrategy {
    #[default]
    HorizontalFirst,
    VerticalFirst,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeometryPolicy {
    /// Distance below which two points are the same point.
    pub epsilon: f64,
    /// Snap grid pitch; zero disables snapping.
    pub grid: f64,
    pub routing: Routing,
    pub strategy: PathStrategy,
}

impl Default for GeometryPolicy {
    fn default() -> Self {
        Self {
            epsilon: 0.01,
            grid: 1.27,
            routing: Routing::Orthogonal,
            strategy: PathStrategy::HorizontalFirst,
        }
    }
}

impl GeometryPolicy {
    pub fn orthogonal(epsilon: f64, grid: f64) -> Self {
        Self {
            epsilon,
            grid,
            ..Self::default()
        }
    }

    pub fn octilinear(epsilon: f64, grid: f64) -> Self {
        Self {
            epsilon,
            grid,
            routing: Routing::Octilinear,
            ..Self::default()
        }
    }

    /// Quantize a point to the grid.
    pub fn snap(&self, point: Point) -> Point {
        if self.grid <= 0.0 {
            return point;
        }
        Point::new(
            (point.x / self.grid).round() * self.grid,
            (point.y / self.grid).round() * self.grid,
        )
    }

    /// Orientation of `a..b` if it is a direct segment under this policy.
    ///
    /// Coincident points have no orientation.
    pub fn orientation(&self, a: &Point, b: &Point) -> Option<Orientation> {
        let dx = (b.x - a.x).abs();
        let dy = (b.y - a.y).abs();
        if dx < self.epsilon && dy < self.epsilon {
            return None;
        }
        if dy < self.epsilon {
            return Some(Orientation::Horizontal);
        }
        if dx < self.epsilon {
            return Some(Orientation::Vertical);
        }
        if self.routing == Routing::Octilinear && (dx - dy).abs() < self.epsilon {
            return Some(Orientation::Diagonal);
        }
        None
    }

    pub fn is_direct(&self, a: &Point, b: &Point) -> bool {
        self.orientation(a, b).is_some()
    }

    /// True when `a`, `pivot` and `b` lie on one straight line with the pivot between them.
    ///
    /// The pivot may sit up to `epsilon` off the line `a..b`, the same slack
    /// [`GeometryPolicy::orientation`] gives an axis-aligned segment.
    pub fn is_straight_through(&self, a: &Point, pivot: &Point, b: &Point) -> bool {
        if pivot.coincides(a, self.epsilon) || pivot.coincides(b, self.epsilon) {
            return false;
        }
        let (ux, uy) = (a.x - pivot.x, a.y - pivot.y);
        let (vx, vy) = (b.x - pivot.x, b.y - pivot.y);
        let dot = ux * vx + uy * vy;
        dot < 0.0 && pivot.distance_to_segment(a, b) < self.epsilon
    }

    /// Route from `from` to `to`.
    ///
    /// Returns the ordered points after `from`, always ending with `to`. A
    /// direct or degenerate request yields `[to]`; otherwise exactly one corner
    /// is inserted. When `last` is given the first leg alternates with it,
    /// otherwise the configured strategy decides.
    pub fn decompose_path(&self, from: Point, to: Point, last: Option<Orientation>) -> Vec<Point> {
        if from.coincides(&to, self.epsilon) || self.is_direct(&from, &to) {
            return vec![to];
        }

        let corner = match self.routing {
            Routing::Orthogonal => {
                let horizontal_first = match last {
                    Some(Orientation::Horizontal) => false,
                    Some(Orientation::Vertical) | Some(Orientation::Diagonal) => true,
                    None => self.strategy == PathStrategy::HorizontalFirst,
                };
                if horizontal_first {
                    Point::new(to.x, from.y)
                } else {
                    Point::new(from.x, to.y)
                }
            }
            Routing::Octilinear => {
                let straight_first = match last {
                    Some(Orientation::Diagonal) => true,
                    Some(_) => false,
                    None => self.strategy == PathStrategy::HorizontalFirst,
                };
                octilinear_corner(from, to, straight_first)
            }
        };

        vec![corner, to]
    }
}

fn octilinear_corner(from: Point, to: Point, straight_first: bool) -> Point {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let run = dx.abs().min(dy.abs());
    let (sx, sy) = (dx.signum(), dy.signum());

    if straight_first {
        if dx.abs() > dy.abs() {
            Point::new(to.x - sx * run, from.y)
        } else {
            Point::new(from.x, to.y - sy * run)
        }
    } else {
        Point::new(from.x + sx * run, from.y + sy * run)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snap_to_grid() {
        let policy = GeometryPolicy::orthogonal(0.01, 2.5);
        assert_eq!(policy.snap(Point::new(3.6, -1.1)), Point::new(5.0, 0.0));

        let no_grid = GeometryPolicy::orthogonal(0.01, 0.0);
        assert_eq!(no_grid.snap(Point::new(3.6, -1.1)), Point::new(3.6, -1.1));
    }

    #[test]
    fn test_aligned_path_is_single_point() {
        let policy = GeometryPolicy::default();
        let path = policy.decompose_path(Point::new(0.0, 0.0), Point::new(0.0, 40.0), None);
        assert_eq!(path, vec![Point::new(0.0, 40.0)]);

        let degenerate = policy.decompose_path(Point::new(1.0, 1.0), Point::new(1.0, 1.0), None);
        assert_eq!(degenerate.len(), 1);
    }

    #[test]
    fn test_corner_follows_strategy() {
        let from = Point::new(0.0, 0.0);
        let to = Point::new(10.0, 20.0);

        let h = GeometryPolicy::default();
        assert_eq!(h.decompose_path(from, to, None), vec![Point::new(10.0, 0.0), to]);

        let v = GeometryPolicy {
            strategy: PathStrategy::VerticalFirst,
            ..GeometryPolicy::default()
        };
        assert_eq!(v.decompose_path(from, to, None), vec![Point::new(0.0, 20.0), to]);
    }

    #[test]
    fn test_corner_alternates_with_last_segment() {
        let policy = GeometryPolicy::default();
        let from = Point::new(0.0, 0.0);
        let to = Point::new(10.0, 20.0);

        let after_horizontal = policy.decompose_path(from, to, Some(Orientation::Horizontal));
        assert_eq!(after_horizontal[0], Point::new(0.0, 20.0));

        let after_vertical = policy.decompose_path(from, to, Some(Orientation::Vertical));
        assert_eq!(after_vertical[0], Point::new(10.0, 0.0));
    }

    #[test]
    fn test_octilinear_diagonal_is_direct() {
        let policy = GeometryPolicy::octilinear(0.01, 1.0);
        let from = Point::new(0.0, 0.0);
        assert_eq!(
            policy.orientation(&from, &Point::new(5.0, -5.0)),
            Some(Orientation::Diagonal)
        );
        assert_eq!(policy.decompose_path(from, Point::new(5.0, 5.0), None).len(), 1);

        let path = policy.decompose_path(from, Point::new(10.0, 4.0), None);
        assert_eq!(path, vec![Point::new(6.0, 0.0), Point::new(10.0, 4.0)]);
        assert!(policy.is_direct(&path[0], &path[1]));

        let diag_first = policy.decompose_path(from, Point::new(10.0, 4.0), Some(Orientation::Horizontal));
        assert_eq!(diag_first[0], Point::new(4.0, 4.0));
    }

    #[test]
    fn test_straight_through() {
        let policy = GeometryPolicy::default();
        let pivot = Point::new(5.0, 0.0);
        assert!(policy.is_straight_through(&Point::new(0.0, 0.0), &pivot, &Point::new(9.0, 0.0)));
        assert!(!policy.is_straight_through(&Point::new(0.0, 0.0), &pivot, &Point::new(5.0, 4.0)));
        // both on the same side is a fold, not a straight run
        assert!(!policy.is_straight_through(&Point::new(0.0, 0.0), &pivot, &Point::new(1.0, 0.0)));
    }

    #[test]
    fn test_straight_through_within_epsilon() {
        let policy = GeometryPolicy::default();
        let a = Point::new(0.0, 0.0);
        let b = Point::new(100.0, 0.0);
        // horizontal legs by `orientation`, so the run is straight too
        let pivot = Point::new(50.0, 0.005);
        assert_eq!(policy.orientation(&a, &pivot), Some(Orientation::Horizontal));
        assert!(policy.is_straight_through(&a, &pivot, &b));

        assert!(!policy.is_straight_through(&a, &Point::new(50.0, 0.02), &b));
    }
}
