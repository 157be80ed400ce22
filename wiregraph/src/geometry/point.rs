use serde::{Deserialize, Serialize};

/// A point on the drawing plane (mm).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// True when both points are within `tolerance` of each other.
    pub fn coincides(&self, other: &Point, tolerance: f64) -> bool {
        self.distance(other) < tolerance
    }

    pub fn offset(&self, dx: f64, dy: f64) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }

    /// Distance from this point to the segment `start..end`.
    pub fn distance_to_segment(&self, start: &Point, end: &Point) -> f64 {
        let dx = end.x - start.x;
        let dy = end.y - start.y;
        let length_sq = dx * dx + dy * dy;

        if length_sq < 1e-12 {
            return self.distance(start);
        }

        let t = ((self.x - start.x) * dx + (self.y - start.y) * dy) / length_sq;
        let t = t.clamp(0.0, 1.0);
        let proj = Point::new(start.x + t * dx, start.y + t * dy);
        self.distance(&proj)
    }

    /// Closest point to this one on the segment `start..end`.
    pub fn closest_on_segment(&self, start: &Point, end: &Point) -> Point {
        let t = self.projection_param(start, end).clamp(0.0, 1.0);
        Point::new(start.x + t * (end.x - start.x), start.y + t * (end.y - start.y))
    }

    /// Position of this point's projection along `start..end`, 0 at start and 1 at end.
    pub fn projection_param(&self, start: &Point, end: &Point) -> f64 {
        let dx = end.x - start.x;
        let dy = end.y - start.y;
        let length_sq = dx * dx + dy * dy;
        if length_sq < 1e-12 {
            return 0.0;
        }
        ((self.x - start.x) * dx + (self.y - start.y) * dy) / length_sq
    }

    /// Check if the point lies on the segment, strictly between its endpoints.
    ///
    /// Points within `tolerance` of either endpoint are not interior.
    pub fn lies_inside_segment(&self, start: &Point, end: &Point, tolerance: f64) -> bool {
        if self.coincides(start, tolerance) || self.coincides(end, tolerance) {
            return false;
        }
        self.distance_to_segment(start, end) < tolerance
    }
}

/// Axis-aligned rectangle, used for neighborhood scoping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Point,
    pub max: Point,
}

impl Rect {
    /// Smallest rectangle containing every point, `None` for an empty iterator.
    pub fn bounding<'a>(points: impl IntoIterator<Item = &'a Point>) -> Option<Rect> {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        let mut rect = Rect {
            min: first,
            max: first,
        };
        for p in iter {
            rect.min.x = rect.min.x.min(p.x);
            rect.min.y = rect.min.y.min(p.y);
            rect.max.x = rect.max.x.max(p.x);
            rect.max.y = rect.max.y.max(p.y);
        }
        Some(rect)
    }

    pub fn of_segment(a: &Point, b: &Point) -> Rect {
        Rect {
            min: Point::new(a.x.min(b.x), a.y.min(b.y)),
            max: Point::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    pub fn padded(&self, pad: f64) -> Rect {
        Rect {
            min: self.min.offset(-pad, -pad),
            max: self.max.offset(pad, pad),
        }
    }

    pub fn contains(&self, p: &Point) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        !(self.max.x < other.min.x
            || other.max.x < self.min.x
            || self.max.y < other.min.y
            || other.max.y < self.min.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance() {
        let p1 = Point::new(0.0, 0.0);
        let p2 = Point::new(3.0, 4.0);

        assert!((p1.distance(&p2) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_point_inside_segment() {
        let start = Point::new(0.0, 0.0);
        let end = Point::new(10.0, 0.0);

        assert!(Point::new(5.0, 0.001).lies_inside_segment(&start, &end, 0.01));
        assert!(!Point::new(5.0, 2.0).lies_inside_segment(&start, &end, 0.01));
        // endpoints are not interior
        assert!(!Point::new(10.0, 0.0).lies_inside_segment(&start, &end, 0.01));
        assert!(!Point::new(11.0, 0.0).lies_inside_segment(&start, &end, 0.01));
    }

    #[test]
    fn test_bounding_rect() {
        let pts = [Point::new(1.0, 5.0), Point::new(-2.0, 3.0), Point::new(4.0, -1.0)];
        let rect = Rect::bounding(pts.iter()).unwrap();
        assert_eq!(rect.min, Point::new(-2.0, -1.0));
        assert_eq!(rect.max, Point::new(4.0, 5.0));
        assert!(rect.padded(1.0).contains(&Point::new(5.0, 6.0)));
        assert!(Rect::bounding(std::iter::empty()).is_none());
    }
}
