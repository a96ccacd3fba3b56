// Copyright 2023 Google Inc. All rights reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::s2::predicates::{robust_sign, Direction};
use crate::r3::vector::Vector;
use crate::s1::Angle;
use cgmath::{Matrix, Matrix3, Vector3};
use std::f64::consts::PI;

/// Point represents a point on the unit sphere as a normalized 3D vector.
/// Fields should be treated as read-only. Use one of the factory methods
/// for creation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point(pub Vector);

impl Point {
    /// Creates a Point from the given coordinates, normalizing them to unit
    /// length.
    pub fn from_coords(x: f64, y: f64, z: f64) -> Point {
        if x == 0.0 && y == 0.0 && z == 0.0 {
            return Point::origin();
        }
        Point(Vector::new(x, y, z).normalize())
    }

    /// Returns a unique "origin" on the sphere for operations that need a
    /// fixed reference point. In particular, this is the "point at infinity"
    /// used for point-in-polygon testing (by counting the number of edge
    /// crossings).
    ///
    /// It should *not* be a point that is commonly used in edge tests in
    /// order to avoid triggering code to handle degenerate cases (this rules
    /// out the north and south poles). It should also not be on the boundary
    /// of any low-level cell.
    pub fn origin() -> Point {
        Point(Vector::new(
            -0.0099994664350250197,
            0.0025924542609324121,
            0.99994664350250195,
        ))
    }

    pub fn dot(&self, other: &Point) -> f64 {
        self.0.dot(&other.0)
    }

    /// Returns the (unnormalized) cross product of the two points.
    pub fn cross(&self, other: &Point) -> Point {
        Point(self.0.cross(&other.0))
    }

    /// Computes a robust cross product of the two points that is
    /// perpendicular to both inputs even when they are nearly identical or
    /// antipodal, and never returns the zero vector.
    pub fn point_cross(&self, other: &Point) -> Point {
        // (p+op)x(op-p) is 2*(p x op) but with better precision when the two
        // points are close together.
        let x = (self.0 + other.0).cross(&(other.0 - self.0));
        if x == Vector::default() {
            // Any orthogonal vector will do.
            return self.ortho();
        }
        Point(x)
    }

    pub fn ortho(&self) -> Point {
        Point(self.0.ortho())
    }

    // reference_dir returns a unit-length vector to use as the reference
    // direction for deciding whether a polygon with semi-open boundaries
    // contains the given vertex "a" (see angle_contains_vertex). The
    // reference direction may be any vector perpendicular to "a", as long as
    // it is used consistently.
    pub fn reference_dir(&self) -> Point {
        self.ortho()
    }

    /// Returns the angle between the two points.
    pub fn distance(&self, other: &Point) -> Angle {
        Angle(self.0.angle(&other.0))
    }

    pub fn approx_eq(&self, other: &Point) -> bool {
        self.0.angle(&other.0) <= crate::consts::EPSILON
    }

    pub fn is_unit(&self) -> bool {
        self.0.is_unit()
    }
}

impl std::ops::Neg for Point {
    type Output = Point;
    fn neg(self) -> Point {
        Point(-self.0)
    }
}

/// Returns true if the edges OA, OB, and OC are encountered in that order
/// while sweeping CCW around the point O.
///
/// You can think of this as testing whether A <= B <= C with respect to the
/// CCW ordering around O that starts at A, or equivalently, whether B is
/// contained in the range of angles (inclusive) that starts at A and extends
/// CCW to C. Properties:
///
///  (1) If ordered_ccw(a,b,c,o) && ordered_ccw(b,a,c,o), then a == b
///  (2) If ordered_ccw(a,b,c,o) && ordered_ccw(a,c,b,o), then b == c
///  (3) If ordered_ccw(a,b,c,o) && ordered_ccw(c,b,a,o), then a == b == c
///  (4) If a == b or b == c, then ordered_ccw(a,b,c,o) is true
///  (5) Otherwise if a == c, then ordered_ccw(a,b,c,o) is false
pub fn ordered_ccw(a: &Point, b: &Point, c: &Point, o: &Point) -> bool {
    let mut sum = 0;
    if robust_sign(b, o, a) != Direction::Clockwise {
        sum += 1;
    }
    if robust_sign(c, o, b) != Direction::Clockwise {
        sum += 1;
    }
    if robust_sign(a, o, c) == Direction::CounterClockwise {
        sum += 1;
    }
    sum >= 2
}

/// Computes the exterior angle at vertex B in the triangle ABC. The return
/// value is positive if ABC is counterclockwise and negative otherwise. If
/// you imagine an ant walking from A to B to C, this is the angle that the
/// ant turns at vertex B (positive = left = CCW, negative = right = CW).
/// This quantity is also known as the "geodesic curvature" at B.
///
/// Ensures that turn_angle(a,b,c) == -turn_angle(c,b,a) for all distinct
/// a,b,c. The result is undefined if (a == b || b == c), but is either
/// -Pi or Pi if (a == c). All points should be normalized.
pub fn turn_angle(a: &Point, b: &Point, c: &Point) -> Angle {
    // point_cross gives good accuracy when two points are very close
    // together, and robust_sign makes the sign correct for turns that are
    // close to 180 degrees.
    let angle = a.point_cross(b).0.angle(&b.point_cross(c).0);

    // Not robust_sign * angle, because it is legal to have a == c.
    if robust_sign(a, b, c) == Direction::CounterClockwise {
        Angle(angle)
    } else {
        Angle(-angle)
    }
}

/// Returns the orthonormal frame for the given point on the unit sphere:
/// the columns are two orthogonal unit vectors that together with p form a
/// right-handed coordinate system, with p as the last column.
pub fn get_frame(p: &Point) -> Matrix3<f64> {
    let z = p.0;
    let y = p.ortho().0;
    let x = y.cross(&z);
    Matrix3::from_cols(Vector3::from(x), Vector3::from(y), Vector3::from(z))
}

/// Returns the coordinates of q relative to the given frame.
pub fn to_frame(m: &Matrix3<f64>, q: &Point) -> Point {
    // The frame is orthonormal, so its inverse is its transpose.
    Point(Vector::from(m.transpose() * Vector3::from(q.0)))
}

/// Returns the coordinates of the frame-relative point q in the standard
/// basis.
pub fn from_frame(m: &Matrix3<f64>, q: &Point) -> Point {
    Point(Vector::from(*m * Vector3::from(q.0)))
}

/// Returns the vertices of a regular polygon with the given center, radius
/// and number of vertices, in CCW order.
pub fn regular_points(center: &Point, radius: Angle, num_vertices: usize) -> Vec<Point> {
    regular_points_for_frame(&get_frame(center), radius, num_vertices)
}

// regular_points_for_frame builds the polygon in frame coordinates with its
// center at (0, 0, 1). For a loop of radius r the vertices are (x, y, z)
// with x^2 + y^2 = sin(r)^2 and z = cos(r).
pub fn regular_points_for_frame(
    frame: &Matrix3<f64>,
    radius: Angle,
    num_vertices: usize,
) -> Vec<Point> {
    let z = radius.rad().cos();
    let r = radius.rad().sin();
    let radian_step = 2.0 * PI / num_vertices as f64;

    (0..num_vertices)
        .map(|i| {
            let angle = i as f64 * radian_step;
            let p = Point(Vector::new(r * angle.cos(), r * angle.sin(), z));
            Point(from_frame(frame, &p).0.normalize())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::s1::Deg;

    #[test]
    fn test_origin_is_unit() {
        assert!(Point::origin().is_unit());
    }

    #[test]
    fn test_point_cross() {
        let p = Point::from_coords(1.0, 2.0, 3.0);
        let q = Point::from_coords(1.0, 2.0, 3.0 + 1e-15);
        let x = p.point_cross(&q);
        assert!(x.0.norm() > 0.0);
        assert!(x.dot(&p).abs() < 1e-14 * x.0.norm());

        // Identical points still produce a perpendicular vector.
        let y = p.point_cross(&p);
        assert!(y.is_unit());
        assert!(y.dot(&p).abs() < 1e-15);
    }

    #[test]
    fn test_ordered_ccw() {
        let o = Point::from_coords(0.0, 0.0, 1.0);
        let a = Point::from_coords(1.0, 0.0, 0.0);
        let b = Point::from_coords(0.0, 1.0, 0.0);
        let c = Point::from_coords(-1.0, 0.0, 0.0);
        assert!(ordered_ccw(&a, &b, &c, &o));
        assert!(!ordered_ccw(&c, &b, &a, &o));
        assert!(ordered_ccw(&b, &c, &a, &o));

        // Properties (4) and (5).
        assert!(ordered_ccw(&a, &a, &c, &o));
        assert!(ordered_ccw(&a, &c, &c, &o));
        assert!(!ordered_ccw(&a, &b, &a, &o));
    }

    #[test]
    fn test_turn_angle() {
        let a = Point::from_coords(1.0, 0.0, 0.0);
        let b = Point::from_coords(0.0, 1.0, 0.0);
        let c = Point::from_coords(0.0, 0.0, 1.0);
        // Each turn of the octant triangle is 90 degrees to the left.
        assert!((turn_angle(&a, &b, &c).rad() - PI / 2.0).abs() < 1e-15);
        assert!((turn_angle(&c, &b, &a).rad() + PI / 2.0).abs() < 1e-15);
    }

    #[test]
    fn test_frames() {
        let z = Point::from_coords(0.2, 0.5, -3.3);
        let m = get_frame(&z);
        let col2 = Point(Vector::from(m.z));
        assert!(col2.approx_eq(&z));

        for p in [
            Point::from_coords(1.0, 0.0, 0.0),
            Point::from_coords(0.0, 1.0, 0.0),
            Point::from_coords(0.0, 0.0, 1.0),
        ]
        .iter()
        {
            let round_trip = from_frame(&m, &to_frame(&m, p));
            assert!(round_trip.approx_eq(p));
        }
        assert!(to_frame(&m, &z).approx_eq(&Point::from_coords(0.0, 0.0, 1.0)));
    }

    #[test]
    fn test_regular_points() {
        let center = Point::from_coords(1.0, 1.0, 1.0);
        let radius = Angle::from(Deg(10.0));
        let pts = regular_points(&center, radius, 8);
        assert_eq!(pts.len(), 8);
        for p in pts.iter() {
            assert!(p.is_unit());
            assert!((center.distance(p).rad() - radius.rad()).abs() < 1e-14);
        }
        // Vertices wind counterclockwise around the center.
        for i in 0..pts.len() {
            let next = &pts[(i + 1) % pts.len()];
            assert_eq!(robust_sign(&center, &pts[i], next), Direction::CounterClockwise);
        }
    }
}
