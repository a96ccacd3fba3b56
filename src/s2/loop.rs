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

use crate::consts::DBL_EPSILON;
use crate::r3::vector::Vector;
use crate::s1::Angle;
use crate::s2::crossing_edge_query::{CrossingEdgeQuery, CrossingType};
use crate::s2::edge_crosser::EdgeCrosser;
use crate::s2::edge_crossings::{angle_contains_vertex, crossing_sign, Crossing};
use crate::s2::error::{S2Error, S2Result};
use crate::s2::loop_crosser::has_crossing_relation;
use crate::s2::loop_relations::{
    BoundaryCondition, CompareBoundaryRelation, ContainsRelation, IntersectsRelation,
};
use crate::s2::point::{get_frame, regular_points_for_frame, turn_angle, Point};
use crate::s2::shape::{Edge, ReferencePoint, Shape};
use crate::s2::shape_index::{ShapeIndex, ShapeIndexIterator};
use crate::s2::wedge_relations::{wedge_contains, wedge_contains_semiwedge};
use cgmath::Matrix3;
use std::cmp::Ordering;
use std::f64::consts::PI;
use std::fmt;
use std::sync::OnceLock;

// These two points are used for the special Empty and Full loops.
const EMPTY_LOOP_POINT: Point = Point(Vector::new(0.0, 0.0, 1.0));
const FULL_LOOP_POINT: Point = Point(Vector::new(0.0, 0.0, -1.0));

// For small loops it is faster to just check all the crossings.
const MAX_BRUTE_FORCE_VERTICES: usize = 32;

// Below this many vertices find_vertex scans the vertex list instead of the index.
const MAX_SCAN_VERTICES: usize = 10;

/// Loop represents a simple spherical polygon. It consists of a sequence
/// of vertices where the first vertex is implicitly connected to the
/// last. All loops are defined to have a CCW orientation, i.e. the interior of
/// the loop is on the left side of the edges. This implies that a clockwise
/// loop enclosing a small area is interpreted to be a CCW loop enclosing a
/// very large area.
///
/// Loops are not allowed to have any duplicate vertices (whether adjacent or
/// not). Non-adjacent edges are not allowed to intersect, and furthermore edges
/// of length 180 degrees are not allowed (i.e., adjacent vertices cannot be
/// antipodal). Loops must have at least 3 vertices (except for the "empty" and
/// "full" loops discussed below).
///
/// There are two special loops: the "empty" loop contains no points and the
/// "full" loop contains all points. These loops do not have any edges, but to
/// preserve the invariant that every loop can be represented as a vertex
/// chain, they are defined as having exactly one vertex each (see Loop::empty
/// and Loop::full).
#[derive(Clone)]
pub struct Loop {
    /// The vertices of the loop. These should be ordered counterclockwise
    /// around the loop interior.
    vertices: Vec<Point>,

    /// origin_inside keeps a precomputed value whether this loop contains the
    /// origin versus computing from the set of vertices every time.
    origin_inside: bool,

    /// depth is the nesting depth of this Loop if it is contained by a
    /// polygon or other shape and is used to determine if this loop
    /// represents a hole or a filled in portion.
    depth: i32,

    /// The spatial index for this loop, built on first use. An unset cell
    /// means the index is stale and must be rebuilt before it is read.
    index: OnceLock<ShapeIndex>,
}

impl fmt::Debug for Loop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Loop")
            .field("vertices", &self.vertices)
            .field("origin_inside", &self.origin_inside)
            .field("depth", &self.depth)
            .finish()
    }
}

impl Loop {
    /// Creates a new loop from the given points.
    pub fn from_points(pts: Vec<Point>) -> Self {
        let mut l = Loop {
            vertices: pts,
            origin_inside: false,
            depth: 0,
            index: OnceLock::new(),
        };
        l.init_origin();
        l
    }

    /// Returns a special "empty" loop.
    pub fn empty() -> Self {
        Self::from_points(vec![EMPTY_LOOP_POINT])
    }

    /// Returns a special "full" loop.
    pub fn full() -> Self {
        Self::from_points(vec![FULL_LOOP_POINT])
    }

    /// Creates a loop with the given number of vertices, all located on a
    /// circle of the specified radius around the given center.
    pub fn regular_loop(center: Point, radius: Angle, n: usize) -> Self {
        Self::regular_loop_for_frame(&get_frame(&center), radius, n)
    }

    /// Creates a loop centered at the z-axis of the given coordinate frame,
    /// with the specified angular radius and number of vertices.
    pub fn regular_loop_for_frame(frame: &Matrix3<f64>, radius: Angle, n: usize) -> Self {
        Loop::from_points(regular_points_for_frame(frame, radius, n))
    }

    // init_origin sets the origin containment for the loop. Containment is
    // decided by guessing that the origin is outside and then checking
    // whether that guess gives the right answer for vertex 1.
    fn init_origin(&mut self) {
        if self.vertices.len() < 3 {
            // Check for the special empty and full loops (which have one
            // vertex). If the vertex is in the southern hemisphere then the
            // loop is full, otherwise it is empty.
            self.origin_inside = self.vertices.len() == 1 && self.vertices[0].0.z < 0.0;
            return;
        }

        // A loop with consecutive vertices A,B,C contains vertex B if and only
        // if the fixed vector R = B.ortho() is contained by the wedge ABC.
        // The wedge is closed at A and open at C, i.e. the point B is inside
        // the loop if A = R but not if C = R. This convention is required for
        // compatibility with vertex_crossing.
        self.origin_inside = false;
        let v1_inside = self.vertex(0) != self.vertex(1)
            && self.vertex(2) != self.vertex(1)
            && angle_contains_vertex(&self.vertex(0), &self.vertex(1), &self.vertex(2));

        // The index does not exist yet, so this must not go through contains_point.
        if v1_inside != self.brute_force_contains_point(&self.vertex(1)) {
            self.origin_inside = true;
        }
    }

    /// Returns the spatial index over this loop's edges, building it if the
    /// loop has changed since it was last built.
    pub fn index(&self) -> &ShapeIndex {
        self.index.get_or_init(|| ShapeIndex::new(&[self as &dyn Shape]))
    }

    /// Reports whether this is the special empty loop that contains no points.
    pub fn is_empty(&self) -> bool {
        self.is_empty_or_full() && !self.contains_origin()
    }

    /// Reports whether this is the special full loop that contains all points.
    pub fn is_full(&self) -> bool {
        self.is_empty_or_full() && self.contains_origin()
    }

    /// Reports whether this loop is either the "empty" or "full" special loops.
    /// A loop with no vertices at all is treated as empty.
    pub fn is_empty_or_full(&self) -> bool {
        self.vertices.len() <= 1
    }

    /// Returns whether the loop contains origin.
    pub fn contains_origin(&self) -> bool {
        self.origin_inside
    }

    /// Returns the vertices of the loop.
    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    /// Returns the number of vertices in this loop.
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Returns the vertex at the given index. For convenience, the vertex
    /// indices wrap automatically for methods that do index math such as
    /// edge, i.e. vertex(num_edges() + n) is the same as vertex(n).
    pub fn vertex(&self, i: usize) -> Point {
        self.vertices[i % self.vertices.len()]
    }

    /// Returns the vertex in reverse order if the loop represents a polygon
    /// hole. For example, arguments 0, 1, 2 are mapped to vertices n-1, n-2,
    /// n-3, where n == num_vertices(). This ensures that the interior of the
    /// polygon is always to the left of the vertex chain.
    ///
    /// This requires: 0 <= i < 2 * num_vertices()
    pub fn oriented_vertex(&self, i: usize) -> Point {
        let n = self.vertices.len();
        let mut j = if i >= n { i - n } else { i };
        if self.is_hole() {
            j = n - 1 - j;
        }
        self.vertex(j)
    }

    /// Returns the nesting depth of this loop.
    pub fn depth(&self) -> i32 {
        self.depth
    }

    /// Sets the nesting depth of this loop. Odd depths mark holes.
    pub fn set_depth(&mut self, depth: i32) {
        self.depth = depth;
    }

    /// Returns whether this loop represents a hole in its containing polygon.
    pub fn is_hole(&self) -> bool {
        (self.depth & 1) != 0
    }

    /// Returns -1 if this Loop represents a hole in its containing polygon,
    /// and +1 otherwise.
    pub fn sign(&self) -> i32 {
        if self.is_hole() {
            -1
        } else {
            1
        }
    }

    /// Returns true if this loop contains the point.
    pub fn contains_point(&self, p: &Point) -> bool {
        if self.vertices.len() <= MAX_BRUTE_FORCE_VERTICES {
            return self.brute_force_contains_point(p);
        }

        // Otherwise, look up the point in the index.
        let mut it = self.index().iterator();
        if !it.locate_point(p) {
            return false;
        }
        self.iterator_contains_point(&it, p)
    }

    /// Reports if the given point is contained by this loop, by doing a simple
    /// brute force check. This method does not use the ShapeIndex, so it is
    /// only preferable below a certain size of loop.
    pub fn brute_force_contains_point(&self, p: &Point) -> bool {
        if self.is_empty_or_full() {
            return self.origin_inside;
        }
        let origin = Point::origin();
        let mut inside = self.origin_inside;
        let mut crosser = EdgeCrosser::new_chain_edge_crosser(&origin, p, &self.vertex(0));
        for i in 1..=self.vertices.len() {
            // add vertex 0 twice
            inside = inside != crosser.edge_or_vertex_chain_crossing(&self.vertex(i));
        }
        inside
    }

    // iterator_contains_point reports if the iterator that is positioned at
    // the index cell that may contain p, contains the point p.
    fn iterator_contains_point(&self, it: &ShapeIndexIterator<'_>, p: &Point) -> bool {
        let a_clipped = match it.index_cell().and_then(|cell| cell.find_by_shape_id(0)) {
            Some(clipped) => clipped,
            None => return false,
        };

        // Test containment by drawing a line segment from the cell center to
        // the given point and counting edge crossings.
        let mut inside = a_clipped.contains_center();
        if a_clipped.num_edges() > 0 {
            let mut crosser = EdgeCrosser::new(&it.center(), p);
            let mut ai_prev: Option<usize> = None;
            for &ai in a_clipped.edges() {
                if ai_prev.map_or(true, |prev| ai != prev + 1) {
                    crosser.restart_at(&self.vertex(ai));
                }
                ai_prev = Some(ai);
                inside = inside != crosser.edge_or_vertex_chain_crossing(&self.vertex(ai + 1));
            }
        }
        inside
    }

    /// Reports whether the region contained by this loop is a superset of the
    /// region contained by the given other loop.
    pub fn contains(&self, o: &Loop) -> bool {
        // For a loop A to contain the loop B, all of the following must
        // be true:
        //
        //  (1) There are no edge crossings between A and B except at vertices.
        //
        //  (2) At every vertex that is shared between A and B, the local edge
        //      ordering implies that A contains B.
        //
        //  (3) If there are no shared vertices, then A must contain a vertex of B
        //      and B must not contain a vertex of A. (An arbitrary vertex may be
        //      chosen in each case.)
        //
        // The second part of (3) is necessary to detect the case of two loops
        // whose union is the entire sphere, i.e. two loops that contain each
        // other's boundaries but not each other's interiors.

        // Special cases to handle either loop being empty or full.
        if self.is_empty_or_full() || o.is_empty_or_full() {
            return self.is_full() || o.is_empty();
        }

        // Check whether there are any edge crossings, and also check the loop
        // relationship at any shared vertices.
        let mut relation = ContainsRelation::new();
        if has_crossing_relation(self, o, &mut relation) {
            return false;
        }

        // There are no crossings, and if there are any shared vertices then A
        // contains B locally at each shared vertex.
        if relation.found_shared_vertex() {
            return true;
        }

        // Since there are no edge intersections or shared vertices, we just need
        // to test condition (3) above. We can skip this test if we discovered
        // that A contains at least one point of B while checking for edge
        // crossings.
        if !self.contains_point(&o.vertex(0)) {
            return false;
        }

        // We still need to check whether (A union B) is the entire sphere.
        if o.contains_point(&self.vertex(0)) {
            return false;
        }
        true
    }

    /// Reports whether the region contained by this loop intersects the region
    /// contained by the other loop.
    pub fn intersects(&self, o: &Loop) -> bool {
        // Given two loops, A and B, A.intersects(B) if and only if
        // !A.complement().contains(B).
        //
        // This code is similar to contains, but is optimized for the case
        // where both loops enclose less than half of the sphere.
        if self.is_empty() || o.is_empty() {
            return false;
        }
        if self.is_full() || o.is_full() {
            return true;
        }

        // Check whether there are any edge crossings, and also check the loop
        // relationship at any shared vertices.
        let mut relation = IntersectsRelation::new();
        if has_crossing_relation(self, o, &mut relation) {
            return true;
        }
        if relation.found_shared_vertex() {
            return false;
        }

        // Since there are no edge intersections or shared vertices, the loops
        // intersect only if A contains B, B contains A, or the two loops contain
        // each other's boundaries.
        if self.contains_point(&o.vertex(0)) {
            return true;
        }
        o.contains_point(&self.vertex(0))
    }

    /// Returns +1 if this loop contains the boundary of the other loop, -1 if
    /// it excludes the boundary of the other, and 0 if the boundaries of the
    /// two loops cross. Shared edges are handled as follows:
    ///
    ///   If XY is a shared edge, define reversed(XY) to be true if XY
    ///     appears in opposite directions in both loops.
    ///   Then this loop contains XY if and only if reversed(XY) == other.is_hole().
    ///   (Intuitively, this checks whether this loop contains a vanishingly small region
    ///   extending from the boundary of the other toward the interior of the polygon to
    ///   which the other belongs.)
    ///
    /// This function is used for testing containment and intersection of
    /// multi-loop polygons. Note that this method is not symmetric, since the
    /// result depends on the direction of this loop but not on the direction of
    /// the other (in the absence of shared edges).
    ///
    /// An empty loop on either side excludes the other's boundary. The other
    /// loop may be full only if it is not a hole.
    pub fn compare_boundary(&self, o: &Loop) -> BoundaryCondition {
        if self.is_empty() || o.is_empty() {
            return BoundaryCondition::ExcludesOther;
        }

        // Full loops are handled as though the loop surrounded the entire sphere.
        if self.is_full() {
            return BoundaryCondition::ContainsOther;
        }
        if o.is_full() {
            return BoundaryCondition::ExcludesOther;
        }

        // Check whether there are any edge crossings, and also check the loop
        // relationship at any shared vertices.
        let mut relation = CompareBoundaryRelation::new(o.is_hole());
        if has_crossing_relation(self, o, &mut relation) {
            return BoundaryCondition::CrossesOther;
        }
        if relation.found_shared_vertex() {
            return if relation.contains_edge() {
                BoundaryCondition::ContainsOther
            } else {
                BoundaryCondition::ExcludesOther
            };
        }

        // There are no edge intersections or shared vertices, so we can check
        // whether A contains an arbitrary vertex of B.
        if self.contains_point(&o.vertex(0)) {
            BoundaryCondition::ContainsOther
        } else {
            BoundaryCondition::ExcludesOther
        }
    }

    /// Reports whether, given two loops whose boundaries do not cross (see
    /// compare_boundary), this loop contains the boundary of the other loop.
    /// If reverse_other is true, the boundary of the other loop is reversed
    /// first (which only affects the result when there are shared edges). This
    /// method is cheaper than compare_boundary because it does not test for
    /// edge intersections.
    ///
    /// This function requires that if the other loop is full, then
    /// reverse_other == false. Empty loops contain nothing.
    pub fn contains_non_crossing_boundary(&self, o: &Loop, reverse_other: bool) -> bool {
        if self.is_empty() || o.is_empty() {
            return false;
        }

        // Full loops are handled as though the loop surrounded the entire sphere.
        if self.is_full() {
            return true;
        }
        if o.is_full() {
            return false;
        }

        match self.find_vertex(&o.vertex(0)) {
            // Since the other loop's vertex 0 is not shared, we can check if this contains it.
            None => self.contains_point(&o.vertex(0)),
            // Check whether the edge order around o.vertex(0) is compatible with
            // this loop containing the (possibly reversed) edge of the other.
            Some(m) => wedge_contains_semiwedge(
                &self.vertex(m - 1),
                &self.vertex(m),
                &self.vertex(m + 1),
                &o.vertex(1),
                reverse_other,
            ),
        }
    }

    /// Reports whether this loop contains the given other loop, given that
    /// the two loops do not cross and do not share any edges. Either one loop
    /// contains the other or they are disjoint, and they may share vertices.
    /// This function does not test for edge intersections.
    pub fn contains_nested(&self, o: &Loop) -> bool {
        // Special cases to handle either loop being empty or full. Also bail
        // out when the other loop has fewer than 2 vertices to avoid reading
        // past its end below.
        if self.is_empty_or_full() || o.num_vertices() < 2 {
            return self.is_full() || o.is_empty();
        }

        match self.find_vertex(&o.vertex(1)) {
            // Since o.vertex(1) is not shared, we can check whether A contains it.
            None => self.contains_point(&o.vertex(1)),
            // Check whether the edge order around o.vertex(1) is compatible with
            // A containing B.
            Some(m) => wedge_contains(
                &self.vertex(m - 1),
                &self.vertex(m),
                &self.vertex(m + 1),
                &o.vertex(0),
                &o.vertex(2),
            ),
        }
    }

    /// Reports whether two loops have the same vertices in the same linear
    /// order (i.e., cyclic rotations are not allowed).
    pub fn equal(&self, other: &Loop) -> bool {
        self.vertices == other.vertices
    }

    /// Reports whether the two loops have the same boundary. This is true if
    /// and only if the loops have the same vertices in the same cyclic order
    /// (i.e., the vertices may be cyclically rotated). The empty and full
    /// loops are considered to have different boundaries.
    pub fn boundary_equal(&self, o: &Loop) -> bool {
        if self.vertices.len() != o.vertices.len() {
            return false;
        }

        // Special case to handle empty or full loops. Since they have the same
        // number of vertices, if one loop is empty/full then so is the other.
        if self.is_empty_or_full() {
            return self.is_empty() == o.is_empty();
        }

        // Loop through the vertices to find the first of ours that matches the
        // starting vertex of the other loop. Use that offset to then 'align'
        // the vertices for comparison.
        let n = self.vertices.len();
        (0..n)
            .filter(|&offset| self.vertex(offset) == o.vertex(0))
            .any(|offset| (0..n).all(|i| self.vertex(i + offset) == o.vertex(i)))
    }

    /// Returns the index of a vertex of this loop equal to p, in the range
    /// [1, num_vertices()] so that m-1 and m+1 are valid arguments to vertex,
    /// or None if no matching vertex is found.
    pub fn find_vertex(&self, p: &Point) -> Option<usize> {
        if self.vertices.len() < MAX_SCAN_VERTICES {
            // Exhaustive search for loops below a small threshold.
            return (1..=self.vertices.len()).find(|&i| self.vertex(i) == *p);
        }

        let mut it = self.index().iterator();
        if !it.locate_point(p) {
            return None;
        }

        let a_clipped = it.index_cell()?.find_by_shape_id(0)?;
        for &ai in a_clipped.edges().iter().rev() {
            // Return the smallest vertex index that is >= 1.
            if self.vertex(ai) == *p {
                return Some(if ai == 0 { self.vertices.len() } else { ai });
            }
            if self.vertex(ai + 1) == *p {
                return Some(ai + 1);
            }
        }
        None
    }

    /// Reverses the order of the loop vertices, effectively complementing the
    /// region represented by the loop. For example, the loop ABCD (with edges
    /// AB, BC, CD, DA) becomes the loop DCBA (with edges DC, CB, BA, AD).
    pub fn invert(&mut self) {
        self.index.take();
        if self.is_empty_or_full() {
            self.vertices = vec![if self.is_full() {
                EMPTY_LOOP_POINT
            } else {
                FULL_LOOP_POINT
            }];
        } else {
            self.vertices.reverse();
        }
        self.origin_inside = !self.origin_inside;
    }

    /// Reports whether the loop area is at most 2*pi. Degenerate loops are
    /// handled consistently with the orientation predicate: if a loop can be
    /// expressed as a union of degenerate or nearly-degenerate CCW triangles,
    /// then it will always be considered normalized.
    pub fn is_normalized(&self) -> bool {
        // We allow some error so that hemispheres are always considered
        // normalized. The turning angle evaluates exactly to -2*pi for
        // hemispheres, with no error.
        self.turning_angle() >= -self.turning_angle_max_error()
    }

    /// Inverts the loop if necessary so that the area enclosed by the loop is
    /// at most 2*pi.
    pub fn normalize(&mut self) {
        if !self.is_normalized() {
            self.invert();
        }
    }

    // canonical_first_vertex returns a first index and a direction (either +1
    // or -1) such that the vertex sequence (first, first+dir, ..., first+(n-1)*dir)
    // does not change when the loop vertex order is rotated or inverted. The
    // values are chosen such that (first, ..., first+n*dir) are in the range
    // [0, 2*n-1] as expected by vertex.
    fn canonical_first_vertex(&self) -> (usize, i64) {
        let n = self.vertices.len();
        let mut first = 0;
        for i in 1..n {
            if self.vertex(i).0.cmp(&self.vertex(first).0) == Ordering::Less {
                first = i;
            }
        }

        // 0 <= first <= n-1, so (first+n*dir) <= 2*n-1.
        if self.vertex(first + 1).0.cmp(&self.vertex(first + n - 1).0) == Ordering::Less {
            return (first, 1);
        }

        // n <= first <= 2*n-1, so (first+n*dir) >= 0.
        (first + n, -1)
    }

    /// Returns the sum of the turning angles at each vertex. The return value
    /// is positive if the loop is counter-clockwise, negative if the loop is
    /// clockwise, and zero if the loop is a great circle. The result is
    /// unchanged by rotating the vertex order and negated by reversing it.
    ///
    /// This quantity is also called the "geodesic curvature" of the loop.
    pub fn turning_angle(&self) -> f64 {
        // For empty and full loops, we return the limit value as the loop
        // area approaches 0 or 4*pi respectively.
        if self.is_empty_or_full() {
            return if self.contains_origin() { -2.0 * PI } else { 2.0 * PI };
        }

        // Don't crash even if the loop is not well-defined.
        if self.vertices.len() < 3 {
            return 0.0;
        }

        // The turn angles are added up in the canonical order, and with Kahan
        // summation so that spiral shapes do not accumulate quadratic error.
        let n = self.vertices.len() as i64;
        let (first, dir) = self.canonical_first_vertex();
        let v = |k: i64| self.vertex(k as usize);

        let mut i = first as i64;
        let mut sum = turn_angle(&v((i + n - dir) % n), &v(i), &v((i + dir) % n)).rad();
        let mut compensation = 0.0;
        for _ in 1..n {
            i += dir;
            let angle = turn_angle(&v(i - dir), &v(i), &v(i + dir)).rad() + compensation;
            let old_sum = sum;
            sum += angle;
            compensation = (old_sum - sum) + angle;
        }

        const MAX_CURVATURE: f64 = 2.0 * PI - 4.0 * DBL_EPSILON;
        (dir as f64 * (sum + compensation)).clamp(-MAX_CURVATURE, MAX_CURVATURE)
    }

    /// Returns the maximum error in turning_angle. The value is not constant;
    /// it depends on the loop.
    pub fn turning_angle_max_error(&self) -> f64 {
        // The maximum error can be bounded as follows:
        //   3.00 * DBL_EPSILON    for point_cross(b, a)
        //   3.00 * DBL_EPSILON    for point_cross(c, b)
        //   3.25 * DBL_EPSILON    for angle()
        //   2.00 * DBL_EPSILON    for each addition in the Kahan summation
        //   ------------------
        //  11.25 * DBL_EPSILON
        const MAX_ERROR_PER_VERTEX: f64 = 11.25 * DBL_EPSILON;
        MAX_ERROR_PER_VERTEX * self.vertices.len() as f64
    }

    /// Returns the area of the loop interior, i.e. the region on the left side
    /// of the loop. The return value is between 0 and 4*pi. This value is not
    /// affected by whether this loop is a "hole" or a "shell".
    pub fn area(&self) -> f64 {
        if self.is_empty_or_full() {
            return if self.contains_origin() { 4.0 * PI } else { 0.0 };
        }

        let mut area = self.surface_integral(signed_area);

        // The signed area should be between approximately -4*pi and 4*pi.
        if area < 0.0 {
            // We have computed the negative of the area of the loop exterior.
            area += 4.0 * PI;
        }
        area = area.clamp(0.0, 4.0 * PI);

        // If the area is close enough to zero or 4*pi so that the loop
        // orientation is ambiguous, then we compute the loop orientation
        // explicitly.
        let max_error = self.turning_angle_max_error();
        if area < max_error && !self.is_normalized() {
            4.0 * PI
        } else if area > 4.0 * PI - max_error && self.is_normalized() {
            0.0
        } else {
            area
        }
    }

    // surface_integral computes the oriented surface integral of f over the
    // loop interior by summing f over a fan of triangles. The fan origin moves
    // whenever the next fan edge would be too long to be numerically stable.
    fn surface_integral<F>(&self, f: F) -> f64
    where
        F: Fn(&Point, &Point, &Point) -> f64,
    {
        // Maximum length of an edge for it to be considered numerically stable.
        const MAX_LENGTH: f64 = PI - 1e-5;

        let n = self.vertices.len();
        let v0 = self.vertex(0);
        let mut sum = 0.0;
        let mut origin = v0;

        for i in 1..n - 1 {
            // Let V_i be vertex(i), let O be the current origin, and let
            // length(A,B) be the length of edge (A,B). At the start of each
            // iteration, the "leading edge" of the triangle fan is (O,V_i),
            // and we want to extend the fan so that the leading edge is
            // (O,V_i+1).
            let vi = self.vertex(i);
            let vi1 = self.vertex(i + 1);
            if vi1.0.angle(&origin.0) > MAX_LENGTH {
                // We are about to create an unstable edge, so choose a new
                // origin O' for the triangle fan.
                let old_origin = origin;
                if origin == v0 {
                    // The following point is well-separated from V_i and V_0
                    // (and therefore V_i+1 as well).
                    origin = Point(v0.point_cross(&vi).0.normalize());
                } else if vi.0.angle(&v0.0) < MAX_LENGTH {
                    // All edges of the triangle (O, V_0, V_i) are stable, so
                    // we can revert to using V_0 as the origin.
                    origin = v0;
                } else {
                    // (O, V_i+1) and (V_0, V_i) are antipodal pairs, and O and
                    // V_0 are perpendicular. Therefore V_0 x O is approximately
                    // perpendicular to all of {O, V_0, V_i, V_i+1}, and we can
                    // choose this point O' as the new origin.
                    origin = Point(v0.0.cross(&old_origin.0).normalize());

                    // Advance the edge (V_0,O) to (V_0,O').
                    sum += f(&v0, &old_origin, &origin);
                }
                // Advance the edge (O,V_i) to (O',V_i).
                sum += f(&old_origin, &vi, &origin);
            }
            // Advance the edge (O,V_i) to (O,V_i+1).
            sum += f(&origin, &vi, &vi1);
        }

        // If the origin is not V_0, we need to sum one more triangle.
        if origin != v0 {
            // Advance the edge (O,V_n-1) to (O,V_0).
            sum += f(&origin, &self.vertex(n - 1), &v0);
        }
        sum
    }

    /// Reports whether this is a valid loop: the checks of
    /// find_validation_error_no_index plus a check that no two non-adjacent
    /// edges intersect, including at a shared vertex.
    pub fn validate(&self) -> S2Result<()> {
        self.find_validation_error_no_index()?;
        if self.is_empty_or_full() {
            return Ok(());
        }
        self.find_self_intersection()
    }

    /// Reports whether this is not a valid loop, but skips checks that would
    /// require a ShapeIndex to be built for the loop.
    pub fn find_validation_error_no_index(&self) -> S2Result<()> {
        // All vertices must be unit length.
        if let Some(i) = self.vertices.iter().position(|v| !v.is_unit()) {
            return Err(S2Error::InvalidLoop(format!("vertex {} is not unit length", i)));
        }

        // Loops must have at least 3 vertices (except for empty and full).
        if self.vertices.len() < 3 {
            if self.vertices.len() == 1 {
                return Ok(());
            }
            return Err(S2Error::InvalidLoop(
                "non-empty, non-full loops must have at least 3 vertices".to_string(),
            ));
        }

        // Loops are not allowed to have any duplicate vertices or edge
        // crossings. Here we only check that no edge is degenerate and that
        // adjacent vertices are not antipodal. The remaining checks need the
        // ShapeIndex.
        let n = self.vertices.len();
        for i in 0..n {
            if self.vertex(i) == self.vertex(i + 1) {
                return Err(S2Error::InvalidLoop(format!(
                    "edge {} is degenerate (duplicate vertex)",
                    i
                )));
            }
            if self.vertex(i) == -self.vertex(i + 1) {
                return Err(S2Error::InvalidLoop(format!(
                    "vertices {} and {} are antipodal",
                    i,
                    (i + 1) % n
                )));
            }
        }
        Ok(())
    }

    // find_self_intersection reports the first pair of non-adjacent edges
    // that cross or touch.
    fn find_self_intersection(&self) -> S2Result<()> {
        let n = self.vertices.len();
        let mut query = CrossingEdgeQuery::new(self.index());
        for i in 0..n {
            let (a, b) = (self.vertex(i), self.vertex(i + 1));
            for j in query.crossings(&a, &b, self, 0, CrossingType::All) {
                // Each pair is reported once, and adjacent edges always share
                // a vertex.
                if j <= i + 1 || (i == 0 && j == n - 1) {
                    continue;
                }
                let e = self.edge(j);
                let msg = match crossing_sign(&a, &b, &e.v0, &e.v1) {
                    Crossing::Cross => format!("edges {} and {} cross", i, j),
                    _ => format!("edges {} and {} share a vertex", i, j),
                };
                return Err(S2Error::InvalidLoop(msg));
            }
        }
        Ok(())
    }
}

// signed_area returns the area of the triangle (a,b,c), positive if the
// triangle is counterclockwise and negative if it is clockwise. It uses
// tan(E/2) = a.(b x c) / (1 + a.b + b.c + c.a) for the spherical excess E.
fn signed_area(a: &Point, b: &Point, c: &Point) -> f64 {
    let det = a.0.dot(&b.0.cross(&c.0));
    let denom = 1.0 + a.dot(b) + b.dot(c) + c.dot(a);
    2.0 * det.atan2(denom)
}

impl Shape for Loop {
    fn num_edges(&self) -> usize {
        if self.is_empty_or_full() {
            0
        } else {
            self.vertices.len()
        }
    }

    fn edge(&self, i: usize) -> Edge {
        Edge {
            v0: self.vertex(i),
            v1: self.vertex(i + 1),
        }
    }

    fn reference_point(&self) -> ReferencePoint {
        ReferencePoint::origin(self.origin_inside)
    }

    fn dimension(&self) -> i64 {
        2
    }
}
