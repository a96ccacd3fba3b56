// Copyright 2017 Google Inc. All rights reserved.
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
use crate::s2::point::Point;
use crate::s2::predicates::{expensive_sign, robust_sign, triage_sign_with_cross, Direction};
use crate::s2::edge_crossings::{vertex_crossing, Crossing};

// EdgeCrosser allows edges to be efficiently tested for intersection with a
// given fixed edge AB. It is especially efficient when testing for
// intersection with an edge chain connecting vertices v0, v1, v2, ...
//
// Example usage:
//
//	fn count_intersections(a: &Point, b: &Point, edges: &[Edge]) -> usize {
//		let mut crosser = EdgeCrosser::new(a, b);
//		edges
//			.iter()
//			.filter(|e| crosser.crossing_sign(&e.v0, &e.v1) != Crossing::DoNotCross)
//			.count()
//	}
#[derive(Debug, Clone)]
pub struct EdgeCrosser {
    a: Point,
    b: Point,
    a_cross_b: Point,

    // To reduce the number of calls to expensive_sign, we compute an
    // outward-facing tangent at A and B if necessary. If the plane
    // perpendicular to one of these tangents separates AB from CD (i.e., one
    // edge on each side) then there is no intersection.
    a_tangent: Point, // Outward-facing tangent at A.
    b_tangent: Point, // Outward-facing tangent at B.

    // The fields below are updated for each vertex in the chain.
    c: Point,       // Previous vertex in the vertex chain.
    acb: Direction, // The orientation of triangle ACB.
}

impl EdgeCrosser {
    /// Returns an EdgeCrosser with the fixed edge AB.
    pub fn new(a: &Point, b: &Point) -> EdgeCrosser {
        let norm = a.point_cross(b);
        EdgeCrosser {
            a: *a,
            b: *b,
            a_cross_b: a.cross(b),
            a_tangent: a.cross(&norm),
            b_tangent: norm.cross(b),
            c: Point::default(),
            acb: Direction::Indeterminate,
        }
    }

    /// Returns an EdgeCrosser with the fixed edge AB and the chain
    /// positioned at c.
    pub fn new_chain_edge_crosser(a: &Point, b: &Point, c: &Point) -> EdgeCrosser {
        let mut e = EdgeCrosser::new(a, b);
        e.restart_at(c);
        e
    }

    // init re-targets this crosser at a new fixed edge AB, discarding the
    // chain state.
    pub fn init(&mut self, a: &Point, b: &Point) {
        *self = EdgeCrosser::new(a, b);
    }

    pub fn a(&self) -> &Point {
        &self.a
    }

    pub fn b(&self) -> &Point {
        &self.b
    }

    /// Reports whether the edge AB intersects the edge CD. If any two
    /// vertices from different edges are the same, returns Maybe. If either
    /// edge is degenerate (A == B or C == D), returns either DoNotCross or
    /// Maybe.
    ///
    /// Properties of crossing_sign:
    ///
    ///  (1) crossing_sign(b,a,c,d) == crossing_sign(a,b,c,d)
    ///  (2) crossing_sign(c,d,a,b) == crossing_sign(a,b,c,d)
    ///  (3) crossing_sign(a,b,c,d) == Maybe if a==c, a==d, b==c, b==d
    ///  (3) crossing_sign(a,b,c,d) == DoNotCross or Maybe if a==b or c==d
    ///
    /// Note that if you want to check an edge against a chain of other edges,
    /// it is slightly more efficient to use the single-argument version
    /// chain_crossing_sign below.
    pub fn crossing_sign(&mut self, c: &Point, d: &Point) -> Crossing {
        if *c != self.c {
            self.restart_at(c);
        }
        self.chain_crossing_sign(d)
    }

    /// Reports whether if crossing_sign(c, d) > 0, or AB and CD share a
    /// vertex and vertex_crossing(a, b, c, d) is true.
    ///
    /// This method extends the concept of a "crossing" to the case where AB
    /// and CD have a vertex in common. The two edges may or may not cross,
    /// according to the rules defined in vertex_crossing above. The rules
    /// are designed so that point containment tests can be implemented
    /// simply by counting edge crossings. Similarly, determining whether one
    /// edge chain crosses another edge chain can be implemented by counting.
    pub fn edge_or_vertex_crossing(&mut self, c: &Point, d: &Point) -> bool {
        if *c != self.c {
            self.restart_at(c);
        }
        self.edge_or_vertex_chain_crossing(d)
    }

    /// Sets the current point of the edge crosser to be c.
    /// Call this method when your chain 'jumps' to a new place.
    /// The argument must point to a value that persists until the next call.
    pub fn restart_at(&mut self, c: &Point) {
        self.c = *c;
        self.acb = -triage_sign_with_cross(&self.a_cross_b, c);
    }

    /// Like crossing_sign, but uses the last vertex passed to one of the
    /// crossing methods (or restart_at) as the first vertex of the current
    /// edge.
    pub fn chain_crossing_sign(&mut self, d: &Point) -> Crossing {
        // For there to be an edge crossing, the triangles ACB, CBD, BDA, DAC
        // must all be oriented the same way (CW or CCW). We keep the
        // orientation of ACB as part of our state. When each new point D
        // arrives, we compute the orientation of BDA and check whether it
        // matches ACB. This checks whether the points C and D are on opposite
        // sides of the great circle through AB.

        // triage_sign is invariant with respect to rotating its arguments,
        // i.e. ABD has the same orientation as BDA.
        let bda = triage_sign_with_cross(&self.a_cross_b, d);
        if self.acb == -bda && bda != Direction::Indeterminate {
            // The most common case: the triangles have opposite orientations.
            // Save the current vertex D as the next vertex C, and also save
            // the orientation of the new triangle ACB (which is opposite to
            // the current triangle BDA).
            self.c = *d;
            self.acb = -bda;
            return Crossing::DoNotCross;
        }
        self.crossing_sign_slow(d, bda)
    }

    /// Like edge_or_vertex_crossing, but uses the last vertex passed to one
    /// of the crossing methods (or restart_at) as the first vertex of the
    /// current edge.
    pub fn edge_or_vertex_chain_crossing(&mut self, d: &Point) -> bool {
        // Copy c, since it is clobbered by chain_crossing_sign.
        let c = self.c;
        match self.chain_crossing_sign(d) {
            Crossing::DoNotCross => false,
            Crossing::Cross => true,
            Crossing::Maybe => vertex_crossing(&self.a, &self.b, &c, d),
        }
    }

    // crossing_sign_slow handles the slow path of chain_crossing_sign and
    // advances the chain to d on every return path.
    fn crossing_sign_slow(&mut self, d: &Point, mut bda: Direction) -> Crossing {
        let result = self.classify(d, &mut bda);
        self.c = *d;
        self.acb = -bda;
        result
    }

    fn classify(&mut self, d: &Point, bda: &mut Direction) -> Crossing {
        // At this point, a very common situation is that A,B,C,D are four
        // points on a line such that AB does not overlap CD. (For example,
        // this happens when a line or curve is sampled finely, or when
        // geometry is constructed by computing the union of S2CellIds.)
        // Most of the time, we can determine that AB and CD do not intersect
        // using the two outward-facing tangents at A and B (parallel to AB)
        // and testing whether AB and CD are on opposite sides of the plane
        // perpendicular to one of these tangents. This is moderately
        // expensive but still much cheaper than expensive_sign.

        // The error in robust cross product is insignificant. The maximum
        // error in the call to cross (i.e., the maximum norm of the error
        // vector) is (0.5 + 1/sqrt(3)) * DBL_EPSILON. The maximum error in
        // each call to dot below is DBL_EPSILON. (There is also a small
        // relative error term that is insignificant because we are
        // comparing the result against a constant that is very close to
        // zero.)
        let max_error = (1.5 + 1.0 / 3.0_f64.sqrt()) * DBL_EPSILON;
        if (self.c.dot(&self.a_tangent) > max_error && d.dot(&self.a_tangent) > max_error)
            || (self.c.dot(&self.b_tangent) > max_error && d.dot(&self.b_tangent) > max_error)
        {
            return Crossing::DoNotCross;
        }

        // Otherwise, eliminate the cases where two vertices from different
        // edges are equal. (These cases could be handled in the code below,
        // but we would rather avoid calling expensive_sign if possible.)
        if self.a == self.c || self.a == *d || self.b == self.c || self.b == *d {
            return Crossing::Maybe;
        }

        // Eliminate the cases where an input edge is degenerate. (Note that
        // in most cases, if CD is degenerate then this method is not even
        // called because acb and bda have different signs.)
        if self.a == self.b || self.c == *d {
            return Crossing::DoNotCross;
        }

        // Otherwise it's time to break out the big guns.
        if self.acb == Direction::Indeterminate {
            self.acb = -expensive_sign(&self.a, &self.b, &self.c);
        }
        if *bda == Direction::Indeterminate {
            *bda = expensive_sign(&self.a, &self.b, d);
        }

        if *bda != self.acb {
            return Crossing::DoNotCross;
        }

        let cbd = -robust_sign(&self.c, d, &self.b);
        if cbd != self.acb {
            return Crossing::DoNotCross;
        }
        let dac = robust_sign(&self.c, d, &self.a);
        if dac != self.acb {
            return Crossing::DoNotCross;
        }
        Crossing::Cross
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::s2::edge_crossings::crossing_sign;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn point(x: f64, y: f64, z: f64) -> Point {
        Point::from_coords(x, y, z)
    }

    fn test_crossing(
        msg: &str,
        a: Point,
        b: Point,
        c: Point,
        d: Point,
        robust: Crossing,
        edge_or_vertex: bool,
    ) {
        // Modify the expected result if two vertices from different edges match.
        let robust = if a == c || a == d || b == c || b == d {
            Crossing::Maybe
        } else {
            robust
        };

        let input = format!("{}: a: {:?}, b: {:?}, c: {:?}, d: {:?}", msg, a, b, c, d);

        let mut crosser = EdgeCrosser::new_chain_edge_crosser(&a, &b, &c);
        assert_eq!(crosser.chain_crossing_sign(&d), robust, "{}, chain_crossing_sign(d)", input);
        assert_eq!(crosser.chain_crossing_sign(&c), robust, "{}, chain_crossing_sign(c)", input);
        assert_eq!(crosser.crossing_sign(&d, &c), robust, "{}, crossing_sign(d, c)", input);
        assert_eq!(crosser.crossing_sign(&c, &d), robust, "{}, crossing_sign(c, d)", input);

        crosser.restart_at(&c);
        assert_eq!(
            crosser.edge_or_vertex_chain_crossing(&d),
            edge_or_vertex,
            "{}, edge_or_vertex_chain_crossing(d)",
            input
        );
        assert_eq!(
            crosser.edge_or_vertex_chain_crossing(&c),
            edge_or_vertex,
            "{}, edge_or_vertex_chain_crossing(c)",
            input
        );
        assert_eq!(
            crosser.edge_or_vertex_crossing(&d, &c),
            edge_or_vertex,
            "{}, edge_or_vertex_crossing(d, c)",
            input
        );
        assert_eq!(
            crosser.edge_or_vertex_crossing(&c, &d),
            edge_or_vertex,
            "{}, edge_or_vertex_crossing(c, d)",
            input
        );
    }

    #[test]
    fn test_edge_crosser_crossings() {
        // The neighbours of 1.0 in either direction.
        let na1 = f64::from_bits(0x3fefffffffffffff);
        let na2 = f64::from_bits(0x3ff0000000000001);

        let tests = vec![
            (
                "two regular edges that cross",
                point(1.0, 2.0, 1.0),
                point(1.0, -3.0, 0.5),
                point(1.0, -0.5, -3.0),
                point(0.1, 0.5, 3.0),
                Crossing::Cross,
                true,
            ),
            (
                "two regular edges that intersect antipodal points",
                point(1.0, 2.0, 1.0),
                point(1.0, -3.0, 0.5),
                point(-1.0, 0.5, 3.0),
                point(-0.1, -0.5, -3.0),
                Crossing::DoNotCross,
                false,
            ),
            (
                "two edges on the same great circle that start at antipodal points",
                point(0.0, 0.0, -1.0),
                point(0.0, 1.0, 0.0),
                point(0.0, 0.0, 1.0),
                point(0.0, 1.0, 1.0),
                Crossing::DoNotCross,
                false,
            ),
            (
                "two edges that cross where one vertex is the origin point",
                point(1.0, 0.0, 0.0),
                Point::origin(),
                point(1.0, -0.1, 1.0),
                point(1.0, 1.0, -0.1),
                Crossing::Cross,
                true,
            ),
            (
                "two edges that intersect antipodal points where one vertex is the origin point",
                point(1.0, 0.0, 0.0),
                Point::origin(),
                point(1.0, 0.1, -1.0),
                point(1.0, 1.0, -0.1),
                Crossing::DoNotCross,
                false,
            ),
            (
                "two edges that cross antipodal points",
                point(1.0, 0.0, 0.0),
                point(0.0, 1.0, 0.0),
                point(0.0, 0.0, -1.0),
                point(-1.0, -1.0, 1.0),
                Crossing::DoNotCross,
                false,
            ),
            (
                "two edges that share an endpoint",
                point(2.0, 3.0, 4.0),
                point(-1.0, 2.0, 5.0),
                point(7.0, -2.0, 3.0),
                point(2.0, 3.0, 4.0),
                Crossing::Maybe,
                false,
            ),
            (
                "two edges that barely cross near the middle of one edge",
                point(1.0, 1.0, 1.0),
                point(1.0, na1, -1.0),
                point(11.0, -12.0, -1.0),
                point(10.0, 10.0, 1.0),
                Crossing::Cross,
                true,
            ),
            (
                "two edges that barely cross near the middle separated by a distance of about 1e-15",
                point(1.0, 1.0, 1.0),
                point(1.0, na2, -1.0),
                point(1.0, -1.0, 0.0),
                point(1.0, 1.0, 0.0),
                Crossing::DoNotCross,
                false,
            ),
            (
                "two edges that barely cross each other near the end of both edges",
                point(0.0, 0.0, 1.0),
                point(2.0, -1e-323, 1.0),
                point(1.0, -1.0, 1.0),
                point(1e-323, 0.0, 1.0),
                Crossing::Cross,
                true,
            ),
            (
                "two edges that barely cross each other near the end separated by a distance of about 1e-640",
                point(0.0, 0.0, 1.0),
                point(2.0, 1e-323, 1.0),
                point(1.0, -1.0, 1.0),
                point(1e-323, 0.0, 1.0),
                Crossing::DoNotCross,
                false,
            ),
            (
                "two edges that barely cross each other near the middle of one edge",
                point(1.0, -1e-323, -1e-323),
                point(1e-323, 1.0, 1e-323),
                point(1.0, -1.0, 1e-323),
                point(1.0, 1.0, 0.0),
                Crossing::Cross,
                true,
            ),
            (
                "two edges that barely cross each other near the middle separated by a distance of about 1e-640",
                point(1.0, 1e-323, -1e-323),
                point(-1e-323, 1.0, 1e-323),
                point(1.0, -1.0, 1e-323),
                point(1.0, 1.0, 0.0),
                Crossing::DoNotCross,
                false,
            ),
        ];

        for (msg, a, b, c, d, robust, edge_or_vertex) in tests {
            test_crossing(msg, a, b, c, d, robust, edge_or_vertex);
            test_crossing(msg, b, a, c, d, robust, edge_or_vertex);
            test_crossing(msg, a, b, d, c, robust, edge_or_vertex);
            test_crossing(msg, b, a, d, c, robust, edge_or_vertex);

            // Degenerate edges.
            test_crossing(msg, a, a, c, d, Crossing::DoNotCross, false);
            test_crossing(msg, a, b, c, c, Crossing::DoNotCross, false);
            test_crossing(msg, a, a, c, c, Crossing::DoNotCross, false);

            test_crossing(msg, a, b, a, b, Crossing::Maybe, true);
            test_crossing(
                msg,
                c,
                d,
                a,
                b,
                robust,
                edge_or_vertex != (robust == Crossing::Maybe),
            );
        }
    }

    fn random_point(rng: &mut StdRng) -> Point {
        Point::from_coords(
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
        )
    }

    #[test]
    fn test_chain_matches_pairwise() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        for _ in 0..200 {
            let a = random_point(&mut rng);
            let b = random_point(&mut rng);
            let chain: Vec<Point> = (0..12).map(|_| random_point(&mut rng)).collect();

            let mut crosser = EdgeCrosser::new_chain_edge_crosser(&a, &b, &chain[0]);
            for w in chain.windows(2) {
                assert_eq!(
                    crosser.chain_crossing_sign(&w[1]),
                    crossing_sign(&a, &b, &w[0], &w[1])
                );
            }
        }
    }

    #[test]
    fn test_crossing_sign_symmetry() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..500 {
            let a = random_point(&mut rng);
            let b = random_point(&mut rng);
            let c = random_point(&mut rng);
            let d = random_point(&mut rng);
            let want = crossing_sign(&a, &b, &c, &d);
            assert_eq!(crossing_sign(&b, &a, &c, &d), want);
            assert_eq!(crossing_sign(&a, &b, &d, &c), want);
            assert_eq!(crossing_sign(&c, &d, &a, &b), want);
            assert_ne!(crossing_sign(&a, &a, &c, &d), Crossing::Cross);
            assert_eq!(crossing_sign(&a, &b, &c, &a), Crossing::Maybe);
        }
    }

    #[test]
    fn test_init_retargets_crosser() {
        let mut crosser = EdgeCrosser::new(&point(1.0, 0.0, 0.0), &point(0.0, 1.0, 0.0));
        let c = point(1.0, 1.0, -1.0);
        let d = point(1.0, 1.0, 1.0);
        assert_eq!(crosser.crossing_sign(&c, &d), Crossing::Cross);

        crosser.init(&point(0.0, 0.0, 1.0), &point(0.0, 1.0, 1.0));
        assert_eq!(*crosser.a(), point(0.0, 0.0, 1.0));
        assert_eq!(*crosser.b(), point(0.0, 1.0, 1.0));
        assert_eq!(crosser.crossing_sign(&c, &d), Crossing::DoNotCross);
    }
}
