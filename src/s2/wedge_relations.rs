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

//! Predicates that classify two wedges sharing a common apex.
//!
//! A wedge (a0, ab1, a2) is the region to the left of the vertex chain
//! a0 -> ab1 -> a2, i.e. the rays swept CCW from (ab1, a2) to (ab1, a0).

use crate::s2::point::{ordered_ccw, Point};

/// WedgeRelation enumerates the possible relation between two wedges A and B.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WedgeRelation {
    /// A and B are equal.
    Equals,
    /// A is a strict superset of B.
    ProperlyContains,
    /// A is a strict subset of B.
    IsProperlyContained,
    /// A-B, B-A, and A intersect B are non-empty.
    ProperlyOverlaps,
    /// A and B are disjoint.
    IsDisjoint,
}

/// Reports the relation between two non-empty wedges A=(a0, ab1, a2) and
/// B=(b0, ab1, b2).
pub fn wedge_relation(a0: &Point, ab1: &Point, a2: &Point, b0: &Point, b2: &Point) -> WedgeRelation {
    // There are 6 possible edge orderings at a shared vertex (all
    // of these orderings are circular, i.e. abcd == bcda):
    //
    //  (1) a2 b2 b0 a0: A contains B
    //  (2) a2 a0 b0 b2: B contains A
    //  (3) a2 a0 b2 b0: A and B are disjoint
    //  (4) a2 b0 a0 b2: A and B intersect in one wedge
    //  (5) a2 b2 a0 b0: A and B intersect in one wedge
    //  (6) a2 b0 b2 a0: A and B intersect in two wedges
    //
    // We do not distinguish between 4, 5, and 6.
    // We pay extra attention when some of the edges overlap. When edges
    // overlap, several of these orderings can be satisfied, and we take
    // the most specific.
    if a0 == b0 && a2 == b2 {
        return WedgeRelation::Equals;
    }

    // Cases 1, 2, 5, and 6
    if ordered_ccw(a0, a2, b2, ab1) {
        // The cases with this vertex ordering are 1, 5, and 6,
        if ordered_ccw(b2, b0, a0, ab1) {
            return WedgeRelation::ProperlyContains;
        }

        // We are in case 5 or 6, or case 2 if a2 == b2.
        if a2 == b2 {
            return WedgeRelation::IsProperlyContained;
        }
        return WedgeRelation::ProperlyOverlaps;
    }

    // We are in case 2, 3, or 4.
    if ordered_ccw(a0, b0, b2, ab1) {
        return WedgeRelation::IsProperlyContained;
    }

    if ordered_ccw(a0, b0, a2, ab1) {
        return WedgeRelation::IsDisjoint;
    }
    WedgeRelation::ProperlyOverlaps
}

/// Reports whether non-empty wedge A=(a0, ab1, a2) contains B=(b0, ab1, b2).
/// Equivalent to wedge_relation == ProperlyContains || Equals.
pub fn wedge_contains(a0: &Point, ab1: &Point, a2: &Point, b0: &Point, b2: &Point) -> bool {
    // For A to contain B (where each loop interior is defined to be its left
    // side), the CCW edge order around ab1 must be a2 b2 b0 a0. We split
    // this test into two parts that test three vertices each.
    ordered_ccw(a2, b2, b0, ab1) && ordered_ccw(b0, a0, a2, ab1)
}

/// Reports whether non-empty wedge A=(a0, ab1, a2) intersects B=(b0, ab1, b2).
/// Equivalent but faster than wedge_relation != IsDisjoint.
pub fn wedge_intersects(a0: &Point, ab1: &Point, a2: &Point, b0: &Point, b2: &Point) -> bool {
    // For A not to intersect B (where each loop interior is defined to be
    // its left side), the CCW edge order around ab1 must be a0 b2 b0 a2.
    // Note that it's important to write these conditions as negatives
    // (!ordered_ccw(a,b,c,o) rather than ordered_ccw(c,b,a,o)) to get correct
    // results when two vertices are the same.
    !(ordered_ccw(a0, b2, b0, ab1) && ordered_ccw(b0, a2, a0, ab1))
}

/// Reports whether the wedge (a0, ab1, a2) contains the "semiwedge" defined
/// as any non-empty open set of rays immediately CCW from the edge (ab1, b2).
/// If reverse is true, then substitute clockwise for CCW; this simulates what
/// would happen if the direction of the other loop was reversed.
pub fn wedge_contains_semiwedge(a0: &Point, ab1: &Point, a2: &Point, b2: &Point, reverse: bool) -> bool {
    if b2 == a0 || b2 == a2 {
        // We have a shared or reversed edge.
        return (b2 == a0) == reverse;
    }
    ordered_ccw(a0, a2, b2, ab1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn p(x: f64, y: f64, z: f64) -> Point {
        Point::from_coords(x, y, z)
    }

    #[test]
    fn test_wedge_relations() {
        // For simplicity, all of these tests use an origin of (0, 0, 1).
        // This shouldn't matter as long as the lower-level primitives are
        // implemented correctly.
        let ab1 = p(0.0, 0.0, 1.0);
        let tests = vec![
            (
                "Intersection in one wedge",
                p(-1.0, 0.0, 10.0),
                p(1.0, 2.0, 10.0),
                p(0.0, 1.0, 10.0),
                p(1.0, -2.0, 10.0),
                false,
                true,
                WedgeRelation::ProperlyOverlaps,
            ),
            (
                "Intersection in two wedges",
                p(-1.0, -1.0, 10.0),
                p(1.0, -1.0, 10.0),
                p(1.0, 0.0, 10.0),
                p(-1.0, 1.0, 10.0),
                false,
                true,
                WedgeRelation::ProperlyOverlaps,
            ),
            (
                "Normal containment",
                p(-1.0, -1.0, 10.0),
                p(1.0, -1.0, 10.0),
                p(-1.0, 0.0, 10.0),
                p(1.0, 0.0, 10.0),
                true,
                true,
                WedgeRelation::ProperlyContains,
            ),
            (
                "Containment with equality on one side",
                p(2.0, 1.0, 10.0),
                p(-1.0, -1.0, 10.0),
                p(2.0, 1.0, 10.0),
                p(1.0, -5.0, 10.0),
                true,
                true,
                WedgeRelation::ProperlyContains,
            ),
            (
                "Containment with equality on the other side",
                p(2.0, 1.0, 10.0),
                p(-1.0, -1.0, 10.0),
                p(1.0, -2.0, 10.0),
                p(-1.0, -1.0, 10.0),
                true,
                true,
                WedgeRelation::ProperlyContains,
            ),
            (
                "Containment with equality on both sides",
                p(-2.0, 3.0, 10.0),
                p(4.0, -5.0, 10.0),
                p(-2.0, 3.0, 10.0),
                p(4.0, -5.0, 10.0),
                true,
                true,
                WedgeRelation::Equals,
            ),
            (
                "Disjoint with equality on one side",
                p(-2.0, 3.0, 10.0),
                p(4.0, -5.0, 10.0),
                p(4.0, -5.0, 10.0),
                p(-2.0, -3.0, 10.0),
                false,
                false,
                WedgeRelation::IsDisjoint,
            ),
            (
                "Disjoint with equality on the other side",
                p(-2.0, 3.0, 10.0),
                p(0.0, 5.0, 10.0),
                p(4.0, -5.0, 10.0),
                p(-2.0, 3.0, 10.0),
                false,
                false,
                WedgeRelation::IsDisjoint,
            ),
            (
                "Disjoint with equality on both sides",
                p(-2.0, 3.0, 10.0),
                p(4.0, -5.0, 10.0),
                p(4.0, -5.0, 10.0),
                p(-2.0, 3.0, 10.0),
                false,
                false,
                WedgeRelation::IsDisjoint,
            ),
            (
                "B contains A with equality on one side",
                p(2.0, 1.0, 10.0),
                p(1.0, -5.0, 10.0),
                p(2.0, 1.0, 10.0),
                p(-1.0, -1.0, 10.0),
                false,
                true,
                WedgeRelation::IsProperlyContained,
            ),
            (
                "B contains A with equality on the other side",
                p(2.0, 1.0, 10.0),
                p(1.0, -5.0, 10.0),
                p(-2.0, 1.0, 10.0),
                p(1.0, -5.0, 10.0),
                false,
                true,
                WedgeRelation::IsProperlyContained,
            ),
        ];

        for (desc, a0, a2, b0, b2, contains, intersects, relation) in tests {
            assert_eq!(
                wedge_contains(&a0, &ab1, &a2, &b0, &b2),
                contains,
                "{}: wedge_contains",
                desc
            );
            assert_eq!(
                wedge_intersects(&a0, &ab1, &a2, &b0, &b2),
                intersects,
                "{}: wedge_intersects",
                desc
            );
            assert_eq!(wedge_relation(&a0, &ab1, &a2, &b0, &b2), relation, "{}", desc);
        }
    }

    #[test]
    fn test_wedge_predicates_agree_with_relation() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let ab1 = p(0.0, 0.0, 1.0);
        let ray = |rng: &mut StdRng| p(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0), 10.0);
        for _ in 0..500 {
            let (a0, a2, b0, b2) = (ray(&mut rng), ray(&mut rng), ray(&mut rng), ray(&mut rng));
            let rel = wedge_relation(&a0, &ab1, &a2, &b0, &b2);
            assert_eq!(
                wedge_contains(&a0, &ab1, &a2, &b0, &b2),
                rel == WedgeRelation::Equals || rel == WedgeRelation::ProperlyContains,
                "{:?}",
                rel
            );
            assert_eq!(
                wedge_intersects(&a0, &ab1, &a2, &b0, &b2),
                rel != WedgeRelation::IsDisjoint,
                "{:?}",
                rel
            );

            // Swapping the wedges mirrors the relation.
            let mirrored = match rel {
                WedgeRelation::ProperlyContains => WedgeRelation::IsProperlyContained,
                WedgeRelation::IsProperlyContained => WedgeRelation::ProperlyContains,
                other => other,
            };
            assert_eq!(wedge_relation(&b0, &ab1, &b2, &a0, &a2), mirrored);
        }
    }

    #[test]
    fn test_wedge_contains_semiwedge() {
        let ab1 = p(0.0, 0.0, 1.0);
        // Wedge spanning the half plane y > 0.
        let a0 = p(-1.0, 0.0, 10.0);
        let a2 = p(1.0, 0.0, 10.0);

        assert!(wedge_contains_semiwedge(&a0, &ab1, &a2, &p(0.0, 1.0, 10.0), false));
        assert!(!wedge_contains_semiwedge(&a0, &ab1, &a2, &p(0.0, -1.0, 10.0), false));

        // Shared edge in the same direction as A's incoming edge.
        assert!(!wedge_contains_semiwedge(&a0, &ab1, &a2, &a0, false));
        assert!(wedge_contains_semiwedge(&a0, &ab1, &a2, &a0, true));

        // Shared edge along A's outgoing edge.
        assert!(wedge_contains_semiwedge(&a0, &ab1, &a2, &a2, false));
        assert!(!wedge_contains_semiwedge(&a0, &ab1, &a2, &a2, true));
    }
}
