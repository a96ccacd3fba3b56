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

//! The loop relations that drive the crossing-relation merge. Each relation
//! tells the merge which whole-cell containment mismatches are equivalent to
//! an edge crossing, and how to interpret a vertex shared by both loops.

use crate::s2::error::S2Error;
use crate::s2::point::Point;
use crate::s2::wedge_relations::{wedge_contains, wedge_contains_semiwedge, wedge_intersects};
use std::cmp::Ordering;
use std::convert::TryFrom;
use std::fmt;
use std::ops::Neg;

/// CrossingTarget represents the possible crossing target cases for relations.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CrossingTarget {
    DontCare,
    DontCross,
    Cross,
}

impl CrossingTarget {
    /// Reports whether a cell whose center containment is contains_center
    /// satisfies this target. DontCare is never satisfied.
    pub fn matches(self, contains_center: bool) -> bool {
        match self {
            CrossingTarget::DontCare => false,
            CrossingTarget::DontCross => !contains_center,
            CrossingTarget::Cross => contains_center,
        }
    }
}

/// LoopRelation defines the relation tested by the crossing-relation merge.
///
/// If a point P is found such that
///
///   A.contains_point(P) == a_crossing_target() &&
///   B.contains_point(P) == b_crossing_target()
///
/// then the merge reports the same result as though a pair of crossing
/// edges had been found. DontCare disables that early exit for one side.
pub trait LoopRelation {
    /// Returns the crossing target for loop A
    fn a_crossing_target(&self) -> CrossingTarget;

    /// Returns the crossing target for loop B
    fn b_crossing_target(&self) -> CrossingTarget;

    /// Given a vertex ab1 that is shared between the two loops, reports
    /// whether the two associated wedges (a0, ab1, a2) and (b0, ab1, b2) are
    /// equivalent to an edge crossing. The relation may also record state
    /// about the shared vertex for use after the merge completes.
    fn wedges_cross(&mut self, a0: &Point, ab1: &Point, a2: &Point, b0: &Point, b2: &Point)
        -> bool;
}

/// ContainsRelation is a helper for the Contains() method.
/// If A.ContainsPoint(P) == false && B.ContainsPoint(P) == true, it is equivalent
/// to having an edge crossing (i.e., Contains returns false).
#[derive(Debug, Default)]
pub struct ContainsRelation {
    found_shared_vertex: bool,
}

impl ContainsRelation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn found_shared_vertex(&self) -> bool {
        self.found_shared_vertex
    }
}

impl LoopRelation for ContainsRelation {
    fn a_crossing_target(&self) -> CrossingTarget {
        CrossingTarget::DontCross
    }

    fn b_crossing_target(&self) -> CrossingTarget {
        CrossingTarget::Cross
    }

    fn wedges_cross(
        &mut self,
        a0: &Point,
        ab1: &Point,
        a2: &Point,
        b0: &Point,
        b2: &Point,
    ) -> bool {
        self.found_shared_vertex = true;
        !wedge_contains(a0, ab1, a2, b0, b2)
    }
}

/// IntersectsRelation is a helper for the Intersects() method.
/// Given two loops, A and B, if A.ContainsPoint(P) == true && B.ContainsPoint(P) == true,
/// it is equivalent to having an edge crossing (i.e., Intersects returns true).
#[derive(Debug, Default)]
pub struct IntersectsRelation {
    found_shared_vertex: bool,
}

impl IntersectsRelation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn found_shared_vertex(&self) -> bool {
        self.found_shared_vertex
    }
}

impl LoopRelation for IntersectsRelation {
    fn a_crossing_target(&self) -> CrossingTarget {
        CrossingTarget::Cross
    }

    fn b_crossing_target(&self) -> CrossingTarget {
        CrossingTarget::Cross
    }

    fn wedges_cross(
        &mut self,
        a0: &Point,
        ab1: &Point,
        a2: &Point,
        b0: &Point,
        b2: &Point,
    ) -> bool {
        self.found_shared_vertex = true;
        wedge_intersects(a0, ab1, a2, b0, b2)
    }
}

// compareBoundaryRelation implements loopRelation for comparing boundaries.
//
// The compare boundary relation does not have a useful early-exit condition,
// so we return crossingTargetDontCare for both crossing targets.
//
// Aside: A possible early exit condition could be based on the following.
//
//	If A contains a point of both B and ~B, then A intersects Boundary(B).
//	If ~A contains a point of both B and ~B, then ~A intersects Boundary(B).
//	So if the intersections of {A, ~A} with {B, ~B} are all non-empty,
//	the return value is 0, i.e., Boundary(A) intersects Boundary(B).
//
// Unfortunately it isn't worth detecting this situation because by the
// time we have seen a point in all four intersection regions, we are also
// guaranteed to have seen at least one pair of crossing edges.
#[derive(Debug)]
pub struct CompareBoundaryRelation {
    reverse: bool,
    found_shared_vertex: bool,
    contains_edge: bool,
    excludes_edge: bool,
}

impl CompareBoundaryRelation {
    /// reverse is true if the other loop should be reversed first.
    pub fn new(reverse: bool) -> Self {
        Self {
            reverse,
            found_shared_vertex: false,
            contains_edge: false,
            excludes_edge: false,
        }
    }

    pub fn found_shared_vertex(&self) -> bool {
        self.found_shared_vertex
    }

    /// Reports whether some shared vertex was locally classified as A
    /// containing B's boundary.
    pub fn contains_edge(&self) -> bool {
        self.contains_edge
    }

    /// Reports whether some shared vertex was locally classified as A
    /// excluding B's boundary.
    pub fn excludes_edge(&self) -> bool {
        self.excludes_edge
    }
}

impl LoopRelation for CompareBoundaryRelation {
    fn a_crossing_target(&self) -> CrossingTarget {
        CrossingTarget::DontCare
    }

    fn b_crossing_target(&self) -> CrossingTarget {
        CrossingTarget::DontCare
    }

    fn wedges_cross(
        &mut self,
        a0: &Point,
        ab1: &Point,
        a2: &Point,
        _b0: &Point,
        b2: &Point,
    ) -> bool {
        // Because we don't care about the interior of the other, only its boundary,
        // it is sufficient to check whether this one contains the semiwedge (ab1, b2).
        self.found_shared_vertex = true;
        if wedge_contains_semiwedge(a0, ab1, a2, b2, self.reverse) {
            self.contains_edge = true
        } else {
            self.excludes_edge = true
        }
        self.contains_edge && self.excludes_edge
    }
}

/// BoundaryCondition is the result of Loop::compare_boundary.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BoundaryCondition {
    /// A contains the boundary of B.
    ContainsOther,
    /// The boundaries of A and B cross.
    CrossesOther,
    /// A excludes the boundary of B.
    ExcludesOther,
}

impl From<BoundaryCondition> for i32 {
    fn from(b: BoundaryCondition) -> i32 {
        match b {
            BoundaryCondition::ContainsOther => 1,
            BoundaryCondition::CrossesOther => 0,
            BoundaryCondition::ExcludesOther => -1,
        }
    }
}

impl PartialEq<i32> for BoundaryCondition {
    fn eq(&self, other: &i32) -> bool {
        i32::from(*self) == *other
    }
}

impl PartialOrd<i32> for BoundaryCondition {
    fn partial_cmp(&self, other: &i32) -> Option<Ordering> {
        Some(i32::from(*self).cmp(other))
    }
}

impl Neg for BoundaryCondition {
    type Output = Self;
    fn neg(self) -> Self {
        match self {
            BoundaryCondition::ContainsOther => BoundaryCondition::ExcludesOther,
            BoundaryCondition::CrossesOther => BoundaryCondition::CrossesOther,
            BoundaryCondition::ExcludesOther => BoundaryCondition::ContainsOther,
        }
    }
}

impl TryFrom<i32> for BoundaryCondition {
    type Error = S2Error;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(BoundaryCondition::ContainsOther),
            0 => Ok(BoundaryCondition::CrossesOther),
            -1 => Ok(BoundaryCondition::ExcludesOther),
            _ => Err(S2Error::InvalidArgument(format!(
                "boundary condition must be -1, 0 or 1, got {}",
                value
            ))),
        }
    }
}

impl fmt::Display for BoundaryCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", i32::from(*self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64, z: f64) -> Point {
        Point::from_coords(x, y, z)
    }

    // A wedge around the north pole spanning the half plane y > 0, and a
    // second wedge inside it.
    fn wedges() -> (Point, Point, Point, Point, Point) {
        (
            p(-1.0, 0.0, 10.0),
            p(0.0, 0.0, 1.0),
            p(1.0, 0.0, 10.0),
            p(-1.0, 1.0, 10.0),
            p(1.0, 1.0, 10.0),
        )
    }

    #[test]
    fn test_crossing_target_matches() {
        assert!(CrossingTarget::Cross.matches(true));
        assert!(!CrossingTarget::Cross.matches(false));
        assert!(CrossingTarget::DontCross.matches(false));
        assert!(!CrossingTarget::DontCross.matches(true));
        assert!(!CrossingTarget::DontCare.matches(true));
        assert!(!CrossingTarget::DontCare.matches(false));
    }

    #[test]
    fn test_contains_relation() {
        let (a0, ab1, a2, b0, b2) = wedges();
        let mut r = ContainsRelation::new();
        assert_eq!(r.a_crossing_target(), CrossingTarget::DontCross);
        assert_eq!(r.b_crossing_target(), CrossingTarget::Cross);
        assert!(!r.found_shared_vertex());

        // A contains B.
        assert!(!r.wedges_cross(&a0, &ab1, &a2, &b0, &b2));
        assert!(r.found_shared_vertex());
        // B does not contain A.
        assert!(r.wedges_cross(&b0, &ab1, &b2, &a0, &a2));
    }

    #[test]
    fn test_intersects_relation() {
        let (a0, ab1, a2, b0, b2) = wedges();
        let mut r = IntersectsRelation::new();
        assert_eq!(r.a_crossing_target(), CrossingTarget::Cross);
        assert_eq!(r.b_crossing_target(), CrossingTarget::Cross);
        assert!(r.wedges_cross(&a0, &ab1, &a2, &b0, &b2));
        assert!(r.found_shared_vertex());

        // The complement of A's wedge is disjoint from B's wedge.
        assert!(!r.wedges_cross(&a2, &ab1, &a0, &b0, &b2));
    }

    #[test]
    fn test_compare_boundary_relation() {
        let (a0, ab1, a2, b0, b2) = wedges();
        let mut r = CompareBoundaryRelation::new(false);
        assert_eq!(r.a_crossing_target(), CrossingTarget::DontCare);
        assert_eq!(r.b_crossing_target(), CrossingTarget::DontCare);

        // The ray to b2 lies inside A.
        assert!(!r.wedges_cross(&a0, &ab1, &a2, &b0, &b2));
        assert!(r.found_shared_vertex());
        assert!(r.contains_edge());
        assert!(!r.excludes_edge());

        // A ray outside A completes the pair, which means the boundaries cross.
        let outside = p(0.0, -1.0, 10.0);
        assert!(r.wedges_cross(&a0, &ab1, &a2, &b0, &outside));
        assert!(r.excludes_edge());
    }

    #[test]
    fn test_boundary_condition_conversions() {
        for &v in [-1, 0, 1].iter() {
            let b = BoundaryCondition::try_from(v).unwrap();
            assert_eq!(i32::from(b), v);
            assert!(b == v);
            assert_eq!(i32::from(-b), -v);
        }
        assert_eq!(
            BoundaryCondition::try_from(2),
            Err(S2Error::InvalidArgument(
                "boundary condition must be -1, 0 or 1, got 2".to_string()
            ))
        );
        assert!(BoundaryCondition::ContainsOther > 0);
        assert!(BoundaryCondition::ExcludesOther < 0);
        assert_eq!(BoundaryCondition::CrossesOther.to_string(), "0");
    }
}
