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

use crate::s2::point::{ordered_ccw, Point};
use crate::s2::edge_crosser::EdgeCrosser;

// A Crossing indicates how edges cross.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Crossing {
    Cross,
    Maybe,
    DoNotCross,
}

impl std::fmt::Display for Crossing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Crossing::Cross => write!(f, "Cross"),
            Crossing::Maybe => write!(f, "MaybeCross"),
            Crossing::DoNotCross => write!(f, "DoNotCross"),
        }
    }
}

// crossing_sign reports whether the edge AB intersects the edge CD.
// If AB crosses CD at a point that is interior to both edges, Cross is returned.
// If any two vertices from different edges are the same it returns Maybe.
// Otherwise it returns DoNotCross.
// If either edge is degenerate (A == B or C == D), the return value is Maybe
// if two vertices from different edges are the same and DoNotCross otherwise.
//
// This method implements an exact, consistent perturbation model such
// that no three points are ever considered to be collinear. This means
// that even if you have 4 points A, B, C, D that lie exactly in a line
// (say, around the equator), C and D will be treated as being slightly to
// one side or the other of AB. This is done in a way such that the
// results are always consistent (see robust_sign).
pub fn crossing_sign(a: &Point, b: &Point, c: &Point, d: &Point) -> Crossing {
    let mut crosser = EdgeCrosser::new_chain_edge_crosser(a, b, c);
    crosser.chain_crossing_sign(d)
}

// vertex_crossing reports whether two edges "cross" in such a way that
// point-in-polygon containment tests can be implemented by counting the
// number of edge crossings.
//
// Given two edges AB and CD where at least two vertices are identical
// (i.e. crossing_sign(a,b,c,d) == Maybe), the basic rule is that a "crossing"
// occurs if AB is encountered after CD during a CCW sweep around the shared
// vertex starting from a fixed reference point.
//
// Note that according to this rule, if AB crosses CD then in general CD
// does not cross AB. However, this leads to the correct result when
// counting polygon edge crossings. For example, suppose that A,B,C are
// three consecutive vertices of a CCW polygon. If we now consider the edge
// crossings of a segment BP as P sweeps around B, the crossing number
// changes parity exactly when BP crosses BA or BC.
//
// Useful properties of vertex_crossing (VC):
//
//	(1) VC(a,a,c,d) == VC(a,b,c,c) == false
//	(2) VC(a,b,a,b) == VC(a,b,b,a) == true
//	(3) VC(a,b,c,d) == VC(a,b,d,c) == VC(b,a,c,d) == VC(b,a,d,c)
//	(3) If exactly one of a,b equals one of c,d, then exactly one of
//	    VC(a,b,c,d) and VC(c,d,a,b) is true
//
// It is an error to call this method with 4 distinct vertices.
pub fn vertex_crossing(a: &Point, b: &Point, c: &Point, d: &Point) -> bool {
    // If A == B or C == D there is no intersection. We need to check this
    // case first in case 3 or more input points are identical.
    if a == b || c == d {
        return false;
    }

    // If any other pair of vertices is equal, there is a crossing if and only
    // if ordered_ccw indicates that the edge AB is further CCW around the
    // shared vertex O (either A or B) than the edge CD, starting from an
    // arbitrary fixed reference point.
    if a == c {
        (b == d) || ordered_ccw(&a.reference_dir(), d, b, a)
    } else if b == d {
        ordered_ccw(&b.reference_dir(), c, a, b)
    } else if a == d {
        (b == c) || ordered_ccw(&a.reference_dir(), c, b, a)
    } else if b == c {
        ordered_ccw(&b.reference_dir(), d, a, b)
    } else {
        false
    }
}

// edge_or_vertex_crossing is a convenience function that calls crossing_sign
// to handle cases where all four vertices are distinct, and vertex_crossing
// to handle cases where two or more vertices are the same. This defines a
// crossing function such that point-in-polygon containment tests can be
// implemented by simply counting edge crossings.
pub fn edge_or_vertex_crossing(a: &Point, b: &Point, c: &Point, d: &Point) -> bool {
    match crossing_sign(a, b, c, d) {
        Crossing::DoNotCross => false,
        Crossing::Cross => true,
        Crossing::Maybe => vertex_crossing(a, b, c, d),
    }
}

// angle_contains_vertex reports if the angle ABC contains its vertex B.
// Containment is defined such that if several polygons tile the region
// around a vertex, then exactly one of those polygons contains that vertex.
// Returns false for degenerate angles of the form ABA.
//
// Note that this method is not sufficient to determine vertex containment
// in polygons with duplicate vertices (such as the polygon ABCADE). Use
// a shape-level contains test for such polygons instead.
pub fn angle_contains_vertex(a: &Point, b: &Point, c: &Point) -> bool {
    // A loop with consecutive vertices A, B, C contains vertex B if and only
    // if the fixed vector R = reference_dir(B) is contained by the wedge ABC.
    // The wedge is closed at A and open at C, i.e. the point B is inside the
    // loop if A = R but not if C = R.
    //
    // The test below gets the correct results for degenerate angles: if
    // A = C or C = R it returns false, and otherwise if A = R it returns true.
    !ordered_ccw(&b.reference_dir(), c, a, b)
}
