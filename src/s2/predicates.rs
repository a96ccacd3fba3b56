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

// This file contains the robust orientation predicates. Each predicate
// is computed in tiers: a cheap floating-point determinant with a tight
// error bound, a numerically stable recomputation, exact arithmetic, and
// finally a symbolic perturbation that guarantees a definite answer for any
// three distinct points.

use crate::consts::DBL_EPSILON;
use crate::s2::point::Point;
use crate::r3::precisevector::{sign_of, PreciseVector};
use std::ops::Neg;

// MAX_DETERMINANT_ERROR is the maximum error in computing (AxB).C where all
// vectors are unit length. Using standard inequalities, it can be shown that
//
//	fl(AxB) = AxB + D where |D| <= (|AxB| + (2/sqrt(3))*|A|*|B|) * e
//
// and similarly for the dot product with C.
const MAX_DETERMINANT_ERROR: f64 = 1.8274 * DBL_EPSILON;

// DET_ERROR_MULTIPLIER is the factor to scale the magnitudes by when checking
// for the sign of set of points with certainty.
const DET_ERROR_MULTIPLIER: f64 = 3.2321 * DBL_EPSILON;

/// Direction is an indication of the ordering of a set of points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Clockwise = -1,
    Indeterminate = 0,
    CounterClockwise = 1,
}

impl Neg for Direction {
    type Output = Direction;
    fn neg(self) -> Direction {
        match self {
            Direction::Clockwise => Direction::CounterClockwise,
            Direction::Indeterminate => Direction::Indeterminate,
            Direction::CounterClockwise => Direction::Clockwise,
        }
    }
}

impl From<i32> for Direction {
    fn from(s: i32) -> Self {
        match s.signum() {
            -1 => Direction::Clockwise,
            1 => Direction::CounterClockwise,
            _ => Direction::Indeterminate,
        }
    }
}

/// Reports whether the points A, B, C are strictly counterclockwise, using
/// plain floating point. sign(a,b,c) and sign(c,b,a) are never both true.
pub fn sign(a: &Point, b: &Point, c: &Point) -> bool {
    // (C x A).B instead of (A x B).C, so that ABC and CBA can not both be CCW.
    c.0.cross(&a.0).dot(&b.0) > 0.0
}

/// Returns a Direction representing the ordering of the points.
/// CounterClockwise is returned if the points are in counter-clockwise order,
/// Clockwise for clockwise, and Indeterminate if any two points are the same
/// (collinear), or the sign could not completely be determined.
///
/// This function has additional logic to make sure that the above properties
/// hold even when the three points are coplanar, and to deal with the
/// limitations of floating-point arithmetic.
///
/// robust_sign satisfies the following conditions:
///
///  (1) robust_sign(a,b,c) == Indeterminate if and only if a == b, b == c, or c == a
///  (2) robust_sign(b,c,a) == robust_sign(a,b,c) for all a,b,c
///  (3) robust_sign(c,b,a) == -robust_sign(a,b,c) for all a,b,c
pub fn robust_sign(a: &Point, b: &Point, c: &Point) -> Direction {
    let sign = triage_sign(a, b, c);
    if sign != Direction::Indeterminate {
        return sign;
    }
    expensive_sign(a, b, c)
}

/// Returns the direction sign of the points. It returns Indeterminate if two
/// points are identical or the result is uncertain. Uncertain cases can be
/// resolved, if desired, by calling expensive_sign.
pub fn triage_sign(a: &Point, b: &Point, c: &Point) -> Direction {
    triage_sign_with_cross(&Point(a.0.cross(&b.0)), c)
}

// triage_sign_with_cross is triage_sign for callers that already hold AxB.
pub(crate) fn triage_sign_with_cross(a_cross_b: &Point, c: &Point) -> Direction {
    let det = a_cross_b.0.dot(&c.0);
    if det > MAX_DETERMINANT_ERROR {
        Direction::CounterClockwise
    } else if det < -MAX_DETERMINANT_ERROR {
        Direction::Clockwise
    } else {
        Direction::Indeterminate
    }
}

/// Reports the direction sign of the points in a numerically stable way.
/// Unlike triage_sign, this method can usually compute the correct
/// determinant sign even when all three points are as collinear as possible.
/// Returns Indeterminate when the sign can not be determined with certainty.
pub fn stable_sign(a: &Point, b: &Point, c: &Point) -> Direction {
    let ab = b.0 - a.0;
    let ab2 = ab.norm2();
    let bc = c.0 - b.0;
    let bc2 = bc.norm2();
    let ca = a.0 - c.0;
    let ca2 = ca.norm2();

    // The determinant ((A-C)x(B-C)).C is computed with the vertices
    // cyclically permuted so that AB is the longest edge, which minimizes
    // the magnitude of the cross product.
    let (e1, e2, op) = if ab2 >= bc2 && ab2 >= ca2 {
        (ca, bc, c.0)
    } else if bc2 >= ca2 {
        (ab, ca, a.0)
    } else {
        (bc, ab, b.0)
    };

    let det = -e1.cross(&e2).dot(&op);
    let max_err = DET_ERROR_MULTIPLIER * (e1.norm2() * e2.norm2()).sqrt();

    if det > max_err {
        Direction::CounterClockwise
    } else if det < -max_err {
        Direction::Clockwise
    } else {
        Direction::Indeterminate
    }
}

/// Reports the direction sign of the points, falling back to exact
/// arithmetic and symbolic perturbation when needed. Returns Indeterminate
/// only if two of the points are the same.
pub fn expensive_sign(a: &Point, b: &Point, c: &Point) -> Direction {
    if a == b || b == c || c == a {
        return Direction::Indeterminate;
    }

    let det_sign = stable_sign(a, b, c);
    if det_sign != Direction::Indeterminate {
        return det_sign;
    }

    exact_sign(a, b, c, true)
}

/// Reports the direction sign of the points computed using exact
/// arithmetic. If perturb is true, exact collinearity is resolved by
/// symbolic perturbation so the result is never Indeterminate for
/// distinct points.
pub fn exact_sign(a: &Point, b: &Point, c: &Point, perturb: bool) -> Direction {
    // Sort the three points lexicographically, tracking the sign of the
    // permutation. Each exchange inverts the sign of the determinant.
    let mut perm_sign = 1;
    let (mut pa, mut pb, mut pc) = (a, b, c);
    if pa.0.cmp(&pb.0).is_gt() {
        std::mem::swap(&mut pa, &mut pb);
        perm_sign = -perm_sign;
    }
    if pb.0.cmp(&pc.0).is_gt() {
        std::mem::swap(&mut pb, &mut pc);
        perm_sign = -perm_sign;
    }
    if pa.0.cmp(&pb.0).is_gt() {
        std::mem::swap(&mut pa, &mut pb);
        perm_sign = -perm_sign;
    }

    let xa = PreciseVector::from_vector(&pa.0);
    let xb = PreciseVector::from_vector(&pb.0);
    let xc = PreciseVector::from_vector(&pc.0);
    let xb_cross_xc = xb.cross(&xc);
    let det = xa.dot(&xb_cross_xc);

    let mut det_sign = sign_of(&det);
    if det_sign == 0 && perturb {
        det_sign = symbolically_perturbed_sign(&xa, &xb, &xc, &xb_cross_xc);
    }
    Direction::from(perm_sign * det_sign)
}

// symbolically_perturbed_sign reports the sign of the determinant of three
// points A, B, C under a model where every possible Point is slightly
// perturbed by a unique infinitesimal amount such that no three perturbed
// points are collinear and no four points are coplanar. The points must be
// sorted lexicographically and their exact determinant must be zero.
//
// Every input coordinate x[i] is assigned a symbolic perturbation dx[i] with
//
//	da.z > da.y > da.x > db.z > db.y > db.x > dc.z > dc.y > dc.x
//
// where each perturbation is so much smaller than the previous one that it
// only matters when the coefficients of all larger perturbations (and
// products of perturbations) are zero. The coefficients are enumerated in
// order of decreasing magnitude; the first non-zero one decides.
fn symbolically_perturbed_sign(
    a: &PreciseVector,
    b: &PreciseVector,
    c: &PreciseVector,
    b_cross_c: &PreciseVector,
) -> i32 {
    let det_sign = sign_of(&b_cross_c.z); // da.z
    if det_sign != 0 {
        return det_sign;
    }
    let det_sign = sign_of(&b_cross_c.y); // da.y
    if det_sign != 0 {
        return det_sign;
    }
    let det_sign = sign_of(&b_cross_c.x); // da.x
    if det_sign != 0 {
        return det_sign;
    }

    let det_sign = sign_of(&(&(&c.x * &a.y) - &(&c.y * &a.x))); // db.z
    if det_sign != 0 {
        return det_sign;
    }
    let det_sign = sign_of(&c.x); // db.z * da.y
    if det_sign != 0 {
        return det_sign;
    }
    let det_sign = -sign_of(&c.y); // db.z * da.x
    if det_sign != 0 {
        return det_sign;
    }

    let det_sign = sign_of(&(&(&c.z * &a.x) - &(&c.x * &a.z))); // db.y
    if det_sign != 0 {
        return det_sign;
    }
    let det_sign = sign_of(&c.z); // db.y * da.x
    if det_sign != 0 {
        return det_sign;
    }

    // db.x is redundant: the tests above guarantee that C == 0.

    let det_sign = sign_of(&(&(&a.x * &b.y) - &(&a.y * &b.x))); // dc.z
    if det_sign != 0 {
        return det_sign;
    }
    let det_sign = -sign_of(&b.x); // dc.z * da.y
    if det_sign != 0 {
        return det_sign;
    }
    let det_sign = sign_of(&b.y); // dc.z * da.x
    if det_sign != 0 {
        return det_sign;
    }
    let det_sign = sign_of(&a.x); // dc.z * db.y
    if det_sign != 0 {
        return det_sign;
    }
    // dc.z * db.y * da.x
    1
}
