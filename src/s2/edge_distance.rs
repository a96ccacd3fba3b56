// Copyright 2018 Google Inc. All rights reserved.
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

// Distances from points to edges. Distances are computed internally as
// squared chord lengths, which are cheap and accurate for small distances,
// and converted to angles at the boundary.

use crate::consts::DBL_EPSILON;
use crate::s2::point::Point;
use crate::s1::Angle;

/// Returns the distance of point X from line segment AB.
/// The points are expected to be normalized. The result is very accurate for
/// small distances but may have some numerical error if the distance is large
/// (approximately pi/2 or greater). The case A == B is handled correctly.
pub fn distance_from_segment(x: &Point, a: &Point, b: &Point) -> Angle {
    let chord2 = match interior_dist2(x, a, b) {
        // Minimum distance is attained along the edge interior.
        Some(d) => d,
        // Otherwise the minimum distance is to one of the endpoints.
        None => (x.0 - a.0).norm2().min((x.0 - b.0).norm2()),
    };
    chord2_to_angle(chord2)
}

// chord2_to_angle converts a squared chord length to the angle it subtends.
fn chord2_to_angle(chord2: f64) -> Angle {
    Angle(2.0 * (0.5 * chord2.min(4.0).sqrt()).asin())
}

// interior_dist2 returns the squared chord distance from X to edge AB,
// assuming that the closest point to X is interior to AB. If the closest
// point is not interior to AB, returns None.
fn interior_dist2(x: &Point, a: &Point, b: &Point) -> Option<f64> {
    // Chord distance squared of x to both end points a and b.
    let xa2 = (x.0 - a.0).norm2();
    let xb2 = (x.0 - b.0).norm2();

    // The closest point on AB could either be one of the two vertices (the
    // vertex case) or in the interior (the interior case). Let C = A x B.
    // If X is in the spherical wedge extending from A to B around the axis
    // through C, then we are in the interior case. Otherwise we are in the
    // vertex case.
    //
    // The planar angles XAB and XBA are always less than the corresponding
    // spherical angles, so if we are in the interior case both must be
    // acute. By the law of cosines that means
    //
    //            | XA^2 - XB^2 | < AB^2      (*)
    //
    // which is checked conservatively to account for rounding.
    let ab2 = (a.0 - b.0).norm2();
    let max_error = 4.75 * DBL_EPSILON * (xa2 + xb2 + ab2) + 8.0 * DBL_EPSILON * DBL_EPSILON;
    if (xa2 - xb2).abs() >= ab2 + max_error {
        return None;
    }

    // The minimum distance might be to a point on the edge interior. Let R
    // be closest point to X that lies on the great circle through AB. Rather
    // than computing the geodesic distance along the surface of the sphere,
    // instead we compute the "chord length" through the sphere's interior.
    let c = a.point_cross(b);
    let c2 = c.0.norm2();
    let x_dot_c = x.0.dot(&c.0);
    let x_dot_c2 = x_dot_c * x_dot_c;

    // X projects outside the interior of AB when
    // (A-X).(C x X) >= 0 or (B-X).(C x X) <= 0.
    let cx = c.0.cross(&x.0);
    if (a.0 - x.0).dot(&cx) >= 0.0 || (b.0 - x.0).dot(&cx) <= 0.0 {
        return None;
    }

    // XR^2 = XQ^2 + QR^2, where Q is the projection of X onto the plane of
    // AB. This uses both the dot and cross products so it is accurate for all
    // chord lengths.
    let qr = 1.0 - (cx.norm2() / c2).sqrt();
    Some((x_dot_c2 / c2) + (qr * qr))
}
