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

//! Helpers shared by the unit tests.

use crate::r3::vector::Vector;
use crate::s2::point::Point;
use crate::s2::r#loop::Loop;
use std::f64::consts::PI;

#[macro_export]
macro_rules! assert_eq_with_callout {
    ($x:expr, $y:expr) => {
        $crate::assert_eq_with_callout!($x, $y, "assertion failed: ");
    };

    // With a custom message naming the case under test.
    ($x:expr, $y:expr, $msg:expr) => {
        let x_val = $x;
        let y_val = $y;
        if x_val != y_val {
            panic!(
                concat!("{}\n", "Left:    {:?}\n", "Right:   {:?}\n", "NOT EQUAL!"),
                $msg, x_val, y_val,
            );
        }
    };
}

/// Returns the point for the given latitude and longitude in degrees.
pub fn lat_lng_point(lat: f64, lng: f64) -> Point {
    let phi = lat * (PI / 180.0);
    let theta = lng * (PI / 180.0);
    let cos_phi = phi.cos();
    Point(Vector::new(theta.cos() * cos_phi, theta.sin() * cos_phi, phi.sin()))
}

/// Parses a comma separated list of "lat:lng" pairs in degrees.
pub fn parse_points(s: &str) -> Vec<Point> {
    s.split(',')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let mut parts = pair.split(':');
            let lat: f64 = parts.next().unwrap().trim().parse().unwrap();
            let lng: f64 = parts.next().unwrap().trim().parse().unwrap();
            lat_lng_point(lat, lng)
        })
        .collect()
}

/// Builds a loop from a list of "lat:lng" pairs. The names "empty" and
/// "full" produce the special loops.
pub fn make_loop(s: &str) -> Loop {
    match s.trim() {
        "empty" => Loop::empty(),
        "full" => Loop::full(),
        s => Loop::from_points(parse_points(s)),
    }
}
