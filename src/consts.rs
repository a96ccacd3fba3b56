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

/// The difference between 1.0 and the next representable f64.
pub const DBL_EPSILON: f64 = f64::EPSILON;

/// Tolerance used by approximate comparisons of unit vectors and angles.
pub const EPSILON: f64 = 1e-15;

// f64_eq reports whether the two values are within EPSILON of each other.
pub fn f64_eq(x: f64, y: f64) -> bool {
    (x - y).abs() <= EPSILON
}
