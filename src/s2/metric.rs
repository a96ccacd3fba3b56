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

use crate::s2::cellid::MAX_LEVEL;

/// Metric is a measure for cells. It is used to describe the shape and size
/// of cells. They are useful for deciding which cell level to use in order to
/// satisfy a given condition (e.g. that cell vertices must be no further
/// than "x" apart). You can use the value(level) method to compute the
/// corresponding length or area on the unit sphere for cells at a given
/// level. The minimum and maximum bounds are valid for cells at all levels,
/// but they may be somewhat conservative for very large cells (e.g. face
/// cells).
#[derive(Debug, Clone, Copy)]
pub struct Metric {
    // dim is either 1 or 2, for a 1D or 2D metric respectively.
    pub dim: u8,
    // deriv is the scaling factor for the metric.
    pub deriv: f64,
}

// Each cell is bounded by four planes passing through its four edges and
// the center of the sphere. The average edge length is computed under the
// quadratic projection.
pub const AVG_EDGE_METRIC: Metric = Metric {
    dim: 1,
    deriv: 1.459213746386106062,
};

impl Metric {
    /// Returns the value of the metric at the given level.
    pub fn value(&self, level: u64) -> f64 {
        libm::ldexp(self.deriv, -((self.dim as u64 * level) as i32))
    }

    /// Returns the minimum level such that the metric is at most the given
    /// value, or MAX_LEVEL if there is no such level.
    pub fn min_level(&self, val: f64) -> u64 {
        if val <= 0.0 {
            return MAX_LEVEL;
        }
        let level = -(libm::ilogb(val / self.deriv) >> (self.dim - 1));
        level.max(0).min(MAX_LEVEL as i32) as u64
    }
}
