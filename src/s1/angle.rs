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

use cgmath::{Deg, Rad};
use std::f64::consts::PI;
use std::ops::{Add, Mul, Neg, Sub};

/// Angle represents a 1D angle, stored in radians.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Angle(pub f64);

impl Angle {
    pub fn rad(&self) -> f64 {
        self.0
    }

    pub fn deg(&self) -> f64 {
        self.0 * (180.0 / PI)
    }

    pub fn abs(&self) -> Angle {
        Angle(self.0.abs())
    }

    // normalized returns an equivalent angle in (-π, π].
    pub fn normalized(&self) -> Angle {
        let mut rad = self.0 % (2.0 * PI);
        if rad <= -PI {
            rad += 2.0 * PI;
        } else if rad > PI {
            rad -= 2.0 * PI;
        }
        Angle(rad)
    }
}

impl From<Deg<f64>> for Angle {
    fn from(d: Deg<f64>) -> Self {
        let r: Rad<f64> = d.into();
        Angle(r.0)
    }
}

impl From<Rad<f64>> for Angle {
    fn from(r: Rad<f64>) -> Self {
        Angle(r.0)
    }
}

impl Add for Angle {
    type Output = Angle;
    fn add(self, other: Angle) -> Angle {
        Angle(self.0 + other.0)
    }
}

impl Sub for Angle {
    type Output = Angle;
    fn sub(self, other: Angle) -> Angle {
        Angle(self.0 - other.0)
    }
}

impl Mul<f64> for Angle {
    type Output = Angle;
    fn mul(self, m: f64) -> Angle {
        Angle(self.0 * m)
    }
}

impl Neg for Angle {
    type Output = Angle;
    fn neg(self) -> Angle {
        Angle(-self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degrees() {
        assert!((Angle::from(Deg(180.0)).rad() - PI).abs() < 1e-15);
        assert!((Angle(PI / 2.0).deg() - 90.0).abs() < 1e-13);
        assert_eq!(Angle::from(Rad(1.25)), Angle(1.25));
    }

    #[test]
    fn test_normalized() {
        assert!((Angle(3.0 * PI).normalized().rad() - PI).abs() < 1e-14);
        assert!((Angle(-PI).normalized().rad() - PI).abs() < 1e-14);
        assert_eq!(Angle(0.5).normalized(), Angle(0.5));
    }
}
