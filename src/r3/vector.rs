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

use std::cmp::Ordering;
use std::ops::{Add, Mul, Neg, Sub};

/// Axis names a coordinate axis of a Vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// Vector represents a point in ℝ³.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vector {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Vector { x, y, z }
    }

    // approx_eq reports whether v and ov are equal within a small epsilon.
    pub fn approx_eq(&self, ov: &Vector) -> bool {
        const EPSILON: f64 = 1e-16;
        (self.x - ov.x).abs() < EPSILON
            && (self.y - ov.y).abs() < EPSILON
            && (self.z - ov.z).abs() < EPSILON
    }

    pub fn abs(&self) -> Vector {
        Vector::new(self.x.abs(), self.y.abs(), self.z.abs())
    }

    pub fn dot(&self, ov: &Vector) -> f64 {
        self.x * ov.x + self.y * ov.y + self.z * ov.z
    }

    pub fn cross(&self, ov: &Vector) -> Vector {
        Vector::new(
            self.y * ov.z - self.z * ov.y,
            self.z * ov.x - self.x * ov.z,
            self.x * ov.y - self.y * ov.x,
        )
    }

    pub fn norm(&self) -> f64 {
        self.norm2().sqrt()
    }

    pub fn norm2(&self) -> f64 {
        self.dot(self)
    }

    /// Returns a unit vector in the same direction as v. The zero vector is
    /// returned unchanged.
    pub fn normalize(&self) -> Vector {
        let n = self.norm();
        if n == 0.0 {
            return *self;
        }
        *self * (1.0 / n)
    }

    // is_unit reports whether this vector is of approximately unit length.
    pub fn is_unit(&self) -> bool {
        const EPSILON: f64 = 5e-14;
        (self.norm2() - 1.0).abs() <= EPSILON
    }

    /// Returns the angle between v and ov, in radians.
    pub fn angle(&self, ov: &Vector) -> f64 {
        self.cross(ov).norm().atan2(self.dot(ov))
    }

    pub fn distance(&self, ov: &Vector) -> f64 {
        (*self - *ov).norm()
    }

    pub fn largest_component(&self) -> Axis {
        let t = self.abs();
        if t.x > t.y {
            if t.x > t.z {
                Axis::X
            } else {
                Axis::Z
            }
        } else if t.y > t.z {
            Axis::Y
        } else {
            Axis::Z
        }
    }

    /// Returns a unit vector that is orthogonal to v.
    /// ortho(-v) = -ortho(v) for all v.
    pub fn ortho(&self) -> Vector {
        let mut ov = Vector::new(0.012, 0.0053, 0.00457);
        match self.largest_component() {
            Axis::X => ov.z = 1.0,
            Axis::Y => ov.x = 1.0,
            Axis::Z => ov.y = 1.0,
        }
        self.cross(&ov).normalize()
    }

    // cmp compares v and ov lexicographically by x, then y, then z.
    pub fn cmp(&self, ov: &Vector) -> Ordering {
        if self.x < ov.x {
            return Ordering::Less;
        }
        if self.x > ov.x {
            return Ordering::Greater;
        }
        if self.y < ov.y {
            return Ordering::Less;
        }
        if self.y > ov.y {
            return Ordering::Greater;
        }
        if self.z < ov.z {
            return Ordering::Less;
        }
        if self.z > ov.z {
            return Ordering::Greater;
        }
        Ordering::Equal
    }
}

impl Add for Vector {
    type Output = Vector;
    fn add(self, ov: Vector) -> Vector {
        Vector::new(self.x + ov.x, self.y + ov.y, self.z + ov.z)
    }
}

impl Sub for Vector {
    type Output = Vector;
    fn sub(self, ov: Vector) -> Vector {
        Vector::new(self.x - ov.x, self.y - ov.y, self.z - ov.z)
    }
}

impl Mul<f64> for Vector {
    type Output = Vector;
    fn mul(self, m: f64) -> Vector {
        Vector::new(self.x * m, self.y * m, self.z * m)
    }
}

impl Neg for Vector {
    type Output = Vector;
    fn neg(self) -> Vector {
        self * -1.0
    }
}

impl From<cgmath::Vector3<f64>> for Vector {
    fn from(v: cgmath::Vector3<f64>) -> Self {
        Vector::new(v.x, v.y, v.z)
    }
}

impl From<Vector> for cgmath::Vector3<f64> {
    fn from(v: Vector) -> Self {
        cgmath::Vector3::new(v.x, v.y, v.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_cross_is_orthogonal() {
        let a = Vector::new(1.0, 2.0, 3.0);
        let b = Vector::new(-4.0, 0.5, 2.0);
        let c = a.cross(&b);
        assert!(c.dot(&a).abs() < 1e-12);
        assert!(c.dot(&b).abs() < 1e-12);
        assert_eq!(b.cross(&a), -c);
    }

    #[test]
    fn test_normalize() {
        let v = Vector::new(3.0, 0.0, 4.0).normalize();
        assert!(v.is_unit());
        let want = Vector::new(0.6, 0.0, 0.8);
        assert!((v.x - want.x).abs() < 1e-15);
        assert!((v.y - want.y).abs() < 1e-15);
        assert!((v.z - want.z).abs() < 1e-15);
        assert_eq!(Vector::default().normalize(), Vector::default());
    }

    #[test]
    fn test_ortho() {
        let vectors = [
            Vector::new(1.0, 0.0, 0.0),
            Vector::new(0.0, 1.0, 0.0),
            Vector::new(0.0, 0.0, 1.0),
            Vector::new(1.0, 2.0, 3.0),
            Vector::new(-0.3, 0.7, -0.1),
        ];
        for v in vectors.iter() {
            let o = v.ortho();
            assert!(o.is_unit(), "ortho({:?}) is not unit length", v);
            assert!(o.dot(v).abs() < 1e-15, "ortho({:?}) is not orthogonal", v);
            assert_eq!((-*v).ortho(), -o);
        }
    }

    #[test]
    fn test_angle() {
        let x = Vector::new(1.0, 0.0, 0.0);
        let y = Vector::new(0.0, 1.0, 0.0);
        assert!((x.angle(&y) - PI / 2.0).abs() < 1e-15);
        assert!((x.angle(&-x) - PI).abs() < 1e-15);
        assert_eq!(x.angle(&x), 0.0);
    }

    #[test]
    fn test_cmp() {
        let a = Vector::new(1.0, 2.0, 3.0);
        assert_eq!(a.cmp(&a), Ordering::Equal);
        assert_eq!(a.cmp(&Vector::new(1.0, 2.0, 4.0)), Ordering::Less);
        assert_eq!(a.cmp(&Vector::new(0.0, 9.0, 9.0)), Ordering::Greater);
        assert_eq!(a.cmp(&Vector::new(1.0, 1.0, 9.0)), Ordering::Greater);
    }

    #[test]
    fn test_largest_component() {
        assert_eq!(Vector::new(-5.0, 1.0, 2.0).largest_component(), Axis::X);
        assert_eq!(Vector::new(0.0, -3.0, 2.0).largest_component(), Axis::Y);
        assert_eq!(Vector::new(1.0, 1.0, 1.0).largest_component(), Axis::Z);
    }
}
