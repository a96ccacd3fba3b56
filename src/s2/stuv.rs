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

// Conversions between the (x,y,z), (face,u,v) and (face,s,t) coordinate
// systems. Each cube face is projected with the quadratic transform, which
// keeps cell areas within a factor of about 2.1 of each other.

use crate::r3::vector::{Axis, Vector};

// MAX_SITI is the maximum value of an si- or ti-coordinate.
// It is one shift more than the maximum cell size (1 << 30).
pub const MAX_SITI: u64 = 1 << 31;

// face returns the face ID from 0 to 5 containing r. For points on the
// boundary between faces, the result is arbitrary but deterministic.
pub fn face(r: &Vector) -> u8 {
    match r.largest_component() {
        Axis::X if r.x < 0.0 => 3,
        Axis::X => 0,
        Axis::Y if r.y < 0.0 => 4,
        Axis::Y => 1,
        Axis::Z if r.z < 0.0 => 5,
        Axis::Z => 2,
    }
}

// valid_face_xyz_to_uv returns the (u,v) coordinates of r on the given
// face. The point must project onto that face.
pub fn valid_face_xyz_to_uv(face: u8, r: &Vector) -> (f64, f64) {
    match face {
        0 => (r.y / r.x, r.z / r.x),
        1 => (-r.x / r.y, r.z / r.y),
        2 => (-r.x / r.z, -r.y / r.z),
        3 => (r.z / r.x, r.y / r.x),
        4 => (r.z / r.y, -r.x / r.y),
        _ => (-r.y / r.z, -r.x / r.z),
    }
}

// xyz_to_face_uv converts a direction vector to its face and (u,v)
// coordinates on that face.
pub fn xyz_to_face_uv(r: &Vector) -> (u8, f64, f64) {
    let f = face(r);
    let (u, v) = valid_face_xyz_to_uv(f, r);
    (f, u, v)
}

// face_uv_to_xyz turns face and UV coordinates into an unnormalized vector.
pub fn face_uv_to_xyz(face: u8, u: f64, v: f64) -> Vector {
    match face {
        0 => Vector::new(1.0, u, v),
        1 => Vector::new(-u, 1.0, v),
        2 => Vector::new(-u, -v, 1.0),
        3 => Vector::new(-1.0, -v, -u),
        4 => Vector::new(v, -1.0, -u),
        _ => Vector::new(v, u, -1.0),
    }
}

// st_to_uv converts an s or t value to the corresponding u or v value.
pub fn st_to_uv(s: f64) -> f64 {
    if s >= 0.5 {
        (1.0 / 3.0) * (4.0 * s * s - 1.0)
    } else {
        (1.0 / 3.0) * (1.0 - 4.0 * (1.0 - s) * (1.0 - s))
    }
}

// uv_to_st is the inverse of st_to_uv.
pub fn uv_to_st(u: f64) -> f64 {
    if u >= 0.0 {
        0.5 * (1.0 + 3.0 * u).sqrt()
    } else {
        1.0 - 0.5 * (1.0 - 3.0 * u).sqrt()
    }
}

// siti_to_st converts an si- or ti-value to the corresponding s- or t-value.
pub fn siti_to_st(si: u64) -> f64 {
    if si > MAX_SITI {
        return 1.0;
    }
    si as f64 / MAX_SITI as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_st_uv_inverse() {
        for i in 0..=100 {
            let s = i as f64 / 100.0;
            assert!((uv_to_st(st_to_uv(s)) - s).abs() < 1e-15, "s = {}", s);
        }
        assert_eq!(st_to_uv(0.5), 0.0);
        assert_eq!(st_to_uv(1.0), 1.0);
        assert_eq!(st_to_uv(0.0), -1.0);
    }

    #[test]
    fn test_face_uv_round_trip() {
        for f in 0..6u8 {
            let center = face_uv_to_xyz(f, 0.0, 0.0);
            assert_eq!(face(&center), f);
            let p = face_uv_to_xyz(f, 0.25, -0.5);
            let (g, u, v) = xyz_to_face_uv(&p);
            assert_eq!(g, f);
            assert!((u - 0.25).abs() < 1e-15);
            assert!((v + 0.5).abs() < 1e-15);
        }
    }

    #[test]
    fn test_siti_to_st() {
        assert_eq!(siti_to_st(0), 0.0);
        assert_eq!(siti_to_st(MAX_SITI / 2), 0.5);
        assert_eq!(siti_to_st(MAX_SITI), 1.0);
    }
}
