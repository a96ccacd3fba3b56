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

use crate::s2::point::Point;
use crate::s2::stuv::{face_uv_to_xyz, siti_to_st, st_to_uv, uv_to_st, xyz_to_face_uv};
use lazy_static::lazy_static;
use std::fmt;

pub const FACE_BITS: u64 = 3;
pub const NUM_FACES: u8 = 6;
pub const MAX_LEVEL: u64 = 30;
// POS_BITS is the number of bits used for the Hilbert position within a face.
pub const POS_BITS: u64 = 2 * MAX_LEVEL + 1;
// MAX_SIZE is the number of leaf cells along one edge of a face.
pub const MAX_SIZE: u32 = 1 << MAX_LEVEL;

const SWAP_MASK: u8 = 0x01;
const INVERT_MASK: u8 = 0x02;

// LOOKUP_BITS is the number of i/j bits translated per table lookup.
const LOOKUP_BITS: u32 = 4;

// POS_TO_IJ maps a Hilbert position and orientation to the (i,j) child
// quadrant, encoded as 2*i + j.
const POS_TO_IJ: [[u8; 4]; 4] = [[0, 1, 3, 2], [0, 2, 3, 1], [3, 2, 0, 1], [3, 1, 0, 2]];

// POS_TO_ORIENTATION is the orientation modifier of each child position.
const POS_TO_ORIENTATION: [u8; 4] = [SWAP_MASK, 0, 0, INVERT_MASK | SWAP_MASK];

lazy_static! {
    // LOOKUP_TABLES.0 maps "iiiijjjjoo" to "ppppppppoo"; LOOKUP_TABLES.1 is
    // the inverse mapping.
    static ref LOOKUP_TABLES: (Vec<u32>, Vec<u32>) = {
        let size = 1 << (2 * LOOKUP_BITS + 2);
        let mut lookup_pos = vec![0u32; size];
        let mut lookup_ij = vec![0u32; size];
        for &o in [0, SWAP_MASK, INVERT_MASK, SWAP_MASK | INVERT_MASK].iter() {
            init_lookup_cell(0, 0, 0, o, 0, o, &mut lookup_pos, &mut lookup_ij);
        }
        (lookup_pos, lookup_ij)
    };
}

#[allow(clippy::too_many_arguments)]
fn init_lookup_cell(
    level: u32,
    i: u32,
    j: u32,
    orig_orientation: u8,
    pos: u32,
    orientation: u8,
    lookup_pos: &mut [u32],
    lookup_ij: &mut [u32],
) {
    if level == LOOKUP_BITS {
        let ij = (i << LOOKUP_BITS) + j;
        lookup_pos[((ij << 2) + orig_orientation as u32) as usize] = (pos << 2) + orientation as u32;
        lookup_ij[((pos << 2) + orig_orientation as u32) as usize] = (ij << 2) + orientation as u32;
        return;
    }

    let r = POS_TO_IJ[orientation as usize];
    for (child, &quadrant) in r.iter().enumerate() {
        init_lookup_cell(
            level + 1,
            (i << 1) + (quadrant >> 1) as u32,
            (j << 1) + (quadrant & 1) as u32,
            orig_orientation,
            (pos << 2) + child as u32,
            orientation ^ POS_TO_ORIENTATION[child],
            lookup_pos,
            lookup_ij,
        );
    }
}

/// CellID uniquely identifies a cell in the S2 cell decomposition.
/// The most significant 3 bits encode the face number (0-5). The
/// remaining 61 bits encode the position of the center of this cell
/// along the Hilbert curve on that face. The zero value and the value
/// (1<<64)-1 are invalid cell IDs. The first compares less than any
/// valid cell ID, the second as greater than any valid cell ID.
///
/// Sequentially increasing cell IDs follow a continuous space-filling
/// curve over the entire sphere, and a cell's descendants occupy the
/// contiguous interval [range_min, range_max] of that curve.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellID(pub u64);

// lsb_for_level returns the lowest-numbered bit that is on for cells at
// the given level.
pub fn lsb_for_level(level: u64) -> u64 {
    1 << (2 * (MAX_LEVEL - level))
}

// st_to_ij converts an s- or t-value to the leaf cell coordinate
// containing it, clamped to the valid range.
fn st_to_ij(s: f64) -> u32 {
    let ij = (MAX_SIZE as f64 * s).floor();
    if ij < 0.0 {
        0
    } else if ij >= (MAX_SIZE - 1) as f64 {
        MAX_SIZE - 1
    } else {
        ij as u32
    }
}

impl CellID {
    /// Returns the cell id one past the last valid cell, used to mark the
    /// end of an iteration.
    pub const fn sentinel() -> CellID {
        CellID(u64::MAX)
    }

    pub fn from_face(face: u8) -> CellID {
        CellID(((face as u64) << POS_BITS) + lsb_for_level(0))
    }

    /// Returns the leaf cell containing the given (face, i, j) coordinates.
    pub fn from_face_ij(face: u8, i: u32, j: u32) -> CellID {
        let (lookup_pos, _) = &*LOOKUP_TABLES;
        // This value gets shifted one bit to the left at the end.
        let mut n = (face as u64) << (POS_BITS - 1);
        // Alternating faces have opposite Hilbert curve orientations, so
        // that every face has a right-handed coordinate system.
        let mut bits = (face & SWAP_MASK) as u32;
        let mask = (1u32 << LOOKUP_BITS) - 1;

        // Each iteration maps 4 bits of i and j into 8 bits of the Hilbert
        // curve position.
        for k in (0..8).rev() {
            bits += ((i >> (k * LOOKUP_BITS)) & mask) << (LOOKUP_BITS + 2);
            bits += ((j >> (k * LOOKUP_BITS)) & mask) << 2;
            bits = lookup_pos[bits as usize];
            n |= ((bits >> 2) as u64) << (k * 2 * LOOKUP_BITS);
            bits &= (SWAP_MASK | INVERT_MASK) as u32;
        }
        CellID(n * 2 + 1)
    }

    pub fn face(&self) -> u8 {
        (self.0 >> POS_BITS) as u8
    }

    pub fn pos(&self) -> u64 {
        self.0 & (u64::MAX >> FACE_BITS)
    }

    pub fn is_valid(&self) -> bool {
        self.face() < NUM_FACES && (self.lsb() & 0x1555555555555555) != 0
    }

    pub fn is_leaf(&self) -> bool {
        self.0 & 1 != 0
    }

    pub fn level(&self) -> u64 {
        MAX_LEVEL - (self.0.trailing_zeros() as u64 >> 1)
    }

    /// Returns the least significant bit that is set.
    pub fn lsb(&self) -> u64 {
        self.0 & self.0.wrapping_neg()
    }

    pub fn range_min(&self) -> CellID {
        CellID(self.0 - (self.lsb() - 1))
    }

    pub fn range_max(&self) -> CellID {
        CellID(self.0.wrapping_add(self.lsb() - 1))
    }

    /// Reports whether this cell contains the other cell.
    pub fn contains(&self, other: &CellID) -> bool {
        self.range_min() <= *other && *other <= self.range_max()
    }

    pub fn intersects(&self, other: &CellID) -> bool {
        other.range_min() <= self.range_max() && other.range_max() >= self.range_min()
    }

    /// Returns the next cell along the Hilbert curve at the same level.
    pub fn next(&self) -> CellID {
        CellID(self.0.wrapping_add(self.lsb() << 1))
    }

    /// Returns the ancestor of this cell at the given level, which must be no
    /// greater than the cell's own level.
    pub fn parent(&self, level: u64) -> CellID {
        let lsb = lsb_for_level(level);
        CellID((self.0 & lsb.wrapping_neg()) | lsb)
    }

    pub fn immediate_parent(&self) -> CellID {
        let nlsb = self.lsb() << 2;
        CellID((self.0 & nlsb.wrapping_neg()) | nlsb)
    }

    /// Returns the four immediate children of this cell, in Hilbert order.
    /// The cell must not be a leaf.
    pub fn children(&self) -> [CellID; 4] {
        let mut lsb = self.lsb();
        let first = self.0 - lsb + (lsb >> 2);
        lsb >>= 1;
        [
            CellID(first),
            CellID(first + lsb),
            CellID(first + 2 * lsb),
            CellID(first + 3 * lsb),
        ]
    }

    /// Returns the (face, i, j, orientation) of the leaf cell at this cell's
    /// center-most position along the curve. For non-leaf cells only the
    /// high bits of i and j identify the cell.
    pub fn face_ij_orientation(&self) -> (u8, u32, u32, u8) {
        let (_, lookup_ij) = &*LOOKUP_TABLES;
        let f = self.face();
        let mut orientation = (f & SWAP_MASK) as u32;
        let mut i = 0u32;
        let mut j = 0u32;
        let mut nbits = MAX_LEVEL as u32 - 7 * LOOKUP_BITS;

        // Each iteration maps 8 bits of the Hilbert curve position into 4
        // bits of i and j. The first iteration clears out the face bits.
        for k in (0..8).rev() {
            let chunk = (self.0 >> (k * 2 * LOOKUP_BITS + 1)) as u32 & ((1u32 << (2 * nbits)) - 1);
            orientation += chunk << 2;
            orientation = lookup_ij[orientation as usize];
            i += (orientation >> (LOOKUP_BITS + 2)) << (k * LOOKUP_BITS);
            j += ((orientation >> 2) & ((1 << LOOKUP_BITS) - 1)) << (k * LOOKUP_BITS);
            orientation &= (SWAP_MASK | INVERT_MASK) as u32;
            nbits = LOOKUP_BITS;
        }

        // The trailing "10*" suffix of a non-leaf position flips the swap bit
        // once for every "00" pair it contains.
        if self.lsb() & 0x1111111111111110 != 0 {
            orientation ^= SWAP_MASK as u32;
        }
        (f, i, j, orientation as u8)
    }

    // si_ti_bounds returns the face and the cell's bounds in (si,ti) space,
    // where leaf coordinates are scaled by 2 so that centers are integral.
    fn face_siti_bounds(&self) -> (u8, [u64; 2], [u64; 2]) {
        let (face, i, j, _) = self.face_ij_orientation();
        let size = 1u64 << (MAX_LEVEL - self.level());
        let i_lo = i as u64 & !(size - 1);
        let j_lo = j as u64 & !(size - 1);
        (
            face,
            [2 * i_lo, 2 * (i_lo + size)],
            [2 * j_lo, 2 * (j_lo + size)],
        )
    }

    /// Returns the center of the cell on the sphere.
    pub fn center_point(&self) -> Point {
        let (face, si, ti) = self.face_siti_bounds();
        let u = st_to_uv(siti_to_st((si[0] + si[1]) / 2));
        let v = st_to_uv(siti_to_st((ti[0] + ti[1]) / 2));
        Point(face_uv_to_xyz(face, u, v).normalize())
    }

    /// Returns the four corners of the cell in CCW order.
    pub fn vertices(&self) -> [Point; 4] {
        let (face, si, ti) = self.face_siti_bounds();
        let u = [st_to_uv(siti_to_st(si[0])), st_to_uv(siti_to_st(si[1]))];
        let v = [st_to_uv(siti_to_st(ti[0])), st_to_uv(siti_to_st(ti[1]))];
        let corner = |a: f64, b: f64| Point(face_uv_to_xyz(face, a, b).normalize());
        [
            corner(u[0], v[0]),
            corner(u[1], v[0]),
            corner(u[1], v[1]),
            corner(u[0], v[1]),
        ]
    }
}

impl From<&Point> for CellID {
    /// Returns the leaf cell containing the given point.
    fn from(p: &Point) -> Self {
        let (f, u, v) = xyz_to_face_uv(&p.0);
        CellID::from_face_ij(f, st_to_ij(uv_to_st(u)), st_to_ij(uv_to_st(v)))
    }
}

impl fmt::Debug for CellID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CellID({})", self)
    }
}

impl fmt::Display for CellID {
    // Formats the cell as its face followed by one digit (0-3) per level.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_valid() {
            return write!(f, "Invalid: {:016x}", self.0);
        }
        write!(f, "{}/", self.face())?;
        for level in 1..=self.level() {
            let digit = (self.0 >> (2 * (MAX_LEVEL - level) + 1)) & 3;
            write!(f, "{}", digit)?;
        }
        Ok(())
    }
}
