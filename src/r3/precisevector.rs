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

use crate::r3::vector::Vector;
use bigdecimal::num_bigint::{BigInt, Sign};
use bigdecimal::BigDecimal;

/// PreciseVector is a vector in ℝ³ whose components are exact decimals.
///
/// Every f64 is a dyadic rational and therefore has a finite decimal
/// expansion, so conversions into a PreciseVector lose nothing and the
/// products and sums computed on it are exact.
#[derive(Debug, Clone, PartialEq)]
pub struct PreciseVector {
    pub x: BigDecimal,
    pub y: BigDecimal,
    pub z: BigDecimal,
}

/// Returns the exact decimal value of f.
pub fn precise_f64(f: f64) -> BigDecimal {
    let bits = f.to_bits();
    let negative = bits >> 63 != 0;
    let biased = ((bits >> 52) & 0x7ff) as i64;
    let fraction = bits & ((1u64 << 52) - 1);

    // f == mantissa * 2^exp
    let (mantissa, exp) = if biased == 0 {
        (fraction, -1074)
    } else {
        (fraction | (1u64 << 52), biased - 1075)
    };
    let mut digits = BigInt::from(mantissa);
    if negative {
        digits = -digits;
    }
    if exp >= 0 {
        BigDecimal::new(digits << exp as usize, 0)
    } else {
        // m * 2^-k == m * 5^k / 10^k
        let k = -exp;
        BigDecimal::new(digits * BigInt::from(5).pow(k as u32), k)
    }
}

impl PreciseVector {
    pub fn from_vector(v: &Vector) -> Self {
        PreciseVector {
            x: precise_f64(v.x),
            y: precise_f64(v.y),
            z: precise_f64(v.z),
        }
    }

    pub fn dot(&self, ov: &PreciseVector) -> BigDecimal {
        &(&self.x * &ov.x) + &(&(&self.y * &ov.y) + &(&self.z * &ov.z))
    }

    pub fn cross(&self, ov: &PreciseVector) -> PreciseVector {
        PreciseVector {
            x: &(&self.y * &ov.z) - &(&self.z * &ov.y),
            y: &(&self.z * &ov.x) - &(&self.x * &ov.z),
            z: &(&self.x * &ov.y) - &(&self.y * &ov.x),
        }
    }

    pub fn is_zero(&self) -> bool {
        self.x.sign() == Sign::NoSign
            && self.y.sign() == Sign::NoSign
            && self.z.sign() == Sign::NoSign
    }
}

/// Returns -1, 0 or +1 according to the sign of d.
pub fn sign_of(d: &BigDecimal) -> i32 {
    match d.sign() {
        Sign::Minus => -1,
        Sign::NoSign => 0,
        Sign::Plus => 1,
    }
}
