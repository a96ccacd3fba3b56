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

//! Robust relations between simple polygons ("loops") on the unit sphere.
//!
//! The entry points are [`r#loop::Loop::contains`], [`r#loop::Loop::intersects`]
//! and [`r#loop::Loop::compare_boundary`]. They walk the spatial indexes of both
//! loops in cell order and only test edge pairs whose cells overlap.

pub mod consts;
pub mod r3;
pub mod s1;
pub mod s2;

pub use crate::s2::*;
