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

use crate::s2::edge_crosser::EdgeCrosser;
use crate::s2::point::Point;

/// Edge represents a geodesic edge consisting of two vertices. Zero-length edges are
/// allowed, and can be used to represent points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub v0: Point,
    pub v1: Point,
}

/// ReferencePoint consists of a point and a boolean indicating whether the point
/// is contained by a particular shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferencePoint {
    pub point: Point,
    pub contained: bool,
}

impl ReferencePoint {
    /// Returns a ReferencePoint with the given value for contained and the
    /// origin point. It should be used when all points or no points are
    /// contained.
    pub fn origin(contained: bool) -> ReferencePoint {
        ReferencePoint {
            point: Point::origin(),
            contained,
        }
    }
}

/// Shape represents a collection of edges that optionally defines an interior.
/// Shapes are the unit of indexing in a ShapeIndex: every edge of every shape
/// is clipped to the index cells it may intersect.
pub trait Shape {
    /// Returns the number of edges in this shape.
    fn num_edges(&self) -> usize;

    /// Returns the edge for the given edge index.
    fn edge(&self, i: usize) -> Edge;

    /// Returns an arbitrary reference point for the shape. (The
    /// containment boolean value must be false for shapes that do not have an interior.)
    fn reference_point(&self) -> ReferencePoint;

    /// Returns the dimension of the geometry represented by this shape,
    /// either 0, 1 or 2 for point, polyline and polygon geometry.
    fn dimension(&self) -> i64;
}

/// Reports whether the given shape contains the point p by counting the edge
/// crossings along the segment from the shape's reference point to p. Shapes
/// without an interior never contain anything.
pub fn contains_brute_force(shape: &dyn Shape, p: &Point) -> bool {
    if shape.dimension() < 2 {
        return false;
    }

    let ref_point = shape.reference_point();
    if ref_point.point == *p {
        return ref_point.contained;
    }

    let mut crosser = EdgeCrosser::new(&ref_point.point, p);
    let mut inside = ref_point.contained;
    for e in 0..shape.num_edges() {
        let edge = shape.edge(e);
        inside = inside != crosser.edge_or_vertex_crossing(&edge.v0, &edge.v1);
    }
    inside
}
