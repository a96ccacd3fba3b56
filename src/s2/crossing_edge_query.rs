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

use crate::s2::cellid::CellID;
use crate::s2::edge_crosser::EdgeCrosser;
use crate::s2::edge_crossings::Crossing;
use crate::s2::point::Point;
use crate::s2::shape::{Edge, Shape};
use crate::s2::shape_index::{CellCap, CellRelation, ShapeIndex, ShapeIndexCell, ShapeIndexIterator};

/// CrossingType specifies the types of edge crossings to be reported.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum CrossingType {
    /// CrossingTypeInterior specifies that only edges whose interiors
    /// cross should be reported.
    Interior,

    /// CrossingTypeAll specifies that all pairs of crossing edges should
    /// be reported, even if the crossing is at a shared vertex.
    All,
}

/// CrossingEdgeQuery is used to find the Edge IDs of Shapes that are crossed by
/// a given edge(s).
///
/// Note that if you need to query many edges, it is more efficient to declare
/// a single CrossingEdgeQuery instance and reuse it.
pub struct CrossingEdgeQuery<'a> {
    index: &'a ShapeIndex,
    iter: ShapeIndexIterator<'a>,

    // Candidate cells generated when finding crossings.
    cells: Vec<&'a ShapeIndexCell>,
}

impl<'a> CrossingEdgeQuery<'a> {
    /// Creates a new CrossingEdgeQuery for the given index.
    pub fn new(index: &'a ShapeIndex) -> Self {
        CrossingEdgeQuery {
            index,
            iter: index.iterator(),
            cells: Vec::new(),
        }
    }

    pub fn index(&self) -> &'a ShapeIndex {
        self.index
    }

    /// Returns the set of edges of the shape S that intersect the given edge AB.
    /// If the CrossingType is Interior, then only intersections at a point interior to both
    /// edges are reported, while if it is CrossingTypeAll then edges that share a vertex
    /// are also reported. shape_id is the id of the shape within the index.
    pub fn crossings(
        &mut self,
        a: &Point,
        b: &Point,
        shape: &dyn Shape,
        shape_id: usize,
        cross_type: CrossingType,
    ) -> Vec<usize> {
        let mut edges = self.candidates(a, b, shape, shape_id);
        if edges.is_empty() {
            return edges;
        }

        let mut crosser = EdgeCrosser::new(a, b);
        edges.retain(|&e| {
            let edge = shape.edge(e);
            match crosser.crossing_sign(&edge.v0, &edge.v1) {
                Crossing::Cross => true,
                Crossing::Maybe => cross_type == CrossingType::All,
                Crossing::DoNotCross => false,
            }
        });
        edges
    }

    /// Returns a superset of the edges of the given shape that intersect
    /// the edge AB, sorted by edge id.
    pub fn candidates(&mut self, a: &Point, b: &Point, shape: &dyn Shape, shape_id: usize) -> Vec<usize> {
        // For small loops it is faster to use brute force. The threshold below was
        // determined using benchmarks.
        const MAX_BRUTE_FORCE_EDGES: usize = 27;
        let max_edges = shape.num_edges();
        if max_edges <= MAX_BRUTE_FORCE_EDGES {
            return (0..max_edges).collect();
        }

        // Compute the set of index cells intersected by the query edge.
        self.get_cells_for_edge(a, b);
        if self.cells.is_empty() {
            return Vec::new();
        }

        // Gather all the edges that intersect those cells and sort them.
        let mut edges = Vec::new();
        for cell in &self.cells {
            if let Some(clipped) = cell.find_by_shape_id(shape_id) {
                edges.extend_from_slice(clipped.edges());
            }
        }

        if self.cells.len() > 1 {
            edges.sort_unstable();
            edges.dedup();
        }

        edges
    }

    /// Returns the index cells that are descendants of root (or equal to it)
    /// and that may be intersected by the edge AB.
    pub fn get_cells(&mut self, a: &Point, b: &Point, root: CellID) -> Vec<&'a ShapeIndexCell> {
        self.cells.clear();
        let edge = Edge { v0: *a, v1: *b };
        self.visit_cells(&edge, root);
        self.cells.clone()
    }

    // get_cells_for_edge populates the cells field with the index cells
    // that may intersect the edge AB.
    fn get_cells_for_edge(&mut self, a: &Point, b: &Point) {
        self.cells.clear();
        let edge = Edge { v0: *a, v1: *b };
        for face in 0..6 {
            self.visit_cells(&edge, CellID::from_face(face));
        }
    }

    // visit_cells adds the index cells below id that the edge may intersect.
    // Cells whose bounding cap is missed by the edge are pruned together
    // with their descendants.
    fn visit_cells(&mut self, edge: &Edge, id: CellID) {
        if !CellCap::new(id).may_intersect(edge) {
            return;
        }
        match self.iter.locate_cell_id(id) {
            CellRelation::Disjoint => {}
            CellRelation::Indexed => {
                if let Some(cell) = self.iter.index_cell() {
                    self.cells.push(cell);
                }
            }
            CellRelation::Subdivided => {
                for child in id.children().iter() {
                    self.visit_cells(edge, *child);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::s1::Angle;
    use crate::s2::edge_crossings::crossing_sign;
    use crate::s2::r#loop::Loop;
    use crate::s2::shape_index::ShapeIndexOptions;
    use cgmath::Deg;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_point(rng: &mut StdRng) -> Point {
        Point::from_coords(
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
        )
    }

    fn brute_force_crossings(l: &Loop, a: &Point, b: &Point, cross_type: CrossingType) -> Vec<usize> {
        (0..l.num_edges())
            .filter(|&e| {
                let edge = l.edge(e);
                match crossing_sign(a, b, &edge.v0, &edge.v1) {
                    Crossing::Cross => true,
                    Crossing::Maybe => cross_type == CrossingType::All,
                    Crossing::DoNotCross => false,
                }
            })
            .collect()
    }

    #[test]
    fn test_crossings_match_brute_force() {
        let center = Point::from_coords(1.0, -1.0, 0.5);
        let l = Loop::regular_loop(center, Angle::from(Deg(30.0)), 200);
        let options = ShapeIndexOptions::new().with_max_edges_per_cell(4);
        let index = ShapeIndex::with_options(&[&l as &dyn Shape], options);
        let mut query = CrossingEdgeQuery::new(&index);

        let mut rng = StdRng::seed_from_u64(7);
        for i in 0..200 {
            // Mix long random edges with short ones near the loop boundary.
            let a = if i % 2 == 0 {
                random_point(&mut rng)
            } else {
                l.vertex(rng.gen_range(0..200))
            };
            let b = Point::from_coords(
                a.0.x + rng.gen_range(-0.3..0.3),
                a.0.y + rng.gen_range(-0.3..0.3),
                a.0.z + rng.gen_range(-0.3..0.3),
            );
            for &cross_type in [CrossingType::Interior, CrossingType::All].iter() {
                assert_eq!(
                    query.crossings(&a, &b, &l, 0, cross_type),
                    brute_force_crossings(&l, &a, &b, cross_type),
                    "edge {:?} -> {:?}, {:?}",
                    a,
                    b,
                    cross_type
                );
            }
        }
    }

    #[test]
    fn test_small_shapes_use_every_edge() {
        let l = Loop::regular_loop(Point::from_coords(0.0, 0.0, 1.0), Angle::from(Deg(10.0)), 8);
        let index = ShapeIndex::new(&[&l as &dyn Shape]);
        let mut query = CrossingEdgeQuery::new(&index);
        let a = Point::from_coords(1.0, 0.0, 0.0);
        let b = Point::from_coords(0.0, 1.0, 0.0);
        assert_eq!(query.candidates(&a, &b, &l, 0), (0..8).collect::<Vec<_>>());
        assert!(query.crossings(&a, &b, &l, 0, CrossingType::All).is_empty());
    }

    #[test]
    fn test_get_cells_stays_under_root() {
        let l = Loop::regular_loop(Point::from_coords(0.2, 0.1, 1.0), Angle::from(Deg(20.0)), 100);
        let options = ShapeIndexOptions::new().with_max_edges_per_cell(2);
        let index = ShapeIndex::with_options(&[&l as &dyn Shape], options);
        let mut query = CrossingEdgeQuery::new(&index);

        // An edge crossing the loop boundary.
        let a = Point::from_coords(0.2, 0.1, 1.0);
        let b = Point::from_coords(0.9, 0.1, 1.0);
        let root = CellID::from(&a).parent(1);
        let cells = query.get_cells(&a, &b, root);
        assert!(!cells.is_empty());

        // Every returned cell lies under root.
        let mut it = index.iterator();
        for cell in cells {
            while !it.done() && !std::ptr::eq(it.index_cell().unwrap(), cell) {
                it.next();
            }
            assert!(!it.done());
            assert!(root.contains(&it.cell_id()));
        }
    }
}
