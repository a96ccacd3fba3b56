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
use crate::s2::crossing_edge_query::CrossingEdgeQuery;
use crate::s2::edge_crosser::EdgeCrosser;
use crate::s2::edge_crossings::Crossing;
use crate::s2::loop_relations::{CrossingTarget, LoopRelation};
use crate::s2::r#loop::Loop;
use crate::s2::range_iterator::RangeIterator;
use crate::s2::shape_index::{ClippedShape, ShapeIndexCell};
use std::mem;
use tracing::trace;

// The minimum number of B edges under an A cell for which it becomes cheaper
// to look up the B cells crossed by each A edge than to test every pair.
const EDGE_QUERY_MIN_EDGES: usize = 20;

/// LoopCrosser is a helper for has_crossing_relation. It checks all edges of
/// loop A for intersection against all edges of loop B, for one fixed
/// orientation of the pair. If swapped is true, the loops A and B have been
/// swapped relative to the relation, which affects how the crossing targets
/// and the shared-vertex wedges are presented to it.
pub struct LoopCrosser<'a> {
    a: &'a Loop,
    b: &'a Loop,
    swapped: bool,
    a_crossing_target: CrossingTarget,
    b_crossing_target: CrossingTarget,

    // state maintained by start_edge and edge_crosses_cell.
    crosser: EdgeCrosser,
    aj: usize,
    bj_prev: Option<usize>,

    // temporary data declared here to avoid repeated memory allocations.
    b_query: CrossingEdgeQuery<'a>,
    b_cells: Vec<&'a ShapeIndexCell>,
}

impl<'a> LoopCrosser<'a> {
    pub fn new<R: LoopRelation>(a: &'a Loop, b: &'a Loop, relation: &R, swapped: bool) -> Self {
        let mut a_crossing_target = relation.a_crossing_target();
        let mut b_crossing_target = relation.b_crossing_target();
        if swapped {
            mem::swap(&mut a_crossing_target, &mut b_crossing_target);
        }

        LoopCrosser {
            a,
            b,
            swapped,
            a_crossing_target,
            b_crossing_target,
            crosser: EdgeCrosser::new(&a.vertex(0), &a.vertex(1)),
            aj: 0,
            bj_prev: None,
            b_query: CrossingEdgeQuery::new(b.index()),
            b_cells: Vec::new(),
        }
    }

    // start_edge sets the crosser's state for checking the given edge of loop A.
    fn start_edge(&mut self, aj: usize) {
        self.crosser.init(&self.a.vertex(aj), &self.a.vertex(aj + 1));
        self.aj = aj;
        self.bj_prev = None;
    }

    // edge_crosses_cell reports whether the current edge of loop A has any
    // crossings with edges of the index cell of loop B.
    fn edge_crosses_cell<R: LoopRelation>(&mut self, b_clipped: &ClippedShape, relation: &mut R) -> bool {
        // Test the current edge of A against all edges of b_clipped.
        for &bj in b_clipped.edges() {
            // Note that the edges are processed in increasing order of edge id,
            // so we can restart the crosser only at the start of each run.
            if self.bj_prev.map_or(true, |prev| bj != prev + 1) {
                self.crosser.restart_at(&self.b.vertex(bj));
            }
            self.bj_prev = Some(bj);

            match self.crosser.chain_crossing_sign(&self.b.vertex(bj + 1)) {
                Crossing::DoNotCross => continue,
                Crossing::Cross => {
                    trace!(aj = self.aj, bj, swapped = self.swapped, "edges cross");
                    return true;
                }
                Crossing::Maybe => {}
            }

            // We only need to check each shared vertex once, so we only
            // consider the case where a.vertex(aj+1) == b.vertex(bj+1).
            if self.a.vertex(self.aj + 1) == self.b.vertex(bj + 1) {
                let crossed = if self.swapped {
                    relation.wedges_cross(
                        &self.b.vertex(bj),
                        &self.b.vertex(bj + 1),
                        &self.b.vertex(bj + 2),
                        &self.a.vertex(self.aj),
                        &self.a.vertex(self.aj + 2),
                    )
                } else {
                    relation.wedges_cross(
                        &self.a.vertex(self.aj),
                        &self.a.vertex(self.aj + 1),
                        &self.a.vertex(self.aj + 2),
                        &self.b.vertex(bj),
                        &self.b.vertex(bj + 2),
                    )
                };
                if crossed {
                    trace!(aj = self.aj, bj, swapped = self.swapped, "wedges cross at shared vertex");
                    return true;
                }
            }
        }
        false
    }

    // cell_crosses_cell reports whether there are any edge crossings or wedge
    // crossings within the two given cells.
    fn cell_crosses_cell<R: LoopRelation>(
        &mut self,
        a_clipped: &ClippedShape,
        b_clipped: &ClippedShape,
        relation: &mut R,
    ) -> bool {
        // Test all edges of a_clipped against all edges of b_clipped.
        for &aj in a_clipped.edges() {
            self.start_edge(aj);
            if self.edge_crosses_cell(b_clipped, relation) {
                return true;
            }
        }
        false
    }

    // cell_crosses_any_subcell reports whether given an index cell of A, there
    // are any edge or wedge crossings with any index cell of B contained within
    // b_id.
    fn cell_crosses_any_subcell<R: LoopRelation>(
        &mut self,
        a_clipped: &ClippedShape,
        b_id: CellID,
        relation: &mut R,
    ) -> bool {
        // Test all edges of a_clipped against all edges of B. The relevant B
        // edges are guaranteed to be children of b_id, which lets us find the
        // correct index cells more efficiently.
        for &aj in a_clipped.edges() {
            // Use a CrossingEdgeQuery starting at b_id to find the index cells
            // of B that might contain crossing edges.
            let cells = self
                .b_query
                .get_cells(&self.a.vertex(aj), &self.a.vertex(aj + 1), b_id);
            if cells.is_empty() {
                continue;
            }
            self.start_edge(aj);
            for cell in cells {
                if let Some(b_clipped) = cell.clipped(0) {
                    if self.edge_crosses_cell(b_clipped, relation) {
                        return true;
                    }
                }
            }
        }
        false
    }

    // has_crossing reports whether given two iterators positioned such that
    // ai.cell_id().contains(bi.cell_id()), there is an edge crossing or a wedge
    // crossing anywhere within ai.cell_id(). This function advances bi only
    // past ai.cell_id().
    fn has_crossing<R: LoopRelation>(
        &mut self,
        ai: &RangeIterator<'a>,
        bi: &mut RangeIterator<'a>,
        relation: &mut R,
    ) -> bool {
        let a_clipped = match ai.clipped() {
            Some(c) => c,
            None => return false,
        };

        // If ai.cell_id() intersects many edges of B, then it is faster to use
        // CrossingEdgeQuery to narrow down the candidates. But if it
        // intersects only a few edges, it is faster to check all the crossings
        // directly. We handle this by advancing bi and keeping track of how
        // many edges we would need to test.
        let mut total_edges = 0;
        self.b_cells.clear();
        loop {
            let num_edges = bi.num_edges();
            if num_edges > 0 {
                total_edges += num_edges;
                if total_edges >= EDGE_QUERY_MIN_EDGES {
                    // There are too many edges to test them directly, so use
                    // CrossingEdgeQuery.
                    trace!(cell = %ai.cell_id(), total_edges, "switching to subcell query");
                    if self.cell_crosses_any_subcell(a_clipped, ai.cell_id(), relation) {
                        return true;
                    }
                    bi.seek_beyond(ai);
                    return false;
                }
                if let Some(cell) = bi.index_cell() {
                    self.b_cells.push(cell);
                }
            }
            bi.next();
            if bi.cell_id() > ai.range_max() {
                break;
            }
        }

        // Test all the edge crossings directly.
        for k in 0..self.b_cells.len() {
            let b_cell = self.b_cells[k];
            if let Some(b_clipped) = b_cell.clipped(0) {
                if self.cell_crosses_cell(a_clipped, b_clipped, relation) {
                    return true;
                }
            }
        }
        false
    }

    /// Reports whether, given two iterators positioned such that
    /// ai.range_min() <= bi.range_min() <= ai.range_max(), there is a crossing
    /// relationship anywhere within ai.cell_id(). Specifically, this method
    /// returns true if there is an edge crossing, a wedge crossing, or a point
    /// P that matches both crossing targets. This function advances both
    /// iterators past ai.cell_id().
    pub fn has_crossing_relation<R: LoopRelation>(
        &mut self,
        ai: &mut RangeIterator<'a>,
        bi: &mut RangeIterator<'a>,
        relation: &mut R,
    ) -> bool {
        if ai.num_edges() == 0 {
            if self.a_crossing_target.matches(ai.contains_center()) {
                // All points within ai.cell_id() satisfy the crossing target for A, so it's
                // worth iterating through the cells of B to see whether any cell
                // centers also satisfy the crossing target for B.
                loop {
                    if self.b_crossing_target.matches(bi.contains_center()) {
                        trace!(cell = %bi.cell_id(), "cell center satisfies both crossing targets");
                        return true;
                    }
                    bi.next();
                    if bi.cell_id() > ai.range_max() {
                        break;
                    }
                }
            } else {
                // The crossing target for A is not satisfied, so we skip over
                // these cells of B.
                bi.seek_beyond(ai);
            }
        } else {
            // The current cell of A has at least one edge, so check for crossings.
            if self.has_crossing(ai, bi, relation) {
                return true;
            }
        }
        ai.next();
        false
    }
}

/// Reports whether the loops A and B have a crossing relationship for the
/// given relation. It checks all edges of loop A for intersection against all
/// edges of loop B and reports if there are any that satisfy the given
/// relation. If there is any shared vertex, the wedges centered at this vertex
/// are tested to see if they satisfy the relation.
///
/// If the two loop boundaries cross, this method is guaranteed to return true.
/// It also returns true in certain cases if the loop relationship is equivalent
/// to crossing. For example, if the relation is Contains and a point P is found
/// such that B contains P but A does not contain P, this method will return true
/// to indicate that the result is the same as though a pair of crossing edges
/// were found (since Contains returns false in both cases).
pub fn has_crossing_relation<R: LoopRelation>(a: &Loop, b: &Loop, relation: &mut R) -> bool {
    // We look for CellID ranges where the indexes of A and B overlap, and
    // then test those edges for crossings.
    let mut ai = RangeIterator::new(a.index());
    let mut bi = RangeIterator::new(b.index());

    let mut ab = LoopCrosser::new(a, b, relation, false);
    let mut ba = LoopCrosser::new(b, a, relation, true);

    while !ai.done() || !bi.done() {
        if ai.range_max() < bi.range_min() {
            // The A and B cells don't overlap, and A precedes B.
            ai.seek_to(&bi);
        } else if bi.range_max() < ai.range_min() {
            // The A and B cells don't overlap, and B precedes A.
            bi.seek_to(&ai);
        } else {
            // One cell contains the other. Determine which cell is larger.
            let a_lsb = ai.cell_id().lsb();
            let b_lsb = bi.cell_id().lsb();
            if a_lsb > b_lsb {
                // A's index cell is larger.
                if ab.has_crossing_relation(&mut ai, &mut bi, relation) {
                    return true;
                }
            } else if a_lsb < b_lsb {
                // B's index cell is larger.
                if ba.has_crossing_relation(&mut bi, &mut ai, relation) {
                    return true;
                }
            } else {
                // The A and B cells are the same. Since the two cells
                // have the same center point P, check whether P satisfies
                // the crossing targets.
                if relation.a_crossing_target().matches(ai.contains_center())
                    && relation.b_crossing_target().matches(bi.contains_center())
                {
                    trace!(cell = %ai.cell_id(), "shared cell center satisfies both crossing targets");
                    return true;
                }
                // Otherwise test all the edge crossings directly.
                if let (Some(a_clipped), Some(b_clipped)) = (ai.clipped(), bi.clipped()) {
                    if a_clipped.num_edges() > 0
                        && b_clipped.num_edges() > 0
                        && ab.cell_crosses_cell(a_clipped, b_clipped, relation)
                    {
                        return true;
                    }
                }
                ai.next();
                bi.next();
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::s1::Angle;
    use crate::s2::edge_crossings::crossing_sign;
    use crate::s2::loop_relations::{CompareBoundaryRelation, ContainsRelation, IntersectsRelation};
    use crate::s2::point::Point;
    use crate::s2::shape::Shape;
    use cgmath::Deg;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn regular_loop(center: Point, radius_deg: f64, n: usize) -> Loop {
        Loop::regular_loop(center, Angle::from(Deg(radius_deg)), n)
    }

    fn brute_force_boundaries_cross(a: &Loop, b: &Loop) -> bool {
        (0..a.num_edges()).any(|i| {
            let ea = a.edge(i);
            (0..b.num_edges()).any(|j| {
                let eb = b.edge(j);
                crossing_sign(&ea.v0, &ea.v1, &eb.v0, &eb.v1) == Crossing::Cross
            })
        })
    }

    #[test]
    fn test_compare_boundary_relation_finds_exactly_the_crossings() {
        // With DontCare targets and no shared vertices the merge reports true
        // exactly when some pair of edges crosses.
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..40 {
            let ca = Point::from_coords(1.0, 0.2, 0.3);
            let cb = Point::from_coords(
                1.0,
                0.2 + rng.gen_range(-0.4..0.4),
                0.3 + rng.gen_range(-0.4..0.4),
            );
            let a = regular_loop(ca, rng.gen_range(2.0..15.0), rng.gen_range(3..120));
            let b = regular_loop(cb, rng.gen_range(2.0..15.0), rng.gen_range(3..120));

            let want = brute_force_boundaries_cross(&a, &b);
            let mut relation = CompareBoundaryRelation::new(false);
            assert_eq!(has_crossing_relation(&a, &b, &mut relation), want);
            assert!(!relation.found_shared_vertex());
            let mut relation = CompareBoundaryRelation::new(false);
            assert_eq!(has_crossing_relation(&b, &a, &mut relation), want);
        }
    }

    #[test]
    fn test_subcell_query_path() {
        // A four-edge loop is indexed with a handful of large cells, each of
        // which covers many cells of the detailed loop.
        let center = Point::from_coords(0.0, 0.0, 1.0);
        let coarse = regular_loop(center, 20.0, 4);
        let fine = regular_loop(center, 13.0, 300);
        assert!(!brute_force_boundaries_cross(&coarse, &fine));

        let mut relation = CompareBoundaryRelation::new(false);
        assert!(!has_crossing_relation(&coarse, &fine, &mut relation));
        let mut relation = ContainsRelation::new();
        assert!(!has_crossing_relation(&coarse, &fine, &mut relation));

        // The fine loop pokes out of the coarse loop's edges.
        let fine = regular_loop(center, 16.0, 300);
        assert!(brute_force_boundaries_cross(&coarse, &fine));
        let mut relation = CompareBoundaryRelation::new(false);
        assert!(has_crossing_relation(&coarse, &fine, &mut relation));
        let mut relation = CompareBoundaryRelation::new(false);
        assert!(has_crossing_relation(&fine, &coarse, &mut relation));
    }

    #[test]
    fn test_cell_center_targets() {
        // Nested loops without crossings. Every cell of the inner loop lies
        // inside the outer loop, so Intersects finds a point inside both and
        // Contains(inner, outer) finds a point of outer outside inner.
        let center = Point::from_coords(0.3, -0.4, 1.0);
        let outer = regular_loop(center, 10.0, 100);
        let inner = regular_loop(center, 2.0, 60);

        let mut relation = IntersectsRelation::new();
        assert!(has_crossing_relation(&outer, &inner, &mut relation));

        let mut relation = ContainsRelation::new();
        assert!(!has_crossing_relation(&outer, &inner, &mut relation));
        assert!(!relation.found_shared_vertex());

        let mut relation = ContainsRelation::new();
        assert!(has_crossing_relation(&inner, &outer, &mut relation));
    }

    #[test]
    fn test_shared_vertices_reach_the_relation() {
        // Every other vertex of a convex loop spans a loop nested inside it
        // that touches it at the shared vertices.
        let outer = regular_loop(Point::from_coords(-1.0, 0.5, 0.5), 10.0, 80);
        let inner = Loop::from_points((0..80).step_by(2).map(|i| outer.vertex(i)).collect());

        let mut relation = ContainsRelation::new();
        assert!(!has_crossing_relation(&outer, &inner, &mut relation));
        assert!(relation.found_shared_vertex());

        let mut relation = CompareBoundaryRelation::new(false);
        assert!(!has_crossing_relation(&outer, &inner, &mut relation));
        assert!(relation.found_shared_vertex());
        assert!(relation.contains_edge());
        assert!(!relation.excludes_edge());

        let mut relation = ContainsRelation::new();
        assert!(has_crossing_relation(&inner, &outer, &mut relation));
    }
}
