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
use crate::s2::edge_distance::distance_from_segment;
use crate::s2::metric::AVG_EDGE_METRIC;
use crate::s2::point::Point;
use crate::s2::shape::{contains_brute_force, Edge, Shape};
use tracing::debug;

// cellSizeToLongEdgeRatio defines the cell size relative to the length of an
// edge at which it is first considered to be long. Long edges do not
// contribute toward the decision to subdivide a cell further. For example,
// a value of 2.0 means that the cell must be at least twice the size of the
// edge in order for that edge to be counted. There are two reasons for not
// counting long edges: (1) such edges typically need to be propagated to
// several children, which increases time and memory costs without much benefit,
// and (2) in pathological cases, many long edges close together could force
// subdivision to continue all the way to the leaf cell level.
pub const CELL_SIZE_TO_LONG_EDGE_RATIO: f64 = 1.0;

// Padding added to the bounding cap of every cell when deciding whether an
// edge may intersect it. This absorbs the error of distance_from_segment and
// of the cell vertex computations, so that an edge that touches a cell is
// never dropped from it.
const CELL_CAP_PADDING: f64 = 1e-10;

// CellRelation describes the possible relationships between a target cell
// and the cells of the ShapeIndex. If the target is an index cell or is
// contained by an index cell, it is Indexed. If the target is subdivided
// into one or more index cells, it is Subdivided. Otherwise it is Disjoint.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum CellRelation {
    Indexed,
    Subdivided,
    Disjoint,
}

/// ShapeIndexOptions holds the tunable parameters of a ShapeIndex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeIndexOptions {
    max_edges_per_cell: usize,
}

impl Default for ShapeIndexOptions {
    fn default() -> Self {
        ShapeIndexOptions {
            max_edges_per_cell: 10,
        }
    }
}

impl ShapeIndexOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// The maximum number of edges per cell. If a cell has more than this
    /// many edges that are not considered to be long relative to the cell
    /// size, then it is subdivided. Only edges that are shorter than the
    /// cell count toward the limit, so cells containing a few long edges
    /// and many short ones may exceed it.
    pub fn max_edges_per_cell(&self) -> usize {
        self.max_edges_per_cell
    }

    pub fn with_max_edges_per_cell(mut self, max_edges_per_cell: usize) -> Self {
        self.max_edges_per_cell = max_edges_per_cell;
        self
    }
}

// clippedShape represents the part of a shape that intersects a Cell.
// It consists of the set of edge IDs that intersect that cell and a boolean
// indicating whether the center of the cell is inside the shape (for shapes
// that have an interior).
//
// Note that the edges themselves are not clipped; we always use the original
// edges for intersection tests so that the results will be the same as the
// original shape.
#[derive(Debug, Clone)]
pub struct ClippedShape {
    // shapeID is the index of the shape this clipped shape is a part of.
    pub(crate) shape_id: usize,
    // containsCenter indicates if the center of the CellID this shape has been
    // clipped to falls inside this shape. This is false for shapes that do not
    // have an interior.
    pub(crate) contains_center: bool,

    // edges is the ordered set of ShapeIndex original edge IDs. Edges
    // are stored in increasing order of edge ID.
    pub(crate) edges: Vec<usize>,
}

impl ClippedShape {
    // new returns a new clipped shape for the given shapeID and number of expected edges.
    pub fn new(id: usize, num_edges: usize) -> ClippedShape {
        ClippedShape {
            shape_id: id,
            contains_center: false,
            edges: Vec::with_capacity(num_edges),
        }
    }

    pub fn shape_id(&self) -> usize {
        self.shape_id
    }

    pub fn contains_center(&self) -> bool {
        self.contains_center
    }

    // num_edges returns the number of edges that intersect the CellID of the Cell this was clipped to.
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Returns the id of the i-th edge clipped to this cell.
    pub fn edge(&self, i: usize) -> usize {
        self.edges[i]
    }

    pub fn edges(&self) -> &[usize] {
        &self.edges
    }

    // contains_edge reports if this clipped shape contains the given edge ID.
    pub fn contains_edge(&self, id: usize) -> bool {
        // Linear search is fast because the number of edges per shape is typically
        // very small (less than 10).
        self.edges.iter().any(|&e| e == id)
    }
}

// ShapeIndexCell stores the index contents for a particular CellID.
#[derive(Debug, Clone)]
pub struct ShapeIndexCell {
    pub(crate) shapes: Vec<ClippedShape>,
}

impl ShapeIndexCell {
    // new creates a new cell that is sized to hold the given number of shapes.
    pub fn new(num_shapes: usize) -> ShapeIndexCell {
        ShapeIndexCell {
            shapes: Vec::with_capacity(num_shapes),
        }
    }

    // num_edges reports the total number of edges in all clipped shapes in this cell.
    pub fn num_edges(&self) -> usize {
        self.shapes.iter().map(|cs| cs.num_edges()).sum()
    }

    pub fn num_clipped(&self) -> usize {
        self.shapes.len()
    }

    pub fn clipped(&self, i: usize) -> Option<&ClippedShape> {
        self.shapes.get(i)
    }

    // add adds the given clipped shape to this index cell. Shapes must be
    // added in increasing order of shape id.
    pub fn add(&mut self, c: ClippedShape) {
        self.shapes.push(c);
    }

    // find_by_shape_id returns the clipped shape that contains the given shapeID,
    // or None if none of the clipped shapes contain it.
    pub fn find_by_shape_id(&self, shape_id: usize) -> Option<&ClippedShape> {
        // Linear search is fine because the number of shapes per cell is typically
        // very small (most often 1), and is large only for pathological inputs
        // (e.g. very deeply nested loops).
        self.shapes
            .iter()
            .find(|clipped| clipped.shape_id == shape_id)
    }
}

// ShapeIndex indexes a set of Shapes, where a Shape is some collection of edges
// that optionally defines an interior. For Shapes that have interiors, the index
// makes it very fast to determine which Shape(s) contain a given point or region.
//
// The index is a sorted list of non-overlapping cells. Each cell stores the
// edges that may intersect it (a conservative superset) together with whether
// each shape contains the cell center. Cells that intersect no edges are only
// present when some shape contains them.
//
// The index does not keep the shapes themselves; edge ids stored in the cells
// refer back to the shapes it was built from, in the order they were given.
#[derive(Debug, Clone)]
pub struct ShapeIndex {
    options: ShapeIndexOptions,
    num_shapes: usize,
    num_edges: usize,

    // cell_ids and cells are parallel vectors sorted by CellID.
    cell_ids: Vec<CellID>,
    cells: Vec<ShapeIndexCell>,
}

impl ShapeIndex {
    /// Builds an index over the given shapes with the default options.
    pub fn new(shapes: &[&dyn Shape]) -> Self {
        Self::with_options(shapes, ShapeIndexOptions::default())
    }

    /// Builds an index over the given shapes. Shape ids are positions in the
    /// given slice.
    pub fn with_options(shapes: &[&dyn Shape], options: ShapeIndexOptions) -> Self {
        let mut all_edges = Vec::new();
        for (shape_id, shape) in shapes.iter().enumerate() {
            let has_interior = shape.dimension() == 2;
            for edge_id in 0..shape.num_edges() {
                let edge = shape.edge(edge_id);
                all_edges.push(CandidateEdge {
                    shape_id,
                    edge_id,
                    max_level: max_level_for_edge(&edge),
                    has_interior,
                    edge,
                });
            }
        }

        let mut builder = IndexBuilder {
            shapes,
            max_edges_per_cell: options.max_edges_per_cell,
            cell_ids: Vec::new(),
            cells: Vec::new(),
        };
        for face in 0..6 {
            builder.build_face(face, &all_edges);
        }

        debug!(
            shapes = shapes.len(),
            edges = all_edges.len(),
            cells = builder.cells.len(),
            "built shape index"
        );

        ShapeIndex {
            options,
            num_shapes: shapes.len(),
            num_edges: all_edges.len(),
            cell_ids: builder.cell_ids,
            cells: builder.cells,
        }
    }

    pub fn options(&self) -> &ShapeIndexOptions {
        &self.options
    }

    // num_shapes reports the number of Shapes in this index.
    pub fn num_shapes(&self) -> usize {
        self.num_shapes
    }

    // num_edges returns the number of edges in this index.
    pub fn num_edges(&self) -> usize {
        self.num_edges
    }

    pub fn num_cells(&self) -> usize {
        self.cells.len()
    }

    // is_empty reports whether this index has no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    // iterator returns an iterator for this index, positioned at the first cell.
    pub fn iterator(&self) -> ShapeIndexIterator<'_> {
        ShapeIndexIterator::new(self, Some(ShapeIndexIteratorPos::Begin))
    }

    // end returns an iterator positioned past the last cell in the index.
    pub fn end(&self) -> ShapeIndexIterator<'_> {
        ShapeIndexIterator::new(self, Some(ShapeIndexIteratorPos::End))
    }
}

// CandidateEdge is an edge being distributed over the cells of the index.
#[derive(Debug, Clone)]
struct CandidateEdge {
    shape_id: usize,
    edge_id: usize,
    // Not desirable to subdivide this edge beyond this level.
    max_level: u64,
    // Belongs to a shape that has a dimension of 2.
    has_interior: bool,
    edge: Edge,
}

// CellCap is a conservative bounding cap of a cell.
pub(crate) struct CellCap {
    center: Point,
    radius: f64,
}

impl CellCap {
    pub(crate) fn new(id: CellID) -> CellCap {
        let center = id.center_point();
        let radius = id
            .vertices()
            .iter()
            .map(|v| center.distance(v).rad())
            .fold(0.0, f64::max);
        CellCap {
            center,
            radius: radius + CELL_CAP_PADDING,
        }
    }

    // may_intersect reports whether the edge comes close enough to the cell
    // that it might intersect it.
    pub(crate) fn may_intersect(&self, edge: &Edge) -> bool {
        distance_from_segment(&self.center, &edge.v0, &edge.v1).rad() <= self.radius
    }
}

struct IndexBuilder<'s> {
    shapes: &'s [&'s dyn Shape],
    max_edges_per_cell: usize,
    cell_ids: Vec<CellID>,
    cells: Vec<ShapeIndexCell>,
}

impl<'s> IndexBuilder<'s> {
    fn build_face(&mut self, face: u8, all_edges: &[CandidateEdge]) {
        let id = CellID::from_face(face);
        let center = id.center_point();
        let contains: Vec<bool> = self
            .shapes
            .iter()
            .map(|shape| contains_brute_force(*shape, &center))
            .collect();
        let cap = CellCap::new(id);
        let edges: Vec<&CandidateEdge> = all_edges
            .iter()
            .filter(|e| cap.may_intersect(&e.edge))
            .collect();
        self.update_edges(id, &edges, &contains);
    }

    // update_edges adds the cells for the given edges under id. contains holds,
    // per shape, whether the shape contains the center of id. This function is
    // recursive with a maximum recursion depth of 30 (MAX_LEVEL).
    fn update_edges(&mut self, id: CellID, edges: &[&CandidateEdge], contains: &[bool]) {
        if edges.is_empty() && !contains.iter().any(|&c| c) {
            return;
        }

        // Count the number of edges that have not reached their maximum level yet.
        let level = id.level();
        let short_edges = edges.iter().filter(|e| e.max_level > level).count();
        if id.is_leaf() || short_edges <= self.max_edges_per_cell {
            self.make_index_cell(id, edges, contains);
            return;
        }

        // Move the focus from the center of this cell to the center of each
        // child, toggling containment for every edge crossed on the way. The
        // segment lies inside this cell so all the edges it can cross are in
        // the candidate set.
        let center = id.center_point();
        for child in id.children().iter() {
            let child_center = child.center_point();
            let mut child_contains = contains.to_vec();
            let mut crosser = EdgeCrosser::new(&center, &child_center);
            for e in edges.iter().filter(|e| e.has_interior) {
                if crosser.edge_or_vertex_crossing(&e.edge.v0, &e.edge.v1) {
                    child_contains[e.shape_id] = !child_contains[e.shape_id];
                }
            }

            let cap = CellCap::new(*child);
            let child_edges: Vec<&CandidateEdge> = edges
                .iter()
                .copied()
                .filter(|e| cap.may_intersect(&e.edge))
                .collect();
            self.update_edges(*child, &child_edges, &child_contains);
        }
    }

    // make_index_cell builds an index cell from the given edges and adds it
    // to the index. Cells are produced in increasing CellID order because
    // faces and children are visited in Hilbert curve order.
    fn make_index_cell(&mut self, id: CellID, edges: &[&CandidateEdge], contains: &[bool]) {
        let mut cell = ShapeIndexCell::new(self.shapes.len());
        for (shape_id, &contains_center) in contains.iter().enumerate() {
            let mut clipped = ClippedShape::new(shape_id, 0);
            clipped.contains_center = contains_center;
            clipped.edges.extend(
                edges
                    .iter()
                    .filter(|e| e.shape_id == shape_id)
                    .map(|e| e.edge_id),
            );
            if clipped.contains_center || !clipped.edges.is_empty() {
                cell.add(clipped);
            }
        }
        self.cell_ids.push(id);
        self.cells.push(cell);
    }
}

// max_level_for_edge reports the maximum level for a given edge.
fn max_level_for_edge(edge: &Edge) -> u64 {
    // Compute the maximum cell size for which this edge is considered long.
    // The calculation does not need to be perfectly accurate, so we use Norm
    // rather than Angle for speed.
    let cell_size = (edge.v0.0 - edge.v1.0).norm() * CELL_SIZE_TO_LONG_EDGE_RATIO;
    // Now return the first level encountered during subdivision where the
    // average cell size is at most cellSize.
    AVG_EDGE_METRIC.min_level(cell_size)
}

// ShapeIndexIteratorPos defines the set of possible iterator starting positions. By
// default iterators are unpositioned, since this avoids an extra seek in this
// situation where one of the seek methods (such as Locate) is immediately called.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeIndexIteratorPos {
    // Begin specifies the iterator should be positioned at the beginning of the index.
    Begin,
    // End specifies the iterator should be positioned at the end of the index.
    End,
}

// `[ShapeIndexIterator]` is an iterator that provides low-level access to
// the cells of the index. Cells are returned in increasing order of CellID.
//
//	let mut it = index.iterator();
//	while !it.done() {
//	    println!("{}", it.cell_id());
//	    it.next();
//	}
#[derive(Debug, Clone)]
pub struct ShapeIndexIterator<'a> {
    index: &'a ShapeIndex,
    position: usize,
    id: CellID,
    cell: Option<&'a ShapeIndexCell>,
}

impl<'a> ShapeIndexIterator<'a> {
    // new creates a new iterator for the given index. If a starting
    // position is specified, the iterator is positioned at the given spot.
    pub fn new(index: &'a ShapeIndex, pos: Option<ShapeIndexIteratorPos>) -> Self {
        let mut s = ShapeIndexIterator {
            index,
            position: 0,
            id: CellID::sentinel(),
            cell: None,
        };

        if let Some(pos) = pos {
            match pos {
                ShapeIndexIteratorPos::Begin => s.begin(),
                ShapeIndexIteratorPos::End => s.end(),
            }
        }

        s
    }

    // cell_id returns the CellID of the current index cell.
    // If done() is true, a value larger than any valid CellID is returned.
    pub fn cell_id(&self) -> CellID {
        self.id
    }

    // index_cell returns the current index cell.
    pub fn index_cell(&self) -> Option<&'a ShapeIndexCell> {
        self.cell
    }

    // center returns the Point at the center of the current position of the iterator.
    pub fn center(&self) -> Point {
        self.cell_id().center_point()
    }

    // begin positions the iterator at the beginning of the index.
    pub fn begin(&mut self) {
        self.position = 0;
        self.refresh();
    }

    // next positions the iterator at the next index cell.
    pub fn next(&mut self) {
        self.position += 1;
        self.refresh();
    }

    /// `[prev]` advances the iterator to the previous cell in the index and returns true to
    /// indicate it was not yet at the beginning of the index. If the iterator is at the
    /// first cell the call does nothing and returns false.
    pub fn prev(&mut self) -> bool {
        if self.position == 0 {
            return false;
        }

        self.position -= 1;
        self.refresh();
        true
    }

    // end positions the iterator at the end of the index.
    pub fn end(&mut self) {
        self.position = self.index.cells.len();
        self.refresh();
    }

    // done reports if the iterator is positioned at or after the last index cell.
    pub fn done(&self) -> bool {
        self.id == CellID::sentinel()
    }

    // refresh updates the stored internal iterator values.
    fn refresh(&mut self) {
        if self.position < self.index.cells.len() {
            self.id = self.index.cell_ids[self.position];
            self.cell = Some(&self.index.cells[self.position]);
        } else {
            self.position = self.index.cells.len();
            self.id = CellID::sentinel();
            self.cell = None;
        }
    }

    // seek positions the iterator at the first cell whose ID >= target, or at the
    // end of the index if no such cell exists.
    pub fn seek(&mut self, target: CellID) {
        self.position = self
            .index
            .cell_ids
            .binary_search(&target)
            .unwrap_or_else(|pos| pos);
        self.refresh();
    }

    // locate_point positions the iterator at the cell that contains the given Point.
    // If no such cell exists, the iterator position is unspecified, and false is returned.
    // The cell at the matched position is guaranteed to contain all edges that might
    // intersect the line segment between target and the cell's center.
    pub fn locate_point(&mut self, p: &Point) -> bool {
        // Let I = cellMap.LowerBound(T), where T is the leaf cell containing
        // point P. Then if T is contained by an index cell, then the
        // containing cell is either I or I'. We test for containment by comparing
        // the ranges of leaf cells spanned by T, I, and I'.
        let target = CellID::from(p);
        self.seek(target);
        if !self.done() && self.cell_id().range_min() <= target {
            return true;
        }

        if self.prev() && self.cell_id().range_max() >= target {
            return true;
        }
        false
    }

    // locate_cell_id attempts to position the iterator at the first matching index cell
    // in the index that has some relation to the given CellID. Let T be the target CellID.
    // If T is contained by (or equal to) some index cell I, then the iterator is positioned
    // at I and returns Indexed. Otherwise if T contains one or more (smaller) index cells,
    // then the iterator is positioned at the first such cell I and return Subdivided.
    // Otherwise Disjoint is returned and the iterator position is undefined.
    pub fn locate_cell_id(&mut self, target: CellID) -> CellRelation {
        // Let T be the target, let I = cellMap.LowerBound(T.RangeMin()), and
        // let I' be the predecessor of I. If T contains any index cells, then T
        // contains I. Similarly, if T is contained by an index cell, then the
        // containing cell is either I or I'. We test for containment by comparing
        // the ranges of leaf cells spanned by T, I, and I'.
        self.seek(target.range_min());
        if !self.done() {
            if self.cell_id() >= target && self.cell_id().range_min() <= target {
                return CellRelation::Indexed;
            }
            if self.cell_id() <= target.range_max() {
                return CellRelation::Subdivided;
            }
        }
        if self.prev() && self.cell_id().range_max() >= target {
            return CellRelation::Indexed;
        }
        CellRelation::Disjoint
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::s1::Angle;
    use crate::s2::r#loop::Loop;
    use cgmath::Deg;

    fn regular_loop(center: Point, radius_deg: f64, n: usize) -> Loop {
        Loop::regular_loop(center, Angle::from(Deg(radius_deg)), n)
    }

    fn build(l: &Loop, max_edges: usize) -> ShapeIndex {
        let options = ShapeIndexOptions::new().with_max_edges_per_cell(max_edges);
        ShapeIndex::with_options(&[l as &dyn Shape], options)
    }

    #[test]
    fn test_options_default() {
        let options = ShapeIndexOptions::default();
        assert_eq!(options.max_edges_per_cell(), 10);
        assert_eq!(options.with_max_edges_per_cell(3).max_edges_per_cell(), 3);
    }

    #[test]
    fn test_cells_sorted_and_disjoint() {
        let l = regular_loop(Point::from_coords(1.0, 2.0, 3.0), 20.0, 100);
        let index = build(&l, 4);
        assert_eq!(index.num_shapes(), 1);
        assert_eq!(index.num_edges(), 100);
        assert!(index.num_cells() > 6);

        let mut it = index.iterator();
        let mut prev: Option<CellID> = None;
        while !it.done() {
            let id = it.cell_id();
            assert!(id.is_valid(), "{}", id);
            if let Some(p) = prev {
                assert!(p.range_max() < id.range_min(), "{} overlaps {}", p, id);
            }
            let cell = it.index_cell().unwrap();
            assert_eq!(cell.num_clipped(), 1);
            prev = Some(id);
            it.next();
        }
    }

    #[test]
    fn test_every_edge_is_found_at_its_endpoints() {
        let l = regular_loop(Point::from_coords(-1.0, 0.5, 0.2), 5.0, 64);
        let index = build(&l, 2);
        for e in 0..l.num_edges() {
            let edge = l.edge(e);
            for v in [edge.v0, edge.v1].iter() {
                let mut it = index.iterator();
                assert!(it.locate_point(v));
                let clipped = it.index_cell().unwrap().find_by_shape_id(0).unwrap();
                assert!(clipped.contains_edge(e), "edge {} missing from {}", e, it.cell_id());
            }
        }
    }

    #[test]
    fn test_contains_center_matches_brute_force() {
        let l = regular_loop(Point::from_coords(0.3, -0.2, 1.0), 40.0, 150);
        let index = build(&l, 3);
        let mut it = index.iterator();
        while !it.done() {
            let clipped = it.index_cell().unwrap().clipped(0).unwrap();
            assert_eq!(
                clipped.contains_center(),
                contains_brute_force(&l, &it.center()),
                "cell {}",
                it.cell_id()
            );
            it.next();
        }
    }

    #[test]
    fn test_empty_and_full() {
        let empty = Loop::empty();
        let index = ShapeIndex::new(&[&empty as &dyn Shape]);
        assert!(index.is_empty());
        assert!(index.iterator().done());

        let full = Loop::full();
        let index = ShapeIndex::new(&[&full as &dyn Shape]);
        assert_eq!(index.num_cells(), 6);
        let mut it = index.iterator();
        for face in 0..6 {
            assert_eq!(it.cell_id(), CellID::from_face(face));
            let clipped = it.index_cell().unwrap().clipped(0).unwrap();
            assert!(clipped.contains_center());
            assert_eq!(clipped.num_edges(), 0);
            it.next();
        }
        assert!(it.done());
    }

    #[test]
    fn test_locate_cell_id() {
        // A small loop on face 0 leaves the opposite face empty.
        let l = regular_loop(Point::from_coords(1.0, 0.1, 0.1), 1.0, 40);
        let index = build(&l, 2);

        let mut it = index.iterator();
        let first = it.cell_id();
        assert_eq!(first.face(), 0);
        assert_eq!(it.locate_cell_id(first), CellRelation::Indexed);
        assert_eq!(it.cell_id(), first);
        if !first.is_leaf() {
            assert_eq!(it.locate_cell_id(first.children()[3]), CellRelation::Indexed);
            assert_eq!(it.cell_id(), first);
        }
        assert_eq!(it.locate_cell_id(CellID::from_face(0)), CellRelation::Subdivided);
        assert_eq!(it.locate_cell_id(CellID::from_face(3)), CellRelation::Disjoint);
    }

    #[test]
    fn test_iterator_prev_and_end() {
        let l = regular_loop(Point::from_coords(0.0, 0.0, 1.0), 10.0, 20);
        let index = build(&l, 10);
        let mut it = index.end();
        assert!(it.done());
        assert!(it.prev());
        assert_eq!(it.cell_id(), *index.cell_ids.last().unwrap());

        let mut it = index.iterator();
        assert!(!it.prev());
        assert_eq!(it.cell_id(), index.cell_ids[0]);
    }
}
