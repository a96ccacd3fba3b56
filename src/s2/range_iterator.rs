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
use crate::s2::shape_index::{ClippedShape, ShapeIndex, ShapeIndexCell, ShapeIndexIterator};

/// RangeIterator is a wrapper over ShapeIndexIterator with extra methods
/// that are useful for merging the contents of two or more ShapeIndexes.
/// Besides the current cell it exposes the range of leaf cells that the
/// cell spans, so that two iterators can be advanced past each other.
#[derive(Debug, Clone)]
pub struct RangeIterator<'a> {
    it: ShapeIndexIterator<'a>,
    // The min and max leaf cell ids covered by the current cell. If done()
    // is true, these methods return a value larger than any valid cell id.
    range_min: CellID,
    range_max: CellID,
}

impl<'a> RangeIterator<'a> {
    /// Returns a new RangeIterator positioned at the first cell of the index.
    pub fn new(index: &'a ShapeIndex) -> Self {
        let mut r = RangeIterator {
            it: index.iterator(),
            range_min: CellID::sentinel(),
            range_max: CellID::sentinel(),
        };
        r.refresh();
        r
    }

    pub fn cell_id(&self) -> CellID {
        self.it.cell_id()
    }

    pub fn index_cell(&self) -> Option<&'a ShapeIndexCell> {
        self.it.index_cell()
    }

    /// Returns the first clipped shape of the current cell. Loops are
    /// indexed on their own, so this is the loop's clipped shape.
    pub fn clipped(&self) -> Option<&'a ClippedShape> {
        self.it.index_cell().and_then(|cell| cell.clipped(0))
    }

    /// Returns the number of edges of the clipped shape in the current cell.
    pub fn num_edges(&self) -> usize {
        self.clipped().map_or(0, |c| c.num_edges())
    }

    /// Reports whether the clipped shape contains the current cell's center.
    pub fn contains_center(&self) -> bool {
        self.clipped().map_or(false, |c| c.contains_center())
    }

    pub fn range_min(&self) -> CellID {
        self.range_min
    }

    pub fn range_max(&self) -> CellID {
        self.range_max
    }

    pub fn done(&self) -> bool {
        self.it.done()
    }

    pub fn next(&mut self) {
        self.it.next();
        self.refresh();
    }

    /// Positions the iterator at the first cell that overlaps or follows
    /// target, i.e. such that range_max() >= target.range_min().
    pub fn seek_to(&mut self, target: &RangeIterator<'_>) {
        self.it.seek(target.range_min);
        // If the current cell does not overlap target, it is possible that the
        // previous cell is the one we are looking for. This can only happen when
        // the previous cell contains target but has a smaller CellID.
        if self.it.done() || self.it.cell_id().range_min() > target.range_max {
            if self.it.prev() && self.it.cell_id().range_max() < target.cell_id() {
                self.it.next();
            }
        }
        self.refresh();
    }

    /// Positions the iterator at the first cell that follows target, i.e.
    /// the first cell such that range_min() > target.range_max().
    pub fn seek_beyond(&mut self, target: &RangeIterator<'_>) {
        self.it.seek(target.range_max.next());
        if !self.it.done() && self.it.cell_id().range_min() <= target.range_max {
            self.it.next();
        }
        self.refresh();
    }

    // refresh updates the iterator's min and max values.
    fn refresh(&mut self) {
        let id = self.it.cell_id();
        if self.it.done() {
            self.range_min = CellID::sentinel();
            self.range_max = CellID::sentinel();
        } else {
            self.range_min = id.range_min();
            self.range_max = id.range_max();
        }
    }
}
