pub mod stuv;

pub mod cellid;
pub mod metric;
pub mod point;
pub mod predicates;

pub mod edge_crosser;
pub mod edge_crossings;
pub mod edge_distance;
pub mod wedge_relations;

pub mod error;
pub mod shape;
pub mod shape_index;

pub mod crossing_edge_query;
pub mod range_iterator;

pub mod loop_crosser;
pub mod loop_relations;
pub mod r#loop;

#[cfg(test)]
mod test_util;
