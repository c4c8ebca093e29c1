//! Row-to-graph transformation.

pub mod mapping;
pub mod model;
pub mod row;
mod transform;

pub use mapping::{FieldMapping, GROUP_BY_ITSELF, GroupBy};
pub use model::{GraphLink, GraphModel, GraphNode, Role};
pub use row::{FieldAccess, FieldValue, Row};
pub use transform::build_graph;
