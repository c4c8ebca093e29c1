//! Boundaries with the two host shells.

pub mod embedded;
pub mod link;
pub mod options;
pub mod query;

pub use embedded::{EmbeddedVisualization, QueryMetadata};
pub use options::build_options;
pub use query::{Detached, LookerApi, QueryDefinition, QueryExecutor};
