pub mod network_graph;
pub mod progress;
pub mod results_link;
