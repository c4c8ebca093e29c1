//! The graph handed from the transformer to the layout.

use serde::Serialize;

/// Which end of an edge a node was seen on. Roles namespace node ids, so the
/// same raw value as source and as target yields two nodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
	/// Seen in the `from` field.
	Source,
	/// Seen in the `to` field.
	Target,
}

impl Role {
	/// Id prefix for nodes of this role.
	pub fn prefix(self) -> &'static str {
		match self {
			Role::Source => "source_",
			Role::Target => "target_",
		}
	}

	/// Node id for a raw endpoint value.
	pub fn node_id(self, raw: &str) -> String {
		format!("{}{}", self.prefix(), raw)
	}
}

/// One distinct endpoint value of one role.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GraphNode {
	/// Role-prefixed raw value; unique within a model.
	pub id: String,
	/// Which end of its edges this node sits on.
	pub role: Role,
	/// Hover text. `None` when a label field is configured but the row lacks it.
	pub title: Option<String>,
	/// Permanent on-canvas label, only when the role's show flag is set.
	pub label: Option<String>,
	/// Colour group, if the role is grouped.
	pub group: Option<String>,
}

/// One row, as a directed edge.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GraphLink {
	/// Id of the source node.
	pub source: String,
	/// Id of the target node.
	pub target: String,
	/// Numeric weight, when the row has one.
	pub weight: Option<f64>,
}

/// Nodes and edges ready to hand to a layout engine.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct GraphModel {
	/// Source-role nodes, then target-role nodes.
	pub nodes: Vec<GraphNode>,
	/// One per input row, in row order.
	pub links: Vec<GraphLink>,
}

impl GraphModel {
	/// No nodes and no links.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty() && self.links.is_empty()
	}

	/// Look a node up by id.
	pub fn node(&self, id: &str) -> Option<&GraphNode> {
		self.nodes.iter().find(|n| n.id == id)
	}

	/// Smallest and largest edge weight, if any edge carries one.
	pub fn weight_range(&self) -> Option<(f64, f64)> {
		self.links
			.iter()
			.filter_map(|l| l.weight)
			.fold(None, |range, w| match range {
				None => Some((w, w)),
				Some((lo, hi)) => Some((lo.min(w), hi.max(w))),
			})
	}
}
