use indexmap::IndexMap;
use log::info;

use super::mapping::{FieldMapping, GroupBy, RoleFields};
use super::model::{GraphLink, GraphModel, GraphNode, Role};
use super::row::{FieldAccess, Row, scalar_number, scalar_text};
use crate::error::GraphError;

/// Turn result rows into a graph: one edge per row, one node per distinct
/// endpoint value and role.
///
/// When several rows share an endpoint value the node takes its title, label
/// and group from the last of them. Nodes come out source role first, each
/// role in first-seen order.
pub fn build_graph(rows: &[Row], mapping: &FieldMapping) -> Result<GraphModel, GraphError> {
	if !mapping.has_endpoints() {
		info!("graph needs both 'from' and 'to' fields; nothing to draw");
		return Err(GraphError::MissingEndpoints);
	}

	let mut by_source: IndexMap<String, &Row> = IndexMap::new();
	let mut by_target: IndexMap<String, &Row> = IndexMap::new();
	let mut links = Vec::with_capacity(rows.len());

	for row in rows {
		let from = endpoint(row, &mapping.from);
		let to = endpoint(row, &mapping.to);

		links.push(GraphLink {
			source: Role::Source.node_id(&from),
			target: Role::Target.node_id(&to),
			weight: row
				.optional(mapping.weight.as_deref())
				.and_then(scalar_number),
		});
		// insert keeps the first-seen position but replaces the row
		by_source.insert(from, row);
		by_target.insert(to, row);
	}

	let nodes = nodes_for(Role::Source, &by_source, mapping)
		.chain(nodes_for(Role::Target, &by_target, mapping))
		.collect();

	Ok(GraphModel { nodes, links })
}

fn endpoint(row: &Row, field: &str) -> String {
	row.field(field)
		.map(scalar_text)
		.unwrap_or_else(|_| scalar_text(&serde_json::Value::Null))
}

fn nodes_for<'a>(
	role: Role,
	rows: &'a IndexMap<String, &'a Row>,
	mapping: &'a FieldMapping,
) -> impl Iterator<Item = GraphNode> + 'a {
	let fields = mapping.role(role);
	rows.iter().map(move |(raw, row)| node(role, raw, row, fields))
}

fn node(role: Role, raw: &str, row: &Row, fields: RoleFields<'_>) -> GraphNode {
	let title = match fields.label {
		Some(label) => row.field(label).ok().map(scalar_text),
		None => Some(raw.to_owned()),
	};
	let group = match fields.group {
		GroupBy::None => None,
		GroupBy::Itself => Some(fields.key.to_owned()),
		GroupBy::Field(field) => row.field(field).ok().map(scalar_text),
	};

	GraphNode {
		id: role.node_id(raw),
		role,
		label: title.clone().filter(|_| fields.show_label),
		title,
		group,
	}
}

#[cfg(test)]
mod tests {
	use serde_json::{Value, json};

	use super::*;

	fn rows(value: Value) -> Vec<Row> {
		serde_json::from_value(value).unwrap()
	}

	fn ids(model: &GraphModel) -> Vec<&str> {
		model.nodes.iter().map(|n| n.id.as_str()).collect()
	}

	#[test]
	fn one_edge_per_row_with_prefixed_ids() {
		let data = rows(json!([
			{ "a": "x", "b": "y" },
			{ "a": "x", "b": "y" },
			{ "a": "z", "b": "x" },
		]));
		let model = build_graph(&data, &FieldMapping::new("a", "b")).unwrap();

		assert_eq!(model.links.len(), 3);
		assert_eq!(model.links[0].source, "source_x");
		assert_eq!(model.links[0].target, "target_y");
		assert_eq!(model.links[2].source, "source_z");
		assert_eq!(model.links[2].target, "target_x");
		assert_eq!(ids(&model), ["source_x", "source_z", "target_y", "target_x"]);
	}

	#[test]
	fn missing_endpoints_regardless_of_rows() {
		let data = rows(json!([{ "a": 1 }]));
		assert_eq!(
			build_graph(&data, &FieldMapping::new("", "a")),
			Err(GraphError::MissingEndpoints)
		);
		assert_eq!(
			build_graph(&[], &FieldMapping::new("a", "")),
			Err(GraphError::MissingEndpoints)
		);
	}

	#[test]
	fn no_rows_builds_empty_graph() {
		let model = build_graph(&[], &FieldMapping::new("a", "b")).unwrap();
		assert!(model.is_empty());
	}

	#[test]
	fn last_row_wins_for_node_attributes() {
		let data = rows(json!([
			{ "a": "x", "b": "y", "name": "first", "kind": "k1" },
			{ "a": "x", "b": "w", "name": "second", "kind": "k2" },
		]));
		let mut mapping = FieldMapping::new("a", "b");
		mapping.from_label = Some("name".into());
		mapping.from_group = GroupBy::Field("kind".into());

		let model = build_graph(&data, &mapping).unwrap();
		let node = model.node("source_x").unwrap();
		assert_eq!(node.title.as_deref(), Some("second"));
		assert_eq!(node.group.as_deref(), Some("k2"));
		assert_eq!(node.label, None);
	}

	#[test]
	fn reinserted_key_keeps_first_seen_position() {
		let data = rows(json!([
			{ "a": "p", "b": "1" },
			{ "a": "q", "b": "1" },
			{ "a": "p", "b": "1" },
		]));
		let model = build_graph(&data, &FieldMapping::new("a", "b")).unwrap();
		assert_eq!(ids(&model), ["source_p", "source_q", "target_1"]);
	}

	#[test]
	fn same_value_in_both_roles_stays_two_nodes() {
		let data = rows(json!([
			{ "a": "X", "b": "Y" },
			{ "a": "Y", "b": "X" },
		]));
		let model = build_graph(&data, &FieldMapping::new("a", "b")).unwrap();
		assert!(model.node("source_X").is_some());
		assert!(model.node("target_X").is_some());
		assert_eq!(model.nodes.len(), 4);
	}

	#[test]
	fn self_grouping_uses_the_field_key() {
		let data = rows(json!([
			{ "a": "x", "b": "y" },
			{ "a": "z", "b": "y" },
		]));
		let mut mapping = FieldMapping::new("a", "b");
		mapping.from_group = GroupBy::Itself;

		let model = build_graph(&data, &mapping).unwrap();
		let groups: Vec<_> = model
			.nodes
			.iter()
			.filter(|n| n.role == Role::Source)
			.map(|n| n.group.as_deref())
			.collect();
		assert_eq!(groups, [Some("a"), Some("a")]);
		assert_eq!(model.node("target_y").unwrap().group, None);
	}

	#[test]
	fn titles_labels_and_weights() {
		let data = rows(json!([
			{ "a": { "value": 1 }, "b": { "value": 2 }, "to_name": { "value": "Two" }, "w": { "value": 3.5 } },
			{ "a": { "value": 1 }, "b": { "value": 3 }, "w": { "value": "n/a" } },
		]));
		let mut mapping = FieldMapping::new("a", "b");
		mapping.to_label = Some("to_name".into());
		mapping.to_label_show = true;
		mapping.from_label_show = true;
		mapping.weight = Some("w".into());

		let model = build_graph(&data, &mapping).unwrap();

		let source = model.node("source_1").unwrap();
		assert_eq!(source.title.as_deref(), Some("1"));
		assert_eq!(source.label.as_deref(), Some("1"));

		let two = model.node("target_2").unwrap();
		assert_eq!(two.title.as_deref(), Some("Two"));
		assert_eq!(two.label.as_deref(), Some("Two"));

		// label field missing from the row: attribute omitted
		let three = model.node("target_3").unwrap();
		assert_eq!(three.title, None);
		assert_eq!(three.label, None);

		assert_eq!(model.links[0].weight, Some(3.5));
		assert_eq!(model.links[1].weight, None);
	}

	#[test]
	fn non_finite_weights_are_dropped() {
		let data = rows(json!([
			{ "a": "p", "b": "q", "w": "inf" },
			{ "a": "p", "b": "r", "w": 1 },
			{ "a": "p", "b": "s", "w": 5 },
			{ "a": "p", "b": "t", "w": "NaN" },
		]));
		let mut mapping = FieldMapping::new("a", "b");
		mapping.weight = Some("w".into());

		let model = build_graph(&data, &mapping).unwrap();
		let weights: Vec<_> = model.links.iter().map(|l| l.weight).collect();
		assert_eq!(weights, [None, Some(1.0), Some(5.0), None]);
		assert_eq!(model.weight_range(), Some((1.0, 5.0)));
	}

	#[test]
	fn identical_inputs_build_identical_graphs() {
		let data = rows(json!([
			{ "a": "x", "b": "y", "g": "1" },
			{ "a": "y", "b": "z", "g": "2" },
			{ "a": "x", "b": "z", "g": "3" },
		]));
		let mut mapping = FieldMapping::new("a", "b");
		mapping.to_group = GroupBy::Field("g".into());

		assert_eq!(
			build_graph(&data, &mapping).unwrap(),
			build_graph(&data, &mapping).unwrap()
		);
	}
}
