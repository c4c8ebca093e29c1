//! Configuration panel options, derived from the fields of the current query.

use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::embedded::{QueryField, QueryFields};
use crate::graph::GROUP_BY_ITSELF;

/// Value type of an option.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
	/// Free text or a select value.
	String,
	/// Checkbox.
	Boolean,
}

/// One selectable entry, serialised as `{"<label>": "<value>"}`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionValue {
	/// Text shown in the select.
	pub label: String,
	/// Value stored in the config.
	pub value: String,
}

impl OptionValue {
	fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
		Self {
			label: label.into(),
			value: value.into(),
		}
	}
}

impl Serialize for OptionValue {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		let mut map = serializer.serialize_map(Some(1))?;
		map.serialize_entry(&self.label, &self.value)?;
		map.end()
	}
}

/// Default of an option, typed to match it.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OptionDefault {
	/// Default for string options.
	Text(String),
	/// Default for boolean options.
	Flag(bool),
}

/// One configuration panel entry.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OptionSpec {
	/// Panel tab.
	pub section: &'static str,
	/// Position within the tab.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub order: Option<u32>,
	/// Must be set before the chart can draw.
	#[serde(skip_serializing_if = "std::ops::Not::not")]
	pub required: bool,
	/// Caption.
	pub label: &'static str,
	/// Value type.
	#[serde(rename = "type")]
	pub kind: OptionType,
	/// Widget, when not the type default.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub display: Option<&'static str>,
	/// Choices for a select, in display order.
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub values: Vec<OptionValue>,
	/// Initial value.
	pub default: OptionDefault,
}

/// Option key to spec, in panel order.
pub type OptionSchema = IndexMap<&'static str, OptionSpec>;

const MAIN: &str = "Main";
const ADVANCED: &str = "_Advanced";

/// Build the panel schema. Call again whenever the field set changes.
pub fn build_options(fields: &QueryFields) -> OptionSchema {
	let dimensions = || fields.dimensions.iter().map(choice);
	let none = || OptionValue::new("--", "");
	let field_select = || std::iter::once(none()).chain(dimensions()).collect::<Vec<_>>();
	let group_select = || {
		[
			OptionValue::new("No grouping", ""),
			OptionValue::new("Itself", GROUP_BY_ITSELF),
		]
		.into_iter()
		.chain(dimensions())
		.collect::<Vec<_>>()
	};

	let mut schema = OptionSchema::new();
	schema.insert("from", select(MAIN, "From", field_select()).required());
	schema.insert("fromLabel", select(MAIN, "From Label", field_select()));
	schema.insert("to", select(MAIN, "To", field_select()).required());
	schema.insert("toLabel", select(MAIN, "To Label", field_select()));
	schema.insert(
		"weight",
		select(
			MAIN,
			"Weight",
			std::iter::once(none())
				.chain(fields.measures.iter().map(choice))
				.chain(dimensions())
				.collect(),
		),
	);
	schema.insert(
		"fromGroup",
		select(ADVANCED, "From Group by", group_select()).ordered(1),
	);
	schema.insert(
		"toGroup",
		select(ADVANCED, "To Group by", group_select()).ordered(2),
	);
	schema.insert(
		"fromLabelShow",
		flag(ADVANCED, "Show From nodes label always").ordered(3),
	);
	schema.insert(
		"toLabelShow",
		flag(ADVANCED, "Show To nodes label always").ordered(4),
	);
	schema
}

fn choice(field: &QueryField) -> OptionValue {
	OptionValue::new(field.display_label(), &field.name)
}

fn select(section: &'static str, label: &'static str, values: Vec<OptionValue>) -> OptionSpec {
	OptionSpec {
		section,
		order: None,
		required: false,
		label,
		kind: OptionType::String,
		display: Some("select"),
		values,
		default: OptionDefault::Text(String::new()),
	}
}

fn flag(section: &'static str, label: &'static str) -> OptionSpec {
	OptionSpec {
		section,
		order: None,
		required: false,
		label,
		kind: OptionType::Boolean,
		display: None,
		values: Vec::new(),
		default: OptionDefault::Flag(false),
	}
}

impl OptionSpec {
	fn required(mut self) -> Self {
		self.required = true;
		self
	}

	fn ordered(mut self, order: u32) -> Self {
		self.order = Some(order);
		self
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	fn fields() -> QueryFields {
		serde_json::from_value(json!({
			"dimensions": [
				{ "name": "flights.origin", "label": "Origin" },
				{ "name": "flights.destination", "label": "Destination" },
			],
			"measures": [{ "name": "flights.count", "label": "Count" }],
		}))
		.unwrap()
	}

	#[test]
	fn exposes_exactly_the_mapping_keys() {
		let schema = build_options(&fields());
		let keys: Vec<_> = schema.keys().copied().collect();
		assert_eq!(
			keys,
			[
				"from",
				"fromLabel",
				"to",
				"toLabel",
				"weight",
				"fromGroup",
				"toGroup",
				"fromLabelShow",
				"toLabelShow"
			]
		);
	}

	#[test]
	fn serialises_in_host_format() {
		let schema = build_options(&fields());
		let value = serde_json::to_value(&schema).unwrap();

		assert_eq!(
			value["from"],
			json!({
				"section": "Main",
				"required": true,
				"label": "From",
				"type": "string",
				"display": "select",
				"values": [{ "--": "" }, { "Origin": "flights.origin" }, { "Destination": "flights.destination" }],
				"default": "",
			})
		);
		assert_eq!(
			value["weight"]["values"],
			json!([{ "--": "" }, { "Count": "flights.count" }, { "Origin": "flights.origin" }, { "Destination": "flights.destination" }])
		);
		assert_eq!(value["toGroup"]["values"][1], json!({ "Itself": GROUP_BY_ITSELF }));
		assert_eq!(value["toGroup"]["order"], json!(2));
		assert_eq!(
			value["fromLabelShow"],
			json!({ "section": "_Advanced", "order": 3, "label": "Show From nodes label always", "type": "boolean", "default": false })
		);
	}

	#[test]
	fn follows_field_set_changes() {
		let mut f = fields();
		let before = build_options(&f);
		f.dimensions.pop();
		let after = build_options(&f);
		assert_eq!(before["from"].values.len(), 3);
		assert_eq!(after["from"].values.len(), 2);
	}
}
