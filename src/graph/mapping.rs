//! Field mapping: which row fields feed the graph.

use serde::{Deserialize, Serialize};

use super::model::Role;

/// Option value meaning "group a node by its own endpoint field".
pub const GROUP_BY_ITSELF: &str = "@@GROUP_BY_ITSELF@@";

/// How nodes of one role are grouped for colouring.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum GroupBy {
	/// No grouping; every node gets the default colour.
	#[default]
	None,
	/// The self-sentinel. Every node of the role gets the endpoint field's
	/// name as its group, so they all share one group.
	Itself,
	/// Group by the value of this row field.
	Field(String),
}

impl From<Option<String>> for GroupBy {
	fn from(value: Option<String>) -> Self {
		match value {
			None => GroupBy::None,
			Some(s) if s.is_empty() => GroupBy::None,
			Some(s) if s == GROUP_BY_ITSELF => GroupBy::Itself,
			Some(s) => GroupBy::Field(s),
		}
	}
}

impl From<GroupBy> for String {
	fn from(value: GroupBy) -> Self {
		match value {
			GroupBy::None => String::new(),
			GroupBy::Itself => GROUP_BY_ITSELF.to_owned(),
			GroupBy::Field(field) => field,
		}
	}
}

/// Which row fields feed endpoints, titles, weight and grouping.
///
/// Deserialises straight from a host visualization config; unknown keys are
/// ignored and empty strings count as "not configured".
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FieldMapping {
	/// Field holding the source endpoint.
	#[serde(deserialize_with = "or_empty")]
	pub from: String,
	/// Field holding the target endpoint.
	#[serde(deserialize_with = "or_empty")]
	pub to: String,
	/// Field used as the source node title.
	#[serde(deserialize_with = "non_empty")]
	pub from_label: Option<String>,
	/// Field used as the target node title.
	#[serde(deserialize_with = "non_empty")]
	pub to_label: Option<String>,
	/// Draw source titles permanently, not only on hover.
	#[serde(deserialize_with = "or_false")]
	pub from_label_show: bool,
	/// Draw target titles permanently, not only on hover.
	#[serde(deserialize_with = "or_false")]
	pub to_label_show: bool,
	/// Numeric field scaling edge width.
	#[serde(deserialize_with = "non_empty")]
	pub weight: Option<String>,
	/// Colour grouping for source nodes.
	pub from_group: GroupBy,
	/// Colour grouping for target nodes.
	pub to_group: GroupBy,
}

/// The slice of a [`FieldMapping`] that applies to one role.
#[derive(Clone, Copy, Debug)]
pub struct RoleFields<'a> {
	/// Endpoint field.
	pub key: &'a str,
	/// Title field, if configured.
	pub label: Option<&'a str>,
	/// Whether the title is also the permanent label.
	pub show_label: bool,
	/// Grouping rule.
	pub group: &'a GroupBy,
}

impl FieldMapping {
	/// Mapping with just the two endpoints set.
	pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
		Self {
			from: from.into(),
			to: to.into(),
			..Default::default()
		}
	}

	/// Both `from` and `to` are configured.
	pub fn has_endpoints(&self) -> bool {
		!self.from.is_empty() && !self.to.is_empty()
	}

	/// Fields that apply to nodes of `role`.
	pub fn role(&self, role: Role) -> RoleFields<'_> {
		match role {
			Role::Source => RoleFields {
				key: &self.from,
				label: self.from_label.as_deref(),
				show_label: self.from_label_show,
				group: &self.from_group,
			},
			Role::Target => RoleFields {
				key: &self.to,
				label: self.to_label.as_deref(),
				show_label: self.to_label_show,
				group: &self.to_group,
			},
		}
	}
}

fn non_empty<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
	D: serde::Deserializer<'de>,
{
	let value = Option::<String>::deserialize(deserializer)?;
	Ok(value.filter(|s| !s.is_empty()))
}

fn or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
	D: serde::Deserializer<'de>,
{
	Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn or_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
	D: serde::Deserializer<'de>,
{
	Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or_default())
}
