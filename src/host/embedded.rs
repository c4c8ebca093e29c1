//! Embedded visualization host: the dashboard hands over rows, config and
//! query metadata on every update.

use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, info};
use serde::Deserialize;
use serde_json::Value;

use super::options::{OptionSchema, build_options};
use crate::error::ValidationError;
use crate::graph::{FieldMapping, Row};
use crate::session::{LayoutEngine, LifecycleController};

/// Dimensions needed: one per endpoint.
pub const MIN_DIMENSIONS: usize = 2;
/// Pivoted results cannot be drawn.
pub const MAX_PIVOTS: usize = 0;

/// One field of the host query.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct QueryField {
	/// Fully qualified field name, as used for row keys.
	pub name: String,
	/// Human label; may be empty.
	#[serde(default)]
	pub label: String,
}

impl QueryField {
	/// Label, or the name when there is none.
	pub fn display_label(&self) -> &str {
		if self.label.is_empty() {
			&self.name
		} else {
			&self.label
		}
	}
}

/// Field lists of the host query, by kind.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct QueryFields {
	/// Grouping fields; endpoint candidates.
	#[serde(default)]
	pub dimensions: Vec<QueryField>,
	/// Aggregates; weight candidates.
	#[serde(default)]
	pub measures: Vec<QueryField>,
	/// Pivot fields; must be empty.
	#[serde(default)]
	pub pivots: Vec<QueryField>,
}

/// The part of the host's query response the plugin looks at.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct QueryMetadata {
	/// Fields of the current query.
	#[serde(default)]
	pub fields: QueryFields,
}

impl QueryMetadata {
	/// Drawable only with at least two dimensions and no pivots.
	pub fn validate(&self) -> Result<(), ValidationError> {
		let found = self.fields.dimensions.len();
		if found < MIN_DIMENSIONS {
			return Err(ValidationError::TooFewDimensions {
				required: MIN_DIMENSIONS,
				found,
			});
		}
		let found = self.fields.pivots.len();
		if found > MAX_PIVOTS {
			return Err(ValidationError::TooManyPivots {
				allowed: MAX_PIVOTS,
				found,
			});
		}
		Ok(())
	}
}

/// Host-independent half of the plugin. Shares its controller with whatever
/// draws the session.
pub struct EmbeddedVisualization<L> {
	controller: Rc<RefCell<LifecycleController<L>>>,
}

impl<L: LayoutEngine> Default for EmbeddedVisualization<L> {
	fn default() -> Self {
		Self::new()
	}
}

impl<L: LayoutEngine> EmbeddedVisualization<L> {
	/// Plugin half with a detached controller.
	pub fn new() -> Self {
		Self {
			controller: Rc::new(RefCell::new(LifecycleController::detached())),
		}
	}

	/// Shared handle for the canvas.
	pub fn controller(&self) -> Rc<RefCell<LifecycleController<L>>> {
		Rc::clone(&self.controller)
	}

	/// Validate, then apply the new rows. Returns the options to register
	/// with the host. An unusable config draws nothing but is not an error.
	pub fn update(
		&self,
		rows: &[Row],
		config: &Value,
		metadata: &QueryMetadata,
	) -> Result<OptionSchema, ValidationError> {
		metadata.validate()?;
		let options = build_options(&metadata.fields);

		let mapping = FieldMapping::deserialize(config).unwrap_or_else(|err| {
			debug!("unreadable visualization config: {err}");
			FieldMapping::default()
		});
		if let Err(err) = self.controller.borrow_mut().update(rows, &mapping) {
			info!("not drawing: {err}");
		}
		Ok(options)
	}
}
