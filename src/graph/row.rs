//! Rows as delivered by either host, and the single accessor used to read them.
//!
//! The standalone app receives plain JSON scalars per field, while the embedded
//! plugin receives objects such as `{"value": 3, "rendered": "3"}`. Both decode
//! into [`FieldValue`] and are read through [`FieldAccess`], so the transformer
//! never branches on the shape.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::FieldError;

/// A raw scalar as it arrived from the query result.
pub type Scalar = Value;

/// One cell of a row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
	/// Host cell object; everything but `value` is ignored.
	Wrapped { value: Scalar },
	/// Plain scalar.
	Raw(Scalar),
}

impl FieldValue {
	/// The underlying value, whatever the cell shape.
	pub fn scalar(&self) -> &Scalar {
		match self {
			FieldValue::Wrapped { value } => value,
			FieldValue::Raw(value) => value,
		}
	}
}

impl From<Scalar> for FieldValue {
	fn from(value: Scalar) -> Self {
		FieldValue::Raw(value)
	}
}

/// One record of a result set, in field order.
pub type Row = IndexMap<String, FieldValue>;

/// Field-value accessor shared by every caller that reads rows.
pub trait FieldAccess {
	/// Look up `field`, unwrapping `{value}` cells. Empty names never match.
	fn field(&self, field: &str) -> Result<&Scalar, FieldError>;

	/// Like [`FieldAccess::field`] for an optional mapping entry: `None` when
	/// the mapping is unset or the row lacks the field.
	fn optional(&self, field: Option<&str>) -> Option<&Scalar> {
		field.and_then(|f| self.field(f).ok())
	}
}

impl FieldAccess for Row {
	fn field(&self, field: &str) -> Result<&Scalar, FieldError> {
		if field.is_empty() {
			return Err(FieldError::MissingField {
				field: String::new(),
			});
		}
		self.get(field)
			.map(FieldValue::scalar)
			.ok_or_else(|| FieldError::MissingField {
				field: field.to_owned(),
			})
	}
}

/// Text form of a scalar when used as a key or display string.
pub fn scalar_text(value: &Scalar) -> String {
	match value {
		Value::String(s) => s.clone(),
		other => other.to_string(),
	}
}

/// Numeric reading of a scalar: finite numbers, or strings that parse as one.
pub fn scalar_number(value: &Scalar) -> Option<f64> {
	let number = match value {
		Value::Number(n) => n.as_f64(),
		Value::String(s) => s.trim().parse::<f64>().ok(),
		_ => None,
	};
	number.filter(|v| v.is_finite())
}
