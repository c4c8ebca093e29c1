//! Error kinds for the graph core. None of these are fatal: each one either
//! turns into "render nothing" or into a status line for the overlay.

use thiserror::Error;

/// A row lookup that found nothing usable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
	/// The field name was empty or the row has no such field.
	#[error("field '{field}' is not present in the row")]
	MissingField {
		/// The name that was looked up.
		field: String,
	},
}

/// Reasons the transformer refuses to build a graph.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
	/// `from` or `to` is not configured.
	#[error("both 'from' and 'to' fields must be configured")]
	MissingEndpoints,
}

/// Failures talking to the query-execution collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
	/// The request could not be built or sent.
	#[error("request failed: {0}")]
	Request(String),

	/// The API answered with a non-success status.
	#[error("query API returned HTTP {status}")]
	Status {
		/// HTTP status code.
		status: u16,
	},

	/// The body was not the JSON we expected.
	#[error("could not decode response: {0}")]
	Decode(String),

	/// This session has no way to run queries.
	#[error("no query executor is attached to this session")]
	Unavailable,
}

/// The embedded host handed us a result shape we cannot draw.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
	/// Fewer dimensions than the two endpoints need.
	#[error("this chart requires at least {required} dimensions, found {found}")]
	TooFewDimensions {
		/// Minimum accepted.
		required: usize,
		/// Dimensions in the query.
		found: usize,
	},

	/// The query is pivoted.
	#[error("this chart allows at most {allowed} pivots, found {found}")]
	TooManyPivots {
		/// Maximum accepted.
		allowed: usize,
		/// Pivots in the query.
		found: usize,
	},
}
