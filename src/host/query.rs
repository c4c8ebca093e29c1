//! Query-execution collaborator for the standalone app.
//!
//! Resolving a slug and running the query are two separate requests, made in
//! that order. [`LookerApi`] talks to the BI platform's REST API with the
//! browser's `fetch`; tests and the embedded plugin use other executors.

use async_trait::async_trait;
use log::debug;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestCredentials, RequestInit, RequestMode, Response};

use crate::config::{ApiConfig, RowLimit};
use crate::error::QueryError;
use crate::graph::{FieldMapping, Row};

/// A saved query as returned by the slug lookup.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct QueryDefinition {
	/// Query id used to run it.
	#[serde(deserialize_with = "string_or_number")]
	pub id: String,
	/// Saved visualization settings.
	#[serde(default)]
	pub vis_config: Option<FieldMapping>,
}

impl QueryDefinition {
	/// The saved mapping, or an empty one.
	pub fn mapping(&self) -> FieldMapping {
		self.vis_config.clone().unwrap_or_default()
	}
}

/// Result encoding requested from the API.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ResultFormat {
	/// One JSON object per row.
	#[default]
	Json,
}

impl ResultFormat {
	/// Path segment for this format.
	pub fn as_str(self) -> &'static str {
		match self {
			ResultFormat::Json => "json",
		}
	}
}

/// Runs saved queries for the standalone app.
#[async_trait(?Send)]
pub trait QueryExecutor {
	/// Look up the query a share slug points at.
	async fn query_for_slug(&self, slug: &str) -> Result<QueryDefinition, QueryError>;

	/// Run a query, returning at most `limit` rows.
	async fn run_query(
		&self,
		query_id: &str,
		format: ResultFormat,
		limit: RowLimit,
	) -> Result<Vec<Row>, QueryError>;
}

/// Executor for sessions fed directly by a host; every call fails.
#[derive(Clone, Copy, Debug, Default)]
pub struct Detached;

#[async_trait(?Send)]
impl QueryExecutor for Detached {
	async fn query_for_slug(&self, _slug: &str) -> Result<QueryDefinition, QueryError> {
		Err(QueryError::Unavailable)
	}

	async fn run_query(
		&self,
		_query_id: &str,
		_format: ResultFormat,
		_limit: RowLimit,
	) -> Result<Vec<Row>, QueryError> {
		Err(QueryError::Unavailable)
	}
}

/// REST client for the hosting BI platform (API 4.0).
#[derive(Clone, Debug)]
pub struct LookerApi {
	config: ApiConfig,
}

impl LookerApi {
	/// Client for the API described by `config`.
	pub fn new(config: ApiConfig) -> Self {
		Self { config }
	}

	fn url(&self, path: &str) -> String {
		format!("{}/api/4.0{}", self.config.base_url.trim_end_matches('/'), path)
	}

	async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, QueryError> {
		let url = self.url(path);
		debug!("GET {url}");

		let opts = RequestInit::new();
		opts.set_method("GET");
		opts.set_mode(RequestMode::Cors);
		opts.set_credentials(RequestCredentials::Include);

		let request = Request::new_with_str_and_init(&url, &opts).map_err(js_error)?;
		if let Some(token) = &self.config.access_token {
			request
				.headers()
				.set("Authorization", &format!("Bearer {token}"))
				.map_err(js_error)?;
		}

		let window = web_sys::window().ok_or_else(|| QueryError::Request("no window".into()))?;
		let response: Response = JsFuture::from(window.fetch_with_request(&request))
			.await
			.map_err(js_error)?
			.dyn_into()
			.map_err(|_| QueryError::Request("response is not a Response".into()))?;

		if !response.ok() {
			return Err(QueryError::Status {
				status: response.status(),
			});
		}

		let body = JsFuture::from(response.text().map_err(js_error)?)
			.await
			.map_err(js_error)?
			.as_string()
			.ok_or_else(|| QueryError::Decode("response body is not text".into()))?;
		serde_json::from_str(&body).map_err(|e| QueryError::Decode(e.to_string()))
	}
}

#[async_trait(?Send)]
impl QueryExecutor for LookerApi {
	async fn query_for_slug(&self, slug: &str) -> Result<QueryDefinition, QueryError> {
		self.get(&format!("/queries/slug/{slug}")).await
	}

	async fn run_query(
		&self,
		query_id: &str,
		format: ResultFormat,
		limit: RowLimit,
	) -> Result<Vec<Row>, QueryError> {
		self.get(&format!(
			"/queries/{query_id}/run/{}?limit={}",
			format.as_str(),
			limit.get()
		))
		.await
	}
}

fn js_error(err: JsValue) -> QueryError {
	QueryError::Request(format!("{err:?}"))
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
	D: Deserializer<'de>,
{
	#[derive(Deserialize)]
	#[serde(untagged)]
	enum Id {
		Text(String),
		Number(i64),
	}

	Ok(match Id::deserialize(deserializer)? {
		Id::Text(id) => id,
		Id::Number(id) => id.to_string(),
	})
}
