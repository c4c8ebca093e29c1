//! Dashboard plugin entry points. The host's JS shim constructs
//! [`NetworkGraphVis`], calls `create` once with the tile element and
//! `update` on every data or settings change, registering the returned
//! options object with its configuration panel.

use leptos::prelude::*;
use serde::Serialize;
use serde_json::Value;
use wasm_bindgen::prelude::*;
use web_sys::HtmlElement;

use crate::components::network_graph::{NetworkGraphCanvas, SharedController};
use crate::components::progress::{GraphStatus, ProgressOverlay};
use crate::components::results_link::ResultsLink;
use crate::config::LayoutOptions;
use crate::graph::Row;
use crate::host::{EmbeddedVisualization, QueryMetadata};
use crate::session::{ForceLayout, Phase};

/// Plugin instance owned by the host's JS shim.
#[wasm_bindgen]
pub struct NetworkGraphVis {
	inner: EmbeddedVisualization<ForceLayout>,
	status: GraphStatus,
	mounted: bool,
}

#[wasm_bindgen]
impl NetworkGraphVis {
	/// New, unmounted instance. Installs logging on first use.
	#[wasm_bindgen(constructor)]
	pub fn new() -> Self {
		crate::init_logging();
		Self {
			inner: EmbeddedVisualization::new(),
			status: GraphStatus::new(),
			mounted: false,
		}
	}

	/// Mount the canvas into the tile element.
	pub fn create(&mut self, element: HtmlElement) {
		if self.mounted {
			return;
		}
		let (controller, status) = (self.inner.controller(), self.status);
		leptos::mount::mount_to(element, move || view! { <EmbeddedGraph controller=controller status=status /> })
			.forget();
		self.mounted = true;
	}

	/// Apply new rows and settings. Returns the options schema, or throws a
	/// message when the result shape cannot be drawn.
	pub fn update(
		&self,
		data: JsValue,
		config: JsValue,
		query_response: JsValue,
	) -> Result<JsValue, JsValue> {
		let rows: Vec<Row> = from_js(&data)?;
		let config: Value = from_js(&config)?;
		let metadata: QueryMetadata = from_js(&query_response)?;

		let options = self
			.inner
			.update(&rows, &config, &metadata)
			.map_err(|err| JsValue::from_str(&err.to_string()))?;
		to_js(&options)
	}

	/// Release the layout instance; the draw loop stops on its next frame.
	pub fn destroy(&self) {
		self.inner.controller().borrow_mut().session_mut().teardown();
	}
}

impl Default for NetworkGraphVis {
	fn default() -> Self {
		Self::new()
	}
}

#[component]
fn EmbeddedGraph(controller: SharedController, status: GraphStatus) -> impl IntoView {
	view! {
		<div style="height: 100%">
			<div class="graph-container">
				<NetworkGraphCanvas
					controller=controller
					status=status
					options=LayoutOptions::embedded()
				/>
			</div>
			<ResultsLink />
			<Show when=move || status.phase.get() == Phase::Stabilizing>
				<ProgressOverlay progress=status.progress />
			</Show>
		</div>
	}
}

fn from_js<T: serde::de::DeserializeOwned + Default>(value: &JsValue) -> Result<T, JsValue> {
	if value.is_undefined() || value.is_null() {
		return Ok(T::default());
	}
	let text = js_sys::JSON::stringify(value)?
		.as_string()
		.unwrap_or_default();
	serde_json::from_str(&text).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
	let text = serde_json::to_string(value).map_err(|e| JsValue::from_str(&e.to_string()))?;
	js_sys::JSON::parse(&text)
}
