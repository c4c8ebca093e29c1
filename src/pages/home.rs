use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use leptos_router::hooks::use_params_map;

use crate::components::network_graph::{NetworkGraphCanvas, SharedController};
use crate::components::progress::{GraphStatus, ProgressOverlay};
use crate::config::{ApiConfig, LayoutOptions, RowLimit};
use crate::host::{LookerApi, QueryExecutor};
use crate::session::{LifecycleController, Phase};

/// Full-page graph for the query slug in the route.
#[component]
pub fn Home() -> impl IntoView {
	let params = use_params_map();
	let slug = move || params.with(|p| p.get("slug")).filter(|s| !s.is_empty());

	let executor: Rc<dyn QueryExecutor> = Rc::new(LookerApi::new(ApiConfig::from_window()));
	let controller: SharedController = Rc::new(RefCell::new(LifecycleController::new(executor)));
	let status = GraphStatus::new();
	let limit = RwSignal::new(RowLimit::default());

	let run = {
		let controller = controller.clone();
		move |slug: String| {
			let controller = controller.clone();
			let limit = limit.get_untracked();
			wasm_bindgen_futures::spawn_local(async move {
				LifecycleController::execute(&controller, &slug, limit).await;
				status.publish(&*controller.borrow());
			});
		}
	};

	let run_on_route = run.clone();
	Effect::new(move |_| {
		if let Some(slug) = slug() {
			run_on_route(slug);
		}
	});

	view! {
		<div class="mains-container">
			<div class="graph-container">
				<NetworkGraphCanvas
					controller=controller
					status=status
					options=LayoutOptions::standalone()
					fullscreen=true
				/>
			</div>
			<Show when=move || status.phase.get() == Phase::Stabilizing>
				<ProgressOverlay text="Preparing graph..." progress=status.progress />
			</Show>
			<Show when=move || status.phase.get() == Phase::Fetching>
				<ProgressOverlay text="Executing Query..." progress=Signal::derive(|| 0.0) />
			</Show>
			<div class="graph-options">
				<h4>"Limit: " {move || limit.get().get().to_string()}</h4>
				<input
					type="range"
					min=RowLimit::MIN.to_string()
					max=RowLimit::MAX.to_string()
					step=RowLimit::STEP.to_string()
					prop:value=move || limit.get().get().to_string()
					on:input=move |ev| {
						let next = RowLimit::parse_or(&event_target_value(&ev), limit.get_untracked());
						limit.set(next);
					}
				/>
				<br />
				<button
					disabled=move || status.phase.get() == Phase::Fetching || slug().is_none()
					on:click=move |_| {
						if let Some(slug) = slug() {
							run(slug);
						}
					}
				>
					"Execute"
				</button>
				{move || status.message.get().map(|message| view! { <p class="status">{message}</p> })}
			</div>
		</div>
	}
}
