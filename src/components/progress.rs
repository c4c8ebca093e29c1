use leptos::prelude::*;

use crate::session::{LayoutEngine, LifecycleController, Phase};

/// Reactive copy of a controller's phase, progress and status line.
#[derive(Clone, Copy)]
pub struct GraphStatus {
	pub phase: RwSignal<Phase>,
	pub progress: RwSignal<f64>,
	pub message: RwSignal<Option<String>>,
}

impl Default for GraphStatus {
	fn default() -> Self {
		Self::new()
	}
}

impl GraphStatus {
	pub fn new() -> Self {
		Self {
			phase: RwSignal::new(Phase::Idle),
			progress: RwSignal::new(0.0),
			message: RwSignal::new(None),
		}
	}

	/// Copy the controller's state, touching only signals that changed.
	pub fn publish<L: LayoutEngine>(&self, controller: &LifecycleController<L>) {
		if self.phase.get_untracked() != controller.phase() {
			self.phase.set(controller.phase());
		}
		if self.progress.get_untracked() != controller.progress() {
			self.progress.set(controller.progress());
		}
		if self.message.with_untracked(|m| m.as_deref() != controller.status()) {
			self.message.set(controller.status().map(str::to_owned));
		}
	}
}

/// `ceil(progress * 100)%`, or nothing at zero.
pub fn percent_label(progress: f64) -> Option<String> {
	(progress > 0.0).then(|| format!("{}%", (progress * 100.0).ceil()))
}

#[component]
pub fn ProgressOverlay(
	#[prop(optional)] text: Option<&'static str>,
	#[prop(into)] progress: Signal<f64>,
) -> impl IntoView {
	view! {
		<div class="loading-overlay">
			<div class="spinner" />
			{text.map(|text| view! { <h2>{text}</h2> })}
			{move || percent_label(progress.get()).map(|label| view! { <div class="percent">{label}</div> })}
		</div>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn percent_rounds_up_and_hides_zero() {
		assert_eq!(percent_label(0.0), None);
		assert_eq!(percent_label(0.001).as_deref(), Some("1%"));
		assert_eq!(percent_label(0.5).as_deref(), Some("50%"));
		assert_eq!(percent_label(1.0).as_deref(), Some("100%"));
	}
}
