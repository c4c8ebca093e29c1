//! Layout presets and host-facing limits.

use force_graph::SimulationParameters;

/// Force simulation and stabilization settings for one host.
#[derive(Clone, Debug)]
pub struct LayoutOptions {
	/// Node repulsion strength.
	pub force_charge: f32,
	/// Edge spring stiffness.
	pub force_spring: f32,
	/// Cap on the force applied to one node per step.
	pub force_max: f32,
	/// Velocity scale for node movement.
	pub node_speed: f32,
	/// Velocity kept between steps, in `0.0..=1.0`.
	pub damping_factor: f32,
	/// Upper bound on simulation steps per stabilization pass.
	pub stabilization_iterations: usize,
	/// Steps run per animation frame; one progress event per batch.
	pub iterations_per_frame: usize,
	/// Seconds of simulated time per step.
	pub timestep: f32,
	/// A step whose largest node displacement is below this ends the pass.
	pub settle_threshold: f32,
}

impl LayoutOptions {
	/// Full-page app: long stabilization with stiff springs.
	pub fn standalone() -> Self {
		Self {
			force_spring: 0.18,
			stabilization_iterations: 5000,
			..Self::embedded()
		}
	}

	/// Dashboard tile: shorter stabilization, looser springs.
	pub fn embedded() -> Self {
		Self {
			force_charge: 150.0,
			force_spring: 0.03,
			force_max: 100.0,
			node_speed: 3000.0,
			damping_factor: 0.9,
			stabilization_iterations: 1000,
			iterations_per_frame: 50,
			timestep: 0.016,
			settle_threshold: 0.01,
		}
	}

	/// The `force_graph` parameters for this preset.
	pub fn simulation(&self) -> SimulationParameters {
		SimulationParameters {
			force_charge: self.force_charge,
			force_spring: self.force_spring,
			force_max: self.force_max,
			node_speed: self.node_speed,
			damping_factor: self.damping_factor,
		}
	}
}

impl Default for LayoutOptions {
	fn default() -> Self {
		Self::standalone()
	}
}

/// Row cap sent with every query run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RowLimit(u32);

impl RowLimit {
	/// Rows fetched when the user has not moved the slider.
	pub const DEFAULT: u32 = 200;
	/// Slider minimum.
	pub const MIN: u32 = 0;
	/// Slider maximum.
	pub const MAX: u32 = 6000;
	/// Slider step.
	pub const STEP: u32 = 50;

	/// Clamp into `MIN..=MAX`.
	pub fn new(limit: u32) -> Self {
		Self(limit.clamp(Self::MIN, Self::MAX))
	}

	/// Parse slider input, keeping `fallback` on junk.
	pub fn parse_or(input: &str, fallback: RowLimit) -> Self {
		input
			.trim()
			.parse::<f64>()
			.ok()
			.filter(|v| v.is_finite())
			.map(|v| Self::new(v.max(0.0) as u32))
			.unwrap_or(fallback)
	}

	/// The limit as sent to the API.
	pub fn get(self) -> u32 {
		self.0
	}
}

impl Default for RowLimit {
	fn default() -> Self {
		Self(Self::DEFAULT)
	}
}

/// Where the query REST API lives and how to authenticate against it.
#[derive(Clone, Debug, Default)]
pub struct ApiConfig {
	/// Origin the `/api/4.0` paths are appended to.
	pub base_url: String,
	/// Bearer token; `None` relies on session cookies.
	pub access_token: Option<String>,
}

impl ApiConfig {
	/// Same-origin API with cookie auth.
	pub fn from_window() -> Self {
		let base_url = web_sys::window()
			.and_then(|w| w.location().origin().ok())
			.unwrap_or_default();
		Self {
			base_url,
			access_token: None,
		}
	}
}
