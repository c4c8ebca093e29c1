//! Ownership of the live layout instance.

use log::trace;

use super::layout::{LayoutEngine, LayoutProgress};
use crate::graph::GraphModel;

/// A layout notification tagged with the apply that started its pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutEvent {
	/// A batch finished short of the total.
	Progress {
		/// Apply the pass belongs to.
		generation: u64,
		/// Steps run so far.
		iterations: usize,
		/// Step budget of the pass.
		total: usize,
	},
	/// The pass finished.
	Done {
		/// Apply the pass belongs to.
		generation: u64,
	},
}

impl LayoutEvent {
	/// Apply the event belongs to.
	pub fn generation(&self) -> u64 {
		match *self {
			LayoutEvent::Progress { generation, .. } | LayoutEvent::Done { generation } => generation,
		}
	}
}

/// Owns the one live layout instance of a mounted visualization and the
/// model last pushed into it.
pub struct RenderingSession<L> {
	instance: Option<L>,
	model: Option<GraphModel>,
	generation: u64,
}

impl<L> Default for RenderingSession<L> {
	fn default() -> Self {
		Self {
			instance: None,
			model: None,
			generation: 0,
		}
	}
}

impl<L: LayoutEngine> RenderingSession<L> {
	/// Session with no instance yet.
	pub fn new() -> Self {
		Self::default()
	}

	/// Create the instance on first call; later calls return it unchanged.
	/// A model applied before the instance existed is loaded into it.
	pub fn ensure_instance(&mut self, create: impl FnOnce() -> L) -> &mut L {
		let model = &self.model;
		self.instance.get_or_insert_with(|| {
			let mut instance = create();
			if let Some(model) = model {
				instance.set_physics(true);
				instance.set_data(model);
			}
			instance
		})
	}

	/// The live instance, if mounted.
	pub fn instance(&self) -> Option<&L> {
		self.instance.as_ref()
	}

	/// The live instance, mutably.
	pub fn instance_mut(&mut self) -> Option<&mut L> {
		self.instance.as_mut()
	}

	/// Model of the latest apply.
	pub fn model(&self) -> Option<&GraphModel> {
		self.model.as_ref()
	}

	/// Token of the latest apply; events carrying an older one are stale.
	pub fn generation(&self) -> u64 {
		self.generation
	}

	/// Push a model into the instance. Physics is always switched back on
	/// first, so every apply starts a fresh stabilization pass.
	pub fn apply(&mut self, model: GraphModel) -> u64 {
		self.generation += 1;
		if let Some(instance) = self.instance.as_mut() {
			instance.set_physics(true);
			instance.set_data(&model);
		}
		self.model = Some(model);
		trace!("applied graph generation {}", self.generation);
		self.generation
	}

	/// Advance the running stabilization pass by one batch.
	pub fn pump(&mut self) -> Option<LayoutEvent> {
		let generation = self.generation;
		let progress = self.instance.as_mut()?.stabilize()?;
		Some(match progress {
			LayoutProgress::Progress { iterations, total } => LayoutEvent::Progress {
				generation,
				iterations,
				total,
			},
			LayoutProgress::Done => LayoutEvent::Done { generation },
		})
	}

	/// Stop simulating once the layout has settled.
	pub fn disable_physics(&mut self) {
		if let Some(instance) = self.instance.as_mut() {
			instance.set_physics(false);
		}
	}

	/// Drop the instance on unmount, handing it back to the caller.
	pub fn teardown(&mut self) -> Option<L> {
		self.model = None;
		self.instance.take()
	}
}
