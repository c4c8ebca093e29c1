use std::collections::HashSet;

use force_graph::DefaultNodeIdx;

const MIN_ZOOM: f64 = 0.1;
const MAX_ZOOM: f64 = 10.0;
/// Seconds the pointer must rest on a node before its neighbourhood lights up.
const FOCUS_DELAY: f64 = 0.08;
const FADE_IN_RATE: f64 = 1.8;
const FADE_OUT_RATE: f64 = 1.26;

/// Maps graph space to canvas pixels: `screen = graph * zoom + offset`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
	pub offset_x: f64,
	pub offset_y: f64,
	pub zoom: f64,
}

impl Default for Camera {
	fn default() -> Self {
		Self {
			offset_x: 0.0,
			offset_y: 0.0,
			zoom: 1.0,
		}
	}
}

impl Camera {
	pub fn to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.offset_x) / self.zoom,
			(sy - self.offset_y) / self.zoom,
		)
	}

	/// Scale by `factor` around the screen point `(sx, sy)`.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64) {
		let (gx, gy) = self.to_graph(sx, sy);
		self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
		self.offset_x = sx - gx * self.zoom;
		self.offset_y = sy - gy * self.zoom;
	}
}

/// The pointer gesture in progress, if any.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Gesture {
	#[default]
	Idle,
	/// `grab` is the node position minus the pointer, in graph space.
	Drag {
		node: DefaultNodeIdx,
		grab: (f64, f64),
	},
	/// `last` is the previous pointer position in screen space.
	Pan { last: (f64, f64) },
}

type Neighbourhood = (DefaultNodeIdx, HashSet<DefaultNodeIdx>);

/// Hover highlight: the hovered node with its neighbours, plus the one
/// that is fading out after the pointer left it.
#[derive(Clone, Debug, Default)]
pub struct Spotlight {
	current: Option<Neighbourhood>,
	fading: Option<Neighbourhood>,
	/// Highlight strength in `0.0..=1.0`, before easing.
	pub strength: f64,
	waited: f64,
}

impl Spotlight {
	pub fn focus(&mut self, node: Option<DefaultNodeIdx>, neighbors: HashSet<DefaultNodeIdx>) {
		if self.hovered() == node {
			return;
		}
		let previous = self.current.take();
		match node {
			Some(node) => {
				if previous.is_none() {
					self.waited = 0.0;
				}
				self.fading = None;
				self.current = Some((node, neighbors));
			}
			None => self.fading = previous,
		}
	}

	pub fn hovered(&self) -> Option<DefaultNodeIdx> {
		self.current.as_ref().map(|(node, _)| *node)
	}

	fn shown(&self) -> Option<&Neighbourhood> {
		self.current.as_ref().or(self.fading.as_ref())
	}

	pub fn is_active(&self) -> bool {
		self.shown().is_some()
	}

	pub fn is_center(&self, idx: DefaultNodeIdx) -> bool {
		self.shown().is_some_and(|(node, _)| *node == idx)
	}

	pub fn is_neighbor(&self, idx: DefaultNodeIdx) -> bool {
		self.shown().is_some_and(|(_, around)| around.contains(&idx))
	}

	pub fn is_lit(&self, idx: DefaultNodeIdx) -> bool {
		self.is_center(idx) || self.is_neighbor(idx)
	}

	fn advance(&mut self, dt: f64) {
		if self.current.is_some() {
			self.waited = (self.waited + dt).min(FOCUS_DELAY);
			if self.waited >= FOCUS_DELAY {
				self.strength += (1.0 - self.strength) * (FADE_IN_RATE * dt).min(1.0);
			}
			return;
		}
		self.strength -= self.strength * (FADE_OUT_RATE * dt).min(1.0);
		if self.strength < 0.01 {
			self.strength = 0.0;
			self.fading = None;
		}
	}
}

/// Everything the canvas keeps between frames besides the layout itself.
#[derive(Clone, Debug, Default)]
pub struct CanvasView {
	pub camera: Camera,
	pub gesture: Gesture,
	pub spotlight: Spotlight,
	/// Seconds of edge-dash animation.
	pub flow_time: f64,
}

impl CanvasView {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn tick(&mut self, dt: f64) {
		self.flow_time += dt;
		self.spotlight.advance(dt);
	}

	/// Start dragging `hit` (node index and graph position), or pan when
	/// the press landed on empty canvas.
	pub fn press(&mut self, sx: f64, sy: f64, hit: Option<(DefaultNodeIdx, (f64, f64))>) {
		self.gesture = match hit {
			Some((node, (nx, ny))) => {
				let (gx, gy) = self.camera.to_graph(sx, sy);
				Gesture::Drag {
					node,
					grab: (nx - gx, ny - gy),
				}
			}
			None => Gesture::Pan { last: (sx, sy) },
		};
	}

	/// Follow the pointer. Returns where a dragged node should go.
	pub fn pointer_moved(&mut self, sx: f64, sy: f64) -> Option<(DefaultNodeIdx, f64, f64)> {
		match &mut self.gesture {
			Gesture::Idle => None,
			Gesture::Drag { node, grab } => {
				let (gx, gy) = self.camera.to_graph(sx, sy);
				Some((*node, gx + grab.0, gy + grab.1))
			}
			Gesture::Pan { last } => {
				self.camera.offset_x += sx - last.0;
				self.camera.offset_y += sy - last.1;
				*last = (sx, sy);
				None
			}
		}
	}

	pub fn release(&mut self) {
		self.gesture = Gesture::Idle;
	}
}

#[cfg(test)]
mod tests {
	use force_graph::{ForceGraph, NodeData};

	use super::*;
	use crate::config::LayoutOptions;

	fn node_index() -> DefaultNodeIdx {
		let mut graph: ForceGraph<(), ()> = ForceGraph::new(LayoutOptions::embedded().simulation());
		graph.add_node(NodeData {
			x: 0.0,
			y: 0.0,
			mass: 10.0,
			is_anchor: false,
			user_data: (),
		})
	}

	#[test]
	fn zoom_keeps_point_under_cursor() {
		let mut camera = Camera::default();
		let before = camera.to_graph(200.0, 150.0);
		camera.zoom_at(200.0, 150.0, 1.1);
		let after = camera.to_graph(200.0, 150.0);
		assert!((before.0 - after.0).abs() < 1e-9);
		assert!((before.1 - after.1).abs() < 1e-9);
		assert!((camera.zoom - 1.1).abs() < 1e-12);
	}

	#[test]
	fn zoom_is_clamped() {
		let mut camera = Camera::default();
		for _ in 0..100 {
			camera.zoom_at(0.0, 0.0, 0.5);
		}
		assert_eq!(camera.zoom, MIN_ZOOM);
	}

	#[test]
	fn pan_moves_by_pointer_delta() {
		let mut view = CanvasView::new();
		view.press(10.0, 10.0, None);
		assert_eq!(view.pointer_moved(15.0, 30.0), None);
		assert_eq!(view.pointer_moved(20.0, 30.0), None);
		assert_eq!((view.camera.offset_x, view.camera.offset_y), (10.0, 20.0));

		view.release();
		view.pointer_moved(100.0, 100.0);
		assert_eq!(view.camera.offset_x, 10.0);
	}

	#[test]
	fn drag_keeps_grab_offset_under_zoom() {
		let idx = node_index();
		let mut view = CanvasView::new();
		view.camera.zoom_at(0.0, 0.0, 2.0);
		view.press(100.0, 100.0, Some((idx, (48.0, 50.0))));

		let (node, x, y) = view.pointer_moved(120.0, 100.0).unwrap();
		assert_eq!(node, idx);
		assert!((x - 58.0).abs() < 1e-9);
		assert!((y - 50.0).abs() < 1e-9);
	}

	#[test]
	fn spotlight_fades_out_after_leaving() {
		let idx = node_index();
		let mut view = CanvasView::new();
		view.spotlight.focus(Some(idx), HashSet::new());
		for _ in 0..200 {
			view.tick(0.016);
		}
		assert!(view.spotlight.strength > 0.9);

		view.spotlight.focus(None, HashSet::new());
		assert_eq!(view.spotlight.hovered(), None);
		assert!(view.spotlight.is_center(idx));
		for _ in 0..400 {
			view.tick(0.016);
		}
		assert_eq!(view.spotlight.strength, 0.0);
		assert!(!view.spotlight.is_active());
	}
}
