//! Layout engines and the force-directed one the canvas uses.

use std::collections::{HashMap, HashSet};
use std::f64::consts::PI;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData};
use log::debug;

use crate::config::LayoutOptions;
use crate::graph::GraphModel;

const COLORS: &[&str] = &[
	"#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
	"#bcbd22", "#17becf",
];

/// Drawn node radius, in graph units.
pub const NODE_RADIUS: f64 = 5.0;
/// Pointer distance that still counts as on a node.
pub const HIT_RADIUS: f64 = 12.0;
const MIN_EDGE_WIDTH: f64 = 1.0;
const MAX_EDGE_WIDTH: f64 = 6.0;

/// What one stabilization batch produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutProgress {
	/// Still running.
	Progress {
		/// Steps run so far in this pass.
		iterations: usize,
		/// Most steps the pass will run.
		total: usize,
	},
	/// The pass finished; the engine stopped simulating.
	Done,
}

/// The rendering collaborator: holds graph data and positions it.
pub trait LayoutEngine {
	/// Replace the graph. Restarts stabilization when physics is on.
	fn set_data(&mut self, model: &GraphModel);

	/// Switch simulation on or off. Off also ends a running pass.
	fn set_physics(&mut self, enabled: bool);

	/// Whether the engine simulates.
	fn physics_enabled(&self) -> bool;

	/// Run one batch of stabilization iterations. `None` when no pass is
	/// running.
	fn stabilize(&mut self) -> Option<LayoutProgress>;
}

/// Per-node data carried through the simulation.
#[derive(Clone, Debug, Default)]
pub struct NodeInfo {
	/// Node id from the model.
	pub id: String,
	/// Hover text.
	pub title: Option<String>,
	/// Permanent on-canvas label.
	pub label: Option<String>,
	/// Fill colour from the group palette.
	pub color: String,
}

impl NodeInfo {
	/// Hover text, falling back to the node id.
	pub fn tooltip(&self) -> &str {
		self.title.as_deref().unwrap_or(&self.id)
	}
}

/// An edge as drawn.
#[derive(Clone, Copy, Debug)]
pub struct LinkInfo {
	/// Source node index.
	pub source: DefaultNodeIdx,
	/// Target node index.
	pub target: DefaultNodeIdx,
	/// Line width in pixels, from the weight.
	pub width: f64,
}

/// Force-directed layout over `force_graph`.
pub struct ForceLayout {
	options: LayoutOptions,
	graph: ForceGraph<NodeInfo, ()>,
	links: Vec<LinkInfo>,
	physics: bool,
	stabilizing: bool,
	iterations: usize,
	width: f64,
	height: f64,
}

impl ForceLayout {
	/// Empty layout for a canvas of the given size.
	pub fn new(options: LayoutOptions, width: f64, height: f64) -> Self {
		Self {
			graph: ForceGraph::new(options.simulation()),
			options,
			links: Vec::new(),
			physics: true,
			stabilizing: false,
			iterations: 0,
			width,
			height,
		}
	}

	/// The simulated graph.
	pub fn graph(&self) -> &ForceGraph<NodeInfo, ()> {
		&self.graph
	}

	/// Edges whose endpoints both resolved.
	pub fn links(&self) -> &[LinkInfo] {
		&self.links
	}

	/// Canvas size in pixels.
	pub fn size(&self) -> (f64, f64) {
		(self.width, self.height)
	}

	/// Track a new canvas size.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}

	/// Number of loaded nodes.
	pub fn node_count(&self) -> usize {
		let mut count = 0;
		self.graph.visit_nodes(|_| count += 1);
		count
	}

	/// Current position of every node.
	pub fn positions(&self) -> HashMap<DefaultNodeIdx, (f64, f64)> {
		let mut positions = HashMap::new();
		self.graph.visit_nodes(|node| {
			positions.insert(node.index(), (node.x() as f64, node.y() as f64));
		});
		positions
	}

	/// Current position of one node.
	pub fn position(&self, idx: DefaultNodeIdx) -> Option<(f64, f64)> {
		let mut found = None;
		self.graph.visit_nodes(|node| {
			if node.index() == idx {
				found = Some((node.x() as f64, node.y() as f64));
			}
		});
		found
	}

	/// Node under a graph-space point, if any.
	pub fn node_at(&self, gx: f64, gy: f64) -> Option<DefaultNodeIdx> {
		let mut found = None;
		self.graph.visit_nodes(|node| {
			let (dx, dy) = (node.x() as f64 - gx, node.y() as f64 - gy);
			// HIT_RADIUS is in world-space, scales with zoom like nodes
			if (dx * dx + dy * dy).sqrt() < HIT_RADIUS {
				found = Some(node.index());
			}
		});
		found
	}

	/// Data attached to one node.
	pub fn node_info(&self, idx: DefaultNodeIdx) -> Option<NodeInfo> {
		let mut found = None;
		self.graph.visit_nodes(|node| {
			if node.index() == idx {
				found = Some(node.data.user_data.clone());
			}
		});
		found
	}

	/// Nodes sharing an edge with `idx`, either direction.
	pub fn neighbors(&self, idx: DefaultNodeIdx) -> HashSet<DefaultNodeIdx> {
		let mut neighbors = HashSet::new();
		for link in &self.links {
			if link.source == idx {
				neighbors.insert(link.target);
			} else if link.target == idx {
				neighbors.insert(link.source);
			}
		}
		neighbors
	}

	/// Pin a node at a graph-space position.
	pub fn move_node(&mut self, idx: DefaultNodeIdx, x: f32, y: f32) {
		self.graph.visit_nodes_mut(|node| {
			if node.index() == idx {
				node.data.x = x;
				node.data.y = y;
				node.data.is_anchor = true;
			}
		});
	}

	/// One simulation step; returns the largest distance any node moved.
	fn step(&mut self) -> f32 {
		let mut before = Vec::new();
		self.graph
			.visit_nodes(|node| before.push((node.index(), node.x(), node.y())));
		self.graph.update(self.options.timestep);

		let before: HashMap<_, _> = before
			.into_iter()
			.map(|(idx, x, y)| (idx, (x, y)))
			.collect();
		let mut moved: f32 = 0.0;
		self.graph.visit_nodes(|node| {
			if let Some(&(x, y)) = before.get(&node.index()) {
				let (dx, dy) = (node.x() - x, node.y() - y);
				moved = moved.max((dx * dx + dy * dy).sqrt());
			}
		});
		moved
	}
}

impl LayoutEngine for ForceLayout {
	fn set_data(&mut self, model: &GraphModel) {
		let mut graph = ForceGraph::new(self.options.simulation());
		let mut id_to_idx = HashMap::new();
		let mut palette: HashMap<&str, usize> = HashMap::new();
		let count = model.nodes.len().max(1) as f64;

		for (i, node) in model.nodes.iter().enumerate() {
			let color = match node.group.as_deref() {
				Some(group) => {
					let next = palette.len();
					let slot = *palette.entry(group).or_insert(next);
					COLORS[slot % COLORS.len()]
				}
				None => COLORS[0],
			};
			let angle = (i as f64) * 2.0 * PI / count;
			let (x, y) = (
				(self.width / 2.0 + 100.0 * angle.cos()) as f32,
				(self.height / 2.0 + 100.0 * angle.sin()) as f32,
			);

			let idx = graph.add_node(NodeData {
				x,
				y,
				mass: 10.0,
				is_anchor: false,
				user_data: NodeInfo {
					id: node.id.clone(),
					title: node.title.clone(),
					label: node.label.clone(),
					color: color.to_owned(),
				},
			});
			id_to_idx.insert(node.id.as_str(), idx);
		}

		let range = model.weight_range();
		self.links = model
			.links
			.iter()
			.filter_map(|link| {
				let source = *id_to_idx.get(link.source.as_str())?;
				let target = *id_to_idx.get(link.target.as_str())?;
				graph.add_edge(source, target, EdgeData::default());
				Some(LinkInfo {
					source,
					target,
					width: edge_width(link.weight, range),
				})
			})
			.collect();

		self.graph = graph;
		self.iterations = 0;
		self.stabilizing = self.physics;
		debug!(
			"layout loaded {} nodes and {} edges",
			model.nodes.len(),
			self.links.len()
		);
	}

	fn set_physics(&mut self, enabled: bool) {
		self.physics = enabled;
		if !enabled {
			self.stabilizing = false;
		}
	}

	fn physics_enabled(&self) -> bool {
		self.physics
	}

	fn stabilize(&mut self) -> Option<LayoutProgress> {
		if !self.stabilizing {
			return None;
		}
		let total = self.options.stabilization_iterations;
		let batch = self.options.iterations_per_frame.max(1);
		let until = (self.iterations + batch).min(total);
		let mut settled = self.node_count() == 0;

		while !settled && self.iterations < until {
			settled = self.step() < self.options.settle_threshold;
			self.iterations += 1;
		}

		if settled || self.iterations >= total {
			self.stabilizing = false;
			Some(LayoutProgress::Done)
		} else {
			Some(LayoutProgress::Progress {
				iterations: self.iterations,
				total,
			})
		}
	}
}

fn edge_width(weight: Option<f64>, range: Option<(f64, f64)>) -> f64 {
	let (Some(w), Some((lo, hi))) = (weight, range) else {
		return MIN_EDGE_WIDTH;
	};
	let scale = if hi > lo { (w - lo) / (hi - lo) } else { 0.5 };
	MIN_EDGE_WIDTH + (MAX_EDGE_WIDTH - MIN_EDGE_WIDTH) * scale
}
