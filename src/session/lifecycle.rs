//! Phase tracking for one rendering session.
//!
//! `Idle -> Fetching -> Stabilizing -> Stable`, with `Stabilizing` entered
//! again on every apply. A fetch that fails drops back to `Idle` without
//! touching the graph already on screen.

use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

use log::{debug, trace, warn};

use super::layout::LayoutEngine;
use super::rendering::{LayoutEvent, RenderingSession};
use crate::config::RowLimit;
use crate::error::{GraphError, QueryError};
use crate::graph::{FieldMapping, Row, build_graph};
use crate::host::query::{Detached, QueryDefinition, QueryExecutor, ResultFormat};

/// Where a session is in its fetch and layout cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
	/// Nothing running; also the state after a failed fetch.
	#[default]
	Idle,
	/// Waiting on the query collaborator.
	Fetching,
	/// A layout pass is running.
	Stabilizing,
	/// Layout settled; physics is off.
	Stable,
}

/// Result of the two-step fetch, tagged with the request that started it.
pub struct FetchOutcome {
	ticket: u64,
	result: Result<(QueryDefinition, Vec<Row>), QueryError>,
}

/// Fetch started by [`LifecycleController::begin_execute`].
pub type FetchFuture = Pin<Box<dyn Future<Output = FetchOutcome>>>;

/// Drives one rendering session through its phases.
pub struct LifecycleController<L> {
	executor: Rc<dyn QueryExecutor>,
	session: RenderingSession<L>,
	phase: Phase,
	progress: f64,
	status: Option<String>,
	ticket: u64,
}

impl<L: LayoutEngine> LifecycleController<L> {
	/// Idle controller that fetches through `executor`.
	pub fn new(executor: Rc<dyn QueryExecutor>) -> Self {
		Self {
			executor,
			session: RenderingSession::new(),
			phase: Phase::Idle,
			progress: 0.0,
			status: None,
			ticket: 0,
		}
	}

	/// A controller whose data only ever arrives through [`Self::update`].
	pub fn detached() -> Self {
		Self::new(Rc::new(Detached))
	}

	/// Current phase.
	pub fn phase(&self) -> Phase {
		self.phase
	}

	/// Stabilization progress in `0.0..=1.0`; zero outside a pass.
	pub fn progress(&self) -> f64 {
		self.progress
	}

	/// Last user-facing problem, cleared by the next execute.
	pub fn status(&self) -> Option<&str> {
		self.status.as_deref()
	}

	/// The rendering session.
	pub fn session(&self) -> &RenderingSession<L> {
		&self.session
	}

	/// The rendering session, mutably.
	pub fn session_mut(&mut self) -> &mut RenderingSession<L> {
		&mut self.session
	}

	/// Start a fetch for `slug`. Returns `None` while a fetch is in flight.
	///
	/// The returned future borrows nothing from the controller; feed its
	/// output to [`Self::complete_fetch`].
	pub fn begin_execute(&mut self, slug: &str, limit: RowLimit) -> Option<FetchFuture> {
		if self.phase == Phase::Fetching {
			debug!("execute ignored: fetch already in flight");
			return None;
		}
		self.ticket += 1;
		self.status = None;
		self.set_phase(Phase::Fetching);

		let executor = Rc::clone(&self.executor);
		let slug = slug.to_owned();
		let ticket = self.ticket;
		Some(Box::pin(async move {
			let result = fetch(executor.as_ref(), &slug, limit).await;
			FetchOutcome { ticket, result }
		}))
	}

	/// Apply a finished fetch, unless a newer one was started since.
	pub fn complete_fetch(&mut self, outcome: FetchOutcome) {
		if outcome.ticket != self.ticket || self.phase != Phase::Fetching {
			trace!("dropping stale fetch {}", outcome.ticket);
			return;
		}
		match outcome.result {
			Ok((query, rows)) => {
				debug!("query {} returned {} rows", query.id, rows.len());
				if let Err(err) = self.apply(&rows, &query.mapping()) {
					self.status = Some(err.to_string());
					self.set_phase(Phase::Idle);
				}
			}
			Err(err) => {
				warn!("query failed: {err}");
				self.status = Some(err.to_string());
				self.set_phase(Phase::Idle);
			}
		}
	}

	/// Resolve, run and apply a query, releasing the borrow across awaits.
	pub async fn execute(controller: &Rc<RefCell<Self>>, slug: &str, limit: RowLimit) {
		let Some(fetch) = controller.borrow_mut().begin_execute(slug, limit) else {
			return;
		};
		let outcome = fetch.await;
		controller.borrow_mut().complete_fetch(outcome);
	}

	/// New rows or a new mapping from the host. A fetch in flight keeps the
	/// `Fetching` phase; its result will supersede this graph.
	pub fn update(&mut self, rows: &[Row], mapping: &FieldMapping) -> Result<(), GraphError> {
		self.apply(rows, mapping)
	}

	fn apply(&mut self, rows: &[Row], mapping: &FieldMapping) -> Result<(), GraphError> {
		let model = build_graph(rows, mapping)?;
		self.session.apply(model);
		self.progress = 0.0;
		if self.phase != Phase::Fetching {
			self.set_phase(Phase::Stabilizing);
		}
		Ok(())
	}

	/// Track progress and finish the pass. Events from earlier applies are ignored.
	pub fn on_layout_event(&mut self, event: LayoutEvent) {
		if event.generation() != self.session.generation() {
			trace!("ignoring layout event from generation {}", event.generation());
			return;
		}
		match event {
			LayoutEvent::Progress {
				iterations, total, ..
			} => {
				if self.phase == Phase::Stabilizing && total > 0 {
					self.progress = iterations as f64 / total as f64;
				}
			}
			LayoutEvent::Done { .. } => {
				self.session.disable_physics();
				self.progress = 0.0;
				if self.phase == Phase::Stabilizing {
					self.set_phase(Phase::Stable);
				}
			}
		}
	}

	/// Run one stabilization batch and handle what it reports.
	pub fn tick(&mut self) -> bool {
		match self.session.pump() {
			Some(event) => {
				self.on_layout_event(event);
				true
			}
			None => false,
		}
	}

	fn set_phase(&mut self, phase: Phase) {
		if self.phase != phase {
			debug!("phase {:?} -> {:?}", self.phase, phase);
			self.phase = phase;
		}
	}
}

async fn fetch(
	executor: &dyn QueryExecutor,
	slug: &str,
	limit: RowLimit,
) -> Result<(QueryDefinition, Vec<Row>), QueryError> {
	let query = executor.query_for_slug(slug).await?;
	let rows = executor
		.run_query(&query.id, ResultFormat::Json, limit)
		.await?;
	Ok((query, rows))
}

#[cfg(test)]
mod tests {
	use std::cell::Cell;

	use async_trait::async_trait;
	use futures::executor::block_on;
	use serde_json::json;

	use super::*;
	use crate::session::rendering::tests::FakeLayout;

	struct FakeQueries {
		rows: serde_json::Value,
		mapping: FieldMapping,
		fail: Cell<bool>,
		calls: RefCell<Vec<String>>,
	}

	impl FakeQueries {
		fn new(rows: serde_json::Value) -> Rc<Self> {
			Self::with_mapping(rows, FieldMapping::new("a", "b"))
		}

		fn with_mapping(rows: serde_json::Value, mapping: FieldMapping) -> Rc<Self> {
			Rc::new(Self {
				rows,
				mapping,
				fail: Cell::new(false),
				calls: RefCell::new(Vec::new()),
			})
		}
	}

	#[async_trait(?Send)]
	impl QueryExecutor for FakeQueries {
		async fn query_for_slug(&self, slug: &str) -> Result<QueryDefinition, QueryError> {
			self.calls.borrow_mut().push(format!("slug:{slug}"));
			if self.fail.get() {
				return Err(QueryError::Status { status: 404 });
			}
			Ok(QueryDefinition {
				id: "7".into(),
				vis_config: Some(self.mapping.clone()),
			})
		}

		async fn run_query(
			&self,
			query_id: &str,
			format: ResultFormat,
			limit: RowLimit,
		) -> Result<Vec<Row>, QueryError> {
			self.calls.borrow_mut().push(format!(
				"run:{query_id}:{}:{}",
				format.as_str(),
				limit.get()
			));
			serde_json::from_value(self.rows.clone()).map_err(|e| QueryError::Decode(e.to_string()))
		}
	}

	fn controller(queries: &Rc<FakeQueries>, passes: usize) -> LifecycleController<FakeLayout> {
		let executor: Rc<dyn QueryExecutor> = queries.clone();
		let mut controller = LifecycleController::new(executor);
		controller.session_mut().ensure_instance(|| FakeLayout {
			passes,
			..Default::default()
		});
		controller
	}

	fn three_rows() -> serde_json::Value {
		json!([
			{ "a": "x", "b": "y" },
			{ "a": "y", "b": "z" },
			{ "a": "x", "b": "z" },
		])
	}

	#[test]
	fn execute_fetches_then_stabilizes() {
		let queries = FakeQueries::new(three_rows());
		let mut ctl = controller(&queries, 2);
		assert_eq!(ctl.phase(), Phase::Idle);

		let fetch = ctl.begin_execute("abc", RowLimit::default()).unwrap();
		assert_eq!(ctl.phase(), Phase::Fetching);
		ctl.complete_fetch(block_on(fetch));

		assert_eq!(ctl.phase(), Phase::Stabilizing);
		assert_eq!(ctl.progress(), 0.0);
		assert_eq!(*queries.calls.borrow(), ["slug:abc", "run:7:json:200"]);
		assert_eq!(ctl.session().model().unwrap().links.len(), 3);
	}

	#[test]
	fn progress_then_done_reaches_stable() {
		let queries = FakeQueries::new(three_rows());
		let ctl = Rc::new(RefCell::new(controller(&queries, 2)));
		block_on(LifecycleController::execute(&ctl, "abc", RowLimit::new(50)));

		let mut ctl = ctl.borrow_mut();
		assert!(ctl.tick());
		assert_eq!(ctl.progress(), 0.5);
		assert!(ctl.tick());
		assert_eq!(ctl.progress(), 1.0);
		assert!(ctl.tick());

		assert_eq!(ctl.phase(), Phase::Stable);
		assert_eq!(ctl.progress(), 0.0);
		assert!(!ctl.session().instance().unwrap().physics_enabled());
		assert!(!ctl.tick());
	}

	#[test]
	fn reentrant_execute_is_ignored() {
		let queries = FakeQueries::new(three_rows());
		let mut ctl = controller(&queries, 1);
		let first = ctl.begin_execute("abc", RowLimit::default());
		assert!(first.is_some());
		assert!(ctl.begin_execute("abc", RowLimit::default()).is_none());
		assert_eq!(ctl.phase(), Phase::Fetching);
	}

	#[test]
	fn failed_fetch_keeps_previous_graph() {
		let queries = FakeQueries::new(three_rows());
		let ctl = Rc::new(RefCell::new(controller(&queries, 0)));
		block_on(LifecycleController::execute(&ctl, "abc", RowLimit::default()));
		ctl.borrow_mut().tick();
		assert_eq!(ctl.borrow().phase(), Phase::Stable);
		let before = ctl.borrow().session().model().cloned();
		let generation = ctl.borrow().session().generation();

		queries.fail.set(true);
		block_on(LifecycleController::execute(&ctl, "abc", RowLimit::default()));

		let ctl = ctl.borrow();
		assert_eq!(ctl.phase(), Phase::Idle);
		assert_eq!(ctl.status(), Some("query API returned HTTP 404"));
		assert_eq!(ctl.session().model().cloned(), before);
		assert_eq!(ctl.session().generation(), generation);
	}

	#[test]
	fn missing_endpoints_after_fetch_returns_to_idle() {
		let queries = FakeQueries::with_mapping(three_rows(), FieldMapping::new("", "b"));
		let ctl = Rc::new(RefCell::new(controller(&queries, 1)));
		block_on(LifecycleController::execute(&ctl, "abc", RowLimit::default()));

		let ctl = ctl.borrow();
		assert_eq!(ctl.phase(), Phase::Idle);
		assert!(ctl.session().model().is_none());
		assert!(ctl.status().is_some());
	}

	#[test]
	fn stale_layout_events_are_ignored() {
		let mut ctl = LifecycleController::<FakeLayout>::detached();
		ctl.session_mut().ensure_instance(|| FakeLayout {
			passes: 3,
			..Default::default()
		});
		let rows: Vec<Row> = serde_json::from_value(three_rows()).unwrap();
		let mapping = FieldMapping::new("a", "b");

		ctl.update(&rows, &mapping).unwrap();
		let old = ctl.session().generation();
		ctl.update(&rows, &mapping).unwrap();

		ctl.on_layout_event(LayoutEvent::Done { generation: old });
		assert_eq!(ctl.phase(), Phase::Stabilizing);

		ctl.on_layout_event(LayoutEvent::Progress {
			generation: old,
			iterations: 2,
			total: 3,
		});
		assert_eq!(ctl.progress(), 0.0);
	}

	#[test]
	fn update_on_stable_graph_restarts_stabilization() {
		let mut ctl = LifecycleController::<FakeLayout>::detached();
		ctl.session_mut().ensure_instance(FakeLayout::default);
		let rows: Vec<Row> = serde_json::from_value(three_rows()).unwrap();

		ctl.update(&rows, &FieldMapping::new("a", "b")).unwrap();
		ctl.tick();
		assert_eq!(ctl.phase(), Phase::Stable);

		ctl.update(&rows, &FieldMapping::new("b", "a")).unwrap();
		assert_eq!(ctl.phase(), Phase::Stabilizing);
		assert!(ctl.session().instance().unwrap().physics_enabled());
		assert_eq!(ctl.session().instance().unwrap().loads, 2);
	}

	#[test]
	fn update_during_fetch_keeps_fetching() {
		let queries = FakeQueries::new(three_rows());
		queries.fail.set(true);
		let mut ctl = controller(&queries, 1);
		let rows: Vec<Row> = serde_json::from_value(json!([{ "a": "p", "b": "q" }])).unwrap();

		let fetch = ctl.begin_execute("abc", RowLimit::default()).unwrap();
		ctl.update(&rows, &FieldMapping::new("a", "b")).unwrap();
		assert_eq!(ctl.phase(), Phase::Fetching);
		assert_eq!(ctl.session().model().unwrap().links.len(), 1);

		ctl.complete_fetch(block_on(fetch));
		assert_eq!(ctl.phase(), Phase::Idle);
		assert_eq!(ctl.session().model().unwrap().links.len(), 1);
	}

	#[test]
	fn fetch_result_supersedes_update_applied_while_fetching() {
		let queries = FakeQueries::new(three_rows());
		let mut ctl = controller(&queries, 1);
		let rows: Vec<Row> = serde_json::from_value(json!([{ "a": "p", "b": "q" }])).unwrap();

		let fetch = ctl.begin_execute("abc", RowLimit::default()).unwrap();
		ctl.update(&rows, &FieldMapping::new("a", "b")).unwrap();
		ctl.complete_fetch(block_on(fetch));

		assert_eq!(ctl.phase(), Phase::Stabilizing);
		assert_eq!(ctl.session().model().unwrap().links.len(), 3);
	}

	#[test]
	fn reapply_mid_stabilization_resets_progress() {
		let mut ctl = LifecycleController::<FakeLayout>::detached();
		ctl.session_mut().ensure_instance(|| FakeLayout {
			passes: 4,
			..Default::default()
		});
		let rows: Vec<Row> = serde_json::from_value(three_rows()).unwrap();
		let mapping = FieldMapping::new("a", "b");

		ctl.update(&rows, &mapping).unwrap();
		ctl.tick();
		ctl.tick();
		assert_eq!(ctl.progress(), 0.5);

		ctl.update(&rows, &mapping).unwrap();
		assert_eq!(ctl.phase(), Phase::Stabilizing);
		assert_eq!(ctl.progress(), 0.0);

		ctl.tick();
		assert_eq!(ctl.progress(), 0.25);
		assert_eq!(ctl.phase(), Phase::Stabilizing);
	}

	#[test]
	fn update_without_endpoints_renders_nothing() {
		let mut ctl = LifecycleController::<FakeLayout>::detached();
		assert_eq!(
			ctl.update(&[], &FieldMapping::default()),
			Err(GraphError::MissingEndpoints)
		);
		assert_eq!(ctl.phase(), Phase::Idle);
		assert!(ctl.session().model().is_none());
	}

	#[test]
	fn detached_execute_fails_softly() {
		let ctl = Rc::new(RefCell::new(LifecycleController::<FakeLayout>::detached()));
		block_on(LifecycleController::execute(&ctl, "abc", RowLimit::default()));
		assert_eq!(ctl.borrow().phase(), Phase::Idle);
		assert!(ctl.borrow().status().is_some());
	}
}
