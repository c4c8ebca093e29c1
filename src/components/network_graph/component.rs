use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::render;
use super::view::{CanvasView, Gesture};
use crate::components::progress::GraphStatus;
use crate::config::LayoutOptions;
use crate::session::{ForceLayout, LifecycleController};

/// Controller shared between a page and its canvas.
pub type SharedController = Rc<RefCell<LifecycleController<ForceLayout>>>;

const FRAME_SECONDS: f64 = 0.016;

/// Canvas bound to a controller's rendering session. Creates the session's
/// layout instance on mount and drives stabilization once per frame. The
/// canvas follows its container (or the window when `fullscreen`) on every
/// frame, so dashboard tile resizes are picked up without a window event.
#[component]
pub fn NetworkGraphCanvas(
	controller: SharedController,
	status: GraphStatus,
	#[prop(default = LayoutOptions::standalone())] options: LayoutOptions,
	#[prop(default = false)] fullscreen: bool,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let view_state = Rc::new(RefCell::new(CanvasView::new()));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let (ctl_init, view_init, animate_init) =
		(controller.clone(), view_state.clone(), animate.clone());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};
		let (w, h) = canvas_size(&window, &canvas, fullscreen);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			log::error!("canvas has no 2d context");
			return;
		};
		ctl_init
			.borrow_mut()
			.session_mut()
			.ensure_instance(|| ForceLayout::new(options.clone(), w, h))
			.resize(w, h);

		let (ctl_anim, view_anim, animate_inner) =
			(ctl_init.clone(), view_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			let Some(win) = web_sys::window() else {
				return;
			};
			let running = {
				let mut ctl = ctl_anim.borrow_mut();
				ctl.tick();
				status.publish(&*ctl);
				let mut view = view_anim.borrow_mut();
				view.tick(FRAME_SECONDS);
				match ctl.session_mut().instance_mut() {
					Some(layout) => {
						fit_canvas(&win, &canvas, layout, fullscreen);
						render::render(layout, &view, &ctx);
						true
					}
					// session torn down: stop the loop
					None => false,
				}
			};
			if !running {
				return;
			}
			if let Some(cb) = &*animate_inner.borrow() {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(cb) = &*animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let (ctl_md, view_md) = (controller.clone(), view_state.clone());
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = local_point(canvas_ref, ev.client_x(), ev.client_y()) else {
			return;
		};
		let ctl = ctl_md.borrow();
		let Some(layout) = ctl.session().instance() else {
			return;
		};
		let mut view = view_md.borrow_mut();
		let (gx, gy) = view.camera.to_graph(x, y);
		let hit = layout
			.node_at(gx, gy)
			.and_then(|idx| Some((idx, layout.position(idx)?)));
		view.press(x, y, hit);
	};

	let (ctl_mm, view_mm) = (controller.clone(), view_state.clone());
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = local_point(canvas_ref, ev.client_x(), ev.client_y()) else {
			return;
		};
		let mut ctl = ctl_mm.borrow_mut();
		let Some(layout) = ctl.session_mut().instance_mut() else {
			return;
		};
		let mut view = view_mm.borrow_mut();

		if view.gesture == Gesture::Idle {
			let (gx, gy) = view.camera.to_graph(x, y);
			let hovered = layout.node_at(gx, gy);
			let neighbors = hovered.map(|idx| layout.neighbors(idx)).unwrap_or_default();
			view.spotlight.focus(hovered, neighbors);
		}
		if let Some((node, nx, ny)) = view.pointer_moved(x, y) {
			layout.move_node(node, nx as f32, ny as f32);
		}
	};

	let view_mu = view_state.clone();
	let on_mouseup = move |_: MouseEvent| view_mu.borrow_mut().release();

	let view_ml = view_state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		let mut view = view_ml.borrow_mut();
		view.release();
		view.spotlight.focus(None, Default::default());
	};

	let view_wh = view_state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = local_point(canvas_ref, ev.client_x(), ev.client_y()) else {
			return;
		};
		let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
		view_wh.borrow_mut().camera.zoom_at(x, y, factor);
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="network-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}

const FALLBACK_SIZE: (f64, f64) = (800.0, 600.0);

fn canvas_size(window: &Window, canvas: &HtmlCanvasElement, fullscreen: bool) -> (f64, f64) {
	let measured = if fullscreen {
		let dim = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64());
		(dim(window.inner_width()), dim(window.inner_height()))
	} else {
		let parent = canvas.parent_element();
		(
			parent.as_ref().map(|p| p.client_width() as f64),
			parent.as_ref().map(|p| p.client_height() as f64),
		)
	};
	usable_size(measured)
}

/// Measured size with unknown or collapsed dimensions replaced by defaults.
fn usable_size((w, h): (Option<f64>, Option<f64>)) -> (f64, f64) {
	let pick = |v: Option<f64>, fallback| v.filter(|v| *v > 0.0).unwrap_or(fallback);
	(pick(w, FALLBACK_SIZE.0), pick(h, FALLBACK_SIZE.1))
}

/// The size the canvas should take, or `None` when it already matches.
fn resize_target(current: (f64, f64), measured: (f64, f64)) -> Option<(f64, f64)> {
	(current != measured).then_some(measured)
}

/// Match the canvas and layout to the current container size.
fn fit_canvas(window: &Window, canvas: &HtmlCanvasElement, layout: &mut ForceLayout, fullscreen: bool) {
	let Some((w, h)) = resize_target(layout.size(), canvas_size(window, canvas, fullscreen)) else {
		return;
	};
	canvas.set_width(w as u32);
	canvas.set_height(h as u32);
	layout.resize(w, h);
}

fn local_point(
	canvas_ref: NodeRef<leptos::html::Canvas>,
	client_x: i32,
	client_y: i32,
) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((client_x as f64 - rect.left(), client_y as f64 - rect.top()))
}
