use std::f64::consts::TAU;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::view::CanvasView;
use crate::session::ForceLayout;
use crate::session::layout::{LinkInfo, NODE_RADIUS, NodeInfo};

const BACKGROUND: &str = "#14161f";
const EDGE_RGB: &str = "140, 160, 190";
const DASH: f64 = 8.0;
const GAP: f64 = 4.0;
const ARROW: f64 = 8.0;
/// Dash offset advance, in pixels per second.
const FLOW_SPEED: f64 = 30.0;

fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

/// Draw one frame of the layout as seen through the view's camera.
pub fn render(layout: &ForceLayout, view: &CanvasView, ctx: &CanvasRenderingContext2d) {
	let (width, height) = layout.size();
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, width, height);

	let camera = &view.camera;
	ctx.save();
	let _ = ctx.translate(camera.offset_x, camera.offset_y);
	let _ = ctx.scale(camera.zoom, camera.zoom);
	let strength = ease_out_cubic(view.spotlight.strength);
	draw_links(layout, view, strength, ctx);
	draw_nodes(layout, view, strength, ctx);
	draw_tooltip(layout, view, ctx);
	ctx.restore();
}

fn draw_links(layout: &ForceLayout, view: &CanvasView, strength: f64, ctx: &CanvasRenderingContext2d) {
	let zoom = view.camera.zoom;
	let dash = [DASH / zoom, GAP / zoom];
	let period = dash[0] + dash[1];
	let pattern = js_sys::Array::of2(&JsValue::from_f64(dash[0]), &JsValue::from_f64(dash[1]));
	let positions = layout.positions();

	for link in layout.links() {
		let (Some(&from), Some(&to)) = (positions.get(&link.source), positions.get(&link.target))
		else {
			continue;
		};
		let lit = view.spotlight.is_lit(link.source) && view.spotlight.is_lit(link.target);
		// lit edges brighten and thicken, the rest recede
		let emphasis = if lit { strength } else { -strength };
		let alpha = (0.6 + 0.35 * emphasis).clamp(0.1, 1.0);
		let width = link.width * 1.5 / zoom * (1.0 + 0.3 * emphasis);

		ctx.set_stroke_style_str(&format!("rgba({EDGE_RGB}, {alpha})"));
		ctx.set_line_width(width);
		let _ = ctx.set_line_dash(&pattern);
		ctx.set_line_dash_offset(-(view.flow_time * FLOW_SPEED) % period);
		stroke_link(link, from, to, zoom, alpha, ctx);
	}
	let _ = ctx.set_line_dash(&js_sys::Array::new());
}

/// Dashed shaft plus a solid arrowhead at the target's rim.
fn stroke_link(
	link: &LinkInfo,
	(x1, y1): (f64, f64),
	(x2, y2): (f64, f64),
	zoom: f64,
	alpha: f64,
	ctx: &CanvasRenderingContext2d,
) {
	let (dx, dy) = (x2 - x1, y2 - y1);
	let length = dx.hypot(dy);
	if length < 0.001 || link.source == link.target {
		return;
	}
	let (ux, uy) = (dx / length, dy / length);
	let head = ARROW / zoom;
	let tip = (x2 - ux * NODE_RADIUS, y2 - uy * NODE_RADIUS);
	let base = (tip.0 - ux * head, tip.1 - uy * head);

	ctx.begin_path();
	ctx.move_to(x1 + ux * NODE_RADIUS, y1 + uy * NODE_RADIUS);
	ctx.line_to(base.0, base.1);
	ctx.stroke();

	let _ = ctx.set_line_dash(&js_sys::Array::new());
	let (px, py) = (-uy * head / 2.0, ux * head / 2.0);
	ctx.set_fill_style_str(&format!("rgba({EDGE_RGB}, {})", (alpha + 0.2).min(1.0)));
	ctx.begin_path();
	ctx.move_to(tip.0, tip.1);
	ctx.line_to(base.0 + px, base.1 + py);
	ctx.line_to(base.0 - px, base.1 - py);
	ctx.close_path();
	ctx.fill();
}

/// Unlit nodes first, dimmed while a spotlight is on; lit ones on top.
fn draw_nodes(layout: &ForceLayout, view: &CanvasView, strength: f64, ctx: &CanvasRenderingContext2d) {
	let spotlight = &view.spotlight;
	let zoom = view.camera.zoom;
	let font = format!("{}px sans-serif", 10.0 / zoom.max(0.5));
	ctx.set_font(&font);

	let mut lit = Vec::new();
	layout.graph().visit_nodes(|node| {
		let idx = node.index();
		let (x, y) = (node.x() as f64, node.y() as f64);
		let info = &node.data.user_data;
		if spotlight.is_active() && spotlight.is_lit(idx) {
			lit.push((idx, x, y, info.clone()));
			return;
		}
		let alpha = 1.0 - 0.7 * strength;
		ctx.set_global_alpha(alpha);
		disc(ctx, x, y, NODE_RADIUS * (1.0 - 0.15 * strength), &info.color);
		ctx.set_global_alpha(1.0);
		caption(ctx, info, x, y, &format!("rgba(255, 255, 255, {})", alpha * 0.8));
	});

	for (idx, x, y, info) in lit {
		let center = spotlight.is_center(idx);
		let (grow, halo) = if center { (0.35, 1.8 + 1.2 * strength) } else { (0.2, 1.4 + 0.6 * strength) };
		let radius = NODE_RADIUS * (1.0 + grow * strength);
		if strength > 0.01 {
			let alpha = if center { 0.35 } else { 0.2 };
			glow(ctx, x, y, radius, NODE_RADIUS * halo, alpha * strength);
		}
		disc(ctx, x, y, radius, &info.color);
		if center && strength > 0.01 {
			ctx.begin_path();
			let _ = ctx.arc(x, y, radius + 2.0 / zoom, 0.0, TAU);
			ctx.set_stroke_style_str(&format!("rgba(255, 255, 255, {})", 0.7 * strength));
			ctx.set_line_width(1.5 / zoom);
			ctx.stroke();
		}
		caption(ctx, &info, x, y, "white");
	}
}

fn disc(ctx: &CanvasRenderingContext2d, x: f64, y: f64, radius: f64, color: &str) {
	ctx.begin_path();
	let _ = ctx.arc(x, y, radius, 0.0, TAU);
	ctx.set_fill_style_str(color);
	ctx.fill();
}

fn glow(ctx: &CanvasRenderingContext2d, x: f64, y: f64, inner: f64, outer: f64, alpha: f64) {
	let Ok(gradient) = ctx.create_radial_gradient(x, y, inner * 0.3, x, y, outer) else {
		return;
	};
	let _ = gradient.add_color_stop(0.0, &format!("rgba(255, 255, 255, {alpha})"));
	let _ = gradient.add_color_stop(1.0, "rgba(255, 255, 255, 0)");
	ctx.begin_path();
	let _ = ctx.arc(x, y, outer, 0.0, TAU);
	#[allow(deprecated)]
	ctx.set_fill_style(&gradient);
	ctx.fill();
}

/// Permanent label, only for nodes whose role shows labels.
fn caption(ctx: &CanvasRenderingContext2d, info: &NodeInfo, x: f64, y: f64, color: &str) {
	if let Some(label) = &info.label {
		ctx.set_fill_style_str(color);
		let _ = ctx.fill_text(label, x + NODE_RADIUS + 3.0, y + 3.0);
	}
}

/// Title box next to the hovered node.
fn draw_tooltip(layout: &ForceLayout, view: &CanvasView, ctx: &CanvasRenderingContext2d) {
	let Some(idx) = view.spotlight.hovered() else {
		return;
	};
	let (Some((x, y)), Some(info)) = (layout.position(idx), layout.node_info(idx)) else {
		return;
	};
	let zoom = view.camera.zoom;
	let text = info.tooltip();
	let font_size = 12.0 / zoom;
	ctx.set_font(&format!("{font_size}px sans-serif"));
	let text_width = ctx
		.measure_text(text)
		.map(|m| m.width())
		.unwrap_or(text.len() as f64 * font_size * 0.6);

	let pad = 4.0 / zoom;
	let (bx, by) = (x + NODE_RADIUS * 2.0, y - NODE_RADIUS * 2.0 - font_size - pad * 2.0);
	ctx.set_fill_style_str("rgba(255, 255, 255, 0.92)");
	ctx.fill_rect(bx, by, text_width + pad * 2.0, font_size + pad * 2.0);
	ctx.set_fill_style_str(BACKGROUND);
	let _ = ctx.fill_text(text, bx + pad, by + pad + font_size * 0.85);
}
