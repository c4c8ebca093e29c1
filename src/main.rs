//! Standalone app entry point.

fn main() {
	network_graph::init_logging();
	leptos::mount::mount_to_body(network_graph::App);
}
