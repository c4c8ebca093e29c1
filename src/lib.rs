//! Network graph visualization for query results.
//!
//! Rows from a query are turned into a source/target graph ([`graph`]), laid
//! out by a force simulation that runs a bounded stabilization pass after
//! every data change ([`session`]). Two shells drive it: a standalone page
//! that fetches results itself ([`App`]) and a dashboard plugin that is
//! pushed rows by its host ([`plugin`]).

use leptos::prelude::*;
use leptos_meta::*;
use leptos_router::components::*;
use leptos_router::path;
use log::{Level, info};

pub mod config;
pub mod error;
pub mod graph;
pub mod host;
pub mod plugin;
pub mod session;

mod components;
mod pages;

use crate::pages::home::Home;
use crate::pages::not_found::NotFound;

/// Initialize logging and panic hooks for the WASM target. Safe to call from
/// both shells; only the first call installs the logger.
pub fn init_logging() {
	if console_log::init_with_level(Level::Debug).is_ok() {
		info!("Logging initialized");
	}
	console_error_panic_hook::set_once();
}

/// Standalone router: `/` shows an empty canvas, `/:slug` runs that query.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />
		<Title text="Network Graph" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<Router>
			<Routes fallback=|| view! { <NotFound /> }>
				<Route path=path!("/") view=Home />
				<Route path=path!("/:slug") view=Home />
			</Routes>
		</Router>
	}
}
