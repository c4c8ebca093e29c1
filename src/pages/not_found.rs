use leptos::prelude::*;

/// 404 page
#[component]
pub fn NotFound() -> impl IntoView {
	view! {
		<div class="not-found">
			<h1>"Nothing here"</h1>
			<p>"Open this app with a query slug, e.g. " <code>"/abc123"</code> "."</p>
		</div>
	}
}
