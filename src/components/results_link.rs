use leptos::prelude::*;

use crate::host::link::full_app_url;

/// "View more results" link from a dashboard tile to the full-page app.
#[component]
pub fn ResultsLink() -> impl IntoView {
	let href = web_sys::window().and_then(|window| {
		let origin = window.location().origin().ok()?;
		let referrer = window.document()?.referrer();
		log::debug!("embedding page: {referrer}");
		full_app_url(&origin, &referrer)
	});

	view! {
		<div class="link-to-full">
			{href.map(|href| view! { <a href=href target="_blank">"View more results"</a> })}
		</div>
	}
}
