//! Link from a dashboard tile to the full-page app for the same query.

/// Registered name of the standalone app.
pub const EXTENSION_NAME: &str = "network-graph-ef-viz::network-graph-ef-viz";

/// Query slug from the embedding page's URL (`...qid=<slug>&...`).
pub fn slug_from_referrer(referrer: &str) -> Option<&str> {
	let start = referrer.rfind("qid=")? + "qid=".len();
	let slug = referrer[start..].split('&').next()?;
	(!slug.is_empty()).then_some(slug)
}

/// Standalone app URL for the query the embedding page shows.
pub fn full_app_url(origin: &str, referrer: &str) -> Option<String> {
	let slug = slug_from_referrer(referrer)?;
	Some(format!("{origin}/extensions/{EXTENSION_NAME}/{slug}"))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn picks_last_qid_parameter() {
		assert_eq!(
			slug_from_referrer("https://bi.example.com/explore/m/v?qid=abc123&toggle=vis"),
			Some("abc123")
		);
		assert_eq!(
			slug_from_referrer("https://x/?qid=old&next=1&qid=new"),
			Some("new")
		);
		assert_eq!(slug_from_referrer("https://x/?qid=&a=1"), None);
		assert_eq!(slug_from_referrer("https://x/dashboards/1"), None);
	}

	#[test]
	fn builds_extension_url() {
		assert_eq!(
			full_app_url("https://bi.example.com", "https://bi.example.com/x?qid=s1").as_deref(),
			Some("https://bi.example.com/extensions/network-graph-ef-viz::network-graph-ef-viz/s1")
		);
		assert_eq!(full_app_url("https://bi.example.com", ""), None);
	}
}
