//! Queries against the hosting browser page.
//!
//! Every lookup returns `Option` (or a conservative default) instead of
//! failing: the background is decorative and must never break the page.

use log::{info, warn};
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

use super::config::ParticleConfig;
use super::particles::SurfaceSize;

/// Element id of the optional JSON configuration block.
pub const CONFIG_ELEMENT_ID: &str = "particle-config";

/// Whether the user asked the OS/browser to minimize motion.
pub fn prefers_reduced_motion(window: &Window) -> bool {
	window
		.match_media("(prefers-reduced-motion: reduce)")
		.ok()
		.flatten()
		.is_some_and(|query| query.matches())
}

/// Path of the current page, e.g. `/` or `/projects`.
pub fn current_path(window: &Window) -> Option<String> {
	window.location().pathname().ok()
}

/// Inner size of the browser window in CSS pixels.
pub fn viewport_size(window: &Window) -> Option<SurfaceSize> {
	Some(SurfaceSize::new(
		window.inner_width().ok()?.as_f64()?,
		window.inner_height().ok()?.as_f64()?,
	))
}

/// Seed for a new population, from the browser's `Math.random`.
pub fn random_seed() -> u64 {
	(js_sys::Math::random() * u64::MAX as f64) as u64
}

/// Consult reduced-motion and route once, at startup.
pub fn startup_allowed(window: &Window, config: &ParticleConfig) -> bool {
	let reduced_motion = prefers_reduced_motion(window);
	let path = current_path(window).unwrap_or_default();
	let allowed = config.gate.permits(reduced_motion, &path);
	if !allowed {
		info!(
			"particle-wave: not starting on {:?} (reduced motion: {})",
			path, reduced_motion
		);
	}
	allowed
}

/// Load configuration from a `<script id="particle-config">` JSON block.
///
/// Returns `None` when the block is absent or malformed.
pub fn load_config() -> Option<ParticleConfig> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id(CONFIG_ELEMENT_ID)?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	let json_text = script.text().ok()?;

	match serde_json::from_str::<ParticleConfig>(&json_text) {
		Ok(config) => {
			info!("particle-wave: loaded configuration from #{}", CONFIG_ELEMENT_ID);
			Some(config)
		}
		Err(e) => {
			warn!("particle-wave: failed to parse configuration: {}", e);
			None
		}
	}
}
