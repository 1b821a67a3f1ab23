//! particle-wave: animated particle background for the site's pages.
//!
//! This crate provides a WASM-based background layer that animates a dense
//! particle field behind page content, driven by a procedural flow field.

use leptos::prelude::*;
use log::{Level, info};

pub mod components;

pub use components::particle_wave::{
	Color, DensityClass, DensityConfig, Palette, Particle, ParticleConfig, ParticleSimulation,
	ParticleWaveBackground, ParticleWaveHandle, Surface, SurfaceSize, expected_count, populate,
	render, start,
};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("particle-wave: logging initialized");
}

/// Main application component.
/// Reads the page's configuration block and mounts the background.
#[component]
pub fn App() -> impl IntoView {
	let config = components::particle_wave::host::load_config().unwrap_or_default();

	view! { <ParticleWaveBackground config=config /> }
}
