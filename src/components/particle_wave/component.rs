//! Browser runtime and Leptos component for the particle background.
//!
//! [`start`] creates a fixed, non-interactive canvas behind the page content,
//! wires a window resize listener, and drives the simulation through
//! `requestAnimationFrame`. The returned [`ParticleWaveHandle`] owns all of it
//! until [`ParticleWaveHandle::destroy`] is called.

use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::{info, warn};
use send_wrapper::SendWrapper;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, Window};

use super::config::{LayerStyle, ParticleConfig};
use super::host;
use super::particles::SurfaceSize;
use super::state::ParticleSimulation;

/// Element id of the background canvas.
pub const CANVAS_ID: &str = "particle-canvas";

/// Everything one running background owns.
struct Runtime {
	simulation: ParticleSimulation,
	canvas: HtmlCanvasElement,
	ctx: Option<CanvasRenderingContext2d>,
	frame_id: Option<i32>,
}

type SharedClosure = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

/// Handle to a running particle background.
///
/// Clones share the same background. Dropping the handle does not stop the
/// animation; call [`destroy`](Self::destroy).
#[derive(Clone)]
pub struct ParticleWaveHandle {
	runtime: Rc<RefCell<Option<Runtime>>>,
	animate: SharedClosure,
	resize_cb: SharedClosure,
}

/// Create the background canvas and start animating.
///
/// Returns `None` when there is no window, document or body to attach to. If
/// the canvas has no 2D context the handle is still returned, but nothing is
/// drawn or scheduled.
pub fn start(config: ParticleConfig) -> Option<ParticleWaveHandle> {
	let Some(window) = web_sys::window() else {
		warn!("particle-wave: no window, not starting");
		return None;
	};
	let Some(document) = window.document() else {
		warn!("particle-wave: no document, not starting");
		return None;
	};
	let Some(body) = document.body() else {
		warn!("particle-wave: no document body, not starting");
		return None;
	};

	let canvas: HtmlCanvasElement = document.create_element("canvas").ok()?.dyn_into().ok()?;
	canvas.set_id(CANVAS_ID);
	apply_layer_style(&canvas, &config.layer);
	let _ = body.prepend_with_node_1(&canvas);

	let size = host::viewport_size(&window).unwrap_or_default();
	size_canvas(&canvas, size);

	let ctx = canvas
		.get_context("2d")
		.ok()
		.flatten()
		.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok());
	if ctx.is_none() {
		warn!("particle-wave: 2d context unavailable, background disabled");
	}

	let class = config.density.class_for(size.width);
	let simulation = ParticleSimulation::new(config, size, class, host::random_seed());
	let rendering = ctx.is_some();

	let handle = ParticleWaveHandle {
		runtime: Rc::new(RefCell::new(Some(Runtime {
			simulation,
			canvas,
			ctx,
			frame_id: None,
		}))),
		animate: Rc::new(RefCell::new(None)),
		resize_cb: Rc::new(RefCell::new(None)),
	};

	if rendering {
		handle.listen_for_resize(&window);
		handle.schedule_frames(&window);
		info!("particle-wave: started at {}x{}", size.width, size.height);
	}
	Some(handle)
}

fn apply_layer_style(canvas: &HtmlCanvasElement, layer: &LayerStyle) {
	let style = web_sys::HtmlElement::style(canvas);
	let mut props = vec![
		("position", "fixed".to_string()),
		("top", "0".to_string()),
		("left", "0".to_string()),
		("width", "100%".to_string()),
		("height", "100%".to_string()),
		("z-index", layer.z_index.to_string()),
		("pointer-events", "none".to_string()),
		("opacity", layer.opacity.to_string()),
	];
	if layer.blur_px > 0.0 {
		props.push(("filter", format!("blur({}px)", layer.blur_px)));
	}
	for (name, value) in props {
		let _ = style.set_property(name, &value);
	}
}

fn size_canvas(canvas: &HtmlCanvasElement, size: SurfaceSize) {
	canvas.set_width(size.width.max(0.0) as u32);
	canvas.set_height(size.height.max(0.0) as u32);
}

fn resize_runtime(runtime: &RefCell<Option<Runtime>>, size: SurfaceSize) {
	if let Some(ref mut rt) = *runtime.borrow_mut() {
		size_canvas(&rt.canvas, size);
		rt.simulation.resize(size);
	}
}

impl ParticleWaveHandle {
	fn listen_for_resize(&self, window: &Window) {
		let runtime = self.runtime.clone();
		*self.resize_cb.borrow_mut() = Some(Closure::new(move || {
			if let Some(size) = web_sys::window().and_then(|w| host::viewport_size(&w)) {
				resize_runtime(&runtime, size);
			}
		}));
		if let Some(ref cb) = *self.resize_cb.borrow() {
			let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}
	}

	fn schedule_frames(&self, window: &Window) {
		let (runtime, animate_inner) = (self.runtime.clone(), self.animate.clone());
		*self.animate.borrow_mut() = Some(Closure::new(move || {
			let mut slot = runtime.borrow_mut();
			let Some(rt) = slot.as_mut() else {
				return;
			};
			rt.frame_id = None;
			let Some(ctx) = rt.ctx.as_mut() else {
				return;
			};
			if !rt.simulation.tick(ctx) {
				return;
			}
			if let Some(ref cb) = *animate_inner.borrow() {
				rt.frame_id = web_sys::window()
					.and_then(|w| w.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
			}
		}));
		if let Some(ref cb) = *self.animate.borrow() {
			let id = window.request_animation_frame(cb.as_ref().unchecked_ref()).ok();
			if let Some(ref mut rt) = *self.runtime.borrow_mut() {
				rt.frame_id = id;
			}
		}
	}

	/// Resize the canvas and rebuild the population for `size`.
	pub fn resize(&self, size: SurfaceSize) {
		resize_runtime(&self.runtime, size);
	}

	/// Stop the animation, detach listeners, and remove the canvas.
	///
	/// Safe to call any number of times.
	pub fn destroy(&self) {
		let Some(mut rt) = self.runtime.borrow_mut().take() else {
			return;
		};
		rt.simulation.destroy();

		if let Some(window) = web_sys::window() {
			if let Some(id) = rt.frame_id.take() {
				let _ = window.cancel_animation_frame(id);
			}
			if let Some(ref cb) = *self.resize_cb.borrow() {
				let _ = window
					.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}
		rt.canvas.remove();

		// Drops the frame closure's reference to itself
		self.animate.borrow_mut().take();
		self.resize_cb.borrow_mut().take();
		info!("particle-wave: stopped");
	}
}

/// Mounts the particle background for as long as the component lives.
///
/// Startup is skipped when the user prefers reduced motion or the current path
/// is not allowed by the configuration's route gate. The background is torn
/// down when the component is cleaned up, e.g. on client-side navigation.
#[component]
pub fn ParticleWaveBackground(
	/// Configuration; defaults to the grid wave preset.
	#[prop(optional)]
	config: Option<ParticleConfig>,
) -> impl IntoView {
	let handle: Rc<RefCell<Option<ParticleWaveHandle>>> = Rc::new(RefCell::new(None));
	let handle_init = handle.clone();

	Effect::new(move |_| {
		if handle_init.borrow().is_some() {
			return;
		}
		let config = config.clone().unwrap_or_default();
		let Some(window) = web_sys::window() else {
			return;
		};
		if host::startup_allowed(&window, &config) {
			*handle_init.borrow_mut() = start(config);
		}
	});

	let handle_cleanup = SendWrapper::new(handle);
	on_cleanup(move || {
		let taken = handle_cleanup.borrow_mut().take();
		if let Some(h) = taken {
			h.destroy();
		}
	});
}
