//! Simulation configuration.
//!
//! One [`ParticleConfig`] covers every variant of the background: the grid
//! wave shipped on the landing page, a dense flow field that fills the whole
//! page, and a flock drawn towards the middle of the screen. Each variant is a
//! preset; all fields can also be overridden from JSON.

use serde::Deserialize;

use super::theme::Palette;

/// Viewport size bucket that selects particle count and grid spacing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DensityClass {
	/// Narrower than the mobile breakpoint.
	Mobile,
	/// At or above the mobile breakpoint.
	Desktop,
}

/// Particle density per viewport class.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct DensityConfig {
	/// Viewports narrower than this (in CSS pixels) count as mobile.
	pub mobile_breakpoint: f64,
	/// Particle count for the uniform policy on mobile.
	pub mobile_count: usize,
	/// Particle count for the uniform policy on desktop.
	pub desktop_count: usize,
	/// Grid spacing in pixels on mobile.
	pub mobile_spacing: f64,
	/// Grid spacing in pixels on desktop. Smaller means more particles.
	pub desktop_spacing: f64,
}

impl Default for DensityConfig {
	fn default() -> Self {
		Self {
			mobile_breakpoint: 768.0,
			mobile_count: 1000,
			desktop_count: 2500,
			mobile_spacing: 15.0,
			desktop_spacing: 10.0,
		}
	}
}

impl DensityConfig {
	/// Classify a viewport by its width.
	pub fn class_for(&self, viewport_width: f64) -> DensityClass {
		if viewport_width < self.mobile_breakpoint {
			DensityClass::Mobile
		} else {
			DensityClass::Desktop
		}
	}

	/// Particle count for the uniform policy.
	pub fn count(&self, class: DensityClass) -> usize {
		match class {
			DensityClass::Mobile => self.mobile_count,
			DensityClass::Desktop => self.desktop_count,
		}
	}

	/// Grid spacing for the grid policy.
	pub fn spacing(&self, class: DensityClass) -> f64 {
		match class {
			DensityClass::Mobile => self.mobile_spacing,
			DensityClass::Desktop => self.desktop_spacing,
		}
	}
}

/// Where uniformly scattered particles are placed.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Placement {
	/// Anywhere on the surface.
	FullSurface,
	/// Inside a rectangle centered on the surface, `spread` times its extent.
	Centered {
		/// Region size relative to the surface; values below 1.0 are raised to 1.0.
		spread: f64,
	},
}

impl Placement {
	/// Returns `(min_x, min_y, max_x, max_y)` of the placement region.
	pub fn region(&self, width: f64, height: f64) -> (f64, f64, f64, f64) {
		match self {
			Placement::FullSurface => (0.0, 0.0, width, height),
			Placement::Centered { spread } => {
				let spread = spread.max(1.0);
				let (half_w, half_h) = (width * spread / 2.0, height * spread / 2.0);
				let (cx, cy) = (width / 2.0, height / 2.0);
				(cx - half_w, cy - half_h, cx + half_w, cy + half_h)
			}
		}
	}
}

/// How the initial population is laid out.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PopulationPolicy {
	/// Regular grid with per-particle jitter.
	Grid {
		/// Maximum offset from the grid point as a fraction of spacing.
		jitter: f64,
	},
	/// Fixed count scattered uniformly at random.
	Uniform {
		/// Region the particles are scattered over.
		placement: Placement,
	},
}

impl PopulationPolicy {
	/// Region the population initially covers, as `(min_x, min_y, max_x, max_y)`.
	///
	/// Flow motion wraps particles around this region, widened by its margin.
	pub fn region(&self, width: f64, height: f64) -> (f64, f64, f64, f64) {
		match self {
			PopulationPolicy::Grid { .. } => (0.0, 0.0, width, height),
			PopulationPolicy::Uniform { placement } => placement.region(width, height),
		}
	}
}

/// Nudges each particle towards the mean velocity of its array neighbours.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Alignment {
	/// Neighbours on each side, by index.
	pub window: usize,
	/// Fraction of the difference applied per frame.
	pub strength: f64,
}

impl Default for Alignment {
	fn default() -> Self {
		Self {
			window: 2,
			strength: 0.05,
		}
	}
}

/// Free integration through the flow field.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct FlowParams {
	/// Flow force magnitude added per frame.
	pub force: f64,
	/// Speed cap in pixels per frame.
	pub max_speed: f64,
	/// Per-particle wobble added to the flow angle, in radians.
	pub phase_jitter: f64,
	/// Array-neighbour velocity smoothing.
	pub alignment: Option<Alignment>,
	/// Pull towards the surface midpoint, per pixel of distance.
	pub centering: Option<f64>,
	/// Distance past the populated region before a particle wraps around.
	pub margin: f64,
}

impl Default for FlowParams {
	fn default() -> Self {
		Self {
			force: 0.05,
			max_speed: 1.2,
			phase_jitter: 0.3,
			alignment: Some(Alignment::default()),
			centering: None,
			margin: 10.0,
		}
	}
}

/// Travelling diagonal wave anchored to each particle's base position.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct WaveParams {
	/// Amplitude of the main diagonal sweep.
	pub primary_amplitude: f64,
	/// Amplitude of the second harmonic.
	pub secondary_amplitude: f64,
	/// Amplitude of the perpendicular drift.
	pub flow_amplitude: f64,
	/// Share of the perpendicular drift mixed into the position.
	pub flow_mix: f64,
	/// Spatial frequency along the diagonal.
	pub diagonal_frequency: f64,
	/// Temporal speed of the main sweep.
	pub wave_speed: f64,
	/// Extra temporal speed of the second harmonic.
	pub secondary_speed: f64,
	/// Spatial frequency of the perpendicular drift.
	pub flow_frequency: f64,
	/// Temporal speed of the perpendicular drift.
	pub flow_speed: f64,
}

impl Default for WaveParams {
	fn default() -> Self {
		Self {
			primary_amplitude: 80.0,
			secondary_amplitude: 40.0,
			flow_amplitude: 50.0,
			flow_mix: 0.5,
			diagonal_frequency: 0.002,
			wave_speed: 0.5,
			secondary_speed: 0.3,
			flow_frequency: 0.004,
			flow_speed: 0.7,
		}
	}
}

impl WaveParams {
	/// Largest distance a particle can sit from its base position on either axis.
	pub fn amplitude_bound(&self) -> f64 {
		self.primary_amplitude.abs()
			+ self.secondary_amplitude.abs()
			+ (self.flow_amplitude * self.flow_mix).abs()
	}
}

/// How particles move each frame.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MotionPolicy {
	/// Forces from the flow field, integrated freely with wrap-around edges.
	Flow(FlowParams),
	/// Closed-form wave offsets around a fixed base position.
	Wave(WaveParams),
}

/// Linear opacity ramp over the lower part of the surface.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct VerticalFade {
	/// Fraction of surface height where fading begins.
	pub start: f64,
	/// Fraction of surface height where particles are fully transparent.
	pub end: f64,
}

impl VerticalFade {
	/// Opacity multiplier for a particle at `y` on a surface `height` tall.
	pub fn opacity_at(&self, y: f64, height: f64) -> f64 {
		let (start, end) = (self.start * height, self.end * height);
		if y <= start {
			return 1.0;
		}
		if end <= start {
			return 0.0;
		}
		(1.0 - (y - start) / (end - start)).max(0.0)
	}
}

/// Which pages the background runs on.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteGate {
	/// Every page.
	Any,
	/// Only the listed paths.
	Paths(Vec<String>),
}

impl RouteGate {
	/// Only the site root.
	pub fn home() -> Self {
		RouteGate::Paths(vec!["/".to_string()])
	}

	/// Decide at startup whether the animation may run.
	pub fn permits(&self, reduced_motion: bool, path: &str) -> bool {
		if reduced_motion {
			return false;
		}
		match self {
			RouteGate::Any => true,
			RouteGate::Paths(paths) => {
				let path = if path.is_empty() { "/" } else { path };
				paths.iter().any(|p| p == path)
			}
		}
	}
}

/// CSS of the background canvas layer.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayerStyle {
	/// Stacking order; negative keeps the layer behind page content.
	pub z_index: i32,
	/// Opacity of the whole layer.
	pub opacity: f64,
	/// Gaussian blur radius in pixels (0 disables the filter).
	pub blur_px: f64,
}

impl Default for LayerStyle {
	fn default() -> Self {
		Self {
			z_index: -1,
			opacity: 0.6,
			blur_px: 1.0,
		}
	}
}

/// Complete configuration of one particle background.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
	/// Counts and spacing per viewport class.
	pub density: DensityConfig,
	/// Initial layout.
	pub population: PopulationPolicy,
	/// Per-frame movement.
	pub motion: MotionPolicy,
	/// Optional fade towards the bottom of the surface.
	pub fade: Option<VerticalFade>,
	/// Colors drawn at creation.
	pub palette: Palette,
	/// Render radius range in pixels.
	pub size_range: (f64, f64),
	/// Initial velocity spread; each component lies in `±initial_speed / 2`.
	pub initial_speed: f64,
	/// Elapsed-time increment per frame.
	pub time_step: f64,
	/// Pages the background runs on.
	pub gate: RouteGate,
	/// Canvas layer styling.
	pub layer: LayerStyle,
}

impl ParticleConfig {
	/// Jittered grid swept by a diagonal wave, fading out towards the bottom.
	/// Home page only.
	pub fn grid_wave() -> Self {
		Self {
			density: DensityConfig::default(),
			population: PopulationPolicy::Grid { jitter: 0.25 },
			motion: MotionPolicy::Wave(WaveParams::default()),
			fade: Some(VerticalFade {
				start: 0.3,
				end: 0.8,
			}),
			palette: Palette::brand(),
			size_range: (1.0, 3.0),
			initial_speed: 0.5,
			time_step: 0.016,
			gate: RouteGate::home(),
			layer: LayerStyle::default(),
		}
	}

	/// Dense uniform field covering the whole background.
	pub fn dense_field() -> Self {
		Self {
			density: DensityConfig {
				mobile_count: 3000,
				desktop_count: 8000,
				..DensityConfig::default()
			},
			population: PopulationPolicy::Uniform {
				placement: Placement::FullSurface,
			},
			motion: MotionPolicy::Flow(FlowParams::default()),
			fade: None,
			gate: RouteGate::Any,
			..Self::grid_wave()
		}
	}

	/// Flock scattered around the middle of the screen and held there.
	pub fn centered_flock() -> Self {
		Self {
			density: DensityConfig::default(),
			population: PopulationPolicy::Uniform {
				placement: Placement::Centered { spread: 1.5 },
			},
			motion: MotionPolicy::Flow(FlowParams {
				centering: Some(0.0005),
				..FlowParams::default()
			}),
			fade: None,
			gate: RouteGate::Any,
			..Self::grid_wave()
		}
	}
}

impl Default for ParticleConfig {
	fn default() -> Self {
		Self::grid_wave()
	}
}
