//! Particle records and the population algorithms.

use std::f64::consts::TAU;

use rand::Rng;

use super::config::{DensityClass, ParticleConfig, PopulationPolicy};
use super::theme::Color;

/// Drawable surface dimensions in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SurfaceSize {
	/// Width in pixels.
	pub width: f64,
	/// Height in pixels.
	pub height: f64,
}

impl SurfaceSize {
	/// Convenience constructor.
	pub const fn new(width: f64, height: f64) -> Self {
		Self { width, height }
	}

	/// True when either extent is zero, negative or not a number.
	pub fn is_empty(&self) -> bool {
		!(self.width > 0.0 && self.height > 0.0)
	}

	/// Center of the surface.
	pub fn midpoint(&self) -> (f64, f64) {
		(self.width / 2.0, self.height / 2.0)
	}
}

/// A single particle. Only position and velocity change after creation.
#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
	/// Horizontal position.
	pub x: f64,
	/// Vertical position.
	pub y: f64,
	/// Horizontal velocity in pixels per frame.
	pub vx: f64,
	/// Vertical velocity in pixels per frame.
	pub vy: f64,
	base_x: f64,
	base_y: f64,
	size: f64,
	color: Color,
	phase: f64,
	noise_offset: f64,
}

impl Particle {
	/// Render radius in pixels.
	pub fn size(&self) -> f64 {
		self.size
	}

	/// Base color, including its own opacity.
	pub fn color(&self) -> Color {
		self.color
	}

	/// Position the particle was created at.
	pub fn base(&self) -> (f64, f64) {
		(self.base_x, self.base_y)
	}

	/// Phase offset in `[0, 2π)`.
	pub fn phase(&self) -> f64 {
		self.phase
	}

	/// Per-particle offset used to decorrelate motion.
	pub fn noise_offset(&self) -> f64 {
		self.noise_offset
	}

	/// Current speed in pixels per frame.
	pub fn speed(&self) -> f64 {
		(self.vx * self.vx + self.vy * self.vy).sqrt()
	}
}

/// Uniform sample from `[lo, hi)`; returns `lo` for an empty range.
fn uniform<R: Rng + ?Sized>(rng: &mut R, lo: f64, hi: f64) -> f64 {
	lo + rng.gen_range(0.0..1.0) * (hi - lo)
}

/// Grid spacing is never finer than this, in pixels.
pub const MIN_SPACING: f64 = 1.0;

/// Upper bound on the population, whatever the configuration asks for.
pub const MAX_PARTICLES: usize = 100_000;

/// Layout of a grid population.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) struct GridLayout {
	pub cols: usize,
	pub rows: usize,
	/// Spacing actually used, after the floor and the population cap.
	pub spacing: f64,
}

impl GridLayout {
	pub fn count(&self) -> usize {
		self.cols.saturating_mul(self.rows)
	}
}

/// Grid covering `size` at `spacing`, coarsened to stay under [`MAX_PARTICLES`].
pub(super) fn grid_layout(size: SurfaceSize, spacing: f64) -> GridLayout {
	if size.is_empty() || !(spacing > 0.0) {
		return GridLayout {
			cols: 0,
			rows: 0,
			spacing: 0.0,
		};
	}
	// Square roots taken separately so huge surfaces do not overflow
	let coarsest = size.width.sqrt() * size.height.sqrt() / (MAX_PARTICLES as f64).sqrt();
	let spacing = spacing.max(MIN_SPACING).max(coarsest);
	let cols = ((size.width / spacing).ceil() as usize).clamp(1, MAX_PARTICLES);
	let rows = ((size.height / spacing).ceil() as usize).min(MAX_PARTICLES / cols);
	GridLayout { cols, rows, spacing }
}

/// Number of particles [`populate`] produces for these inputs.
///
/// Never more than [`MAX_PARTICLES`].
pub fn expected_count(size: SurfaceSize, class: DensityClass, config: &ParticleConfig) -> usize {
	if size.is_empty() {
		return 0;
	}
	match config.population {
		PopulationPolicy::Grid { .. } => grid_layout(size, config.density.spacing(class)).count(),
		PopulationPolicy::Uniform { .. } => config.density.count(class).min(MAX_PARTICLES),
	}
}

/// Build a fresh population for a surface of `size`.
///
/// Returns an empty vector for a degenerate surface or zero density; the
/// renderer then simply draws nothing.
pub fn populate<R: Rng + ?Sized>(
	size: SurfaceSize,
	class: DensityClass,
	config: &ParticleConfig,
	rng: &mut R,
) -> Vec<Particle> {
	let count = expected_count(size, class, config);
	let mut particles = Vec::with_capacity(count);
	if count == 0 {
		return particles;
	}

	match &config.population {
		PopulationPolicy::Grid { jitter } => {
			let grid = grid_layout(size, config.density.spacing(class));
			let reach = grid.spacing * jitter.abs();
			for row in 0..grid.rows {
				for col in 0..grid.cols {
					let x = col as f64 * grid.spacing + uniform(rng, -reach, reach);
					let y = row as f64 * grid.spacing + uniform(rng, -reach, reach);
					particles.push(spawn(x, y, config, rng));
				}
			}
		}
		PopulationPolicy::Uniform { placement } => {
			let (min_x, min_y, max_x, max_y) = placement.region(size.width, size.height);
			for _ in 0..count {
				let x = uniform(rng, min_x, max_x);
				let y = uniform(rng, min_y, max_y);
				particles.push(spawn(x, y, config, rng));
			}
		}
	}
	particles
}

fn spawn<R: Rng + ?Sized>(x: f64, y: f64, config: &ParticleConfig, rng: &mut R) -> Particle {
	let half = config.initial_speed / 2.0;
	let (size_min, size_max) = config.size_range;
	Particle {
		x,
		y,
		vx: uniform(rng, -half, half),
		vy: uniform(rng, -half, half),
		base_x: x,
		base_y: y,
		size: uniform(rng, size_min, size_max),
		color: config.palette.pick(rng),
		phase: uniform(rng, 0.0, TAU),
		noise_offset: uniform(rng, 0.0, 1000.0),
	}
}

#[cfg(test)]
pub(crate) fn particle_at(x: f64, y: f64, vx: f64, vy: f64) -> Particle {
	Particle {
		x,
		y,
		vx,
		vy,
		base_x: x,
		base_y: y,
		size: 2.0,
		color: Color::rgba(0, 0, 0, 0.5),
		phase: 0.0,
		noise_offset: 0.0,
	}
}
