//! Simulation state and the per-frame update.
//!
//! Created once when the background starts, then mutated each frame by the
//! animation loop through [`ParticleSimulation::tick`]. Resizing throws the
//! whole population away and builds a new one.

use log::{debug, info};
use rand::SeedableRng;
use rand::rngs::SmallRng;

use super::config::{DensityClass, FlowParams, MotionPolicy, ParticleConfig, PopulationPolicy, WaveParams};
use super::field::flow_angle;
use super::particles::{Particle, SurfaceSize, grid_layout, populate};
use super::render::{Surface, render};

/// A particle population animated by a flow field or a travelling wave.
pub struct ParticleSimulation {
	config: ParticleConfig,
	particles: Vec<Particle>,
	size: SurfaceSize,
	class: DensityClass,
	time: f64,
	rng: SmallRng,
	/// Pre-step velocities, reused across frames.
	snapshot: Vec<(f64, f64)>,
	live: bool,
}

impl ParticleSimulation {
	/// Populate a new simulation for a surface of `size`.
	///
	/// `class` selects density; `seed` makes the population reproducible.
	pub fn new(config: ParticleConfig, size: SurfaceSize, class: DensityClass, seed: u64) -> Self {
		let mut sim = Self {
			config,
			particles: Vec::new(),
			size,
			class,
			time: 0.0,
			rng: SmallRng::seed_from_u64(seed),
			snapshot: Vec::new(),
			live: true,
		};
		sim.repopulate();
		sim
	}

	fn repopulate(&mut self) {
		self.particles = populate(self.size, self.class, &self.config, &mut self.rng);
		self.snapshot = Vec::with_capacity(self.particles.len());

		if let PopulationPolicy::Grid { .. } = self.config.population {
			let grid = grid_layout(self.size, self.config.density.spacing(self.class));
			info!(
				"particle-wave: created {} particles in {}x{} grid",
				self.particles.len(),
				grid.cols,
				grid.rows
			);
		} else {
			info!(
				"particle-wave: created {} particles ({:?})",
				self.particles.len(),
				self.class
			);
		}
	}

	/// Current population, in creation order.
	pub fn particles(&self) -> &[Particle] {
		&self.particles
	}

	/// Current surface size.
	pub fn size(&self) -> SurfaceSize {
		self.size
	}

	/// Density class the population was built for.
	pub fn class(&self) -> DensityClass {
		self.class
	}

	/// Elapsed simulation time.
	pub fn time(&self) -> f64 {
		self.time
	}

	/// Active configuration.
	pub fn config(&self) -> &ParticleConfig {
		&self.config
	}

	/// False once [`destroy`](Self::destroy) has been called.
	pub fn is_live(&self) -> bool {
		self.live
	}

	/// Speed cap enforced by the flow policy, if any.
	pub fn max_speed(&self) -> Option<f64> {
		match &self.config.motion {
			MotionPolicy::Flow(flow) => Some(flow.max_speed),
			MotionPolicy::Wave(_) => None,
		}
	}

	/// Adopt a new surface size and rebuild the population from scratch.
	pub fn resize(&mut self, size: SurfaceSize) {
		self.size = size;
		self.class = self.config.density.class_for(size.width);
		debug!(
			"particle-wave: resized to {}x{} ({:?})",
			size.width, size.height, self.class
		);
		self.repopulate();
	}

	/// Advance elapsed time by `dt` and move every particle once.
	pub fn step(&mut self, dt: f64) {
		self.time += dt;
		match &self.config.motion {
			MotionPolicy::Flow(flow) => {
				let region = self.config.population.region(self.size.width, self.size.height);
				step_flow(&mut self.particles, &mut self.snapshot, flow, self.size, region, self.time)
			}
			MotionPolicy::Wave(wave) => step_wave(&mut self.particles, wave, self.time),
		}
	}

	/// Draw the current state onto `surface`.
	pub fn render<S: Surface + ?Sized>(&self, surface: &mut S) {
		render(surface, &self.particles, self.size, self.config.fade.as_ref());
	}

	/// One display refresh: step by the configured time step, then render.
	///
	/// Returns whether another frame should be requested. After
	/// [`destroy`](Self::destroy) this does nothing and returns false.
	pub fn tick<S: Surface + ?Sized>(&mut self, surface: &mut S) -> bool {
		if !self.live {
			return false;
		}
		self.step(self.config.time_step);
		self.render(surface);
		true
	}

	/// Stop the simulation and release the population. Safe to call repeatedly.
	pub fn destroy(&mut self) {
		self.live = false;
		self.particles = Vec::new();
		self.snapshot = Vec::new();
	}
}

/// `region` is the populated area; particles wrap `margin` beyond it.
fn step_flow(
	particles: &mut [Particle],
	snapshot: &mut Vec<(f64, f64)>,
	flow: &FlowParams,
	size: SurfaceSize,
	region: (f64, f64, f64, f64),
	time: f64,
) {
	snapshot.clear();
	snapshot.extend(particles.iter().map(|p| (p.vx, p.vy)));

	let (mid_x, mid_y) = size.midpoint();
	let margin = flow.margin.max(0.0);
	let count = particles.len();

	for (i, p) in particles.iter_mut().enumerate() {
		// Each particle wobbles at its own rate around the shared flow direction
		let wobble = (time * (1.0 + p.noise_offset() * 0.001) + p.phase()).sin();
		let angle = flow_angle(p.x, p.y, time) + flow.phase_jitter * wobble;
		let (mut fx, mut fy) = (angle.cos() * flow.force, angle.sin() * flow.force);

		if let Some(alignment) = &flow.alignment {
			let lo = i.saturating_sub(alignment.window);
			let hi = i.saturating_add(alignment.window).min(count - 1);
			let (mut sum_x, mut sum_y, mut n) = (0.0, 0.0, 0usize);
			for (j, &(vx, vy)) in snapshot.iter().enumerate().take(hi + 1).skip(lo) {
				if j != i {
					sum_x += vx;
					sum_y += vy;
					n += 1;
				}
			}
			if n > 0 {
				let (own_x, own_y) = snapshot[i];
				fx += (sum_x / n as f64 - own_x) * alignment.strength;
				fy += (sum_y / n as f64 - own_y) * alignment.strength;
			}
		}

		if let Some(centering) = flow.centering {
			fx += (mid_x - p.x) * centering;
			fy += (mid_y - p.y) * centering;
		}

		p.vx += fx;
		p.vy += fy;

		let speed = p.speed();
		if speed > flow.max_speed && speed > 0.0 {
			let scale = flow.max_speed.max(0.0) / speed;
			p.vx *= scale;
			p.vy *= scale;
		}

		p.x += p.vx;
		p.y += p.vy;

		let (min_x, min_y, max_x, max_y) = region;
		p.x = wrap(p.x, min_x - margin, max_x + margin);
		p.y = wrap(p.y, min_y - margin, max_y + margin);
	}
}

/// Teleport coordinates outside `[lo, hi]` to the opposite bound.
fn wrap(v: f64, lo: f64, hi: f64) -> f64 {
	if v < lo {
		hi
	} else if v > hi {
		lo
	} else {
		v
	}
}

fn step_wave(particles: &mut [Particle], wave: &WaveParams, time: f64) {
	for p in particles.iter_mut() {
		let (base_x, base_y) = p.base();

		// Diagonal sweep from top-left to bottom-right
		let progress = (base_x + base_y) * wave.diagonal_frequency - time * wave.wave_speed;
		let primary = progress.sin() * wave.primary_amplitude;
		let secondary = (progress * 2.0 + time * wave.secondary_speed).sin() * wave.secondary_amplitude;

		let flow_x = (base_y * wave.flow_frequency + time * wave.flow_speed).sin() * wave.flow_amplitude;
		let flow_y = (base_x * wave.flow_frequency + time * wave.flow_speed).cos() * wave.flow_amplitude;

		let x = base_x + primary + secondary + flow_x * wave.flow_mix;
		let y = base_y + primary + secondary + flow_y * wave.flow_mix;

		p.vx = x - p.x;
		p.vy = y - p.y;
		p.x = x;
		p.y = y;
	}
}

#[cfg(test)]
mod tests {
	use super::super::config::{Alignment, DensityConfig, Placement};
	use super::super::particles::particle_at;
	use super::super::theme::Color;
	use super::*;

	#[derive(Default)]
	struct CountingSurface {
		clears: usize,
		circles: usize,
	}

	impl Surface for CountingSurface {
		fn clear(&mut self, _width: f64, _height: f64) {
			self.clears += 1;
		}

		fn fill_circle(&mut self, _x: f64, _y: f64, _radius: f64, _color: Color) {
			self.circles += 1;
		}
	}

	const SURFACE: SurfaceSize = SurfaceSize {
		width: 400.0,
		height: 300.0,
	};
	const SURFACE_REGION: (f64, f64, f64, f64) = (0.0, 0.0, 400.0, 300.0);

	fn flow_config(flow: FlowParams) -> ParticleConfig {
		ParticleConfig {
			density: DensityConfig {
				mobile_count: 300,
				desktop_count: 600,
				..DensityConfig::default()
			},
			population: PopulationPolicy::Uniform {
				placement: Placement::FullSurface,
			},
			motion: MotionPolicy::Flow(flow),
			..ParticleConfig::dense_field()
		}
	}

	fn flow_sim(flow: FlowParams) -> ParticleSimulation {
		ParticleSimulation::new(
			flow_config(flow),
			SurfaceSize::new(400.0, 300.0),
			DensityClass::Desktop,
			17,
		)
	}

	#[test]
	fn speed_never_exceeds_cap() {
		let mut sim = flow_sim(FlowParams {
			force: 0.8,
			max_speed: 1.5,
			..FlowParams::default()
		});
		for _ in 0..120 {
			sim.step(0.016);
			for p in sim.particles() {
				assert!(p.speed() <= 1.5 + 1e-9, "speed {}", p.speed());
			}
		}
	}

	#[test]
	fn wrap_keeps_particles_within_margin() {
		let mut sim = flow_sim(FlowParams {
			force: 0.5,
			max_speed: 6.0,
			margin: 10.0,
			..FlowParams::default()
		});
		for _ in 0..400 {
			sim.step(0.016);
			for p in sim.particles() {
				assert!((-10.0..=410.0).contains(&p.x), "x = {}", p.x);
				assert!((-10.0..=310.0).contains(&p.y), "y = {}", p.y);
			}
		}
	}

	#[test]
	fn wrap_teleports_to_opposite_edge() {
		assert_eq!(wrap(-10.5, -10.0, 410.0), 410.0);
		assert_eq!(wrap(410.5, -10.0, 410.0), -10.0);
		assert_eq!(wrap(-10.0, -10.0, 410.0), -10.0);
		assert_eq!(wrap(200.0, -10.0, 410.0), 200.0);
	}

	#[test]
	fn wrap_preserves_velocity() {
		let flow = FlowParams {
			force: 0.0,
			max_speed: 10.0,
			phase_jitter: 0.0,
			alignment: None,
			centering: None,
			margin: 10.0,
		};
		let mut particles = vec![particle_at(409.0, 150.0, 3.0, 0.5)];
		let mut snapshot = Vec::new();
		step_flow(&mut particles, &mut snapshot, &flow, SURFACE, SURFACE_REGION, 0.0);
		assert_eq!(particles[0].x, -10.0);
		assert_eq!((particles[0].vx, particles[0].vy), (3.0, 0.5));
	}

	#[test]
	fn alignment_reads_pre_step_velocities() {
		let flow = FlowParams {
			force: 0.0,
			max_speed: 100.0,
			phase_jitter: 0.0,
			alignment: Some(Alignment {
				window: 1,
				strength: 0.5,
			}),
			centering: None,
			margin: 1000.0,
		};
		let mut particles = vec![
			particle_at(10.0, 10.0, 4.0, 0.0),
			particle_at(20.0, 10.0, 0.0, 0.0),
			particle_at(30.0, 10.0, 0.0, 0.0),
		];
		let mut snapshot = Vec::new();
		let size = SurfaceSize::new(100.0, 100.0);
		step_flow(&mut particles, &mut snapshot, &flow, size, (0.0, 0.0, 100.0, 100.0), 0.0);

		// p0: neighbour avg 0 -> 4 + 0.5 * (0 - 4) = 2
		assert!((particles[0].vx - 2.0).abs() < 1e-12);
		// p1: avg of 4 and 0 = 2 -> 0.5 * 2 = 1
		assert!((particles[1].vx - 1.0).abs() < 1e-12);
		// p2 sees p1's pre-step 0, not its updated 1
		assert!(particles[2].vx.abs() < 1e-12);
	}

	#[test]
	fn centering_pulls_towards_midpoint() {
		let flow = FlowParams {
			force: 0.0,
			max_speed: 100.0,
			phase_jitter: 0.0,
			alignment: None,
			centering: Some(0.01),
			margin: 10.0,
		};
		let mut particles = vec![particle_at(0.0, 0.0, 0.0, 0.0), particle_at(400.0, 300.0, 0.0, 0.0)];
		let mut snapshot = Vec::new();
		step_flow(&mut particles, &mut snapshot, &flow, SURFACE, SURFACE_REGION, 0.0);
		assert!((particles[0].vx - 2.0).abs() < 1e-12 && (particles[0].vy - 1.5).abs() < 1e-12);
		assert!((particles[1].vx + 2.0).abs() < 1e-12 && (particles[1].vy + 1.5).abs() < 1e-12);
	}

	#[test]
	fn centered_flock_keeps_its_spread_after_first_step() {
		let size = SurfaceSize::new(800.0, 600.0);
		let mut sim = ParticleSimulation::new(ParticleConfig::centered_flock(), size, DensityClass::Desktop, 1);
		let outside = |sim: &ParticleSimulation| {
			sim.particles()
				.iter()
				.filter(|p| p.x < 0.0 || p.x > size.width || p.y < 0.0 || p.y > size.height)
				.count()
		};
		let outside_before = outside(&sim);
		assert!(outside_before > 1000);

		sim.step(0.016);

		let on_surface_wrap_lines = sim
			.particles()
			.iter()
			.filter(|p| p.x == -10.0 || p.x == 810.0 || p.y == -10.0 || p.y == 610.0)
			.count();
		assert_eq!(on_surface_wrap_lines, 0);
		// Nobody moves more than the speed cap, so only edge-huggers cross in
		assert!(outside(&sim) + 50 >= outside_before);
	}

	#[test]
	fn centered_flock_stays_within_placement_margin() {
		let config = ParticleConfig::centered_flock();
		let MotionPolicy::Flow(flow) = config.motion.clone() else {
			unreachable!();
		};
		let size = SurfaceSize::new(800.0, 600.0);
		let (min_x, min_y, max_x, max_y) = config.population.region(size.width, size.height);
		let (lo_x, hi_x) = (min_x - flow.margin, max_x + flow.margin);
		let (lo_y, hi_y) = (min_y - flow.margin, max_y + flow.margin);

		let mut sim = ParticleSimulation::new(config, size, DensityClass::Mobile, 6);
		for _ in 0..300 {
			sim.step(0.016);
			for p in sim.particles() {
				assert!((lo_x..=hi_x).contains(&p.x), "x = {}", p.x);
				assert!((lo_y..=hi_y).contains(&p.y), "y = {}", p.y);
			}
		}
	}

	#[test]
	fn unbounded_alignment_window_averages_everyone() {
		let flow = FlowParams {
			force: 0.0,
			max_speed: 100.0,
			phase_jitter: 0.0,
			alignment: Some(Alignment {
				window: usize::MAX,
				strength: 1.0,
			}),
			centering: None,
			margin: 1000.0,
		};
		let mut particles = vec![
			particle_at(10.0, 10.0, 3.0, 0.0),
			particle_at(20.0, 10.0, 0.0, 0.0),
			particle_at(30.0, 10.0, 0.0, 0.0),
		];
		let mut snapshot = Vec::new();
		step_flow(&mut particles, &mut snapshot, &flow, SURFACE, SURFACE_REGION, 0.0);

		// Every particle takes the mean of the other two
		assert!(particles[0].vx.abs() < 1e-12);
		assert!((particles[1].vx - 1.5).abs() < 1e-12);
		assert!((particles[2].vx - 1.5).abs() < 1e-12);

		let mut sim = flow_sim(flow);
		sim.step(0.016);
		assert_eq!(sim.particles().len(), 600);
	}

	#[test]
	fn size_and_color_survive_steps() {
		let mut sim = flow_sim(FlowParams::default());
		let before: Vec<_> = sim.particles().iter().map(|p| (p.size(), p.color())).collect();
		for _ in 0..30 {
			sim.step(0.016);
		}
		let after: Vec<_> = sim.particles().iter().map(|p| (p.size(), p.color())).collect();
		assert_eq!(before, after);
	}

	#[test]
	fn wave_offsets_stay_bounded() {
		let config = ParticleConfig::grid_wave();
		let MotionPolicy::Wave(wave) = config.motion.clone() else {
			unreachable!();
		};
		let bound = wave.amplitude_bound();
		let mut sim = ParticleSimulation::new(config, SurfaceSize::new(320.0, 240.0), DensityClass::Desktop, 4);
		for _ in 0..200 {
			sim.step(0.016);
			for p in sim.particles() {
				let (bx, by) = p.base();
				assert!((p.x - bx).abs() <= bound + 1e-9);
				assert!((p.y - by).abs() <= bound + 1e-9);
			}
		}
	}

	#[test]
	fn wave_velocity_is_frame_displacement() {
		let mut sim = ParticleSimulation::new(
			ParticleConfig::grid_wave(),
			SurfaceSize::new(100.0, 100.0),
			DensityClass::Desktop,
			8,
		);
		sim.step(0.016);
		let before: Vec<_> = sim.particles().iter().map(|p| (p.x, p.y)).collect();
		sim.step(0.016);
		for (p, (x, y)) in sim.particles().iter().zip(before) {
			assert!((p.vx - (p.x - x)).abs() < 1e-9);
			assert!((p.vy - (p.y - y)).abs() < 1e-9);
		}
	}

	#[test]
	fn time_advances_by_fixed_step() {
		let mut sim = flow_sim(FlowParams::default());
		let mut surface = CountingSurface::default();
		for _ in 0..10 {
			assert!(sim.tick(&mut surface));
		}
		assert!((sim.time() - 0.16).abs() < 1e-12);
	}

	#[test]
	fn resize_rebuilds_population() {
		let mut sim = flow_sim(FlowParams::default());
		let old = sim.particles().to_vec();
		assert_eq!(old.len(), 600);

		sim.resize(SurfaceSize::new(500.0, 900.0));
		assert_eq!(sim.class(), DensityClass::Mobile);
		assert_eq!(sim.particles().len(), 300);
		assert!(sim.particles().iter().zip(&old).all(|(a, b)| a != b));
		assert!(sim.particles().iter().all(|p| p.x < 500.0 && p.y < 900.0));
	}

	#[test]
	fn resize_to_zero_renders_nothing() {
		let mut sim = flow_sim(FlowParams::default());
		sim.resize(SurfaceSize::new(0.0, 0.0));
		let mut surface = CountingSurface::default();
		assert!(sim.tick(&mut surface));
		assert_eq!(surface.circles, 0);
	}

	#[test]
	fn destroy_is_idempotent_and_stops_ticks() {
		let mut sim = flow_sim(FlowParams::default());
		let mut surface = CountingSurface::default();
		assert!(sim.tick(&mut surface));
		let (clears, circles, time) = (surface.clears, surface.circles, sim.time());

		sim.destroy();
		sim.destroy();
		assert!(!sim.is_live());
		assert!(!sim.tick(&mut surface));
		assert!(!sim.tick(&mut surface));
		assert_eq!((surface.clears, surface.circles), (clears, circles));
		assert_eq!(sim.time(), time);
	}
}
