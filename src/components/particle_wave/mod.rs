//! Animated flow-field particle background.
//!
//! Draws a dense field of small translucent particles on a fixed canvas
//! behind the page content:
//! - Grid or uniform-random populations sized by viewport class
//! - Motion from a layered-sine flow field or a travelling diagonal wave
//! - Optional array-neighbour alignment and centering for flock-like motion
//! - Optional fade towards the bottom of the screen
//!
//! # Example
//!
//! ```ignore
//! use particle_wave::{ParticleConfig, ParticleWaveBackground};
//!
//! view! { <ParticleWaveBackground config=ParticleConfig::centered_flock() /> }
//! ```
//!
//! The simulation itself does not need a browser:
//!
//! ```
//! use particle_wave::{DensityClass, ParticleConfig, ParticleSimulation, SurfaceSize};
//!
//! let mut sim = ParticleSimulation::new(
//! 	ParticleConfig::dense_field(),
//! 	SurfaceSize::new(800.0, 600.0),
//! 	DensityClass::Desktop,
//! 	1,
//! );
//! sim.step(0.016);
//! assert_eq!(sim.particles().len(), 8000);
//! ```

mod component;
pub mod config;
pub mod field;
pub mod host;
mod particles;
mod render;
mod state;
pub mod theme;

pub use component::{CANVAS_ID, ParticleWaveBackground, ParticleWaveHandle, start};
pub use config::{DensityClass, DensityConfig, ParticleConfig};
pub use particles::{Particle, SurfaceSize, expected_count, populate};
pub use render::{Surface, render};
pub use state::ParticleSimulation;
pub use theme::{Color, Palette};
