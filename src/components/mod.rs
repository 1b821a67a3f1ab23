//! UI components.

pub mod particle_wave;
