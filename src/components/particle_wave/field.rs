//! Procedural flow field.
//!
//! Layered sine waves stand in for Perlin noise: cheap, smooth everywhere,
//! and a pure function of position and time.

/// Flow direction in radians at `(x, y)` and time `t`.
pub fn flow_angle(x: f64, y: f64, t: f64) -> f64 {
	(x * 0.003 + t * 0.3).sin() * 2.0
		+ (y * 0.002 + t * 0.2).sin() * 2.0
		+ ((x + y) * 0.002 + t * 0.25).sin() * 1.5
		+ (x * 0.004 - t * 0.15).cos()
		+ (y * 0.003 - t * 0.1).cos()
}
