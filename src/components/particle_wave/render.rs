//! Drawing the particle field.
//!
//! The simulation draws through the [`Surface`] trait so it can be exercised
//! without a browser. The canvas 2D context is the production surface.

use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::config::VerticalFade;
use super::particles::{Particle, SurfaceSize};
use super::theme::Color;

/// A 2D target the renderer can clear and fill circles on.
pub trait Surface {
	/// Erase the whole `width` x `height` area.
	fn clear(&mut self, width: f64, height: f64);

	/// Fill a circle of `radius` centered at `(x, y)`.
	fn fill_circle(&mut self, x: f64, y: f64, radius: f64, color: Color);
}

impl Surface for CanvasRenderingContext2d {
	fn clear(&mut self, width: f64, height: f64) {
		self.clear_rect(0.0, 0.0, width, height);
	}

	fn fill_circle(&mut self, x: f64, y: f64, radius: f64, color: Color) {
		self.set_fill_style_str(&color.to_css());
		self.begin_path();
		let _ = self.arc(x, y, radius, 0.0, PI * 2.0);
		self.fill();
	}
}

/// Clear `surface` and draw every particle, fading by height when `fade` is set.
///
/// No trail buffer is kept; each frame starts from an empty surface.
pub fn render<S: Surface + ?Sized>(
	surface: &mut S,
	particles: &[Particle],
	size: SurfaceSize,
	fade: Option<&VerticalFade>,
) {
	surface.clear(size.width, size.height);
	if size.is_empty() {
		return;
	}

	for p in particles {
		let color = match fade {
			Some(fade) => p.color().fade(fade.opacity_at(p.y, size.height)),
			None => p.color(),
		};
		if color.a <= 0.0 {
			continue;
		}
		surface.fill_circle(p.x, p.y, p.size(), color);
	}
}
