//! Colors and palettes for the particle field.
//!
//! Colors are carried as separate numeric channels from the moment a particle
//! is created, so the renderer can scale alpha without touching strings.

use rand::Rng;
use serde::Deserialize;

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct Color {
	/// Red channel.
	pub r: u8,
	/// Green channel.
	pub g: u8,
	/// Blue channel.
	pub b: u8,
	/// Opacity in `[0, 1]`.
	#[serde(default = "opaque")]
	pub a: f64,
}

fn opaque() -> f64 {
	1.0
}

impl Color {
	/// Color with explicit opacity.
	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	/// Same channels, different opacity.
	pub fn with_alpha(self, a: f64) -> Self {
		Self { a, ..self }
	}

	/// Scale the opacity by `factor` (clamped to `[0, 1]`).
	pub fn fade(self, factor: f64) -> Self {
		self.with_alpha(self.a * factor.clamp(0.0, 1.0))
	}

	/// CSS `rgba()` notation, as accepted by canvas fill styles.
	pub fn to_css(self) -> String {
		format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
	}
}

/// A set of colors particles are drawn from at creation time.
///
/// In configuration a palette is either the name of a built-in palette
/// (`"brand"`, `"slate"`, `"ember"`) or a list of colors.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(from = "PaletteSource")]
pub struct Palette {
	/// Candidate colors, each equally likely.
	pub colors: Vec<Color>,
}

#[derive(Deserialize)]
#[serde(rename_all = "snake_case")]
enum PaletteName {
	Brand,
	Slate,
	Ember,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PaletteSource {
	Named(PaletteName),
	Colors(Vec<Color>),
}

impl From<PaletteSource> for Palette {
	fn from(source: PaletteSource) -> Self {
		match source {
			PaletteSource::Named(PaletteName::Brand) => Self::brand(),
			PaletteSource::Named(PaletteName::Slate) => Self::slate(),
			PaletteSource::Named(PaletteName::Ember) => Self::ember(),
			PaletteSource::Colors(colors) => Self { colors },
		}
	}
}

/// Used when a palette turns out to be empty.
const FALLBACK: Color = Color::rgba(91, 142, 179, 0.25);

impl Palette {
	/// Site brand colors: muted blues, charcoal and a hint of amber.
	pub fn brand() -> Self {
		Self {
			colors: vec![
				Color::rgba(91, 142, 179, 0.25), // Muted blue
				Color::rgba(44, 82, 130, 0.20),  // Deep blue
				Color::rgba(26, 32, 44, 0.15),   // Charcoal
				Color::rgba(91, 142, 179, 0.30), // Muted blue, stronger
				Color::rgba(217, 119, 6, 0.12),  // Accent amber
				Color::rgba(26, 32, 44, 0.10),   // Charcoal, lighter
			],
		}
	}

	/// Translucent slate blues and teals, for darker pages.
	pub fn slate() -> Self {
		Self {
			colors: vec![
				Color::rgba(94, 129, 172, 0.30),  // Steel blue
				Color::rgba(129, 161, 193, 0.25), // Light steel
				Color::rgba(100, 148, 160, 0.25), // Teal gray
				Color::rgba(136, 160, 175, 0.20), // Cadet blue
				Color::rgba(143, 163, 180, 0.15), // Cool gray
			],
		}
	}

	/// Warm muted tones.
	pub fn ember() -> Self {
		Self {
			colors: vec![
				Color::rgba(180, 120, 100, 0.25), // Terracotta
				Color::rgba(185, 145, 110, 0.25), // Amber
				Color::rgba(165, 115, 90, 0.20),  // Rust
				Color::rgba(160, 135, 100, 0.15), // Ochre
			],
		}
	}

	/// Uniformly random palette entry.
	pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Color {
		if self.colors.is_empty() {
			return FALLBACK;
		}
		self.colors[rng.gen_range(0..self.colors.len())]
	}
}

impl Default for Palette {
	fn default() -> Self {
		Self::brand()
	}
}
