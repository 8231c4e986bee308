//! Color types
//!
//! [`Color`] is the float representation renderers consume. [`ColorSample`]
//! is what a rendering host reports for a node's resolved background: 8-bit
//! channels plus a float alpha, matching computed CSS color strings.

use serde::Serialize;

/// RGBA color with channels in `0.0..=1.0`
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_hex(hex: u32) -> Self {
        let r = ((hex >> 16) & 0xFF) as f32 / 255.0;
        let g = ((hex >> 8) & 0xFF) as f32 / 255.0;
        let b = (hex & 0xFF) as f32 / 255.0;
        Self::rgb(r, g, b)
    }

    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.a = alpha;
        self
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl From<ColorSample> for Color {
    fn from(sample: ColorSample) -> Self {
        Color::rgba(
            sample.r as f32 / 255.0,
            sample.g as f32 / 255.0,
            sample.b as f32 / 255.0,
            sample.a,
        )
    }
}

/// A background color as reported by a rendering host
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ColorSample {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    /// Alpha in `0.0..=1.0`
    pub a: f32,
}

impl ColorSample {
    pub const TRANSPARENT: ColorSample = ColorSample::rgba(0, 0, 0, 0.0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// A fully transparent sample carries no classification weight
    pub fn is_transparent(&self) -> bool {
        self.a <= 0.0
    }
}

impl std::fmt::Display for ColorSample {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.a < 1.0 {
            write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
        } else {
            write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color() {
        let c = Color::from_hex(0xFF5500);
        assert_eq!(c.r, 1.0);
        assert!((c.g - 85.0 / 255.0).abs() < 0.001);
        assert_eq!(c.b, 0.0);

        let c2 = c.with_alpha(0.5);
        assert_eq!(c2.a, 0.5);
    }

    #[test]
    fn test_sample_transparency() {
        assert!(ColorSample::TRANSPARENT.is_transparent());
        assert!(ColorSample::rgba(255, 255, 255, 0.0).is_transparent());
        assert!(!ColorSample::rgba(255, 255, 255, 0.1).is_transparent());
    }

    #[test]
    fn test_sample_display() {
        assert_eq!(ColorSample::rgb(29, 78, 216).to_string(), "rgb(29, 78, 216)");
        assert_eq!(
            ColorSample::rgba(0, 0, 0, 0.5).to_string(),
            "rgba(0, 0, 0, 0.5)"
        );
        assert_eq!(Color::from(ColorSample::rgb(255, 255, 255)), Color::WHITE);
    }
}
