//! Visual configuration for particle rendering.
//!
//! This module holds everything that controls how particles *look*, separate
//! from the shape clouds that control where they go: the color palette, the
//! point-sprite sizing and glow, and the bloom post-process.
//!
//! The free functions at the bottom mirror the WGSL in [`crate::shaders`]
//! formula for formula, so the sizing and falloff math can be checked on the CPU.
//!
//! # Usage
//!
//! ```ignore
//! Nebula::new()
//!     .with_visuals(|v| {
//!         v.point_size(60.0);
//!         v.bloom(BloomConfig { threshold: 0.3, ..Default::default() });
//!     })
//!     .run()?;
//! ```

use glam::Vec3;

use crate::error::ConfigError;

/// Blue-to-white gradient: midnight, dark blue, royal blue, blue, light blue,
/// ice, mist, star white.
pub const CELESTIAL_PALETTE: [&str; 8] = [
    "#020b1a", "#0b1e45", "#1e40af", "#3b82f6", "#60a5fa", "#93c5fd", "#e0f2fe", "#ffffff",
];

/// A fixed set of particle colors.
///
/// Each particle picks one entry at generation time and keeps it forever.
/// Colors are stored in linear RGB, ready for an sRGB render target.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    colors: Vec<Vec3>,
}

impl Palette {
    /// Build a palette from `#rrggbb` strings (sRGB).
    pub fn from_hex<S: AsRef<str>>(entries: &[S]) -> Result<Self, ConfigError> {
        if entries.is_empty() {
            return Err(ConfigError::EmptyPalette);
        }
        let colors = entries
            .iter()
            .map(|s| parse_hex(s.as_ref()).map(srgb_to_linear))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { colors })
    }

    /// The default blue-centric palette.
    pub fn celestial() -> Self {
        Self {
            colors: CELESTIAL_PALETTE
                .iter()
                .map(|s| srgb_to_linear(parse_hex(s).unwrap_or(Vec3::ONE)))
                .collect(),
        }
    }

    /// Palette entries in linear RGB.
    pub fn colors(&self) -> &[Vec3] {
        &self.colors
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Whether the palette has no entries.
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Check if `color` is exactly one of the palette entries.
    pub fn contains(&self, color: Vec3) -> bool {
        self.colors.iter().any(|c| *c == color)
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::celestial()
    }
}

fn parse_hex(s: &str) -> Result<Vec3, ConfigError> {
    let digits = s.strip_prefix('#').unwrap_or(s);
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ConfigError::InvalidColor(s.to_string()));
    }
    let value = u32::from_str_radix(digits, 16).map_err(|_| ConfigError::InvalidColor(s.to_string()))?;
    Ok(Vec3::new(
        ((value >> 16) & 0xff) as f32 / 255.0,
        ((value >> 8) & 0xff) as f32 / 255.0,
        (value & 0xff) as f32 / 255.0,
    ))
}

/// Convert an sRGB-encoded color to linear RGB.
pub fn srgb_to_linear(c: Vec3) -> Vec3 {
    let channel = |v: f32| {
        if v <= 0.04045 {
            v / 12.92
        } else {
            ((v + 0.055) / 1.055).powf(2.4)
        }
    };
    Vec3::new(channel(c.x), channel(c.y), channel(c.z))
}

/// Point-sprite sizing and ambient motion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointStyle {
    /// Base sprite size in pixels at view distance 1.
    pub base_size: f32,
    /// Upper bound on the device pixel ratio.
    pub max_pixel_ratio: f32,
    /// Amplitude of the breathing offset in world units.
    pub breathing_amplitude: f32,
    /// Spatial frequency of the breathing wave.
    pub breathing_frequency: f32,
    /// Multiplier applied to elapsed time before it drives the wave.
    pub breathing_speed: f32,
}

impl Default for PointStyle {
    fn default() -> Self {
        Self {
            base_size: 45.0,
            max_pixel_ratio: 2.0,
            breathing_amplitude: 0.05,
            breathing_frequency: 10.0,
            breathing_speed: 0.5,
        }
    }
}

/// Bloom post-process settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BloomConfig {
    /// Whether the bloom stage runs at all.
    pub enabled: bool,
    /// Luminance above which pixels start to glow.
    pub threshold: f32,
    /// How strongly the blurred highlights are added back.
    pub intensity: f32,
    /// Blur spread in `[0, 1]`: how much each coarser mip level bleeds into
    /// the finer one on the way back up the chain.
    pub radius: f32,
}

impl Default for BloomConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: 0.2,
            intensity: 1.2,
            radius: 0.6,
        }
    }
}

impl BloomConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        let ok = |v: f32| v.is_finite() && v >= 0.0;
        if !ok(self.threshold) {
            return Err(ConfigError::InvalidBloom("threshold"));
        }
        if !ok(self.intensity) {
            return Err(ConfigError::InvalidBloom("intensity"));
        }
        if !ok(self.radius) || self.radius > 1.0 {
            return Err(ConfigError::InvalidBloom("radius"));
        }
        Ok(())
    }
}

/// Configuration for particle visuals.
///
/// Built using the closure passed to [`Nebula::with_visuals`](crate::Nebula::with_visuals).
#[derive(Debug, Clone, PartialEq)]
pub struct VisualConfig {
    /// Sprite sizing and breathing.
    pub points: PointStyle,
    /// Bloom post-process.
    pub bloom: BloomConfig,
    /// Background clear color (linear RGB).
    pub background_color: Vec3,
}

impl Default for VisualConfig {
    fn default() -> Self {
        Self {
            points: PointStyle::default(),
            bloom: BloomConfig::default(),
            background_color: Vec3::ZERO,
        }
    }
}

impl VisualConfig {
    /// Create default visual config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base sprite size in pixels.
    pub fn point_size(&mut self, size: f32) -> &mut Self {
        self.points.base_size = size;
        self
    }

    /// Set the breathing amplitude; `0.0` disables the ambient motion.
    pub fn breathing(&mut self, amplitude: f32) -> &mut Self {
        self.points.breathing_amplitude = amplitude;
        self
    }

    /// Replace the bloom settings.
    pub fn bloom(&mut self, bloom: BloomConfig) -> &mut Self {
        self.bloom = bloom;
        self
    }

    /// Disable the bloom stage entirely.
    pub fn no_bloom(&mut self) -> &mut Self {
        self.bloom.enabled = false;
        self
    }

    /// Set the background clear color.
    pub fn background(&mut self, color: Vec3) -> &mut Self {
        self.background_color = color;
        self
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if !(self.points.base_size.is_finite() && self.points.base_size > 0.0) {
            return Err(ConfigError::InvalidPointSize(self.points.base_size));
        }
        self.bloom.validate()
    }
}

// ========== CPU mirrors of the point-sprite shader ==========

/// On-screen sprite diameter in pixels: `base * scale * pixel_ratio / -view_z`.
///
/// `view_z` is the view-space depth, negative in front of the camera.
#[inline]
pub fn point_size(base: f32, scale: f32, pixel_ratio: f32, view_z: f32) -> f32 {
    base * scale * pixel_ratio * (1.0 / -view_z)
}

/// Apply the breathing offset to a model-space position.
///
/// `y` moves with `sin(t + x * freq)`, then `x` moves with `cos(t + z * freq)`,
/// where `t = time * speed`.
#[inline]
pub fn breathe(p: Vec3, time: f32, style: &PointStyle) -> Vec3 {
    let t = time * style.breathing_speed;
    let f = style.breathing_frequency;
    let a = style.breathing_amplitude;
    let y = p.y + (t + p.x * f).sin() * a;
    let x = p.x + (t + p.z * f).cos() * a;
    Vec3::new(x, y, p.z)
}

/// Radial glow strength for a fragment at `dist` from the sprite center,
/// where `dist` is measured in point-coordinate units (0 at center, 0.5 at edge).
#[inline]
pub fn glow_strength(dist: f32) -> f32 {
    (1.0 - dist).powi(3)
}

/// Fragment output of a particle: `(color * strength, strength)`.
#[inline]
pub fn glow(color: Vec3, dist: f32) -> (Vec3, f32) {
    let s = glow_strength(dist);
    (color * s, s)
}

/// Bloom upsample step: blend the tent-filtered coarser level over the
/// current level by `radius`.
#[inline]
pub fn upsample_mix(current: Vec3, coarser: Vec3, radius: f32) -> Vec3 {
    current.lerp(coarser, radius)
}

/// Weights of the 13-tap downsample: center, four diagonal corners at 2
/// texels, four edge taps at 2 texels and four inner diagonals at 1 texel.
pub const DOWNSAMPLE_WEIGHTS: [f32; 4] = [0.125, 0.03125, 0.0625, 0.125];

/// Bloom bright pass: keep colors whose luminance rises past `threshold`,
/// with a 0.1-wide smooth knee.
#[inline]
pub fn bright_pass(color: Vec3, threshold: f32) -> Vec3 {
    let luma = color.dot(Vec3::new(0.2126, 0.7152, 0.0722));
    let t = ((luma - threshold) / 0.1).clamp(0.0, 1.0);
    color * (t * t * (3.0 - 2.0 * t))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_celestial_palette_has_eight_linear_colors() {
        let p = Palette::celestial();
        assert_eq!(p.len(), 8);
        assert_eq!(p.colors()[7], Vec3::ONE);
        for c in p.colors() {
            assert!(c.min_element() >= 0.0 && c.max_element() <= 1.0);
        }
        // Darkest entry stays dark after linearization
        assert!(p.colors()[0].max_element() < 0.02);
    }

    #[test]
    fn test_palette_rejects_bad_hex() {
        assert_eq!(
            Palette::from_hex(&["#12345g"]),
            Err(ConfigError::InvalidColor("#12345g".into()))
        );
        assert_eq!(Palette::from_hex::<&str>(&[]), Err(ConfigError::EmptyPalette));
        // from_str_radix alone would take a sign
        assert_eq!(
            Palette::from_hex(&["#+abcde"]),
            Err(ConfigError::InvalidColor("#+abcde".into()))
        );
        assert!(Palette::from_hex(&["-abcde"]).is_err());
        assert!(Palette::from_hex(&["ff0000"]).is_ok());
    }

    #[test]
    fn test_point_size_attenuates_with_depth() {
        let near = point_size(45.0, 1.0, 1.0, -5.0);
        let far = point_size(45.0, 1.0, 1.0, -25.0);
        assert!((near - 9.0).abs() < 1e-5);
        assert!((far - 1.8).abs() < 1e-5);
        assert!((point_size(45.0, 2.0, 2.0, -25.0) - 7.2).abs() < 1e-5);
    }

    #[test]
    fn test_glow_falloff() {
        assert_eq!(glow_strength(0.0), 1.0);
        assert!((glow_strength(0.5) - 0.125).abs() < 1e-6);
        let (rgb, a) = glow(Vec3::new(1.0, 0.5, 0.0), 0.5);
        assert!((a - 0.125).abs() < 1e-6);
        assert!((rgb.y - 0.0625).abs() < 1e-6);
    }

    #[test]
    fn test_breathing_is_bounded() {
        let style = PointStyle::default();
        let p = Vec3::new(1.3, -2.0, 0.7);
        for i in 0..50 {
            let q = breathe(p, i as f32 * 0.37, &style);
            assert!((q - p).abs().max_element() <= style.breathing_amplitude + 1e-6);
            assert_eq!(q.z, p.z);
        }
    }

    #[test]
    fn test_bright_pass_threshold() {
        let dim = Vec3::splat(0.1);
        let bright = Vec3::splat(0.9);
        assert_eq!(bright_pass(dim, 0.2), Vec3::ZERO);
        assert_eq!(bright_pass(bright, 0.2), bright);
        let mid = bright_pass(Vec3::splat(0.25), 0.2);
        assert!(mid.x > 0.0 && mid.x < 0.25);
    }

    #[test]
    fn test_downsample_preserves_energy() {
        let [center, corner, edge, inner] = DOWNSAMPLE_WEIGHTS;
        assert!((center + 4.0 * (corner + edge + inner) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_upsample_radius_blends_levels() {
        let fine = Vec3::new(1.0, 0.0, 0.0);
        let coarse = Vec3::new(0.0, 0.0, 1.0);
        assert_eq!(upsample_mix(fine, coarse, 0.0), fine);
        assert_eq!(upsample_mix(fine, coarse, 1.0), coarse);
        let mixed = upsample_mix(fine, coarse, 0.6);
        assert!((mixed - Vec3::new(0.4, 0.0, 0.6)).length() < 1e-6);
    }

    #[test]
    fn test_bloom_validation() {
        let mut v = VisualConfig::new();
        assert!(v.validate().is_ok());
        v.bloom(BloomConfig { intensity: -1.0, ..Default::default() });
        assert_eq!(v.validate(), Err(ConfigError::InvalidBloom("intensity")));
        v.bloom(BloomConfig { radius: 1.5, ..Default::default() });
        assert_eq!(v.validate(), Err(ConfigError::InvalidBloom("radius")));
        v.bloom(BloomConfig::default()).point_size(0.0);
        assert_eq!(v.validate(), Err(ConfigError::InvalidPointSize(0.0)));
    }
}
