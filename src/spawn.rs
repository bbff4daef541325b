//! Sampling helpers for point-cloud generation.
//!
//! Wraps a seeded RNG with the handful of distributions the shape and star
//! generators need, so generator code reads as geometry rather than RNG plumbing.

use glam::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;

use crate::visuals::Palette;

/// Random source handed to generator functions.
///
/// ```ignore
/// let mut ctx = SpawnContext::from_seed(7);
/// let p = ctx.random_in_sphere(18.0);
/// let c = ctx.pick_color(&palette);
/// ```
pub struct SpawnContext {
    rng: SmallRng,
}

impl SpawnContext {
    /// Context seeded from OS entropy; visuals differ on every launch.
    pub fn from_entropy() -> Self {
        Self {
            rng: SmallRng::from_entropy(),
        }
    }

    /// Deterministic context, for tests and reproducible captures.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    // ========== Random primitives ==========

    /// Random f32 in `[0, 1)`.
    #[inline]
    pub fn random(&mut self) -> f32 {
        self.rng.gen()
    }

    /// Random f32 in `[-0.5, 0.5)`.
    #[inline]
    pub fn centered(&mut self) -> f32 {
        self.rng.gen::<f32>() - 0.5
    }

    /// Random f32 in the given range.
    #[inline]
    pub fn random_range(&mut self, min: f32, max: f32) -> f32 {
        self.rng.gen_range(min..max)
    }

    /// Random angle in `[0, 2π)`.
    #[inline]
    pub fn random_angle(&mut self) -> f32 {
        self.rng.gen::<f32>() * TAU
    }

    // ========== Position helpers ==========

    /// Random point inside a sphere of given radius, centered at origin.
    ///
    /// Polar angle is drawn as `acos(2v - 1)` and radius as `cbrt(w) * radius`,
    /// which keeps the density uniform through the volume rather than piling
    /// points near the poles or the surface.
    pub fn random_in_sphere(&mut self, radius: f32) -> Vec3 {
        let theta = self.random_angle();
        let phi = (2.0 * self.random() - 1.0).clamp(-1.0, 1.0).acos();
        let r = self.random().cbrt() * radius;
        spherical(r, theta, phi)
    }

    /// Random point in the spherical shell between `inner` and `inner + depth`.
    pub fn random_in_shell(&mut self, inner: f32, depth: f32) -> Vec3 {
        let theta = self.random_angle();
        let phi = (2.0 * self.random() - 1.0).clamp(-1.0, 1.0).acos();
        let r = inner + self.random() * depth;
        spherical(r, theta, phi)
    }

    // ========== Attribute helpers ==========

    /// Uniformly pick one palette entry.
    pub fn pick_color(&mut self, palette: &Palette) -> Vec3 {
        let colors = palette.colors();
        colors[self.rng.gen_range(0..colors.len())]
    }
}

#[inline]
fn spherical(r: f32, theta: f32, phi: f32) -> Vec3 {
    let sin_phi = phi.sin();
    Vec3::new(
        r * sin_phi * theta.cos(),
        r * sin_phi * theta.sin(),
        r * phi.cos(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_contexts_repeat() {
        let mut a = SpawnContext::from_seed(42);
        let mut b = SpawnContext::from_seed(42);
        for _ in 0..16 {
            assert_eq!(a.random(), b.random());
        }
    }

    #[test]
    fn test_centered_range() {
        let mut ctx = SpawnContext::from_seed(1);
        for _ in 0..1000 {
            let v = ctx.centered();
            assert!((-0.5..0.5).contains(&v));
        }
    }

    #[test]
    fn test_sphere_and_shell_bounds() {
        let mut ctx = SpawnContext::from_seed(3);
        for _ in 0..2000 {
            assert!(ctx.random_in_sphere(18.0).length() <= 18.0 + 1e-3);
            let s = ctx.random_in_shell(100.0, 50.0).length();
            assert!(s >= 100.0 - 1e-2 && s <= 150.0 + 1e-2);
        }
    }

    #[test]
    fn test_sphere_is_volume_uniform() {
        // Uniform volume density puts ~1/8 of points inside half the radius
        let mut ctx = SpawnContext::from_seed(9);
        let n = 20_000;
        let inner = (0..n)
            .filter(|_| ctx.random_in_sphere(1.0).length() < 0.5)
            .count();
        let frac = inner as f32 / n as f32;
        assert!((frac - 0.125).abs() < 0.02, "inner fraction {}", frac);
    }

    #[test]
    fn test_pick_color_from_palette() {
        let palette = Palette::celestial();
        let mut ctx = SpawnContext::from_seed(5);
        for _ in 0..200 {
            assert!(palette.contains(ctx.pick_color(&palette)));
        }
    }
}
