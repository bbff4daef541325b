//! Per-tick morphing of the live particle buffer.
//!
//! Each tick closes a fixed fraction of the remaining distance between every
//! particle and its target:
//!
//! ```text
//! position += (target - position) * speed
//! ```
//!
//! so the error after `k` ticks is `(1 - speed)^k` of where it started. There is
//! no "arrived" state; swapping targets mid-flight just bends the paths toward
//! the new cloud without any jump.
//!
//! The whole cloud also spins slowly about +Y. The spin is kept as an angle and
//! applied through the model matrix, so it never feeds back into the positions.

use glam::{Mat4, Vec3};

/// Fraction of the remaining distance closed per tick.
pub const DEFAULT_MORPH_SPEED: f32 = 0.08;
/// Whole-cloud rotation per tick, in radians.
pub const DEFAULT_SPIN_PER_TICK: f32 = 0.001;

/// The live position buffer and its rotation.
#[derive(Debug, Clone)]
pub struct Morph {
    positions: Vec<Vec3>,
    speed: f32,
    spin_per_tick: f32,
    rotation: f32,
}

impl Morph {
    /// Start from a copy of `initial`.
    pub fn new(initial: &[Vec3], speed: f32, spin_per_tick: f32) -> Self {
        Self {
            positions: initial.to_vec(),
            speed,
            spin_per_tick,
            rotation: 0.0,
        }
    }

    /// Advance one tick toward `target`.
    ///
    /// `target` must have one entry per particle.
    pub fn tick(&mut self, target: &[Vec3]) {
        debug_assert_eq!(target.len(), self.positions.len());
        let speed = self.speed;
        for (p, t) in self.positions.iter_mut().zip(target) {
            *p += (*t - *p) * speed;
        }
        self.rotation += self.spin_per_tick;
    }

    /// Current positions, in model space.
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Accumulated rotation about +Y, in radians.
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    /// Model matrix carrying the accumulated rotation.
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_rotation_y(self.rotation)
    }

    /// Fraction of remaining distance closed per tick.
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Largest per-particle distance to `target`.
    pub fn max_distance(&self, target: &[Vec3]) -> f32 {
        self.positions
            .iter()
            .zip(target)
            .map(|(p, t)| p.distance(*t))
            .fold(0.0, f32::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_tick_closes_fraction() {
        let mut m = Morph::new(&[Vec3::ZERO], 0.08, 0.0);
        m.tick(&[Vec3::new(10.0, -5.0, 1.0)]);
        let p = m.positions()[0];
        assert!((p - Vec3::new(0.8, -0.4, 0.08)).length() < 1e-6);
    }

    #[test]
    fn test_geometric_decay() {
        let start = Vec3::new(3.0, -7.0, 12.0);
        let target = Vec3::new(-1.0, 2.0, 0.5);
        let mut m = Morph::new(&[start], 0.08, 0.0);
        for k in 1..=60 {
            m.tick(&[target]);
            let expected = (target - start) * 0.92f32.powi(k);
            let actual = target - m.positions()[0];
            assert!((actual - expected).length() < 1e-3, "tick {}", k);
        }
    }

    #[test]
    fn test_retarget_is_continuous() {
        let mut m = Morph::new(&[Vec3::ZERO], 0.08, 0.0);
        for _ in 0..10 {
            m.tick(&[Vec3::X * 10.0]);
        }
        let before = m.positions()[0];
        m.tick(&[Vec3::Y * 10.0]);
        let after = m.positions()[0];
        // One tick moves at most speed * remaining distance
        assert!(before.distance(after) <= 0.08 * before.distance(Vec3::Y * 10.0) + 1e-5);
    }

    #[test]
    fn test_spin_accumulates_regardless_of_target() {
        let mut m = Morph::new(&[Vec3::ONE], 0.08, 0.001);
        for _ in 0..100 {
            m.tick(&[Vec3::ONE]);
        }
        assert!((m.rotation() - 0.1).abs() < 1e-4);
        assert_eq!(m.positions()[0], Vec3::ONE);
        let rotated = m.model_matrix().transform_point3(Vec3::X);
        let a = m.rotation();
        assert!((rotated - Vec3::new(a.cos(), 0.0, -a.sin())).length() < 1e-5);
    }
}
