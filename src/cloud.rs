//! Shape point-cloud generation.
//!
//! Every particle index `i` appears in every cloud: the tree, heart, galaxy and
//! explosion arrays hold particle `i`'s position for that shape, while its color
//! and scale are drawn once and shared by all shapes.
//!
//! Clouds are generated once, up front, and are read-only afterwards.

use glam::Vec3;
use std::f32::consts::TAU;

use crate::error::ConfigError;
use crate::spawn::SpawnContext;
use crate::visuals::Palette;

/// Cone height of the tree.
pub const TREE_HEIGHT: f32 = 15.0;
/// Base radius of the tree.
pub const TREE_RADIUS: f32 = 6.0;
/// Uniform scale applied to the parametric heart curve.
pub const HEART_SCALE: f32 = 0.35;
/// Number of spiral arms in the galaxy.
pub const GALAXY_ARMS: usize = 5;
/// Outer radius of the galaxy disk.
pub const GALAXY_RADIUS: f32 = 12.0;
/// Radius of the explosion sphere.
pub const EXPLOSION_RADIUS: f32 = 18.0;
/// Smallest per-particle scale.
pub const MIN_SCALE: f32 = 0.5;
/// Largest per-particle scale.
pub const MAX_SCALE: f32 = 2.0;

/// The distinct point clouds a particle field can morph toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CloudKind {
    Tree,
    Heart,
    Galaxy,
    Explosion,
}

impl CloudKind {
    /// All cloud kinds, in generation order.
    pub const ALL: [CloudKind; 4] = [
        CloudKind::Tree,
        CloudKind::Heart,
        CloudKind::Galaxy,
        CloudKind::Explosion,
    ];
}

/// Precomputed target positions for every shape, plus shared per-particle attributes.
#[derive(Debug, Clone)]
pub struct ParticleClouds {
    tree: Vec<Vec3>,
    heart: Vec<Vec3>,
    galaxy: Vec<Vec3>,
    explosion: Vec<Vec3>,
    colors: Vec<Vec3>,
    scales: Vec<f32>,
}

impl ParticleClouds {
    /// Generate all clouds for `count` particles.
    pub fn generate(count: usize, palette: &Palette, ctx: &mut SpawnContext) -> Result<Self, ConfigError> {
        if count == 0 {
            return Err(ConfigError::NoParticles);
        }
        if palette.is_empty() {
            return Err(ConfigError::EmptyPalette);
        }

        let mut clouds = Self {
            tree: Vec::with_capacity(count),
            heart: Vec::with_capacity(count),
            galaxy: Vec::with_capacity(count),
            explosion: Vec::with_capacity(count),
            colors: Vec::with_capacity(count),
            scales: Vec::with_capacity(count),
        };

        for i in 0..count {
            clouds.colors.push(ctx.pick_color(palette));
            clouds.scales.push(ctx.random() * (MAX_SCALE - MIN_SCALE) + MIN_SCALE);
            clouds.tree.push(tree_point(ctx));
            clouds.heart.push(heart_point(ctx));
            clouds.galaxy.push(galaxy_point(i, ctx));
            clouds.explosion.push(ctx.random_in_sphere(EXPLOSION_RADIUS));
        }

        tracing::info!(
            particles = count,
            palette = palette.len(),
            "generated {} shape clouds",
            CloudKind::ALL.len()
        );

        Ok(clouds)
    }

    /// Target positions for one cloud.
    pub fn positions(&self, kind: CloudKind) -> &[Vec3] {
        match kind {
            CloudKind::Tree => &self.tree,
            CloudKind::Heart => &self.heart,
            CloudKind::Galaxy => &self.galaxy,
            CloudKind::Explosion => &self.explosion,
        }
    }

    /// Per-particle linear RGB colors, shared by all clouds.
    pub fn colors(&self) -> &[Vec3] {
        &self.colors
    }

    /// Per-particle size multipliers in `[0.5, 2.0)`, shared by all clouds.
    pub fn scales(&self) -> &[f32] {
        &self.scales
    }

    /// Number of particles.
    pub fn len(&self) -> usize {
        self.scales.len()
    }

    /// Always false; generation rejects a zero count.
    pub fn is_empty(&self) -> bool {
        self.scales.is_empty()
    }
}

/// Spiral cone: radius shrinks with height, angle winds with height.
fn tree_point(ctx: &mut SpawnContext) -> Vec3 {
    let u = ctx.random();
    let y = (u - 0.5) * TREE_HEIGHT;
    let radius = (1.0 - u) * TREE_RADIUS;

    let angle = y * 4.0 + ctx.random_angle();
    let thickness = ctx.random() * 1.5 * (1.0 - u);
    let r = radius + ctx.centered() * thickness;

    Vec3::new(angle.cos() * r, y - 2.0, angle.sin() * r)
}

/// Parametric heart, filled by scattering each curve point toward the center.
fn heart_point(ctx: &mut SpawnContext) -> Vec3 {
    let t = ctx.random_angle();
    let hx = 16.0 * t.sin().powi(3);
    let hy = 13.0 * t.cos() - 5.0 * (2.0 * t).cos() - 2.0 * (3.0 * t).cos() - (4.0 * t).cos();

    // Thin at the top and bottom cusps
    let z = ctx.centered() * 4.0 * t.sin().abs();
    let scatter = ctx.random().sqrt();

    Vec3::new(
        hx * HEART_SCALE * scatter,
        hy * HEART_SCALE * scatter + 2.0,
        z * scatter,
    )
}

/// One of five spiral arms; the disk thins toward the rim.
fn galaxy_point(index: usize, ctx: &mut SpawnContext) -> Vec3 {
    let arm = index % GALAXY_ARMS;
    let spin = ctx.random() * GALAXY_RADIUS;
    let arm_angle = (arm as f32 / GALAXY_ARMS as f32) * TAU;
    let angle = spin + arm_angle;

    let y = ctx.centered() * (2.0 / (spin * 0.1 + 1.0));
    let x = angle.cos() * spin + ctx.centered() * 0.5;
    let z = angle.sin() * spin + ctx.centered() * 0.5;

    Vec3::new(x, y, z)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clouds(count: usize, seed: u64) -> ParticleClouds {
        ParticleClouds::generate(count, &Palette::celestial(), &mut SpawnContext::from_seed(seed)).unwrap()
    }

    #[test]
    fn test_zero_count_rejected() {
        let err = ParticleClouds::generate(0, &Palette::celestial(), &mut SpawnContext::from_seed(0));
        assert_eq!(err.unwrap_err(), ConfigError::NoParticles);
    }

    #[test]
    fn test_attribute_ranges() {
        let palette = Palette::celestial();
        let c = clouds(5_000, 11);
        assert_eq!(c.len(), 5_000);
        for (color, scale) in c.colors().iter().zip(c.scales()) {
            assert!(palette.contains(*color));
            assert!((MIN_SCALE..=MAX_SCALE).contains(scale));
        }
    }

    #[test]
    fn test_all_positions_finite() {
        let c = clouds(5_000, 12);
        for kind in CloudKind::ALL {
            let pts = c.positions(kind);
            assert_eq!(pts.len(), 5_000);
            assert!(pts.iter().all(|p| p.is_finite()), "{:?} has non-finite points", kind);
        }
    }

    #[test]
    fn test_explosion_within_radius() {
        let c = clouds(5_000, 13);
        for p in c.positions(CloudKind::Explosion) {
            assert!(p.length() <= EXPLOSION_RADIUS + 1e-3);
        }
    }

    #[test]
    fn test_tree_is_a_cone() {
        let c = clouds(5_000, 14);
        for p in c.positions(CloudKind::Tree) {
            // y in [-9.5, 5.5), radius bounded by the base plus jitter
            assert!(p.y >= -TREE_HEIGHT / 2.0 - 2.0 - 1e-4 && p.y < TREE_HEIGHT / 2.0 - 2.0 + 1e-4);
            let u = (p.y + 2.0) / TREE_HEIGHT + 0.5;
            let max_r = (1.0 - u) * (TREE_RADIUS + 0.75) + 1e-3;
            assert!(Vec3::new(p.x, 0.0, p.z).length() <= max_r);
        }
    }

    #[test]
    fn test_heart_bounds() {
        let c = clouds(5_000, 15);
        for p in c.positions(CloudKind::Heart) {
            assert!(p.x.abs() <= 16.0 * HEART_SCALE + 1e-4);
            assert!(p.z.abs() <= 2.0 + 1e-4);
        }
    }

    #[test]
    fn test_galaxy_is_flat_disk() {
        let c = clouds(5_000, 16);
        for p in c.positions(CloudKind::Galaxy) {
            assert!(p.y.abs() <= 1.0 + 1e-4);
            assert!(Vec3::new(p.x, 0.0, p.z).length() <= GALAXY_RADIUS + 0.5);
        }
    }

    #[test]
    fn test_galaxy_points_hug_their_arm() {
        // Each point lies within the jitter box of its own arm's spiral curve
        let c = clouds(300, 17);
        for (i, p) in c.positions(CloudKind::Galaxy).iter().enumerate() {
            let arm_angle = (i % GALAXY_ARMS) as f32 / GALAXY_ARMS as f32 * TAU;
            let closest = (0..=12_000)
                .map(|s| {
                    let spin = s as f32 * 0.001;
                    let on_arm = Vec3::new((spin + arm_angle).cos() * spin, 0.0, (spin + arm_angle).sin() * spin);
                    (Vec3::new(p.x, 0.0, p.z) - on_arm).length()
                })
                .fold(f32::MAX, f32::min);
            assert!(closest <= 0.36, "particle {} is {} from its arm", i, closest);
        }
    }
}
