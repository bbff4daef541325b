//! Static star backdrop.
//!
//! Stars are drawn through the same point-sprite stage as the particles, but
//! they never move, rotate or breathe.

use glam::Vec3;

use crate::spawn::SpawnContext;

/// Star backdrop settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StarfieldConfig {
    /// Whether the backdrop is drawn.
    pub enabled: bool,
    /// Number of stars.
    pub count: usize,
    /// Inner radius of the star shell.
    pub radius: f32,
    /// Thickness of the star shell.
    pub depth: f32,
    /// Size multiplier applied to every star.
    pub factor: f32,
}

impl Default for StarfieldConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            count: 5000,
            radius: 100.0,
            depth: 50.0,
            factor: 4.0,
        }
    }
}

/// Generated star positions and attributes.
#[derive(Debug, Clone)]
pub struct Starfield {
    pub positions: Vec<Vec3>,
    pub colors: Vec<Vec3>,
    pub scales: Vec<f32>,
}

impl Starfield {
    /// Scatter `config.count` grey stars in a spherical shell.
    pub fn generate(config: &StarfieldConfig, ctx: &mut SpawnContext) -> Self {
        let n = config.count;
        let mut positions = Vec::with_capacity(n);
        let mut colors = Vec::with_capacity(n);
        let mut scales = Vec::with_capacity(n);

        for _ in 0..n {
            positions.push(ctx.random_in_shell(config.radius, config.depth));
            colors.push(Vec3::splat(ctx.random_range(0.5, 1.0)));
            scales.push(config.factor * ctx.random_range(0.5, 1.0));
        }

        Self {
            positions,
            colors,
            scales,
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stars_sit_in_shell() {
        let cfg = StarfieldConfig::default();
        let stars = Starfield::generate(&cfg, &mut SpawnContext::from_seed(2));
        assert_eq!(stars.len(), 5000);
        for ((p, c), s) in stars.positions.iter().zip(&stars.colors).zip(&stars.scales) {
            let r = p.length();
            assert!(r >= 99.99 && r <= 150.01);
            // Zero saturation
            assert_eq!(c.x, c.y);
            assert_eq!(c.y, c.z);
            assert!(*s >= 2.0 && *s < 4.0);
        }
    }
}
