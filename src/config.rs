//! Viewer configuration.
//!
//! [`NebulaConfig::default`] is the canonical setup: 18 000 particles, the
//! blue celestial palette, an 8% morph per tick and the six-step shape cycle.
//! Everything is validated once, before any buffer or window exists.

use crate::error::ConfigError;
use crate::gpu::CameraConfig;
use crate::morph::{DEFAULT_MORPH_SPEED, DEFAULT_SPIN_PER_TICK};
use crate::selector::Shape;
use crate::starfield::StarfieldConfig;
use crate::visuals::{Palette, VisualConfig};

/// Default number of particles.
pub const PARTICLE_COUNT: usize = 18_000;

/// Largest particle or star count accepted.
///
/// Keeps each 12-byte position buffer well under the 256 MiB
/// `max_buffer_size` of `wgpu::Limits::default()`.
pub const MAX_PARTICLE_COUNT: usize = 4_000_000;

/// Full configuration for a [`Nebula`](crate::Nebula) viewer.
#[derive(Debug, Clone, PartialEq)]
pub struct NebulaConfig {
    /// Number of particles in every shape cloud.
    pub particle_count: usize,
    /// Colors particles are drawn from.
    pub palette: Palette,
    /// Fraction of remaining distance closed per tick, in `(0, 1]`.
    pub morph_speed: f32,
    /// Whole-cloud rotation about +Y per tick, in radians.
    pub spin_per_tick: f32,
    /// Shapes visited on successive clicks; wraps around.
    pub sequence: Vec<Shape>,
    /// Fixed RNG seed; `None` gives a different field on every launch.
    pub seed: Option<u64>,
    /// Sprite, bloom and background settings.
    pub visuals: VisualConfig,
    /// Orbit camera settings.
    pub camera: CameraConfig,
    /// Star backdrop settings.
    pub starfield: StarfieldConfig,
    /// Window title prefix.
    pub title: String,
    /// Initial window size in logical pixels.
    pub window_size: (u32, u32),
}

impl Default for NebulaConfig {
    fn default() -> Self {
        Self {
            particle_count: PARTICLE_COUNT,
            palette: Palette::celestial(),
            morph_speed: DEFAULT_MORPH_SPEED,
            spin_per_tick: DEFAULT_SPIN_PER_TICK,
            sequence: Shape::SEQUENCE.to_vec(),
            seed: None,
            visuals: VisualConfig::default(),
            camera: CameraConfig::default(),
            starfield: StarfieldConfig::default(),
            title: "Celestial Tree".to_string(),
            window_size: (1280, 720),
        }
    }
}

impl NebulaConfig {
    /// Check every setting, failing on the first problem.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.particle_count == 0 {
            return Err(ConfigError::NoParticles);
        }
        if self.particle_count > MAX_PARTICLE_COUNT {
            return Err(ConfigError::TooManyParticles {
                count: self.particle_count,
                max: MAX_PARTICLE_COUNT,
            });
        }
        if self.starfield.enabled && self.starfield.count > MAX_PARTICLE_COUNT {
            return Err(ConfigError::TooManyParticles {
                count: self.starfield.count,
                max: MAX_PARTICLE_COUNT,
            });
        }
        if self.palette.is_empty() {
            return Err(ConfigError::EmptyPalette);
        }
        if self.sequence.is_empty() {
            return Err(ConfigError::EmptySequence);
        }
        if !(self.morph_speed > 0.0 && self.morph_speed <= 1.0) {
            return Err(ConfigError::InvalidMorphSpeed(self.morph_speed));
        }
        if !self.spin_per_tick.is_finite() {
            return Err(ConfigError::InvalidSpin(self.spin_per_tick));
        }

        let cam = &self.camera;
        let zoom_ok = cam.min_distance > 0.0
            && cam.min_distance <= cam.max_distance
            && (cam.min_distance..=cam.max_distance).contains(&cam.distance);
        if !zoom_ok {
            return Err(ConfigError::InvalidZoomRange {
                min: cam.min_distance,
                max: cam.max_distance,
                start: cam.distance,
            });
        }

        self.visuals.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let cfg = NebulaConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.particle_count, 18_000);
        assert_eq!(cfg.palette.len(), 8);
        assert_eq!(cfg.sequence.len(), 6);
        assert_eq!(cfg.morph_speed, 0.08);
    }

    #[test]
    fn test_rejects_bad_values() {
        let base = NebulaConfig::default();

        let cfg = NebulaConfig { particle_count: 0, ..base.clone() };
        assert_eq!(cfg.validate(), Err(ConfigError::NoParticles));

        let cfg = NebulaConfig { sequence: vec![], ..base.clone() };
        assert_eq!(cfg.validate(), Err(ConfigError::EmptySequence));

        let cfg = NebulaConfig { morph_speed: 0.0, ..base.clone() };
        assert_eq!(cfg.validate(), Err(ConfigError::InvalidMorphSpeed(0.0)));

        let cfg = NebulaConfig { spin_per_tick: f32::NAN, ..base.clone() };
        assert!(matches!(cfg.validate(), Err(ConfigError::InvalidSpin(_))));

        let mut cfg = base.clone();
        cfg.camera.min_distance = 60.0;
        assert!(matches!(cfg.validate(), Err(ConfigError::InvalidZoomRange { .. })));
    }

    #[test]
    fn test_particle_count_upper_bound() {
        let base = NebulaConfig::default();

        let cfg = NebulaConfig { particle_count: MAX_PARTICLE_COUNT, ..base.clone() };
        assert!(cfg.validate().is_ok());

        let cfg = NebulaConfig { particle_count: MAX_PARTICLE_COUNT + 1, ..base.clone() };
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::TooManyParticles {
                count: MAX_PARTICLE_COUNT + 1,
                max: MAX_PARTICLE_COUNT,
            })
        );

        // Positions for the largest count still fit one default-limit buffer
        let bytes = MAX_PARTICLE_COUNT as u64 * std::mem::size_of::<glam::Vec3>() as u64;
        assert!(bytes <= wgpu::Limits::default().max_buffer_size);
        assert!(MAX_PARTICLE_COUNT <= u32::MAX as usize);

        let mut cfg = base.clone();
        cfg.starfield.count = usize::MAX;
        assert!(matches!(cfg.validate(), Err(ConfigError::TooManyParticles { .. })));
        cfg.starfield.enabled = false;
        assert!(cfg.validate().is_ok());
    }
}
