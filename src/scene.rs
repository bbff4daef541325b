//! The simulation state advanced once per frame.
//!
//! A [`Scene`] owns the precomputed clouds, the live morph buffer and the shape
//! sequence. The renderer reads it after [`Scene::tick`]; input only ever calls
//! [`Scene::advance`]. Nothing here touches the GPU, so the whole morph can be
//! driven headless.

use glam::{Mat4, Vec3};
use std::sync::Arc;

use crate::cloud::ParticleClouds;
use crate::config::NebulaConfig;
use crate::error::ConfigError;
use crate::morph::Morph;
use crate::selector::{Shape, ShapeSequence};
use crate::spawn::SpawnContext;

/// Clouds, live buffer and selector for one particle field.
#[derive(Debug, Clone)]
pub struct Scene {
    clouds: Arc<ParticleClouds>,
    morph: Morph,
    sequence: ShapeSequence,
}

impl Scene {
    /// Validate `config`, generate the clouds and start on the first shape.
    pub fn new(config: &NebulaConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut ctx = match config.seed {
            Some(seed) => SpawnContext::from_seed(seed),
            None => SpawnContext::from_entropy(),
        };
        let clouds = ParticleClouds::generate(config.particle_count, &config.palette, &mut ctx)?;
        Self::from_clouds(Arc::new(clouds), config)
    }

    /// Build a scene over clouds that were generated elsewhere.
    ///
    /// `config` is validated here too, and must ask for exactly as many
    /// particles as `clouds` holds.
    pub fn from_clouds(clouds: Arc<ParticleClouds>, config: &NebulaConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        if clouds.len() != config.particle_count {
            return Err(ConfigError::ParticleCountMismatch {
                expected: config.particle_count,
                actual: clouds.len(),
            });
        }
        let sequence = ShapeSequence::new(config.sequence.clone())?;
        let start = clouds.positions(sequence.current().cloud());
        let morph = Morph::new(start, config.morph_speed, config.spin_per_tick);
        Ok(Self {
            clouds,
            morph,
            sequence,
        })
    }

    /// Move every particle one step toward the current shape.
    pub fn tick(&mut self) {
        let target = self.clouds.positions(self.sequence.current().cloud());
        self.morph.tick(target);
    }

    /// Switch to the next shape in the sequence.
    pub fn advance(&mut self) {
        self.sequence.advance();
        tracing::info!(shape = ?self.sequence.current(), index = self.sequence.index(), "shape changed");
    }

    /// Shape the particles are heading toward.
    pub fn current_shape(&self) -> Shape {
        self.sequence.current()
    }

    /// Target positions of the current shape.
    pub fn target(&self) -> &[Vec3] {
        self.clouds.positions(self.sequence.current().cloud())
    }

    /// Live positions in model space.
    pub fn positions(&self) -> &[Vec3] {
        self.morph.positions()
    }

    pub fn colors(&self) -> &[Vec3] {
        self.clouds.colors()
    }

    pub fn scales(&self) -> &[f32] {
        self.clouds.scales()
    }

    /// Rotation applied to the whole cloud.
    pub fn model_matrix(&self) -> Mat4 {
        self.morph.model_matrix()
    }

    pub fn clouds(&self) -> &Arc<ParticleClouds> {
        &self.clouds
    }

    pub fn morph(&self) -> &Morph {
        &self.morph
    }

    pub fn sequence(&self) -> &ShapeSequence {
        &self.sequence
    }

    /// Number of particles.
    pub fn len(&self) -> usize {
        self.clouds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clouds.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloud::CloudKind;

    fn small_config() -> NebulaConfig {
        NebulaConfig {
            particle_count: 64,
            seed: Some(99),
            ..Default::default()
        }
    }

    #[test]
    fn test_starts_as_tree() {
        let scene = Scene::new(&small_config()).unwrap();
        assert_eq!(scene.current_shape(), Shape::Tree);
        assert_eq!(scene.positions(), scene.clouds().positions(CloudKind::Tree));
    }

    #[test]
    fn test_invalid_config_fails_fast() {
        let cfg = NebulaConfig { particle_count: 0, ..small_config() };
        assert_eq!(Scene::new(&cfg).unwrap_err(), ConfigError::NoParticles);
    }

    #[test]
    fn test_tick_follows_current_shape() {
        let mut scene = Scene::new(&small_config()).unwrap();
        scene.advance();
        assert_eq!(scene.current_shape(), Shape::Explosion1);
        let before = scene.morph().max_distance(scene.target());
        scene.tick();
        let after = scene.morph().max_distance(scene.target());
        assert!(after < before);
    }

    #[test]
    fn test_prebuilt_clouds_still_validate_config() {
        let clouds = Arc::clone(Scene::new(&small_config()).unwrap().clouds());

        let cfg = NebulaConfig { morph_speed: f32::NAN, ..small_config() };
        let err = Scene::from_clouds(Arc::clone(&clouds), &cfg).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidMorphSpeed(v) if v.is_nan()));

        let cfg = NebulaConfig { particle_count: 65, ..small_config() };
        assert_eq!(
            Scene::from_clouds(Arc::clone(&clouds), &cfg).unwrap_err(),
            ConfigError::ParticleCountMismatch { expected: 65, actual: 64 }
        );

        let mut scene = Scene::from_clouds(clouds, &small_config()).unwrap();
        scene.advance();
        scene.tick();
        assert!(scene.positions().iter().all(|p| p.is_finite()));
    }

    #[test]
    fn test_same_seed_same_field() {
        let a = Scene::new(&small_config()).unwrap();
        let b = Scene::new(&small_config()).unwrap();
        assert_eq!(a.positions(), b.positions());
        assert_eq!(a.colors(), b.colors());
    }
}
