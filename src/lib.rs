//! # Nebula - Particle Morphing Engine
//!
//! A field of glowing particles that morphs between precomputed 3D shapes on
//! every click.
//!
//! Nebula generates one target cloud per shape up front, then eases every
//! particle a fixed fraction of the way toward the active cloud each frame.
//! The GPU side draws the live buffer as additive point sprites and runs a
//! bloom pass over the result.
//!
//! ## Quick Start
//!
//! ```ignore
//! use nebula::prelude::*;
//!
//! fn main() -> Result<(), RunError> {
//!     Nebula::new()
//!         .with_particle_count(18_000)
//!         .with_title("Celestial Tree")
//!         .run()
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### Clouds
//!
//! [`ParticleClouds`] holds four position sets of equal length (tree, heart,
//! galaxy and explosion) plus one color and one scale per particle. Index `i`
//! refers to the same particle in every cloud, so morphing never reassigns
//! particles.
//!
//! ### Morph
//!
//! [`Morph`] owns the live positions. Each tick moves every particle by
//! `(target - current) * speed`, so the remaining distance decays
//! geometrically and a retarget mid-flight continues smoothly from wherever
//! the particles are.
//!
//! ### Sequence
//!
//! Clicks step through [`Shape::SEQUENCE`]:
//!
//! | Step | Shape | Cloud |
//! |------|-------|-------|
//! | 0 | [`Shape::Tree`] | tree |
//! | 1 | [`Shape::Explosion1`] | explosion |
//! | 2 | [`Shape::Heart`] | heart |
//! | 3 | [`Shape::Explosion2`] | explosion |
//! | 4 | [`Shape::Galaxy`] | galaxy |
//! | 5 | [`Shape::Explosion3`] | explosion |
//!
//! After the last step the cycle starts again at the tree.
//!
//! ## Headless Use
//!
//! [`Scene`] bundles clouds, morph and sequence without touching the GPU:
//!
//! ```
//! use nebula::{NebulaConfig, Scene};
//!
//! let config = NebulaConfig { particle_count: 100, seed: Some(7), ..Default::default() };
//! let mut scene = Scene::new(&config).unwrap();
//! scene.advance();
//! for _ in 0..200 {
//!     scene.tick();
//! }
//! assert!(scene.morph().max_distance(scene.target()) < 1e-3);
//! ```

pub mod cloud;
pub mod config;
pub mod error;
mod gpu;
pub mod input;
pub mod morph;
mod nebula;
pub mod scene;
pub mod selector;
pub mod shaders;
pub mod spawn;
pub mod starfield;
pub mod time;
pub mod visuals;

pub use cloud::{CloudKind, ParticleClouds};
pub use config::{NebulaConfig, MAX_PARTICLE_COUNT, PARTICLE_COUNT};
pub use error::{ConfigError, GpuError, RunError};
pub use glam::{Mat4, Vec2, Vec3};
pub use gpu::{CameraConfig, OrbitCamera};
pub use morph::Morph;
pub use nebula::Nebula;
pub use scene::Scene;
pub use selector::{Shape, ShapeSequence};
pub use spawn::SpawnContext;
pub use starfield::{Starfield, StarfieldConfig};
pub use visuals::{BloomConfig, Palette, PointStyle, VisualConfig};

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use nebula::prelude::*;
/// ```
pub mod prelude {
    pub use crate::cloud::{CloudKind, ParticleClouds};
    pub use crate::config::NebulaConfig;
    pub use crate::error::{ConfigError, GpuError, RunError};
    pub use crate::gpu::{CameraConfig, OrbitCamera};
    pub use crate::morph::Morph;
    pub use crate::nebula::Nebula;
    pub use crate::scene::Scene;
    pub use crate::selector::{Shape, ShapeSequence};
    pub use crate::starfield::StarfieldConfig;
    pub use crate::visuals::{BloomConfig, Palette, PointStyle, VisualConfig};
    pub use crate::{Vec2, Vec3};
}
