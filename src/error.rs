//! Error types for Nebula.
//!
//! Every failure here is an initialization failure: bad configuration,
//! no usable GPU, or a window/event loop that could not be created.

use std::fmt;

/// Errors produced while validating a [`NebulaConfig`](crate::NebulaConfig).
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Particle count must be at least one.
    NoParticles,
    /// Particle count exceeds what a single vertex buffer can hold.
    TooManyParticles {
        /// Requested count.
        count: usize,
        /// Largest accepted count.
        max: usize,
    },
    /// Prebuilt clouds do not hold the configured number of particles.
    ParticleCountMismatch {
        /// Count from the configuration.
        expected: usize,
        /// Count in the clouds.
        actual: usize,
    },
    /// The color palette has no entries.
    EmptyPalette,
    /// A palette entry is not a `#rrggbb` hex string.
    InvalidColor(String),
    /// The shape sequence has no entries.
    EmptySequence,
    /// Morph speed must lie in `(0, 1]`.
    InvalidMorphSpeed(f32),
    /// Per-tick spin must be finite.
    InvalidSpin(f32),
    /// Zoom bounds or start distance are inconsistent.
    InvalidZoomRange {
        /// Closest allowed camera distance.
        min: f32,
        /// Farthest allowed camera distance.
        max: f32,
        /// Initial camera distance.
        start: f32,
    },
    /// A bloom parameter is negative, not finite, or (radius) above 1.
    InvalidBloom(&'static str),
    /// Base point size must be positive.
    InvalidPointSize(f32),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NoParticles => write!(f, "Particle count must be greater than zero"),
            ConfigError::TooManyParticles { count, max } => {
                write!(f, "Particle count {} exceeds the maximum of {}", count, max)
            }
            ConfigError::ParticleCountMismatch { expected, actual } => write!(
                f,
                "Clouds hold {} particles but the configuration asks for {}",
                actual, expected
            ),
            ConfigError::EmptyPalette => write!(f, "Color palette must contain at least one color"),
            ConfigError::InvalidColor(s) => write!(f, "Invalid palette color '{}', expected #rrggbb", s),
            ConfigError::EmptySequence => write!(f, "Shape sequence must contain at least one shape"),
            ConfigError::InvalidMorphSpeed(v) => write!(f, "Morph speed {} is outside (0, 1]", v),
            ConfigError::InvalidSpin(v) => write!(f, "Spin per tick {} is not finite", v),
            ConfigError::InvalidZoomRange { min, max, start } => write!(
                f,
                "Invalid camera zoom range: min {}, max {}, start {}",
                min, max, start
            ),
            ConfigError::InvalidBloom(field) => write!(f, "Bloom {} is out of range", field),
            ConfigError::InvalidPointSize(v) => write!(f, "Point size {} must be greater than zero", v),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Errors that can occur during GPU initialization.
#[derive(Debug)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    SurfaceCreation(wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    NoAdapter(wgpu::RequestAdapterError),
    /// Failed to create GPU device.
    DeviceCreation(wgpu::RequestDeviceError),
    /// The surface reports no usable texture format.
    UnsupportedSurface,
    /// The surface ran out of memory while acquiring a frame.
    OutOfMemory,
    /// More point instances than a single draw call can address.
    TooManyPoints(usize),
}

impl fmt::Display for GpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpuError::SurfaceCreation(e) => write!(f, "Failed to create GPU surface: {}", e),
            GpuError::NoAdapter(e) => write!(
                f,
                "No compatible GPU adapter found ({}). Ensure your system has a GPU with WebGPU/Vulkan/Metal/DX12 support.",
                e
            ),
            GpuError::DeviceCreation(e) => write!(f, "Failed to create GPU device: {}", e),
            GpuError::UnsupportedSurface => write!(f, "Surface is not compatible with the selected adapter"),
            GpuError::OutOfMemory => write!(f, "Out of GPU memory"),
            GpuError::TooManyPoints(n) => write!(f, "{} points exceed the u32 instance range", n),
        }
    }
}

impl std::error::Error for GpuError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GpuError::SurfaceCreation(e) => Some(e),
            GpuError::NoAdapter(e) => Some(e),
            GpuError::DeviceCreation(e) => Some(e),
            GpuError::UnsupportedSurface | GpuError::OutOfMemory | GpuError::TooManyPoints(_) => None,
        }
    }
}

impl From<wgpu::CreateSurfaceError> for GpuError {
    fn from(e: wgpu::CreateSurfaceError) -> Self {
        GpuError::SurfaceCreation(e)
    }
}

impl From<wgpu::RequestAdapterError> for GpuError {
    fn from(e: wgpu::RequestAdapterError) -> Self {
        GpuError::NoAdapter(e)
    }
}

impl From<wgpu::RequestDeviceError> for GpuError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        GpuError::DeviceCreation(e)
    }
}

/// Errors that can occur when running the viewer.
#[derive(Debug)]
pub enum RunError {
    /// Configuration was rejected before anything was created.
    Config(ConfigError),
    /// Failed to create event loop.
    EventLoop(winit::error::EventLoopError),
    /// Failed to create window.
    Window(winit::error::OsError),
    /// GPU initialization or presentation failed.
    Gpu(GpuError),
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunError::Config(e) => write!(f, "Invalid configuration: {}", e),
            RunError::EventLoop(e) => write!(f, "Failed to create event loop: {}", e),
            RunError::Window(e) => write!(f, "Failed to create window: {}", e),
            RunError::Gpu(e) => write!(f, "GPU error: {}", e),
        }
    }
}

impl std::error::Error for RunError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RunError::Config(e) => Some(e),
            RunError::EventLoop(e) => Some(e),
            RunError::Window(e) => Some(e),
            RunError::Gpu(e) => Some(e),
        }
    }
}

impl From<ConfigError> for RunError {
    fn from(e: ConfigError) -> Self {
        RunError::Config(e)
    }
}

impl From<winit::error::EventLoopError> for RunError {
    fn from(e: winit::error::EventLoopError) -> Self {
        RunError::EventLoop(e)
    }
}

impl From<winit::error::OsError> for RunError {
    fn from(e: winit::error::OsError) -> Self {
        RunError::Window(e)
    }
}

impl From<GpuError> for RunError {
    fn from(e: GpuError) -> Self {
        RunError::Gpu(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_messages() {
        assert_eq!(
            ConfigError::NoParticles.to_string(),
            "Particle count must be greater than zero"
        );
        assert!(ConfigError::InvalidColor("#zz".into()).to_string().contains("#zz"));
    }

    #[test]
    fn test_run_error_wraps_config_source() {
        use std::error::Error;
        let err = RunError::from(ConfigError::EmptySequence);
        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("Invalid configuration"));
    }
}
