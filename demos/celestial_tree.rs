//! # Celestial Tree
//!
//! 18 000 glowing particles start as a blue cone tree. Click to burst them
//! into a sphere, then on through heart, galaxy and back to the tree.
//! Drag to orbit, scroll to zoom.
//!
//! Run with: `cargo run --example celestial_tree`
//!
//! Set `RUST_LOG=nebula=debug` for frame stats.

use nebula::prelude::*;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), RunError> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .try_init();

    Nebula::new()
        .with_title("Celestial Tree")
        .with_visuals(|v| {
            v.point_size(45.0);
            v.breathing(0.05);
        })
        .run()
}
