//! Viewport camera for orbiting the node scene.
//!
//! Provides drag-to-orbit and wheel zoom around the scene focus, the camera
//! move that accompanies layout switches, and per-quality camera setup.

/// Viewport camera resource, controller system and quality configuration.
pub mod viewport_camera;

pub use viewport_camera::{ResetCamera, ViewportCamera};
