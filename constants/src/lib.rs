//! Shared configuration constants for the nexus render engine.
//!
//! Everything tunable about layouts, level of detail, quality presets and the
//! particle streams lives here so the engine crate only carries behaviour.

/// Camera eye presets for each layout mode and tween timing.
pub mod camera;

/// Category domain and node palette.
pub mod category;

/// Geometry of the radial orb and double helix layouts.
pub mod layout;

/// Asset paths.
pub mod path;

/// Particle stream ranges, capacities and connection palette.
pub mod particles;

/// LOD tier table and quality presets.
pub mod render_settings;
