//! Per-frame runtime systems that sit above the visualization core.
//!
//! Owns the explicit scene settings, the ordered render loop, quality
//! switching and the read-only statistics exposed to the hosting page.

/// Quality level switching at runtime.
///
/// Rebuilds the LOD geometry cache, re-requests particle streams with the new
/// density and reconfigures camera post-processing.
pub mod quality;

/// Ordered per-frame system sets and their registration.
pub mod render_loop;

/// Explicit scene state and the native keyboard shortcuts that drive it.
pub mod scene_settings;

/// Visible-count statistics, RPC notifications and the native overlay.
pub mod stats;
