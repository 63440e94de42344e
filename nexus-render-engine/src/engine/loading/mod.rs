//! Dataset loading and initial scene construction.
//!
//! Loads the node dataset asset, validates it, then builds the first layout,
//! the node spheres and the influence streams before the render loop starts.

/// Dataset asset loading and validation.
///
/// A dataset that fails validation ends the app before anything is spawned.
pub mod dataset_loader;

/// Loading progress tracking resource for state transitions.
pub mod progress;

/// Scene construction once a validated dataset is available.
///
/// Computes the initial layout, spawns nodes, labels, the helix backbone and
/// one particle stream per influence edge.
pub mod scene_creator;
