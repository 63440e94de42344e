//! The single per-frame driver. Every visualization system runs inside one of
//! the [`FrameSet`]s below, and the sets are chained so a frame always moves
//! nodes first, then culls, picks LOD tiers, advances particles and finally
//! projects the overlay.

use bevy::prelude::*;

use super::quality::apply_quality_changes;
use super::stats::visible_count_notification_system;
use crate::engine::camera::viewport_camera::camera_controller;
use crate::engine::core::app_state::AppState;
use crate::engine::culling::update_frustum_culling;
use crate::engine::lod::update_node_lod;
use crate::engine::particles::{
    advance_particle_streams, apply_connection_visibility, refresh_stream_endpoints,
    sync_particle_mesh,
};
use crate::engine::scene::backbone::apply_auxiliary_geometry;
use crate::engine::scene::labels::update_node_labels;
use crate::engine::transition::advance_view_transition;

#[cfg(not(target_arch = "wasm32"))]
use super::scene_settings::scene_shortcut_system;
#[cfg(not(target_arch = "wasm32"))]
use super::stats::stats_text_update_system;

#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameSet {
    /// Settings changes from shortcuts and quality switches.
    Input,
    Transition,
    Culling,
    Lod,
    Streams,
    Overlay,
}

pub struct RenderLoopPlugin;

impl Plugin for RenderLoopPlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(
            Update,
            (
                FrameSet::Input,
                FrameSet::Transition,
                FrameSet::Culling,
                FrameSet::Lod,
                FrameSet::Streams,
                FrameSet::Overlay,
            )
                .chain()
                .run_if(in_state(AppState::Running)),
        );

        #[cfg(not(target_arch = "wasm32"))]
        app.add_systems(
            Update,
            scene_shortcut_system
                .before(apply_quality_changes)
                .in_set(FrameSet::Input),
        );

        app.add_systems(Update, apply_quality_changes.in_set(FrameSet::Input))
            .add_systems(
                Update,
                (
                    advance_view_transition,
                    camera_controller,
                    apply_auxiliary_geometry,
                )
                    .chain()
                    .in_set(FrameSet::Transition),
            )
            .add_systems(Update, update_frustum_culling.in_set(FrameSet::Culling))
            .add_systems(Update, update_node_lod.in_set(FrameSet::Lod))
            .add_systems(
                Update,
                (
                    apply_connection_visibility,
                    refresh_stream_endpoints,
                    advance_particle_streams,
                    sync_particle_mesh,
                )
                    .chain()
                    .in_set(FrameSet::Streams),
            )
            .add_systems(
                Update,
                (update_node_labels, visible_count_notification_system).in_set(FrameSet::Overlay),
            );

        #[cfg(not(target_arch = "wasm32"))]
        app.add_systems(Update, stats_text_update_system.in_set(FrameSet::Overlay));
    }
}
