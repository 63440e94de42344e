use bevy::prelude::*;

use super::dataset_loader::LoadedNodes;
use super::progress::LoadingProgress;
use crate::engine::assets::dataset::NodeData;
use crate::engine::camera::ViewportCamera;
use crate::engine::layout::LayoutConfig;
use crate::engine::lod::LodController;
use crate::engine::particles::material::ParticleMaterial;
use crate::engine::particles::spawn_particle_stream_mesh;
use crate::engine::particles::streams::{ConnectionKind, ConnectionStreamSystem, PositionResolver};
use crate::engine::scene::backbone::spawn_helix_backbone;
use crate::engine::scene::nodes::spawn_nodes;
use crate::engine::scene::{RenderableKind, SceneNodes};
use crate::engine::systems::scene_settings::SceneSettings;
use crate::engine::transition::{AuxiliaryGeometrySignal, ViewTransitionController};

/// One influence stream per edge, from the influencer to the influenced node.
/// Returns how many edges could not be resolved yet; those stay pending on
/// the stream system and are retried every frame.
pub fn connect_influences(
    streams: &mut ConnectionStreamSystem,
    nodes: &[NodeData],
    resolver: &impl PositionResolver,
) -> usize {
    let mut unresolved = 0;
    for node in nodes {
        for source in &node.influenced_by {
            if streams
                .connect(source, &node.id, ConnectionKind::Influence, resolver)
                .is_none()
            {
                unresolved += 1;
            }
        }
    }
    unresolved
}

// Build the scene once the dataset has been validated
pub fn create_scene_when_ready(
    mut commands: Commands,
    mut loading_progress: ResMut<LoadingProgress>,
    loaded: Option<Res<LoadedNodes>>,
    settings: Res<SceneSettings>,
    config: Res<LayoutConfig>,
    mut transition: ResMut<ViewTransitionController>,
    mut viewport: ResMut<ViewportCamera>,
    mut lod: ResMut<LodController>,
    mut arena: ResMut<SceneNodes>,
    mut streams: ResMut<ConnectionStreamSystem>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut particle_materials: ResMut<Assets<ParticleMaterial>>,
    mut aux_events: EventWriter<AuxiliaryGeometrySignal>,
) {
    if loading_progress.scene_spawned || !loading_progress.dataset_loaded {
        return;
    }
    let Some(loaded) = loaded else {
        return;
    };

    let preset = settings.quality.settings();
    let positions = config.compute(&loaded.nodes, settings.view_mode);

    *lod = LodController::build(&mut meshes, preset.max_sphere_segments);
    let skipped = spawn_nodes(
        &mut commands,
        &mut materials,
        &lod,
        &mut arena,
        &loaded.nodes,
        &positions,
    );
    if skipped > 0 {
        warn!("{} nodes had no layout position and were skipped", skipped);
    }

    let backbone = spawn_helix_backbone(&mut commands, &mut meshes, &mut materials);
    arena.insert_object(backbone, RenderableKind::HelixBackbone);

    for signal in transition.initialise(settings.view_mode, positions) {
        aux_events.write(signal);
    }
    viewport.set_eye(settings.view_mode.camera_eye());

    streams.set_particles_per_connection(preset.particles_per_connection);
    let resolver = |id: &str| transition.position(id);
    let unresolved = connect_influences(&mut streams, &loaded.nodes, &resolver);
    if unresolved > 0 {
        warn!("{} influence connections deferred until their nodes resolve", unresolved);
    }

    let particles = spawn_particle_stream_mesh(
        &mut commands,
        &mut meshes,
        &mut particle_materials,
        &streams,
    );
    arena.insert_object(particles, RenderableKind::ParticleStream);

    info!(
        "✓ Scene created: {} nodes, {} connections, {} particles allocated",
        arena.len(),
        streams.connection_count(),
        streams.pool().allocated_count()
    );
    loading_progress.scene_spawned = true;
}
