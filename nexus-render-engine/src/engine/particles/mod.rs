//! Animated particle streams along influence connections.
//!
//! All streams share one [`pool::ParticlePool`] and one staging
//! [`vertex_buffer::ParticleVertexBuffer`], mirrored every frame into a single
//! mesh drawn with [`material::ParticleMaterial`].

pub mod curve;
pub mod material;
pub mod pool;
pub mod streams;
pub mod vertex_buffer;

use bevy::prelude::*;
use bevy::render::view::NoFrustumCulling;

use crate::engine::scene::RenderableKind;
use crate::engine::systems::scene_settings::SceneSettings;
use crate::engine::transition::ViewTransitionController;
use material::ParticleMaterial;
use streams::ConnectionStreamSystem;
use vertex_buffer::create_particle_mesh;

#[derive(Component)]
pub struct ParticleStreamMesh;

/// GPU assets owned by the particle streams, released on teardown.
#[derive(Resource)]
pub struct ParticleStreamAssets {
    pub mesh: Handle<Mesh>,
    pub material: Handle<ParticleMaterial>,
}

pub fn spawn_particle_stream_mesh(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<ParticleMaterial>,
    streams: &ConnectionStreamSystem,
) -> Entity {
    let mesh = meshes.add(create_particle_mesh(streams.buffer().capacity()));
    let material = materials.add(ParticleMaterial::default());

    commands.insert_resource(ParticleStreamAssets {
        mesh: mesh.clone(),
        material: material.clone(),
    });

    commands
        .spawn((
            Mesh3d(mesh),
            MeshMaterial3d(material),
            Transform::default(),
            // Parked slots sit far outside any sensible bounds.
            NoFrustumCulling,
            ParticleStreamMesh,
            RenderableKind::ParticleStream,
            Name::new("ParticleStreams"),
        ))
        .id()
}

/// Rebuild curves whose endpoints moved during this frame's transition tick
/// and retry edges that were unresolvable on an earlier frame.
pub fn refresh_stream_endpoints(
    transition: Res<ViewTransitionController>,
    mut streams: ResMut<ConnectionStreamSystem>,
) {
    let resolver = |id: &str| transition.position(id);
    streams.refresh_endpoints(&resolver);
}

/// Apply the connection visibility toggle.
pub fn apply_connection_visibility(
    settings: Res<SceneSettings>,
    mut streams: ResMut<ConnectionStreamSystem>,
    mut applied: Local<Option<bool>>,
) {
    if *applied == Some(settings.show_connections) {
        return;
    }
    streams.set_all_active(settings.show_connections);
    *applied = Some(settings.show_connections);
}

pub fn advance_particle_streams(
    time: Res<Time>,
    settings: Res<SceneSettings>,
    mut streams: ResMut<ConnectionStreamSystem>,
) {
    streams.update(settings.animation_delta(time.delta_secs()));
}

/// Copy the staging buffer into the particle mesh once it has been written.
/// The stream entity is hidden while no particle is live.
pub fn sync_particle_mesh(
    streams: Res<ConnectionStreamSystem>,
    mut query: Query<(&Mesh3d, &mut Visibility), With<ParticleStreamMesh>>,
    mut meshes: ResMut<Assets<Mesh>>,
) {
    if !streams.is_changed() {
        return;
    }
    let Ok((mesh_handle, mut visibility)) = query.single_mut() else {
        return;
    };
    visibility.set_if_neq(if streams.buffer().draw_range() > 0 {
        Visibility::Inherited
    } else {
        Visibility::Hidden
    });
    let Some(mesh) = meshes.get_mut(&mesh_handle.0) else {
        return;
    };
    streams.buffer().write_to_mesh(mesh);
}
