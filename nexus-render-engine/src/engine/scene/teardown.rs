use bevy::prelude::*;

use super::backbone::BackboneAssets;
use super::{RenderableKind, SceneNodes};
use crate::engine::core::app_state::AppState;
use crate::engine::culling::FrustumCuller;
use crate::engine::lod::LodController;
use crate::engine::particles::ParticleStreamAssets;
use crate::engine::particles::material::ParticleMaterial;
use crate::engine::particles::streams::ConnectionStreamSystem;
use crate::engine::transition::ViewTransitionController;

/// Request immediate disposal of every scene object and GPU buffer.
#[derive(Event, Debug, Clone, Copy)]
pub struct TeardownScene;

/// Dispose the whole scene in one pass when asked to, or when the app exits.
/// Entities, meshes and materials are all released before the frame ends.
pub fn teardown_scene(
    mut commands: Commands,
    mut teardown_events: EventReader<TeardownScene>,
    mut exit_events: EventReader<AppExit>,
    mut arena: ResMut<SceneNodes>,
    mut streams: ResMut<ConnectionStreamSystem>,
    mut lod: ResMut<LodController>,
    mut culler: ResMut<FrustumCuller>,
    mut transition: ResMut<ViewTransitionController>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut particle_materials: ResMut<Assets<ParticleMaterial>>,
    particle_assets: Option<Res<ParticleStreamAssets>>,
    backbone_assets: Option<Res<BackboneAssets>>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    let requested = teardown_events.read().count() > 0;
    let exiting = exit_events.read().count() > 0;
    if !requested && !exiting {
        return;
    }
    if arena.is_empty() && streams.connection_count() == 0 {
        return;
    }

    let (nodes, objects) = arena.drain();
    let node_count = nodes.len();
    for (_, entry) in nodes {
        commands.entity(entry.node).despawn();
        if let Some(label) = entry.label {
            commands.entity(label).despawn();
        }
        materials.remove(&entry.material);
    }

    for object in objects {
        match object.kind {
            RenderableKind::ParticleStream => {
                if let Some(assets) = &particle_assets {
                    meshes.remove(&assets.mesh);
                    particle_materials.remove(&assets.material);
                }
            }
            RenderableKind::HelixBackbone => {
                if let Some(assets) = &backbone_assets {
                    meshes.remove(&assets.mesh);
                    materials.remove(&assets.material);
                }
            }
            RenderableKind::NodeMesh | RenderableKind::NodeLabel => {}
        }
        commands.entity(object.entity).despawn();
    }
    commands.remove_resource::<ParticleStreamAssets>();
    commands.remove_resource::<BackboneAssets>();

    let connection_count = streams.connection_count();
    streams.clear_all_connections();
    lod.dispose(&mut meshes);
    lod.set_camera(None);
    culler.clear();
    transition.clear();

    info!(
        "→ Scene torn down: {} nodes, {} connections released",
        node_count, connection_count
    );
    if requested {
        next_state.set(AppState::TornDown);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::particles::vertex_buffer::create_particle_mesh;
    use crate::engine::particles::streams::ConnectionKind;
    use crate::engine::scene::backbone::create_backbone_mesh;
    use crate::engine::scene::{NodeEntry, SceneNode};
    use bevy::state::app::StatesPlugin;

    struct Spawned {
        nodes: Vec<Entity>,
        objects: Vec<Entity>,
    }

    fn scene_app() -> (App, Spawned) {
        let mut app = App::new();
        app.add_plugins(StatesPlugin)
            .init_state::<AppState>()
            .add_event::<TeardownScene>()
            .init_resource::<FrustumCuller>()
            .init_resource::<ViewTransitionController>()
            .add_systems(Last, teardown_scene);

        let mut meshes = Assets::<Mesh>::default();
        let mut materials = Assets::<StandardMaterial>::default();
        let mut particle_materials = Assets::<ParticleMaterial>::default();
        let lod = LodController::build(&mut meshes, 16);

        let mut streams = ConnectionStreamSystem::new(100, 100, 10);
        streams.add_connection("a", "b", Vec3::ZERO, Vec3::X, ConnectionKind::Influence);
        streams.add_connection("b", "c", Vec3::X, Vec3::Y, ConnectionKind::Influence);
        streams.update(0.1);

        let mut arena = SceneNodes::default();
        let mut spawned = Spawned {
            nodes: Vec::new(),
            objects: Vec::new(),
        };
        for id in ["a", "b", "c"] {
            let material = materials.add(StandardMaterial::default());
            let node = app
                .world_mut()
                .spawn((
                    SceneNode {
                        id: id.to_string(),
                        base_colour: LinearRgba::WHITE,
                    },
                    Mesh3d(lod.geometry(0).cloned().unwrap_or_default()),
                    RenderableKind::NodeMesh,
                ))
                .id();
            let label = app.world_mut().spawn(RenderableKind::NodeLabel).id();
            arena.insert_node(
                id.to_string(),
                NodeEntry {
                    node,
                    label: Some(label),
                    material,
                },
            );
            spawned.nodes.extend([node, label]);
        }

        let particle_mesh = meshes.add(create_particle_mesh(100));
        let particle_material = particle_materials.add(ParticleMaterial::default());
        let stream_entity = app
            .world_mut()
            .spawn((Mesh3d(particle_mesh.clone()), RenderableKind::ParticleStream))
            .id();
        arena.insert_object(stream_entity, RenderableKind::ParticleStream);

        let backbone_mesh = meshes.add(create_backbone_mesh());
        let backbone_material = materials.add(StandardMaterial::default());
        let backbone_entity = app
            .world_mut()
            .spawn((Mesh3d(backbone_mesh.clone()), RenderableKind::HelixBackbone))
            .id();
        arena.insert_object(backbone_entity, RenderableKind::HelixBackbone);
        spawned.objects.extend([stream_entity, backbone_entity]);

        app.insert_resource(ParticleStreamAssets {
            mesh: particle_mesh,
            material: particle_material,
        })
        .insert_resource(BackboneAssets {
            mesh: backbone_mesh,
            material: backbone_material,
        })
        .insert_resource(meshes)
        .insert_resource(materials)
        .insert_resource(particle_materials)
        .insert_resource(lod)
        .insert_resource(streams)
        .insert_resource(arena);

        (app, spawned)
    }

    fn assert_released(app: &App, spawned: &Spawned) {
        let world = app.world();
        let streams = world.resource::<ConnectionStreamSystem>();
        assert_eq!(streams.pool().allocated_count(), 0);
        assert_eq!(streams.pool().free_count(), 100);
        assert_eq!(streams.connection_count(), 0);
        assert_eq!(streams.buffer().draw_range(), 0);

        assert_eq!(world.resource::<Assets<Mesh>>().len(), 0);
        assert_eq!(world.resource::<Assets<StandardMaterial>>().len(), 0);
        assert_eq!(world.resource::<Assets<ParticleMaterial>>().len(), 0);
        assert!(world.resource::<SceneNodes>().is_empty());
        assert!(world.get_resource::<ParticleStreamAssets>().is_none());
        assert!(world.get_resource::<BackboneAssets>().is_none());

        for entity in spawned.nodes.iter().chain(&spawned.objects) {
            assert!(world.get_entity(*entity).is_err(), "{entity:?} survived teardown");
        }
    }

    #[test]
    fn teardown_request_releases_everything_and_parks_state() {
        let (mut app, spawned) = scene_app();
        assert_eq!(app.world().resource::<ConnectionStreamSystem>().pool().allocated_count(), 20);

        app.world_mut().send_event(TeardownScene);
        app.update();
        assert_released(&app, &spawned);

        // The state change lands on the next frame's transition pass.
        app.update();
        assert_eq!(app.world().resource::<State<AppState>>().get(), &AppState::TornDown);
    }

    #[test]
    fn app_exit_disposes_without_changing_state() {
        let (mut app, spawned) = scene_app();

        app.world_mut().send_event(AppExit::Success);
        app.update();
        assert_released(&app, &spawned);

        app.update();
        assert_eq!(app.world().resource::<State<AppState>>().get(), &AppState::Loading);
    }

    #[test]
    fn nothing_happens_without_a_request() {
        let (mut app, _) = scene_app();
        app.update();

        let world = app.world();
        assert_eq!(world.resource::<ConnectionStreamSystem>().connection_count(), 2);
        assert_eq!(world.resource::<SceneNodes>().len(), 3);
        assert!(world.get_resource::<ParticleStreamAssets>().is_some());
    }
}
