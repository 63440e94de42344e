use bevy::prelude::*;
use constants::render_settings::QualityPreset;

use super::scene_settings::{QualityLevel, SceneSettings};
use crate::engine::camera::viewport_camera::configure_camera_quality;
use crate::engine::lod::{LodController, NodeLod};
use crate::engine::particles::streams::ConnectionStreamSystem;
use crate::engine::scene::SceneNode;

/// Preset to apply when the requested level differs from the applied one.
/// The first observation only records the level; the scene was built with it.
fn pending_preset(
    applied: &mut Option<QualityLevel>,
    requested: QualityLevel,
) -> Option<QualityPreset> {
    match applied.replace(requested) {
        Some(previous) if previous != requested => Some(requested.settings()),
        _ => None,
    }
}

pub fn apply_quality_changes(
    mut commands: Commands,
    settings: Res<SceneSettings>,
    mut applied: Local<Option<QualityLevel>>,
    mut lod: ResMut<LodController>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut streams: ResMut<ConnectionStreamSystem>,
    mut nodes: Query<(&mut Mesh3d, &NodeLod), With<SceneNode>>,
    camera_query: Query<Entity, With<Camera3d>>,
) {
    let Some(preset) = pending_preset(&mut applied, settings.quality) else {
        return;
    };

    let stale = lod.rebuild(&mut meshes, preset.max_sphere_segments);
    for (mut mesh, state) in &mut nodes {
        if let Some(geometry) = lod.geometry_for(state) {
            mesh.0 = geometry.clone();
        }
    }
    for handle in &stale {
        meshes.remove(handle);
    }

    streams.set_particles_per_connection(preset.particles_per_connection);

    if let Ok(camera) = camera_query.single() {
        configure_camera_quality(&mut commands, camera, &preset);
    }

    info!(
        "Quality {:?} applied: {} particles per connection, {} sphere segments",
        settings.quality, preset.particles_per_connection, preset.max_sphere_segments
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_observation_is_recorded_without_change() {
        let mut applied = None;
        assert!(pending_preset(&mut applied, QualityLevel::High).is_none());
        assert_eq!(applied, Some(QualityLevel::High));
        assert!(pending_preset(&mut applied, QualityLevel::High).is_none());
    }

    #[test]
    fn switching_level_yields_its_preset() {
        let mut applied = Some(QualityLevel::High);
        let preset = pending_preset(&mut applied, QualityLevel::Low);
        assert_eq!(preset, Some(QualityLevel::Low.settings()));
        assert_eq!(applied, Some(QualityLevel::Low));
    }

    #[test]
    fn switch_repoints_nodes_and_reallocates_particles() {
        use crate::engine::particles::streams::ConnectionKind;
        use constants::render_settings::LOD_TIERS;

        let mut app = App::new();
        let mut meshes = Assets::<Mesh>::default();
        let segments = QualityLevel::High.settings().max_sphere_segments;
        let lod = LodController::build(&mut meshes, segments);
        let near = lod.geometry(0).cloned().unwrap_or_default();
        let far = lod.geometry(2).cloned().unwrap_or_default();

        let high = QualityLevel::High.settings().particles_per_connection;
        let mut streams = ConnectionStreamSystem::new(200, 200, high);
        streams.add_connection("a", "b", Vec3::ZERO, Vec3::X, ConnectionKind::Influence);
        streams.add_connection("b", "c", Vec3::X, Vec3::Y, ConnectionKind::Influence);
        assert_eq!(streams.pool().allocated_count(), high * 2);

        app.insert_resource(SceneSettings::default())
            .insert_resource(lod)
            .insert_resource(meshes)
            .insert_resource(streams)
            .add_systems(Update, apply_quality_changes);

        let node_of = |id: &str| SceneNode {
            id: id.to_string(),
            base_colour: LinearRgba::WHITE,
        };
        let placed = app
            .world_mut()
            .spawn((
                node_of("a"),
                Mesh3d(far.clone()),
                NodeLod {
                    tier: Some(2),
                    show_label: false,
                },
            ))
            .id();
        let fresh = app
            .world_mut()
            .spawn((node_of("b"), Mesh3d(near.clone()), NodeLod::default()))
            .id();

        // First frame records the level the scene was built with.
        app.update();
        assert_eq!(app.world().resource::<Assets<Mesh>>().len(), LOD_TIERS.len());

        app.world_mut().resource_mut::<SceneSettings>().quality = QualityLevel::Low;
        app.update();

        let world = app.world();
        let meshes = world.resource::<Assets<Mesh>>();
        let lod = world.resource::<LodController>();
        assert_eq!(meshes.len(), LOD_TIERS.len());
        assert!(!meshes.contains(&far));
        assert!(!meshes.contains(&near));

        let placed_mesh = world.get::<Mesh3d>(placed).map(|m| m.0.clone());
        assert_eq!(placed_mesh.as_ref(), lod.geometry(2));
        let fresh_mesh = world.get::<Mesh3d>(fresh).map(|m| m.0.clone());
        assert_eq!(fresh_mesh.as_ref(), lod.geometry(0));

        let streams = world.resource::<ConnectionStreamSystem>();
        let low = QualityLevel::Low.settings().particles_per_connection;
        assert_eq!(streams.particles_per_connection(), low);
        assert_eq!(streams.pool().allocated_count(), low * 2);
        assert_eq!(streams.connection_count(), 2);
    }
}
