/// Double helix backbone: both strands plus connecting rungs
use bevy::asset::RenderAssetUsages;
use bevy::prelude::*;
use bevy::render::mesh::PrimitiveTopology;
use bevy::render::view::NoFrustumCulling;
use constants::layout::{HELIX_BACKBONE_RUNGS, HELIX_BACKBONE_SAMPLES};

use super::RenderableKind;
use crate::engine::layout::LayoutMode;
use crate::engine::layout::helix::strand_point;
use crate::engine::transition::AuxiliaryGeometrySignal;

#[derive(Component)]
pub struct HelixBackbone;

#[derive(Resource)]
pub struct BackboneAssets {
    pub mesh: Handle<Mesh>,
    pub material: Handle<StandardMaterial>,
}

/// Line-list vertices for the strands and rungs.
pub fn backbone_vertices(samples: usize, rungs: usize) -> Vec<[f32; 3]> {
    let mut vertices = Vec::with_capacity(samples * 4 + rungs * 2);

    for strand in 0..2 {
        for i in 0..samples {
            let t0 = i as f32 / samples as f32;
            let t1 = (i + 1) as f32 / samples as f32;
            vertices.push(strand_point(t0, strand).to_array());
            vertices.push(strand_point(t1, strand).to_array());
        }
    }

    for i in 0..rungs {
        let t = if rungs > 1 {
            i as f32 / (rungs - 1) as f32
        } else {
            0.5
        };
        vertices.push(strand_point(t, 0).to_array());
        vertices.push(strand_point(t, 1).to_array());
    }

    vertices
}

pub fn create_backbone_mesh() -> Mesh {
    let mut mesh = Mesh::new(PrimitiveTopology::LineList, RenderAssetUsages::RENDER_WORLD);
    mesh.insert_attribute(
        Mesh::ATTRIBUTE_POSITION,
        backbone_vertices(HELIX_BACKBONE_SAMPLES, HELIX_BACKBONE_RUNGS),
    );
    mesh
}

/// Spawn the backbone hidden; it is shown when a helix layout settles.
pub fn spawn_helix_backbone(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
) -> Entity {
    let mesh = meshes.add(create_backbone_mesh());
    let material = materials.add(StandardMaterial {
        base_color: Color::srgba(0.55, 0.75, 1.0, 0.35),
        alpha_mode: AlphaMode::Blend,
        unlit: true,
        ..default()
    });

    commands.insert_resource(BackboneAssets {
        mesh: mesh.clone(),
        material: material.clone(),
    });

    commands
        .spawn((
            Mesh3d(mesh),
            MeshMaterial3d(material),
            Transform::default(),
            Visibility::Hidden,
            NoFrustumCulling,
            HelixBackbone,
            RenderableKind::HelixBackbone,
            Name::new("HelixBackbone"),
        ))
        .id()
}

pub fn apply_auxiliary_geometry(
    mut signals: EventReader<AuxiliaryGeometrySignal>,
    mut backbone: Query<&mut Visibility, With<HelixBackbone>>,
) {
    for signal in signals.read() {
        let (mode, visibility) = match *signal {
            AuxiliaryGeometrySignal::Show(mode) => (mode, Visibility::Visible),
            AuxiliaryGeometrySignal::Hide(mode) => (mode, Visibility::Hidden),
        };
        if mode != LayoutMode::Helix {
            continue;
        }
        for mut current in &mut backbone {
            current.set_if_neq(visibility);
        }
    }
}
