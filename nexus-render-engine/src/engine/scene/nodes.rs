use bevy::prelude::*;
use constants::category::{CATEGORY_MAP, FALLBACK_NODE_COLOUR, hex_to_srgb};
use constants::render_settings::{GLOW_EMISSIVE_GAIN, GLOW_INTENSITY_EFFECTS};

use super::labels::spawn_node_label;
use super::{NodeEntry, RenderableKind, SceneNode, SceneNodes};
use crate::engine::assets::dataset::NodeData;
use crate::engine::layout::PositionMap;
use crate::engine::lod::{LodController, NodeLod};

/// Category colour for a node, falling back for unknown categories.
pub fn node_colour(category: Option<&str>) -> Color {
    let hex = category
        .and_then(|name| CATEGORY_MAP.iter().find(|c| c.name == name))
        .map(|c| c.colour)
        .unwrap_or(FALLBACK_NODE_COLOUR);
    let [r, g, b] = hex_to_srgb(hex);
    Color::srgb(r, g, b)
}

/// Spawn a sphere and label for every node with a resolved position. Nodes
/// without one are skipped and reported back.
pub fn spawn_nodes(
    commands: &mut Commands,
    materials: &mut Assets<StandardMaterial>,
    lod: &LodController,
    arena: &mut SceneNodes,
    nodes: &[NodeData],
    positions: &PositionMap,
) -> usize {
    let mut skipped = 0;
    let Some(geometry) = lod.geometry(0) else {
        warn!("LOD geometry missing, no nodes spawned");
        return nodes.len();
    };

    for node in nodes {
        let Some(position) = positions.get(&node.id) else {
            skipped += 1;
            continue;
        };

        let colour = node_colour(node.category.as_deref());
        let base_colour = LinearRgba::from(colour);
        let gain = GLOW_INTENSITY_EFFECTS * GLOW_EMISSIVE_GAIN;
        let material = materials.add(StandardMaterial {
            base_color: colour,
            emissive: LinearRgba::rgb(
                base_colour.red * gain,
                base_colour.green * gain,
                base_colour.blue * gain,
            ),
            perceptual_roughness: 0.6,
            ..default()
        });

        let mut transform = Transform::from_translation(position.position);
        if let Some(rotation) = position.rotation {
            transform.rotation = rotation;
        }
        if let Some(scale) = position.scale {
            transform.scale = scale;
        }

        let entity = commands
            .spawn((
                Mesh3d(geometry.clone()),
                MeshMaterial3d(material.clone()),
                transform,
                SceneNode {
                    id: node.id.clone(),
                    base_colour,
                },
                NodeLod::default(),
                RenderableKind::NodeMesh,
                Name::new(node.display_name.clone()),
            ))
            .id();

        let label = spawn_node_label(commands, node);

        arena.insert_node(
            node.id.clone(),
            NodeEntry {
                node: entity,
                label: Some(label),
                material,
            },
        );
    }

    skipped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_categories_use_fallback_colour() {
        assert_eq!(node_colour(Some("alchemy")), Color::srgb(1.0, 1.0, 1.0));
        assert_eq!(node_colour(None), Color::srgb(1.0, 1.0, 1.0));
        let [r, g, b] = hex_to_srgb(0x3a86ff);
        assert_eq!(node_colour(Some("logic")), Color::srgb(r, g, b));
    }
}
