use bevy::prelude::*;
use constants::render_settings::NODE_RADIUS;

use super::{RenderableKind, SceneNode, SceneNodes};
use crate::engine::assets::dataset::NodeData;
use crate::engine::lod::NodeLod;

#[derive(Component, Debug, Clone)]
pub struct NodeLabel;

pub fn spawn_node_label(commands: &mut Commands, node: &NodeData) -> Entity {
    commands
        .spawn((
            Text::new(node.display_name.clone()),
            TextFont {
                font_size: 12.0,
                ..default()
            },
            TextColor(Color::srgba(1.0, 1.0, 1.0, 0.85)),
            Node {
                position_type: PositionType::Absolute,
                ..default()
            },
            Visibility::Hidden,
            NodeLabel,
            RenderableKind::NodeLabel,
        ))
        .id()
}

/// Project labels next to their nodes. A label shows only when its node's
/// LOD tier allows it and the node survived frustum culling.
pub fn update_node_labels(
    camera_query: Query<(&Camera, &Transform), With<Camera3d>>,
    arena: Res<SceneNodes>,
    nodes: Query<(&SceneNode, &Transform, &Visibility, &NodeLod), Without<NodeLabel>>,
    mut labels: Query<(&mut Node, &mut Visibility), (With<NodeLabel>, Without<SceneNode>)>,
) {
    let camera = camera_query
        .single()
        .ok()
        .map(|(camera, transform)| (camera, GlobalTransform::from(*transform)));

    for (node, transform, node_visibility, lod) in &nodes {
        let Some(label_entity) = arena.node(&node.id).and_then(|entry| entry.label) else {
            continue;
        };
        let Ok((mut label_node, mut label_visibility)) = labels.get_mut(label_entity) else {
            continue;
        };

        let anchor = transform.translation + Vec3::Y * NODE_RADIUS * 2.0;
        let screen = match &camera {
            Some((camera, camera_transform))
                if lod.show_label && *node_visibility != Visibility::Hidden =>
            {
                camera.world_to_viewport(camera_transform, anchor).ok()
            }
            _ => None,
        };

        match screen {
            Some(position) => {
                label_node.left = Val::Px(position.x + 6.0);
                label_node.top = Val::Px(position.y - 6.0);
                label_visibility.set_if_neq(Visibility::Inherited);
            }
            None => {
                label_visibility.set_if_neq(Visibility::Hidden);
            }
        }
    }
}
