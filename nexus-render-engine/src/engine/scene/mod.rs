//! Scene objects and the arena that owns them.
//!
//! Every spawned renderable is recorded in [`SceneNodes`], keyed by node id
//! for nodes and by [`RenderableKind`] for shared objects, so teardown walks
//! the arena instead of the entity hierarchy.

/// Helix backbone line mesh and its show/hide handling.
pub mod backbone;

/// Screen-space node labels.
pub mod labels;

/// Node sphere spawning.
pub mod nodes;

/// Synchronous scene disposal.
pub mod teardown;

use bevy::prelude::*;
use indexmap::IndexMap;

use crate::engine::assets::dataset::NodeId;

/// What a scene entity is, fixed when it is spawned.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderableKind {
    NodeMesh,
    NodeLabel,
    ParticleStream,
    HelixBackbone,
}

/// Node sphere marker carrying the node id and its category colour.
#[derive(Component, Debug, Clone)]
pub struct SceneNode {
    pub id: NodeId,
    pub base_colour: LinearRgba,
}

#[derive(Debug, Clone)]
pub struct NodeEntry {
    pub node: Entity,
    pub label: Option<Entity>,
    pub material: Handle<StandardMaterial>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneObject {
    pub entity: Entity,
    pub kind: RenderableKind,
}

#[derive(Resource, Debug, Default)]
pub struct SceneNodes {
    nodes: IndexMap<NodeId, NodeEntry>,
    objects: Vec<SceneObject>,
}

impl SceneNodes {
    pub fn insert_node(&mut self, id: NodeId, entry: NodeEntry) {
        self.nodes.insert(id, entry);
    }

    pub fn insert_object(&mut self, entity: Entity, kind: RenderableKind) {
        self.objects.push(SceneObject { entity, kind });
    }

    pub fn node(&self, id: &str) -> Option<&NodeEntry> {
        self.nodes.get(id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (&NodeId, &NodeEntry)> {
        self.nodes.iter()
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.objects.is_empty()
    }

    /// Empty the arena, handing back everything it held.
    pub fn drain(&mut self) -> (Vec<(NodeId, NodeEntry)>, Vec<SceneObject>) {
        (self.nodes.drain(..).collect(), std::mem::take(&mut self.objects))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_empties_arena_in_insertion_order() {
        let mut arena = SceneNodes::default();
        for (index, id) in ["c", "a", "b"].iter().enumerate() {
            arena.insert_node(
                id.to_string(),
                NodeEntry {
                    node: Entity::from_raw(index as u32),
                    label: None,
                    material: Handle::default(),
                },
            );
        }
        arena.insert_object(Entity::from_raw(9), RenderableKind::HelixBackbone);
        assert_eq!(arena.len(), 3);

        let (nodes, objects) = arena.drain();
        let ids: Vec<&str> = nodes.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
        assert_eq!(objects[0].kind, RenderableKind::HelixBackbone);
        assert!(arena.is_empty());
    }
}
