//! Distance-based level of detail for node spheres.
//!
//! Every tier's sphere is built once up front; switching tiers only swaps the
//! mesh handle on the node and rewrites its glow, never allocating geometry.

use bevy::prelude::*;
use constants::render_settings::{
    GLOW_EMISSIVE_GAIN, GLOW_INTENSITY_EFFECTS, GLOW_INTENSITY_PLAIN, LOD_TIERS, LodTier,
    NODE_RADIUS,
};

use crate::engine::scene::SceneNode;

/// Read-only LOD state of one node, exposed to the UI layer.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct NodeLod {
    pub tier: Option<usize>,
    pub show_label: bool,
}

#[derive(Resource, Debug, Clone, Default)]
pub struct LodController {
    camera_position: Option<Vec3>,
    geometries: Vec<Handle<Mesh>>,
}

impl LodController {
    /// Pre-build one sphere per tier. Segment counts are capped by the
    /// quality preset.
    pub fn build(meshes: &mut Assets<Mesh>, max_segments: u32) -> Self {
        let geometries = LOD_TIERS
            .iter()
            .map(|tier| meshes.add(tier_sphere(tier, max_segments)))
            .collect();
        Self {
            camera_position: None,
            geometries,
        }
    }

    /// Swap in freshly built geometry and hand back the previous meshes.
    /// The caller releases them once no node points at them.
    #[must_use]
    pub fn rebuild(
        &mut self,
        meshes: &mut Assets<Mesh>,
        max_segments: u32,
    ) -> Vec<Handle<Mesh>> {
        let fresh = Self::build(meshes, max_segments).geometries;
        std::mem::replace(&mut self.geometries, fresh)
    }

    /// Current geometry for a node's tier, or the most detailed one when the
    /// node has not been assigned a tier yet.
    pub fn geometry_for(&self, state: &NodeLod) -> Option<&Handle<Mesh>> {
        self.geometry(state.tier.unwrap_or(0))
    }

    pub fn dispose(&mut self, meshes: &mut Assets<Mesh>) {
        for handle in self.geometries.drain(..) {
            meshes.remove(&handle);
        }
    }

    /// `None` clears the camera, e.g. while the view is being torn down.
    pub fn set_camera(&mut self, position: Option<Vec3>) {
        self.camera_position = position;
    }

    pub fn geometry(&self, level: usize) -> Option<&Handle<Mesh>> {
        self.geometries.get(level)
    }

    /// Tier index for an object at `position`: the farthest tier whose
    /// minimum distance the object reaches. Tier 0 without a camera.
    pub fn get_lod_level(&self, position: Vec3) -> usize {
        match self.camera_position {
            Some(camera) => tier_for_distance(camera.distance(position)),
            None => 0,
        }
    }

    pub fn tier(level: usize) -> LodTier {
        LOD_TIERS[level.min(LOD_TIERS.len() - 1)]
    }

    /// Point the node at the cached geometry for `level` and rewrite its glow.
    pub fn update_object_lod(
        &self,
        level: usize,
        mesh: &mut Mesh3d,
        material: &mut StandardMaterial,
        base_colour: LinearRgba,
        state: &mut NodeLod,
    ) {
        let tier = Self::tier(level);
        if let Some(geometry) = self.geometry(level) {
            mesh.0 = geometry.clone();
        }
        material.emissive = glow(base_colour, glow_intensity(&tier));
        state.tier = Some(level);
        state.show_label = tier.show_label;
    }
}

pub fn tier_for_distance(distance: f32) -> usize {
    LOD_TIERS
        .iter()
        .rposition(|tier| distance >= tier.min_distance)
        .unwrap_or(0)
}

pub fn glow_intensity(tier: &LodTier) -> f32 {
    if tier.show_effects {
        GLOW_INTENSITY_EFFECTS
    } else {
        GLOW_INTENSITY_PLAIN
    }
}

fn glow(base: LinearRgba, intensity: f32) -> LinearRgba {
    let gain = intensity * GLOW_EMISSIVE_GAIN;
    LinearRgba::rgb(base.red * gain, base.green * gain, base.blue * gain)
}

fn tier_sphere(tier: &LodTier, max_segments: u32) -> Mesh {
    let detail = tier.geometry_detail.min(max_segments);
    Sphere::new(NODE_RADIUS)
        .mesh()
        .uv(detail.max(3), detail.max(2))
}

pub fn update_node_lod(
    camera_query: Query<&Transform, (With<Camera3d>, Without<SceneNode>)>,
    mut lod: ResMut<LodController>,
    mut nodes: Query<(
        &Transform,
        &SceneNode,
        &mut Mesh3d,
        &MeshMaterial3d<StandardMaterial>,
        &mut NodeLod,
    )>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let camera_position = camera_query.single().ok().map(|t| t.translation);
    lod.set_camera(camera_position);

    for (transform, node, mut mesh, material_handle, mut state) in &mut nodes {
        let level = lod.get_lod_level(transform.translation);
        if state.tier == Some(level) {
            continue;
        }
        let Some(material) = materials.get_mut(&material_handle.0) else {
            continue;
        };
        lod.update_object_lod(level, &mut mesh, material, node.base_colour, &mut state);
    }
}
