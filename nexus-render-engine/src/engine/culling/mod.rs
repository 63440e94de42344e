//! Frustum culling over per-node bounding boxes.
//!
//! The frustum is rebuilt once per frame from the camera. Bounds are only
//! refreshed for nodes whose transform changed, and ids without bounds are
//! always treated as visible.

use bevy::math::Affine3A;
use bevy::prelude::*;
use bevy::render::primitives::{Aabb, Frustum};
use constants::render_settings::NODE_RADIUS;
use std::collections::HashMap;

use crate::engine::assets::dataset::NodeId;
use crate::engine::scene::SceneNode;
use crate::engine::systems::stats::VisibilityStats;

#[derive(Resource, Debug, Default)]
pub struct FrustumCuller {
    frustum: Option<Frustum>,
    bounds: HashMap<NodeId, Aabb>,
}

impl FrustumCuller {
    /// Rebuild the frustum from a view-projection matrix. `None` clears it,
    /// which makes every query pass.
    pub fn update_frustum(&mut self, clip_from_world: Option<Mat4>) {
        self.frustum = clip_from_world.map(|matrix| Frustum::from_clip_from_world(&matrix));
    }

    pub fn has_frustum(&self) -> bool {
        self.frustum.is_some()
    }

    /// Recompute the box around one object of local radius `radius`.
    pub fn update_object_bounds(&mut self, id: &str, transform: &Transform, radius: f32) {
        let half_extent = radius * transform.scale.abs().max_element();
        let aabb = Aabb::from_min_max(
            transform.translation - Vec3::splat(half_extent),
            transform.translation + Vec3::splat(half_extent),
        );
        match self.bounds.get_mut(id) {
            Some(existing) => *existing = aabb,
            None => {
                self.bounds.insert(id.to_string(), aabb);
            }
        }
    }

    pub fn remove_object(&mut self, id: &str) {
        self.bounds.remove(id);
    }

    pub fn clear(&mut self) {
        self.bounds.clear();
        self.frustum = None;
    }

    pub fn is_object_visible(&self, id: &str) -> bool {
        let (Some(frustum), Some(aabb)) = (&self.frustum, self.bounds.get(id)) else {
            return true;
        };
        frustum.intersects_obb(aabb, &Affine3A::IDENTITY, true, true)
    }

    pub fn check_visibility_batch<'a>(
        &self,
        ids: impl IntoIterator<Item = &'a str>,
    ) -> HashMap<NodeId, bool> {
        ids.into_iter()
            .map(|id| (id.to_string(), self.is_object_visible(id)))
            .collect()
    }
}

pub fn update_frustum_culling(
    camera_query: Query<(&Camera, &Transform), With<Camera3d>>,
    mut culler: ResMut<FrustumCuller>,
    mut stats: ResMut<VisibilityStats>,
    mut nodes: Query<(&SceneNode, Ref<Transform>, &mut Visibility)>,
) {
    // The camera is a root entity, so its local transform is its world
    // transform and is already current for this frame.
    let clip_from_world = camera_query
        .single()
        .ok()
        .map(|(camera, transform)| camera.clip_from_view() * transform.compute_matrix().inverse());
    culler.update_frustum(clip_from_world);

    for (node, transform, _) in &nodes {
        if transform.is_changed() {
            culler.update_object_bounds(&node.id, &transform, NODE_RADIUS);
        }
    }

    let results = culler.check_visibility_batch(nodes.iter().map(|(node, _, _)| node.id.as_str()));

    let mut visible_count = 0;
    let mut total = 0;
    for (node, _, mut visibility) in &mut nodes {
        total += 1;
        let visible = results.get(&node.id).copied().unwrap_or(true);
        if visible {
            visible_count += 1;
        }
        visibility.set_if_neq(if visible {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        });
    }

    stats.set_if_neq(VisibilityStats {
        visible: visible_count,
        total,
    });
}
