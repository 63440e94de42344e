use bevy::prelude::*;
use constants::layout::{HELIX_HEIGHT, HELIX_RADIUS, HELIX_STRAND_RADIUS_OFFSET, HELIX_TURNS};
use std::f32::consts::{PI, TAU};

use super::{LayoutPosition, PositionMap};
use crate::engine::assets::dataset::NodeData;

/// Point on strand 0 or 1 at chronological fraction `t` in [0, 1].
/// Shared by node placement and the backbone geometry.
pub fn strand_point(t: f32, strand: usize) -> Vec3 {
    let radius = HELIX_RADIUS + strand as f32 * HELIX_STRAND_RADIUS_OFFSET;
    let angle = t * TAU * HELIX_TURNS + strand as f32 * PI;
    Vec3::new(
        angle.cos() * radius,
        (t - 0.5) * HELIX_HEIGHT,
        angle.sin() * radius,
    )
}

/// Rank fraction along the helix. A single entity sits at the centre.
fn chronological_fraction(index: usize, count: usize) -> f32 {
    if count <= 1 {
        return 0.5;
    }
    index as f32 / (count - 1) as f32
}

pub(super) fn helix_layout(entities: &[NodeData]) -> PositionMap {
    let mut sorted: Vec<&NodeData> = entities.iter().collect();
    // Tie-break on id so equal birth years still produce a stable order.
    sorted.sort_by(|a, b| {
        a.birth_year
            .cmp(&b.birth_year)
            .then_with(|| a.id.cmp(&b.id))
    });

    let count = sorted.len();
    sorted
        .into_iter()
        .enumerate()
        .map(|(index, entity)| {
            let t = chronological_fraction(index, count);
            (
                entity.id.clone(),
                LayoutPosition::at(strand_point(t, index % 2)),
            )
        })
        .collect()
}
