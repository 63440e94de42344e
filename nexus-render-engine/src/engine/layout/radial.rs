use bevy::prelude::*;
use constants::layout::{
    RADIAL_ANGULAR_JITTER, RADIAL_CORE_RADIUS, RADIAL_DEGENERATE_YEAR_FRACTION,
    RADIAL_OUTER_RADIUS, RADIAL_SECTOR_GAP, RADIAL_VERTICAL_JITTER,
};
use rand::Rng;
use std::f32::consts::TAU;

use super::jitter::id_rng;
use super::{LayoutPosition, PositionMap};
use crate::engine::assets::dataset::NodeData;

/// Sector index for a category; unknown or missing categories use sector 0.
pub fn category_index(category: Option<&str>, categories: &[String]) -> usize {
    category
        .and_then(|name| categories.iter().position(|c| c == name))
        .unwrap_or(0)
}

/// Observed birth-year range, `None` for an empty set.
pub fn year_range(entities: &[NodeData]) -> Option<(i32, i32)> {
    let min = entities.iter().map(|e| e.birth_year).min()?;
    let max = entities.iter().map(|e| e.birth_year).max()?;
    Some((min, max))
}

/// Position of `year` inside the range in [0, 1]. A zero-width range yields
/// the documented degenerate fraction instead of dividing by zero.
pub fn normalized_year(year: i32, min: i32, max: i32) -> f32 {
    if max <= min {
        return RADIAL_DEGENERATE_YEAR_FRACTION;
    }
    let span = (max as i64 - min as i64) as f64;
    (((year as i64 - min as i64) as f64) / span).clamp(0.0, 1.0) as f32
}

/// Radius of a year shell. Monotonic in the year; never jittered.
pub fn year_radius(fraction: f32) -> f32 {
    RADIAL_CORE_RADIUS + (RADIAL_OUTER_RADIUS - RADIAL_CORE_RADIUS) * fraction
}

pub(super) fn radial_layout(entities: &[NodeData], categories: &[String]) -> PositionMap {
    let mut positions = PositionMap::with_capacity(entities.len());
    let Some((min_year, max_year)) = year_range(entities) else {
        return positions;
    };

    let sector_count = categories.len().max(1);
    let sector_width = TAU / sector_count as f32;
    let usable_width = (sector_width - 2.0 * RADIAL_SECTOR_GAP).max(0.0);
    let max_angular_jitter = usable_width * 0.5 * RADIAL_ANGULAR_JITTER;

    for entity in entities {
        let sector = category_index(entity.category.as_deref(), categories);
        let radius = year_radius(normalized_year(entity.birth_year, min_year, max_year));

        let mut rng = id_rng(&entity.id);
        let angular_jitter = rng.gen_range(-1.0f32..=1.0) * max_angular_jitter;
        let vertical_jitter = rng.gen_range(-1.0f32..=1.0) * RADIAL_VERTICAL_JITTER;

        let angle = sector as f32 * sector_width + sector_width * 0.5 + angular_jitter;

        positions.insert(
            entity.id.clone(),
            LayoutPosition::at(Vec3::new(
                angle.cos() * radius,
                vertical_jitter,
                angle.sin() * radius,
            )),
        );
    }

    positions
}
