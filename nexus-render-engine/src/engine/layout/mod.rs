//! Deterministic layout engine mapping node attributes to 3D positions.
//!
//! Two schemes are supported: a radial "orb" keyed by category and birth year,
//! and a chronological double helix. Layouts are pure functions of the node set
//! and mode; the only variation is jitter seeded from each node id.

/// Chronological double helix layout.
pub mod helix;

/// Id-seeded jitter source.
pub mod jitter;

/// Radial orb layout by category sector and year shell.
pub mod radial;

use bevy::prelude::*;
use constants::camera::{HELIX_CAMERA_EYE, ORB_CAMERA_EYE};
use constants::category::CATEGORY_MAP;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::engine::assets::dataset::{NodeData, NodeId};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    #[default]
    #[serde(alias = "orb")]
    Radial,
    Helix,
}

impl LayoutMode {
    pub fn toggled(self) -> Self {
        match self {
            LayoutMode::Radial => LayoutMode::Helix,
            LayoutMode::Helix => LayoutMode::Radial,
        }
    }

    /// Whether the mode owns auxiliary scene geometry (the helix backbone).
    pub fn has_auxiliary_geometry(self) -> bool {
        matches!(self, LayoutMode::Helix)
    }

    pub fn camera_eye(self) -> Vec3 {
        match self {
            LayoutMode::Radial => ORB_CAMERA_EYE,
            LayoutMode::Helix => HELIX_CAMERA_EYE,
        }
    }
}

/// Placement of one node in one layout. Produced fresh on every layout
/// computation and replaced wholesale, never edited in place.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutPosition {
    pub position: Vec3,
    pub rotation: Option<Quat>,
    pub scale: Option<Vec3>,
}

impl LayoutPosition {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            rotation: None,
            scale: None,
        }
    }
}

pub type PositionMap = HashMap<NodeId, LayoutPosition>;

/// Category domain used to assign radial sectors.
#[derive(Resource, Debug, Clone)]
pub struct LayoutConfig {
    pub categories: Vec<String>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            categories: CATEGORY_MAP.iter().map(|c| c.name.to_string()).collect(),
        }
    }
}

impl LayoutConfig {
    /// One position per input node. Empty input gives an empty map.
    pub fn compute(&self, entities: &[NodeData], mode: LayoutMode) -> PositionMap {
        match mode {
            LayoutMode::Radial => radial::radial_layout(entities, &self.categories),
            LayoutMode::Helix => helix::helix_layout(entities),
        }
    }
}

/// Layout with the default category domain.
pub fn compute_layout(entities: &[NodeData], mode: LayoutMode) -> PositionMap {
    LayoutConfig::default().compute(entities, mode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use constants::layout::{
        HELIX_HEIGHT, HELIX_JITTER, RADIAL_CORE_RADIUS, RADIAL_OUTER_RADIUS,
        RADIAL_VERTICAL_JITTER,
    };
    use std::f32::consts::TAU;

    fn node(id: &str, category: Option<&str>, birth_year: i32) -> NodeData {
        NodeData {
            id: id.to_string(),
            display_name: id.to_string(),
            category: category.map(str::to_string),
            birth_year,
            death_year: None,
            influenced_by: Vec::new(),
        }
    }

    fn sample_nodes() -> Vec<NodeData> {
        let categories = ["ethics", "aesthetics", "logic", "politics", "metaphysics"];
        (0..40)
            .map(|i| {
                let year = -600 + ((i * 373) % 2600) as i32;
                node(&format!("n{i}"), Some(categories[i % 5]), year)
            })
            .collect()
    }

    fn horizontal_radius(position: Vec3) -> f32 {
        Vec2::new(position.x, position.z).length()
    }

    #[test]
    fn layouts_are_bit_identical_across_runs() {
        let nodes = sample_nodes();
        for mode in [LayoutMode::Radial, LayoutMode::Helix] {
            let first = compute_layout(&nodes, mode);
            let second = compute_layout(&nodes, mode);
            assert_eq!(first.len(), nodes.len());
            for (id, position) in &first {
                let other = second[id].position;
                assert_eq!(
                    position.position.to_array().map(f32::to_bits),
                    other.to_array().map(f32::to_bits)
                );
            }
        }
    }

    #[test]
    fn every_node_gets_exactly_one_position() {
        let nodes = sample_nodes();
        for mode in [LayoutMode::Radial, LayoutMode::Helix] {
            let positions = compute_layout(&nodes, mode);
            assert_eq!(positions.len(), nodes.len());
            assert!(nodes.iter().all(|n| positions.contains_key(&n.id)));
        }
    }

    #[test]
    fn helix_height_follows_birth_year() {
        let nodes = sample_nodes();
        let positions = compute_layout(&nodes, LayoutMode::Helix);

        for a in &nodes {
            for b in &nodes {
                if a.birth_year < b.birth_year {
                    let ya = positions[&a.id].position.y;
                    let yb = positions[&b.id].position.y;
                    assert!(ya < yb + HELIX_JITTER, "{} ({ya}) vs {} ({yb})", a.id, b.id);
                }
            }
        }
    }

    #[test]
    fn helix_alternates_strands_within_height() {
        let nodes = sample_nodes();
        let positions = compute_layout(&nodes, LayoutMode::Helix);
        let mut sorted: Vec<_> = positions.values().map(|p| p.position).collect();
        sorted.sort_by(|a, b| a.y.total_cmp(&b.y));

        for (index, position) in sorted.iter().enumerate() {
            let expected = if index % 2 == 0 { 4.0 } else { 6.0 };
            assert!((horizontal_radius(*position) - expected).abs() < 1e-3);
            assert!(position.y.abs() <= HELIX_HEIGHT * 0.5 + 1e-4);
        }
    }

    #[test]
    fn radial_radius_follows_birth_year() {
        let nodes = sample_nodes();
        let positions = compute_layout(&nodes, LayoutMode::Radial);

        for a in &nodes {
            for b in &nodes {
                if a.birth_year < b.birth_year {
                    let ra = horizontal_radius(positions[&a.id].position);
                    let rb = horizontal_radius(positions[&b.id].position);
                    assert!(ra <= rb + 1e-4);
                }
            }
        }
    }

    #[test]
    fn radial_two_node_scenario() {
        let nodes = vec![node("a", None, -470), node("b", None, 1724)];
        let positions = compute_layout(&nodes, LayoutMode::Radial);
        let a = positions["a"].position;
        let b = positions["b"].position;

        assert!(a.is_finite() && b.is_finite());
        assert!(horizontal_radius(a) < horizontal_radius(b));
        assert!((horizontal_radius(a) - RADIAL_CORE_RADIUS).abs() < 1e-4);
        assert!((horizontal_radius(b) - RADIAL_OUTER_RADIUS).abs() < 1e-4);
        assert!(a.distance(b) > 2.0 * RADIAL_VERTICAL_JITTER);
    }

    #[test]
    fn radial_places_categories_in_their_sector() {
        let config = LayoutConfig::default();
        let nodes = vec![
            node("first", Some("ethics"), 0),
            node("fourth", Some("politics"), 100),
            node("unknown", Some("alchemy"), 200),
            node("missing", None, 300),
        ];
        let positions = config.compute(&nodes, LayoutMode::Radial);
        let sector_width = TAU / config.categories.len() as f32;

        let sector_of = |id: &str| {
            let p = positions[id].position;
            (p.z.atan2(p.x).rem_euclid(TAU) / sector_width).floor() as usize
        };

        assert_eq!(sector_of("first"), 0);
        assert_eq!(sector_of("fourth"), 3);
        assert_eq!(sector_of("unknown"), 0);
        assert_eq!(sector_of("missing"), 0);
    }

    #[test]
    fn empty_input_gives_empty_map() {
        assert!(compute_layout(&[], LayoutMode::Radial).is_empty());
        assert!(compute_layout(&[], LayoutMode::Helix).is_empty());
    }

    #[test]
    fn single_node_has_finite_fallback() {
        let nodes = vec![node("solo", Some("logic"), 1000)];
        for mode in [LayoutMode::Radial, LayoutMode::Helix] {
            let positions = compute_layout(&nodes, mode);
            assert_eq!(positions.len(), 1);
            assert!(positions["solo"].position.is_finite());
        }
        let helix = compute_layout(&nodes, LayoutMode::Helix);
        assert_eq!(helix["solo"].position.y, 0.0);
    }

    #[test]
    fn layout_mode_parses_orb_alias() {
        let mode: LayoutMode = serde_json::from_str("\"orb\"").unwrap();
        assert_eq!(mode, LayoutMode::Radial);
        let mode: LayoutMode = serde_json::from_str("\"helix\"").unwrap();
        assert_eq!(mode, LayoutMode::Helix);
        assert_eq!(LayoutMode::Radial.toggled(), LayoutMode::Helix);
    }
}
