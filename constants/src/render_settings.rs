/// One level-of-detail tier. Tiers are ordered from most detailed (near)
/// to least detailed (far); `min_distance` strictly increases with the index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LodTier {
    pub min_distance: f32,
    pub geometry_detail: u32,
    pub show_label: bool,
    pub show_effects: bool,
}

pub const LOD_TIERS: [LodTier; 4] = [
    LodTier {
        min_distance: 0.0,
        geometry_detail: 16,
        show_label: true,
        show_effects: true,
    },
    LodTier {
        min_distance: 15.0,
        geometry_detail: 8,
        show_label: true,
        show_effects: false,
    },
    LodTier {
        min_distance: 30.0,
        geometry_detail: 4,
        show_label: false,
        show_effects: false,
    },
    LodTier {
        min_distance: 50.0,
        geometry_detail: 2,
        show_label: false,
        show_effects: false,
    },
];

/// Node sphere radius shared by every LOD geometry.
pub const NODE_RADIUS: f32 = 0.15;

/// Glow intensity written to the node material per tier.
pub const GLOW_INTENSITY_EFFECTS: f32 = 0.3;
pub const GLOW_INTENSITY_PLAIN: f32 = 0.1;

/// Emissive gain applied on top of the glow intensity.
pub const GLOW_EMISSIVE_GAIN: f32 = 4.0;

/// Per-quality constants. The engine receives the level as an opaque input
/// and only ever reads this table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualityPreset {
    pub particles_per_connection: usize,
    pub max_sphere_segments: u32,
    pub post_processing: bool,
    pub msaa_samples: u32,
}

pub const QUALITY_HIGH: QualityPreset = QualityPreset {
    particles_per_connection: 20,
    max_sphere_segments: 16,
    post_processing: true,
    msaa_samples: 4,
};

pub const QUALITY_MEDIUM: QualityPreset = QualityPreset {
    particles_per_connection: 12,
    max_sphere_segments: 12,
    post_processing: false,
    msaa_samples: 4,
};

pub const QUALITY_LOW: QualityPreset = QualityPreset {
    particles_per_connection: 6,
    max_sphere_segments: 8,
    post_processing: false,
    msaa_samples: 1,
};

/// Layout transition advance per frame tick (50 ticks end to end).
pub const TRANSITION_STEP: f32 = 0.02;

/// Interval between visible-count notifications to the host page.
pub const STATS_NOTIFY_INTERVAL_SECONDS: f32 = 0.5;

/// Particle animation speed multiplier bounds and keyboard step.
pub const ANIMATION_SPEED_MIN: f32 = 0.1;
pub const ANIMATION_SPEED_MAX: f32 = 3.0;
pub const ANIMATION_SPEED_STEP: f32 = 0.1;
