//! Radial orb: category sectors around the Y axis, radius by birth year.
//! Double helix: two counter-phased strands, height by chronological rank.

/// Radius of the innermost (earliest) radial shell.
pub const RADIAL_CORE_RADIUS: f32 = 2.0;

/// Radius of the outermost (latest) radial shell.
pub const RADIAL_OUTER_RADIUS: f32 = 8.0;

/// Angular gap in radians left on both sides of every category sector.
pub const RADIAL_SECTOR_GAP: f32 = 0.02;

/// Fraction of half the usable sector width that angular jitter may cover.
pub const RADIAL_ANGULAR_JITTER: f32 = 0.8;

/// Maximum absolute vertical jitter in world units.
pub const RADIAL_VERTICAL_JITTER: f32 = 0.5;

/// Normalised year used when every entity shares one birth year.
pub const RADIAL_DEGENERATE_YEAR_FRACTION: f32 = 0.5;

/// Strand radius of the first helix strand; the second adds the offset.
pub const HELIX_RADIUS: f32 = 4.0;
pub const HELIX_STRAND_RADIUS_OFFSET: f32 = 2.0;

/// Total height covered by both strands, centred on the origin.
pub const HELIX_HEIGHT: f32 = 20.0;

/// Number of full turns swept from bottom to top.
pub const HELIX_TURNS: f32 = 6.0;

/// Helix positions carry no jitter, so chronological ordering is exact.
pub const HELIX_JITTER: f32 = 0.0;

/// Backbone polyline samples per strand and rung count.
pub const HELIX_BACKBONE_SAMPLES: usize = 100;
pub const HELIX_BACKBONE_RUNGS: usize = 50;
