use bevy::math::Vec3;

/// Total particles held by the shared pool.
pub const PARTICLE_POOL_CAPACITY: usize = 10_000;

/// Particle slots in the single shared vertex buffer.
pub const MAX_BUFFER_PARTICLES: usize = 10_000;

/// Speed range in curve lengths per second.
pub const PARTICLE_SPEED_MIN: f32 = 0.2;
pub const PARTICLE_SPEED_MAX: f32 = 0.5;

/// Point size range before world scaling.
pub const PARTICLE_SIZE_MIN: f32 = 1.0;
pub const PARTICLE_SIZE_MAX: f32 = 3.0;

/// Base opacity range, multiplied by the end fade.
pub const PARTICLE_OPACITY_MIN: f32 = 0.5;
pub const PARTICLE_OPACITY_MAX: f32 = 1.0;

/// Share of the trip spent fading in at the start and out at the end.
pub const PARTICLE_FADE_FRACTION: f32 = 0.1;

/// World units per unit of particle size when expanded to a billboard quad.
pub const PARTICLE_WORLD_SCALE: f32 = 0.02;

/// Where unused buffer slots are parked.
pub const PARKED_PARTICLE_POSITION: Vec3 = Vec3::new(0.0, -1000.0, 0.0);

/// Midpoint lift is `min(distance * k, cap)`.
pub const CURVE_HEIGHT_FACTOR: f32 = 0.3;
pub const CURVE_HEIGHT_CAP: f32 = 2.0;

/// Arc-length table resolution for constant-speed curve sampling.
pub const CURVE_ARC_DIVISIONS: usize = 200;

/// Endpoint movement below this distance does not rebuild a curve.
pub const CURVE_REBUILD_EPSILON: f32 = 1.0e-3;

/// Seed for the stream system's particle randomiser.
pub const PARTICLE_RNG_SEED: u64 = 0x6e65_7875_735f_7074;

/// Connection palette as 0xRRGGBB.
pub const INFLUENCE_COLOUR: u32 = 0x40e0d0;
pub const CONTEMPORARY_COLOUR: u32 = 0xffd700;
pub const SCHOOL_COLOUR: u32 = 0xff69b4;
