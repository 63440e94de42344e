use bevy::math::Vec3;

/// Camera eye position when the orb layout is shown.
pub const ORB_CAMERA_EYE: Vec3 = Vec3::new(0.0, 10.0, 20.0);

/// Camera eye position when the helix layout is shown.
pub const HELIX_CAMERA_EYE: Vec3 = Vec3::new(20.0, 0.0, 20.0);

/// Point every preset looks at.
pub const CAMERA_FOCUS: Vec3 = Vec3::ZERO;

/// Duration of the camera move that accompanies a layout switch.
pub const CAMERA_TWEEN_SECONDS: f32 = 2.0;

pub const CAMERA_MIN_DISTANCE: f32 = 3.0;
pub const CAMERA_MAX_DISTANCE: f32 = 120.0;

pub const CAMERA_FOV_RADIANS: f32 = std::f32::consts::FRAC_PI_4;
