use bevy::prelude::*;
use constants::camera::{CAMERA_FOCUS, CAMERA_TWEEN_SECONDS};

/// Quadratic ease-in-out used for camera moves.
pub fn ease_in_out_quad(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) * 0.5
    }
}

/// Timed camera move from one eye position to another, always looking at
/// the scene focus.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraTween {
    pub from: Vec3,
    pub to: Vec3,
    pub focus: Vec3,
    elapsed: f32,
    duration: f32,
}

impl CameraTween {
    pub fn new(from: Vec3, to: Vec3) -> Self {
        Self {
            from,
            to,
            focus: CAMERA_FOCUS,
            elapsed: 0.0,
            duration: CAMERA_TWEEN_SECONDS,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Advance by `delta_seconds` and return the new eye position. The final
    /// step lands exactly on `to`.
    pub fn advance(&mut self, delta_seconds: f32) -> Vec3 {
        self.elapsed = (self.elapsed + delta_seconds.max(0.0)).min(self.duration);
        if self.is_finished() {
            return self.to;
        }
        let eased = ease_in_out_quad(self.elapsed / self.duration);
        self.from.lerp(self.to, eased)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quad_ease_is_symmetric() {
        assert_eq!(ease_in_out_quad(0.0), 0.0);
        assert_eq!(ease_in_out_quad(0.5), 0.5);
        assert_eq!(ease_in_out_quad(1.0), 1.0);
        assert!((ease_in_out_quad(0.25) + ease_in_out_quad(0.75) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn tween_lands_on_target() {
        let mut tween = CameraTween::new(Vec3::ZERO, Vec3::new(20.0, 0.0, 20.0));
        let halfway = tween.advance(CAMERA_TWEEN_SECONDS * 0.5);
        assert!((halfway - Vec3::new(10.0, 0.0, 10.0)).length() < 1e-4);
        assert!(!tween.is_finished());

        let end = tween.advance(CAMERA_TWEEN_SECONDS);
        assert_eq!(end, Vec3::new(20.0, 0.0, 20.0));
        assert!(tween.is_finished());
    }
}
