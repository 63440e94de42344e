use bevy::core_pipeline::bloom::Bloom;
use bevy::input::mouse::{MouseMotion, MouseScrollUnit, MouseWheel};
use bevy::prelude::*;
use constants::camera::{
    CAMERA_FOCUS, CAMERA_FOV_RADIANS, CAMERA_MAX_DISTANCE, CAMERA_MIN_DISTANCE, ORB_CAMERA_EYE,
};
use constants::render_settings::QualityPreset;

use crate::engine::systems::scene_settings::SceneSettings;
use crate::engine::transition::camera_tween::CameraTween;

/// Move the camera back to the preset eye of the current view mode.
#[derive(Event, Debug, Clone, Copy)]
pub struct ResetCamera;

#[derive(Resource, Debug, Clone)]
pub struct ViewportCamera {
    pub focus_point: Vec3,
    pub distance: f32,
    pub yaw: f32,
    pub pitch: f32,
    pub tween: Option<CameraTween>,
}

impl Default for ViewportCamera {
    fn default() -> Self {
        Self::looking_from(ORB_CAMERA_EYE)
    }
}

impl ViewportCamera {
    /// Orbit state for an eye position looking at the scene focus.
    pub fn looking_from(eye: Vec3) -> Self {
        let mut camera = Self {
            focus_point: CAMERA_FOCUS,
            distance: CAMERA_MIN_DISTANCE,
            yaw: 0.0,
            pitch: 0.0,
            tween: None,
        };
        camera.set_eye(eye);
        camera
    }

    pub fn eye(&self) -> Vec3 {
        let direction = Vec3::new(
            self.yaw.sin() * self.pitch.cos(),
            self.pitch.sin(),
            self.yaw.cos() * self.pitch.cos(),
        );
        self.focus_point + direction * self.distance
    }

    pub fn set_eye(&mut self, eye: Vec3) {
        let offset = eye - self.focus_point;
        let length = offset.length();
        if length <= f32::EPSILON {
            return;
        }
        self.distance = length.clamp(CAMERA_MIN_DISTANCE, CAMERA_MAX_DISTANCE);
        self.yaw = offset.x.atan2(offset.z);
        self.pitch = (offset.y / length).clamp(-1.0, 1.0).asin();
    }

    /// Ease from the current eye to `eye` over the tween duration.
    pub fn start_tween(&mut self, eye: Vec3) {
        self.tween = Some(CameraTween::new(self.eye(), eye));
    }

    pub fn is_tweening(&self) -> bool {
        self.tween.is_some()
    }

    fn advance_tween(&mut self, delta_seconds: f32) {
        let Some(tween) = self.tween.as_mut() else {
            return;
        };
        let eye = tween.advance(delta_seconds);
        let finished = tween.is_finished();
        self.focus_point = tween.focus;
        self.set_eye(eye);
        if finished {
            self.tween = None;
        }
    }

    fn orbit(&mut self, mouse_delta: Vec2) {
        let yaw_sens = 0.005;
        let pitch_sens = 0.005;
        self.yaw -= mouse_delta.x * yaw_sens;
        self.pitch = (self.pitch + mouse_delta.y * pitch_sens).clamp(-1.55, 1.55);
    }

    fn zoom(&mut self, scroll: f32) {
        let factor = (1.0 - scroll * 0.1).clamp(0.5, 1.5);
        self.distance = (self.distance * factor).clamp(CAMERA_MIN_DISTANCE, CAMERA_MAX_DISTANCE);
    }
}

pub fn spawn_viewport_camera(
    commands: &mut Commands,
    viewport: &ViewportCamera,
    preset: &QualityPreset,
) -> Entity {
    let entity = commands
        .spawn((
            Camera3d::default(),
            Camera {
                hdr: true,
                clear_color: ClearColorConfig::Custom(Color::BLACK),
                ..default()
            },
            Projection::Perspective(PerspectiveProjection {
                fov: CAMERA_FOV_RADIANS,
                ..default()
            }),
            Transform::from_translation(viewport.eye()).looking_at(viewport.focus_point, Vec3::Y),
        ))
        .id();
    configure_camera_quality(commands, entity, preset);
    entity
}

/// Apply the post-processing and anti-aliasing of a quality preset.
pub fn configure_camera_quality(commands: &mut Commands, camera: Entity, preset: &QualityPreset) {
    let msaa = match preset.msaa_samples {
        0 | 1 => Msaa::Off,
        2 => Msaa::Sample2,
        8 => Msaa::Sample8,
        _ => Msaa::Sample4,
    };

    let mut entity = commands.entity(camera);
    entity.insert(msaa);
    if preset.post_processing {
        entity.insert(Bloom::NATURAL);
    } else {
        entity.remove::<Bloom>();
    }
}

pub fn camera_controller(
    mut camera_query: Query<&mut Transform, With<Camera3d>>,
    mut viewport: ResMut<ViewportCamera>,
    settings: Res<SceneSettings>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    mut mouse_motion: EventReader<MouseMotion>,
    mut scroll_events: EventReader<MouseWheel>,
    mut reset_events: EventReader<ResetCamera>,
    time: Res<Time>,
) {
    let Ok(mut camera_transform) = camera_query.single_mut() else {
        return;
    };

    let mouse_delta: Vec2 = mouse_motion.read().map(|m| m.delta).sum();
    let scroll: f32 = scroll_events
        .read()
        .map(|ev| match ev.unit {
            MouseScrollUnit::Line => ev.y,
            MouseScrollUnit::Pixel => ev.y * 0.05,
        })
        .sum();

    if reset_events.read().count() > 0 {
        viewport.start_tween(settings.view_mode.camera_eye());
    }

    if viewport.is_tweening() {
        // User input waits for the layout move to finish.
        viewport.advance_tween(time.delta_secs());
    } else {
        if mouse_button.pressed(MouseButton::Left) && mouse_delta != Vec2::ZERO {
            viewport.orbit(mouse_delta);
        }
        if scroll.abs() > f32::EPSILON {
            viewport.zoom(scroll);
        }
    }

    let target =
        Transform::from_translation(viewport.eye()).looking_at(viewport.focus_point, Vec3::Y);
    if viewport.is_tweening() {
        *camera_transform = target;
    } else {
        let lerp_speed = (12.0 * time.delta_secs()).min(1.0);
        camera_transform.translation =
            camera_transform.translation.lerp(target.translation, lerp_speed);
        camera_transform.rotation = camera_transform.rotation.slerp(target.rotation, lerp_speed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use constants::camera::{CAMERA_TWEEN_SECONDS, HELIX_CAMERA_EYE};

    #[test]
    fn eye_round_trips_through_orbit_state() {
        for eye in [ORB_CAMERA_EYE, HELIX_CAMERA_EYE, Vec3::new(-7.0, 3.0, -2.0)] {
            let camera = ViewportCamera::looking_from(eye);
            assert!(camera.eye().distance(eye) < 1e-4, "{eye:?}");
        }
    }

    #[test]
    fn zoom_respects_distance_limits() {
        let mut camera = ViewportCamera::default();
        for _ in 0..100 {
            camera.zoom(5.0);
        }
        assert_eq!(camera.distance, CAMERA_MIN_DISTANCE);
        for _ in 0..100 {
            camera.zoom(-5.0);
        }
        assert_eq!(camera.distance, CAMERA_MAX_DISTANCE);
    }

    #[test]
    fn tween_moves_camera_to_preset() {
        let mut camera = ViewportCamera::default();
        camera.start_tween(HELIX_CAMERA_EYE);
        assert!(camera.is_tweening());

        camera.advance_tween(CAMERA_TWEEN_SECONDS * 0.5);
        assert!(camera.is_tweening());
        camera.advance_tween(CAMERA_TWEEN_SECONDS);

        assert!(!camera.is_tweening());
        assert!(camera.eye().distance(HELIX_CAMERA_EYE) < 1e-4);
    }

    #[test]
    fn pitch_is_clamped_while_orbiting() {
        let mut camera = ViewportCamera::default();
        camera.orbit(Vec2::new(0.0, 10_000.0));
        assert!(camera.pitch <= 1.55);
        camera.orbit(Vec2::new(0.0, -20_000.0));
        assert!(camera.pitch >= -1.55);
    }
}
