/// Scene settings and the keyboard shortcuts that drive them
use bevy::prelude::*;
use constants::render_settings::{
    ANIMATION_SPEED_MAX, ANIMATION_SPEED_MIN, ANIMATION_SPEED_STEP, QUALITY_HIGH, QUALITY_LOW,
    QUALITY_MEDIUM, QualityPreset,
};
use serde::{Deserialize, Serialize};

use crate::engine::camera::ResetCamera;
use crate::engine::layout::LayoutMode;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityLevel {
    #[default]
    High,
    Medium,
    Low,
}

impl QualityLevel {
    pub fn settings(self) -> QualityPreset {
        match self {
            QualityLevel::High => QUALITY_HIGH,
            QualityLevel::Medium => QUALITY_MEDIUM,
            QualityLevel::Low => QUALITY_LOW,
        }
    }
}

/// Explicit scene state read by every per-frame system. Input handlers and
/// the RPC bridge write it; nothing else does.
#[derive(Resource, Debug, Clone)]
pub struct SceneSettings {
    pub view_mode: LayoutMode,
    pub paused: bool,
    pub speed: f32,
    pub quality: QualityLevel,
    pub show_connections: bool,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            view_mode: LayoutMode::Radial,
            paused: false,
            speed: 1.0,
            quality: QualityLevel::High,
            show_connections: true,
        }
    }
}

impl SceneSettings {
    pub fn set_speed(&mut self, speed: f32) {
        if speed.is_finite() {
            self.speed = speed.clamp(ANIMATION_SPEED_MIN, ANIMATION_SPEED_MAX);
        }
    }

    pub fn adjust_speed(&mut self, steps: f32) {
        // Round to the step grid so repeated presses do not accumulate error.
        let target = ((self.speed + steps * ANIMATION_SPEED_STEP) * 10.0).round() / 10.0;
        self.set_speed(target);
    }

    /// Seconds of particle animation for a frame of `delta_seconds`.
    pub fn animation_delta(&self, delta_seconds: f32) -> f32 {
        if self.paused {
            0.0
        } else {
            delta_seconds * self.speed
        }
    }
}

/// Handle scene shortcuts via keyboard
pub fn scene_shortcut_system(
    mut settings: ResMut<SceneSettings>,
    mut reset_events: EventWriter<ResetCamera>,
    keyboard: Res<ButtonInput<KeyCode>>,
) {
    if keyboard.just_pressed(KeyCode::KeyV) {
        settings.view_mode = settings.view_mode.toggled();
        info!("View mode: {:?}", settings.view_mode);
    }

    if keyboard.just_pressed(KeyCode::Space) {
        settings.paused = !settings.paused;
        info!("Particles {}", if settings.paused { "paused" } else { "resumed" });
    }

    if keyboard.any_just_pressed([KeyCode::Equal, KeyCode::NumpadAdd]) {
        settings.adjust_speed(1.0);
        info!("Animation speed: {:.1}", settings.speed);
    }

    if keyboard.any_just_pressed([KeyCode::Minus, KeyCode::NumpadSubtract]) {
        settings.adjust_speed(-1.0);
        info!("Animation speed: {:.1}", settings.speed);
    }

    if keyboard.just_pressed(KeyCode::KeyC) {
        settings.show_connections = !settings.show_connections;
        info!("Connections visible: {}", settings.show_connections);
    }

    if keyboard.just_pressed(KeyCode::KeyR) {
        reset_events.write(ResetCamera);
    }

    for (key, quality) in [
        (KeyCode::Digit1, QualityLevel::High),
        (KeyCode::Digit2, QualityLevel::Medium),
        (KeyCode::Digit3, QualityLevel::Low),
    ] {
        if keyboard.just_pressed(key) && settings.quality != quality {
            settings.quality = quality;
            info!("Quality: {:?}", quality);
        }
    }
}
