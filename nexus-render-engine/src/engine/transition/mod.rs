//! Animated switching between layout modes.
//!
//! [`ViewTransitionController`] is an explicit Idle/Transitioning state
//! machine advanced once per frame tick. It owns the displayed position of
//! every node; the scene copies those into transforms and the particle
//! streams resolve their endpoints from them.

pub mod camera_tween;

use bevy::prelude::*;
use constants::render_settings::TRANSITION_STEP;
use std::collections::HashMap;

use crate::engine::assets::dataset::NodeId;
use crate::engine::camera::ViewportCamera;
use crate::engine::layout::{LayoutConfig, LayoutMode, PositionMap};
use crate::engine::loading::dataset_loader::LoadedNodes;
use crate::engine::scene::SceneNode;
use crate::engine::systems::scene_settings::SceneSettings;

/// Progress within this distance of 1 counts as complete, absorbing the
/// rounding of repeated fixed-step adds.
const PROGRESS_EPSILON: f32 = 1.0e-4;

/// Cubic ease-in-out applied to raw transition progress.
pub fn ease_in_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) * 0.5
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionPhase {
    Idle,
    Transitioning,
}

/// Show or hide the geometry that belongs to one layout mode.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuxiliaryGeometrySignal {
    Show(LayoutMode),
    Hide(LayoutMode),
}

#[derive(Debug, Clone, Default)]
pub struct TransitionState {
    pub target_positions: PositionMap,
    pub progress: f32,
    pub active: bool,
}

#[derive(Resource, Debug, Clone)]
pub struct ViewTransitionController {
    mode: LayoutMode,
    state: TransitionState,
    start: HashMap<NodeId, Vec3>,
    displayed: HashMap<NodeId, Vec3>,
    shown_auxiliary: Option<LayoutMode>,
    step: f32,
}

impl Default for ViewTransitionController {
    fn default() -> Self {
        Self {
            mode: LayoutMode::default(),
            state: TransitionState {
                progress: 1.0,
                ..default()
            },
            start: HashMap::new(),
            displayed: HashMap::new(),
            shown_auxiliary: None,
            step: TRANSITION_STEP,
        }
    }
}

impl ViewTransitionController {
    pub fn with_step(step: f32) -> Self {
        Self {
            step: step.clamp(f32::EPSILON, 1.0),
            ..default()
        }
    }

    /// Place every node at its layout position without animating. Returns the
    /// auxiliary geometry that should be visible.
    pub fn initialise(
        &mut self,
        mode: LayoutMode,
        positions: PositionMap,
    ) -> Vec<AuxiliaryGeometrySignal> {
        self.mode = mode;
        self.displayed = positions.iter().map(|(id, p)| (id.clone(), p.position)).collect();
        self.start.clear();
        self.state = TransitionState {
            target_positions: positions,
            progress: 1.0,
            active: false,
        };

        let mut signals = Vec::new();
        if let Some(previous) = self.shown_auxiliary.take() {
            signals.push(AuxiliaryGeometrySignal::Hide(previous));
        }
        if mode.has_auxiliary_geometry() {
            self.shown_auxiliary = Some(mode);
            signals.push(AuxiliaryGeometrySignal::Show(mode));
        }
        signals
    }

    /// Start animating towards `target`. While already transitioning the
    /// in-flight target is replaced and progress restarts from the positions
    /// currently on screen. Requesting the mode already shown while idle does
    /// nothing and returns false.
    pub fn request(&mut self, mode: LayoutMode, target: PositionMap) -> bool {
        if !self.state.active && mode == self.mode {
            return false;
        }

        self.start = target
            .iter()
            .map(|(id, p)| (id.clone(), self.displayed.get(id).copied().unwrap_or(p.position)))
            .collect();
        self.mode = mode;
        self.state = TransitionState {
            target_positions: target,
            progress: 0.0,
            active: true,
        };
        true
    }

    /// Advance one frame tick.
    pub fn tick(&mut self) -> Vec<AuxiliaryGeometrySignal> {
        let mut signals = Vec::new();
        if !self.state.active {
            return signals;
        }

        let previous = self.state.progress;
        self.state.progress = (previous + self.step).min(1.0);

        // Leaving geometry goes once nodes are halfway clear of it.
        if previous < 0.5 && self.state.progress >= 0.5 {
            self.hide_stale_auxiliary(&mut signals);
        }

        if self.state.progress >= 1.0 - PROGRESS_EPSILON {
            self.finish(&mut signals);
            return signals;
        }

        let eased = ease_in_out_cubic(self.state.progress);
        for (id, target) in &self.state.target_positions {
            let start = self.start.get(id).copied().unwrap_or(target.position);
            self.displayed.insert(id.clone(), start.lerp(target.position, eased));
        }
        signals
    }

    fn finish(&mut self, signals: &mut Vec<AuxiliaryGeometrySignal>) {
        for (id, target) in &self.state.target_positions {
            self.displayed.insert(id.clone(), target.position);
        }
        self.state.progress = 1.0;
        self.state.active = false;
        self.start.clear();

        self.hide_stale_auxiliary(signals);
        if self.mode.has_auxiliary_geometry() && self.shown_auxiliary != Some(self.mode) {
            self.shown_auxiliary = Some(self.mode);
            signals.push(AuxiliaryGeometrySignal::Show(self.mode));
        }
    }

    fn hide_stale_auxiliary(&mut self, signals: &mut Vec<AuxiliaryGeometrySignal>) {
        if let Some(shown) = self.shown_auxiliary {
            if shown != self.mode {
                self.shown_auxiliary = None;
                signals.push(AuxiliaryGeometrySignal::Hide(shown));
            }
        }
    }

    pub fn phase(&self) -> TransitionPhase {
        if self.state.active {
            TransitionPhase::Transitioning
        } else {
            TransitionPhase::Idle
        }
    }

    pub fn is_active(&self) -> bool {
        self.state.active
    }

    pub fn progress(&self) -> f32 {
        self.state.progress
    }

    /// Mode being shown, or being transitioned to.
    pub fn mode(&self) -> LayoutMode {
        self.mode
    }

    pub fn target_positions(&self) -> &PositionMap {
        &self.state.target_positions
    }

    pub fn position(&self, id: &str) -> Option<Vec3> {
        self.displayed.get(id).copied()
    }

    pub fn shown_auxiliary(&self) -> Option<LayoutMode> {
        self.shown_auxiliary
    }

    pub fn clear(&mut self) {
        let step = self.step;
        *self = Self {
            step,
            ..default()
        };
    }
}

/// Start a transition when the requested view mode changes, then advance the
/// active one and move node transforms to the displayed positions.
pub fn advance_view_transition(
    settings: Res<SceneSettings>,
    config: Res<LayoutConfig>,
    loaded: Res<LoadedNodes>,
    mut controller: ResMut<ViewTransitionController>,
    mut camera: ResMut<ViewportCamera>,
    mut aux_events: EventWriter<AuxiliaryGeometrySignal>,
    mut nodes: Query<(&SceneNode, &mut Transform)>,
) {
    if settings.view_mode != controller.mode() {
        let target = config.compute(&loaded.nodes, settings.view_mode);
        if controller.request(settings.view_mode, target) {
            info!("→ Transitioning to {:?} layout", settings.view_mode);
            camera.start_tween(settings.view_mode.camera_eye());
        }
    }

    if !controller.is_active() {
        return;
    }

    for signal in controller.tick() {
        aux_events.write(signal);
    }

    for (node, mut transform) in &mut nodes {
        if let Some(position) = controller.position(&node.id) {
            if transform.translation != position {
                transform.translation = position;
            }
        }
    }

    if !controller.is_active() {
        info!("→ {:?} layout settled", controller.mode());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::layout::LayoutPosition;

    fn positions(entries: &[(&str, Vec3)]) -> PositionMap {
        entries
            .iter()
            .map(|(id, p)| (id.to_string(), LayoutPosition::at(*p)))
            .collect()
    }

    fn run_to_idle(controller: &mut ViewTransitionController) -> Vec<AuxiliaryGeometrySignal> {
        let mut signals = Vec::new();
        for _ in 0..1000 {
            if !controller.is_active() {
                break;
            }
            signals.extend(controller.tick());
        }
        signals
    }

    #[test]
    fn cubic_ease_endpoints_and_midpoint() {
        assert_eq!(ease_in_out_cubic(0.0), 0.0);
        assert_eq!(ease_in_out_cubic(0.5), 0.5);
        assert_eq!(ease_in_out_cubic(1.0), 1.0);
        assert!(ease_in_out_cubic(0.1) < 0.1);
        assert!(ease_in_out_cubic(0.9) > 0.9);
    }

    #[test]
    fn transition_converges_exactly() {
        let mut controller = ViewTransitionController::default();
        controller.initialise(LayoutMode::Radial, positions(&[("a", Vec3::ZERO), ("b", Vec3::X)]));

        let target = positions(&[
            ("a", Vec3::new(0.3, 1.7, -2.9)),
            ("b", Vec3::new(4.1, -0.7, 0.01)),
        ]);
        assert!(controller.request(LayoutMode::Helix, target.clone()));
        assert_eq!(controller.phase(), TransitionPhase::Transitioning);

        run_to_idle(&mut controller);
        assert_eq!(controller.phase(), TransitionPhase::Idle);
        assert_eq!(controller.progress(), 1.0);
        for (id, p) in &target {
            assert_eq!(controller.position(id), Some(p.position));
        }
    }

    #[test]
    fn progress_advances_by_fixed_step() {
        let mut controller = ViewTransitionController::default();
        controller.initialise(LayoutMode::Radial, positions(&[("a", Vec3::ZERO)]));
        controller.request(LayoutMode::Helix, positions(&[("a", Vec3::X)]));

        controller.tick();
        assert!((controller.progress() - TRANSITION_STEP).abs() < 1e-6);

        let mut ticks = 1;
        while controller.is_active() {
            controller.tick();
            ticks += 1;
        }
        assert_eq!(ticks, (1.0 / TRANSITION_STEP).round() as usize);
    }

    #[test]
    fn displayed_positions_follow_eased_progress() {
        let mut controller = ViewTransitionController::with_step(0.25);
        controller.initialise(LayoutMode::Radial, positions(&[("a", Vec3::ZERO)]));
        controller.request(LayoutMode::Helix, positions(&[("a", Vec3::new(8.0, 0.0, 0.0))]));

        controller.tick();
        let expected = 8.0 * ease_in_out_cubic(0.25);
        let x = controller.position("a").map(|p| p.x).unwrap_or_default();
        assert!((x - expected).abs() < 1e-5);
    }

    #[test]
    fn same_mode_request_while_idle_is_ignored() {
        let mut controller = ViewTransitionController::default();
        controller.initialise(LayoutMode::Radial, positions(&[("a", Vec3::ZERO)]));
        assert!(!controller.request(LayoutMode::Radial, positions(&[("a", Vec3::X)])));
        assert_eq!(controller.phase(), TransitionPhase::Idle);
        assert_eq!(controller.position("a"), Some(Vec3::ZERO));
    }

    #[test]
    fn retarget_restarts_from_displayed_positions() {
        let mut controller = ViewTransitionController::with_step(0.1);
        controller.initialise(LayoutMode::Radial, positions(&[("a", Vec3::ZERO)]));
        controller.request(LayoutMode::Helix, positions(&[("a", Vec3::new(10.0, 0.0, 0.0))]));
        for _ in 0..5 {
            controller.tick();
        }
        let midway = controller.position("a").unwrap_or_default();
        assert!(midway.x > 0.0 && midway.x < 10.0);

        let back = positions(&[("a", Vec3::new(-10.0, 0.0, 0.0))]);
        assert!(controller.request(LayoutMode::Radial, back));
        assert_eq!(controller.progress(), 0.0);
        assert_eq!(controller.position("a"), Some(midway));

        controller.tick();
        let after = controller.position("a").unwrap_or_default();
        let eased = ease_in_out_cubic(0.1);
        let expected = midway.x + (-10.0 - midway.x) * eased;
        assert!((after.x - expected).abs() < 1e-4);

        run_to_idle(&mut controller);
        assert_eq!(controller.position("a"), Some(Vec3::new(-10.0, 0.0, 0.0)));
    }

    #[test]
    fn helix_backbone_shows_on_arrival_and_hides_at_midpoint() {
        let mut controller = ViewTransitionController::default();
        let initial = controller.initialise(LayoutMode::Radial, positions(&[("a", Vec3::ZERO)]));
        assert!(initial.is_empty());

        controller.request(LayoutMode::Helix, positions(&[("a", Vec3::X)]));
        let mut arrival = Vec::new();
        while controller.is_active() {
            let progress_before = controller.progress();
            let signals = controller.tick();
            if !signals.is_empty() {
                assert!(progress_before + TRANSITION_STEP >= 1.0 - PROGRESS_EPSILON);
            }
            arrival.extend(signals);
        }
        assert_eq!(arrival, vec![AuxiliaryGeometrySignal::Show(LayoutMode::Helix)]);
        assert_eq!(controller.shown_auxiliary(), Some(LayoutMode::Helix));

        controller.request(LayoutMode::Radial, positions(&[("a", Vec3::ZERO)]));
        let mut hidden_at = None;
        while controller.is_active() {
            let signals = controller.tick();
            if signals.contains(&AuxiliaryGeometrySignal::Hide(LayoutMode::Helix)) {
                hidden_at = Some(controller.progress());
            }
        }
        let hidden_at = hidden_at.unwrap_or_default();
        assert!((0.5..0.5 + TRANSITION_STEP + 1e-6).contains(&hidden_at));
        assert_eq!(controller.shown_auxiliary(), None);
    }

    #[test]
    fn initialise_in_helix_shows_backbone_immediately() {
        let mut controller = ViewTransitionController::default();
        let signals = controller.initialise(LayoutMode::Helix, positions(&[("a", Vec3::ZERO)]));
        assert_eq!(signals, vec![AuxiliaryGeometrySignal::Show(LayoutMode::Helix)]);
    }
}
