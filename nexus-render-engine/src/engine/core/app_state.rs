use bevy::prelude::*;

use crate::engine::loading::progress::LoadingProgress;

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, States)]
pub enum AppState {
    #[default]
    Loading,
    Running,
    /// The scene was disposed on request; nothing is drawn any more.
    TornDown,
}

// Final transition to running state
pub fn transition_to_running(
    loading_progress: Res<LoadingProgress>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    if loading_progress.scene_spawned {
        info!("→ Scene ready, transitioning to Running state");
        next_state.set(AppState::Running);
    }
}
