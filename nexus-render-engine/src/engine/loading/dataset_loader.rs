use bevy::asset::LoadState;
use bevy::prelude::*;
use constants::path::DATASET_PATH;

use super::progress::LoadingProgress;
use crate::engine::assets::dataset::{NodeData, NodeDataset};

#[derive(Resource, Default)]
pub struct DatasetLoader {
    handle: Option<Handle<NodeDataset>>,
}

/// Validated nodes, read by layout requests for the rest of the session.
#[derive(Resource, Debug, Clone, Default)]
pub struct LoadedNodes {
    pub nodes: Vec<NodeData>,
}

// Start the loading process
pub fn start_loading(mut dataset_loader: ResMut<DatasetLoader>, asset_server: Res<AssetServer>) {
    info!("Loading dataset from {}", DATASET_PATH);
    dataset_loader.handle = Some(asset_server.load(DATASET_PATH));
}

/// Validate the dataset as soon as it arrives. Unreadable or invalid data is
/// fatal: it is logged and the app exits with an error.
pub fn load_dataset_system(
    mut commands: Commands,
    mut loading_progress: ResMut<LoadingProgress>,
    dataset_loader: Res<DatasetLoader>,
    datasets: Res<Assets<NodeDataset>>,
    asset_server: Res<AssetServer>,
    mut exit_events: EventWriter<AppExit>,
) {
    if loading_progress.dataset_loaded || loading_progress.failed {
        return;
    }
    let Some(handle) = &dataset_loader.handle else {
        return;
    };

    if let Some(LoadState::Failed(err)) = asset_server.get_load_state(handle) {
        error!("Failed to load dataset {}: {}", DATASET_PATH, err);
        loading_progress.failed = true;
        exit_events.write(AppExit::error());
        return;
    }

    let Some(dataset) = datasets.get(handle) else {
        return;
    };

    match dataset.validate() {
        Ok(validated) => {
            if validated.dangling_influences > 0 {
                warn!(
                    "Dropped {} influence references to unknown nodes",
                    validated.dangling_influences
                );
            }
            info!("✓ Dataset loaded: {} nodes", validated.nodes.len());
            commands.insert_resource(LoadedNodes {
                nodes: validated.nodes,
            });
            loading_progress.dataset_loaded = true;
        }
        Err(err) => {
            error!("Dataset rejected: {}", err);
            loading_progress.failed = true;
            exit_events.write(AppExit::error());
        }
    }
}
