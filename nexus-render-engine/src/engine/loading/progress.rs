use bevy::prelude::*;

#[derive(Resource, Default, Debug)]
pub struct LoadingProgress {
    pub dataset_loaded: bool,
    pub scene_spawned: bool,
    pub failed: bool,
}
