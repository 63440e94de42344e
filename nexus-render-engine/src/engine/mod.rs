pub mod assets;
pub mod camera;
pub mod core;
pub mod culling;
pub mod layout;
pub mod loading;
pub mod lod;
pub mod particles;
pub mod scene;
pub mod systems;
pub mod transition;
