use bevy::asset::AssetMetaCheck;
use bevy::diagnostic::FrameTimeDiagnosticsPlugin;
use bevy::prelude::*;
use bevy_common_assets::json::JsonAssetPlugin;
use constants::particles::{MAX_BUFFER_PARTICLES, PARTICLE_POOL_CAPACITY};

// Crate engine modules
use crate::engine::assets::dataset::NodeDataset;
use crate::engine::camera::viewport_camera::spawn_viewport_camera;
use crate::engine::camera::{ResetCamera, ViewportCamera};
use crate::engine::core::app_state::{AppState, transition_to_running};
use crate::engine::core::window_config::create_window_config;
use crate::engine::culling::FrustumCuller;
use crate::engine::layout::LayoutConfig;
use crate::engine::loading::dataset_loader::{DatasetLoader, load_dataset_system, start_loading};
use crate::engine::loading::progress::LoadingProgress;
use crate::engine::loading::scene_creator::create_scene_when_ready;
use crate::engine::lod::LodController;
use crate::engine::particles::material::ParticleMaterial;
use crate::engine::particles::streams::ConnectionStreamSystem;
use crate::engine::scene::SceneNodes;
use crate::engine::scene::teardown::{TeardownScene, teardown_scene};
use crate::engine::systems::render_loop::RenderLoopPlugin;
use crate::engine::systems::scene_settings::SceneSettings;
use crate::engine::systems::stats::VisibilityStats;
use crate::engine::transition::{AuxiliaryGeometrySignal, ViewTransitionController};
// Create Web RPC modules
use crate::rpc::web_rpc::WebRpcPlugin;

#[cfg(not(target_arch = "wasm32"))]
use crate::engine::systems::stats::StatsText;

pub fn create_app() -> App {
    let mut app = App::new();

    let settings = SceneSettings::default();
    let streams = ConnectionStreamSystem::new(
        PARTICLE_POOL_CAPACITY,
        MAX_BUFFER_PARTICLES,
        settings.quality.settings().particles_per_connection,
    );

    app.add_plugins(create_default_plugins())
        .init_state::<AppState>()
        .add_plugins(MaterialPlugin::<ParticleMaterial>::default())
        .add_plugins(FrameTimeDiagnosticsPlugin::default())
        // Registers NodeDataset as a loadable asset type from JSON files.
        .add_plugins(JsonAssetPlugin::<NodeDataset>::new(&["json"]))
        .add_plugins(WebRpcPlugin)
        .add_plugins(RenderLoopPlugin);

    // Initialise resources early
    app.insert_resource(settings)
        .insert_resource(streams)
        .init_resource::<LoadingProgress>()
        .init_resource::<DatasetLoader>()
        .init_resource::<LayoutConfig>()
        .init_resource::<ViewportCamera>()
        .init_resource::<ViewTransitionController>()
        .init_resource::<FrustumCuller>()
        .init_resource::<LodController>()
        .init_resource::<SceneNodes>()
        .init_resource::<VisibilityStats>()
        .add_event::<ResetCamera>()
        .add_event::<AuxiliaryGeometrySignal>()
        .add_event::<TeardownScene>();

    // State-based system scheduling
    app.add_systems(Startup, (setup, start_loading).chain())
        .add_systems(
            Update,
            (
                // Loading phase systems
                load_dataset_system,
                create_scene_when_ready,
                transition_to_running,
            )
                .chain()
                .run_if(in_state(AppState::Loading)),
        )
        // Teardown must finish before the frame ends, whatever the state.
        .add_systems(Last, teardown_scene);

    app
}

fn spawn_lighting(commands: &mut Commands) {
    commands.insert_resource(AmbientLight {
        color: Color::WHITE,
        brightness: 400.0,
        ..default()
    });
    commands.spawn((
        PointLight {
            intensity: 2_000_000.0,
            range: 100.0,
            ..default()
        },
        Transform::from_xyz(10.0, 10.0, 10.0),
    ));
}

// Startup system that only handles basic initialisation
fn setup(mut commands: Commands, viewport: Res<ViewportCamera>, settings: Res<SceneSettings>) {
    spawn_lighting(&mut commands);
    spawn_viewport_camera(&mut commands, &viewport, &settings.quality.settings());

    #[cfg(not(target_arch = "wasm32"))]
    {
        create_native_overlays(&mut commands);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn create_native_overlays(commands: &mut Commands) {
    commands
        .spawn(Node {
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            ..default()
        })
        .with_children(|parent| {
            parent.spawn((
                Text::new("Visible: "),
                TextFont {
                    font_size: 16.0,
                    ..default()
                },
                TextColor(Color::srgb(0.25, 0.88, 0.82)),
                Node {
                    position_type: PositionType::Absolute,
                    bottom: Val::Px(12.0),
                    right: Val::Px(12.0),
                    ..default()
                },
                StatsText,
            ));
        });
}

fn create_default_plugins() -> impl PluginGroup {
    let window_config = WindowPlugin {
        primary_window: Some(create_window_config()),
        ..default()
    };

    let asset_config = AssetPlugin {
        meta_check: AssetMetaCheck::Never,
        ..default()
    };

    DefaultPlugins.set(window_config).set(asset_config)
}
