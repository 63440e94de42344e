use bevy::diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin};
use bevy::prelude::*;
use constants::render_settings::STATS_NOTIFY_INTERVAL_SECONDS;
use serde::Serialize;

use crate::rpc::web_rpc::WebRpcInterface;

/// Nodes that survived frustum culling this frame, out of all spawned nodes.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VisibilityStats {
    pub visible: usize,
    pub total: usize,
}

#[derive(Component)]
pub struct StatsText;

pub fn visible_count_notification_system(
    mut rpc_interface: ResMut<WebRpcInterface>,
    stats: Res<VisibilityStats>,
    diagnostics: Res<DiagnosticsStore>,
    mut last_send_time: Local<f32>,
    time: Res<Time>,
) {
    let current_time = time.elapsed_secs();
    if current_time - *last_send_time < STATS_NOTIFY_INTERVAL_SECONDS {
        return;
    }

    let fps = diagnostics
        .get(&FrameTimeDiagnosticsPlugin::FPS)
        .and_then(|fps| fps.smoothed())
        .unwrap_or(0.0) as f32;

    rpc_interface.send_notification(
        "visible_count_update",
        serde_json::json!({
            "visible": stats.visible,
            "total": stats.total,
            "fps": fps
        }),
    );
    *last_send_time = current_time;
}

pub fn stats_text_update_system(
    stats: Res<VisibilityStats>,
    diagnostics: Res<DiagnosticsStore>,
    mut query: Query<&mut Text, With<StatsText>>,
) {
    let fps = diagnostics
        .get(&FrameTimeDiagnosticsPlugin::FPS)
        .and_then(|fps| fps.smoothed());

    for mut text in &mut query {
        text.0 = match fps {
            Some(value) => format!("FPS: {value:.1}  Visible: {}/{}", stats.visible, stats.total),
            None => format!("Visible: {}/{}", stats.visible, stats.total),
        };
    }
}
