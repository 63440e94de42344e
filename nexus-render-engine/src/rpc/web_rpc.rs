use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::engine::layout::LayoutMode;
use crate::engine::lod::NodeLod;
use crate::engine::scene::SceneNodes;
use crate::engine::scene::teardown::TeardownScene;
use crate::engine::systems::scene_settings::{QualityLevel, SceneSettings};
use crate::engine::systems::stats::VisibilityStats;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsValue;

#[cfg(target_arch = "wasm32")]
use web_sys::{MessageEvent, window};

/// JSON-RPC 2.0 request structure.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 response structure.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcResponse {
    pub jsonrpc: String,
    pub result: Option<serde_json::Value>,
    pub error: Option<RpcError>,
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 notification structure for one-way communication.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcNotification {
    pub jsonrpc: String,
    pub method: String,
    pub params: serde_json::Value,
}

/// JSON-RPC 2.0 error object.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

/// Resource managing bidirectional RPC communication with the host page.
#[derive(Resource, Default)]
pub struct WebRpcInterface {
    outgoing_notifications: Vec<RpcNotification>,
    outgoing_responses: Vec<RpcResponse>,
}

impl WebRpcInterface {
    /// Send notification to the host page without expecting response.
    pub fn send_notification(&mut self, method: &str, params: serde_json::Value) {
        self.outgoing_notifications.push(RpcNotification {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
        });
    }

    fn queue_response(&mut self, response: RpcResponse) {
        self.outgoing_responses.push(response);
    }
}

/// Plugin establishing WebRPC communication layer for iframe-based deployment.
pub struct WebRpcPlugin;

impl Plugin for WebRpcPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<WebRpcInterface>()
            .add_event::<IncomingRpcMessage>()
            .add_systems(
                Update,
                (
                    process_incoming_messages,
                    handle_rpc_messages,
                    send_outgoing_messages,
                )
                    .chain(),
            );

        #[cfg(target_arch = "wasm32")]
        app.add_systems(Startup, setup_message_listener);
    }
}

#[cfg(target_arch = "wasm32")]
fn setup_message_listener(mut commands: Commands) {
    use std::sync::Arc;
    use std::sync::Mutex;

    let message_queue: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let queue_clone = message_queue.clone();

    let closure = Closure::wrap(Box::new(move |event: MessageEvent| {
        if let Ok(data) = event.data().dyn_into::<js_sys::JsString>() {
            let message_str: String = data.into();
            if message_str.contains("jsonrpc") {
                if let Ok(mut queue) = queue_clone.lock() {
                    queue.push(message_str);
                }
            }
        }
    }) as Box<dyn FnMut(MessageEvent)>);

    let Some(window) = window() else {
        error!("Window object not available, RPC listener not installed");
        return;
    };
    if let Err(e) =
        window.add_event_listener_with_callback("message", closure.as_ref().unchecked_ref())
    {
        error!("Failed to register message listener: {:?}", e);
        return;
    }

    // Ownership moves to JS; the listener lives for the page lifetime.
    closure.forget();
    commands.insert_resource(MessageQueue(message_queue));
}

/// Resource wrapping thread-safe message queue for WASM event handling.
#[derive(Resource)]
struct MessageQueue(std::sync::Arc<std::sync::Mutex<Vec<String>>>);

/// Event representing incoming RPC message from the host page.
#[derive(Event)]
struct IncomingRpcMessage {
    content: String,
}

fn process_incoming_messages(
    message_queue: Option<Res<MessageQueue>>,
    mut message_events: EventWriter<IncomingRpcMessage>,
) {
    let Some(queue_res) = message_queue else {
        return;
    };

    let messages = if let Ok(mut queue) = queue_res.0.lock() {
        std::mem::take(&mut *queue)
    } else {
        Vec::new()
    };

    for message_str in messages {
        message_events.write(IncomingRpcMessage {
            content: message_str,
        });
    }
}

fn handle_rpc_messages(
    mut events: EventReader<IncomingRpcMessage>,
    mut rpc_interface: ResMut<WebRpcInterface>,
    mut settings: ResMut<SceneSettings>,
    mut teardown_events: EventWriter<TeardownScene>,
    stats: Res<VisibilityStats>,
    arena: Res<SceneNodes>,
    lod_query: Query<&NodeLod>,
) {
    let node_lod = |id: &str| {
        arena
            .node(id)
            .and_then(|entry| lod_query.get(entry.node).ok())
            .copied()
    };

    for event in events.read() {
        match serde_json::from_str::<RpcRequest>(&event.content) {
            Ok(request) => {
                debug!("Processing RPC method: {}", request.method);
                let mut context = RpcContext {
                    settings: &mut settings,
                    stats: &stats,
                    node_lod: &node_lod,
                    teardown_requested: false,
                };
                if let Some(response) = handle_rpc_request(&request, &mut context) {
                    rpc_interface.queue_response(response);
                }
                if context.teardown_requested {
                    teardown_events.write(TeardownScene);
                }
            }
            Err(parse_error) => {
                warn!("RPC parse error: {}", parse_error);
            }
        }
    }
}

/// Engine state a request may read or change.
struct RpcContext<'a> {
    settings: &'a mut SceneSettings,
    stats: &'a VisibilityStats,
    node_lod: &'a dyn Fn(&str) -> Option<NodeLod>,
    teardown_requested: bool,
}

/// Handle individual RPC request and generate response based on method.
/// Notifications (no id) are applied but never answered.
fn handle_rpc_request(request: &RpcRequest, context: &mut RpcContext) -> Option<RpcResponse> {
    let result = match request.method.as_str() {
        "set_view_mode" => handle_set_view_mode(&request.params, context.settings),
        "set_quality" => handle_set_quality(&request.params, context.settings),
        "set_paused" => handle_set_paused(&request.params, context.settings),
        "set_speed" => handle_set_speed(&request.params, context.settings),
        "get_visible_count" => Ok(serde_json::json!({
            "visible": context.stats.visible,
            "total": context.stats.total
        })),
        "get_node_lod" => handle_get_node_lod(&request.params, context.node_lod),
        "teardown" => {
            context.teardown_requested = true;
            Ok(serde_json::json!({ "success": true }))
        }
        _ => {
            warn!("Unknown RPC method: {}", request.method);
            let id = request.id.clone()?;
            return Some(create_error_response(
                id,
                -32601,
                "Method not found",
                Some(serde_json::json!({"method": request.method})),
            ));
        }
    };

    let id = request.id.clone()?;
    match result {
        Ok(result_value) => Some(RpcResponse {
            jsonrpc: "2.0".to_string(),
            result: Some(result_value),
            error: None,
            id: Some(id),
        }),
        Err(error) => Some(RpcResponse {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(error),
            id: Some(id),
        }),
    }
}

fn handle_set_view_mode(
    params: &serde_json::Value,
    settings: &mut SceneSettings,
) -> Result<serde_json::Value, RpcError> {
    #[derive(Deserialize)]
    struct ViewModeParams {
        mode: LayoutMode,
    }

    let parsed = serde_json::from_value::<ViewModeParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected 'mode' of radial, orb or helix"))?;

    settings.view_mode = parsed.mode;
    info!("View mode requested over RPC: {:?}", parsed.mode);

    Ok(serde_json::json!({
        "success": true,
        "mode": parsed.mode
    }))
}

fn handle_set_quality(
    params: &serde_json::Value,
    settings: &mut SceneSettings,
) -> Result<serde_json::Value, RpcError> {
    #[derive(Deserialize)]
    struct QualityParams {
        quality: QualityLevel,
    }

    let parsed = serde_json::from_value::<QualityParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected 'quality' of high, medium or low"))?;

    settings.quality = parsed.quality;

    Ok(serde_json::json!({
        "success": true,
        "quality": parsed.quality
    }))
}

fn handle_set_paused(
    params: &serde_json::Value,
    settings: &mut SceneSettings,
) -> Result<serde_json::Value, RpcError> {
    #[derive(Deserialize)]
    struct PausedParams {
        paused: bool,
    }

    let parsed = serde_json::from_value::<PausedParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected boolean 'paused' parameter"))?;

    settings.paused = parsed.paused;

    Ok(serde_json::json!({
        "success": true,
        "paused": settings.paused
    }))
}

fn handle_set_speed(
    params: &serde_json::Value,
    settings: &mut SceneSettings,
) -> Result<serde_json::Value, RpcError> {
    #[derive(Deserialize)]
    struct SpeedParams {
        speed: f32,
    }

    let parsed = serde_json::from_value::<SpeedParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected numeric 'speed' parameter"))?;

    settings.set_speed(parsed.speed);

    Ok(serde_json::json!({
        "success": true,
        "speed": settings.speed
    }))
}

fn handle_get_node_lod(
    params: &serde_json::Value,
    node_lod: &dyn Fn(&str) -> Option<NodeLod>,
) -> Result<serde_json::Value, RpcError> {
    #[derive(Deserialize)]
    struct NodeParams {
        id: String,
    }

    let parsed = serde_json::from_value::<NodeParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected 'id' parameter"))?;

    let lod = node_lod(&parsed.id)
        .ok_or_else(|| RpcError::invalid_params(&format!("Unknown node: {}", parsed.id)))?;

    Ok(serde_json::json!({
        "id": parsed.id,
        "tier": lod.tier,
        "show_label": lod.show_label
    }))
}

/// Create standardized error response with optional data payload.
fn create_error_response(
    id: serde_json::Value,
    code: i32,
    message: &str,
    data: Option<serde_json::Value>,
) -> RpcResponse {
    RpcResponse {
        jsonrpc: "2.0".to_string(),
        result: None,
        error: Some(RpcError {
            code,
            message: message.to_string(),
            data,
        }),
        id: Some(id),
    }
}

/// Send queued notifications and responses to the host page.
fn send_outgoing_messages(mut rpc_interface: ResMut<WebRpcInterface>) {
    for notification in rpc_interface.outgoing_notifications.drain(..) {
        send_message_to_parent(&notification);
    }

    for response in rpc_interface.outgoing_responses.drain(..) {
        send_message_to_parent(&response);
    }
}

/// Send serialized message to parent window.
fn send_message_to_parent<T: Serialize>(message: &T) {
    #[cfg(target_arch = "wasm32")]
    {
        match serde_json::to_string(message) {
            Ok(json) => {
                if let Some(window) = window() {
                    if let Some(parent) = window.parent().ok().flatten() {
                        if let Err(e) = parent.post_message(&JsValue::from_str(&json), "*") {
                            error!("Failed to send message to parent: {:?}", e);
                        }
                    } else {
                        warn!("No parent window available for message transmission");
                    }
                } else {
                    error!("Window object not available");
                }
            }
            Err(e) => {
                error!("Failed to serialize message: {}", e);
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        // No-op for non-WASM targets.
        let _ = message;
    }
}

impl RpcError {
    pub fn invalid_params(message: &str) -> Self {
        Self {
            code: -32602,
            message: message.to_string(),
            data: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(method: &str, params: serde_json::Value) -> RpcRequest {
        RpcRequest {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
            id: Some(serde_json::json!(1)),
        }
    }

    fn no_nodes(_: &str) -> Option<NodeLod> {
        None
    }

    fn context<'a>(
        settings: &'a mut SceneSettings,
        stats: &'a VisibilityStats,
        node_lod: &'a dyn Fn(&str) -> Option<NodeLod>,
    ) -> RpcContext<'a> {
        RpcContext {
            settings,
            stats,
            node_lod,
            teardown_requested: false,
        }
    }

    #[test]
    fn set_view_mode_accepts_orb_alias() {
        let mut settings = SceneSettings::default();
        settings.view_mode = LayoutMode::Helix;
        let response = handle_rpc_request(
            &request("set_view_mode", serde_json::json!({"mode": "orb"})),
            &mut context(&mut settings, &VisibilityStats::default(), &no_nodes),
        )
        .unwrap();

        assert!(response.error.is_none());
        assert_eq!(settings.view_mode, LayoutMode::Radial);
    }

    #[test]
    fn set_speed_is_clamped() {
        let mut settings = SceneSettings::default();
        let response = handle_rpc_request(
            &request("set_speed", serde_json::json!({"speed": 50.0})),
            &mut context(&mut settings, &VisibilityStats::default(), &no_nodes),
        )
        .unwrap();

        assert_eq!(response.result.unwrap()["speed"], serde_json::json!(3.0));
    }

    #[test]
    fn invalid_params_and_unknown_methods_report_codes() {
        let mut settings = SceneSettings::default();
        let stats = VisibilityStats::default();

        let bad_quality = handle_rpc_request(
            &request("set_quality", serde_json::json!({"quality": "ultra"})),
            &mut context(&mut settings, &stats, &no_nodes),
        )
        .unwrap();
        assert_eq!(bad_quality.error.unwrap().code, -32602);
        assert_eq!(settings.quality, QualityLevel::High);

        let unknown = handle_rpc_request(
            &request("warp_drive", serde_json::Value::Null),
            &mut context(&mut settings, &stats, &no_nodes),
        )
        .unwrap();
        assert_eq!(unknown.error.unwrap().code, -32601);
    }

    #[test]
    fn notifications_apply_without_response() {
        let mut settings = SceneSettings::default();
        let mut notification = request("set_paused", serde_json::json!({"paused": true}));
        notification.id = None;

        let stats = VisibilityStats::default();
        let response =
            handle_rpc_request(&notification, &mut context(&mut settings, &stats, &no_nodes));
        assert!(response.is_none());
        assert!(settings.paused);
    }

    #[test]
    fn teardown_is_flagged_for_the_event_writer() {
        let mut settings = SceneSettings::default();
        let stats = VisibilityStats::default();
        let mut ctx = context(&mut settings, &stats, &no_nodes);

        let response =
            handle_rpc_request(&request("teardown", serde_json::Value::Null), &mut ctx).unwrap();
        assert!(response.error.is_none());
        assert!(ctx.teardown_requested);
    }

    #[test]
    fn derived_values_are_readable() {
        let mut settings = SceneSettings::default();
        let stats = VisibilityStats { visible: 7, total: 10 };
        let lookup = |id: &str| {
            (id == "plato").then_some(NodeLod {
                tier: Some(1),
                show_label: true,
            })
        };

        let count = handle_rpc_request(
            &request("get_visible_count", serde_json::Value::Null),
            &mut context(&mut settings, &stats, &lookup),
        )
        .unwrap();
        assert_eq!(count.result.unwrap(), serde_json::json!({"visible": 7, "total": 10}));

        let lod = handle_rpc_request(
            &request("get_node_lod", serde_json::json!({"id": "plato"})),
            &mut context(&mut settings, &stats, &lookup),
        )
        .unwrap();
        assert_eq!(lod.result.unwrap()["tier"], serde_json::json!(1));

        let missing = handle_rpc_request(
            &request("get_node_lod", serde_json::json!({"id": "zeno"})),
            &mut context(&mut settings, &stats, &lookup),
        )
        .unwrap();
        assert_eq!(missing.error.unwrap().code, -32602);
    }
}
